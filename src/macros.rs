/**********************************************
  > File Name		: macros.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Fri 14 May 2021 10:34:16 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Log an error at debug level and return it from the enclosing function.
 * The error is converted with Into, so a FileError can be returned from
 * a function that returns BufferError.
 */
#[macro_export]
macro_rules! fail {
    ($err: expr) => {{
        let e = $err;
        log::debug!("{}", e);
        return Err(e.into());
    }};
}

/*
 * Unwrap a Result, or log the error and return it converted to the
 * given error type. Used where a file fault must be reported with
 * buffer context instead of passed through.
 */
#[macro_export]
macro_rules! ok_or_return {
    ($func: expr, $e: ident => $mapped: expr) => {{
        match $func {
            Ok(v) => v,
            Err($e) => {
                log::error!("{}", $e);
                let mapped = $mapped;
                return Err(mapped.into());
            }
        }
    }};
}

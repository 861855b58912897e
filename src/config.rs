/**********************************************
  > File Name		: config.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Fri 02 Apr 2021 11:28:19 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

use log::warn;

use crate::errors::{BufferError, Result};

pub const DEFAULT_NUM_BUFS: usize = 100;
pub const NUM_BUFS_ENV: &str = "BUFMGR_NUM_BUFS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufMgrConfig {
    pub num_bufs: usize, //number of frames, fixed for the life of the pool.
}

impl Default for BufMgrConfig {
    fn default() -> Self {
        BufMgrConfig {
            num_bufs: DEFAULT_NUM_BUFS,
        }
    }
}

impl BufMgrConfig {
    pub fn new(num_bufs: usize) -> Self {
        BufMgrConfig { num_bufs }
    }

    /*
     * Read the frame count from BUFMGR_NUM_BUFS.
     * Unset or unparsable values fall back to the default.
     */
    pub fn from_env() -> Self {
        let value = std::env::var(NUM_BUFS_ENV).ok();
        BufMgrConfig {
            num_bufs: parse_num_bufs(value.as_deref()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_bufs == 0 {
            return Err(BufferError::InvalidPoolSize);
        }
        Ok(())
    }
}

fn parse_num_bufs(value: Option<&str>) -> usize {
    match value {
        None => DEFAULT_NUM_BUFS,
        Some(v) => match v.trim().parse::<usize>() {
            Ok(n) => n,
            Err(_) => {
                warn!("ignoring {}={:?}, using {} frames", NUM_BUFS_ENV, v, DEFAULT_NUM_BUFS);
                DEFAULT_NUM_BUFS
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_falls_back_to_default() {
        assert_eq!(parse_num_bufs(None), DEFAULT_NUM_BUFS);
        assert_eq!(parse_num_bufs(Some("lots")), DEFAULT_NUM_BUFS);
        assert_eq!(parse_num_bufs(Some(" 64 ")), 64);
    }

    #[test]
    fn zero_frames_is_rejected() {
        assert!(BufMgrConfig::new(0).validate().is_err());
        assert!(BufMgrConfig::default().validate().is_ok());
    }
}

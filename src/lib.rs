/**********************************************
  > File Name		: lib.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Tue 02 Mar 2021 10:31:37 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * A buffer manager for paged files. All page access goes through a
 * fixed number of in-memory frames, replaced with the clock policy.
 */

mod macros;

pub mod config;
pub mod errors;
pub mod page_management;

pub use config::BufMgrConfig;
pub use errors::{BufferError, FileError, Result};
pub use page_management::{BufMgr, DiskFile, MemFile, Page, PageId, PagedFile, PAGE_SIZE};

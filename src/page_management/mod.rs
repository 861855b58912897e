/**********************************************
  > File Name		: mod.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Tue 02 Mar 2021 10:31:37 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

pub mod buf_desc;
pub mod buffer_manager;
pub mod clock;
mod hash_table;
pub mod mem_file;
pub mod page;
pub mod page_file;


pub use buf_desc::{BufDesc, FrameId};
pub use buffer_manager::{BufMgr, BufStats};
pub use mem_file::{FileOp, MemFile};
pub use page::{Page, PageId, INVALID_PAGE, PAGE_SIZE};
pub use page_file::{DiskFile, FileId, PagedFile};

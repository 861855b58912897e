/**********************************************
  > File Name		: errors.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Tue 02 Mar 2021 11:05:17 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Error enums shared by the paged file layer and the buffer manager.
 * A cache miss is not an error, it is a None from the hash table.
 */

use thiserror::Error;

use crate::page_management::page::PageId;
use crate::page_management::buf_desc::FrameId;

/*
 * Faults reported by a paged file. The buffer manager passes them
 * through unchanged, except for InvalidPage raised during a flush
 * write-back, which becomes BadBuffer.
 */
#[derive(Debug, Error)]
pub enum FileError {
    #[error("invalid page {page_no} in file {file}")]
    InvalidPage { file: String, page_no: PageId },

    #[error("file {file} is corrupt: {reason}")]
    Corrupt { file: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BufferError {
    //all frames pinned through a full clock sweep.
    #[error("buffer exceeded: all {num_bufs} frames are pinned")]
    BufferExceeded { num_bufs: usize },

    #[error("page {page_no} of file {file} is not pinned (frame {frame_no})")]
    PageNotPinned {
        file: String,
        page_no: PageId,
        frame_no: FrameId,
    },

    #[error("page {page_no} of file {file} is still pinned (frame {frame_no})")]
    PagePinned {
        file: String,
        page_no: PageId,
        frame_no: FrameId,
    },

    //the file refused a write-back of a frame it should own.
    #[error("bad buffer: frame {frame_no} (dirty={dirty}, valid={valid}, refbit={refbit})")]
    BadBuffer {
        frame_no: FrameId,
        dirty: bool,
        valid: bool,
        refbit: bool,
    },

    #[error("no hash table entry for page {page_no} of file {file}")]
    HashNotFound { file: String, page_no: PageId },

    #[error("page {page_no} of file {file} is already mapped to frame {frame_no}")]
    HashAlreadyPresent {
        file: String,
        page_no: PageId,
        frame_no: FrameId,
    },

    #[error("a buffer pool needs at least one frame")]
    InvalidPoolSize,

    #[error(transparent)]
    File(#[from] FileError),
}

pub type Result<T> = std::result::Result<T, BufferError>;

/**********************************************
  > File Name		: buf_desc.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 01 Mar 2021 07:52:27 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Data structure to describe a frame of the buffer pool.
 * Notice that the descriptor only holds metadata, the page bytes
 * live in the frame store at the same index.
 */

use std::fmt;

use super::page::{PageId, INVALID_PAGE};
use super::page_file::PagedFile;

pub type FrameId = usize;

#[derive(Debug, Clone)]
pub struct BufDesc<F> {
    pub(crate) file: Option<F>, //owning file, None while the frame is invalid.
    pub(crate) page_no: PageId,
    pub(crate) frame_no: FrameId,
    pub(crate) pin_cnt: u32,
    pub(crate) dirty: bool,
    pub(crate) valid: bool,
    pub(crate) refbit: bool,
}

impl<F: PagedFile> BufDesc<F> {
    pub fn new(frame_no: FrameId) -> Self {
        BufDesc {
            file: None,
            page_no: INVALID_PAGE,
            frame_no,
            pin_cnt: 0,
            dirty: false,
            valid: false,
            refbit: false,
        }
    }

    /*
     * A page has just been loaded into this frame, the caller
     * holds the first pin.
     */
    pub fn set(&mut self, file: F, page_no: PageId) {
        self.file = Some(file);
        self.page_no = page_no;
        self.pin_cnt = 1;
        self.dirty = false;
        self.valid = true;
        self.refbit = true;
    }

    pub fn clear(&mut self) {
        self.file = None;
        self.page_no = INVALID_PAGE;
        self.pin_cnt = 0;
        self.dirty = false;
        self.valid = false;
        self.refbit = false;
    }

    pub fn file(&self) -> Option<&F> {
        self.file.as_ref()
    }

    pub fn page_no(&self) -> PageId {
        self.page_no
    }

    pub fn frame_no(&self) -> FrameId {
        self.frame_no
    }

    pub fn pin_cnt(&self) -> u32 {
        self.pin_cnt
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn refbit(&self) -> bool {
        self.refbit
    }

    pub fn belongs_to(&self, file: &F) -> bool {
        self.valid && self.file.as_ref().map_or(false, |f| f.same_file(file))
    }
}

impl<F: PagedFile> fmt::Display for BufDesc<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "file:{} ", file.name())?,
            None => write!(f, "file:NULL ")?,
        }
        write!(
            f,
            "pageNo:{} valid:{} pinCnt:{} dirty:{} refbit:{}",
            self.page_no, self.valid, self.pin_cnt, self.dirty, self.refbit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page_management::mem_file::MemFile;

    #[test]
    fn set_then_clear() {
        let file = MemFile::new("f");
        let mut desc: BufDesc<MemFile> = BufDesc::new(4);
        assert!(!desc.is_valid());

        desc.set(file.clone(), 7);
        assert!(desc.is_valid());
        assert!(desc.refbit());
        assert!(!desc.is_dirty());
        assert_eq!(desc.pin_cnt(), 1);
        assert!(desc.belongs_to(&file));
        assert_eq!(desc.to_string(), "file:f pageNo:7 valid:true pinCnt:1 dirty:false refbit:true");

        desc.clear();
        assert!(!desc.is_valid());
        assert!(!desc.belongs_to(&file));
        assert_eq!(desc.frame_no(), 4);
        assert_eq!(desc.page_no(), INVALID_PAGE);
    }
}

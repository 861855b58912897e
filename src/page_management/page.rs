/**********************************************
  > File Name		: page.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 01 Mar 2021 04:27:24 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

use std::fmt;

pub type PageId = u32;

pub const PAGE_SIZE: usize = 8192;

//page numbers start from 1, so 0 marks an empty slot.
pub const INVALID_PAGE: PageId = 0;

/*
 * A page as seen by the buffer pool: a fixed-size byte payload plus
 * the page number it belongs to inside its file.
 * The page number is assigned by the file when the page is allocated
 * and never changes afterwards.
 */
#[derive(Clone, PartialEq, Eq)]
pub struct Page {
    page_number: PageId,
    data: Box<[u8]>,
}

impl Page {
    pub fn new(page_number: PageId) -> Self {
        Page {
            page_number,
            data: vec![0; PAGE_SIZE].into_boxed_slice(),
        }
    }

    pub fn empty() -> Self {
        Self::new(INVALID_PAGE)
    }

    /*
     * Build a page from raw bytes. Short input is zero padded,
     * long input is truncated to PAGE_SIZE.
     */
    pub fn from_bytes(page_number: PageId, bytes: &[u8]) -> Self {
        let mut page = Self::new(page_number);
        let len = bytes.len().min(PAGE_SIZE);
        page.data[..len].copy_from_slice(&bytes[..len]);
        page
    }

    pub fn page_number(&self) -> PageId {
        self.page_number
    }

    pub fn is_valid(&self) -> bool {
        self.page_number != INVALID_PAGE && self.data.len() == PAGE_SIZE
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::empty()
    }
}

//dumping 8KB of bytes is useless, only show the head.
impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("page_number", &self.page_number)
            .field("head", &&self.data[..16.min(self.data.len())])
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_pads_and_truncates() {
        let page = Page::from_bytes(3, b"hello");
        assert_eq!(page.page_number(), 3);
        assert_eq!(&page.data()[..5], b"hello");
        assert!(page.data()[5..].iter().all(|b| *b == 0));

        let long = vec![7u8; PAGE_SIZE + 10];
        let page = Page::from_bytes(4, &long);
        assert_eq!(page.data().len(), PAGE_SIZE);
    }

    #[test]
    fn empty_page_is_invalid() {
        assert!(!Page::empty().is_valid());
        assert!(Page::new(1).is_valid());
    }
}

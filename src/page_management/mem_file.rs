/**********************************************
  > File Name		: mem_file.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Fri 26 Mar 2021 10:20:35 AM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * A paged file that lives in memory.
 * Every operation is appended to a log, so tests can check when the
 * buffer manager wrote a page back or closed the file.
 */

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::page::{Page, PageId};
use super::page_file::{next_file_id, FileId, PagedFile};
use crate::errors::FileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOp {
    Read(PageId),
    Write(PageId),
    Allocate(PageId),
    Delete(PageId),
    Close,
}

#[derive(Debug)]
struct MemFileInner {
    pages: BTreeMap<PageId, Page>,
    next_page: PageId,
    open: bool,
    log: Vec<FileOp>,
}

#[derive(Debug, Clone)]
pub struct MemFile {
    id: FileId,
    name: Arc<str>,
    inner: Arc<Mutex<MemFileInner>>,
}

impl MemFile {
    pub fn new(name: &str) -> Self {
        MemFile {
            id: next_file_id(),
            name: Arc::from(name),
            inner: Arc::new(Mutex::new(MemFileInner {
                pages: BTreeMap::new(),
                next_page: 1,
                open: true,
                log: Vec::new(),
            })),
        }
    }

    /*
     * Create a file holding `num_pages` pages whose first byte is
     * the page number, without logging the allocations.
     */
    pub fn with_pages(name: &str, num_pages: u32) -> Self {
        let file = Self::new(name);
        {
            let mut inner = file.inner.lock();
            for page_no in 1..=num_pages {
                let page = Page::from_bytes(page_no, &[page_no as u8]);
                inner.pages.insert(page_no, page);
            }
            inner.next_page = num_pages + 1;
        }
        file
    }

    pub fn log(&self) -> Vec<FileOp> {
        self.inner.lock().log.clone()
    }

    pub fn clear_log(&self) {
        self.inner.lock().log.clear();
    }

    pub fn writes(&self) -> Vec<PageId> {
        self.inner
            .lock()
            .log
            .iter()
            .filter_map(|op| match op {
                FileOp::Write(page_no) => Some(*page_no),
                _ => None,
            })
            .collect()
    }

    pub fn closes(&self) -> usize {
        self.inner
            .lock()
            .log
            .iter()
            .filter(|op| **op == FileOp::Close)
            .count()
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().open
    }

    //look at the stored copy of a page, bypassing the log.
    pub fn stored(&self, page_no: PageId) -> Option<Page> {
        self.inner.lock().pages.get(&page_no).cloned()
    }

    pub fn num_pages(&self) -> usize {
        self.inner.lock().pages.len()
    }

    fn invalid(&self, page_no: PageId) -> FileError {
        FileError::InvalidPage {
            file: self.name.to_string(),
            page_no,
        }
    }
}

impl PagedFile for MemFile {
    fn file_id(&self) -> FileId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read_page(&self, page_no: PageId) -> Result<Page, FileError> {
        let mut inner = self.inner.lock();
        inner.open = true;
        let page = match inner.pages.get(&page_no) {
            Some(page) => page.clone(),
            None => return Err(self.invalid(page_no)),
        };
        inner.log.push(FileOp::Read(page_no));
        Ok(page)
    }

    fn write_page(&self, page: &Page) -> Result<(), FileError> {
        let page_no = page.page_number();
        let mut inner = self.inner.lock();
        inner.open = true;
        if !page.is_valid() || !inner.pages.contains_key(&page_no) {
            return Err(self.invalid(page_no));
        }
        inner.pages.insert(page_no, page.clone());
        inner.log.push(FileOp::Write(page_no));
        Ok(())
    }

    fn allocate_page(&self) -> Result<Page, FileError> {
        let mut inner = self.inner.lock();
        inner.open = true;
        let page_no = inner.next_page;
        inner.next_page += 1;
        let page = Page::new(page_no);
        inner.pages.insert(page_no, page.clone());
        inner.log.push(FileOp::Allocate(page_no));
        Ok(page)
    }

    fn delete_page(&self, page_no: PageId) -> Result<(), FileError> {
        let mut inner = self.inner.lock();
        inner.open = true;
        if inner.pages.remove(&page_no).is_none() {
            return Err(self.invalid(page_no));
        }
        inner.log.push(FileOp::Delete(page_no));
        Ok(())
    }

    fn close(&self) -> Result<(), FileError> {
        let mut inner = self.inner.lock();
        inner.open = false;
        inner.log.push(FileOp::Close);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_are_logged() {
        let file = MemFile::new("mem");
        let mut page = file.allocate_page().unwrap();
        page.data_mut()[0] = 9;
        file.write_page(&page).unwrap();
        file.read_page(1).unwrap();
        file.delete_page(1).unwrap();
        file.close().unwrap();

        assert_eq!(
            file.log(),
            vec![
                FileOp::Allocate(1),
                FileOp::Write(1),
                FileOp::Read(1),
                FileOp::Delete(1),
                FileOp::Close
            ]
        );
        assert!(!file.is_open());
    }

    #[test]
    fn foreign_pages_are_rejected() {
        let file = MemFile::with_pages("mem", 2);
        assert!(file.read_page(3).is_err());
        assert!(file.write_page(&Page::new(5)).is_err());
        assert!(file.write_page(&Page::empty()).is_err());
        assert!(file.log().is_empty());
    }
}

/**********************************************
  > File Name		: page_file.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 01 Mar 2021 07:31:48 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Introduction:
 *
 * The page file component provides facilities for higher-level
 * components to perform file I/O in terms of pages: read a specific
 * page of a given file, write it back, add and delete pages.
 *
 * Accessing data on a page of a file requires first reading the page
 * into the buffer pool in main memory, then manipulating its data there.
 * The buffer manager only talks to files through the PagedFile trait,
 * so any storage that can hand out numbered pages can sit below it.
 *
 * File handles are cheap to clone. All clones of a handle share the
 * same state and the same FileId, which is how the buffer manager
 * tells whether two frames belong to the same file.
 */

use std::fs::{File, OpenOptions};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use byteorder::{ByteOrder, LittleEndian};
use log::{debug, trace};
use parking_lot::Mutex;

use super::page::{Page, PageId, INVALID_PAGE, PAGE_SIZE};
use crate::errors::FileError;

pub type FileId = u64;

static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_file_id() -> FileId {
    NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed)
}

pub trait PagedFile: Clone {
    fn file_id(&self) -> FileId;
    fn name(&self) -> &str;

    //fails with InvalidPage if page_no is not a live page of this file.
    fn read_page(&self, page_no: PageId) -> Result<Page, FileError>;
    //fails with InvalidPage if the page is malformed or not owned by this file.
    fn write_page(&self, page: &Page) -> Result<(), FileError>;
    fn allocate_page(&self) -> Result<Page, FileError>;
    fn delete_page(&self, page_no: PageId) -> Result<(), FileError>;
    /*
     * Release the underlying resources. A closed handle stays usable,
     * the next operation reopens it.
     */
    fn close(&self) -> Result<(), FileError>;

    fn same_file(&self, other: &Self) -> bool {
        self.file_id() == other.file_id()
    }
}

/*
 * On-disk layout:
 *
 * | file header | slot 1 | slot 2 | ... |
 *
 * file header: magic (u32), number of slots (u32), 8 reserved bytes.
 * slot: page number (u32), used flag (u32), PAGE_SIZE bytes of data.
 *
 * Page number n lives in slot n. Deleted slots keep their place and
 * are handed out again by later allocations.
 */
const MAGIC: u32 = 0x4655_4231;
pub const FILE_HEADER_SIZE: u64 = 16;
const SLOT_HEADER_SIZE: u64 = 8;
const SLOT_SIZE: u64 = SLOT_HEADER_SIZE + PAGE_SIZE as u64;

#[derive(Debug)]
struct DiskFileInner {
    path: PathBuf,
    fp: Option<File>,
    num_pages: u32,
    free_slots: Vec<PageId>,
}

#[derive(Debug, Clone)]
pub struct DiskFile {
    id: FileId,
    name: Arc<str>,
    inner: Arc<Mutex<DiskFileInner>>,
}

fn slot_offset(page_no: PageId) -> u64 {
    FILE_HEADER_SIZE + (page_no as u64 - 1) * SLOT_SIZE
}

impl DiskFileInner {
    fn handle(&mut self) -> Result<&File, FileError> {
        let fp = match self.fp.take() {
            Some(fp) => fp,
            None => {
                trace!("reopening {}", self.path.display());
                OpenOptions::new().read(true).write(true).open(&self.path)?
            }
        };
        Ok(&*self.fp.insert(fp))
    }

    fn write_header(&mut self) -> Result<(), FileError> {
        let mut buf = [0u8; FILE_HEADER_SIZE as usize];
        LittleEndian::write_u32(&mut buf[0..4], MAGIC);
        LittleEndian::write_u32(&mut buf[4..8], self.num_pages);
        self.handle()?.write_all_at(&buf, 0)?;
        Ok(())
    }

    //returns (page number, used) stored in the slot header.
    fn read_slot_header(&mut self, page_no: PageId) -> Result<(PageId, bool), FileError> {
        let mut buf = [0u8; SLOT_HEADER_SIZE as usize];
        self.handle()?.read_exact_at(&mut buf, slot_offset(page_no))?;
        Ok((
            LittleEndian::read_u32(&buf[0..4]),
            LittleEndian::read_u32(&buf[4..8]) != 0,
        ))
    }

    fn write_slot_header(&mut self, page_no: PageId, used: bool) -> Result<(), FileError> {
        let mut buf = [0u8; SLOT_HEADER_SIZE as usize];
        LittleEndian::write_u32(&mut buf[0..4], page_no);
        LittleEndian::write_u32(&mut buf[4..8], used as u32);
        self.handle()?.write_all_at(&buf, slot_offset(page_no))?;
        Ok(())
    }

    fn is_live(&mut self, page_no: PageId) -> Result<bool, FileError> {
        if page_no == INVALID_PAGE || page_no > self.num_pages {
            return Ok(false);
        }
        let (stored, used) = self.read_slot_header(page_no)?;
        Ok(used && stored == page_no)
    }
}

impl DiskFile {
    /*
     * Create a new paged file. Fails if the path already exists.
     */
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, FileError> {
        let path = path.as_ref().to_path_buf();
        let fp = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(&path)?;
        let mut inner = DiskFileInner {
            path,
            fp: Some(fp),
            num_pages: 0,
            free_slots: Vec::new(),
        };
        inner.write_header()?;
        debug!("created paged file {}", inner.path.display());
        Ok(Self::wrap(inner))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FileError> {
        let path = path.as_ref().to_path_buf();
        let fp = OpenOptions::new().read(true).write(true).open(&path)?;

        let mut buf = [0u8; FILE_HEADER_SIZE as usize];
        if let Err(e) = fp.read_exact_at(&mut buf, 0) {
            return Err(FileError::Corrupt {
                file: path.display().to_string(),
                reason: format!("cannot read file header: {}", e),
            });
        }
        if LittleEndian::read_u32(&buf[0..4]) != MAGIC {
            return Err(FileError::Corrupt {
                file: path.display().to_string(),
                reason: "bad magic number".to_string(),
            });
        }

        let mut inner = DiskFileInner {
            path,
            fp: Some(fp),
            num_pages: LittleEndian::read_u32(&buf[4..8]),
            free_slots: Vec::new(),
        };
        //rebuild the free list, lowest slot last so pop() hands it out first.
        for page_no in (1..=inner.num_pages).rev() {
            if !inner.is_live(page_no)? {
                inner.free_slots.push(page_no);
            }
        }
        debug!(
            "opened paged file {} with {} slots, {} free",
            inner.path.display(),
            inner.num_pages,
            inner.free_slots.len()
        );
        Ok(Self::wrap(inner))
    }

    pub fn remove<P: AsRef<Path>>(path: P) -> Result<(), FileError> {
        std::fs::remove_file(path)?;
        Ok(())
    }

    fn wrap(inner: DiskFileInner) -> Self {
        DiskFile {
            id: next_file_id(),
            name: Arc::from(inner.path.display().to_string()),
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().fp.is_some()
    }

    fn invalid(&self, page_no: PageId) -> FileError {
        FileError::InvalidPage {
            file: self.name.to_string(),
            page_no,
        }
    }
}

impl PagedFile for DiskFile {
    fn file_id(&self) -> FileId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn read_page(&self, page_no: PageId) -> Result<Page, FileError> {
        let mut inner = self.inner.lock();
        if !inner.is_live(page_no)? {
            return Err(self.invalid(page_no));
        }
        let mut page = Page::new(page_no);
        inner
            .handle()?
            .read_exact_at(page.data_mut(), slot_offset(page_no) + SLOT_HEADER_SIZE)?;
        Ok(page)
    }

    fn write_page(&self, page: &Page) -> Result<(), FileError> {
        let page_no = page.page_number();
        let mut inner = self.inner.lock();
        if !page.is_valid() || !inner.is_live(page_no)? {
            return Err(self.invalid(page_no));
        }
        inner
            .handle()?
            .write_all_at(page.data(), slot_offset(page_no) + SLOT_HEADER_SIZE)?;
        Ok(())
    }

    fn allocate_page(&self) -> Result<Page, FileError> {
        let mut inner = self.inner.lock();
        let page_no = match inner.free_slots.pop() {
            Some(page_no) => page_no,
            None => {
                inner.num_pages += 1;
                inner.write_header()?;
                inner.num_pages
            }
        };
        let page = Page::new(page_no);
        inner.write_slot_header(page_no, true)?;
        inner
            .handle()?
            .write_all_at(page.data(), slot_offset(page_no) + SLOT_HEADER_SIZE)?;
        trace!("allocated page {} in {}", page_no, self.name);
        Ok(page)
    }

    fn delete_page(&self, page_no: PageId) -> Result<(), FileError> {
        let mut inner = self.inner.lock();
        if !inner.is_live(page_no)? {
            return Err(self.invalid(page_no));
        }
        inner.write_slot_header(page_no, false)?;
        inner.free_slots.push(page_no);
        trace!("deleted page {} in {}", page_no, self.name);
        Ok(())
    }

    fn close(&self) -> Result<(), FileError> {
        let mut inner = self.inner.lock();
        if let Some(fp) = inner.fp.take() {
            fp.sync_all()?;
            debug!("closed {}", self.name);
        }
        Ok(())
    }
}

impl PartialEq for DiskFile {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DiskFile {}

/**********************************************
  > File Name		: buffer_manager.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 01 Mar 2021 07:52:27 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

use std::collections::HashMap;
use std::fmt;

use log::{debug, info, trace};

use super::buf_desc::{BufDesc, FrameId};
use super::clock::Clock;
use super::hash_table::BufHashTbl;
use super::page::{Page, PageId};
use super::page_file::{FileId, PagedFile};
use crate::config::BufMgrConfig;
use crate::errors::{BufferError, FileError, Result};
use crate::{fail, ok_or_return};

/*
 * Memory and References.
 *
 * Page bytes live in buf_pool, one Page per frame, and the metadata
 * of frame i lives in buf_desc_table[i]. Nothing is ever handed out
 * as a raw pointer: read_page and alloc_page return a borrow of the
 * frame that ends before the next call into the manager. The pin
 * taken by those calls is what keeps the mapping resident, callers
 * come back through page()/page_mut() while they hold it and must
 * call unpin_page when they are done.
 */
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BufStats {
    pub accesses: u64,
    pub disk_reads: u64,
    pub disk_writes: u64,
}

impl BufStats {
    pub fn clear(&mut self) {
        *self = BufStats::default();
    }
}

/*
 * Accessing data on a page of a file requires first reading
 * the page into the buffer pool in main memory. While a page
 * is in memory and its data is available for manipulation,
 * the page is said to be "pinned". After the manipulation
 * is done, the page is "unpinned". Unpinning a page does
 * not necessarily cause the page to be removed from the buffer.
 * An unpinned page is kept in memory as long as its frame is
 * not picked by the clock.
 *
 * A single BufMgr owns all of its state. It does no locking of its
 * own, share it between threads behind a Mutex.
 */
pub struct BufMgr<F: PagedFile> {
    num_bufs: usize,
    buf_desc_table: Vec<BufDesc<F>>,
    buf_pool: Vec<Page>,
    hash_table: BufHashTbl,
    clock: Clock,
    //number of valid frames per file, a file leaves the map when it has none.
    file_frames: HashMap<FileId, usize>,
    stats: BufStats,
}

impl<F: PagedFile> BufMgr<F> {
    pub fn new(num_bufs: usize) -> Result<Self> {
        if num_bufs == 0 {
            fail!(BufferError::InvalidPoolSize);
        }
        debug!("buffer pool with {} frames", num_bufs);
        Ok(BufMgr {
            num_bufs,
            buf_desc_table: (0..num_bufs).map(BufDesc::new).collect(),
            buf_pool: (0..num_bufs).map(|_| Page::empty()).collect(),
            hash_table: BufHashTbl::new(num_bufs),
            clock: Clock::new(num_bufs),
            file_frames: HashMap::new(),
            stats: BufStats::default(),
        })
    }

    pub fn with_config(config: &BufMgrConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.num_bufs)
    }

    /*
     * Find a frame for a new page of `requester`. A free frame is
     * returned as is, a victim is written back if dirty, unmapped and
     * cleared first. The victim's file gets closed if this was its last
     * resident page, unless it is the file about to move in.
     */
    fn alloc_buf(&mut self, requester: FileId) -> Result<FrameId> {
        let frame = match self.clock.next_victim(&mut self.buf_desc_table) {
            Ok(frame) => frame,
            Err(e) => fail!(e),
        };

        let desc = &self.buf_desc_table[frame];
        let (file, page_no, dirty) = match (&desc.file, desc.valid) {
            (Some(file), true) => (file.clone(), desc.page_no, desc.dirty),
            _ => return Ok(frame),
        };

        if dirty {
            debug!(
                "writing back page {} of {} from frame {}",
                page_no,
                file.name(),
                frame
            );
            file.write_page(&self.buf_pool[frame])?;
            self.stats.disk_writes += 1;
        }
        self.remove_mapping(&file, page_no)?;
        self.buf_desc_table[frame].clear();
        debug!("evicted page {} of {} from frame {}", page_no, file.name(), frame);

        if self.forget_frame(file.file_id()) && file.file_id() != requester {
            file.close()?;
            debug!("closed {}, no resident pages left", file.name());
        }
        Ok(frame)
    }

    fn install(&mut self, file: &F, page_no: PageId, page: Page, frame: FrameId) -> Result<()> {
        if let Err(existing) = self.hash_table.insert(file.file_id(), page_no, frame) {
            fail!(BufferError::HashAlreadyPresent {
                file: file.name().to_string(),
                page_no,
                frame_no: existing,
            });
        }
        self.buf_pool[frame] = page;
        self.buf_desc_table[frame].set(file.clone(), page_no);
        *self.file_frames.entry(file.file_id()).or_insert(0) += 1;
        Ok(())
    }

    fn remove_mapping(&mut self, file: &F, page_no: PageId) -> Result<()> {
        match self.hash_table.remove(file.file_id(), page_no) {
            Some(_) => Ok(()),
            None => fail!(BufferError::HashNotFound {
                file: file.name().to_string(),
                page_no,
            }),
        }
    }

    //returns true when the file has no resident frame left.
    fn forget_frame(&mut self, file_id: FileId) -> bool {
        match self.file_frames.get_mut(&file_id) {
            Some(count) if *count > 1 => {
                *count -= 1;
                false
            }
            _ => {
                self.file_frames.remove(&file_id);
                true
            }
        }
    }

    fn close_if_unused(&mut self, file: &F) -> Result<()> {
        if !self.file_frames.contains_key(&file.file_id()) {
            file.close()?;
            debug!("closed {}, no resident pages left", file.name());
        }
        Ok(())
    }

    /*
     * Return the page pinned in its frame, reading it from the file
     * if it is not resident yet.
     * The page is checked against the file before any frame is taken,
     * so a bad page number never evicts anything. On failure the file
     * is closed again if none of its pages are resident.
     */
    pub fn read_page(&mut self, file: &F, page_no: PageId) -> Result<&mut Page> {
        self.stats.accesses += 1;
        let frame = match self.hash_table.lookup(file.file_id(), page_no) {
            Some(frame) => {
                let desc = &mut self.buf_desc_table[frame];
                desc.refbit = true;
                desc.pin_cnt += 1;
                trace!(
                    "hit: page {} of {} in frame {}, pin count {}",
                    page_no,
                    file.name(),
                    frame,
                    desc.pin_cnt
                );
                frame
            }
            None => {
                let page = match file.read_page(page_no) {
                    Ok(page) => page,
                    Err(e) => {
                        self.close_if_unused(file)?;
                        fail!(e);
                    }
                };
                self.stats.disk_reads += 1;
                let frame = match self.alloc_buf(file.file_id()) {
                    Ok(frame) => frame,
                    Err(e) => {
                        self.close_if_unused(file)?;
                        return Err(e);
                    }
                };
                self.install(file, page_no, page, frame)?;
                debug!("miss: page {} of {} loaded into frame {}", page_no, file.name(), frame);
                frame
            }
        };
        Ok(&mut self.buf_pool[frame])
    }

    /*
     * Drop one pin of a resident page. A page that is not resident
     * is ignored, it may have been evicted or disposed already.
     * Unpinning never clears the dirty flag, only a write-back does.
     */
    pub fn unpin_page(&mut self, file: &F, page_no: PageId, dirty: bool) -> Result<()> {
        let frame = match self.hash_table.lookup(file.file_id(), page_no) {
            Some(frame) => frame,
            None => {
                trace!("unpin: page {} of {} is not resident", page_no, file.name());
                return Ok(());
            }
        };
        let desc = &mut self.buf_desc_table[frame];
        if desc.pin_cnt == 0 {
            fail!(BufferError::PageNotPinned {
                file: file.name().to_string(),
                page_no,
                frame_no: frame,
            });
        }
        desc.pin_cnt -= 1;
        if dirty {
            desc.dirty = true;
        }
        Ok(())
    }

    /*
     * Allocate a new page in the file and pin it in a frame.
     * The frame is taken first, so a full pool doesn't leave an
     * orphan page in the file.
     */
    pub fn alloc_page(&mut self, file: &F) -> Result<(PageId, &mut Page)> {
        self.stats.accesses += 1;
        let frame = self.alloc_buf(file.file_id())?;
        let page = match file.allocate_page() {
            Ok(page) => page,
            Err(e) => {
                //the victim may have been this file's last resident page.
                self.close_if_unused(file)?;
                fail!(e);
            }
        };
        let page_no = page.page_number();
        self.install(file, page_no, page, frame)?;
        debug!("allocated page {} of {} in frame {}", page_no, file.name(), frame);
        Ok((page_no, &mut self.buf_pool[frame]))
    }

    /*
     * Write back every dirty page of the file and drop all of its
     * frames. Stops at the first pinned page, frames handled before
     * it stay flushed.
     */
    pub fn flush_file(&mut self, file: &F) -> Result<()> {
        for frame in 0..self.num_bufs {
            if !self.buf_desc_table[frame].belongs_to(file) {
                continue;
            }
            let desc = &self.buf_desc_table[frame];
            let (page_no, dirty, valid, refbit) = (desc.page_no, desc.dirty, desc.valid, desc.refbit);
            if desc.pin_cnt > 0 {
                fail!(BufferError::PagePinned {
                    file: file.name().to_string(),
                    page_no,
                    frame_no: frame,
                });
            }

            if dirty {
                ok_or_return!(file.write_page(&self.buf_pool[frame]), e => match e {
                    FileError::InvalidPage { .. } => BufferError::BadBuffer {
                        frame_no: frame,
                        dirty,
                        valid,
                        refbit,
                    },
                    other => BufferError::File(other),
                });
                self.stats.disk_writes += 1;
                self.buf_desc_table[frame].dirty = false;
            }

            self.remove_mapping(file, page_no)?;
            self.buf_desc_table[frame].clear();
            self.forget_frame(file.file_id());
        }
        debug!("flushed {}", file.name());
        self.close_if_unused(file)
    }

    /*
     * Delete a page from the file, and from the buffer pool if it is
     * resident there.
     */
    pub fn dispose_page(&mut self, file: &F, page_no: PageId) -> Result<()> {
        match self.hash_table.lookup(file.file_id(), page_no) {
            Some(frame) => {
                if self.buf_desc_table[frame].dirty {
                    file.write_page(&self.buf_pool[frame])?;
                    self.stats.disk_writes += 1;
                }
                self.remove_mapping(file, page_no)?;
                self.buf_desc_table[frame].clear();
                self.forget_frame(file.file_id());
                debug!("dropped page {} of {} from frame {}", page_no, file.name(), frame);
            }
            None => trace!("dispose: page {} of {} is not resident", page_no, file.name()),
        }
        let deleted = file.delete_page(page_no);
        self.close_if_unused(file)?;
        Ok(deleted?)
    }

    /*
     * Write back every dirty page nobody holds a pin on. Frames stay
     * resident. Pinned frames keep their dirty flag, their holders may
     * still be writing to them.
     */
    pub fn flush_all(&mut self) -> Result<()> {
        for frame in 0..self.num_bufs {
            let desc = &self.buf_desc_table[frame];
            if !desc.valid || !desc.dirty || desc.pin_cnt > 0 {
                continue;
            }
            if let Some(file) = &desc.file {
                file.write_page(&self.buf_pool[frame])?;
                self.stats.disk_writes += 1;
            }
            self.buf_desc_table[frame].dirty = false;
        }
        Ok(())
    }

    /*
     * Re-borrow a page the caller has pinned. None if the page is
     * not resident or nobody holds a pin on it.
     */
    pub fn page(&self, file: &F, page_no: PageId) -> Option<&Page> {
        let frame = self.pinned_frame(file, page_no)?;
        Some(&self.buf_pool[frame])
    }

    pub fn page_mut(&mut self, file: &F, page_no: PageId) -> Option<&mut Page> {
        let frame = self.pinned_frame(file, page_no)?;
        Some(&mut self.buf_pool[frame])
    }

    fn pinned_frame(&self, file: &F, page_no: PageId) -> Option<FrameId> {
        self.hash_table
            .lookup(file.file_id(), page_no)
            .filter(|frame| self.buf_desc_table[*frame].pin_cnt > 0)
    }

    pub fn frame_of(&self, file: &F, page_no: PageId) -> Option<FrameId> {
        self.hash_table.lookup(file.file_id(), page_no)
    }

    pub fn pin_count(&self, file: &F, page_no: PageId) -> Option<u32> {
        self.frame_of(file, page_no)
            .map(|frame| self.buf_desc_table[frame].pin_cnt)
    }

    pub fn is_dirty(&self, file: &F, page_no: PageId) -> Option<bool> {
        self.frame_of(file, page_no)
            .map(|frame| self.buf_desc_table[frame].dirty)
    }

    pub fn desc(&self, frame: FrameId) -> Option<&BufDesc<F>> {
        self.buf_desc_table.get(frame)
    }

    pub fn num_bufs(&self) -> usize {
        self.num_bufs
    }

    pub fn num_valid_frames(&self) -> usize {
        self.buf_desc_table.iter().filter(|desc| desc.valid).count()
    }

    pub fn num_resident(&self) -> usize {
        self.hash_table.len()
    }

    pub fn stats(&self) -> &BufStats {
        &self.stats
    }

    pub fn clear_stats(&mut self) {
        self.stats.clear();
    }

    pub fn print_self(&self) {
        print!("{}", self);
        info!(
            "total number of valid frames: {}, resident pages: {}",
            self.num_valid_frames(),
            self.num_resident()
        );
    }
}

impl<F: PagedFile> fmt::Display for BufMgr<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, desc) in self.buf_desc_table.iter().enumerate() {
            writeln!(f, "FrameNo:{} {}", i, desc)?;
        }
        writeln!(f, "Total Number of Valid Frames:{}", self.num_valid_frames())
    }
}

/**********************************************
  > File Name		: clock.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Thu 11 Mar 2021 03:54:41 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Clock (second chance) replacement policy.
 *
 * The hand sweeps the descriptor table in circular order starting
 * at its current position:
 * 1. an invalid frame is free, take it;
 * 2. a pinned frame can't be evicted, move on;
 * 3. a referenced frame loses its reference bit and is skipped
 *    this time;
 * 4. anything else is the victim.
 *
 * The hand stays on the frame it picked, so the next sweep starts
 * there. Every visited frame counts as one step, and two full turns
 * are enough to clear every reference bit and come back to an
 * unpinned frame. If none shows up in that many steps, every frame
 * is pinned.
 *
 * The policy only chooses. Writing the victim back and dropping its
 * mapping is the buffer manager's job.
 */

use log::trace;

use super::buf_desc::{BufDesc, FrameId};
use super::page_file::PagedFile;
use crate::errors::{BufferError, Result};

#[derive(Debug)]
pub struct Clock {
    hand: FrameId,
    num_bufs: usize,
}

impl Clock {
    pub fn new(num_bufs: usize) -> Self {
        Clock {
            hand: num_bufs.saturating_sub(1),
            num_bufs,
        }
    }

    pub fn hand(&self) -> FrameId {
        self.hand
    }

    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.num_bufs;
    }

    pub fn next_victim<F: PagedFile>(&mut self, descs: &mut [BufDesc<F>]) -> Result<FrameId> {
        debug_assert_eq!(descs.len(), self.num_bufs);
        for _ in 0..2 * self.num_bufs {
            let desc = &mut descs[self.hand];
            if !desc.valid {
                trace!("clock: frame {} is free", self.hand);
                return Ok(self.hand);
            }
            if desc.pin_cnt > 0 {
                self.advance();
                continue;
            }
            if desc.refbit {
                desc.refbit = false;
                self.advance();
                continue;
            }
            trace!("clock: frame {} is the victim", self.hand);
            return Ok(self.hand);
        }
        Err(BufferError::BufferExceeded {
            num_bufs: self.num_bufs,
        })
    }
}

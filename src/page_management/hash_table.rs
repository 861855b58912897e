/**********************************************
  > File Name		: hash_table.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Tue 02 Mar 2021 10:31:37 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Map from (file, page number) to the frame holding that page.
 * We need this table to get a resident page quickly, a miss is the
 * normal cache-miss path and is reported as None.
 */

use std::collections::HashMap;

use super::buf_desc::FrameId;
use super::page::PageId;
use super::page_file::FileId;

/*
 * Roughly 1.2 times the number of frames, forced odd.
 */
pub fn hashtable_size(num_bufs: usize) -> usize {
    ((num_bufs * 6 / 5) & !1) + 1
}

#[derive(Debug)]
pub struct BufHashTbl {
    table: HashMap<(FileId, PageId), FrameId>,
}

impl BufHashTbl {
    pub fn new(num_bufs: usize) -> Self {
        BufHashTbl {
            table: HashMap::with_capacity(hashtable_size(num_bufs)),
        }
    }

    /*
     * Returns the frame already mapped to this page if there is one,
     * the table is left unchanged in that case.
     */
    pub fn insert(&mut self, file: FileId, page_no: PageId, frame_no: FrameId) -> Result<(), FrameId> {
        match self.table.get(&(file, page_no)) {
            Some(existing) => Err(*existing),
            None => {
                self.table.insert((file, page_no), frame_no);
                Ok(())
            }
        }
    }

    pub fn lookup(&self, file: FileId, page_no: PageId) -> Option<FrameId> {
        self.table.get(&(file, page_no)).copied()
    }

    pub fn remove(&mut self, file: FileId, page_no: PageId) -> Option<FrameId> {
        self.table.remove(&(file, page_no))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_odd_and_grows_with_pool() {
        assert_eq!(hashtable_size(1), 1);
        assert_eq!(hashtable_size(3), 3);
        assert_eq!(hashtable_size(10), 13);
        assert_eq!(hashtable_size(100), 121);
        for n in 1..200 {
            assert_eq!(hashtable_size(n) % 2, 1);
        }
    }

    #[test]
    fn insert_lookup_remove() {
        let mut ht = BufHashTbl::new(8);
        assert_eq!(ht.lookup(1, 1), None);

        ht.insert(1, 1, 0).unwrap();
        ht.insert(2, 1, 1).unwrap();
        assert_eq!(ht.lookup(1, 1), Some(0));
        assert_eq!(ht.lookup(2, 1), Some(1));
        assert_eq!(ht.insert(1, 1, 5), Err(0));
        assert_eq!(ht.len(), 2);

        assert_eq!(ht.remove(1, 1), Some(0));
        assert_eq!(ht.remove(1, 1), None);
        assert_eq!(ht.lookup(1, 1), None);
        assert_eq!(ht.lookup(2, 1), Some(1));
    }
}

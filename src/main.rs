/**********************************************
  > File Name		: main.rs
  > Author		    : lunar
  > Email			: lunar_ubuntu@qq.com
  > Created Time	: Mon 01 Mar 2021 07:52:27 PM CST
  > Location        : Shanghai
  > Copyright@ https://github.com/xiaoqixian
 **********************************************/

/*
 * Demo driver: push more pages than there are frames through the
 * pool, flush, and read them back from a fresh pool.
 */

use anyhow::Context;
use log::info;

use bufmgr::{BufMgr, BufMgrConfig, DiskFile, PagedFile};

const NUM_PAGES: u32 = 32;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = BufMgrConfig::from_env();
    let path = std::env::temp_dir().join(format!("bufmgr-demo-{}.db", std::process::id()));
    let file = DiskFile::create(&path).with_context(|| format!("creating {}", path.display()))?;

    {
        let mut buffer: BufMgr<DiskFile> = BufMgr::with_config(&config)?;
        for i in 0..NUM_PAGES {
            let (page_no, page) = buffer.alloc_page(&file)?;
            let msg = format!("page {} says hello", i);
            page.data_mut()[..msg.len()].copy_from_slice(msg.as_bytes());
            buffer.unpin_page(&file, page_no, true)?;
        }
        buffer.flush_file(&file)?;
        info!("write pass: {:?}", buffer.stats());
    }

    let file = DiskFile::open(&path)?;
    let mut buffer: BufMgr<DiskFile> = BufMgr::with_config(&config)?;
    for page_no in 1..=NUM_PAGES {
        let page = buffer.read_page(&file, page_no)?;
        let text: Vec<u8> = page.data().iter().take_while(|b| **b != 0).cloned().collect();
        println!("{}: {}", page_no, String::from_utf8_lossy(&text));
        buffer.unpin_page(&file, page_no, false)?;
    }
    info!("read pass: {:?}", buffer.stats());
    buffer.print_self();

    buffer.flush_file(&file)?;
    file.close()?;
    DiskFile::remove(&path)?;
    Ok(())
}

use std::collections::VecDeque;

use log::info;
use memory::{FrameNumber, FramePool};

use crate::{page_table::PageTable, PagerError};

/// Chooses which resident page gives up its frame on a fault
pub trait ReplacementPolicy {
    fn name(&self) -> &'static str;

    /// Called after every successful access to `page`
    fn touch(&mut self, _page: usize) {}

    /// Called once `page` has been evicted
    fn forget(&mut self, _page: usize) {}

    fn select_victim(&mut self, table: &PageTable) -> Option<usize>;
}

impl<P: ReplacementPolicy + ?Sized> ReplacementPolicy for Box<P> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn touch(&mut self, page: usize) {
        (**self).touch(page)
    }

    fn forget(&mut self, page: usize) {
        (**self).forget(page)
    }

    fn select_victim(&mut self, table: &PageTable) -> Option<usize> {
        (**self).select_victim(table)
    }
}

/// Evicts the lowest-numbered resident page.
///
/// Recency is not tracked: the victim is positional and the referenced bit
/// plays no part in the choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstPresent;

impl ReplacementPolicy for FirstPresent {
    fn name(&self) -> &'static str {
        "first-present"
    }

    fn select_victim(&mut self, table: &PageTable) -> Option<usize> {
        table
            .iter()
            .find(|(_, entry)| entry.is_present())
            .map(|(page, _)| page)
    }
}

/// Evicts the resident page whose last access is the oldest
#[derive(Debug, Clone, Default)]
pub struct LeastRecentlyUsed {
    /// Most recent at the front
    order: VecDeque<usize>,
}

impl LeastRecentlyUsed {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReplacementPolicy for LeastRecentlyUsed {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn touch(&mut self, page: usize) {
        if let Some(pos) = self.order.iter().position(|&p| p == page) {
            self.order.remove(pos);
        }
        self.order.push_front(page);
    }

    fn forget(&mut self, page: usize) {
        if let Some(pos) = self.order.iter().position(|&p| p == page) {
            self.order.remove(pos);
        }
    }

    fn select_victim(&mut self, table: &PageTable) -> Option<usize> {
        // pages mapped without ever being touched are older than any access
        let untouched = table
            .iter()
            .find(|(page, entry)| entry.is_present() && !self.order.contains(page))
            .map(|(page, _)| page);
        untouched.or_else(|| {
            self.order
                .iter()
                .rev()
                .copied()
                .find(|&page| table.get(page).map(|e| e.is_present()).unwrap_or(false))
        })
    }
}

/// A page removed from memory to make room for another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eviction {
    pub page: usize,
    pub frame: FrameNumber,
    /// The page was modified and would have been written back
    pub wrote_back: bool,
}

/// Evict one victim chosen by `policy`, leaving exactly one more free frame
pub fn evict_one<P: ReplacementPolicy + ?Sized>(
    policy: &mut P,
    table: &mut PageTable,
    frames: &mut FramePool,
) -> Result<Eviction, PagerError> {
    let page = policy
        .select_victim(table)
        .ok_or(PagerError::ReplacementExhausted)?;
    let entry = table.get(page)?;
    let frame = entry.frame().ok_or_else(|| {
        PagerError::Invariant(format!(
            "{} chose page {} which is not resident",
            policy.name(),
            page
        ))
    })?;

    let wrote_back = entry.is_modified();
    if wrote_back {
        info!("Write back page {} from frame {:#05X}", page, frame);
    }
    frames.release(frame)?;
    table.evict(page)?;
    policy.forget(page);
    info!("Evicted page {} from frame {:#05X}", page, frame);

    Ok(Eviction {
        page,
        frame,
        wrote_back,
    })
}

#[cfg(test)]
mod tests {
    use memory::{FramePool, FramePoolError, Pool};

    use super::*;

    fn resident(pages: &[usize]) -> (PageTable, FramePool) {
        let mut table = PageTable::init(8);
        let mut frames = FramePool::with_frames(pages.len() as u32);
        for &page in pages {
            let frame = frames.allocate_free().unwrap();
            table.set_present(page, frame).unwrap();
        }
        (table, frames)
    }

    #[test]
    fn first_present_ignores_referenced_bit() {
        let (mut table, _) = resident(&[5, 2, 6]);
        table.mark_referenced(2).unwrap();
        assert_eq!(FirstPresent.select_victim(&table), Some(2));
    }

    #[test]
    fn evict_frees_one_frame() {
        let (mut table, mut frames) = resident(&[1, 3]);
        let eviction = evict_one(&mut FirstPresent, &mut table, &mut frames).unwrap();
        assert_eq!(
            eviction,
            Eviction {
                page: 1,
                frame: 0,
                wrote_back: false
            }
        );
        assert!(!table.get(1).unwrap().is_present());
        assert_eq!(frames.iter(Pool::Free).collect::<Vec<_>>(), vec![0]);
        assert_eq!(frames.iter(Pool::Used).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn modified_page_written_back() {
        let (mut table, mut frames) = resident(&[4]);
        table.mark_modified(4).unwrap();
        let eviction = evict_one(&mut FirstPresent, &mut table, &mut frames).unwrap();
        assert!(eviction.wrote_back);
        assert!(!table.get(4).unwrap().is_modified());
    }

    #[test]
    fn nothing_to_evict() {
        let (mut table, mut frames) = resident(&[]);
        assert_eq!(
            evict_one(&mut FirstPresent, &mut table, &mut frames),
            Err(PagerError::ReplacementExhausted)
        );
    }

    #[test]
    fn frame_missing_from_pool() {
        let (mut table, mut frames) = resident(&[0]);
        frames.release(0).unwrap();
        assert_eq!(
            evict_one(&mut FirstPresent, &mut table, &mut frames),
            Err(PagerError::Frames(FramePoolError::NotFound(0)))
        );
    }

    #[test]
    fn lru_picks_oldest_access() {
        let (mut table, _) = resident(&[0, 1, 2]);
        let mut lru = LeastRecentlyUsed::new();
        lru.touch(0);
        lru.touch(1);
        lru.touch(2);
        lru.touch(0);
        assert_eq!(lru.select_victim(&table), Some(1));
        table.evict(1).unwrap();
        lru.forget(1);
        assert_eq!(lru.select_victim(&table), Some(2));
    }

    #[test]
    fn lru_prefers_untouched_pages() {
        let (table, _) = resident(&[3, 4]);
        let mut lru = LeastRecentlyUsed::new();
        lru.touch(3);
        assert_eq!(lru.select_victim(&table), Some(4));
        let mut lru = LeastRecentlyUsed::new();
        assert_eq!(lru.select_victim(&table), Some(3));
    }
}

mod iter;
mod page_table_entry;

use log::debug;
use memory::FrameNumber;

pub use page_table_entry::{AccessRights, PageTableEntry};

pub use self::iter::PageTableIterator;
use crate::PagerError;

/// Fixed-size table mapping virtual pages to physical frames.
/// Every mutation touches exactly one entry.
#[derive(Debug, Clone)]
pub struct PageTable {
    entries: Vec<PageTableEntry>,
}

impl PageTable {
    pub fn init(size: usize) -> Self {
        Self {
            entries: vec![PageTableEntry::zero(); size],
        }
    }

    pub fn with_rights(rights: &[AccessRights]) -> Self {
        Self {
            entries: rights
                .iter()
                .map(|&r| PageTableEntry::with_rights(r))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, page: usize) -> Result<PageTableEntry, PagerError> {
        self.entries
            .get(page)
            .copied()
            .ok_or(PagerError::OutOfRange {
                page,
                size: self.entries.len(),
            })
    }

    fn entry_mut(&mut self, page: usize) -> Result<&mut PageTableEntry, PagerError> {
        let size = self.entries.len();
        self.entries
            .get_mut(page)
            .ok_or(PagerError::OutOfRange { page, size })
    }

    pub fn set_rights(&mut self, page: usize, rights: AccessRights) -> Result<(), PagerError> {
        self.entry_mut(page)?.set_rights(rights);
        Ok(())
    }

    /// Map `page` to `frame`, clearing the referenced and modified bits
    pub fn set_present(&mut self, page: usize, frame: FrameNumber) -> Result<(), PagerError> {
        self.entry_mut(page)?.map(frame);
        debug!("Page {} mapped to frame {:#05X}", page, frame);
        Ok(())
    }

    pub fn mark_referenced(&mut self, page: usize) -> Result<(), PagerError> {
        self.entry_mut(page)?.set_referenced();
        Ok(())
    }

    pub fn mark_modified(&mut self, page: usize) -> Result<(), PagerError> {
        self.entry_mut(page)?.set_modified();
        Ok(())
    }

    /// Unmap `page` and return the frame it held.
    /// Evicting a page that is not present is a no-op returning `None`.
    pub fn evict(&mut self, page: usize) -> Result<Option<FrameNumber>, PagerError> {
        let entry = self.entry_mut(page)?;
        let frame = entry.frame();
        entry.unmap();
        Ok(frame)
    }

    pub fn iter(&self) -> PageTableIterator<'_> {
        PageTableIterator::new(&self.entries)
    }

    pub fn present_pages(&self) -> impl Iterator<Item = (usize, FrameNumber)> + '_ {
        self.iter()
            .filter_map(|(page, entry)| entry.frame().map(|frame| (page, frame)))
    }
}

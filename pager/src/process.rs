use std::fmt;

use log::debug;
use memory::{FrameNumber, FramePool, Pool};

use crate::{
    address::{AddressLayout, VirtualAddress},
    page_table::{AccessRights, PageTable},
    PagerError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Read => write!(f, "R"),
            Operation::Write => write!(f, "W"),
        }
    }
}

/// One memory access of the simulated program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub address: VirtualAddress,
    pub operation: Operation,
}

impl Reference {
    pub fn read(address: VirtualAddress) -> Self {
        Reference {
            address,
            operation: Operation::Read,
        }
    }

    pub fn write(address: VirtualAddress) -> Self {
        Reference {
            address,
            operation: Operation::Write,
        }
    }
}

/// Flattened page table entry handed to presentation code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRow {
    pub page: usize,
    pub rights: AccessRights,
    pub present: bool,
    pub referenced: bool,
    pub modified: bool,
    pub frame: FrameNumber,
}

/// The simulated process: its page table, its frames and the references
/// it will make, in order.
#[derive(Debug, Clone)]
pub struct Process {
    pub(crate) layout: AddressLayout,
    pub(crate) page_table: PageTable,
    pub(crate) frames: FramePool,
    frame_total: usize,
    references: Vec<Reference>,
    cursor: usize,
}

impl Process {
    /// `rights` is indexed by page; missing pages get no rights and extra
    /// entries are dropped.
    pub fn new(
        layout: AddressLayout,
        mut rights: Vec<AccessRights>,
        frames: usize,
        references: Vec<Reference>,
    ) -> Result<Self, PagerError> {
        if frames > layout.frame_count() {
            return Err(PagerError::TooManyFrames {
                requested: frames,
                limit: layout.frame_count(),
            });
        }
        rights.resize(layout.page_count(), AccessRights::NONE);
        debug!(
            "Process created: {} pages, {} frames, {} references",
            layout.page_count(),
            frames,
            references.len()
        );
        Ok(Self {
            layout,
            page_table: PageTable::with_rights(&rights),
            frames: FramePool::with_frames(frames as u32),
            frame_total: frames,
            references,
            cursor: 0,
        })
    }

    pub fn layout(&self) -> &AddressLayout {
        &self.layout
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn frames(&self) -> &FramePool {
        &self.frames
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    /// Index of the next reference to run
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.references.len()
    }

    pub(crate) fn next_reference(&mut self) -> Option<Reference> {
        let reference = *self.references.get(self.cursor)?;
        self.cursor += 1;
        Some(reference)
    }

    pub fn dump(&self) -> Vec<PageRow> {
        self.page_table
            .iter()
            .map(|(page, entry)| PageRow {
                page,
                rights: entry.rights(),
                present: entry.is_present(),
                referenced: entry.is_referenced(),
                modified: entry.is_modified(),
                frame: entry.frame_bits(),
            })
            .collect()
    }

    /// Check that resident pages and the frame pool agree
    pub fn check_invariants(&self) -> Result<(), PagerError> {
        if self.frames.total() != self.frame_total {
            return Err(PagerError::Invariant(format!(
                "process owns {} frames, started with {}",
                self.frames.total(),
                self.frame_total
            )));
        }
        if !self.frames.is_partitioned() {
            return Err(PagerError::Invariant(
                "a frame is listed twice in the pool".to_string(),
            ));
        }

        let mut seen = Vec::new();
        for (page, frame) in self.page_table.present_pages() {
            if !self.frames.contains(Pool::Used, frame) {
                return Err(PagerError::Invariant(format!(
                    "page {} holds frame {:#05X} which is not in use",
                    page, frame
                )));
            }
            if seen.contains(&frame) {
                return Err(PagerError::Invariant(format!(
                    "frame {:#05X} is mapped by more than one page",
                    frame
                )));
            }
            seen.push(frame);
        }
        if seen.len() != self.frames.len(Pool::Used) {
            return Err(PagerError::Invariant(format!(
                "{} frames in use but {} pages resident",
                self.frames.len(Pool::Used),
                seen.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rights_fill_the_table() {
        let process = Process::new(
            AddressLayout::default(),
            vec![AccessRights::ALL, AccessRights::READ],
            2,
            vec![],
        )
        .unwrap();
        let rows = process.dump();
        assert_eq!(rows.len(), 8);
        assert_eq!(rows[0].rights, AccessRights::ALL);
        assert_eq!(rows[1].rights, AccessRights::READ);
        assert_eq!(rows[7].rights, AccessRights::NONE);
        assert!(rows.iter().all(|r| !r.present && r.frame == 0));
        assert_eq!(process.frames().len(Pool::Free), 2);
    }

    #[test]
    fn too_many_frames() {
        let err = Process::new(AddressLayout::default(), vec![], 4096, vec![]).unwrap_err();
        assert_eq!(
            err,
            PagerError::TooManyFrames {
                requested: 4096,
                limit: 2048
            }
        );
    }

    #[test]
    fn cursor_walks_references() {
        let refs = vec![Reference::read(0), Reference::write(0x2000)];
        let mut process = Process::new(AddressLayout::default(), vec![], 1, refs).unwrap();
        assert_eq!(process.next_reference(), Some(Reference::read(0)));
        assert_eq!(process.position(), 1);
        assert_eq!(process.next_reference(), Some(Reference::write(0x2000)));
        assert!(process.is_finished());
        assert_eq!(process.next_reference(), None);
    }

    #[test]
    fn invariants_catch_stray_mapping() {
        let mut process = Process::new(AddressLayout::default(), vec![], 2, vec![]).unwrap();
        assert!(process.check_invariants().is_ok());
        // mapped without going through the pool
        process.page_table.set_present(3, 1).unwrap();
        assert!(matches!(
            process.check_invariants(),
            Err(PagerError::Invariant(_))
        ));
    }
}

use std::fmt;

use memory::FramePoolError;

pub mod address;
pub mod page_table;
pub mod process;
pub mod replacement;
pub mod translator;

pub use address::{AddressLayout, PhysicalAddress, VirtualAddress};
pub use page_table::{AccessRights, PageTable, PageTableEntry};
pub use process::{Operation, PageRow, Process, Reference};
pub use replacement::{Eviction, FirstPresent, LeastRecentlyUsed, ReplacementPolicy};
pub use translator::{EventSink, RunSummary, Translation, TranslationEvent, Translator};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerError {
    /// Page index past the end of the table
    OutOfRange { page: usize, size: usize },
    /// Frame bookkeeping failed (`Exhausted`, `NotFound`, ...)
    Frames(FramePoolError),
    /// A victim was needed but no page is resident
    ReplacementExhausted,
    /// Resolving a fault did not leave the page resident
    InconsistentFramePool { page: usize },
    /// More frames requested than the physical address can name
    TooManyFrames { requested: usize, limit: usize },
    /// A page/frame invariant no longer holds
    Invariant(String),
}

impl PagerError {
    /// Everything but a bad page index means the bookkeeping is broken
    /// and the run must stop.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PagerError::OutOfRange { .. })
    }
}

impl fmt::Display for PagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PagerError::OutOfRange { page, size } => {
                write!(f, "page {} is outside the {}-entry page table", page, size)
            }
            PagerError::Frames(e) => write!(f, "frame pool: {}", e),
            PagerError::ReplacementExhausted => {
                write!(f, "no resident page to evict and no free frame left")
            }
            PagerError::InconsistentFramePool { page } => {
                write!(f, "page fault on page {} could not be resolved", page)
            }
            PagerError::TooManyFrames { requested, limit } => {
                write!(f, "{} frames requested, at most {} addressable", requested, limit)
            }
            PagerError::Invariant(msg) => write!(f, "invariant violated: {}", msg),
        }
    }
}

impl std::error::Error for PagerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PagerError::Frames(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FramePoolError> for PagerError {
    fn from(e: FramePoolError) -> Self {
        PagerError::Frames(e)
    }
}

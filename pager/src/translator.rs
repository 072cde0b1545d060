use log::{debug, warn};
use memory::{FrameNumber, FramePoolError, Pool};

use crate::{
    address::PhysicalAddress,
    process::{Operation, Process, Reference},
    replacement::{evict_one, Eviction, FirstPresent, ReplacementPolicy},
    PagerError,
};

/// A reference that reached physical memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub reference: Reference,
    pub page: usize,
    pub offset: u32,
    pub frame: FrameNumber,
    /// The page was not resident when referenced
    pub faulted: bool,
    /// The page evicted to make room, if any
    pub eviction: Option<Eviction>,
    pub physical_address: PhysicalAddress,
}

impl Translation {
    pub fn evicted(&self) -> bool {
        self.eviction.is_some()
    }

    pub fn wrote_back(&self) -> bool {
        self.eviction.map(|e| e.wrote_back).unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationEvent {
    Translated(Translation),
    /// The page index is past the table; the reference was dropped
    InvalidPage { reference: Reference, page: usize },
}

impl TranslationEvent {
    pub fn reference(&self) -> Reference {
        match self {
            TranslationEvent::Translated(t) => t.reference,
            TranslationEvent::InvalidPage { reference, .. } => *reference,
        }
    }

    pub fn page(&self) -> usize {
        match self {
            TranslationEvent::Translated(t) => t.page,
            TranslationEvent::InvalidPage { page, .. } => *page,
        }
    }

    pub fn translation(&self) -> Option<&Translation> {
        match self {
            TranslationEvent::Translated(t) => Some(t),
            TranslationEvent::InvalidPage { .. } => None,
        }
    }
}

/// Consumer of the events produced while running a process
pub trait EventSink {
    fn translation(&mut self, event: &TranslationEvent);

    /// Called before the translation that caused the eviction
    fn eviction(&mut self, _eviction: &Eviction) {}
}

impl EventSink for Vec<TranslationEvent> {
    fn translation(&mut self, event: &TranslationEvent) {
        self.push(*event);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub references: usize,
    pub faults: usize,
    pub evictions: usize,
    pub write_backs: usize,
    pub invalid: usize,
}

impl RunSummary {
    pub fn record(&mut self, event: &TranslationEvent) {
        self.references += 1;
        match event {
            TranslationEvent::Translated(t) => {
                self.faults += t.faulted as usize;
                self.evictions += t.evicted() as usize;
                self.write_backs += t.wrote_back() as usize;
            }
            TranslationEvent::InvalidPage { .. } => self.invalid += 1,
        }
    }
}

/// Drives references through a process one at a time.
///
/// Per reference: decode, resolve a fault (evicting at most once), update the
/// referenced/modified bits, compose the physical address.
#[derive(Debug, Clone, Default)]
pub struct Translator<P = FirstPresent> {
    policy: P,
}

impl<P: ReplacementPolicy> Translator<P> {
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn translate(
        &mut self,
        process: &mut Process,
        reference: Reference,
    ) -> Result<TranslationEvent, PagerError> {
        let (page, offset) = process.layout.decompose(reference.address);
        if page >= process.page_table.len() {
            warn!(
                "Reference {:#06X} targets page {}, table has {} entries",
                reference.address,
                page,
                process.page_table.len()
            );
            return Ok(TranslationEvent::InvalidPage { reference, page });
        }

        let resident = process.page_table.get(page)?.frame();
        let faulted = resident.is_none();
        let mut eviction = None;
        let frame = match resident {
            Some(frame) => frame,
            None => {
                debug!("Page fault on page {}", page);
                if process.frames.is_empty(Pool::Free) {
                    eviction = Some(evict_one(
                        &mut self.policy,
                        &mut process.page_table,
                        &mut process.frames,
                    )?);
                }
                // evict_one either failed or released exactly one frame, so
                // an empty pool here means the table and the pool disagree
                let frame = match process.frames.allocate_free() {
                    Ok(frame) => frame,
                    Err(FramePoolError::Exhausted) => {
                        return Err(PagerError::InconsistentFramePool { page })
                    }
                    Err(e) => return Err(e.into()),
                };
                process.page_table.set_present(page, frame)?;
                frame
            }
        };

        process.page_table.mark_referenced(page)?;
        if reference.operation == Operation::Write {
            process.page_table.mark_modified(page)?;
        }
        self.policy.touch(page);

        let physical_address = process.layout.compose(frame, offset);
        debug!(
            "{:#06X} {} -> page {} frame {:#05X} -> {:#08X}",
            reference.address, reference.operation, page, frame, physical_address
        );

        Ok(TranslationEvent::Translated(Translation {
            reference,
            page,
            offset,
            frame,
            faulted,
            eviction,
            physical_address,
        }))
    }

    /// Run the next reference of `process`, `None` once all have run
    pub fn step(&mut self, process: &mut Process) -> Option<Result<TranslationEvent, PagerError>> {
        let reference = process.next_reference()?;
        let event = self.translate(process, reference);
        if cfg!(debug_assertions) && event.is_ok() {
            if let Err(e) = process.check_invariants() {
                return Some(Err(e));
            }
        }
        Some(event)
    }

    /// Run every remaining reference, stopping at the first fatal error
    pub fn run<S: EventSink + ?Sized>(
        &mut self,
        process: &mut Process,
        sink: &mut S,
    ) -> Result<RunSummary, PagerError> {
        let mut summary = RunSummary::default();
        while let Some(event) = self.step(process) {
            let event = event?;
            if let Some(eviction) = event.translation().and_then(|t| t.eviction) {
                sink.eviction(&eviction);
            }
            sink.translation(&event);
            summary.record(&event);
        }
        debug!("Run finished with {} policy: {:?}", self.policy.name(), summary);
        Ok(summary)
    }
}

use std::io::{self, Write};

use pager::{EventSink, Eviction, PageRow, RunSummary, TranslationEvent};

/// One row per page: rights, present, referenced and modified bits, frame
pub fn write_table<W: Write>(out: &mut W, rows: &[PageRow]) -> io::Result<()> {
    writeln!(out, "     A  P  R  M FRM")?;
    for row in rows {
        writeln!(
            out,
            "[{}]: {}  {}  {}  {} {:03X}",
            row.page,
            row.rights,
            row.present as u8,
            row.referenced as u8,
            row.modified as u8,
            row.frame
        )?;
    }
    Ok(())
}

pub fn write_event<W: Write>(out: &mut W, event: &TranslationEvent) -> io::Result<()> {
    let reference = event.reference();
    match event {
        TranslationEvent::Translated(t) => writeln!(
            out,
            "{:04X} {} -> page {} {:5} frame {:03X} -> {:06X}",
            reference.address,
            reference.operation,
            t.page,
            if t.faulted { "fault" } else { "hit" },
            t.frame,
            t.physical_address
        ),
        TranslationEvent::InvalidPage { page, .. } => writeln!(
            out,
            "{:04X} {} -> page {} invalid",
            reference.address, reference.operation, page
        ),
    }
}

pub fn write_eviction<W: Write>(out: &mut W, eviction: &Eviction) -> io::Result<()> {
    write!(
        out,
        "  evict page {} from frame {:03X}",
        eviction.page, eviction.frame
    )?;
    if eviction.wrote_back {
        write!(out, " (write back)")?;
    }
    writeln!(out)
}

pub fn write_summary<W: Write>(out: &mut W, summary: &RunSummary) -> io::Result<()> {
    writeln!(
        out,
        "{} references: {} faults, {} evictions, {} write backs, {} invalid",
        summary.references, summary.faults, summary.evictions, summary.write_backs, summary.invalid
    )
}

/// Writes every event as text. The first write error is kept and every
/// later event is dropped.
pub struct TablePrinter<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> TablePrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    pub fn table(&mut self, rows: &[PageRow]) {
        self.write_with(|out| write_table(out, rows));
    }

    pub fn summary(&mut self, summary: &RunSummary) {
        self.write_with(|out| write_summary(out, summary));
    }

    pub fn finish(mut self) -> io::Result<W> {
        match self.error.take() {
            Some(e) => Err(e),
            None => {
                self.out.flush()?;
                Ok(self.out)
            }
        }
    }

    fn write_with<F>(&mut self, write: F)
    where
        F: FnOnce(&mut W) -> io::Result<()>,
    {
        if self.error.is_none() {
            if let Err(e) = write(&mut self.out) {
                self.error = Some(e);
            }
        }
    }
}

impl<W: Write> EventSink for TablePrinter<W> {
    fn translation(&mut self, event: &TranslationEvent) {
        self.write_with(|out| write_event(out, event));
    }

    fn eviction(&mut self, eviction: &Eviction) {
        self.write_with(|out| write_eviction(out, eviction));
    }
}

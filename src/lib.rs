use std::{fmt, io};

use pager::{EventSink, PagerError, ReplacementPolicy, RunSummary, Translator};

pub mod config;
pub mod display;
pub mod references;
pub mod rights;

use config::SimConfig;
use display::TablePrinter;

/// Failure reading the rights or reference file
#[derive(Debug)]
pub enum LoadError {
    Io(io::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
        }
    }
}

impl From<io::Error> for LoadError {
    fn from(e: io::Error) -> Self {
        LoadError::Io(e)
    }
}

#[derive(Debug)]
pub enum SimError {
    Io(io::Error),
    Load(LoadError),
    Pager(PagerError),
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::Io(e) => write!(f, "{}", e),
            SimError::Load(e) => write!(f, "loading input: {}", e),
            SimError::Pager(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SimError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimError::Io(e) => Some(e),
            SimError::Load(e) => Some(e),
            SimError::Pager(e) => Some(e),
        }
    }
}

impl From<io::Error> for SimError {
    fn from(e: io::Error) -> Self {
        SimError::Io(e)
    }
}

impl From<LoadError> for SimError {
    fn from(e: LoadError) -> Self {
        SimError::Load(e)
    }
}

impl From<PagerError> for SimError {
    fn from(e: PagerError) -> Self {
        SimError::Pager(e)
    }
}

/// Build the process described by `config`, run every reference through it
/// and print the events, the final table and a summary to `out`.
pub fn simulate<W: io::Write>(config: &SimConfig, out: W) -> Result<(W, RunSummary), SimError> {
    let mut process = config.build_process()?;
    let mut translator = Translator::new(config.policy.build());
    let mut printer = TablePrinter::new(out);

    printer.table(&process.dump());
    let summary = if config.dump_each {
        run_with_dumps(&mut translator, &mut process, &mut printer)?
    } else {
        translator.run(&mut process, &mut printer)?
    };
    printer.table(&process.dump());
    printer.summary(&summary);

    let out = printer.finish()?;
    Ok((out, summary))
}

fn run_with_dumps<P: ReplacementPolicy, W: io::Write>(
    translator: &mut Translator<P>,
    process: &mut pager::Process,
    printer: &mut TablePrinter<W>,
) -> Result<RunSummary, PagerError> {
    let mut summary = RunSummary::default();
    while let Some(event) = translator.step(process) {
        let event = event?;
        if let Some(eviction) = event.translation().and_then(|t| t.eviction) {
            printer.eviction(&eviction);
        }
        printer.translation(&event);
        printer.table(&process.dump());
        summary.record(&event);
    }
    Ok(summary)
}

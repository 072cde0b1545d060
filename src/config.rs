use std::{fmt, path::PathBuf};

use clap::{Parser, ValueEnum};
use log::info;
use pager::{
    AccessRights, AddressLayout, FirstPresent, LeastRecentlyUsed, PagerError, Process, Reference,
    ReplacementPolicy,
};

use crate::{
    references::load_references,
    rights::{load_rights, ConfigWarning},
    LoadError,
};

/// Frames handed to the process when neither the rights file nor the
/// command line say otherwise
pub const DEFAULT_FRAMES: usize = 4;
pub const DEFAULT_REFERENCE_COUNT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PolicyKind {
    /// Evict the lowest-numbered resident page
    #[default]
    FirstPresent,
    /// Evict the least recently used resident page
    Lru,
}

impl PolicyKind {
    pub fn build(self) -> Box<dyn ReplacementPolicy> {
        match self {
            PolicyKind::FirstPresent => Box::new(FirstPresent),
            PolicyKind::Lru => Box::new(LeastRecentlyUsed::new()),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::FirstPresent => write!(f, "first-present"),
            PolicyKind::Lru => write!(f, "lru"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "page_sim", about = "Demand paging simulator", version)]
pub struct Args {
    /// Page-rights configuration file
    #[arg(short, long)]
    pub rights: PathBuf,

    /// Reference file, one `<hex address> <R|W>` per line
    #[arg(short = 'f', long)]
    pub references: PathBuf,

    /// Maximum number of reference lines to read
    #[arg(short = 'n', long, default_value_t = DEFAULT_REFERENCE_COUNT)]
    pub count: usize,

    /// Override the frame count of the rights file
    #[arg(long)]
    pub frames: Option<usize>,

    #[arg(long, value_enum, default_value_t = PolicyKind::FirstPresent)]
    pub policy: PolicyKind,

    /// Print the page table after every reference
    #[arg(long)]
    pub dump_each: bool,
}

/// Everything needed to build and run one process
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub layout: AddressLayout,
    pub rights: Vec<AccessRights>,
    pub frames: usize,
    pub references: Vec<Reference>,
    pub policy: PolicyKind,
    pub dump_each: bool,
    pub warnings: Vec<ConfigWarning>,
}

impl SimConfig {
    pub fn load(args: &Args) -> Result<Self, LoadError> {
        let layout = AddressLayout::default();
        let rights = load_rights(&args.rights, layout.page_count())?;
        let references = load_references(&args.references, args.count)?;
        let frames = args.frames.or(rights.frames).unwrap_or(DEFAULT_FRAMES);
        info!(
            "Loaded {} references, {} frames, {} policy",
            references.len(),
            frames,
            args.policy
        );
        Ok(Self {
            layout,
            rights: rights.rights,
            frames,
            references,
            policy: args.policy,
            dump_each: args.dump_each,
            warnings: rights.warnings,
        })
    }

    pub fn build_process(&self) -> Result<Process, PagerError> {
        Process::new(
            self.layout,
            self.rights.clone(),
            self.frames,
            self.references.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_args() {
        let args = Args::parse_from([
            "page_sim",
            "-r",
            "rights.txt",
            "-f",
            "refs.txt",
            "-n",
            "5",
            "--policy",
            "lru",
            "--dump-each",
        ]);
        assert_eq!(args.rights, PathBuf::from("rights.txt"));
        assert_eq!(args.references, PathBuf::from("refs.txt"));
        assert_eq!(args.count, 5);
        assert_eq!(args.frames, None);
        assert_eq!(args.policy, PolicyKind::Lru);
        assert!(args.dump_each);
    }

    #[test]
    fn defaults() {
        let args = Args::parse_from(["page_sim", "--rights", "a", "--references", "b"]);
        assert_eq!(args.count, DEFAULT_REFERENCE_COUNT);
        assert_eq!(args.policy, PolicyKind::FirstPresent);
        assert!(!args.dump_each);
        assert_eq!(PolicyKind::default().build().name(), "first-present");
        assert_eq!(PolicyKind::Lru.build().name(), "lru");
    }

    #[test]
    fn args_are_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}

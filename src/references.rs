use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::debug;
use pager::{Operation, Reference};

use crate::LoadError;

/// Read at most `max` lines of `<hex address> <op>` references.
///
/// The budget counts lines, not references: a line that does not hold
/// exactly an address and an `R`/`W` operation is skipped but still used up.
pub fn parse_references<R: BufRead>(reader: R, max: usize) -> Result<Vec<Reference>, LoadError> {
    let mut references = Vec::new();
    for (number, line) in reader.lines().take(max).enumerate() {
        let line = line?;
        match parse_line(&line) {
            Some(reference) => references.push(reference),
            None => debug!("Skipping reference line {}: {:?}", number + 1, line),
        }
    }
    Ok(references)
}

pub fn load_references<P: AsRef<Path>>(path: P, max: usize) -> Result<Vec<Reference>, LoadError> {
    let file = File::open(path)?;
    parse_references(BufReader::new(file), max)
}

fn parse_line(line: &str) -> Option<Reference> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.len() != 2 {
        return None;
    }
    let digits = words[0]
        .strip_prefix("0x")
        .or_else(|| words[0].strip_prefix("0X"))
        .unwrap_or(words[0]);
    let address = u32::from_str_radix(digits, 16).ok()?;
    let operation = match words[1] {
        "R" | "r" => Operation::Read,
        "W" | "w" => Operation::Write,
        _ => return None,
    };
    Some(Reference { address, operation })
}

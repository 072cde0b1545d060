use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use log::warn;
use pager::AccessRights;

use crate::LoadError;

/// A configuration line that was reported and ignored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RightsConfig {
    /// Indexed by page, one entry per page of the table
    pub rights: Vec<AccessRights>,
    /// From a `frames <n>` line
    pub frames: Option<usize>,
    pub warnings: Vec<ConfigWarning>,
}

/// Parse a page-rights file.
///
/// ```text
/// # comment
/// frames 4
/// 0 7
/// 0x3 4
/// ```
///
/// Bad lines and pages past `page_count` are reported and skipped; they
/// never fail the load.
pub fn parse_rights<R: BufRead>(reader: R, page_count: usize) -> Result<RightsConfig, LoadError> {
    let mut config = RightsConfig {
        rights: vec![AccessRights::NONE; page_count],
        frames: None,
        warnings: Vec::new(),
    };

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let content = line.split('#').next().unwrap_or("").trim();
        if content.is_empty() {
            continue;
        }
        let words: Vec<&str> = content.split_whitespace().collect();
        if let Err(reason) = apply_line(&mut config, &words, page_count) {
            warn!("Rights line {} ignored: {}", number, reason);
            config.warnings.push(ConfigWarning {
                line: number,
                reason,
            });
        }
    }
    Ok(config)
}

pub fn load_rights<P: AsRef<Path>>(path: P, page_count: usize) -> Result<RightsConfig, LoadError> {
    let file = File::open(path)?;
    parse_rights(BufReader::new(file), page_count)
}

fn apply_line(config: &mut RightsConfig, words: &[&str], page_count: usize) -> Result<(), String> {
    match words {
        ["frames", count] => {
            let count = count
                .parse()
                .map_err(|_| format!("frame count {:?} is not a number", count))?;
            config.frames = Some(count);
        }
        [page, code] => {
            let page = parse_page(page).ok_or_else(|| format!("bad page index {:?}", page))?;
            if page >= page_count {
                return Err(format!(
                    "page {} is outside the {}-entry table",
                    page, page_count
                ));
            }
            let rights = code
                .parse::<u8>()
                .ok()
                .and_then(AccessRights::from_code)
                .ok_or_else(|| format!("bad rights code {:?}", code))?;
            config.rights[page] = rights;
        }
        _ => return Err(format!("expected 2 fields, found {}", words.len())),
    }
    Ok(())
}

fn parse_page(word: &str) -> Option<usize> {
    match word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => word.parse().ok(),
    }
}

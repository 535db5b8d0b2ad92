use std::io::{self, BufRead, Write};

use indexmap::IndexMap;
use log::{debug, trace};

/// First token of every line that gets counted.
pub const TAG: &str = "case";

#[derive(thiserror::Error, Debug)]
pub enum ReportError {
    #[error("malformed case line {line_number}: {line:?}, expected `case <path>`")]
    MalformedLine { line_number: usize, line: String },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Extracts the path from a `case <path>` line.
///
/// Lines that don't start with [`TAG`] are not ours and yield `Ok(None)`.
/// A line that starts with it but doesn't split into exactly `case` and one
/// path token is an error, never skipped.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<&str>, ReportError> {
    if !line.starts_with(TAG) {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(TAG), Some(path), None) => Ok(Some(path)),
        _ => Err(ReportError::MalformedLine {
            line_number,
            line: line.to_string(),
        }),
    }
}

/// Directory part of a `/`-separated path, without touching the filesystem.
///
/// Trailing slashes are dropped from the result unless it is made of slashes
/// only, so `a//b` gives `a` and `/b` gives `/`. A bare name gives `""`.
pub fn dir_key(path: &str) -> &str {
    let head = match path.rfind('/') {
        Some(i) => &path[..=i],
        None => return "",
    };

    match head.trim_end_matches('/') {
        "" => head,
        trimmed => trimmed,
    }
}

/// Occurrence count per directory, in first-seen order.
#[derive(Debug, Default)]
pub struct Tally {
    counts: IndexMap<String, u64>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, dir: &str) {
        match self.counts.get_mut(dir) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(dir.to_string(), 1);
            }
        }
    }

    pub fn get(&self, dir: &str) -> Option<u64> {
        self.counts.get(dir).copied()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of lines counted over all directories.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Reads `reader` to the end, counting every `case <path>` line.
    ///
    /// Stops at the first malformed case line. Calling this again keeps
    /// adding to the same counts.
    pub fn read_from(&mut self, reader: impl BufRead) -> Result<(), ReportError> {
        let mut lines = 0;
        let mut matched = 0;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            lines += 1;

            match parse_line(&line, index + 1)? {
                Some(path) => {
                    self.add(dir_key(path));
                    matched += 1;
                }
                None => trace!("skipping line {}: {:?}", index + 1, line),
            }
        }

        debug!("read {} lines, {} case lines", lines, matched);
        Ok(())
    }

    /// Entries by count, highest first. Equal counts keep first-seen order.
    pub fn most_common(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self
            .counts
            .iter()
            .map(|(dir, &count)| (dir.as_str(), count))
            .collect();
        entries.sort_by(|(_, a), (_, b)| b.cmp(a));
        entries
    }

    /// Report order: the reverse of [`Tally::most_common`].
    pub fn least_common(&self) -> Vec<(&str, u64)> {
        let mut entries = self.most_common();
        entries.reverse();
        entries
    }
}

pub fn write_report(mut out: impl Write, entries: &[(&str, u64)]) -> Result<(), ReportError> {
    for (dir, count) in entries {
        writeln!(out, "{:6} {}", count, dir)?;
    }
    Ok(())
}

/// Writes `entries` as one pretty-printed JSON object, keeping their order.
pub fn write_json(mut out: impl Write, entries: &[(&str, u64)]) -> Result<(), ReportError> {
    let object: IndexMap<&str, u64> = entries.iter().copied().collect();
    serde_json::to_writer_pretty(&mut out, &object)?;
    writeln!(out)?;
    Ok(())
}

//! JSON-lines event stream
//!
//! One [`EventRecord`] per line. Blank lines are skipped; a malformed line
//! stops the stream with its line number.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::source::EventRecord;

/// Parse one input line. Returns `Ok(None)` for blank lines.
pub fn parse_event_line(line: &str) -> Result<Option<EventRecord>> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let event = serde_json::from_str(trimmed).context("Failed to parse event JSON")?;
    Ok(Some(event))
}

/// Iterator over the events of a JSON-lines stream
pub struct EventReader<B> {
    lines: io::Lines<B>,
    line_no: usize,
}

impl<B: BufRead> EventReader<B> {
    pub fn new(reader: B) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    /// Line number of the most recently read line (1-based)
    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

impl EventReader<Box<dyn BufRead>> {
    /// Open an event file; `-` reads standard input
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader: Box<dyn BufRead> = if path.as_os_str() == "-" {
            Box::new(BufReader::new(io::stdin()))
        } else {
            let file = File::open(path)
                .with_context(|| format!("Failed to open event file: {}", path.display()))?;
            Box::new(BufReader::new(file))
        };
        Ok(Self::new(reader))
    }
}

impl<B: BufRead> Iterator for EventReader<B> {
    type Item = Result<EventRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;
            let line = match line.with_context(|| format!("Failed to read line {}", self.line_no)) {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            match parse_event_line(&line) {
                Ok(Some(event)) => return Some(Ok(event)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e.context(format!("Invalid event on line {}", self.line_no)))),
            }
        }
    }
}

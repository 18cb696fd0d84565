//! Histogram output sinks
//!
//! A sink is opened once at setup, receives each booked histogram once at
//! finalize, and is then closed. Failure to open or write surfaces at that
//! boundary; per-event processing never touches the sink.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::AnalysisError;
use crate::histogram::Histogram1D;

/// Persistence target for booked histograms
pub trait OutputSink<H = Histogram1D> {
    fn open(&mut self) -> Result<(), AnalysisError>;
    fn write(&mut self, histogram: &H) -> Result<(), AnalysisError>;
    fn close(&mut self) -> Result<(), AnalysisError>;

    /// Release the target after an aborted run. Sinks that write to a file
    /// remove it so a partial result is never mistaken for a complete one.
    fn abort(&mut self) -> Result<(), AnalysisError> {
        self.close()
    }
}

impl<H, S: OutputSink<H> + ?Sized> OutputSink<H> for Box<S> {
    fn open(&mut self) -> Result<(), AnalysisError> {
        (**self).open()
    }

    fn write(&mut self, histogram: &H) -> Result<(), AnalysisError> {
        (**self).write(histogram)
    }

    fn close(&mut self) -> Result<(), AnalysisError> {
        (**self).close()
    }

    fn abort(&mut self) -> Result<(), AnalysisError> {
        (**self).abort()
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    histograms: &'a [Histogram1D],
}

/// Writes all histograms as one JSON document when closed
#[derive(Debug)]
pub struct JsonSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    histograms: Vec<Histogram1D>,
}

impl JsonSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            writer: None,
            histograms: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OutputSink for JsonSink {
    fn open(&mut self) -> Result<(), AnalysisError> {
        let file = File::create(&self.path)?;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }

    fn write(&mut self, histogram: &Histogram1D) -> Result<(), AnalysisError> {
        self.histograms.push(histogram.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), AnalysisError> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        let doc = JsonDocument {
            histograms: &self.histograms,
        };
        serde_json::to_writer_pretty(&mut writer, &doc)
            .map_err(|e| AnalysisError::Serialize(e.to_string()))?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    fn abort(&mut self) -> Result<(), AnalysisError> {
        self.histograms.clear();
        if self.writer.take().is_some() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Writes one row per bin: `histogram,bin,low,high,content`
///
/// Underflow and overflow are emitted as rows named `underflow` and
/// `overflow` with open edges.
#[derive(Debug)]
pub struct CsvSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl CsvSink {
    pub const HEADER: &'static str = "histogram,bin,low,high,content";

    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            writer: None,
        }
    }

    /// Escape CSV field (handle commas, quotes, newlines)
    fn escape_field(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }

    /// Format a histogram as CSV rows, without the header
    pub fn format_rows(histogram: &Histogram1D) -> String {
        let name = Self::escape_field(&histogram.name);
        let mut out = String::new();
        out.push_str(&format!(
            "{},underflow,,{},{}\n",
            name, histogram.min, histogram.underflow
        ));
        for (i, content) in histogram.contents.iter().enumerate() {
            out.push_str(&format!(
                "{},{},{},{},{}\n",
                name,
                i,
                histogram.bin_low_edge(i),
                histogram.bin_low_edge(i + 1),
                content
            ));
        }
        out.push_str(&format!(
            "{},overflow,{},,{}\n",
            name, histogram.max, histogram.overflow
        ));
        out
    }
}

impl OutputSink for CsvSink {
    fn open(&mut self) -> Result<(), AnalysisError> {
        let mut writer = BufWriter::new(File::create(&self.path)?);
        writeln!(writer, "{}", Self::HEADER)?;
        self.writer = Some(writer);
        Ok(())
    }

    fn write(&mut self, histogram: &Histogram1D) -> Result<(), AnalysisError> {
        let writer = self.writer.as_mut().ok_or(AnalysisError::InvalidState {
            expected: "open sink",
            found: "closed sink",
        })?;
        writer.write_all(Self::format_rows(histogram).as_bytes())?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), AnalysisError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn abort(&mut self) -> Result<(), AnalysisError> {
        if self.writer.take().is_some() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// Keeps written histograms in memory
///
/// Also counts open/close calls so callers can check the sink was released.
#[derive(Debug, Clone)]
pub struct MemorySink<H = Histogram1D> {
    pub written: Vec<H>,
    pub opens: usize,
    pub closes: usize,
}

impl<H> Default for MemorySink<H> {
    fn default() -> Self {
        Self {
            written: Vec::new(),
            opens: 0,
            closes: 0,
        }
    }
}

impl<H> MemorySink<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.opens > self.closes
    }
}

impl<H: Clone> OutputSink<H> for MemorySink<H> {
    fn open(&mut self) -> Result<(), AnalysisError> {
        self.opens += 1;
        Ok(())
    }

    fn write(&mut self, histogram: &H) -> Result<(), AnalysisError> {
        self.written.push(histogram.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), AnalysisError> {
        self.closes += 1;
        Ok(())
    }
}

//! JSON report output
//!
//! Writes the whole crawl report as one JSON document so a persistence or
//! reporting system can pick it up.

use crate::output::traits::{CrawlReport, OutputResult, ResultSink};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes crawl reports as JSON
pub struct JsonSink<W: Write> {
    out: W,
    pretty: bool,
}

impl JsonSink<BufWriter<File>> {
    /// Creates a sink writing to a file, replacing any existing file
    pub fn create(path: &Path) -> OutputResult<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out, pretty: true }
    }

    /// Writes compact JSON instead of indented JSON
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for JsonSink<W> {
    fn write_report(&mut self, report: &CrawlReport) -> OutputResult<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, report)?;
        } else {
            serde_json::to_writer(&mut self.out, report)?;
        }
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

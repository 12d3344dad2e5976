//! Plain-text report for terminals

use crate::output::traits::{CrawlReport, OutputResult, ResultSink};
use std::io::Write;

/// Prints a crawl report as plain text
///
/// Broken links are always listed with their diagnosis and fix guide. Working
/// links are listed only when `show_ok` is set.
pub struct ConsoleSink<W: Write> {
    out: W,
    show_ok: bool,
}

impl ConsoleSink<std::io::Stdout> {
    /// Creates a sink writing to stdout
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            show_ok: false,
        }
    }

    /// Also lists links that are not broken
    pub fn show_ok(mut self, show_ok: bool) -> Self {
        self.show_ok = show_ok;
        self
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ResultSink for ConsoleSink<W> {
    fn write_report(&mut self, report: &CrawlReport) -> OutputResult<()> {
        let summary = &report.summary;
        let duration_ms = report.duration().num_milliseconds().max(0);

        writeln!(self.out, "=== Link Check: {} ===", report.start_url)?;
        writeln!(
            self.out,
            "Pages crawled: {} in {:.1}s{}",
            report.pages_crawled,
            duration_ms as f64 / 1000.0,
            if report.cancelled { " (cancelled)" } else { "" }
        )?;
        writeln!(self.out)?;

        for result in &report.results {
            if result.is_broken() {
                writeln!(self.out, "✗ {} [{}]", result.link, result.status_label())?;
                writeln!(self.out, "    found on: {}", result.source_page)?;
                if let Some(diagnosis) = result.diagnosis {
                    writeln!(self.out, "    {}", diagnosis)?;
                }
                if !result.fix_guide.is_empty() {
                    writeln!(self.out, "    fix: {}", result.fix_guide)?;
                }
            } else if self.show_ok {
                writeln!(self.out, "✓ {} [{}]", result.link, result.status_label())?;
            }
        }

        writeln!(self.out)?;
        writeln!(
            self.out,
            "Summary: {} links checked, {} broken ({:.1}%)",
            summary.total_links,
            summary.broken_links,
            summary.broken_rate()
        )?;
        writeln!(
            self.out,
            "  internal: {}, external: {}",
            summary.internal_links, summary.external_links
        )?;

        if !summary.by_diagnosis.is_empty() {
            // Sort by count (descending)
            let mut counts: Vec<_> = summary.by_diagnosis.iter().collect();
            counts.sort_by(|a, b| b.1.cmp(a.1));

            writeln!(self.out, "Diagnoses:")?;
            for (diagnosis, count) in counts {
                writeln!(self.out, "  {}: {}", diagnosis, count)?;
            }
        }

        self.out.flush()?;
        Ok(())
    }
}

//! Summary statistics derived from crawl results

use crate::crawler::Diagnosis;
use crate::state::{LinkResult, LinkType};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary statistics for a crawl
///
/// Always derived from a result sequence, never stored on its own.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSummary {
    /// Number of checked links
    pub total_links: u64,

    /// Links with no response or a status of 400 and above
    pub broken_links: u64,

    pub internal_links: u64,

    pub external_links: u64,

    /// Diagnosed results by diagnosis
    pub by_diagnosis: BTreeMap<Diagnosis, u64>,
}

impl CrawlSummary {
    /// Derives the summary of a result sequence
    pub fn from_results(results: &[LinkResult]) -> Self {
        let mut summary = Self::default();

        for result in results {
            summary.total_links += 1;

            if result.is_broken() {
                summary.broken_links += 1;
            }

            match result.link_type {
                LinkType::Internal => summary.internal_links += 1,
                LinkType::External => summary.external_links += 1,
            }

            if let Some(diagnosis) = result.diagnosis {
                *summary.by_diagnosis.entry(diagnosis).or_insert(0) += 1;
            }
        }

        summary
    }

    /// Share of broken links as a percentage
    pub fn broken_rate(&self) -> f64 {
        if self.total_links == 0 {
            return 0.0;
        }
        (self.broken_links as f64 / self.total_links as f64) * 100.0
    }
}

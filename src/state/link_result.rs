use crate::crawler::Diagnosis;
use serde::{Serialize, Serializer};
use std::fmt;

/// Whether a link stays on the crawled site
///
/// Always decided against the crawl root, never against the page the link
/// was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Internal,
    External,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Internal => "internal",
            LinkType::External => "external",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of checking one link found on one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResult {
    /// Page the link was found on
    pub source_page: String,

    /// The checked target
    pub link: String,

    /// HTTP status of the final response; `None` when no response arrived
    pub status_code: Option<u16>,

    /// Reason phrase, or the transport error when there was no response
    pub status_text: String,

    pub link_type: LinkType,

    /// A redirect along the way pointed at a login page
    pub redirected_to_login: bool,

    /// Written out as the human-readable message, e.g. `Not found – broken or moved link.`
    #[serde(serialize_with = "serialize_diagnosis")]
    pub diagnosis: Option<Diagnosis>,

    /// Suggested remediation, paired with the diagnosis
    pub fix_guide: String,
}

impl LinkResult {
    /// Returns true if the link counts as broken
    ///
    /// A link is broken when no response arrived or the status is 400 or above.
    pub fn is_broken(&self) -> bool {
        match self.status_code {
            Some(code) => code >= 400,
            None => true,
        }
    }

    /// Human-readable status, e.g. `404 Not Found` or `- connection refused`
    pub fn status_label(&self) -> String {
        match self.status_code {
            Some(code) => format!("{} {}", code, self.status_text),
            None => format!("- {}", self.status_text),
        }
    }
}

fn serialize_diagnosis<S: Serializer>(
    diagnosis: &Option<Diagnosis>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match diagnosis {
        Some(diagnosis) => serializer.serialize_some(diagnosis.message()),
        None => serializer.serialize_none(),
    }
}

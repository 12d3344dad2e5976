/// Decides which links a crawl never touches
///
/// Two kinds of rules are combined:
/// 1. Exclude paths: user-supplied substrings, matched case-sensitively
///    against the full link (`"/admin"` excludes `https://site/admin/users`)
/// 2. Ignore patterns: substrings matched case-insensitively, shipped with a
///    default set of contact schemes and social networks
///
/// A link matching either kind is neither checked nor traversed.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    exclude_paths: Vec<String>,
    ignore_patterns: Vec<String>,
}

impl ExclusionRules {
    /// Creates rules from exclude substrings and ignore patterns
    ///
    /// # Examples
    ///
    /// ```
    /// use linksweep::url::ExclusionRules;
    ///
    /// let rules = ExclusionRules::new(
    ///     vec!["/logout".to_string()],
    ///     vec!["mailto:".to_string()],
    /// );
    /// assert!(rules.is_excluded("https://example.com/logout"));
    /// assert!(rules.is_excluded("MAILTO:someone@example.com"));
    /// assert!(!rules.is_excluded("https://example.com/about"));
    /// ```
    pub fn new(exclude_paths: Vec<String>, ignore_patterns: Vec<String>) -> Self {
        Self {
            exclude_paths,
            ignore_patterns: ignore_patterns
                .into_iter()
                .map(|p| p.to_lowercase())
                .collect(),
        }
    }

    /// Returns true if the link must be skipped
    pub fn is_excluded(&self, link: &str) -> bool {
        if self.exclude_paths.iter().any(|p| link.contains(p.as_str())) {
            return true;
        }

        let lowered = link.to_lowercase();
        self.ignore_patterns
            .iter()
            .any(|p| lowered.contains(p.as_str()))
    }
}

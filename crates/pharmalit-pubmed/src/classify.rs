//! Affiliation classification by keyword policy
//!
//! An affiliation string is matched, lower-cased, against two ordered
//! keyword lists. Exclusion keywords are checked first: any hit makes the
//! affiliation [`AffiliationCategory::Academic`] even when a company keyword
//! also matches ("Pfizer Institute for Cancer Research" is academic).
//! Matching is plain substring search with no word boundaries.

/// Outcome of classifying one affiliation string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AffiliationCategory {
    Company,
    Academic,
    Unknown,
}

/// Two ordered sets of lowercase substrings.
#[derive(Debug, Clone, Copy)]
pub struct KeywordPolicy {
    /// Checked first; any hit means academic/clinical
    pub exclusion: &'static [&'static str],
    /// Checked only when no exclusion keyword matched
    pub company: &'static [&'static str],
}

impl KeywordPolicy {
    pub const DEFAULT: Self = Self {
        exclusion: &[
            "university",
            "college",
            "institute",
            "school",
            "department",
            "faculty",
            "hospital",
            "clinic",
            "medical center",
            "foundation",
            "society",
        ],
        company: &[
            "pharma",
            "pharmaceutical",
            "biotech",
            "biotechnology",
            "inc.",
            "ltd.",
            "llc",
            "corp.",
            "corporation",
            "therapeutics",
            "biopharm",
            "medicines",
            "drugs",
            "laboratories",
            "technologies",
            "gmbh",
            "plc",
        ],
    };

    /// Classify an affiliation string under this policy.
    pub fn classify(&self, affiliation: Option<&str>) -> AffiliationCategory {
        let Some(text) = affiliation.map(str::trim).filter(|t| !t.is_empty()) else {
            return AffiliationCategory::Unknown;
        };
        let text = text.to_lowercase();

        if let Some(keyword) = first_match(&text, self.exclusion) {
            log::trace!("'{text}' academic via '{keyword}'");
            AffiliationCategory::Academic
        } else if let Some(keyword) = first_match(&text, self.company) {
            log::trace!("'{text}' company via '{keyword}'");
            AffiliationCategory::Company
        } else {
            AffiliationCategory::Unknown
        }
    }
}

impl Default for KeywordPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn first_match<'k>(text: &str, keywords: &[&'k str]) -> Option<&'k str> {
    keywords.iter().copied().find(|k| text.contains(k))
}

/// Classify with [`KeywordPolicy::DEFAULT`].
pub fn classify(affiliation: Option<&str>) -> AffiliationCategory {
    KeywordPolicy::DEFAULT.classify(affiliation)
}

//! Normalize a parsed article into a [`Paper`]
//!
//! Extraction is total over any article that has a PMID: missing title,
//! date, names or emails degrade to fixed fallbacks instead of failing.
//! Whether a paper has industry authors is decided by the caller.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::classify::{AffiliationCategory, KeywordPolicy};
use crate::parser::{Author, PubmedArticle};

pub const DATE_UNAVAILABLE: &str = "Date Unavailable";
pub const EMAIL_NOT_FOUND: &str = "Email Unable to Retrieve";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("invalid email regex")
});

/// Normalized output record, one per source article
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    pub pubmed_id: String,
    pub title: String,
    pub publication_date: String,
    /// Names of authors whose affiliation classified as company
    pub non_academic_authors: Vec<String>,
    /// Distinct affiliations of those authors, first-seen order
    pub company_affiliations: Vec<String>,
    /// First email found in any affiliation, or [`EMAIL_NOT_FOUND`]
    pub corresponding_email: String,
}

impl Paper {
    pub fn has_industry_authors(&self) -> bool {
        !self.non_academic_authors.is_empty()
    }

    pub fn has_email(&self) -> bool {
        self.corresponding_email != EMAIL_NOT_FOUND
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("article has no PMID")]
    MissingIdentifier,
}

/// Extract with [`KeywordPolicy::DEFAULT`].
pub fn extract(article: &PubmedArticle) -> Result<Paper, ExtractError> {
    extract_with_policy(article, &KeywordPolicy::DEFAULT)
}

pub fn extract_with_policy(
    article: &PubmedArticle,
    policy: &KeywordPolicy,
) -> Result<Paper, ExtractError> {
    let pubmed_id = article.pmid.trim();
    if pubmed_id.is_empty() {
        return Err(ExtractError::MissingIdentifier);
    }

    let mut non_academic_authors = Vec::new();
    let mut company_affiliations: Vec<String> = Vec::new();

    for author in &article.authors {
        let affiliation = author.affiliations.first().map(String::as_str);
        let category = policy.classify(affiliation);
        let name = author_name(author);
        log::trace!("{pubmed_id}: {name} -> {category:?}");

        if category != AffiliationCategory::Company {
            continue;
        }
        if let Some(aff) = affiliation {
            if !company_affiliations.iter().any(|seen| seen == aff) {
                company_affiliations.push(aff.to_string());
            }
        }
        non_academic_authors.push(name);
    }

    let candidates = article
        .authors
        .iter()
        .flat_map(|a| a.affiliations.iter().map(String::as_str));

    Ok(Paper {
        pubmed_id: pubmed_id.to_string(),
        title: article.title.as_deref().map(str::trim).unwrap_or_default().to_string(),
        publication_date: format_publication_date(
            article.pub_year,
            article.pub_month,
            article.pub_day,
        ),
        non_academic_authors,
        company_affiliations,
        corresponding_email: first_email(candidates)
            .unwrap_or(EMAIL_NOT_FOUND)
            .to_string(),
    })
}

/// "ForeName LastName", whichever half exists, the collective name, or
/// [`UNKNOWN_AUTHOR`].
pub fn author_name(author: &Author) -> String {
    let parts: Vec<&str> = [author.fore_name.as_deref(), author.last_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if !parts.is_empty() {
        return parts.join(" ");
    }
    author
        .collective_name
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(UNKNOWN_AUTHOR)
        .to_string()
}

/// "Jan 15 2024", "Jan 2024", "2024" or [`DATE_UNAVAILABLE`].
///
/// A day is only shown when it forms a real calendar date with the month.
pub fn format_publication_date(year: Option<i32>, month: Option<u32>, day: Option<u32>) -> String {
    let Some(year) = year else {
        return DATE_UNAVAILABLE.to_string();
    };
    let Some((month, abbrev)) = month
        .filter(|m| (1..=12).contains(m))
        .map(|m| (m, MONTH_ABBREVIATIONS[m as usize - 1]))
    else {
        return year.to_string();
    };

    match day.and_then(|d| NaiveDate::from_ymd_opt(year, month, d)) {
        Some(date) => format!("{abbrev} {} {year}", date.format("%d")),
        None => format!("{abbrev} {year}"),
    }
}

/// First email-looking token across `candidates`, in iteration order.
pub fn first_email<'a>(candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    candidates
        .into_iter()
        .find_map(|text| EMAIL_RE.find(text).map(|m| m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author(fore: &str, last: &str, affiliations: &[&str]) -> Author {
        Author {
            fore_name: Some(fore.to_string()),
            last_name: Some(last.to_string()),
            affiliations: affiliations.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn article(pmid: &str, authors: Vec<Author>) -> PubmedArticle {
        PubmedArticle {
            pmid: pmid.to_string(),
            title: Some("A Study".to_string()),
            pub_year: Some(2024),
            pub_month: Some(1),
            pub_day: Some(15),
            authors,
        }
    }

    #[test]
    fn extracts_company_authors() {
        let a = article(
            "111",
            vec![
                author("Ann", "Lee", &["Acme Therapeutics Inc."]),
                author("Bob", "Ray", &["State University Hospital"]),
                author("Cy", "Dunn", &[]),
            ],
        );
        let paper = extract(&a).unwrap();

        assert_eq!(paper.pubmed_id, "111");
        assert_eq!(paper.title, "A Study");
        assert_eq!(paper.publication_date, "Jan 15 2024");
        assert_eq!(paper.non_academic_authors, vec!["Ann Lee"]);
        assert_eq!(paper.company_affiliations, vec!["Acme Therapeutics Inc."]);
        assert_eq!(paper.corresponding_email, EMAIL_NOT_FOUND);
        assert!(paper.has_industry_authors());
        assert!(!paper.has_email());
    }

    #[test]
    fn company_affiliations_are_deduplicated() {
        let a = article(
            "1",
            vec![
                author("A", "One", &["Genentech Inc., South San Francisco"]),
                author("B", "Two", &["Genentech Inc., South San Francisco"]),
                author("C", "Three", &["GENENTECH INC., South San Francisco"]),
            ],
        );
        let paper = extract(&a).unwrap();

        assert_eq!(paper.non_academic_authors.len(), 3);
        // Exact-string dedup only; casing is preserved
        assert_eq!(
            paper.company_affiliations,
            vec![
                "Genentech Inc., South San Francisco",
                "GENENTECH INC., South San Francisco"
            ]
        );
    }

    #[test]
    fn academic_affiliations_never_leak() {
        let a = article(
            "1",
            vec![
                author("A", "One", &["Harvard University"]),
                author("B", "Two", &["Moderna Therapeutics"]),
            ],
        );
        let paper = extract(&a).unwrap();
        assert_eq!(paper.company_affiliations, vec!["Moderna Therapeutics"]);
        assert!(!paper
            .company_affiliations
            .iter()
            .any(|a| a.contains("University")));
    }

    #[test]
    fn only_first_affiliation_is_classified() {
        let a = article(
            "1",
            vec![author("A", "One", &["Harvard University", "Pfizer Inc."])],
        );
        let paper = extract(&a).unwrap();
        assert!(!paper.has_industry_authors());
        assert!(paper.company_affiliations.is_empty());
    }

    #[test]
    fn paper_without_company_authors_is_still_returned() {
        let a = article("222", vec![author("A", "One", &["State University Hospital"])]);
        let paper = extract(&a).unwrap();
        assert_eq!(paper.pubmed_id, "222");
        assert!(!paper.has_industry_authors());
        assert!(paper.company_affiliations.is_empty());
    }

    #[test]
    fn missing_pmid_fails() {
        let a = article("  ", vec![]);
        assert_eq!(extract(&a), Err(ExtractError::MissingIdentifier));
    }

    #[test]
    fn missing_title_defaults_to_empty() {
        let mut a = article("1", vec![]);
        a.title = None;
        assert_eq!(extract(&a).unwrap().title, "");
    }

    #[test]
    fn email_first_in_document_order() {
        let a = article(
            "1",
            vec![
                author("A", "One", &["Harvard University. Electronic address: a.one@harvard.edu."]),
                author("B", "Two", &["Acme Pharma Ltd.", "Contact: b.two@acme.com"]),
            ],
        );
        let paper = extract(&a).unwrap();
        // Academic affiliations are scanned too
        assert_eq!(paper.corresponding_email, "a.one@harvard.edu");
        assert!(paper.has_email());
    }

    #[test]
    fn email_in_secondary_affiliation() {
        let a = article(
            "1",
            vec![
                author("A", "One", &["Acme Pharma Ltd."]),
                author("B", "Two", &["Biogen Inc.", "b.two@biogen.com"]),
            ],
        );
        assert_eq!(extract(&a).unwrap().corresponding_email, "b.two@biogen.com");
    }

    #[test]
    fn first_email_scan() {
        assert_eq!(first_email(["no email", "x@y.org and z@w.org"]), Some("x@y.org"));
        assert_eq!(first_email(["user@localhost"]), None);
        assert_eq!(first_email(Vec::<&str>::new()), None);
        assert_eq!(
            first_email(["first.last+tag@sub.example.co.uk;"]),
            Some("first.last+tag@sub.example.co.uk")
        );
    }

    #[test]
    fn date_formats() {
        assert_eq!(format_publication_date(Some(2024), Some(1), Some(15)), "Jan 15 2024");
        assert_eq!(format_publication_date(Some(2024), Some(3), Some(5)), "Mar 05 2024");
        assert_eq!(format_publication_date(Some(2024), Some(1), None), "Jan 2024");
        assert_eq!(format_publication_date(Some(2024), None, None), "2024");
        assert_eq!(format_publication_date(Some(2024), None, Some(15)), "2024");
        assert_eq!(format_publication_date(None, Some(1), Some(15)), DATE_UNAVAILABLE);
        assert_eq!(format_publication_date(None, None, None), "Date Unavailable");
    }

    #[test]
    fn invalid_day_degrades_to_month() {
        assert_eq!(format_publication_date(Some(2023), Some(2), Some(30)), "Feb 2023");
        assert_eq!(format_publication_date(Some(2023), Some(13), Some(1)), "2023");
    }

    #[test]
    fn author_name_fallbacks() {
        let full = author("Jane", "Doe", &[]);
        assert_eq!(author_name(&full), "Jane Doe");

        let last_only = Author {
            last_name: Some("Doe".to_string()),
            ..Default::default()
        };
        assert_eq!(author_name(&last_only), "Doe");

        let group = Author {
            collective_name: Some("ACME Study Group".to_string()),
            ..Default::default()
        };
        assert_eq!(author_name(&group), "ACME Study Group");

        assert_eq!(author_name(&Author::default()), UNKNOWN_AUTHOR);
    }

    #[test]
    fn unnamed_company_author_is_kept() {
        let anonymous = Author {
            affiliations: vec!["Acme Pharma".to_string()],
            ..Default::default()
        };
        let paper = extract(&article("1", vec![anonymous])).unwrap();
        assert_eq!(paper.non_academic_authors, vec![UNKNOWN_AUTHOR]);
    }
}

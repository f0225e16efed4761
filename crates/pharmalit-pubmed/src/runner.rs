//! Search → fetch → extract → filter

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use pharmalit_core::ProgressContext;

use crate::eutils::LiteratureSource;
use crate::extract::{Paper, extract};

/// Outcome of one query
#[derive(Debug)]
pub struct Summary {
    /// PMIDs returned by the search
    pub searched: usize,
    /// Articles present in the fetch response
    pub fetched: usize,
    /// Articles dropped because they had no PMID
    pub skipped: usize,
    /// Papers with at least one company-affiliated author, in efetch response order
    pub papers: Vec<Paper>,
    pub elapsed: Duration,
}

impl Summary {
    /// Matched papers with a corresponding email
    pub fn with_email(&self) -> usize {
        self.papers.iter().filter(|p| p.has_email()).count()
    }
}

/// Run one query end to end.
///
/// Fails fast on an empty query, before any request. API errors abort the
/// run; per-article extraction problems only skip that article.
pub fn run(
    source: &impl LiteratureSource,
    query: &str,
    max_results: usize,
    progress: &ProgressContext,
) -> Result<Summary> {
    let start = Instant::now();
    let query = query.trim();
    anyhow::ensure!(!query.is_empty(), "query must not be empty");

    let stage = progress.stage_line("search");
    stage.set_message(format!("'{query}'"));
    let ids = source
        .search(query, max_results)
        .context("PubMed search failed");
    stage.finish_and_clear();
    let ids = ids?;

    if ids.is_empty() {
        log::info!("No PubMed results for '{query}'");
        return Ok(Summary {
            searched: 0,
            fetched: 0,
            skipped: 0,
            papers: Vec::new(),
            elapsed: start.elapsed(),
        });
    }

    let stage = progress.stage_line("fetch");
    stage.set_message(format!("{} articles", ids.len()));
    let articles = source
        .fetch_details(&ids)
        .context("PubMed fetch failed");
    stage.finish_and_clear();
    let articles = articles?;

    let mut skipped = 0;
    let papers: Vec<Paper> = articles
        .iter()
        .filter_map(|article| match extract(article) {
            Ok(paper) => Some(paper),
            Err(e) => {
                skipped += 1;
                log::warn!("Skipping article: {e}");
                None
            }
        })
        .filter(|paper| {
            let keep = paper.has_industry_authors();
            if !keep {
                log::debug!("{}: no company-affiliated authors", paper.pubmed_id);
            }
            keep
        })
        .collect();

    let summary = Summary {
        searched: ids.len(),
        fetched: articles.len(),
        skipped,
        papers,
        elapsed: start.elapsed(),
    };

    log::info!(
        "Searched {}, fetched {}, matched {} ({} with email, {} skipped) in {:.1}s",
        summary.searched,
        summary.fetched,
        summary.papers.len(),
        summary.with_email(),
        summary.skipped,
        summary.elapsed.as_secs_f64()
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use pharmalit_core::ApiError;

    use crate::parser::{Author, PubmedArticle};

    /// In-memory source recording the calls it receives
    #[derive(Default)]
    struct FakeSource {
        ids: Vec<String>,
        articles: Vec<PubmedArticle>,
        fail_fetch: bool,
        calls: RefCell<Vec<String>>,
    }

    impl LiteratureSource for FakeSource {
        fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, ApiError> {
            self.calls
                .borrow_mut()
                .push(format!("search:{query}:{max_results}"));
            Ok(self.ids.clone())
        }

        fn fetch_details(&self, ids: &[String]) -> Result<Vec<PubmedArticle>, ApiError> {
            self.calls.borrow_mut().push(format!("fetch:{}", ids.join(",")));
            if self.fail_fetch {
                return Err(ApiError::Upstream {
                    status: 502,
                    message: "Bad Gateway".to_string(),
                });
            }
            Ok(self.articles.clone())
        }
    }

    fn article(pmid: &str, affiliation: &str) -> PubmedArticle {
        PubmedArticle {
            pmid: pmid.to_string(),
            authors: vec![Author {
                fore_name: Some("Pat".to_string()),
                last_name: Some(format!("Author{pmid}")),
                affiliations: vec![affiliation.to_string()],
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn keeps_only_papers_with_company_authors() {
        let source = FakeSource {
            ids: vec!["111".into(), "222".into(), "333".into()],
            articles: vec![
                article("111", "Acme Therapeutics Inc."),
                article("222", "State University Hospital"),
                article("333", "Somewhere, Earth"),
            ],
            ..Default::default()
        };

        let summary = run(&source, "cancer therapy", 50, &ProgressContext::hidden()).unwrap();

        assert_eq!(summary.searched, 3);
        assert_eq!(summary.fetched, 3);
        assert_eq!(summary.papers.len(), 1);
        assert_eq!(summary.papers[0].pubmed_id, "111");
        assert_eq!(
            *source.calls.borrow(),
            vec!["search:cancer therapy:50", "fetch:111,222,333"]
        );
    }

    #[test]
    fn papers_follow_fetch_order() {
        let mut with_email = article("222", "Beta Biotech Inc.");
        with_email.authors[0]
            .affiliations
            .push("contact: pat@beta.example.com".to_string());
        let source = FakeSource {
            ids: vec!["111".into(), "222".into()],
            articles: vec![with_email, article("111", "Acme Pharma")],
            ..Default::default()
        };

        let summary = run(&source, "q", 10, &ProgressContext::hidden()).unwrap();
        let ids: Vec<&str> = summary.papers.iter().map(|p| p.pubmed_id.as_str()).collect();
        assert_eq!(ids, vec!["222", "111"]);
        assert_eq!(summary.with_email(), 1);
    }

    #[test]
    fn empty_query_makes_no_calls() {
        let source = FakeSource::default();
        let err = run(&source, "   ", 50, &ProgressContext::hidden()).unwrap_err();
        assert!(err.to_string().contains("empty"));
        assert!(source.calls.borrow().is_empty());
    }

    #[test]
    fn no_search_results_skips_fetch() {
        let source = FakeSource::default();
        let summary = run(&source, "nothing", 10, &ProgressContext::hidden()).unwrap();
        assert!(summary.papers.is_empty());
        assert_eq!(*source.calls.borrow(), vec!["search:nothing:10"]);
    }

    #[test]
    fn articles_without_pmid_are_skipped() {
        let source = FakeSource {
            ids: vec!["1".into()],
            articles: vec![article("", "Acme Pharma"), article("1", "Acme Pharma")],
            ..Default::default()
        };
        let summary = run(&source, "q", 10, &ProgressContext::hidden()).unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.papers.len(), 1);
    }

    #[test]
    fn fetch_error_propagates() {
        let source = FakeSource {
            ids: vec!["1".into()],
            fail_fetch: true,
            ..Default::default()
        };
        let err = run(&source, "q", 10, &ProgressContext::hidden()).unwrap_err();
        let api = err.downcast_ref::<ApiError>().expect("ApiError in chain");
        assert_eq!(api.status(), Some(502));
    }
}

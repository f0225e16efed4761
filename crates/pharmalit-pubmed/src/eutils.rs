//! NCBI E-utilities client: esearch for PMIDs, efetch for article XML.
//!
//! Every request goes through the client's [`RateLimiter`]. Nothing is
//! retried; failures surface as [`ApiError`].

use pharmalit_core::{ApiError, RateLimiter, build_client, get_text};
use serde::Deserialize;

use crate::config::{Config, MAX_RESULTS_CAP};
use crate::parser::{PubmedArticle, parse_pubmed_xml};

const USER_AGENT: &str = concat!("pharmalit/", env!("CARGO_PKG_VERSION"));

/// Major pharma/biotech names searched in the affiliation field
const MAJOR_COMPANIES: &[&str] = &[
    "pfizer",
    "moderna",
    "johnson johnson",
    "merck",
    "novartis",
    "roche",
    "bristol myers",
    "abbvie",
    "gilead",
    "amgen",
    "biogen",
    "regeneron",
    "eli lilly",
    "gsk",
    "glaxosmithkline",
    "astrazeneca",
    "sanofi",
    "takeda",
    "bayer",
    "boehringer ingelheim",
    "vertex",
    "celgene",
];

/// Generic company indicators, already field-tagged where needed
const COMPANY_TERMS: &[&str] = &[
    "pharmaceutical[ad]",
    "pharmaceuticals[ad]",
    "pharma[ad]",
    "biotech[ad]",
    "biotechnology[ad]",
    "therapeutics[ad]",
    "biopharmaceutical[ad]",
    "inc[ad]",
    "ltd[ad]",
    "corp[ad]",
    "corporation[ad]",
    "company[ad]",
    "laboratories[ad]",
    "lab[ad]",
];

const ACADEMIC_TERMS: &[&str] = &[
    "university",
    "college",
    "institute",
    "hospital",
    "medical center",
    "department",
    "school",
];

/// The two remote operations the pipeline depends on.
pub trait LiteratureSource {
    /// Ordered PMIDs matching `query`, at most `max_results`.
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, ApiError>;

    /// Parsed articles for `ids`. Unknown IDs are simply absent.
    fn fetch_details(&self, ids: &[String]) -> Result<Vec<PubmedArticle>, ApiError>;
}

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    idlist: Option<Vec<String>>,
    #[serde(rename = "ERROR", default)]
    error: Option<String>,
}

/// Blocking E-utilities client with its own rate limiter
#[derive(Debug)]
pub struct EutilsClient {
    config: Config,
    http: reqwest::Client,
    limiter: RateLimiter,
}

impl EutilsClient {
    pub fn new(config: Config) -> Result<Self, ApiError> {
        let http = build_client(config.timeout, USER_AGENT)?;
        let limiter = RateLimiter::new(config.min_interval);
        Ok(Self {
            config,
            http,
            limiter,
        })
    }

    /// Replace the rate limiter (e.g. one driven by a test clock).
    pub fn with_rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{name}", self.config.base_url.trim_end_matches('/'))
    }

    /// NCBI identification params shared by every request
    fn common_params(&self) -> Vec<(&str, &str)> {
        let mut params = vec![("db", "pubmed"), ("tool", self.config.tool.as_str())];
        if let Some(email) = &self.config.email {
            params.push(("email", email.as_str()));
        }
        if let Some(key) = &self.config.api_key {
            params.push(("api_key", key.as_str()));
        }
        params
    }

    fn get(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<String, ApiError> {
        let url = self.endpoint(endpoint);
        log::debug!("GET {url} {}", redacted(params));
        self.limiter.acquire();
        let body = get_text(&self.http, &url, params)?;
        log::debug!("{endpoint}: {} bytes", body.len());
        Ok(body)
    }
}

impl LiteratureSource for EutilsClient {
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>, ApiError> {
        let term = if self.config.prefilter {
            let enhanced = build_company_filtered_query(query);
            log::debug!("Enhanced query: {enhanced}");
            enhanced
        } else {
            query.to_string()
        };
        let retmax = max_results.clamp(1, MAX_RESULTS_CAP).to_string();

        let mut params = self.common_params();
        params.extend([
            ("term", term.as_str()),
            ("retmax", retmax.as_str()),
            ("retmode", "json"),
            ("sort", "relevance"),
        ]);

        let body = self.get("esearch.fcgi", &params)?;
        let ids = parse_search_response(&body)?;
        log::info!("Found {} papers for query: '{query}'", ids.len());
        Ok(ids)
    }

    fn fetch_details(&self, ids: &[String]) -> Result<Vec<PubmedArticle>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let id_list = ids.join(",");

        let mut params = self.common_params();
        params.extend([("id", id_list.as_str()), ("retmode", "xml")]);

        let body = self.get("efetch.fcgi", &params)?;
        let articles =
            parse_pubmed_xml(&body).map_err(|e| ApiError::Malformed(format!("{e:#}")))?;
        log::debug!("Fetched {}/{} articles", articles.len(), ids.len());
        Ok(articles)
    }
}

/// Extract the ordered ID list from an esearch JSON body.
fn parse_search_response(body: &str) -> Result<Vec<String>, ApiError> {
    let response: ESearchResponse = serde_json::from_str(body)
        .map_err(|e| ApiError::Malformed(format!("invalid esearch JSON: {e}")))?;

    match response.esearchresult {
        ESearchResult {
            idlist: Some(ids), ..
        } => Ok(ids),
        ESearchResult {
            error: Some(msg), ..
        } => Err(ApiError::Malformed(format!("esearch error: {msg}"))),
        _ => Err(ApiError::Malformed("esearch result has no idlist".to_string())),
    }
}

/// Wrap `query` in a PubMed affiliation-field (`[ad]`) filter for company
/// terms, excluding common academic terms.
pub fn build_company_filtered_query(query: &str) -> String {
    let company = MAJOR_COMPANIES
        .iter()
        .map(|c| format!("\"{c}\"[ad]"))
        .chain(COMPANY_TERMS.iter().map(|t| t.to_string()))
        .collect::<Vec<_>>()
        .join(" OR ");
    let academic = ACADEMIC_TERMS
        .iter()
        .map(|t| format!("\"{t}\"[ad]"))
        .collect::<Vec<_>>()
        .join(" OR ");

    format!("({query}) AND ({company}) NOT ({academic})")
}

/// Query params for logging, with the API key masked
fn redacted(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| {
            if *k == "api_key" {
                format!("{k}=***")
            } else {
                format!("{k}={v}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

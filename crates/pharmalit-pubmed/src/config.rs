//! PubMed client configuration

use std::time::Duration;

use pharmalit_core::DEFAULT_MIN_INTERVAL;

/// Hard cap on IDs requested from esearch
pub const MAX_RESULTS_CAP: usize = 50;

/// Runtime configuration for the E-utilities client
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the E-utilities endpoints (esearch.fcgi / efetch.fcgi live below it)
    pub base_url: String,
    /// Maximum IDs to request from esearch (clamped to [`MAX_RESULTS_CAP`])
    pub max_results: usize,
    /// NCBI `tool` identification parameter
    pub tool: String,
    /// NCBI `email` identification parameter
    pub email: Option<String>,
    /// NCBI API key (raises the allowed request rate)
    pub api_key: Option<String>,
    /// Overall per-request timeout
    pub timeout: Duration,
    /// Minimum spacing between requests
    pub min_interval: Duration,
    /// Wrap the query in a company-affiliation field filter
    pub prefilter: bool,
}

impl Config {
    /// `max_results` clamped into `1..=MAX_RESULTS_CAP`
    pub fn effective_max_results(&self) -> usize {
        self.max_results.clamp(1, MAX_RESULTS_CAP)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "https://eutils.ncbi.nlm.nih.gov/entrez/eutils".to_string(),
            max_results: MAX_RESULTS_CAP,
            tool: "pharmalit".to_string(),
            email: None,
            api_key: None,
            timeout: Duration::from_secs(30),
            min_interval: DEFAULT_MIN_INTERVAL,
            prefilter: false,
        }
    }
}

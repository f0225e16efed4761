//! Pharmalit PubMed - find industry-authored papers on PubMed
//!
//! Searches PubMed through NCBI E-utilities, fetches article metadata and
//! keeps papers with at least one author affiliated with a pharmaceutical
//! or biotech company.
//!
//! # Example
//!
//! ```ignore
//! use pharmalit_core::ProgressContext;
//! use pharmalit_pubmed::{Config, EutilsClient, run};
//!
//! let client = EutilsClient::new(Config::default())?;
//! let summary = run(&client, "cancer therapy", 20, &ProgressContext::hidden())?;
//! for paper in &summary.papers {
//!     println!("{} {}", paper.pubmed_id, paper.title);
//! }
//! ```

pub mod classify;
pub mod config;
pub mod eutils;
pub mod extract;
pub mod parser;
pub mod runner;

// Re-exports
pub use classify::{AffiliationCategory, KeywordPolicy, classify};
pub use config::{Config, MAX_RESULTS_CAP};
pub use eutils::{EutilsClient, LiteratureSource};
pub use extract::{DATE_UNAVAILABLE, EMAIL_NOT_FOUND, ExtractError, Paper, extract};
pub use runner::{Summary, run};

//! Pharmalit Core - shared plumbing for literature API clients
//!
//! HTTP access with an explicit timeout, request spacing, the API error
//! taxonomy, logging and progress display.

pub mod error;
pub mod http;
pub mod logging;
pub mod progress;
pub mod rate_limit;

// Re-exports for convenience
pub use error::ApiError;
pub use http::{SHARED_RUNTIME, build_client, get_text};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::ProgressContext;
pub use rate_limit::{Clock, DEFAULT_MIN_INTERVAL, RateLimiter, SystemClock};

//! Blocking HTTP GET over a shared async client.
//!
//! Uses async reqwest internally on a shared tokio runtime,
//! but presents a sync interface so callers stay single-threaded.

use std::sync::LazyLock;
use std::time::Duration;

use crate::error::ApiError;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});

/// Build an HTTP client with an explicit overall request timeout.
pub fn build_client(timeout: Duration, user_agent: &str) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(ApiError::from_reqwest)
}

/// HTTP GET with query parameters, returning the body as text.
///
/// Non-2xx statuses become [`ApiError::Upstream`]; the body is not read.
pub fn get_text(
    client: &reqwest::Client,
    url: &str,
    params: &[(&str, &str)],
) -> Result<String, ApiError> {
    SHARED_RUNTIME.handle().block_on(async {
        let response = client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(ApiError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        response.text().await.map_err(|e| {
            // Body read failures carry no status; treat as transport problems
            ApiError::Transient(e.without_url().to_string())
        })
    })
}

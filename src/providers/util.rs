use crate::core::error::DataError;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Bounded retry with a fixed pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Retries an async operation while its error is retryable.
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `policy`: Total attempts and the delay between them
///
/// # Returns
/// Either the successful result or the error from the last attempt
pub async fn with_retry<F, Fut, T>(mut operation: F, policy: RetryPolicy) -> Result<T, DataError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DataError>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt >= attempts || !err.is_retryable() {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, attempts, err
                );
                attempt += 1;
                tokio::time::sleep(policy.delay).await;
            }
        }
    }
}

/// HTTP client that presents itself as a desktop browser.
pub fn browser_client(timeout: Duration) -> Result<reqwest::Client, DataError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/json,text/csv,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    reqwest::Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(DataError::from)
}

/// Sends a GET and returns the body of a successful response.
pub async fn get_text(client: &reqwest::Client, url: &str, id: &str) -> Result<String, DataError> {
    debug!("Requesting series data from {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DataError::Transport(format!("{e} for series: {id}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(DataError::Status {
            code: status.as_u16(),
            id: id.to_string(),
        });
    }

    response
        .text()
        .await
        .map_err(|e| DataError::Transport(format!("{e} for series: {id}")))
}

/// True when a data endpoint answered with an HTML page (consent wall, captcha) instead of data.
pub fn looks_blocked(body: &str) -> bool {
    let head: String = body
        .trim_start()
        .chars()
        .take(512)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with('<') || head.contains("<html") || head.contains("<!doctype")
}

//! # Bounded Transport Retry
//!
//! Retries a request-producing closure on connect and timeout errors with a
//! short doubling delay. API-level failures (any HTTP status) are not
//! retried here — classifying those is the caller's job.

use std::future::Future;
use std::time::Duration;

/// Maximum send attempts per request.
const MAX_ATTEMPTS: u32 = 3;

/// Delay before the first retry; doubles per attempt.
const INITIAL_DELAY: Duration = Duration::from_millis(100);

/// Send a request with bounded retry on transport-level failures.
pub(crate) async fn retry_send<F, Fut>(mut send: F) -> Result<reqwest::Response, reqwest::Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    let mut delay = INITIAL_DELAY;
    let mut attempt = 1;
    loop {
        match send().await {
            Ok(resp) => return Ok(resp),
            Err(e) if attempt < MAX_ATTEMPTS && (e.is_connect() || e.is_timeout()) => {
                tracing::warn!(attempt, error = %e, "transport error, retrying after {delay:?}");
                tokio::time::sleep(delay).await;
                delay *= 2;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

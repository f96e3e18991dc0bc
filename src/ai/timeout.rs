//! Request deadline helper
//!
//! Wraps a future in `tokio::time::timeout`. On expiry the inner future is
//! dropped, which aborts an in-flight HTTP request, and a
//! `ProviderTimeout` error is returned.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::with_timeout;
//!
//! let text = with_timeout(Duration::from_secs(30), async { /* request */ }).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::constants::provider as provider_constants;
use crate::types::{ReverieError, Result};

/// Fixed deadline for one provider request
pub fn default_request_timeout() -> Duration {
    Duration::from_secs(provider_constants::REQUEST_TIMEOUT_SECS)
}

/// Execute an async operation with a timeout
///
/// Returns `ReverieError::ProviderTimeout` if the operation doesn't complete
/// within the specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(ReverieError::timeout(timeout)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request_timeout() {
        assert_eq!(default_request_timeout().as_secs(), 30);
    }

    #[tokio::test]
    async fn test_with_timeout_success() {
        let result = with_timeout(Duration::from_secs(1), async {
            Ok::<_, ReverieError>(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_timeout_passes_inner_error_through() {
        let result: Result<u32> = with_timeout(Duration::from_secs(1), async {
            Err(ReverieError::ProviderEmptyResponse)
        })
        .await;
        assert!(matches!(result, Err(ReverieError::ProviderEmptyResponse)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_expires() {
        let result = with_timeout(Duration::from_secs(30), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, ReverieError>(42)
        })
        .await;
        assert!(matches!(
            result,
            Err(ReverieError::ProviderTimeout { duration }) if duration == Duration::from_secs(30)
        ));
    }
}

//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap the upstream call with a single deadline
//! - Cancel the call cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - The deadline covers connect, send and reading the full body
//! - Timed-out requests are reported like any other upstream failure

use std::future::Future;
use std::time::Duration;

use crate::error::ForwardError;

/// Run `call` under `deadline`, dropping it if the deadline passes first.
pub async fn with_deadline<F, T>(deadline: Duration, call: F) -> Result<T, ForwardError>
where
    F: Future<Output = Result<T, ForwardError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(ForwardError::Timeout(deadline)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_deadline(Duration::from_secs(1), async { Ok::<_, ForwardError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_passes_inner_error_through() {
        let result: Result<(), _> = with_deadline(Duration::from_secs(1), async {
            Err(ForwardError::Connect("refused".into()))
        })
        .await;
        assert!(matches!(result, Err(ForwardError::Connect(_))));
    }

    #[tokio::test]
    async fn test_expired_deadline_is_timeout() {
        let result: Result<(), _> = with_deadline(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        match result {
            Err(ForwardError::Timeout(d)) => assert_eq!(d, Duration::from_millis(50)),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}

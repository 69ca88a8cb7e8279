//! Helpers shared by use cases.

use std::future::Future;
use std::time::Duration;

use fw_core::ports::GatewayError;

/// Default upper bound for a single remote call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Run a remote call with a deadline; an elapsed deadline is a network failure.
pub(crate) async fn with_timeout<T, F>(
    operation: &str,
    timeout: Duration,
    call: F,
) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::timeout(operation)),
    }
}

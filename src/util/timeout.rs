//! Runtime-neutral future timeout.
//!
//! Native builds lean on `tokio::time`; the browser build races the future
//! against a `gloo-timers` timer since there is no tokio runtime there.

use std::future::Future;
use std::time::Duration;

/// Resolve `future`, or `None` if `limit` elapses first.
#[cfg(not(target_arch = "wasm32"))]
pub async fn with_timeout<F: Future>(limit: Duration, future: F) -> Option<F::Output> {
    tokio::time::timeout(limit, future).await.ok()
}

/// Resolve `future`, or `None` if `limit` elapses first.
#[cfg(target_arch = "wasm32")]
pub async fn with_timeout<F: Future>(limit: Duration, future: F) -> Option<F::Output> {
    use futures::future::{Either, select};

    let millis = u32::try_from(limit.as_millis()).unwrap_or(u32::MAX);
    let timer = gloo_timers::future::TimeoutFuture::new(millis);
    match select(Box::pin(future), timer).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(((), _)) => None,
    }
}

//! Polling an existence query until a durability condition holds
//!
//! Each poll is a full [`ExistsRequest`] through the executor, spaced by the
//! configured observe interval. The last snapshot is returned whatever ends
//! the loop.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ErrorKind;
use crate::protocol::commands::ObserveStatus;
use super::exists::{ExistsRequest, ExistsResponse};
use super::executor::Executor;
use super::transport::{Router, Transport};

/// Poll until `done` accepts a snapshot, the deadline passes, or `cancel` fires
///
/// A failed poll ends the loop with that failure. Running out of time or being
/// cancelled recontextualizes the last successful snapshot as
/// `UnambiguousTimeout` or `RequestCanceled`.
pub async fn poll_until<T, R, F>(
    executor: &Executor<T, R>,
    request: &ExistsRequest,
    timeout: Duration,
    cancel: &CancellationToken,
    mut done: F,
) -> ExistsResponse
where
    T: Transport,
    R: Router,
    F: FnMut(ObserveStatus) -> bool,
{
    let deadline = Instant::now() + timeout;
    let interval = executor.config().observe_poll_interval();
    let mut polls = 0u32;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        let attempt = request.clone().with_timeout(remaining.max(Duration::from_millis(1)));
        let snapshot = executor.execute(&attempt, cancel).await;
        polls += 1;

        if !snapshot.ctx.is_success() || done(snapshot.status) {
            tracing::debug!(
                "Observe poll for {} finished after {} polls: {:?}",
                request.id,
                polls,
                snapshot.status
            );
            return snapshot;
        }

        if Instant::now() + interval >= deadline {
            return end_with(snapshot, ErrorKind::UnambiguousTimeout);
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = cancel.cancelled() => return end_with(snapshot, ErrorKind::RequestCanceled),
        }
    }
}

/// Poll until the document is on disk
pub async fn poll_until_persisted<T: Transport, R: Router>(
    executor: &Executor<T, R>,
    request: &ExistsRequest,
    timeout: Duration,
    cancel: &CancellationToken,
) -> ExistsResponse {
    poll_until(executor, request, timeout, cancel, |status| {
        status == ObserveStatus::Persisted
    })
    .await
}

fn end_with(mut snapshot: ExistsResponse, kind: ErrorKind) -> ExistsResponse {
    tracing::debug!("Observe poll ended with {:?} at {:?}", kind, snapshot.status);
    match snapshot.ctx.clone().recontextualize(kind) {
        Ok(ctx) => snapshot.ctx = ctx,
        Err(e) => tracing::warn!("Unable to mark observe poll as {:?}: {}", kind, e),
    }
    snapshot
}

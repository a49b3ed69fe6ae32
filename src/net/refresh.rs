//! Token refresh coordinator.
//!
//! ARCHITECTURE
//! ============
//! [`RefreshOnUnauthorized`] wraps the bearer-attaching transport. When a
//! request comes back 401 it makes sure exactly one refresh call is in flight
//! for the whole batch of requests that failed together:
//!
//! ```text
//!            401, refresh token present
//!   Idle ───────────────────────────────▶ Refreshing { waiters }
//!    ▲                                        │  401 → push waiter, suspend
//!    └──── settle: wake all waiters ◀─────────┘
//!          (Ok → each replays once, Err → each fails)
//! ```
//!
//! INVARIANTS
//! ==========
//! - The enqueue-vs-initiate decision and the `Idle → Refreshing` transition
//!   happen under one lock acquisition, and the lock is never held across an
//!   `.await`.
//! - A request is replayed at most once (`retried`); a second 401 is final.
//! - Every exit from `Refreshing` settles every waiter, including the case
//!   where the request driving the refresh is dropped mid-flight.
//! - A refresh that completes after a concurrent `logout()` never writes its
//!   tokens back into the session.
//! - A request is bound to the session generation it was sent in. If a logout
//!   happened since, its 401 is answered with `LoggedOut`: it neither starts
//!   a refresh nor replays under whoever is signed in now.

#[cfg(test)]
#[path = "refresh_test.rs"]
mod refresh_test;

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures::channel::oneshot;

use super::error::ApiError;
use super::transport::{ApiRequest, ApiResponse, Transport};
use super::types::{RefreshRequest, TokenPair};
use crate::session::SessionHandle;
use crate::util::timeout::with_timeout;

pub const REFRESH_PATH: &str = "/api/v1/auth/refresh";
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

type Outcome = Result<(), ApiError>;

enum Phase {
    Idle,
    Refreshing { waiters: Vec<oneshot::Sender<Outcome>> },
}

struct CoordinatorState {
    phase: Phase,
    /// Number of successful refreshes so far.
    epoch: u64,
}

/// What a request that just saw a 401 should do next.
enum Decision {
    /// Start the refresh with this token.
    Initiate(String),
    /// A refresh is in flight; wait for it to settle.
    Wait(oneshot::Receiver<Outcome>),
    /// Tokens rotated after this request was sent; replay directly.
    AlreadyRefreshed,
    /// Nothing to refresh with.
    NoRefreshToken,
    /// The session the request was sent in has been logged out.
    SessionEnded,
}

/// Decorator that recovers 401 responses by refreshing the token pair once
/// and replaying the affected requests.
pub struct RefreshOnUnauthorized<T> {
    inner: T,
    session: SessionHandle,
    refresh_timeout: Duration,
    state: Mutex<CoordinatorState>,
}

impl<T: Transport> RefreshOnUnauthorized<T> {
    pub fn new(inner: T, session: SessionHandle) -> Self {
        Self {
            inner,
            session,
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
            state: Mutex::new(CoordinatorState { phase: Phase::Idle, epoch: 0 }),
        }
    }

    /// Bound on the refresh call; elapsing takes the failure path.
    #[must_use]
    pub fn with_refresh_timeout(mut self, refresh_timeout: Duration) -> Self {
        self.refresh_timeout = refresh_timeout;
        self
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// True while a refresh call is in flight.
    pub fn is_refreshing(&self) -> bool {
        matches!(self.lock().phase, Phase::Refreshing { .. })
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    fn decide(&self, sent_at_epoch: u64, sent_generation: u64) -> Decision {
        let mut state = self.lock();
        if self.session.generation() != sent_generation {
            return Decision::SessionEnded;
        }
        if let Phase::Refreshing { waiters } = &mut state.phase {
            let (tx, rx) = oneshot::channel();
            waiters.push(tx);
            return Decision::Wait(rx);
        }
        if state.epoch != sent_at_epoch {
            return Decision::AlreadyRefreshed;
        }
        match self.session.refresh_token() {
            Some(token) => {
                state.phase = Phase::Refreshing { waiters: Vec::new() };
                Decision::Initiate(token)
            }
            None => Decision::NoRefreshToken,
        }
    }

    /// Leave `Refreshing` and wake every waiter with `outcome`.
    fn settle(&self, outcome: &Outcome) {
        let waiters = {
            let mut state = self.lock();
            if outcome.is_ok() {
                state.epoch = state.epoch.wrapping_add(1);
            }
            match std::mem::replace(&mut state.phase, Phase::Idle) {
                Phase::Refreshing { waiters } => waiters,
                Phase::Idle => Vec::new(),
            }
        };
        tracing::debug!(queued = waiters.len(), ok = outcome.is_ok(), "token refresh settled");
        for waiter in waiters {
            // A dropped receiver means that caller went away; nothing to deliver.
            let _ = waiter.send(outcome.clone());
        }
    }

    async fn replay(&self, mut request: ApiRequest, sent_generation: u64) -> Result<ApiResponse, ApiError> {
        if self.session.generation() != sent_generation {
            tracing::info!(path = %request.path, "session ended before replay; dropping request");
            return Err(ApiError::LoggedOut);
        }
        request.retried = true;
        self.inner.send(request).await
    }

    async fn refresh(&self, refresh_token: String) -> Outcome {
        let generation = self.session.generation();
        let request = ApiRequest::post(REFRESH_PATH)
            .json(&RefreshRequest { refresh_token: &refresh_token })?
            .anonymous();

        let limit_ms = u64::try_from(self.refresh_timeout.as_millis()).unwrap_or(u64::MAX);
        let response = with_timeout(self.refresh_timeout, self.inner.send(request))
            .await
            .ok_or(ApiError::Timeout(limit_ms))??;
        if !response.is_success() {
            return Err(ApiError::from_status(response.status, &response.body));
        }
        let pair: TokenPair =
            serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))?;

        if !self.session.set_tokens_if_generation(generation, pair.access_token, pair.refresh_token) {
            return Err(ApiError::LoggedOut);
        }
        Ok(())
    }
}

#[async_trait::async_trait(?Send)]
impl<T: Transport> Transport for RefreshOnUnauthorized<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let sent_at_epoch = self.epoch();
        let sent_generation = self.session.generation();
        let response = self.inner.send(request.clone()).await?;
        if !response.is_unauthorized() || request.retried || request.anonymous {
            return Ok(response);
        }

        match self.decide(sent_at_epoch, sent_generation) {
            Decision::SessionEnded => {
                tracing::info!(path = %request.path, "401 for a request from an ended session");
                Err(ApiError::LoggedOut)
            }
            Decision::NoRefreshToken => {
                tracing::info!(path = %request.path, "401 without refresh token; ending session");
                self.session.logout();
                Ok(response)
            }
            Decision::AlreadyRefreshed => self.replay(request, sent_generation).await,
            Decision::Wait(rx) => match rx.await {
                Ok(Ok(())) => self.replay(request, sent_generation).await,
                Ok(Err(e)) => Err(e),
                Err(oneshot::Canceled) => Err(ApiError::Cancelled),
            },
            Decision::Initiate(refresh_token) => {
                tracing::debug!(path = %request.path, "access token rejected; refreshing");
                let in_flight = InFlight { coordinator: self, settled: false };
                match self.refresh(refresh_token).await {
                    Ok(()) => {
                        in_flight.settle(&Ok(()));
                        self.replay(request, sent_generation).await
                    }
                    Err(cause) => {
                        tracing::warn!(error = %cause, "token refresh failed; ending session");
                        let failure = match cause {
                            ApiError::LoggedOut => ApiError::LoggedOut,
                            other => {
                                // Waiters must wake to an already-cleared session.
                                self.session.logout();
                                ApiError::RefreshFailed(Box::new(other))
                            }
                        };
                        in_flight.settle(&Err(failure.clone()));
                        Err(failure)
                    }
                }
            }
        }
    }
}

/// Settles the coordinator if the refresh-driving future is dropped early.
struct InFlight<'a, T: Transport> {
    coordinator: &'a RefreshOnUnauthorized<T>,
    settled: bool,
}

impl<T: Transport> InFlight<'_, T> {
    fn settle(mut self, outcome: &Outcome) {
        self.settled = true;
        self.coordinator.settle(outcome);
    }
}

impl<T: Transport> Drop for InFlight<'_, T> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("token refresh abandoned; failing queued requests");
            self.coordinator.settle(&Err(ApiError::Cancelled));
        }
    }
}

//! Session store: tokens and the authenticated profile for this client.
//!
//! DESIGN
//! ======
//! One [`SessionHandle`] is created at startup and cloned into everything
//! that needs it (request pipeline, guard, pages). Reads are synchronous
//! snapshots, so the request pipeline always sees the latest token without
//! subscribing to UI updates. Mutations go through `set_tokens`,
//! `set_tokens_if_generation`, `set_user` and `logout` only.
//!
//! PERSISTENCE
//! ===========
//! Every mutation writes `{refreshToken, user}` under [`STORAGE_KEY`]; the
//! short-lived access token stays in memory. [`SessionHandle::restore`] reads
//! that blob back before any request is issued, which leaves the session
//! authenticated with no access token: the first request then goes through
//! the refresh path.
//!
//! Storage writes happen after the state lock is released; token reads never
//! wait on storage. Each mutation carries a revision number and a
//! write is skipped when a later revision already reached storage.
//!
//! The blob uses a `{"state": {...}, "version": 0}` envelope, the layout the
//! browser client has always written, so existing sessions survive.


pub mod storage;

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::net::types::{Role, User};
pub use storage::{MemoryStorage, SessionStorage, StorageError};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
#[cfg(feature = "hydrate")]
pub use storage::LocalStorage;

/// Storage key of the persisted session.
pub const STORAGE_KEY: &str = "auth-storage";

const STORAGE_VERSION: u32 = 0;

// =============================================================================
// SESSION
// =============================================================================

/// Point-in-time view of the session.
#[derive(Clone, Default, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
    pub is_authenticated: bool,
}

impl Session {
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("user", &self.user.as_ref().map(|u| (&u.email, u.role)))
            .field("is_authenticated", &self.is_authenticated)
            .finish()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    user: Option<User>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedEnvelope {
    state: PersistedSession,
    #[serde(default)]
    version: u32,
}

// =============================================================================
// HANDLE
// =============================================================================

/// Identifies a listener registered with [`SessionHandle::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

struct State {
    session: Session,
    /// Bumped by every logout; lets in-flight work detect it was invalidated.
    generation: u64,
    /// Bumped by every mutation; orders writes to storage.
    revision: u64,
}

struct Shared {
    state: RwLock<State>,
    storage: Box<dyn SessionStorage>,
    /// Revision last handed to storage.
    persisted: Mutex<u64>,
    listeners: RwLock<Vec<(ListenerId, Listener)>>,
    next_listener: std::sync::atomic::AtomicU64,
}

/// Cloneable handle to the process-wide session.
#[derive(Clone)]
pub struct SessionHandle {
    shared: Arc<Shared>,
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionHandle").field(&self.snapshot()).finish()
    }
}

impl SessionHandle {
    /// Empty session backed by `storage`. Nothing is read from storage.
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self::with_session(storage, Session::default())
    }

    /// Empty session kept only in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Rehydrate `{refreshToken, user}` from `storage`.
    ///
    /// A missing or unreadable blob yields an empty session; the failure is
    /// logged, never returned, so startup cannot be blocked by bad storage.
    pub fn restore(storage: impl SessionStorage + 'static) -> Self {
        let persisted = match storage.load(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<PersistedEnvelope>(&raw) {
                Ok(envelope) => envelope.state,
                Err(e) => {
                    tracing::warn!(error = %e, "discarding unreadable persisted session");
                    if let Err(e) = storage.remove(STORAGE_KEY) {
                        tracing::warn!(error = %e, "could not remove unreadable persisted session");
                    }
                    PersistedSession::default()
                }
            },
            Ok(None) => PersistedSession::default(),
            Err(e) => {
                tracing::warn!(error = %e, "session storage unavailable; starting logged out");
                PersistedSession::default()
            }
        };

        let session = Session {
            access_token: None,
            is_authenticated: persisted.user.is_some(),
            refresh_token: persisted.refresh_token,
            user: persisted.user,
        };
        tracing::debug!(authenticated = session.is_authenticated, "session restored");
        Self::with_session(storage, session)
    }

    fn with_session(storage: impl SessionStorage + 'static, session: Session) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(State { session, generation: 0, revision: 0 }),
                storage: Box::new(storage),
                persisted: Mutex::new(0),
                listeners: RwLock::new(Vec::new()),
                next_listener: std::sync::atomic::AtomicU64::new(0),
            }),
        }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Copy of the current session.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.read(|state| state.session.clone())
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.read(|state| state.session.access_token.clone())
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.read(|state| state.session.refresh_token.clone())
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.read(|state| state.session.user.clone())
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.read(|state| state.session.role())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read(|state| state.session.is_authenticated)
    }

    /// Logout counter. Changes exactly when [`Self::logout`] runs.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.read(|state| state.generation)
    }

    fn read<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        let state = self.shared.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    // -------------------------------------------------------------------------
    // Mutations
    // -------------------------------------------------------------------------

    /// Replace both tokens. Having credentials marks the session authenticated,
    /// even before the profile is loaded.
    pub fn set_tokens(&self, access_token: impl Into<String>, refresh_token: impl Into<String>) {
        let (access_token, refresh_token) = (access_token.into(), refresh_token.into());
        self.mutate(|state| store_tokens(state, access_token, refresh_token));
    }

    /// Replace both tokens only if no logout happened since `generation` was
    /// read. The check and the write happen under one lock.
    ///
    /// Returns `false`, leaving the session untouched, when the generation moved.
    pub fn set_tokens_if_generation(
        &self,
        generation: u64,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> bool {
        let (access_token, refresh_token) = (access_token.into(), refresh_token.into());
        self.try_mutate(|state| {
            if state.generation != generation {
                return false;
            }
            store_tokens(state, access_token, refresh_token);
            true
        })
    }

    /// Store the authenticated profile.
    pub fn set_user(&self, user: User) {
        tracing::debug!(user_id = %user.id, role = %user.role, "session user set");
        self.mutate(|state| {
            state.session.user = Some(user);
            state.session.is_authenticated = true;
        });
    }

    /// Clear every field at once. Idempotent.
    pub fn logout(&self) {
        self.mutate(|state| {
            state.session = Session::default();
            state.generation = state.generation.wrapping_add(1);
        });
        tracing::info!("session cleared");
    }

    fn mutate(&self, f: impl FnOnce(&mut State)) {
        self.try_mutate(|state| {
            f(state);
            true
        });
    }

    /// Apply `f` under the write lock; storage and listeners run after the
    /// lock is released, and only if `f` returned `true`.
    fn try_mutate(&self, f: impl FnOnce(&mut State) -> bool) -> bool {
        let (snapshot, revision, raw) = {
            let mut state = self.shared.state.write().unwrap_or_else(PoisonError::into_inner);
            if !f(&mut state) {
                return false;
            }
            state.revision += 1;
            (state.session.clone(), state.revision, encode(&state.session))
        };
        if let Some(raw) = raw {
            self.persist(revision, &raw);
        }
        self.notify(&snapshot);
        true
    }

    fn persist(&self, revision: u64, raw: &str) {
        let mut persisted = self.shared.persisted.lock().unwrap_or_else(PoisonError::into_inner);
        // A later mutation already reached storage.
        if *persisted >= revision {
            return;
        }
        if let Err(e) = self.shared.storage.save(STORAGE_KEY, raw) {
            tracing::warn!(error = %e, "session persistence failed");
        }
        *persisted = revision;
    }

    // -------------------------------------------------------------------------
    // Listeners
    // -------------------------------------------------------------------------

    /// Call `listener` with the new snapshot after every mutation.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        let id = ListenerId(
            self.shared
                .next_listener
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed),
        );
        self.shared
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.shared
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(existing, _)| *existing != id);
    }

    fn notify(&self, snapshot: &Session) {
        // Clone out so listeners may (un)subscribe without deadlocking.
        let listeners: Vec<Listener> = self
            .shared
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}

fn store_tokens(state: &mut State, access_token: String, refresh_token: String) {
    state.session.access_token = Some(access_token);
    state.session.refresh_token = Some(refresh_token);
    state.session.is_authenticated = true;
}

fn encode(session: &Session) -> Option<String> {
    let envelope = PersistedEnvelope {
        state: PersistedSession {
            refresh_token: session.refresh_token.clone(),
            user: session.user.clone(),
        },
        version: STORAGE_VERSION,
    };
    serde_json::to_string(&envelope)
        .map_err(|e| tracing::warn!(error = %e, "session serialization failed"))
        .ok()
}

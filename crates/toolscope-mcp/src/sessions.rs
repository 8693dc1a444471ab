// crates/toolscope-mcp/src/sessions.rs
// ============================================================================
// Module: Session Store
// Description: Concurrent, idle-timeout session records owning transports.
// Purpose: Track per-session credentials, scopes, and transports safely.
// Dependencies: tokio, thiserror, toolscope-config
// ============================================================================

//! ## Overview
//! [`SessionStore`] maps a session id to the credential, client label, scope
//! name, and transport negotiated for it. Every session carries exactly one
//! eviction timer. Reads renew it: [`SessionStore::get`],
//! [`SessionStore::has`] and the single-field accessors all push the
//! deadline out by the idle timeout. A session that is not read for a full
//! idle window is evicted and its transport closed.
//!
//! The map, each entry's timer handle, and a generation counter live behind
//! one mutex. A timer only evicts when the entry still carries the generation
//! it was scheduled with, so a renewal racing a firing timer always wins.
//! Transport closes, metrics and audit records happen outside the lock.
//!
//! Ownership: the store owns each transport from [`SessionStore::store`]
//! until [`SessionStore::delete`] hands it back to the caller, or until
//! eviction or [`SessionStore::close_all_sessions`] closes it. Callers must
//! not close a transport obtained from [`SessionStore::transport`] while the
//! session is live.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::sync::Weak;
use std::time::Duration;

use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::audit::SessionAuditEvent;
use crate::audit::SessionAuditKind;
use crate::audit::SessionAuditSink;
use crate::config::SessionsConfig;
use crate::telemetry::SessionMetrics;
use crate::transport::SessionTransport;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Session store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No live session exists for the id.
    #[error("session not found: {0}")]
    NotFound(String),
    /// The store was built outside a tokio runtime.
    #[error("session store requires a tokio runtime")]
    NoRuntime,
}

// ============================================================================
// SECTION: Types
// ============================================================================

/// Read-only view of a live session.
///
/// # Invariants
/// - Never exposes the eviction timer.
#[derive(Clone)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub session_id: String,
    /// Bearer credential, stored verbatim.
    pub credential: String,
    /// Client label (user agent).
    pub client_label: String,
    /// Scope the session was created under.
    pub scope: String,
    /// Transport owned by the session.
    pub transport: Arc<dyn SessionTransport>,
}

impl fmt::Debug for SessionSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSnapshot")
            .field("session_id", &self.session_id)
            .field("credential", &"<redacted>")
            .field("client_label", &self.client_label)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// A live session record.
struct SessionEntry {
    /// Bearer credential.
    credential: String,
    /// Client label.
    client_label: String,
    /// Scope name, immutable for the session lifetime.
    scope: String,
    /// Owned transport.
    transport: Arc<dyn SessionTransport>,
    /// Generation the current timer was scheduled with.
    generation: u64,
    /// Pending eviction timer.
    timer: JoinHandle<()>,
}

impl SessionEntry {
    /// Builds the audit event for this entry.
    fn audit_event(&self, kind: SessionAuditKind, session_id: &str) -> SessionAuditEvent {
        SessionAuditEvent::new(kind, session_id).with_session(
            &self.credential,
            &self.client_label,
            &self.scope,
        )
    }
}

/// State guarded by the store mutex.
#[derive(Default)]
struct StoreState {
    /// Live sessions by id.
    entries: HashMap<String, SessionEntry>,
    /// Next timer generation.
    next_generation: u64,
}

impl StoreState {
    /// Allocates a fresh timer generation.
    const fn bump_generation(&mut self) -> u64 {
        self.next_generation = self.next_generation.wrapping_add(1);
        self.next_generation
    }
}

/// Shared store internals.
struct StoreInner {
    /// Idle window before an unread session is evicted.
    idle_timeout: Duration,
    /// Runtime used to run eviction timers and shutdown closes.
    runtime: Handle,
    /// Sessions and timer bookkeeping.
    state: Mutex<StoreState>,
    /// Metrics collaborator.
    metrics: Arc<dyn SessionMetrics>,
    /// Audit collaborator.
    audit: Arc<dyn SessionAuditSink>,
}

// ============================================================================
// SECTION: Session Store
// ============================================================================

/// Concurrent session store with idle-timeout eviction.
///
/// Cloning is cheap and yields a handle to the same store.
#[derive(Clone)]
pub struct SessionStore {
    /// Shared internals.
    inner: Arc<StoreInner>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("idle_timeout", &self.inner.idle_timeout)
            .field("active", &self.active_count())
            .finish()
    }
}

impl SessionStore {
    /// Builds a store bound to the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoRuntime`] outside a tokio runtime.
    pub fn new(
        idle_timeout: Duration,
        metrics: Arc<dyn SessionMetrics>,
        audit: Arc<dyn SessionAuditSink>,
    ) -> Result<Self, SessionError> {
        let runtime = Handle::try_current().map_err(|_| SessionError::NoRuntime)?;
        Ok(Self::with_runtime(idle_timeout, runtime, metrics, audit))
    }

    /// Builds a store from session configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoRuntime`] outside a tokio runtime.
    pub fn from_config(
        config: &SessionsConfig,
        metrics: Arc<dyn SessionMetrics>,
        audit: Arc<dyn SessionAuditSink>,
    ) -> Result<Self, SessionError> {
        Self::new(config.idle_timeout(), metrics, audit)
    }

    /// Builds a store that schedules its timers on `runtime`.
    #[must_use]
    pub fn with_runtime(
        idle_timeout: Duration,
        runtime: Handle,
        metrics: Arc<dyn SessionMetrics>,
        audit: Arc<dyn SessionAuditSink>,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                idle_timeout,
                runtime,
                state: Mutex::new(StoreState::default()),
                metrics,
                audit,
            }),
        }
    }

    /// Returns the configured idle timeout.
    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        self.inner.idle_timeout
    }

    /// Inserts or replaces the session for `session_id`.
    ///
    /// A replaced session's timer is cancelled before the new one is
    /// scheduled and the active gauge is not incremented again. The replaced
    /// transport is released without being closed. An empty id is refused:
    /// nothing is stored, the refusal is audited and the transport is closed
    /// in the background.
    pub fn store(
        &self,
        session_id: impl Into<String>,
        credential: impl Into<String>,
        client_label: impl Into<String>,
        scope: impl Into<String>,
        transport: Arc<dyn SessionTransport>,
    ) {
        let session_id: String = session_id.into();
        let credential: String = credential.into();
        let client_label: String = client_label.into();
        let scope: String = scope.into();
        let inner = &self.inner;
        if session_id.is_empty() {
            inner.reject(&credential, &client_label, &scope, transport);
            return;
        }
        let (event, created) = {
            let mut state = inner.lock_state();
            if let Some(previous) = state.entries.get(&session_id) {
                previous.timer.abort();
            }
            let generation = state.bump_generation();
            let entry = SessionEntry {
                credential,
                client_label,
                scope,
                transport,
                generation,
                timer: inner.schedule(session_id.clone(), generation),
            };
            let created = !state.entries.contains_key(&session_id);
            let kind = if created {
                SessionAuditKind::Created
            } else {
                SessionAuditKind::Replaced
            };
            let event = entry.audit_event(kind, &session_id);
            state.entries.insert(session_id, entry);
            (event, created)
        };
        if created {
            inner.metrics.increment_active_sessions();
        }
        inner.audit.record(&event);
    }

    /// Returns the session and renews its timer.
    ///
    /// This read extends the session's lifetime by the idle timeout.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<SessionSnapshot> {
        self.inner.touch(session_id, |entry| SessionSnapshot {
            session_id: session_id.to_string(),
            credential: entry.credential.clone(),
            client_label: entry.client_label.clone(),
            scope: entry.scope.clone(),
            transport: Arc::clone(&entry.transport),
        })
    }

    /// Returns true when the session is live, renewing its timer.
    ///
    /// The empty id is never present.
    #[must_use]
    pub fn has(&self, session_id: &str) -> bool {
        self.inner.touch(session_id, |_| ()).is_some()
    }

    /// Returns the session credential, renewing its timer.
    #[must_use]
    pub fn token(&self, session_id: &str) -> Option<String> {
        self.inner.touch(session_id, |entry| entry.credential.clone())
    }

    /// Returns the session scope name, renewing its timer.
    ///
    /// Unlike the other accessors this fails loudly: dispatch code must only
    /// ask for a scope after confirming the session exists.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotFound`] when the session is absent.
    pub fn scope(&self, session_id: &str) -> Result<String, SessionError> {
        self.inner
            .touch(session_id, |entry| entry.scope.clone())
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))
    }

    /// Returns the session client label, renewing its timer.
    #[must_use]
    pub fn client_label(&self, session_id: &str) -> Option<String> {
        self.inner.touch(session_id, |entry| entry.client_label.clone())
    }

    /// Returns the session transport, renewing its timer.
    #[must_use]
    pub fn transport(&self, session_id: &str) -> Option<Arc<dyn SessionTransport>> {
        self.inner.touch(session_id, |entry| Arc::clone(&entry.transport))
    }

    /// Removes the session and cancels its timer.
    ///
    /// The transport is not closed; it is returned so the caller can close
    /// it. Deleting an absent session is a no-op.
    pub fn delete(&self, session_id: &str) -> Option<Arc<dyn SessionTransport>> {
        let entry = {
            let mut state = self.inner.lock_state();
            let entry = state.entries.remove(session_id)?;
            entry.timer.abort();
            entry
        };
        self.inner.metrics.decrement_active_sessions();
        self.inner.audit.record(&entry.audit_event(SessionAuditKind::Deleted, session_id));
        Some(entry.transport)
    }

    /// Returns a snapshot of live session ids in no particular order.
    ///
    /// Does not renew any session.
    #[must_use]
    pub fn session_ids(&self) -> Vec<String> {
        self.inner.lock_state().entries.keys().cloned().collect()
    }

    /// Returns the number of live sessions.
    ///
    /// Does not renew any session.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.inner.lock_state().entries.len()
    }

    /// Removes every live session and closes its transport.
    ///
    /// Closes run concurrently. A failed or panicking close is audited and
    /// never stops the remaining sessions from being processed.
    pub async fn close_all_sessions(&self) {
        let drained: Vec<(String, SessionEntry)> = {
            let mut state = self.inner.lock_state();
            let drained: Vec<_> = state.entries.drain().collect();
            for (_, entry) in &drained {
                entry.timer.abort();
            }
            drained
        };
        for _ in &drained {
            self.inner.metrics.decrement_active_sessions();
        }

        let closes: Vec<_> = drained
            .into_iter()
            .map(|(session_id, entry)| {
                let transport = Arc::clone(&entry.transport);
                let close = self.inner.runtime.spawn(async move { transport.close().await });
                (session_id, entry, close)
            })
            .collect();

        for (session_id, entry, close) in closes {
            let failure = match close.await {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err.to_string()),
                Err(err) => Some(err.to_string()),
            };
            let event = match failure {
                None => entry.audit_event(SessionAuditKind::ShutdownClosed, &session_id),
                Some(error) => entry
                    .audit_event(SessionAuditKind::TransportCloseFailed, &session_id)
                    .with_error(error),
            };
            self.inner.audit.record(&event);
        }
    }
}

// ============================================================================
// SECTION: Internals
// ============================================================================

impl StoreInner {
    /// Locks the state, recovering from poisoning.
    ///
    /// No critical section leaves the state half-updated, so the data is
    /// still consistent after a panic elsewhere.
    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Audits a refused store and closes its transport in the background.
    fn reject(
        &self,
        credential: &str,
        client_label: &str,
        scope: &str,
        transport: Arc<dyn SessionTransport>,
    ) {
        let event = SessionAuditEvent::new(SessionAuditKind::Rejected, "")
            .with_session(credential, client_label, scope)
            .with_error("empty session id");
        self.audit.record(&event);
        let audit = Arc::clone(&self.audit);
        self.runtime.spawn(async move {
            if let Err(err) = transport.close().await {
                let mut failed = event.with_error(err.to_string());
                failed.kind = SessionAuditKind::TransportCloseFailed;
                audit.record(&failed);
            }
        });
    }

    /// Reads a live session and reschedules its timer in one critical section.
    fn touch<R>(
        self: &Arc<Self>,
        session_id: &str,
        read: impl FnOnce(&SessionEntry) -> R,
    ) -> Option<R> {
        if session_id.is_empty() {
            return None;
        }
        let mut state = self.lock_state();
        let generation = state.bump_generation();
        let entry = state.entries.get_mut(session_id)?;
        entry.timer.abort();
        entry.generation = generation;
        entry.timer = self.schedule(session_id.to_string(), generation);
        Some(read(entry))
    }

    /// Spawns the eviction timer for one generation of a session.
    ///
    /// An idle timeout past the clock's range never fires.
    fn schedule(self: &Arc<Self>, session_id: String, generation: u64) -> JoinHandle<()> {
        let deadline = Instant::now().checked_add(self.idle_timeout);
        let store: Weak<Self> = Arc::downgrade(self);
        self.runtime.spawn(async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
            if let Some(store) = store.upgrade() {
                store.expire(&session_id, generation).await;
            }
        })
    }

    /// Evicts a session whose timer fired, unless it was renewed meanwhile.
    async fn expire(&self, session_id: &str, generation: u64) {
        let entry = {
            let mut state = self.lock_state();
            let current = state
                .entries
                .get(session_id)
                .is_some_and(|entry| entry.generation == generation);
            if !current {
                return;
            }
            let Some(entry) = state.entries.remove(session_id) else {
                return;
            };
            entry
        };
        self.metrics.increment_session_timeouts();
        self.metrics.decrement_active_sessions();
        self.audit.record(&entry.audit_event(SessionAuditKind::Expired, session_id));
        // The running task is this entry's timer; dropping its handle is enough.
        if let Err(err) = entry.transport.close().await {
            self.audit.record(
                &entry
                    .audit_event(SessionAuditKind::TransportCloseFailed, session_id)
                    .with_error(err.to_string()),
            );
        }
    }
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        for entry in state.entries.values() {
            entry.timer.abort();
        }
    }
}

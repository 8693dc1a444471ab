// crates/toolscope-mcp/tests/common/mod.rs
// ============================================================================
// Module: Test Support
// Description: Recording fakes and clock helpers for session store tests.
// Purpose: Observe metrics, audit events, and transport closes.
// Dependencies: toolscope-mcp, tokio
// ============================================================================

//! Shared helpers for toolscope-mcp integration tests.

#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Not every test binary uses every helper."
)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use toolscope_mcp::SessionAuditEvent;
use toolscope_mcp::SessionAuditKind;
use toolscope_mcp::SessionAuditSink;
use toolscope_mcp::SessionCounters;
use toolscope_mcp::SessionStore;
use toolscope_mcp::SessionTransport;
use toolscope_mcp::TransportError;

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink that keeps every event in memory.
#[derive(Default)]
pub struct RecordingAudit {
    /// Events in record order.
    events: Mutex<Vec<SessionAuditEvent>>,
}

impl RecordingAudit {
    /// Returns a copy of every recorded event.
    pub fn events(&self) -> Vec<SessionAuditEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Returns how many events of `kind` were recorded.
    pub fn count(&self, kind: SessionAuditKind) -> usize {
        self.events.lock().unwrap().iter().filter(|event| event.kind == kind).count()
    }
}

impl SessionAuditSink for RecordingAudit {
    fn record(&self, event: &SessionAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Transport that counts closes and can be told to fail them.
#[derive(Default)]
pub struct RecordingTransport {
    /// Number of close calls.
    closes: AtomicUsize,
    /// Whether close reports an error.
    fail: bool,
}

impl RecordingTransport {
    /// Builds a transport whose closes succeed.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Builds a transport whose closes fail with an io error.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            closes: AtomicUsize::new(0),
            fail: true,
        })
    }

    /// Returns the number of close calls so far.
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionTransport for RecordingTransport {
    async fn close(&self) -> Result<(), TransportError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(TransportError::Io("connection reset".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Store Harness
// ============================================================================

/// Store wired to recording collaborators.
pub struct Harness {
    /// Store under test.
    pub store: SessionStore,
    /// Metrics the store reports to.
    pub counters: Arc<SessionCounters>,
    /// Audit sink the store reports to.
    pub audit: Arc<RecordingAudit>,
}

/// Builds a store on the current runtime with the given idle timeout.
pub fn harness(idle_timeout_secs: u64) -> Harness {
    let counters = Arc::new(SessionCounters::new());
    let audit = Arc::new(RecordingAudit::default());
    let store = SessionStore::new(
        Duration::from_secs(idle_timeout_secs),
        counters.clone(),
        audit.clone(),
    )
    .expect("tokio runtime");
    Harness {
        store,
        counters,
        audit,
    }
}

// ============================================================================
// SECTION: Clock
// ============================================================================

/// Lets woken timer tasks run to completion.
pub async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

/// Advances the paused clock and lets fired timers finish.
pub async fn advance_secs(secs: u64) {
    tokio::time::advance(Duration::from_secs(secs)).await;
    settle().await;
}

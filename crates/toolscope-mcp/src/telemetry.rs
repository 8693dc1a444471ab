// crates/toolscope-mcp/src/telemetry.rs
// ============================================================================
// Module: Session Telemetry
// Description: Metrics hooks for session lifecycle events.
// Purpose: Report session gauges and timeouts without hard deps.
// Dependencies: none
// ============================================================================

//! ## Overview
//! This module exposes a thin metrics interface for the session store. It is
//! dependency-light so deployments can plug in Prometheus or OpenTelemetry
//! exporters behind [`SessionMetrics`] without touching the store.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::atomic::AtomicI64;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for session lifecycle events.
pub trait SessionMetrics: Send + Sync {
    /// Records a newly stored session (never called for a replacement).
    fn increment_active_sessions(&self);
    /// Records a removed session.
    fn decrement_active_sessions(&self);
    /// Records a session evicted by its idle timer.
    fn increment_session_timeouts(&self);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are intentionally discarded.
pub struct NoopSessionMetrics;

impl SessionMetrics for NoopSessionMetrics {
    fn increment_active_sessions(&self) {}

    fn decrement_active_sessions(&self) {}

    fn increment_session_timeouts(&self) {}
}

// ============================================================================
// SECTION: In-Memory Counters
// ============================================================================

/// Atomic in-process counters, suitable for health endpoints and tests.
///
/// # Invariants
/// - `active` mirrors the store cardinality when this is the store's only
///   metrics sink.
#[derive(Debug, Default)]
pub struct SessionCounters {
    /// Active session gauge.
    active: AtomicI64,
    /// Total sessions ever created.
    created: AtomicU64,
    /// Total idle-timeout evictions.
    timeouts: AtomicU64,
}

impl SessionCounters {
    /// Builds zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the active session gauge.
    #[must_use]
    pub fn active(&self) -> i64 {
        self.active.load(Ordering::SeqCst)
    }

    /// Returns the number of sessions created.
    #[must_use]
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }

    /// Returns the number of idle-timeout evictions.
    #[must_use]
    pub fn timeouts(&self) -> u64 {
        self.timeouts.load(Ordering::SeqCst)
    }
}

impl SessionMetrics for SessionCounters {
    fn increment_active_sessions(&self) {
        self.active.fetch_add(1, Ordering::SeqCst);
        self.created.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement_active_sessions(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }

    fn increment_session_timeouts(&self) {
        self.timeouts.fetch_add(1, Ordering::SeqCst);
    }
}

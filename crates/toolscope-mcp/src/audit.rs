// crates/toolscope-mcp/src/audit.rs
// ============================================================================
// Module: Session Audit Logging
// Description: Structured audit events for session lifecycle transitions.
// Purpose: Emit redacted JSON-line logs without hard dependencies.
// Dependencies: serde, serde_json, sha2
// ============================================================================

//! ## Overview
//! This module defines the session audit event payload and its sinks. Events
//! never carry raw credentials; a SHA-256 fingerprint identifies the token
//! instead. Sinks are lightweight so deployments can route events to their
//! preferred logging pipeline.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use crate::config::AuditConfig;
use crate::config::AuditSinkKind;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Session lifecycle transition being audited.
///
/// # Invariants
/// - Variants are stable for audit labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionAuditKind {
    /// A new session was stored.
    Created,
    /// An existing session id was stored again.
    Replaced,
    /// A store was refused because the session id was empty.
    Rejected,
    /// A session was removed by an explicit delete.
    Deleted,
    /// A session was evicted by its idle timer.
    Expired,
    /// A session was removed during shutdown.
    ShutdownClosed,
    /// Closing a session transport failed.
    TransportCloseFailed,
}

/// Session audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct SessionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Lifecycle transition.
    pub kind: SessionAuditKind,
    /// Session identifier.
    pub session_id: String,
    /// Scope the session was created under.
    pub scope: Option<String>,
    /// Client label (user agent) when known.
    pub client_label: Option<String>,
    /// SHA-256 fingerprint of the session credential.
    pub token_fingerprint: Option<String>,
    /// Failure detail for error events.
    pub error: Option<String>,
}

impl SessionAuditEvent {
    /// Creates an event with a consistent timestamp and no optional fields.
    #[must_use]
    pub fn new(kind: SessionAuditKind, session_id: impl Into<String>) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "session_audit",
            timestamp_ms,
            kind,
            session_id: session_id.into(),
            scope: None,
            client_label: None,
            token_fingerprint: None,
            error: None,
        }
    }

    /// Returns a copy carrying session metadata; the credential is hashed.
    #[must_use]
    pub fn with_session(mut self, credential: &str, client_label: &str, scope: &str) -> Self {
        self.token_fingerprint = Some(token_fingerprint(credential));
        self.client_label = Some(client_label.to_string());
        self.scope = Some(scope.to_string());
        self
    }

    /// Returns a copy carrying an error detail.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for session lifecycle events.
pub trait SessionAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &SessionAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrSessionAuditSink;

impl SessionAuditSink for StderrSessionAuditSink {
    fn record(&self, event: &SessionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileSessionAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileSessionAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl SessionAuditSink for FileSessionAuditSink {
    fn record(&self, event: &SessionAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

/// No-op audit sink for tests.
pub struct NoopSessionAuditSink;

impl SessionAuditSink for NoopSessionAuditSink {
    fn record(&self, _event: &SessionAuditEvent) {}
}

/// Builds the audit sink selected by configuration.
///
/// # Errors
///
/// Returns an error if the file sink cannot open its path.
pub fn audit_sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn SessionAuditSink>> {
    match config.sink {
        AuditSinkKind::Stderr => Ok(Arc::new(StderrSessionAuditSink)),
        AuditSinkKind::None => Ok(Arc::new(NoopSessionAuditSink)),
        AuditSinkKind::File => {
            let path = config.path.as_deref().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "audit.path is required")
            })?;
            Ok(Arc::new(FileSessionAuditSink::new(Path::new(path))?))
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the lowercase hex SHA-256 digest of a credential.
#[must_use]
pub fn token_fingerprint(credential: &str) -> String {
    let digest = Sha256::digest(credential.as_bytes());
    hex_encode(&digest)
}

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}

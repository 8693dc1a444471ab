// crates/toolscope-mcp/src/transport.rs
// ============================================================================
// Module: Session Transports
// Description: Close capability for per-session connection resources.
// Purpose: Let the session store release transports it owns.
// Dependencies: async-trait, tokio, thiserror
// ============================================================================

//! ## Overview
//! The store only needs one thing from a transport: the ability to close it.
//! [`SessionTransport`] captures that as an async, fallible operation.
//! [`ChannelTransport`] is an in-process implementation backed by a tokio
//! channel, the shape used for SSE-style event streams where the HTTP layer
//! drains the receiver.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Transport errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The transport was already closed.
    #[error("transport already closed")]
    Closed,
    /// The transport failed while sending or closing.
    #[error("transport io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// A bidirectional connection resource owned by a session.
#[async_trait]
pub trait SessionTransport: Send + Sync {
    /// Closes the transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the close fails. Callers treat close
    /// failures as non-fatal.
    async fn close(&self) -> Result<(), TransportError>;
}

// ============================================================================
// SECTION: Channel Transport
// ============================================================================

/// Channel-backed transport that forwards serialized messages to a receiver.
///
/// # Invariants
/// - After [`SessionTransport::close`] succeeds, the receiver observes the
///   end of stream once buffered messages are drained.
#[derive(Debug)]
pub struct ChannelTransport {
    /// Sending half, taken on close.
    sender: Mutex<Option<mpsc::Sender<String>>>,
}

impl ChannelTransport {
    /// Builds a transport and the receiver the HTTP layer drains.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Sends one message to the receiver.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Closed`] after close and
    /// [`TransportError::Io`] when the receiver is gone.
    pub async fn send(&self, message: impl Into<String>) -> Result<(), TransportError> {
        let sender = self
            .sender
            .lock()
            .map_err(|_| TransportError::Io("transport lock poisoned".to_string()))?
            .clone()
            .ok_or(TransportError::Closed)?;
        sender
            .send(message.into())
            .await
            .map_err(|_| TransportError::Io("receiver dropped".to_string()))
    }

    /// Returns true once the transport has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.lock().map_or(true, |guard| guard.is_none())
    }
}

#[async_trait]
impl SessionTransport for ChannelTransport {
    async fn close(&self) -> Result<(), TransportError> {
        let sender = self
            .sender
            .lock()
            .map_err(|_| TransportError::Io("transport lock poisoned".to_string()))?
            .take();
        match sender {
            Some(_) => Ok(()),
            None => Err(TransportError::Closed),
        }
    }
}

// crates/toolscope-mcp/src/lib.rs
// ============================================================================
// Module: Tool Scope MCP
// Description: Session lifecycle and tool scoping for the MCP gateway.
// Purpose: Own per-session transports and resolve tools within a scope.
// Dependencies: toolscope-config, tokio, async-trait, serde
// ============================================================================

//! ## Overview
//! Tool Scope MCP provides the stateful core that sits behind the gateway's
//! request router:
//! - [`SessionStore`] owns session records and their transports, evicting
//!   sessions that go unread for the configured idle timeout.
//! - [`resolve_toolsets`] turns declared scopes into resolved tool lists plus
//!   the synthesized `all` scope.
//! - [`tool_names`] maps fully-qualified tool names to caller-facing names.
//!
//! The store is an explicit value: build one at startup and hand clones of
//! it to request handlers.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod catalog;
pub mod config;
pub mod sessions;
pub mod telemetry;
pub mod tool_names;
pub mod toolsets;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileSessionAuditSink;
pub use audit::NoopSessionAuditSink;
pub use audit::SessionAuditEvent;
pub use audit::SessionAuditKind;
pub use audit::SessionAuditSink;
pub use audit::StderrSessionAuditSink;
pub use audit::audit_sink_from_config;
pub use catalog::ToolDefinition;
pub use config::ToolscopeConfig;
pub use sessions::SessionError;
pub use sessions::SessionSnapshot;
pub use sessions::SessionStore;
pub use telemetry::NoopSessionMetrics;
pub use telemetry::SessionCounters;
pub use telemetry::SessionMetrics;
pub use tool_names::resolve_by_short_name;
pub use tool_names::short_name;
pub use toolsets::ALL_TOOLSET;
pub use toolsets::Toolsets;
pub use toolsets::resolve_toolsets;
pub use transport::ChannelTransport;
pub use transport::SessionTransport;
pub use transport::TransportError;

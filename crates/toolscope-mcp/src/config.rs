// crates/toolscope-mcp/src/config.rs
// ============================================================================
// Module: MCP Configuration (Re-export)
// Description: Re-export canonical Tool Scope config types.
// Purpose: Keep MCP callers on a single config source of truth.
// Dependencies: toolscope-config
// ============================================================================

//! ## Overview
//! This module re-exports the configuration model from `toolscope-config` so
//! callers of this crate do not need a direct dependency on it.

/// Re-export canonical config types and helpers.
pub use toolscope_config::*;

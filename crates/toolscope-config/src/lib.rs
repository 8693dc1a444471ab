// crates/toolscope-config/src/lib.rs
// ============================================================================
// Module: Tool Scope Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for toolscope.toml semantics.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! `toolscope-config` defines the configuration model for the Tool Scope
//! Gateway: session idle timeouts, declared toolsets, and audit sink
//! selection. Loading is strict and fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;

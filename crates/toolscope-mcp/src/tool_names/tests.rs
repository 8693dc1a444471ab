// crates/toolscope-mcp/src/tool_names/tests.rs
// ============================================================================
// Module: Tool Name Tests
// Description: Unit tests for short-name derivation and lookup.
// Purpose: Pin separator edge cases and first-match resolution.
// Dependencies: toolscope-mcp
// ============================================================================

//! ## Overview
//! Covers separator edge cases for [`super::short_name`] and first-wins
//! lookup for [`super::resolve_by_short_name`].

// ============================================================================
// SECTION: Lint Configuration
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use super::resolve_by_short_name;
use super::short_name;
use crate::catalog::ToolDefinition;

// ============================================================================
// SECTION: Short Names
// ============================================================================

#[test]
fn short_name_strips_service_prefix() {
    assert_eq!(short_name("controller.jobs_list"), "jobs_list");
}

#[test]
fn short_name_without_separator_is_unchanged() {
    assert_eq!(short_name("jobs_list"), "jobs_list");
}

#[test]
fn short_name_with_trailing_separator_is_unchanged() {
    assert_eq!(short_name("controller."), "controller.");
}

#[test]
fn short_name_uses_last_separator() {
    assert_eq!(short_name("gateway.v2.users_list"), "users_list");
}

#[test]
fn short_name_of_empty_string_is_empty() {
    assert_eq!(short_name(""), "");
}

#[test]
fn short_name_of_leading_separator_keeps_tail() {
    assert_eq!(short_name(".jobs_list"), "jobs_list");
}

// ============================================================================
// SECTION: Lookup
// ============================================================================

#[test]
fn resolve_returns_first_match() {
    let candidates = vec![
        Arc::new(ToolDefinition::new("eda", "tool1")),
        Arc::new(ToolDefinition::new("controller", "tool1")),
    ];
    let found = resolve_by_short_name("tool1", &candidates).unwrap();
    assert_eq!(found.full_name, "eda.tool1");
}

#[test]
fn resolve_is_case_sensitive() {
    let candidates = vec![Arc::new(ToolDefinition::new("controller", "jobs_list"))];
    assert!(resolve_by_short_name("Jobs_List", &candidates).is_none());
}

#[test]
fn resolve_on_empty_candidates_is_none() {
    assert!(resolve_by_short_name("jobs_list", &[]).is_none());
}

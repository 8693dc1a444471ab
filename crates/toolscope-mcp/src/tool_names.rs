// crates/toolscope-mcp/src/tool_names.rs
// ============================================================================
// Module: Tool Names
// Description: Mapping between fully-qualified and caller-facing tool names.
// Purpose: Resolve client-visible tool names within a candidate set.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Fully-qualified tool names carry a service prefix (`controller.jobs_list`).
//! Clients only ever see the short name (`jobs_list`). Both helpers here are
//! pure and allocation-free.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::catalog::ToolDefinition;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Separator between the service prefix and the operation name.
pub const TOOL_NAME_SEPARATOR: char = '.';

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Returns the caller-facing name for a fully-qualified tool name.
///
/// The result is the text after the last separator. Names without a separator
/// and names ending in the separator are returned unchanged.
#[must_use]
pub fn short_name(full_name: &str) -> &str {
    match full_name.rsplit_once(TOOL_NAME_SEPARATOR) {
        Some((_, tail)) if !tail.is_empty() => tail,
        _ => full_name,
    }
}

/// Finds the first candidate whose short name matches exactly.
///
/// Matching is case-sensitive. When several candidates share a name the
/// first in iteration order wins, mirroring toolset deduplication.
#[must_use]
pub fn resolve_by_short_name<'a>(
    short_name: &str,
    candidates: &'a [Arc<ToolDefinition>],
) -> Option<&'a Arc<ToolDefinition>> {
    candidates.iter().find(|tool| tool.name == short_name)
}

#[cfg(test)]
mod tests;

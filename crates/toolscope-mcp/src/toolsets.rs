// crates/toolscope-mcp/src/toolsets.rs
// ============================================================================
// Module: Toolsets
// Description: Startup-time resolution of declared scopes into tool lists.
// Purpose: Build the read-only scope -> tools lookup table.
// Dependencies: toolscope-config
// ============================================================================

//! ## Overview
//! Toolsets are resolved once at startup from the tool catalog and the
//! declared `[[toolsets]]` configuration, then held read-only by the router.
//! References to tools missing from the catalog are dropped silently since
//! partial configuration is expected while upstream services evolve.
//!
//! A reserved [`ALL_TOOLSET`] scope is always synthesized: the union of
//! every declared scope, deduplicated by short name with the first
//! occurrence (in declaration order) winning.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::ToolDefinition;
use crate::config::ToolsetConfig;
use crate::tool_names::resolve_by_short_name;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Reserved name of the synthesized union toolset.
pub const ALL_TOOLSET: &str = "all";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Resolved scope -> tool list mapping.
///
/// # Invariants
/// - Always contains [`ALL_TOOLSET`].
/// - The `all` list never holds two tools with the same short name.
/// - Never mutated after [`resolve_toolsets`] returns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toolsets {
    /// Tools per scope name.
    scopes: BTreeMap<String, Vec<Arc<ToolDefinition>>>,
}

impl Toolsets {
    /// Returns the tools granted by `scope`, if the scope exists.
    #[must_use]
    pub fn get(&self, scope: &str) -> Option<&[Arc<ToolDefinition>]> {
        self.scopes.get(scope).map(Vec::as_slice)
    }

    /// Returns the synthesized union toolset.
    #[must_use]
    pub fn all(&self) -> &[Arc<ToolDefinition>] {
        self.get(ALL_TOOLSET).unwrap_or_default()
    }

    /// Returns true when `scope` is known.
    #[must_use]
    pub fn contains(&self, scope: &str) -> bool {
        self.scopes.contains_key(scope)
    }

    /// Returns all scope names, including [`ALL_TOOLSET`].
    pub fn scope_names(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }

    /// Returns the number of scopes, including [`ALL_TOOLSET`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Returns true when no scopes exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Resolves a caller-facing tool name within `scope`.
    ///
    /// Returns `None` when the scope is unknown or grants no tool with that
    /// short name.
    #[must_use]
    pub fn resolve_tool(&self, scope: &str, short_name: &str) -> Option<&Arc<ToolDefinition>> {
        self.scopes.get(scope).and_then(|tools| resolve_by_short_name(short_name, tools))
    }
}

// ============================================================================
// SECTION: Resolution
// ============================================================================

/// Resolves declared toolsets against the tool catalog.
///
/// For each declared scope the result lists catalog tools whose full name is
/// referenced, in reference order. When the catalog holds several entries
/// with one full name the first wins; repeated references within one scope
/// are listed once. A declared `all` scope is overridden by the synthesized
/// union. When a scope name is declared twice the first declaration wins.
#[must_use]
pub fn resolve_toolsets(catalog: &[Arc<ToolDefinition>], declared: &[ToolsetConfig]) -> Toolsets {
    let mut by_full_name: HashMap<&str, &Arc<ToolDefinition>> = HashMap::new();
    for tool in catalog {
        by_full_name.entry(tool.full_name.as_str()).or_insert(tool);
    }

    let mut scopes = BTreeMap::new();
    let mut all = Vec::new();
    let mut all_names = HashSet::new();
    for toolset in declared {
        if scopes.contains_key(&toolset.name) {
            continue;
        }
        let mut referenced = HashSet::new();
        let mut tools = Vec::new();
        for full_name in &toolset.tools {
            if !referenced.insert(full_name.as_str()) {
                continue;
            }
            if let Some(tool) = by_full_name.get(full_name.as_str()) {
                tools.push(Arc::clone(tool));
            }
        }
        for tool in &tools {
            if all_names.insert(tool.name.clone()) {
                all.push(Arc::clone(tool));
            }
        }
        scopes.insert(toolset.name.clone(), tools);
    }
    scopes.insert(ALL_TOOLSET.to_string(), all);

    Toolsets {
        scopes,
    }
}

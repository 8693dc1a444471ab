// crates/toolscope-mcp/src/catalog.rs
// ============================================================================
// Module: Tool Catalog
// Description: Tool definitions supplied by the upstream API translator.
// Purpose: Describe one callable operation and its naming components.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ToolDefinition`] is produced outside this crate (from upstream API
//! descriptions) and handed in once at startup. Definitions are immutable and
//! shared by reference: toolsets hold `Arc<ToolDefinition>` clones of catalog
//! entries rather than copies.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::tool_names::TOOL_NAME_SEPARATOR;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A callable operation exposed to MCP clients.
///
/// # Invariants
/// - `full_name` is `service.name` for definitions built with [`Self::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Caller-facing short name.
    pub name: String,
    /// Fully-qualified name (`service.operation`).
    pub full_name: String,
    /// Upstream service tag (for example `controller` or `eda`).
    pub service: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// JSON schema for the tool arguments.
    #[serde(default)]
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Builds a definition whose full name is `service.name`.
    #[must_use]
    pub fn new(service: impl Into<String>, name: impl Into<String>) -> Self {
        let service = service.into();
        let name = name.into();
        Self {
            full_name: format!("{service}{TOOL_NAME_SEPARATOR}{name}"),
            name,
            service,
            description: String::new(),
            input_schema: Value::Null,
        }
    }

    /// Returns a copy with the description set.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns a copy with the input schema set.
    #[must_use]
    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }
}

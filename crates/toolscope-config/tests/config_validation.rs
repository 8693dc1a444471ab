// crates/toolscope-config/tests/config_validation.rs
// ============================================================================
// Module: Config Validation Tests
// Description: Loading and fail-closed validation of toolscope.toml.
// Purpose: Ensure defaults, toolset ordering, and limits behave as documented.
// Dependencies: toolscope-config, tempfile
// ============================================================================

//! Configuration loading and validation tests.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use std::io::Write;
use std::time::Duration;

use toolscope_config::AuditSinkKind;
use toolscope_config::ConfigError;
use toolscope_config::DEFAULT_IDLE_TIMEOUT_SECS;
use toolscope_config::ToolscopeConfig;
use toolscope_config::ToolsetConfig;

// ============================================================================
// SECTION: Defaults
// ============================================================================

#[test]
fn empty_config_uses_defaults() {
    let config = ToolscopeConfig::from_toml_str("").unwrap();
    assert_eq!(config.sessions.idle_timeout_secs, DEFAULT_IDLE_TIMEOUT_SECS);
    assert_eq!(config.sessions.idle_timeout(), Duration::from_secs(120));
    assert_eq!(config.audit.sink, AuditSinkKind::Stderr);
    assert!(config.toolsets.is_empty());
}

#[test]
fn toolsets_preserve_declaration_order() {
    let config = ToolscopeConfig::from_toml_str(
        r#"
[sessions]
idle_timeout_secs = 30

[[toolsets]]
name = "operator"
tools = ["controller.jobs_list"]

[[toolsets]]
name = "admin"
tools = ["eda.tool1", "controller.tool1"]
"#,
    )
    .unwrap();
    assert_eq!(config.sessions.idle_timeout(), Duration::from_secs(30));
    assert_eq!(
        config.toolsets,
        vec![
            ToolsetConfig::new("operator", ["controller.jobs_list"]),
            ToolsetConfig::new("admin", ["eda.tool1", "controller.tool1"]),
        ]
    );
}

#[test]
fn declared_all_toolset_is_accepted() {
    let config = ToolscopeConfig::from_toml_str(
        r#"
[[toolsets]]
name = "all"
tools = ["eda.tool1"]
"#,
    )
    .unwrap();
    assert_eq!(config.toolsets[0].name, "all");
}

// ============================================================================
// SECTION: Rejections
// ============================================================================

#[test]
fn zero_idle_timeout_is_rejected() {
    let err = ToolscopeConfig::from_toml_str("[sessions]\nidle_timeout_secs = 0\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn oversized_idle_timeout_is_rejected() {
    let err =
        ToolscopeConfig::from_toml_str("[sessions]\nidle_timeout_secs = 86401\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn duplicate_toolset_names_are_rejected() {
    let err = ToolscopeConfig::from_toml_str(
        r#"
[[toolsets]]
name = "admin"
tools = []

[[toolsets]]
name = "admin"
tools = ["eda.tool1"]
"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("duplicate toolset name"));
}

#[test]
fn empty_toolset_name_is_rejected() {
    let err = ToolscopeConfig::from_toml_str("[[toolsets]]\nname = \" \"\n").unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
}

#[test]
fn empty_tool_reference_is_rejected() {
    let err = ToolscopeConfig::from_toml_str("[[toolsets]]\nname = \"admin\"\ntools = [\"\"]\n")
        .unwrap_err();
    assert!(err.to_string().contains("empty tool name"));
}

#[test]
fn file_sink_requires_path() {
    let err = ToolscopeConfig::from_toml_str("[audit]\nsink = \"file\"\n").unwrap_err();
    assert!(err.to_string().contains("audit.path"));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = ToolscopeConfig::from_toml_str("[sessions\n").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn load_reads_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[audit]\nsink = \"none\"\n\n[[toolsets]]\nname = \"admin\"\ntools = [\"eda.tool1\"]"
    )
    .unwrap();
    let config = ToolscopeConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.audit.sink, AuditSinkKind::None);
    assert_eq!(config.toolsets.len(), 1);
    assert!(config.source_modified_at.is_some());
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ToolscopeConfig::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Io(_)));
}

//! Configuration loading
//!
//! This module provides:
//! - `RenderOptions` - How compiled schemas are written out (library-public)
//! - `Config` - Full editor configuration loaded from config.toml (CLI-only)

#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

// =============================================================================
// Library-public types (always available)
// =============================================================================

/// Output formatting for compiled schemas.
///
/// # Example
///
/// ```
/// use schema_forge::{compile, render_schema, RenderOptions};
///
/// let options = RenderOptions { pretty: false, indent: 0 };
/// let text = render_schema(&compile(&[]), &options).unwrap();
/// assert_eq!(text, r#"{"type":"object","properties":{}}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Multi-line output (default: true)
    pub pretty: bool,
    /// Spaces per nesting level when pretty (default: 2)
    pub indent: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: 2,
        }
    }
}

// =============================================================================
// CLI-only types (gated behind "cli" feature)
// =============================================================================

/// Main configuration structure loaded from config.toml
#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub output: OutputConfig,
    pub editor: EditorConfig,
}

#[cfg(feature = "cli")]
impl Config {
    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Config::default()),
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Get the config directory path (~/.config/schema-forge)
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("schema-forge"))
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Where tracing output is written (default: /tmp/schema-forge.log)
    pub log_file: PathBuf,
    /// EnvFilter directive for tracing
    pub log_filter: String,
}

#[cfg(feature = "cli")]
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_file: std::env::temp_dir().join("schema-forge.log"),
            log_filter: "info,schema_forge=debug".to_string(),
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub pretty: bool,
    pub indent: usize,
    /// Default destination for `export` when no path is given
    pub export_path: Option<PathBuf>,
}

#[cfg(feature = "cli")]
impl Default for OutputConfig {
    fn default() -> Self {
        let render = RenderOptions::default();
        Self {
            pretty: render.pretty,
            indent: render.indent,
            export_path: None,
        }
    }
}

#[cfg(feature = "cli")]
impl OutputConfig {
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            pretty: self.pretty,
            indent: self.indent,
        }
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Drop `items`/`properties` when a field's type no longer uses them
    pub clear_on_retype: bool,
    /// Append field ids to outline rows
    pub show_ids: bool,
}

#[cfg(feature = "cli")]
impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            clear_on_retype: true,
            show_ids: false,
        }
    }
}

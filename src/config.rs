//! Site configuration module.
//!
//! Handles loading, validating, and merging `folio.toml`. Stock defaults are
//! overridden by a user config file in the config directory, and command-line
//! flags override both (see `main.rs`).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [placeholder]
//! max_edge = 10             # Longer edge of the inline blur preview, in px
//!
//! [remote]
//! # base_url = "https://photos.example.com"
//! manifest_ttl_secs = 3600  # How long a fetched manifest stays fresh
//! timeout_secs = 10         # HTTP timeout for the manifest fetch
//!
//! [gallery]
//! title = "Gallery"
//! grid_gap = "1rem"         # Gap between grid columns and tiles
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [remote]
//! base_url = "https://photos.example.com"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Name of the config file looked up in the config directory.
pub const CONFIG_FILENAME: &str = "folio.toml";

/// Upper bound for `placeholder.max_edge`. Anything larger stops being a
/// placeholder and bloats every manifest entry.
const MAX_PLACEHOLDER_EDGE: u32 = 64;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `folio.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Inline placeholder generation.
    pub placeholder: PlaceholderSettings,
    /// Remote object store the gallery reads from.
    pub remote: RemoteConfig,
    /// Rendered gallery settings.
    pub gallery: GalleryConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.placeholder.max_edge == 0 || self.placeholder.max_edge > MAX_PLACEHOLDER_EDGE {
            return Err(ConfigError::Validation(format!(
                "placeholder.max_edge must be 1-{MAX_PLACEHOLDER_EDGE}"
            )));
        }
        if self.remote.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "remote.timeout_secs must be non-zero".into(),
            ));
        }
        if let Some(url) = &self.remote.base_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::Validation(format!(
                "remote.base_url must be an http(s) URL, got {url:?}"
            )));
        }
        Ok(())
    }
}

/// Placeholder generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderSettings {
    /// Longer-edge bound of the preview raster, in pixels.
    pub max_edge: u32,
}

impl Default for PlaceholderSettings {
    fn default() -> Self {
        Self {
            max_edge: crate::imaging::DEFAULT_PLACEHOLDER_EDGE,
        }
    }
}

/// Remote object store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemoteConfig {
    /// Public base URL of the bucket holding the images and `manifest.json`.
    /// When absent the gallery reads the local manifest only.
    pub base_url: Option<String>,
    /// Seconds a fetched manifest is served without refetching.
    pub manifest_ttl_secs: u64,
    /// HTTP timeout for the manifest request, in seconds.
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            manifest_ttl_secs: 3600,
            timeout_secs: 10,
        }
    }
}

impl RemoteConfig {
    pub fn manifest_ttl(&self) -> Duration {
        Duration::from_secs(self.manifest_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Rendered gallery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Page heading and `<title>`.
    pub title: String,
    /// Gap between masonry columns and tiles (CSS value).
    pub grid_gap: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            title: "Gallery".to_string(),
            grid_gap: "1rem".to_string(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `folio.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no config file exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `folio.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `folio.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags override values set here.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Inline placeholder (blurDataURL)
# ---------------------------------------------------------------------------
[placeholder]
# Longer edge of the tiny preview embedded in the manifest, in pixels (1-64).
max_edge = 10

# ---------------------------------------------------------------------------
# Remote object store
# ---------------------------------------------------------------------------
[remote]
# Public base URL serving the images and manifest.json.
# Can also be set with FOLIO_REMOTE_BASE_URL or --remote-base.
# base_url = "https://photos.example.com"

# Seconds a fetched manifest is reused before it is fetched again.
manifest_ttl_secs = 3600

# HTTP timeout for the manifest request, in seconds.
timeout_secs = 10

# ---------------------------------------------------------------------------
# Rendered gallery
# ---------------------------------------------------------------------------
[gallery]
title = "Gallery"

# Gap between masonry columns and tiles (CSS value).
grid_gap = "1rem"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}

/// Generate CSS custom properties from gallery config.
pub fn generate_theme_css(gallery: &GalleryConfig) -> String {
    format!(
        r#":root {{
    --grid-gap: {grid_gap};
}}"#,
        grid_gap = gallery.grid_gap,
    )
}

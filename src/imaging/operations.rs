//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::fit_inside;
use super::params::{PlaceholderFormat, PlaceholderParams};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Longer-edge bound of the inline preview, in pixels.
pub const DEFAULT_PLACEHOLDER_EDGE: u32 = 10;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Configuration for placeholder generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderConfig {
    pub max_edge: u32,
    pub format: PlaceholderFormat,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            max_edge: DEFAULT_PLACEHOLDER_EDGE,
            format: PlaceholderFormat::default(),
        }
    }
}

/// Plan a placeholder operation without executing it.
///
/// Useful for testing parameter generation.
pub fn plan_placeholder(
    source: &Path,
    original_dims: (u32, u32),
    config: &PlaceholderConfig,
) -> PlaceholderParams {
    let (width, height) = fit_inside(original_dims, config.max_edge);
    PlaceholderParams {
        source: source.to_path_buf(),
        width,
        height,
        format: config.format,
    }
}

/// Wrap encoded bytes as `data:image/<subtype>;base64,<payload>`.
pub fn data_url(format: PlaceholderFormat, bytes: &[u8]) -> String {
    format!(
        "data:image/{};base64,{}",
        format.mime_subtype(),
        BASE64.encode(bytes)
    )
}

/// Create the inline placeholder for one image.
///
/// Shrinks the source to fit inside `config.max_edge`, re-encodes it and
/// returns a self-contained data URL.
pub fn create_placeholder(
    backend: &impl ImageBackend,
    source: &Path,
    original_dims: (u32, u32),
    config: &PlaceholderConfig,
) -> Result<String> {
    let params = plan_placeholder(source, original_dims, config);
    let bytes = backend.placeholder(&params)?;
    Ok(data_url(params.format, &bytes))
}

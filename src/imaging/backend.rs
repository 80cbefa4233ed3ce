//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the manifest builder
//! needs: identify (read dimensions) and placeholder (decode, shrink,
//! re-encode in memory).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests swap in the
//! mock below.

use super::params::PlaceholderParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a decodable image. The builder skips such files.
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// `Sync` so a single backend can be shared across rayon workers.
pub trait ImageBackend: Sync {
    /// Get image dimensions. Zero-sized images are a decode error.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Decode the source, resize to exactly `width`x`height` and return the
    /// encoded bytes.
    fn placeholder(&self, params: &PlaceholderParams) -> Result<Vec<u8>, BackendError>;
}

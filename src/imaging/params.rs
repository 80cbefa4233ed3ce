//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what to produce) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`PlaceholderFormat`]: lossless raster format of the inline preview.
//! - [`PlaceholderParams`]: source path and exact output size of one placeholder.

use std::path::PathBuf;

/// Encoding of the inline placeholder.
///
/// Only lossless formats belong here: the preview is a handful of pixels and
/// lossy artifacts would dominate it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaceholderFormat {
    #[default]
    Png,
}

impl PlaceholderFormat {
    /// Subtype used in the `data:image/<subtype>;base64,` prefix.
    pub fn mime_subtype(self) -> &'static str {
        match self {
            PlaceholderFormat::Png => "png",
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            PlaceholderFormat::Png => image::ImageFormat::Png,
        }
    }
}

/// Parameters for a placeholder operation (decode + exact resize + encode).
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceholderParams {
    pub source: PathBuf,
    /// Final raster dimensions, already fitted to the bound.
    pub width: u32,
    pub height: u32,
    pub format: PlaceholderFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_format_is_png() {
        assert_eq!(PlaceholderFormat::default(), PlaceholderFormat::Png);
        assert_eq!(PlaceholderFormat::Png.mime_subtype(), "png");
        assert_eq!(
            PlaceholderFormat::Png.image_format(),
            image::ImageFormat::Png
        );
    }
}

//! Manifest data model shared by the builder, the loader and the viewer.
//!
//! The JSON layout is fixed by the deployed `manifest.json` files:
//!
//! ```json
//! [
//!   {
//!     "src": "001-kyoto.jpg",
//!     "alt": "",
//!     "width": 4000,
//!     "height": 3000,
//!     "blurDataURL": "data:image/png;base64,iVBORw0KGgo..."
//!   }
//! ]
//! ```
//!
//! Array order is the display and navigation order.

use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;

/// One photo in the manifest.
///
/// Dimensions are [`NonZeroU32`] so a zero-sized entry can neither be built
/// nor deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoEntry {
    /// File name relative to the image root. Unique within a manifest.
    pub src: String,
    /// Accessible description. Empty until curated by hand.
    #[serde(default)]
    pub alt: String,
    pub width: NonZeroU32,
    pub height: NonZeroU32,
    /// Inline `data:image/<fmt>;base64,...` preview.
    #[serde(
        rename = "blurDataURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub blur_data_url: Option<String>,
}

impl PhotoEntry {
    /// Build an entry, returning `None` when either dimension is zero.
    pub fn new(
        src: impl Into<String>,
        width: u32,
        height: u32,
        blur_data_url: Option<String>,
    ) -> Option<Self> {
        Some(Self {
            src: src.into(),
            alt: String::new(),
            width: NonZeroU32::new(width)?,
            height: NonZeroU32::new(height)?,
            blur_data_url,
        })
    }

    /// Text for `alt` attributes and titles: the curated `alt`, else `src`.
    pub fn display_alt(&self) -> &str {
        if self.alt.is_empty() {
            &self.src
        } else {
            &self.alt
        }
    }

    /// Full-resolution address of this photo under `base`.
    ///
    /// Grid and lightbox both go through here so they always agree.
    pub fn asset_url(&self, base: &str) -> String {
        format!("{}/{}", base.trim_end_matches('/'), self.src)
    }
}

/// Ordered list of photos.
///
/// Serializes as a bare JSON array. Read-only once constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(Vec<PhotoEntry>);

impl Manifest {
    pub fn new(entries: Vec<PhotoEntry>) -> Self {
        Self(entries)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[PhotoEntry] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&PhotoEntry> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PhotoEntry> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a PhotoEntry;
    type IntoIter = std::slice::Iter<'a, PhotoEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

//! # Folio
//!
//! A photo portfolio in two halves: an offline manifest builder and a static
//! gallery renderer that reads the manifest back.
//!
//! ```text
//! folio manifest   photos/        →  manifest.json    (geometry + inline placeholders)
//!                  manifest.json  →  object store     (uploaded with the images)
//! folio render     object store   →  site/            (grid + one lightbox page per photo)
//! ```
//!
//! The manifest is the only contract between the two: a JSON array of
//! `{src, alt, width, height, blurDataURL?}`, ordered by file name. That
//! order is the display order and the lightbox navigation order.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`manifest`] | Lists the source directory, probes each image in parallel, writes `manifest.json` |
//! | [`imaging`] | Pure-Rust dimension probe and placeholder synthesis behind the [`imaging::ImageBackend`] trait |
//! | [`cache`] | Content-addressed placeholder cache for incremental builds |
//! | [`loader`] | Remote → local → empty manifest resolution with a freshness window |
//! | [`gallery`] | Viewer state owner, masonry grid, static site writer (Maud) |
//! | [`lightbox`] | Circular navigation state machine and the overlay markup |
//! | [`types`] | `PhotoEntry` and `Manifest`, shared by every stage |
//! | [`config`] | `folio.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Placeholders Live In The Manifest
//!
//! Each entry carries a tiny PNG (10px on the long edge by default) as a
//! base64 data URL. The grid can paint every tile's colours before a single
//! full image arrives, with no extra request per photo.
//!
//! ## Failure Stays Local
//!
//! A corrupt image drops out of the manifest and is reported; the rest of the
//! batch is unaffected. On the viewing side, a missing or broken manifest
//! degrades to the local copy and then to an empty gallery. The only fatal
//! error is failing to write the manifest itself.
//!
//! ## One Page Per Viewer State
//!
//! The lightbox is a two-state machine, `Closed` or `Open(i)`. The renderer
//! writes one page per state, so navigation works without JavaScript; a few
//! lines of script only add keyboard shortcuts.

pub mod cache;
pub mod config;
pub mod gallery;
pub mod imaging;
pub mod lightbox;
pub mod loader;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod types;

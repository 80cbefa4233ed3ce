//! Gallery presenter and static site renderer.
//!
//! [`Gallery`] pairs a loaded manifest with the viewer state and is the only
//! thing that changes that state. [`render_grid`] draws the masonry grid as a
//! pure function of the manifest; [`render_site`] writes one HTML page per
//! viewer state:
//!
//! ```text
//! site/
//! ├── index.html        # Closed: title + grid
//! └── photo/
//!     ├── 1.html        # Open(0): lightbox
//!     ├── 2.html        # Open(1)
//!     └── ...
//! ```
//!
//! Pages are self-contained: the stylesheet is inlined and images are
//! referenced at `<image_base>/<src>`.

use crate::config::{GalleryConfig, generate_theme_css};
use crate::lightbox::{PHOTO_DIR, ViewerState, page_name, page_path, render_lightbox};
use crate::types::{Manifest, PhotoEntry};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Shown instead of the grid when the manifest has no entries.
pub const EMPTY_MESSAGE: &str = "No photos available yet.";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A loaded gallery and its viewer state.
#[derive(Debug, Clone)]
pub struct Gallery {
    manifest: Manifest,
    image_base: String,
    state: ViewerState,
    config: GalleryConfig,
}

impl Gallery {
    pub fn new(manifest: Manifest, image_base: impl Into<String>) -> Self {
        Self {
            manifest,
            image_base: image_base.into(),
            state: ViewerState::Closed,
            config: GalleryConfig::default(),
        }
    }

    pub fn with_config(mut self, config: GalleryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn image_base(&self) -> &str {
        &self.image_base
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    /// Open photo `index`. Indices past the end are ignored.
    pub fn open(&mut self, index: usize) {
        if index < self.manifest.len() {
            self.state = self.state.open(index);
        }
    }

    pub fn close(&mut self) {
        self.state = self.state.close();
    }

    pub fn prev(&mut self) {
        if !self.manifest.is_empty() {
            self.state = self.state.prev(self.manifest.len());
        }
    }

    pub fn next(&mut self) {
        if !self.manifest.is_empty() {
            self.state = self.state.next(self.manifest.len());
        }
    }

    /// The entry shown in the lightbox, if one is open.
    pub fn selected(&self) -> Option<&PhotoEntry> {
        self.selected_at(self.state)
    }

    fn selected_at(&self, state: ViewerState) -> Option<&PhotoEntry> {
        state.index().and_then(|i| self.manifest.get(i))
    }

    /// Full HTML document for the current state.
    pub fn render(&self) -> Markup {
        render_state(self, self.state)
    }

    fn css(&self) -> String {
        format!("{}\n\n{}", generate_theme_css(&self.config), CSS_STATIC)
    }
}

fn tile_style(entry: &PhotoEntry) -> Option<String> {
    entry
        .blur_data_url
        .as_ref()
        .map(|blur| format!("background-image: url({blur});"))
}

/// Masonry grid of `manifest`, in manifest order.
///
/// Each tile links to its lightbox page, reserves its box with the natural
/// `width`/`height`, and shows the inline placeholder until the image loads.
/// An empty manifest yields the "no photos" message.
pub fn render_grid(manifest: &Manifest, image_base: &str) -> Markup {
    if manifest.is_empty() {
        return html! { p.no-photos { (EMPTY_MESSAGE) } };
    }

    html! {
        div.photo-grid {
            @for (index, entry) in manifest.iter().enumerate() {
                a.photo-tile href=(page_path(index)) style=[tile_style(entry)] {
                    img src=(entry.asset_url(image_base))
                        alt=(entry.display_alt())
                        width=(entry.width.get())
                        height=(entry.height.get())
                        loading="lazy"
                        decoding="async";
                }
            }
        }
    }
}

fn base_document(title: &str, css: &str, body_class: Option<&str>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body class=[body_class] {
                (content)
            }
        }
    }
}

fn render_index(gallery: &Gallery) -> Markup {
    let manifest = gallery.manifest();
    let content = if manifest.is_empty() {
        html! {
            main.gallery-empty {
                h1 { (gallery.title()) }
                (render_grid(manifest, gallery.image_base()))
            }
        }
    } else {
        html! {
            main.gallery {
                header.gallery-header {
                    h1 { (gallery.title()) }
                    p {
                        (manifest.len())
                        @if manifest.len() == 1 { " photo" } @else { " photos" }
                    }
                }
                (render_grid(manifest, gallery.image_base()))
            }
        }
    };
    base_document(gallery.title(), &gallery.css(), None, content)
}

fn render_state(gallery: &Gallery, state: ViewerState) -> Markup {
    match render_lightbox(gallery.manifest(), state, gallery.image_base()) {
        Some(overlay) => {
            let heading = gallery
                .selected_at(state)
                .map(PhotoEntry::display_alt)
                .unwrap_or_default();
            let page_title = format!("{} - {}", gallery.title(), heading);
            base_document(&page_title, &gallery.css(), Some("lightbox-open"), overlay)
        }
        None => render_index(gallery),
    }
}

/// What [`render_site`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteReport {
    pub index: PathBuf,
    pub photo_pages: usize,
}

/// Write `index.html` plus one page per photo into `out_dir`.
///
/// `photo/` is rebuilt from scratch so pages of photos no longer in the
/// manifest do not linger.
pub fn render_site(gallery: &Gallery, out_dir: &Path) -> Result<SiteReport, RenderError> {
    fs::create_dir_all(out_dir)?;

    let index = out_dir.join("index.html");
    fs::write(&index, render_state(gallery, ViewerState::Closed).into_string())?;

    let photo_dir = out_dir.join(PHOTO_DIR);
    if photo_dir.exists() {
        fs::remove_dir_all(&photo_dir)?;
    }

    let count = gallery.manifest().len();
    if count > 0 {
        fs::create_dir_all(&photo_dir)?;
    }
    for i in 0..count {
        let page = render_state(gallery, ViewerState::Closed.open(i));
        fs::write(photo_dir.join(page_name(i)), page.into_string())?;
    }

    debug!(out = %out_dir.display(), pages = count, "site rendered");
    Ok(SiteReport {
        index,
        photo_pages: count,
    })
}

//! Lightbox: the single-photo overlay and its navigation.
//!
//! The viewer is a two-state machine:
//!
//! ```text
//!            open(i)                 prev / next (wraps)
//!  Closed ───────────► Open(i) ◄──────────────────────┐
//!    ▲                   │  └─────────────────────────┘
//!    └──── close ────────┘
//! ```
//!
//! In the rendered site each state is a page: `index.html` is `Closed` and
//! `photo/<i+1>.html` is `Open(i)`. Controls are plain links to the page of
//! the target state, and `static/lightbox.js` maps Escape, ArrowLeft and
//! ArrowRight onto the same links through the overlay's `data-*` attributes.

use crate::types::Manifest;
use maud::{Markup, PreEscaped, html};

const KEYBOARD_JS: &str = include_str!("../static/lightbox.js");

/// Directory (relative to the site root) holding one page per photo.
pub const PHOTO_DIR: &str = "photo";

/// Where the close transition leads, relative to a photo page.
const CLOSE_HREF: &str = "../index.html";

/// Index of the photo before `index`, wrapping from the first to the last.
///
/// # Panics
///
/// `count` must be at least 1; an open lightbox always has a photo.
pub fn prev_index(index: usize, count: usize) -> usize {
    debug_assert!(count >= 1, "navigation needs at least one photo");
    (index + count - 1) % count
}

/// Index of the photo after `index`, wrapping from the last to the first.
///
/// # Panics
///
/// `count` must be at least 1.
pub fn next_index(index: usize, count: usize) -> usize {
    debug_assert!(count >= 1, "navigation needs at least one photo");
    (index + 1) % count
}

/// Which photo, if any, the viewer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerState {
    #[default]
    Closed,
    Open(usize),
}

impl ViewerState {
    /// Show photo `index`, from any state.
    pub fn open(self, index: usize) -> Self {
        ViewerState::Open(index)
    }

    /// Dismiss the overlay. Closing a closed viewer is a no-op.
    pub fn close(self) -> Self {
        ViewerState::Closed
    }

    /// Step back among `count` photos. No-op when closed.
    pub fn prev(self, count: usize) -> Self {
        match self {
            ViewerState::Open(i) => ViewerState::Open(prev_index(i, count)),
            ViewerState::Closed => ViewerState::Closed,
        }
    }

    /// Step forward among `count` photos. No-op when closed.
    pub fn next(self, count: usize) -> Self {
        match self {
            ViewerState::Open(i) => ViewerState::Open(next_index(i, count)),
            ViewerState::Closed => ViewerState::Closed,
        }
    }

    pub fn index(self) -> Option<usize> {
        match self {
            ViewerState::Open(i) => Some(i),
            ViewerState::Closed => None,
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, ViewerState::Open(_))
    }
}

/// File name of the page showing photo `index`, e.g. `3.html` for index 2.
pub fn page_name(index: usize) -> String {
    format!("{}.html", index + 1)
}

/// Path of that page relative to the site root, e.g. `photo/3.html`.
pub fn page_path(index: usize) -> String {
    format!("{}/{}", PHOTO_DIR, page_name(index))
}

/// Render the overlay for `state`.
///
/// `Closed`, or an index past the end of `manifest`, renders nothing at all.
pub fn render_lightbox(
    manifest: &Manifest,
    state: ViewerState,
    image_base: &str,
) -> Option<Markup> {
    let index = state.index()?;
    let entry = manifest.get(index)?;
    let count = manifest.len();

    let prev = page_name(prev_index(index, count));
    let next = page_name(next_index(index, count));
    let title = entry.display_alt();

    let mut frame_style = format!(
        "aspect-ratio: {} / {};",
        entry.width.get(),
        entry.height.get()
    );
    if let Some(blur) = &entry.blur_data_url {
        frame_style.push_str(&format!(" background-image: url({blur});"));
    }

    Some(html! {
        div.lightbox role="dialog" aria-modal="true" aria-label=(title)
            data-close=(CLOSE_HREF) data-prev=(prev) data-next=(next) {
            a.lightbox-backdrop href=(CLOSE_HREF) aria-label="Close" {}
            figure.lightbox-frame style=(frame_style) {
                img.lightbox-image
                    src=(entry.asset_url(image_base))
                    alt=(title)
                    width=(entry.width.get())
                    height=(entry.height.get());
                figcaption.lightbox-title { (title) }
            }
            a.lightbox-close href=(CLOSE_HREF) aria-label="Close" { "×" }
            a.lightbox-prev href=(prev) rel="prev" aria-label="Previous photo" { "‹" }
            a.lightbox-next href=(next) rel="next" aria-label="Next photo" { "›" }
            span.lightbox-counter { (index + 1) " / " (count) }
        }
        script { (PreEscaped(KEYBOARD_JS)) }
    })
}

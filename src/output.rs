//! CLI output formatting for both commands.
//!
//! Output is **information-first**: each photo is shown by its position and
//! name, with details (cache status, failure reason, output page) as
//! indented context lines.
//!
//! # Output Format
//!
//! ## Manifest
//!
//! ```text
//! Photos (3 found)
//!     001 01-harbour.jpg
//!     002 02-market.jpg (cached)
//!     Skipped broken.jpg
//!         Decode failed: broken.jpg: ...
//! 2 written, 1 skipped
//! Manifest → public/manifest.json
//! Cache: 1 cached, 1 decoded (2 total)
//! ```
//!
//! ## Render
//!
//! ```text
//! Manifest: remote (2 photos)
//! Home → index.html
//!     001 Harbour at dusk → photo/1.html
//!     002 02-market.jpg → photo/2.html
//! Generated 1 index, 2 photo pages
//! ```
//!
//! # Architecture
//!
//! Each piece has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::gallery::{EMPTY_MESSAGE, Gallery, SiteReport};
use crate::lightbox::page_path;
use crate::loader::{LoadOutcome, ManifestSource};
use crate::manifest::{BuildEvent, BuildReport};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn photos(n: usize) -> String {
    if n == 1 {
        "1 photo".to_string()
    } else {
        format!("{n} photos")
    }
}

// ============================================================================
// Manifest command
// ============================================================================

/// Format a single build progress event as display lines.
pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::Started { total } => vec![format!("Photos ({} found)", total)],
        BuildEvent::Processed {
            index, src, cached, ..
        } => {
            let marker = if *cached { " (cached)" } else { "" };
            vec![format!("    {} {}{}", format_index(*index), src, marker)]
        }
        BuildEvent::Failed { src, reason } => vec![
            format!("    Skipped {}", src),
            format!("        {}", reason),
        ],
        BuildEvent::Finished { written, failed } => {
            vec![format!("{} written, {} skipped", written, failed)]
        }
    }
}

/// Format the closing lines of a manifest build.
pub fn format_build_summary(report: &BuildReport, output: &Path) -> Vec<String> {
    vec![
        format!("Manifest \u{2192} {}", output.display()),
        format!("Cache: {}", report.cache_stats),
    ]
}

/// Print one build event to stdout.
pub fn print_build_event(event: &BuildEvent) {
    for line in format_build_event(event) {
        println!("{}", line);
    }
}

/// Print the build summary to stdout.
pub fn print_build_summary(report: &BuildReport, output: &Path) {
    for line in format_build_summary(report, output) {
        println!("{}", line);
    }
}

// ============================================================================
// Render command
// ============================================================================

/// Format which tier supplied the manifest and why earlier tiers were skipped.
pub fn format_load_outcome(outcome: &LoadOutcome) -> Vec<String> {
    let mut lines = vec![match outcome.source {
        ManifestSource::Remote => format!("Manifest: remote ({})", photos(outcome.manifest.len())),
        ManifestSource::Local => format!("Manifest: local ({})", photos(outcome.manifest.len())),
        ManifestSource::Empty => format!("Manifest: none available. {}", EMPTY_MESSAGE),
    }];
    for attempt in &outcome.attempts {
        lines.push(format!("    Skipped {}", attempt));
    }
    lines
}

/// Format the pages written by a render, one line per photo.
pub fn format_render_output(gallery: &Gallery, report: &SiteReport) -> Vec<String> {
    let mut lines = vec!["Home \u{2192} index.html".to_string()];
    for (i, entry) in gallery.manifest().iter().enumerate() {
        lines.push(format!(
            "    {} {} \u{2192} {}",
            format_index(i + 1),
            entry.display_alt(),
            page_path(i)
        ));
    }
    lines.push(format!(
        "Generated 1 index, {} photo page{}",
        report.photo_pages,
        if report.photo_pages == 1 { "" } else { "s" }
    ));
    lines
}

pub fn print_load_outcome(outcome: &LoadOutcome) {
    for line in format_load_outcome(outcome) {
        println!("{}", line);
    }
}

pub fn print_render_output(gallery: &Gallery, report: &SiteReport) {
    for line in format_render_output(gallery, report) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStats;
    use crate::loader::{FetchError, TierFailure};
    use crate::types::{Manifest, PhotoEntry};
    use std::path::PathBuf;

    fn two() -> Manifest {
        let mut first = PhotoEntry::new("01-harbour.jpg", 4, 3, None).unwrap();
        first.alt = "Harbour at dusk".into();
        Manifest::new(vec![
            first,
            PhotoEntry::new("02-market.jpg", 3, 4, None).unwrap(),
        ])
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    // =========================================================================
    // Build events
    // =========================================================================

    #[test]
    fn build_started() {
        let lines = format_build_event(&BuildEvent::Started { total: 6 });
        assert_eq!(lines, vec!["Photos (6 found)"]);
    }

    #[test]
    fn build_processed_marks_cache_hits() {
        let fresh = format_build_event(&BuildEvent::Processed {
            index: 1,
            total: 2,
            src: "a.jpg".into(),
            cached: false,
        });
        let hit = format_build_event(&BuildEvent::Processed {
            index: 2,
            total: 2,
            src: "b.jpg".into(),
            cached: true,
        });
        assert_eq!(fresh, vec!["    001 a.jpg"]);
        assert_eq!(hit, vec!["    002 b.jpg (cached)"]);
    }

    #[test]
    fn build_failed_shows_reason() {
        let lines = format_build_event(&BuildEvent::Failed {
            src: "broken.jpg".into(),
            reason: "Decode failed: not an image".into(),
        });
        assert_eq!(
            lines,
            vec!["    Skipped broken.jpg", "        Decode failed: not an image"]
        );
    }

    #[test]
    fn build_finished() {
        let lines = format_build_event(&BuildEvent::Finished {
            written: 5,
            failed: 1,
        });
        assert_eq!(lines, vec!["5 written, 1 skipped"]);
    }

    #[test]
    fn build_summary_shows_path_and_cache() {
        let report = BuildReport {
            manifest: two(),
            failures: Vec::new(),
            cache_stats: CacheStats { hits: 1, misses: 1 },
        };
        let lines = format_build_summary(&report, &PathBuf::from("public/manifest.json"));
        assert_eq!(
            lines,
            vec![
                "Manifest \u{2192} public/manifest.json",
                "Cache: 1 cached, 1 decoded (2 total)"
            ]
        );
    }

    // =========================================================================
    // Load outcome
    // =========================================================================

    #[test]
    fn load_outcome_remote() {
        let outcome = LoadOutcome {
            manifest: two(),
            source: ManifestSource::Remote,
            attempts: Vec::new(),
        };
        assert_eq!(format_load_outcome(&outcome), vec!["Manifest: remote (2 photos)"]);
    }

    #[test]
    fn load_outcome_local_lists_skipped_remote() {
        let outcome = LoadOutcome {
            manifest: Manifest::new(vec![PhotoEntry::new("a.jpg", 1, 1, None).unwrap()]),
            source: ManifestSource::Local,
            attempts: vec![TierFailure::Remote(FetchError::Status(503))],
        };
        let lines = format_load_outcome(&outcome);
        assert_eq!(lines[0], "Manifest: local (1 photo)");
        assert_eq!(lines[1], "    Skipped remote: unexpected HTTP status 503");
    }

    #[test]
    fn load_outcome_empty() {
        let outcome = LoadOutcome {
            manifest: Manifest::empty(),
            source: ManifestSource::Empty,
            attempts: Vec::new(),
        };
        let lines = format_load_outcome(&outcome);
        assert!(lines[0].contains(EMPTY_MESSAGE));
    }

    // =========================================================================
    // Render output
    // =========================================================================

    #[test]
    fn render_output_lists_pages() {
        let gallery = Gallery::new(two(), "");
        let report = SiteReport {
            index: PathBuf::from("site/index.html"),
            photo_pages: 2,
        };
        let lines = format_render_output(&gallery, &report);
        assert_eq!(
            lines,
            vec![
                "Home \u{2192} index.html",
                "    001 Harbour at dusk \u{2192} photo/1.html",
                "    002 02-market.jpg \u{2192} photo/2.html",
                "Generated 1 index, 2 photo pages",
            ]
        );
    }

    #[test]
    fn render_output_empty_gallery() {
        let gallery = Gallery::new(Manifest::empty(), "");
        let report = SiteReport {
            index: PathBuf::from("site/index.html"),
            photo_pages: 0,
        };
        let lines = format_render_output(&gallery, &report);
        assert_eq!(
            lines,
            vec!["Home \u{2192} index.html", "Generated 1 index, 0 photo pages"]
        );
    }
}

//! Manifest builder.
//!
//! Turns a flat directory of photos into `manifest.json`:
//!
//! ```text
//! photos/                         manifest.json
//! ├── 01-harbour.jpg      ──►     [ { "src": "01-harbour.jpg", "width": 4000, ... },
//! ├── 02-market.png               {  "src": "02-market.png",  "width": 1600, ... },
//! ├── notes.txt   (skipped)         ... ]
//! └── broken.jpg  (reported)
//! ```
//!
//! ## Steps
//!
//! 1. [`collect_candidates`]: list the directory (not recursive), keep files
//!    with a supported extension, sort by file name.
//! 2. [`build_manifest`]: probe and synthesize a placeholder for every
//!    candidate on the rayon pool. A file that fails either step is left out
//!    and reported in [`BuildReport::failures`]; the rest of the batch keeps
//!    going. Results are re-sorted by `src` once all workers finish.
//! 3. [`write_manifest`]: pretty JSON, written to a temp file and renamed into
//!    place so a failed run never leaves a half-written manifest behind.
//!
//! [`generate_manifest`] ties the three together with the placeholder cache.

use crate::cache::{
    CacheStats, CachedPlaceholder, PlaceholderCache, hash_file, hash_placeholder_params,
};
use crate::config::SiteConfig;
use crate::imaging::{
    BackendError, ImageBackend, PlaceholderConfig, RustBackend, create_placeholder,
    get_dimensions, supported_input_extensions,
};
use crate::types::{Manifest, PhotoEntry};
use rayon::prelude::*;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// File name the viewer fetches and the builder writes by default.
pub const MANIFEST_FILENAME: &str = "manifest.json";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Cannot read source directory {}: {source}", path.display())]
    SourceDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Cannot write manifest {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Knobs for one build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub placeholder: PlaceholderConfig,
}

impl BuildOptions {
    pub fn from_site_config(config: &SiteConfig) -> Self {
        Self {
            placeholder: PlaceholderConfig {
                max_edge: config.placeholder.max_edge,
                ..PlaceholderConfig::default()
            },
        }
    }
}

/// Progress events, sent while the build runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildEvent {
    Started {
        total: usize,
    },
    /// `index` counts completions (1-based), not manifest positions.
    Processed {
        index: usize,
        total: usize,
        src: String,
        cached: bool,
    },
    Failed {
        src: String,
        reason: String,
    },
    Finished {
        written: usize,
        failed: usize,
    },
}

/// A source file that was left out of the manifest.
#[derive(Debug)]
pub struct FileFailure {
    pub src: String,
    pub error: BackendError,
}

#[derive(Debug)]
pub struct BuildReport {
    pub manifest: Manifest,
    pub failures: Vec<FileFailure>,
    pub cache_stats: CacheStats,
}

/// Whether `path` has one of the accepted photo extensions (case-insensitive).
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| supported_input_extensions().contains(&ext.as_str()))
}

/// What [`collect_candidates`] found in the source directory.
#[derive(Debug, Default)]
pub struct Listing {
    /// Photos to process, sorted by file name.
    pub files: Vec<PathBuf>,
    /// Photo-named entries that could not be read (e.g. dangling symlinks).
    pub unreadable: Vec<FileFailure>,
}

/// List the photos directly inside `dir`, sorted by file name.
///
/// Subdirectories are not descended into. Ordering compares raw file name
/// bytes, so `B.jpg` sorts before `a.jpg`. Only a failure to read `dir`
/// itself is an error; a bad entry is skipped, and reported in
/// [`Listing::unreadable`] when its name looks like a photo.
pub fn collect_candidates(dir: &Path) -> Result<Listing, BuildError> {
    let source_err = |source: io::Error| BuildError::SourceDir {
        path: dir.to_path_buf(),
        source,
    };

    let meta = fs::metadata(dir).map_err(source_err)?;
    if !meta.is_dir() {
        return Err(source_err(io::Error::new(
            io::ErrorKind::NotADirectory,
            "not a directory",
        )));
    }

    let mut listing = Listing::default();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(source_err(err.into())),
            Err(err) => {
                warn!(error = %err, "skipping unreadable directory entry");
                if let Some(path) = err.path().map(Path::to_path_buf)
                    && is_supported_image(&path)
                {
                    listing.unreadable.push(FileFailure {
                        src: src_name(&path),
                        error: BackendError::Io(err.into()),
                    });
                }
                continue;
            }
        };
        if entry.file_type().is_file() && is_supported_image(entry.path()) {
            listing.files.push(entry.into_path());
        }
    }
    Ok(listing)
}

fn src_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn emit(events: Option<&Sender<BuildEvent>>, event: BuildEvent) {
    if let Some(tx) = events {
        // The receiver going away only silences progress output.
        let _ = tx.send(event);
    }
}

/// One successfully processed file, before it joins the manifest.
struct ProcessedFile {
    entry: PhotoEntry,
    source_hash: String,
    cached: bool,
}

fn process_file(
    backend: &impl ImageBackend,
    path: &Path,
    src: &str,
    params_hash: &str,
    cache: &PlaceholderCache,
    config: &PlaceholderConfig,
) -> Result<ProcessedFile, BackendError> {
    let source_hash = hash_file(path)?;

    if let Some(hit) = cache.get(&source_hash, params_hash)
        && let Some(entry) = PhotoEntry::new(
            src,
            hit.width,
            hit.height,
            Some(hit.blur_data_url.clone()),
        )
    {
        return Ok(ProcessedFile {
            entry,
            source_hash,
            cached: true,
        });
    }

    let (width, height) = get_dimensions(backend, path)?;
    let blur = create_placeholder(backend, path, (width, height), config)?;
    let entry = PhotoEntry::new(src, width, height, Some(blur))
        .ok_or_else(|| BackendError::Decode(format!("{src}: zero-sized image")))?;

    Ok(ProcessedFile {
        entry,
        source_hash,
        cached: false,
    })
}

/// Probe every candidate in `source_dir` and assemble the manifest.
///
/// Per-file failures never abort the batch; only an unreadable source
/// directory does. New results are added to `cache`, which the caller saves.
pub fn build_manifest(
    backend: &impl ImageBackend,
    source_dir: &Path,
    options: &BuildOptions,
    cache: &mut PlaceholderCache,
    events: Option<&Sender<BuildEvent>>,
) -> Result<BuildReport, BuildError> {
    let Listing {
        files: candidates,
        unreadable,
    } = collect_candidates(source_dir)?;
    let total = candidates.len();
    info!(source = %source_dir.display(), total, "building manifest");
    emit(events, BuildEvent::Started { total });
    for failure in &unreadable {
        emit(
            events,
            BuildEvent::Failed {
                src: failure.src.clone(),
                reason: failure.error.to_string(),
            },
        );
    }

    let params_hash =
        hash_placeholder_params(options.placeholder.max_edge, options.placeholder.format);
    let completed = AtomicUsize::new(0);
    let lookup: &PlaceholderCache = cache;

    let results: Vec<(String, Result<ProcessedFile, BackendError>)> = candidates
        .par_iter()
        .map(|path| {
            let src = src_name(path);
            let result = process_file(
                backend,
                path,
                &src,
                &params_hash,
                lookup,
                &options.placeholder,
            );
            let index = completed.fetch_add(1, Ordering::Relaxed) + 1;
            match &result {
                Ok(done) => {
                    debug!(src = %src, cached = done.cached, "processed");
                    emit(
                        events,
                        BuildEvent::Processed {
                            index,
                            total,
                            src: src.clone(),
                            cached: done.cached,
                        },
                    );
                }
                Err(e) => {
                    warn!(src = %src, error = %e, "skipping file");
                    emit(
                        events,
                        BuildEvent::Failed {
                            src: src.clone(),
                            reason: e.to_string(),
                        },
                    );
                }
            }
            (src, result)
        })
        .collect();

    let mut entries = Vec::with_capacity(results.len());
    let mut failures = unreadable;
    let mut cache_stats = CacheStats::default();

    for (src, result) in results {
        match result {
            Ok(done) => {
                if done.cached {
                    cache_stats.hit();
                } else {
                    cache_stats.miss();
                    cache.insert(
                        &done.source_hash,
                        &params_hash,
                        CachedPlaceholder {
                            width: done.entry.width.get(),
                            height: done.entry.height.get(),
                            blur_data_url: done.entry.blur_data_url.clone().unwrap_or_default(),
                        },
                    );
                }
                entries.push(done.entry);
            }
            Err(error) => failures.push(FileFailure { src, error }),
        }
    }

    // Completion order is arbitrary; the manifest order is not.
    entries.sort_by(|a, b| a.src.cmp(&b.src));
    failures.sort_by(|a, b| a.src.cmp(&b.src));

    emit(
        events,
        BuildEvent::Finished {
            written: entries.len(),
            failed: failures.len(),
        },
    );
    info!(
        written = entries.len(),
        failed = failures.len(),
        cache = %cache_stats,
        "manifest built"
    );

    Ok(BuildReport {
        manifest: Manifest::new(entries),
        failures,
        cache_stats,
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| MANIFEST_FILENAME.to_string());
    path.with_file_name(format!(".{name}.tmp"))
}

/// Serialize `manifest` as pretty JSON to `path`, replacing any existing file.
pub fn write_manifest(path: &Path, manifest: &Manifest) -> Result<(), BuildError> {
    let mut json = serde_json::to_string_pretty(manifest)?;
    json.push('\n');

    let write_err = |source: io::Error| BuildError::Write {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_err)?;
    }

    let tmp = temp_path(path);
    if let Err(e) = fs::write(&tmp, json).and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    debug!(path = %path.display(), entries = manifest.len(), "manifest written");
    Ok(())
}

/// Build and write the manifest with the production backend.
pub fn generate_manifest(
    source_dir: &Path,
    output: &Path,
    options: &BuildOptions,
    use_cache: bool,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildReport, BuildError> {
    let backend = RustBackend::new();
    generate_manifest_with_backend(&backend, source_dir, output, options, use_cache, events)
}

/// Build and write the manifest using a specific backend (allows testing with mock).
///
/// The placeholder cache lives next to `output`. It is loaded unless
/// `use_cache` is false and saved after the manifest is written; a failed
/// save is logged and otherwise ignored.
pub fn generate_manifest_with_backend(
    backend: &impl ImageBackend,
    source_dir: &Path,
    output: &Path,
    options: &BuildOptions,
    use_cache: bool,
    events: Option<Sender<BuildEvent>>,
) -> Result<BuildReport, BuildError> {
    let cache_dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut cache = if use_cache {
        PlaceholderCache::load(cache_dir)
    } else {
        PlaceholderCache::empty()
    };

    let report = build_manifest(backend, source_dir, options, &mut cache, events.as_ref())?;
    write_manifest(output, &report.manifest)?;

    if let Err(e) = cache.save(cache_dir) {
        warn!(dir = %cache_dir.display(), error = %e, "could not save placeholder cache");
    }
    Ok(report)
}

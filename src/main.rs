use clap::{ArgAction, Parser, Subcommand};
use folio::gallery::{Gallery, render_site};
use folio::loader::{LoaderConfig, ManifestLoader};
use folio::manifest::{BuildOptions, generate_manifest};
use folio::{config, logging, output};
use std::path::PathBuf;
use tracing::info;

fn version_string() -> &'static str {
    if env!("FOLIO_RELEASE_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("FOLIO_GIT_HASH") {
        "" => "dev@unknown",
        // Leaked once at startup
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Photo portfolio manifest generator and gallery renderer")]
#[command(long_about = "\
Photo portfolio manifest generator and gallery renderer

Build time: scan a directory of photos into manifest.json, with each photo's
dimensions and a tiny inline placeholder. Upload the manifest next to the
images.

View time: load the manifest (remote store first, then the local copy, then
nothing) and render a static gallery: a masonry grid plus one lightbox page
per photo with wrap-around previous/next navigation.

  photos/                     public/manifest.json
  ├── 01-harbour.jpg    →     [{\"src\": \"01-harbour.jpg\", \"width\": 4000, ...},
  ├── 02-market.png            {\"src\": \"02-market.png\", ...}]
  └── notes.txt  (ignored)

Run 'folio gen-config' to generate a documented folio.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing folio.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// More diagnostics on stderr (repeatable)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Fewer diagnostics on stderr
    #[arg(short, long, action = ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a photo directory into manifest.json
    Manifest {
        /// Directory of source photos
        #[arg(long, default_value = "photos")]
        source: PathBuf,

        /// Manifest file to write
        #[arg(long, default_value = "public/manifest.json")]
        output: PathBuf,

        /// Ignore the placeholder cache and decode every photo
        #[arg(long)]
        no_cache: bool,
    },
    /// Render the gallery site from the remote or local manifest
    Render {
        /// Public base URL of the image store (overrides folio.toml)
        #[arg(long, env = "FOLIO_REMOTE_BASE_URL")]
        remote_base: Option<String>,

        /// Local manifest used when the remote one is unavailable
        #[arg(long, default_value = "public/manifest.json")]
        manifest: PathBuf,

        /// Site output directory
        #[arg(long, default_value = "site")]
        output: PathBuf,
    },
    /// Print a stock folio.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let verbosity = (cli.verbose.min(i8::MAX as u8) as i8).saturating_sub(cli.quiet as i8);
    logging::init(verbosity);

    match cli.command {
        Command::Manifest {
            source,
            output,
            no_cache,
        } => {
            let site_config = config::load_config(&cli.config)?;
            init_thread_pool(&site_config.processing);
            let options = BuildOptions::from_site_config(&site_config);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    output::print_build_event(&event);
                }
            });
            let result = generate_manifest(&source, &output, &options, !no_cache, Some(tx));
            // The sender is dropped by now, so the printer drains and exits.
            printer.join().ok();

            let report = result?;
            output::print_build_summary(&report, &output);
        }
        Command::Render {
            remote_base,
            manifest,
            output,
        } => {
            let site_config = config::load_config(&cli.config)?;
            let mut loader_config = LoaderConfig::from_site_config(&site_config, &manifest);
            if remote_base.is_some() {
                loader_config.remote_base = remote_base;
            }
            let image_base = loader_config
                .remote_base
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string();

            let loader = ManifestLoader::new(loader_config);
            let outcome = loader.load();
            output::print_load_outcome(&outcome);

            let gallery =
                Gallery::new(outcome.manifest, image_base).with_config(site_config.gallery);
            let report = render_site(&gallery, &output)?;
            info!(out = %output.display(), "gallery rendered");
            output::print_render_output(&gallery, &report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use folio::manifest::MANIFEST_FILENAME;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn manifest_defaults() {
        let cli = Cli::try_parse_from(["folio", "manifest"]).unwrap();
        match cli.command {
            Command::Manifest {
                source,
                output,
                no_cache,
            } => {
                assert_eq!(source, PathBuf::from("photos"));
                assert_eq!(output, PathBuf::from("public").join(MANIFEST_FILENAME));
                assert!(!no_cache);
            }
            _ => panic!("expected manifest command"),
        }
    }

    #[test]
    fn render_flags_and_globals() {
        let cli = Cli::try_parse_from([
            "folio",
            "render",
            "--remote-base",
            "https://photos.example.com",
            "--output",
            "dist",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Render {
                remote_base,
                output,
                ..
            } => {
                assert_eq!(remote_base.as_deref(), Some("https://photos.example.com"));
                assert_eq!(output, PathBuf::from("dist"));
            }
            _ => panic!("expected render command"),
        }
    }
}

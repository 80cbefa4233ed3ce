//! Pure Rust image backend. No system libraries or external tools; every
//! codec is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only, no full decode) |
//! | Decode (JPEG, PNG, WebP) | `image` crate (pure Rust decoders) |
//! | Resize | `image::DynamicImage::resize_exact` with `Triangle` filter |
//! | Encode → PNG | `image::DynamicImage::write_to` into an in-memory buffer |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::params::PlaceholderParams;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageFormat, ImageReader};
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions the manifest accepts, paired with the decoder they need.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `image` errors into "could not read the file" and "not an image".
fn classify(path: &Path, err: ImageError) -> BackendError {
    match err {
        ImageError::IoError(e) => BackendError::Io(e),
        other => BackendError::Decode(format!("{}: {}", path.display(), other)),
    }
}

/// Open `path` with the format sniffed from its content.
///
/// A `.jpg` that is really a PNG still decodes, and a text file named `.jpg`
/// fails as a decode error. The extension is only a fallback.
fn open_sniffed(path: &Path) -> Result<ImageReader<BufReader<File>>, BackendError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?)
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_sniffed(path)?.decode().map_err(|e| classify(path, e))
}

/// Encode to `format` into memory, dropping the alpha channel when the
/// source has none.
fn encode(img: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>, BackendError> {
    let normalized = if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    };
    let mut buf = Cursor::new(Vec::new());
    normalized
        .write_to(&mut buf, format)
        .map_err(|e| BackendError::Encode(format!("{format:?}: {e}")))?;
    Ok(buf.into_inner())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_sniffed(path)?
            .into_dimensions()
            .map_err(|e| classify(path, e))?;
        if width == 0 || height == 0 {
            return Err(BackendError::Decode(format!(
                "{}: zero-sized image ({width}x{height})",
                path.display()
            )));
        }
        Ok(Dimensions { width, height })
    }

    fn placeholder(&self, params: &PlaceholderParams) -> Result<Vec<u8>, BackendError> {
        let img = load_image(&params.source)?;
        let small = img.resize_exact(params.width, params.height, FilterType::Triangle);
        encode(&small, params.format.image_format())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::PlaceholderFormat;
    use image::{ImageEncoder, RgbImage, RgbaImage};

    #[test]
    fn supported_extensions_match_decodable_formats() {
        let exts = super::supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "webp"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
        assert!(!exts.contains(&"tiff"));
    }

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    fn placeholder_params(source: &Path, width: u32, height: u32) -> PlaceholderParams {
        PlaceholderParams {
            source: source.to_path_buf(),
            width,
            height,
            format: PlaceholderFormat::Png,
        }
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let backend = RustBackend::new();
        let dims = backend.identify(&path).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn identify_sniffs_content_not_extension() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("really-png.jpg");
        RgbImage::from_fn(30, 20, |_, _| image::Rgb([10, 20, 30]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        let backend = RustBackend::new();
        let dims = backend.identify(&path).unwrap();
        assert_eq!((dims.width, dims.height), (30, 20));

        let bytes = backend.placeholder(&placeholder_params(&path, 3, 2)).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
    }

    #[test]
    fn identify_nonexistent_file_is_io_error() {
        let backend = RustBackend::new();
        let result = backend.identify(Path::new("/nonexistent/image.jpg"));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }

    #[test]
    fn identify_garbage_is_decode_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("corrupt.jpg");
        std::fs::write(&path, b"definitely not a jpeg").unwrap();

        let backend = RustBackend::new();
        assert!(matches!(
            backend.identify(&path),
            Err(BackendError::Decode(_))
        ));
    }

    #[test]
    fn placeholder_is_png_of_requested_size() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 400, 300);

        let backend = RustBackend::new();
        let bytes = backend
            .placeholder(&placeholder_params(&source, 10, 8))
            .unwrap();

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
        assert_eq!(decoded.width(), 10);
        assert_eq!(decoded.height(), 8);
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn placeholder_keeps_alpha_channel() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        RgbaImage::from_fn(40, 20, |x, _| image::Rgba([255, 0, 0, (x * 6) as u8]))
            .save(&source)
            .unwrap();

        let backend = RustBackend::new();
        let bytes = backend
            .placeholder(&placeholder_params(&source, 10, 5))
            .unwrap();

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(decoded.color().has_alpha());
        assert_eq!((decoded.width(), decoded.height()), (10, 5));
    }

    #[test]
    fn placeholder_garbage_is_decode_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("corrupt.png");
        std::fs::write(&source, b"\x89PNG but not really").unwrap();

        let backend = RustBackend::new();
        let result = backend.placeholder(&placeholder_params(&source, 10, 10));
        assert!(matches!(result, Err(BackendError::Decode(_))));
    }
}

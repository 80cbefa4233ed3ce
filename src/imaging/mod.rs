//! Image probing and placeholder synthesis, in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` (format sniffed from content) |
//! | **Placeholder** | `resize_exact` (Triangle) + PNG encode + base64 data URL |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::fit_inside;
pub use operations::{
    DEFAULT_PLACEHOLDER_EDGE, PlaceholderConfig, create_placeholder, data_url, get_dimensions,
};
pub use params::{PlaceholderFormat, PlaceholderParams};
pub use rust_backend::{RustBackend, supported_input_extensions};

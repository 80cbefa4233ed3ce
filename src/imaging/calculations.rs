//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the size of an image shrunk to fit inside a square bounding box.
///
/// The aspect ratio is preserved and the longer edge ends up at most
/// `max_edge`. Images already inside the box are returned unchanged (never
/// upscaled). Neither edge is rounded down to zero.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `max_edge` - Bound on the longer edge in pixels
///
/// # Examples
/// ```
/// # use folio::imaging::fit_inside;
/// // 4000x3000 landscape into a 10px box → 10x8
/// assert_eq!(fit_inside((4000, 3000), 10), (10, 8));
///
/// // Already small enough → untouched
/// assert_eq!(fit_inside((6, 4), 10), (6, 4));
/// ```
pub fn fit_inside(source: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (src_w, src_h) = source;
    let max_edge = max_edge.max(1);
    let longer_edge = src_w.max(src_h);

    if longer_edge <= max_edge {
        return source;
    }

    let ratio = max_edge as f64 / longer_edge as f64;
    if src_w >= src_h {
        // Landscape or square: width is the bounded edge
        let h = (src_h as f64 * ratio).round() as u32;
        (max_edge, h.max(1))
    } else {
        // Portrait
        let w = (src_w as f64 * ratio).round() as u32;
        (w.max(1), max_edge)
    }
}

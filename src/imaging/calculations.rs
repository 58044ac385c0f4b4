//! Pure calculation functions for output dimensions and names.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::OutputFormat;

/// Fit a source into an optional target box, preserving aspect ratio.
///
/// - Both dimensions given: the source is fitted *inside* the box. A source
///   relatively wider than the box is clamped to the box width; otherwise it
///   is clamped to the box height.
/// - One dimension given: scale proportionally from that one.
/// - Neither given: the source dimensions are returned unchanged.
///
/// A target of zero is no constraint, the same as `None`.
///
/// The computed dimension is rounded to the nearest integer and never drops
/// below one pixel.
///
/// # Examples
/// ```
/// # use image_batcher::imaging::fit_dimensions;
/// // 200x100 into a 100x100 box → width-constrained
/// assert_eq!(fit_dimensions((200, 100), Some(100), Some(100)), (100, 50));
///
/// // Only a height: 200x100 scaled to height 50
/// assert_eq!(fit_dimensions((200, 100), None, Some(50)), (100, 50));
/// ```
pub fn fit_dimensions(
    source: (u32, u32),
    target_width: Option<u32>,
    target_height: Option<u32>,
) -> (u32, u32) {
    let (src_w, src_h) = source;
    if src_w == 0 || src_h == 0 {
        return source;
    }
    let src_aspect = src_w as f64 / src_h as f64;
    let target_width = target_width.filter(|&w| w > 0);
    let target_height = target_height.filter(|&h| h > 0);

    match (target_width, target_height) {
        (Some(tgt_w), Some(tgt_h)) => {
            let box_aspect = tgt_w as f64 / tgt_h as f64;
            if src_aspect > box_aspect {
                // Relatively wider: width is the binding constraint
                (tgt_w, round_px(tgt_w as f64 / src_aspect))
            } else {
                (round_px(tgt_h as f64 * src_aspect), tgt_h)
            }
        }
        (Some(tgt_w), None) => (tgt_w, round_px(tgt_w as f64 / src_aspect)),
        (None, Some(tgt_h)) => (round_px(tgt_h as f64 * src_aspect), tgt_h),
        (None, None) => source,
    }
}

fn round_px(value: f64) -> u32 {
    (value.round() as u32).max(1)
}

/// Derive an output filename: the last extension is swapped for the format's.
///
/// ```
/// # use image_batcher::imaging::{OutputFormat, output_filename};
/// assert_eq!(output_filename("holiday.png", OutputFormat::Jpeg), "holiday.jpg");
/// assert_eq!(output_filename("archive.tar.png", OutputFormat::Png), "archive.tar.png");
/// assert_eq!(output_filename("scan.tiff", OutputFormat::Webp), "scan.png");
/// ```
pub fn output_filename(source_name: &str, format: OutputFormat) -> String {
    let stem = match source_name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() && !ext.contains('/') => stem,
        _ => source_name,
    };
    format!("{}.{}", stem, format.extension())
}

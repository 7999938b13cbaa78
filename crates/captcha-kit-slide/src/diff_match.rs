use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use captcha_kit_core::{Channels, Raster};

/// Thresholds for the column scan over the difference image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffMatchParams {
    /// Channel differences strictly above this become 255.
    pub threshold: u8,
    /// Changed pixels a column needs to count as the gap.
    pub min_count: usize,
}

impl Default for DiffMatchParams {
    fn default() -> Self {
        Self {
            threshold: 80,
            min_count: 5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideComparisonResult {
    /// `[x, y]` of the gap, `[0, 0]` when none was found.
    pub target: [u32; 2],
}

/// Per-pixel absolute RGB difference over the common area of `a` and `b`.
pub fn abs_difference(a: &Raster, b: &Raster) -> Raster {
    let w = a.width().min(b.width());
    let h = a.height().min(b.height());
    let mut out = Raster::blank(w, h, Channels::Rgb, 0);
    for y in 0..h {
        for x in 0..w {
            let (pa, pb) = (a.rgb_at(x, y), b.rgb_at(x, y));
            let dst = out.pixel_mut(x, y);
            for c in 0..3 {
                dst[c] = pa[c].abs_diff(pb[c]);
            }
        }
    }
    out
}

/// Map every sample to 255 when it exceeds `threshold`, else 0.
pub fn binarize(raster: &Raster, threshold: u8) -> Raster {
    let mut out = raster.clone();
    for y in 0..out.height() {
        for x in 0..out.width() {
            for v in out.pixel_mut(x, y) {
                *v = if *v > threshold { 255 } else { 0 };
            }
        }
    }
    out
}

/// First column, scanning left to right, with at least `min_count` non-zero pixels.
///
/// Returns `(column + 2, row)`. The row is taken from the first non-zero
/// pixel seen in any column while the captured row is still 0, so it is not
/// reset between columns and a hit on row 0 leaves it open.
pub fn find_gap(binary: &Raster, min_count: usize) -> Option<(usize, usize)> {
    let mut start_y = 0usize;
    for x in 0..binary.width() {
        let mut count = 0usize;
        for y in 0..binary.height() {
            if binary.pixel(x, y).iter().any(|&v| v != 0) {
                count += 1;
                if count == 1 && start_y == 0 {
                    start_y = y;
                }
            }
        }
        if count >= min_count {
            return Some((x + 2, start_y));
        }
    }
    None
}

/// Locate the gap by differencing a background with and without the cut-out.
pub fn slide_comparison(target: &Raster, background: &Raster) -> SlideComparisonResult {
    slide_comparison_with(target, background, &DiffMatchParams::default())
}

#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(target, background, params))
)]
pub fn slide_comparison_with(
    target: &Raster,
    background: &Raster,
    params: &DiffMatchParams,
) -> SlideComparisonResult {
    let (w, h) = (target.width(), target.height());
    let resized;
    let background = if background.width() != w || background.height() != h {
        log::debug!(
            "resizing background {}x{} to target size {}x{}",
            background.width(),
            background.height(),
            w,
            h
        );
        resized = background.resize_bilinear(w, h);
        &resized
    } else {
        background
    };

    let diff = abs_difference(background, target);
    let binary = binarize(&diff, params.threshold);
    let (x, y) = find_gap(&binary, params.min_count).unwrap_or((0, 0));
    SlideComparisonResult {
        target: [x as u32, y as u32],
    }
}

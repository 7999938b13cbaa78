//! HSV color filtering and alpha flattening used before recognition.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::raster::{Channels, Raster};

/// Inclusive 8-bit HSV box (H in `[0, 180)`, S and V in `[0, 255]`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub low: [u8; 3],
    pub high: [u8; 3],
}

impl HsvRange {
    pub const fn new(low: [u8; 3], high: [u8; 3]) -> Self {
        Self { low, high }
    }

    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|i| hsv[i] >= self.low[i] && hsv[i] <= self.high[i])
    }
}

const DEFAULT_RANGES: [(&str, HsvRange); 9] = [
    ("red", HsvRange::new([0, 100, 100], [10, 255, 255])),
    ("red2", HsvRange::new([160, 100, 100], [180, 255, 255])),
    ("green", HsvRange::new([35, 100, 100], [85, 255, 255])),
    ("blue", HsvRange::new([100, 100, 100], [130, 255, 255])),
    ("yellow", HsvRange::new([20, 100, 100], [35, 255, 255])),
    ("orange", HsvRange::new([10, 100, 100], [20, 255, 255])),
    ("purple", HsvRange::new([130, 100, 100], [160, 255, 255])),
    ("pink", HsvRange::new([140, 50, 100], [170, 255, 255])),
    ("brown", HsvRange::new([10, 100, 50], [20, 255, 150])),
];

/// Built-in range for a color name. For `"red"` this is the low-hue band only.
pub fn default_color_range(name: &str) -> Option<HsvRange> {
    DEFAULT_RANGES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, r)| *r)
}

/// Convert 8-bit RGB to 8-bit HSV (`H = degrees / 2`), truncating each component.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let r = rgb[0] as f64 / 255.0;
    let g = rgb[1] as f64 / 255.0;
    let b = rgb[2] as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max == 0.0 { 0.0 } else { delta / max };
    let mut h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    if h < 0.0 {
        h += 360.0;
    }

    [(h / 2.0) as u8, (s * 255.0) as u8, (max * 255.0) as u8]
}

/// Keep only pixels whose HSV value falls in one of the named ranges.
///
/// The result is an RGB raster on a white canvas. Names are looked up in
/// `custom` first, then in the built-in table; unknown names are ignored.
/// `"red"` additionally tests the built-in high-hue band.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(raster, custom), fields(w = raster.width(), h = raster.height()))
)]
pub fn filter_by_colors(
    raster: &Raster,
    colors: &[&str],
    custom: Option<&HashMap<String, HsvRange>>,
) -> Raster {
    let ranges: Vec<(&str, HsvRange)> = colors
        .iter()
        .filter_map(|&name| {
            custom
                .and_then(|m| m.get(name).copied())
                .or_else(|| default_color_range(name))
                .map(|r| (name, r))
        })
        .collect();
    // hue wraps around for red
    let red_high = DEFAULT_RANGES[1].1;

    let mut out = Raster::blank(raster.width(), raster.height(), Channels::Rgb, 255);
    for y in 0..raster.height() {
        for x in 0..raster.width() {
            let rgb = raster.rgb_at(x, y);
            let hsv = rgb_to_hsv(rgb);
            let hit = ranges
                .iter()
                .any(|(name, r)| r.contains(hsv) || (*name == "red" && red_high.contains(hsv)));
            if hit {
                out.pixel_mut(x, y).copy_from_slice(&rgb);
            }
        }
    }
    out
}

/// Alpha-composite over a white background and drop the alpha channel.
pub fn composite_on_white(raster: &Raster) -> Raster {
    if !raster.channels().has_alpha() {
        return raster.to_rgb();
    }
    let mut out = Raster::blank(raster.width(), raster.height(), Channels::Rgb, 255);
    for y in 0..raster.height() {
        for x in 0..raster.width() {
            let a = raster.alpha_at(x, y) as u32;
            let rgb = raster.rgb_at(x, y);
            let dst = out.pixel_mut(x, y);
            for (d, &s) in dst.iter_mut().zip(rgb.iter()) {
                *d = ((s as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
            }
        }
    }
    out
}

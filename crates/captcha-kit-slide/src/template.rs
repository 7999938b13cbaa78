use nalgebra::Point2;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use captcha_kit_core::Raster;

/// Standard deviations below this are treated as flat.
const MIN_STD: f64 = 1.0;

/// Best placement of a template inside a background.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TemplateMatch {
    /// Top-left corner of the best window.
    pub location: Point2<u32>,
    /// Normalized correlation at `location`; `None` when no window was scored.
    pub score: Option<f64>,
}

impl TemplateMatch {
    fn origin() -> Self {
        Self {
            location: Point2::origin(),
            score: None,
        }
    }
}

/// Zero-mean normalized cross-correlation search over the R, G, B channels.
///
/// The correlation of a window is the summed channel covariance divided by
/// the product of the template's and window's standard deviations, each the
/// root of squared deviations summed over all channels. The first maximum
/// in row-major order wins. A template larger than the background or with
/// a flat template yields the origin; flat windows are skipped.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "debug",
        skip(background, template),
        fields(bg_w = background.width(), bg_h = background.height(), tpl_w = template.width(), tpl_h = template.height())
    )
)]
pub fn match_template(background: &Raster, template: &Raster) -> TemplateMatch {
    let (tw, th) = (template.width(), template.height());
    let (bw, bh) = (background.width(), background.height());
    if tw > bw || th > bh || template.is_empty() {
        return TemplateMatch::origin();
    }

    let n = tw * th;
    let mut tpl = vec![[0.0f64; 3]; n];
    let mut mean = [0.0f64; 3];
    for y in 0..th {
        for x in 0..tw {
            let px = template.rgb_at(x, y);
            for c in 0..3 {
                tpl[y * tw + x][c] = px[c] as f64;
                mean[c] += px[c] as f64;
            }
        }
    }
    for m in &mut mean {
        *m /= n as f64;
    }
    let mut tpl_var = 0.0f64;
    for t in &mut tpl {
        for c in 0..3 {
            t[c] -= mean[c];
            tpl_var += t[c] * t[c];
        }
    }
    let tpl_std = tpl_var.sqrt();
    if tpl_std < MIN_STD {
        return TemplateMatch::origin();
    }

    let bg = background.to_rgb();
    let data = bg.as_raw();
    let mut best = TemplateMatch::origin();
    let mut best_val = -2.0f64;
    for y in 0..=bh - th {
        for x in 0..=bw - tw {
            // Integer sums keep the window variance exact.
            let mut sum = [0u64; 3];
            let mut sum_sq = [0u64; 3];
            let mut cross = 0.0f64;
            for ty in 0..th {
                let row = ((y + ty) * bw + x) * 3;
                for tx in 0..tw {
                    let t = &tpl[ty * tw + tx];
                    let p = &data[row + tx * 3..row + tx * 3 + 3];
                    for c in 0..3 {
                        let v = p[c] as u64;
                        sum[c] += v;
                        sum_sq[c] += v * v;
                        cross += v as f64 * t[c];
                    }
                }
            }
            // sum over channels of n * sum_sq - sum^2, divided by n
            let scaled_var: u128 = (0..3)
                .map(|c| n as u128 * sum_sq[c] as u128 - sum[c] as u128 * sum[c] as u128)
                .sum();
            let win_std = (scaled_var as f64 / n as f64).sqrt();
            if win_std < MIN_STD {
                continue;
            }
            let ncc = cross / (win_std * tpl_std);
            if ncc > best_val {
                best_val = ncc;
                best = TemplateMatch {
                    location: Point2::new(x as u32, y as u32),
                    score: Some(ncc),
                };
            }
        }
    }
    best
}

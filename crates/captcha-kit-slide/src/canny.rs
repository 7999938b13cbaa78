//! Canny edge detection on 8-bit rasters.
//!
//! Grayscale conversion truncates luma to an integer, gradients come from a
//! 3x3 Sobel kernel evaluated on interior pixels only, and weak edges are
//! promoted by repeated full-image passes until nothing changes. The outermost
//! pixel ring of the output is always 0.

use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use captcha_kit_core::{Channels, Raster};

/// Hysteresis thresholds on the integer gradient magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CannyParams {
    pub low: i32,
    pub high: i32,
}

impl Default for CannyParams {
    fn default() -> Self {
        Self {
            low: 100,
            high: 200,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EdgeState {
    None,
    Weak,
    Strong,
}

/// Binary edge map (`0` or `255`) with the same size as `raster`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(raster, params), fields(w = raster.width(), h = raster.height()))
)]
pub fn canny(raster: &Raster, params: &CannyParams) -> Raster {
    let (w, h) = (raster.width(), raster.height());
    let mut out = Raster::blank(w, h, Channels::Gray, 0);
    if w < 3 || h < 3 {
        return out;
    }

    let gray: Vec<i32> = raster.to_gray().into_raw().into_iter().map(i32::from).collect();
    let at = |x: usize, y: usize| gray[y * w + x];

    let mut gx = vec![0i32; w * h];
    let mut gy = vec![0i32; w * h];
    let mut mag = vec![0i32; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let dx = -at(x - 1, y - 1) - 2 * at(x - 1, y) - at(x - 1, y + 1)
                + at(x + 1, y - 1)
                + 2 * at(x + 1, y)
                + at(x + 1, y + 1);
            let dy = -at(x - 1, y - 1) - 2 * at(x, y - 1) - at(x + 1, y - 1)
                + at(x - 1, y + 1)
                + 2 * at(x, y + 1)
                + at(x + 1, y + 1);
            let i = y * w + x;
            gx[i] = dx;
            gy[i] = dy;
            mag[i] = ((dx * dx + dy * dy) as f64).sqrt() as i32;
        }
    }

    let mut state = vec![EdgeState::None; w * h];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let i = y * w + x;
            let m = mag[i];
            if m == 0 {
                continue;
            }
            let mut angle = (gy[i] as f64).atan2(gx[i] as f64).to_degrees();
            if angle < 0.0 {
                angle += 180.0;
            }
            let (q, r) = if !(22.5..157.5).contains(&angle) {
                (mag[i + 1], mag[i - 1])
            } else if angle < 67.5 {
                (mag[i - w + 1], mag[i + w - 1])
            } else if angle < 112.5 {
                (mag[i - w], mag[i + w])
            } else {
                (mag[i - w - 1], mag[i + w + 1])
            };
            if m < q || m < r {
                continue;
            }
            if m >= params.high {
                state[i] = EdgeState::Strong;
            } else if m >= params.low {
                state[i] = EdgeState::Weak;
            }
        }
    }

    promote_weak(&mut state, w, h);

    for (y, row) in state.chunks_exact(w).enumerate() {
        for (x, s) in row.iter().enumerate() {
            if *s == EdgeState::Strong {
                out.pixel_mut(x, y)[0] = 255;
            }
        }
    }
    out
}

/// Turn weak pixels touching a strong one (8-neighbourhood) into strong,
/// sweeping the interior in row-major order until a sweep changes nothing.
/// Returns the number of sweeps.
fn promote_weak(state: &mut [EdgeState], w: usize, h: usize) -> usize {
    let mut sweeps = 0;
    let mut changed = true;
    while changed {
        changed = false;
        sweeps += 1;
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let i = y * w + x;
                if state[i] != EdgeState::Weak {
                    continue;
                }
                let touches_strong = (y - 1..=y + 1)
                    .flat_map(|ny| (x - 1..=x + 1).map(move |nx| ny * w + nx))
                    .any(|j| state[j] == EdgeState::Strong);
                if touches_strong {
                    state[i] = EdgeState::Strong;
                    changed = true;
                }
            }
        }
    }
    sweeps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_on_black(size: usize, lo: usize, hi: usize, value: u8) -> Raster {
        let mut img = Raster::blank(size, size, Channels::Rgb, 0);
        for y in lo..hi {
            for x in lo..hi {
                img.pixel_mut(x, y).copy_from_slice(&[value; 3]);
            }
        }
        img
    }

    #[test]
    fn output_is_binary_with_zero_border() {
        let img = square_on_black(20, 5, 15, 255);
        let edges = canny(&img, &CannyParams::default());
        assert_eq!(edges.channels(), Channels::Gray);
        assert!(edges.as_raw().iter().all(|&v| v == 0 || v == 255));
        assert!(edges.as_raw().iter().any(|&v| v == 255));
        for i in 0..20 {
            assert_eq!(edges.pixel(i, 0)[0], 0);
            assert_eq!(edges.pixel(0, i)[0], 0);
            assert_eq!(edges.pixel(i, 19)[0], 0);
            assert_eq!(edges.pixel(19, i)[0], 0);
        }
    }

    #[test]
    fn flat_image_has_no_edges() {
        let img = Raster::blank(10, 10, Channels::Rgb, 128);
        let edges = canny(&img, &CannyParams::default());
        assert!(edges.as_raw().iter().all(|&v| v == 0));
    }

    #[test]
    fn weak_only_edges_are_dropped() {
        // step of 30 gives magnitude 120: weak only
        let img = square_on_black(20, 5, 15, 30);
        let edges = canny(&img, &CannyParams::default());
        assert!(edges.as_raw().iter().all(|&v| v == 0));

        let lowered = CannyParams { low: 50, high: 100 };
        let edges = canny(&img, &lowered);
        assert!(edges.as_raw().iter().any(|&v| v == 255));
    }

    #[test]
    fn weak_chain_is_promoted_from_its_far_end() {
        // diagonal weak ramp from (1,1) to (5,5), strong seed at (6,6),
        // plus a detached weak pair at the top right
        let (w, h) = (9, 9);
        let mut state = vec![EdgeState::None; w * h];
        for k in 1..=5 {
            state[k * w + k] = EdgeState::Weak;
        }
        state[6 * w + 6] = EdgeState::Strong;
        state[w + 6] = EdgeState::Weak;
        state[w + 7] = EdgeState::Weak;

        let sweeps = promote_weak(&mut state, w, h);

        // row-major sweeps promote one ramp pixel each, then one idle sweep
        assert_eq!(sweeps, 6);
        for k in 1..=6 {
            assert_eq!(state[k * w + k], EdgeState::Strong, "ramp pixel {k}");
        }
        assert_eq!(state[w + 6], EdgeState::Weak);
        assert_eq!(state[w + 7], EdgeState::Weak);
    }

    #[test]
    fn promotion_without_strong_pixels_is_a_single_sweep() {
        let (w, h) = (5, 5);
        let mut state = vec![EdgeState::Weak; w * h];
        assert_eq!(promote_weak(&mut state, w, h), 1);
        assert!(state.iter().all(|&s| s == EdgeState::Weak));
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let p: CannyParams = serde_json::from_str(r#"{"low": 40}"#).unwrap();
        assert_eq!(p, CannyParams { low: 40, high: 200 });
        let p: CannyParams = serde_json::from_str("{}").unwrap();
        assert_eq!(p, CannyParams::default());
    }

    #[test]
    fn tiny_rasters_are_blank() {
        let img = Raster::blank(2, 5, Channels::Gray, 255);
        let edges = canny(&img, &CannyParams::default());
        assert_eq!((edges.width(), edges.height()), (2, 5));
        assert!(edges.as_raw().iter().all(|&v| v == 0));
    }
}

use serde::{Deserialize, Serialize};

use captcha_kit_core::{to_nchw_gray, to_nchw_rgb, Channels, NormalizeParams, Raster, Tensor};

/// Default recognizer input height.
pub const DEFAULT_INPUT_HEIGHT: usize = 64;

/// How a raster is resized before it is handed to the recognizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSize {
    /// Fixed height; width scaled by the same factor, at least 1.
    FixedHeight(usize),
    /// `h x h`.
    Square(usize),
    Fixed { width: usize, height: usize },
}

impl Default for InputSize {
    fn default() -> Self {
        InputSize::FixedHeight(DEFAULT_INPUT_HEIGHT)
    }
}

impl InputSize {
    /// Target `(width, height)` for a `width x height` source.
    pub fn target(&self, width: usize, height: usize) -> (usize, usize) {
        match *self {
            InputSize::FixedHeight(h) => {
                let w = if height == 0 {
                    1
                } else {
                    (width as f64 * (h as f64 / height as f64)) as usize
                };
                (w.max(1), h)
            }
            InputSize::Square(h) => (h, h),
            InputSize::Fixed { width, height } => (width, height),
        }
    }
}

/// Recognizer input geometry, color layout and normalization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecognitionInput {
    pub size: InputSize,
    /// `Gray` yields a `[1, 1, H, W]` tensor, anything else `[1, 3, H, W]`.
    pub channels: Channels,
    pub normalize: NormalizeParams,
}

impl Default for RecognitionInput {
    fn default() -> Self {
        Self {
            size: InputSize::default(),
            channels: Channels::Gray,
            normalize: NormalizeParams::centered(),
        }
    }
}

impl RecognitionInput {
    /// Resize `raster` and lay it out as a normalized NCHW tensor.
    pub fn prepare(&self, raster: &Raster) -> Tensor {
        let (w, h) = self.size.target(raster.width(), raster.height());
        let resized = raster.resize_bilinear(w, h);
        log::debug!(
            "recognizer input {}x{} -> {}x{}",
            raster.width(),
            raster.height(),
            w,
            h
        );
        match self.channels {
            Channels::Gray => to_nchw_gray(&resized, &self.normalize),
            Channels::Rgb | Channels::Rgba => to_nchw_rgb(&resized, &self.normalize),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_height_keeps_aspect_ratio() {
        let size = InputSize::default();
        assert_eq!(size.target(120, 40), (192, 64));
        assert_eq!(size.target(100, 30), (213, 64));
        assert_eq!(size.target(1, 1000), (1, 64));
        assert_eq!(size.target(10, 0), (1, 64));
    }

    #[test]
    fn prepare_builds_expected_shape() {
        let img = Raster::blank(60, 20, Channels::Rgb, 255);
        let gray = RecognitionInput::default().prepare(&img);
        assert_eq!(gray.shape(), &[1, 1, 64, 192]);

        let color = RecognitionInput {
            size: InputSize::Fixed {
                width: 32,
                height: 16,
            },
            channels: Channels::Rgb,
            normalize: NormalizeParams::centered(),
        };
        let t = color.prepare(&img);
        assert_eq!(t.shape(), &[1, 3, 16, 32]);
        assert!(t.data().iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }
}

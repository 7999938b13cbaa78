//! Flat float tensors exchanged with the inference collaborator.

use serde::{Deserialize, Serialize};

use crate::raster::Raster;

/// Errors raised when a tensor's shape does not describe its buffer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error("tensor has no dimensions")]
    EmptyShape,

    #[error("tensor shape {shape:?} describes {expected} values, buffer holds {got}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        got: usize,
    },

    #[error("tensor shape {0:?} overflows the addressable size")]
    ShapeOverflow(Vec<usize>),
}

/// Row-major `f32` tensor with an explicit shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tensor {
    data: Vec<f32>,
    shape: Vec<usize>,
}

impl Tensor {
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self, TensorError> {
        if shape.is_empty() {
            return Err(TensorError::EmptyShape);
        }
        let expected = match shape.iter().try_fold(1usize, |n, &d| n.checked_mul(d)) {
            Some(n) => n,
            None => return Err(TensorError::ShapeOverflow(shape)),
        };
        if expected != data.len() {
            return Err(TensorError::ShapeMismatch {
                shape,
                expected,
                got: data.len(),
            });
        }
        Ok(Self { data, shape })
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_parts(self) -> (Vec<f32>, Vec<usize>) {
        (self.data, self.shape)
    }
}

/// Per-channel `(v / 255 - mean) / std` normalization, channels in R, G, B order.
///
/// Single-channel tensors use index 0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizeParams {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl NormalizeParams {
    /// Maps `[0, 255]` onto `[-1, 1]`.
    pub const fn centered() -> Self {
        Self {
            mean: [0.5; 3],
            std: [0.5; 3],
        }
    }

    /// Maps `[0, 255]` onto `[0, 1]`.
    pub const fn unit() -> Self {
        Self {
            mean: [0.0; 3],
            std: [1.0; 3],
        }
    }

    #[inline]
    pub fn apply(&self, value: f64, channel: usize) -> f32 {
        ((value / 255.0 - self.mean[channel] as f64) / self.std[channel] as f64) as f32
    }
}

impl Default for NormalizeParams {
    fn default() -> Self {
        Self::centered()
    }
}

/// `[1, 1, H, W]` tensor of normalized (untruncated) luma values.
pub fn to_nchw_gray(raster: &Raster, norm: &NormalizeParams) -> Tensor {
    let (w, h) = (raster.width(), raster.height());
    let mut data = Vec::with_capacity(w * h);
    for y in 0..h {
        for x in 0..w {
            data.push(norm.apply(raster.luma_at(x, y), 0));
        }
    }
    Tensor {
        data,
        shape: vec![1, 1, h, w],
    }
}

/// `[1, 3, H, W]` planar tensor of normalized R, G, B samples.
pub fn to_nchw_rgb(raster: &Raster, norm: &NormalizeParams) -> Tensor {
    let (w, h) = (raster.width(), raster.height());
    let plane = w * h;
    let mut data = vec![0.0f32; 3 * plane];
    for y in 0..h {
        for x in 0..w {
            let idx = y * w + x;
            for (ch, &v) in raster.rgb_at(x, y).iter().enumerate() {
                data[ch * plane + idx] = norm.apply(v as f64, ch);
            }
        }
    }
    Tensor {
        data,
        shape: vec![1, 3, h, w],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn shape_must_cover_buffer() {
        assert!(Tensor::new(vec![0.0; 6], vec![2, 3]).is_ok());
        assert_eq!(
            Tensor::new(vec![0.0; 5], vec![2, 3]),
            Err(TensorError::ShapeMismatch {
                shape: vec![2, 3],
                expected: 6,
                got: 5
            })
        );
        assert_eq!(Tensor::new(vec![], vec![]), Err(TensorError::EmptyShape));
    }

    #[test]
    fn overflowing_shape_is_an_error() {
        let huge = 1usize << (usize::BITS - 1);
        assert_eq!(
            Tensor::new(vec![], vec![huge, 2]),
            Err(TensorError::ShapeOverflow(vec![huge, 2]))
        );
    }

    #[test]
    fn centered_normalization_spans_minus_one_to_one() {
        let norm = NormalizeParams::centered();
        assert_relative_eq!(norm.apply(0.0, 0), -1.0);
        assert_relative_eq!(norm.apply(255.0, 2), 1.0);
        assert_relative_eq!(NormalizeParams::unit().apply(51.0, 1), 0.2);
    }

    #[test]
    fn rgb_tensor_is_planar() {
        let img = Raster::rgb(2, 1, vec![255, 0, 0, 0, 255, 0]).unwrap();
        let t = to_nchw_rgb(&img, &NormalizeParams::unit());
        assert_eq!(t.shape(), &[1, 3, 1, 2]);
        assert_eq!(t.data(), &[1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn gray_tensor_uses_float_luma() {
        let img = Raster::gray(1, 2, vec![0, 255]).unwrap();
        let t = to_nchw_gray(&img, &NormalizeParams::centered());
        assert_eq!(t.shape(), &[1, 1, 2, 1]);
        assert_relative_eq!(t.data()[0], -1.0);
        assert_relative_eq!(t.data()[1], 1.0, epsilon = 1e-5);
    }
}

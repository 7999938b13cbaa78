//! Greedy CTC-style decoding of recognizer scores.

use captcha_kit_core::Tensor;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::charset::Charset;
use crate::ranges::AllowedIndexSet;

/// Errors describing a score tensor that cannot be decoded.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("score tensor must be [T, C] or [T, B, C], got shape {0:?}")]
    UnsupportedRank(Vec<usize>),

    #[error("score tensor shape {0:?} has an empty batch or class axis")]
    DegenerateShape(Vec<usize>),

    #[error("score tensor shape {shape:?} describes {expected} values, buffer holds {got}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        got: usize,
    },

    #[error("score tensor shape {0:?} overflows the addressable size")]
    ShapeOverflow(Vec<usize>),
}

/// Borrowed per-timestep class scores. Only batch element 0 is read.
#[derive(Clone, Copy, Debug)]
pub struct ScoreTensor<'a> {
    data: &'a [f32],
    timesteps: usize,
    batch: usize,
    classes: usize,
}

impl<'a> ScoreTensor<'a> {
    pub fn new(data: &'a [f32], shape: &[usize]) -> Result<Self, DecodeError> {
        let (timesteps, batch, classes) = match *shape {
            [t, c] => (t, 1, c),
            [t, b, c] => (t, b, c),
            _ => return Err(DecodeError::UnsupportedRank(shape.to_vec())),
        };
        if batch == 0 || classes == 0 {
            return Err(DecodeError::DegenerateShape(shape.to_vec()));
        }
        let expected = timesteps
            .checked_mul(batch)
            .and_then(|n| n.checked_mul(classes))
            .ok_or_else(|| DecodeError::ShapeOverflow(shape.to_vec()))?;
        if expected != data.len() {
            return Err(DecodeError::ShapeMismatch {
                shape: shape.to_vec(),
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            timesteps,
            batch,
            classes,
        })
    }

    pub fn from_tensor(tensor: &'a Tensor) -> Result<Self, DecodeError> {
        Self::new(tensor.data(), tensor.shape())
    }

    #[inline]
    pub fn timesteps(&self) -> usize {
        self.timesteps
    }

    #[inline]
    pub fn classes(&self) -> usize {
        self.classes
    }

    /// Class scores of batch element 0 at timestep `t`.
    #[inline]
    pub fn row(&self, t: usize) -> &'a [f32] {
        let offset = t * self.batch * self.classes;
        &self.data[offset..offset + self.classes]
    }
}

/// Index of the best class in `row`, first index winning ties.
///
/// With an allowed set, indices past the row are skipped, the scan starts
/// from a floor of `-1e9` and falls back to the blank.
pub fn best_class(row: &[f32], allowed: Option<&AllowedIndexSet>) -> usize {
    match allowed {
        Some(set) => {
            let mut best = 0usize;
            let mut best_val = -1e9f32;
            for &c in set.as_slice() {
                let Some(&v) = row.get(c) else {
                    continue;
                };
                if v > best_val {
                    best_val = v;
                    best = c;
                }
            }
            best
        }
        None => {
            let mut best = 0usize;
            for (c, &v) in row.iter().enumerate().skip(1) {
                if v > row[best] {
                    best = c;
                }
            }
            best
        }
    }
}

/// Collapse the per-step best classes into text.
///
/// A symbol is emitted when it differs from the previous step's pick, is not
/// the blank and lies inside the charset. The previous pick is updated on
/// every step, so a blank between two equal symbols lets both through.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(timesteps = scores.timesteps()))
)]
pub fn decode_greedy(
    scores: &ScoreTensor<'_>,
    charset: &Charset,
    allowed: Option<&AllowedIndexSet>,
) -> String {
    let mut text = String::with_capacity(16);
    let mut last: Option<usize> = None;
    for t in 0..scores.timesteps() {
        let idx = best_class(scores.row(t), allowed);
        if last != Some(idx) && idx != 0 {
            if let Some(symbol) = charset.get(idx) {
                text.push_str(symbol);
            }
        }
        last = Some(idx);
    }
    text
}

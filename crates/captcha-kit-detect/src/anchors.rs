//! Grid decoding of the raw detector output.

use serde::{Deserialize, Serialize};

use crate::DetectError;

/// Feature map strides, smallest first.
pub const STRIDES: [usize; 3] = [8, 16, 32];

/// One grid cell of one feature map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Anchor {
    pub grid_x: usize,
    pub grid_y: usize,
    pub stride: usize,
}

/// All anchors for a square `input_size` input: stride-ascending, then
/// row-major within each `floor(input_size / stride)` grid.
pub fn generate_anchors(input_size: usize) -> Vec<Anchor> {
    let mut anchors = Vec::new();
    for stride in STRIDES {
        let cells = input_size / stride;
        for grid_y in 0..cells {
            for grid_x in 0..cells {
                anchors.push(Anchor {
                    grid_x,
                    grid_y,
                    stride,
                });
            }
        }
    }
    anchors
}

/// A decoded anchor record in letterboxed input pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridPrediction {
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
    pub objectness: f32,
    pub class_scores: Vec<f32>,
}

impl GridPrediction {
    /// `objectness * max(0, best class score)`.
    pub fn score(&self) -> f32 {
        let best = self.class_scores.iter().copied().fold(0.0f32, f32::max);
        self.objectness * best
    }
}

/// Split `data` into per-anchor records of `5 + K` floats and map offsets
/// back to input coordinates.
pub fn decode_grid(data: &[f32], input_size: usize) -> Result<Vec<GridPrediction>, DetectError> {
    let anchors = generate_anchors(input_size);
    if anchors.is_empty() {
        return Err(DetectError::NoAnchors { input_size });
    }
    if data.len() % anchors.len() != 0 {
        return Err(DetectError::AnchorMismatch {
            len: data.len(),
            anchors: anchors.len(),
        });
    }
    let record = data.len() / anchors.len();
    if record < 5 {
        return Err(DetectError::RecordTooShort { record });
    }

    let predictions = data
        .chunks_exact(record)
        .zip(&anchors)
        .map(|(r, a)| {
            let s = a.stride as f32;
            GridPrediction {
                cx: (r[0] + a.grid_x as f32) * s,
                cy: (r[1] + a.grid_y as f32) * s,
                w: (r[2] as f64).exp() as f32 * s,
                h: (r[3] as f64).exp() as f32 * s,
                objectness: r[4],
                class_scores: r[5..].to_vec(),
            }
        })
        .collect();
    Ok(predictions)
}

use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::anchors::decode_grid;
use crate::nms::{multiclass_nms, BoundingBox};
use crate::DetectError;

/// Detector input size and suppression thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectParams {
    /// Side of the square letterboxed input.
    pub input_size: usize,
    /// Boxes overlapping an accepted box by more than this IoU are dropped.
    pub nms_threshold: f32,
    /// Minimum `objectness * class score`.
    pub score_threshold: f32,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            input_size: 416,
            nms_threshold: 0.45,
            score_threshold: 0.1,
        }
    }
}

/// Grid decode followed by suppression, mapping boxes back to a
/// `orig_w x orig_h` image that was letterboxed with `ratio`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(output, params), fields(len = output.len()))
)]
pub fn detect_boxes(
    output: &[f32],
    ratio: f64,
    orig_w: usize,
    orig_h: usize,
    params: &DetectParams,
) -> Result<Vec<BoundingBox>, DetectError> {
    let predictions = decode_grid(output, params.input_size)?;
    multiclass_nms(
        &predictions,
        ratio,
        orig_w,
        orig_h,
        params.nms_threshold,
        params.score_threshold,
    )
}

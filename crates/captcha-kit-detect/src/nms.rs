use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::anchors::GridPrediction;
use crate::DetectError;

/// Axis-aligned box in original image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BoundingBox {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    #[inline]
    fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    pub fn to_array(self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

/// Intersection over union; 0 when the boxes do not overlap.
pub fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);
    if x2 <= x1 || y2 <= y1 {
        return 0.0;
    }
    let inter = (x2 - x1) as i64 * (y2 - y1) as i64;
    let union = a.area() + b.area() - inter;
    if union <= 0 {
        return 0.0;
    }
    inter as f32 / union as f32
}

struct Scored {
    bbox: BoundingBox,
    score: f32,
}

/// Score, threshold, rescale and suppress decoded predictions.
///
/// Coordinates are divided by the letterbox `ratio`, truncated toward zero
/// and clipped to `[0, orig_w] x [0, orig_h]`. Suppression ignores classes.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(predictions), fields(candidates = predictions.len()))
)]
pub fn multiclass_nms(
    predictions: &[GridPrediction],
    ratio: f64,
    orig_w: usize,
    orig_h: usize,
    nms_threshold: f32,
    score_threshold: f32,
) -> Result<Vec<BoundingBox>, DetectError> {
    if !(ratio.is_finite() && ratio > 0.0) {
        return Err(DetectError::InvalidRatio(ratio));
    }
    let ratio = ratio as f32;
    let max_x = i32::try_from(orig_w).unwrap_or(i32::MAX);
    let max_y = i32::try_from(orig_h).unwrap_or(i32::MAX);

    let mut dets: Vec<Scored> = predictions
        .iter()
        .filter_map(|p| {
            let score = p.score();
            // NaN never passes
            if !(score >= score_threshold) {
                return None;
            }
            let x1 = ((p.cx - p.w / 2.0) / ratio) as i32;
            let y1 = ((p.cy - p.h / 2.0) / ratio) as i32;
            let x2 = ((p.cx + p.w / 2.0) / ratio) as i32;
            let y2 = ((p.cy + p.h / 2.0) / ratio) as i32;
            Some(Scored {
                bbox: BoundingBox {
                    x1: x1.clamp(0, max_x),
                    y1: y1.clamp(0, max_y),
                    x2: x2.clamp(0, max_x),
                    y2: y2.clamp(0, max_y),
                },
                score,
            })
        })
        .collect();

    dets.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut suppressed = vec![false; dets.len()];
    let mut kept = Vec::new();
    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        kept.push(dets[i].bbox);
        for j in i + 1..dets.len() {
            if !suppressed[j] && iou(&dets[i].bbox, &dets[j].bbox) > nms_threshold {
                suppressed[j] = true;
            }
        }
    }
    log::debug!("nms kept {} of {} scored boxes", kept.len(), dets.len());
    Ok(kept)
}

//! Post-processing for anchor-free captcha character detectors.
//!
//! The pipeline mirrors what a YOLOX-style exported model expects:
//! [`letterbox`] the image into a square input, run the model elsewhere, then
//! [`decode_grid`] the flat output and suppress overlaps with [`multiclass_nms`].
//! [`detect_boxes`] chains the last two steps.

mod anchors;
mod letterbox;
mod nms;
mod params;

pub use anchors::{decode_grid, generate_anchors, Anchor, GridPrediction, STRIDES};
pub use letterbox::{letterbox, LETTERBOX_PAD};
pub use nms::{iou, multiclass_nms, BoundingBox};
pub use params::{detect_boxes, DetectParams};

use captcha_kit_core::TensorError;

/// Errors produced while decoding detector output.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DetectError {
    #[error("input size {input_size} yields no anchors (minimum is 8)")]
    NoAnchors { input_size: usize },

    #[error("detection output of {len} floats does not split into {anchors} anchors")]
    AnchorMismatch { len: usize, anchors: usize },

    #[error("anchor records hold {record} floats, need at least 5")]
    RecordTooShort { record: usize },

    #[error("letterbox ratio must be finite and positive, got {0}")]
    InvalidRatio(f64),

    #[error("cannot letterbox an empty image")]
    EmptyImage,

    #[error(transparent)]
    Tensor(#[from] TensorError),
}

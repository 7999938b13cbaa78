use std::sync::Mutex;

#[cfg(feature = "tracing")]
use tracing::instrument;

use captcha_kit_core::Raster;
use captcha_kit_detect::{detect_boxes, letterbox, BoundingBox, DetectParams};

use crate::session::{run_locked, InferenceSession};
use crate::KitError;

/// Character box detector around an anchor-free detection model.
pub struct Detector<S> {
    session: Mutex<S>,
    params: DetectParams,
}

impl<S: InferenceSession> Detector<S> {
    pub fn new(session: S) -> Self {
        Self::with_params(session, DetectParams::default())
    }

    pub fn with_params(session: S, params: DetectParams) -> Self {
        Self {
            session: Mutex::new(session),
            params,
        }
    }

    pub fn params(&self) -> &DetectParams {
        &self.params
    }

    /// Letterbox `raster`, run the model and return boxes in `raster` pixels.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, raster), fields(w = raster.width(), h = raster.height()))
    )]
    pub fn detect(&self, raster: &Raster) -> Result<Vec<BoundingBox>, KitError> {
        let (input, ratio) = letterbox(raster, self.params.input_size)?;
        let output = run_locked(&self.session, &input)?;
        let boxes = detect_boxes(
            output.data(),
            ratio,
            raster.width(),
            raster.height(),
            &self.params,
        )?;
        log::debug!("detected {} boxes", boxes.len());
        Ok(boxes)
    }
}

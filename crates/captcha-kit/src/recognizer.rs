use std::collections::HashMap;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

use captcha_kit_core::{composite_on_white, filter_by_colors, HsvRange, Raster};
use captcha_kit_ocr::{
    classify_probability, decode_greedy, AllowedIndexSet, Charset, ClassificationResult,
    ModelConfig, RangeSpec, RecognitionInput, ScoreTensor,
};

use crate::session::{run_locked, InferenceSession};
use crate::KitError;

/// Optional preprocessing applied before recognition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyOptions {
    /// Composite transparent images over white first.
    pub png_fix: bool,
    /// Keep only pixels in these named HSV ranges; empty disables filtering.
    pub colors: Vec<String>,
    /// Ranges overriding the built-in table for the same names.
    pub color_ranges: HashMap<String, HsvRange>,
}

/// Text recognizer around a CTC-style model.
pub struct Recognizer<S> {
    session: Mutex<S>,
    charset: Charset,
    input: RecognitionInput,
    ranges: Option<AllowedIndexSet>,
}

impl<S: InferenceSession> Recognizer<S> {
    /// Recognizer with the default 64-pixel-high grayscale input.
    pub fn new(session: S, charset: Charset) -> Self {
        Self::with_input(session, charset, RecognitionInput::default())
    }

    pub fn with_input(session: S, charset: Charset, input: RecognitionInput) -> Self {
        Self {
            session: Mutex::new(session),
            charset,
            input,
            ranges: None,
        }
    }

    /// Recognizer for a custom exported model and its JSON description.
    pub fn from_model_config(session: S, config: &ModelConfig) -> Result<Self, KitError> {
        let charset = config.charset()?;
        let input = config.recognition_input()?;
        Ok(Self::with_input(session, charset, input))
    }

    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    pub fn input(&self) -> &RecognitionInput {
        &self.input
    }

    /// Active character restriction, if any.
    pub fn ranges(&self) -> Option<&AllowedIndexSet> {
        self.ranges.as_ref()
    }

    /// Restrict decoding to the characters of `range`.
    pub fn set_ranges(&mut self, range: impl Into<RangeSpec>) {
        let set = range.into().resolve(&self.charset);
        log::debug!("restricting recognizer to {} charset indices", set.len());
        self.ranges = Some(set);
    }

    pub fn clear_ranges(&mut self) {
        self.ranges = None;
    }

    /// Recognize the text in `raster`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, raster, options), fields(w = raster.width(), h = raster.height()))
    )]
    pub fn classify(&self, raster: &Raster, options: &ClassifyOptions) -> Result<String, KitError> {
        let prepared = preprocess(raster, options);
        let output = run_locked(&self.session, &self.input.prepare(&prepared))?;
        let scores = ScoreTensor::from_tensor(&output)?;
        Ok(decode_greedy(&scores, &self.charset, self.ranges.as_ref()))
    }

    /// Recognize `raster` and also return the per-step class distribution.
    pub fn classify_probability(&self, raster: &Raster) -> Result<ClassificationResult, KitError> {
        let output = run_locked(&self.session, &self.input.prepare(raster))?;
        let scores = ScoreTensor::from_tensor(&output)?;
        Ok(classify_probability(
            &scores,
            &self.charset,
            self.ranges.as_ref(),
        ))
    }
}

fn preprocess(raster: &Raster, options: &ClassifyOptions) -> Raster {
    let mut img = if options.png_fix {
        composite_on_white(raster)
    } else {
        raster.clone()
    };
    if !options.colors.is_empty() {
        let names: Vec<&str> = options.colors.iter().map(String::as_str).collect();
        img = filter_by_colors(&img, &names, Some(&options.color_ranges));
    }
    img
}

//! Text recognition post-processing for captcha models.
//!
//! This crate turns the raw score tensor of a CTC-style recognizer into text:
//! - charsets and custom model descriptions ([`Charset`], [`ModelConfig`]),
//! - character range restrictions ([`RangePreset`], [`RangeSpec`]),
//! - greedy decoding and per-step probabilities ([`decode_greedy`], [`classify_probability`]),
//! - the resize/normalize rule for building recognizer inputs ([`RecognitionInput`]).
//!
//! It does **not** run a model. Callers hand in the output tensor of whatever
//! inference engine they use.

mod charset;
mod decode;
mod input;
mod probability;
mod ranges;

pub use charset::{Charset, CharsetError, ModelConfig};
pub use decode::{best_class, decode_greedy, DecodeError, ScoreTensor};
pub use input::{InputSize, RecognitionInput, DEFAULT_INPUT_HEIGHT};
pub use probability::{classify_probability, probability_matrix, softmax, ClassificationResult};
pub use ranges::{AllowedIndexSet, RangePreset, RangeSpec};

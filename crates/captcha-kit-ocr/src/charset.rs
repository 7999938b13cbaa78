use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::input::{InputSize, RecognitionInput};
use captcha_kit_core::{Channels, NormalizeParams};

/// Errors raised while building a [`Charset`] or reading a model configuration.
#[derive(thiserror::Error, Debug)]
pub enum CharsetError {
    #[error("charset is empty (index 0 must hold the blank)")]
    Empty,

    #[error("symbol {symbol:?} appears at index {first} and again at {second}")]
    DuplicateSymbol {
        symbol: String,
        first: usize,
        second: usize,
    },

    #[error("unsupported channel count {0} (expected 1 or 3)")]
    UnsupportedChannels(usize),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Ordered recognizer output alphabet. Index 0 is the blank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Charset {
    symbols: Vec<String>,
    index: HashMap<String, usize>,
}

impl Charset {
    pub fn new(symbols: Vec<String>) -> Result<Self, CharsetError> {
        if symbols.is_empty() {
            return Err(CharsetError::Empty);
        }
        let mut index = HashMap::with_capacity(symbols.len());
        for (i, s) in symbols.iter().enumerate() {
            if let Some(&first) = index.get(s) {
                return Err(CharsetError::DuplicateSymbol {
                    symbol: s.clone(),
                    first,
                    second: i,
                });
            }
            index.insert(s.clone(), i);
        }
        Ok(Self { symbols, index })
    }

    /// Blank followed by `0-9` and `a-z`.
    pub fn default_alphanumeric() -> Self {
        let symbols = std::iter::once(String::new())
            .chain(('0'..='9').chain('a'..='z').map(String::from))
            .collect::<Vec<_>>();
        let index = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        Self { symbols, index }
    }

    /// Parse a bare JSON array of symbols.
    pub fn from_json(json: &str) -> Result<Self, CharsetError> {
        let symbols: Vec<String> = serde_json::from_str(json)?;
        Self::new(symbols)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.symbols.get(index).map(String::as_str)
    }

    #[inline]
    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.index.get(symbol).copied()
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}

/// Custom model description shipped next to an exported recognizer.
///
/// ```json
/// { "charset": ["", "a", "b"], "word": false, "image": [-1, 64], "channel": 1 }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub charset: Vec<String>,
    /// Word models take square `h x h` inputs when the width is adaptive.
    #[serde(default)]
    pub word: bool,
    /// `[width, height]`; a width of `-1` means "keep aspect ratio".
    #[serde(default)]
    pub image: Option<[i32; 2]>,
    #[serde(default = "default_channel")]
    pub channel: usize,
}

fn default_channel() -> usize {
    1
}

impl ModelConfig {
    pub fn from_json(json: &str) -> Result<Self, CharsetError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn charset(&self) -> Result<Charset, CharsetError> {
        Charset::new(self.charset.clone())
    }

    /// Input geometry and normalization this model expects.
    ///
    /// Gray custom models take `[0, 1]` inputs; color models take `[-1, 1]`.
    pub fn recognition_input(&self) -> Result<RecognitionInput, CharsetError> {
        let (channels, normalize) = match self.channel {
            1 => (Channels::Gray, NormalizeParams::unit()),
            3 => (Channels::Rgb, NormalizeParams::centered()),
            other => return Err(CharsetError::UnsupportedChannels(other)),
        };
        let size = match self.image {
            Some([-1, h]) if self.word => InputSize::Square(h.max(1) as usize),
            Some([-1, h]) => InputSize::FixedHeight(h.max(1) as usize),
            Some([w, h]) => InputSize::Fixed {
                width: w.max(1) as usize,
                height: h.max(1) as usize,
            },
            None => InputSize::default(),
        };
        Ok(RecognitionInput {
            size,
            channels,
            normalize,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_charset_layout() {
        let cs = Charset::default_alphanumeric();
        assert_eq!(cs.len(), 37);
        assert_eq!(cs.get(0), Some(""));
        assert_eq!(cs.get(1), Some("0"));
        assert_eq!(cs.index_of("z"), Some(36));
        assert_eq!(cs.index_of("A"), None);
    }

    #[test]
    fn duplicates_are_rejected() {
        let err = Charset::from_json(r#"["", "a", "b", "a"]"#).unwrap_err();
        assert!(matches!(
            err,
            CharsetError::DuplicateSymbol { first: 1, second: 3, .. }
        ));
        assert!(matches!(Charset::from_json("[]"), Err(CharsetError::Empty)));
        assert!(matches!(Charset::from_json("{"), Err(CharsetError::Json(_))));
    }

    #[test]
    fn model_config_maps_to_input_rule() {
        let cfg = ModelConfig::from_json(
            r#"{"charset": ["", "x", "y"], "word": false, "image": [-1, 48], "channel": 1}"#,
        )
        .unwrap();
        assert_eq!(cfg.charset().unwrap().len(), 3);
        let input = cfg.recognition_input().unwrap();
        assert_eq!(input.size, InputSize::FixedHeight(48));
        assert_eq!(input.channels, Channels::Gray);
        assert_eq!(input.normalize, NormalizeParams::unit());

        let word = ModelConfig {
            word: true,
            channel: 3,
            ..cfg.clone()
        };
        let input = word.recognition_input().unwrap();
        assert_eq!(input.size, InputSize::Square(48));
        assert_eq!(input.normalize, NormalizeParams::centered());

        let fixed = ModelConfig {
            image: Some([100, 32]),
            ..cfg
        };
        assert_eq!(
            fixed.recognition_input().unwrap().size,
            InputSize::Fixed {
                width: 100,
                height: 32
            }
        );
    }

    #[test]
    fn model_config_defaults() {
        let cfg = ModelConfig::from_json(r#"{"charset": ["", "1"]}"#).unwrap();
        assert!(!cfg.word);
        assert_eq!(cfg.channel, 1);
        assert_eq!(cfg.image, None);
        assert!(matches!(
            ModelConfig { channel: 2, ..cfg }.recognition_input(),
            Err(CharsetError::UnsupportedChannels(2))
        ));
    }
}

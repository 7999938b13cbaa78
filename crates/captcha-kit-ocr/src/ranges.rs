//! Restricting the decoder to a subset of the charset.

use serde::{Deserialize, Serialize};

use crate::charset::Charset;

const DIGITS: &str = "0123456789";
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Built-in character ranges, numbered `0..=7` in the order listed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePreset {
    Digit,
    Lowercase,
    Uppercase,
    LowerUpper,
    LowerDigit,
    UpperDigit,
    LowerUpperDigit,
    /// Every charset symbol that is not a letter or a digit.
    NonAlphaNumeric,
}

impl RangePreset {
    pub fn from_index(index: i32) -> Option<Self> {
        Some(match index {
            0 => RangePreset::Digit,
            1 => RangePreset::Lowercase,
            2 => RangePreset::Uppercase,
            3 => RangePreset::LowerUpper,
            4 => RangePreset::LowerDigit,
            5 => RangePreset::UpperDigit,
            6 => RangePreset::LowerUpperDigit,
            7 => RangePreset::NonAlphaNumeric,
            _ => return None,
        })
    }

    fn characters(self, charset: &Charset) -> String {
        match self {
            RangePreset::Digit => DIGITS.to_string(),
            RangePreset::Lowercase => LOWER.to_string(),
            RangePreset::Uppercase => UPPER.to_string(),
            RangePreset::LowerUpper => [LOWER, UPPER].concat(),
            RangePreset::LowerDigit => [LOWER, DIGITS].concat(),
            RangePreset::UpperDigit => [UPPER, DIGITS].concat(),
            RangePreset::LowerUpperDigit => [LOWER, UPPER, DIGITS].concat(),
            RangePreset::NonAlphaNumeric => {
                let alnum = [LOWER, UPPER, DIGITS].concat();
                charset
                    .symbols()
                    .iter()
                    .filter(|s| !s.is_empty() && !alnum.contains(s.as_str()))
                    .map(String::as_str)
                    .collect()
            }
        }
    }
}

/// A character restriction: a preset or an explicit string of characters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeSpec {
    Preset(RangePreset),
    Custom(String),
}

impl From<RangePreset> for RangeSpec {
    fn from(p: RangePreset) -> Self {
        RangeSpec::Preset(p)
    }
}

impl From<&str> for RangeSpec {
    fn from(s: &str) -> Self {
        RangeSpec::Custom(s.to_string())
    }
}

impl From<String> for RangeSpec {
    fn from(s: String) -> Self {
        RangeSpec::Custom(s)
    }
}

impl RangeSpec {
    /// Look up every character of the range in `charset`.
    ///
    /// Characters the charset does not contain are skipped.
    pub fn resolve(&self, charset: &Charset) -> AllowedIndexSet {
        let chars = match self {
            RangeSpec::Preset(p) => p.characters(charset),
            RangeSpec::Custom(s) => s.clone(),
        };
        let mut buf = [0u8; 4];
        AllowedIndexSet::new(
            chars
                .chars()
                .filter_map(|c| charset.index_of(c.encode_utf8(&mut buf))),
        )
    }
}

/// Charset indices eligible during decoding. Always starts with the blank (0).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedIndexSet(Vec<usize>);

impl AllowedIndexSet {
    pub fn new(indices: impl IntoIterator<Item = usize>) -> Self {
        Self(std::iter::once(0).chain(indices).collect())
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Symbols for each index; indices outside the charset map to `""`.
    pub fn symbols(&self, charset: &Charset) -> Vec<String> {
        self.0
            .iter()
            .map(|&i| charset.get(i).unwrap_or_default().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mixed_charset() -> Charset {
        Charset::new(
            ["", "1", "2", "a", "b", "A", "+", "-", "中"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn preset_indices_follow_range_order() {
        let cs = mixed_charset();
        let digits = RangeSpec::from(RangePreset::Digit).resolve(&cs);
        assert_eq!(digits.as_slice(), &[0, 1, 2]);

        let lower_digit = RangeSpec::from(RangePreset::LowerDigit).resolve(&cs);
        assert_eq!(lower_digit.as_slice(), &[0, 3, 4, 1, 2]);
    }

    #[test]
    fn non_alphanumeric_collects_remaining_symbols() {
        let cs = mixed_charset();
        let set = RangeSpec::from(RangePreset::NonAlphaNumeric).resolve(&cs);
        assert_eq!(set.as_slice(), &[0, 6, 7, 8]);
        assert_eq!(set.symbols(&cs), vec!["", "+", "-", "中"]);
    }

    #[test]
    fn custom_string_skips_unknown_characters() {
        let cs = mixed_charset();
        let set = RangeSpec::from("b?中").resolve(&cs);
        assert_eq!(set.as_slice(), &[0, 4, 8]);
    }

    #[test]
    fn preset_numbering() {
        assert_eq!(RangePreset::from_index(0), Some(RangePreset::Digit));
        assert_eq!(RangePreset::from_index(7), Some(RangePreset::NonAlphaNumeric));
        assert_eq!(RangePreset::from_index(8), None);
        assert_eq!(RangePreset::from_index(-1), None);
    }
}

use serde::{Deserialize, Serialize};

use crate::charset::Charset;
use crate::decode::{decode_greedy, ScoreTensor};
use crate::ranges::AllowedIndexSet;

/// Numerically stable softmax of one score row.
pub fn softmax(row: &[f32]) -> Vec<f32> {
    let Some(max) = row.iter().copied().reduce(f32::max) else {
        return Vec::new();
    };
    let mut out: Vec<f32> = row
        .iter()
        .map(|&v| ((v - max) as f64).exp() as f32)
        .collect();
    let sum: f32 = out.iter().sum();
    for p in &mut out {
        *p /= sum;
    }
    out
}

/// One softmax row per timestep.
///
/// With an allowed set the columns are the allowed indices (in set order)
/// that exist in the tensor; otherwise every class.
pub fn probability_matrix(
    scores: &ScoreTensor<'_>,
    allowed: Option<&AllowedIndexSet>,
) -> Vec<Vec<f32>> {
    let columns = allowed.map(|set| effective_columns(set, scores.classes()));
    (0..scores.timesteps())
        .map(|t| {
            let row = scores.row(t);
            match &columns {
                Some(cols) => {
                    let picked: Vec<f32> = cols.iter().map(|&c| row[c]).collect();
                    softmax(&picked)
                }
                None => softmax(row),
            }
        })
        .collect()
}

fn effective_columns(set: &AllowedIndexSet, classes: usize) -> Vec<usize> {
    set.as_slice()
        .iter()
        .copied()
        .filter(|&c| c < classes)
        .collect()
}

/// Decoded text with the per-step distribution it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub text: String,
    /// Symbol for each probability column.
    pub charsets: Vec<String>,
    /// `T x len(charsets)` matrix; every row sums to 1.
    pub probability: Vec<Vec<f32>>,
}

impl ClassificationResult {
    /// Mean over timesteps of the winning probability, `None` for an empty sequence.
    pub fn confidence(&self) -> Option<f32> {
        if self.probability.is_empty() {
            return None;
        }
        let total: f32 = self
            .probability
            .iter()
            .map(|row| row.iter().copied().fold(0.0f32, f32::max))
            .sum();
        Some(total / self.probability.len() as f32)
    }
}

/// Decode `scores` and report the probability matrix alongside the text.
pub fn classify_probability(
    scores: &ScoreTensor<'_>,
    charset: &Charset,
    allowed: Option<&AllowedIndexSet>,
) -> ClassificationResult {
    let text = decode_greedy(scores, charset, allowed);
    let probability = probability_matrix(scores, allowed);
    let charsets = match allowed {
        Some(set) => effective_columns(set, scores.classes())
            .into_iter()
            .map(|i| charset.get(i).unwrap_or_default().to_string())
            .collect(),
        None => {
            let mut symbols = charset.symbols().to_vec();
            symbols.resize(scores.classes(), String::new());
            symbols
        }
    };
    ClassificationResult {
        text,
        charsets,
        probability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn argmax(row: &[f32]) -> usize {
        let mut best = 0;
        for (i, &v) in row.iter().enumerate() {
            if v > row[best] {
                best = i;
            }
        }
        best
    }

    #[test]
    fn rows_sum_to_one_and_keep_argmax() {
        let rows: [&[f32]; 4] = [
            &[1.0, 2.0, 3.0],
            &[-50.0, 0.0, 50.0, 49.0],
            &[1000.0, 999.0],
            &[0.0; 5],
        ];
        for row in rows {
            let p = softmax(row);
            assert_abs_diff_eq!(p.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
            assert_eq!(argmax(&p), argmax(row));
        }
        assert!(softmax(&[]).is_empty());
    }

    #[test]
    fn restricted_matrix_uses_allowed_columns() {
        let cs = Charset::new(["", "a", "b", "c"].into_iter().map(String::from).collect()).unwrap();
        let data = vec![0.0, 3.0, 1.0, 2.0, 0.0, 0.0, 4.0, 0.0];
        let scores = ScoreTensor::new(&data, &[2, 4]).unwrap();
        let allowed = AllowedIndexSet::new([3, 2, 11]);

        let res = classify_probability(&scores, &cs, Some(&allowed));
        assert_eq!(res.text, "cb");
        assert_eq!(res.charsets, vec!["", "c", "b"]);
        assert_eq!(res.probability.len(), 2);
        for row in &res.probability {
            assert_eq!(row.len(), 3);
            assert_abs_diff_eq!(row.iter().sum::<f32>(), 1.0, epsilon = 1e-5);
        }
        assert_eq!(argmax(&res.probability[0]), 1);
    }

    #[test]
    fn unrestricted_matrix_covers_all_classes() {
        let cs = Charset::new(["", "a"].into_iter().map(String::from).collect()).unwrap();
        let data = vec![0.0, 1.0, 0.5];
        let scores = ScoreTensor::new(&data, &[1, 3]).unwrap();
        let res = classify_probability(&scores, &cs, None);
        assert_eq!(res.text, "a");
        assert_eq!(res.charsets, vec!["", "a", ""]);
        assert_eq!(res.probability[0].len(), 3);
        let conf = res.confidence().unwrap();
        assert!(conf > 0.4 && conf < 0.6);
    }
}

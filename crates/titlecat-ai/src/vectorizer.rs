//! Mean-pooled document vectors from static token embeddings.

use crate::{ModelError, Tokenizer};

/// A document vector of the embedding space's dimensionality.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn zeros(dim: usize) -> Self {
        Self(vec![0.0; dim])
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }
}

impl From<Vec<f32>> for FeatureVector {
    fn from(v: Vec<f32>) -> Self {
        Self(v)
    }
}

/// Result of vectorizing one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Vectorized {
    pub vector: FeatureVector,
    /// Tokens that contributed to the mean.
    pub qualifying: usize,
}

/// Average the vectors of all tokens that are neither stopwords nor
/// punctuation and have a known embedding.
///
/// If nothing qualifies the result is the zero vector, so the output always
/// has dimension `tokenizer.dim()`.
pub fn vectorize(tokenizer: &dyn Tokenizer, text: &str) -> Result<Vectorized, ModelError> {
    let dim = tokenizer.dim();
    let mut included: Vec<(String, &[f32])> = tokenizer
        .tokenize(text)?
        .into_iter()
        .filter(|t| t.qualifies())
        .filter_map(|t| t.vector.map(|v| (t.text, v)))
        .collect();

    if included.is_empty() {
        return Ok(Vectorized {
            vector: FeatureVector::zeros(dim),
            qualifying: 0,
        });
    }

    // Sum in a canonical order so permutations of the same tokens give identical bits.
    included.sort_by(|a, b| a.0.cmp(&b.0));

    let mut sum = vec![0.0f64; dim];
    for (_, v) in &included {
        if v.len() != dim {
            return Err(ModelError::DimensionMismatch {
                expected: dim,
                actual: v.len(),
            });
        }
        for (acc, &x) in sum.iter_mut().zip(v.iter()) {
            *acc += f64::from(x);
        }
    }

    let count = included.len() as f64;
    let mean = sum.into_iter().map(|s| (s / count) as f32).collect();

    Ok(Vectorized {
        vector: FeatureVector(mean),
        qualifying: included.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EmbeddingTable, LanguageModel, StopWords};

    fn model() -> LanguageModel {
        let table = EmbeddingTable::from_entries(
            3,
            [
                ("quarterly", vec![1.0, 0.0, 0.0]),
                ("revenue", vec![0.0, 1.0, 0.0]),
                ("growth", vec![0.0, 0.0, 1.0]),
                ("the", vec![7.0, 7.0, 7.0]),
                ("of", vec![7.0, 7.0, 7.0]),
                ("and", vec![7.0, 7.0, 7.0]),
                ("!", vec![7.0, 7.0, 7.0]),
                ("tiny", vec![0.1, 0.2, 0.3]),
                ("huge", vec![1e6, -1e-6, 3.3]),
            ],
        )
        .unwrap();
        LanguageModel::new(table, StopWords::english())
    }

    #[test]
    fn mean_of_qualifying_tokens() {
        let model = model();
        let out = vectorize(&model, "Quarterly Revenue Growth").unwrap();
        assert_eq!(out.qualifying, 3);
        for &v in out.vector.as_slice() {
            assert!((v - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn stopwords_punctuation_and_oov_are_excluded() {
        let model = model();
        let out = vectorize(&model, "the revenue ! of unknownword").unwrap();
        assert_eq!(out.qualifying, 1);
        assert_eq!(out.vector.as_slice(), &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn possessives_and_negations_do_not_leak_into_the_mean() {
        let table = EmbeddingTable::from_entries(
            2,
            [
                ("revenue", vec![1.0, 0.0]),
                ("s", vec![0.0, 1.0]),
                ("don", vec![0.0, 1.0]),
                ("t", vec![0.0, 1.0]),
                ("'s", vec![0.0, 1.0]),
                ("do", vec![0.0, 1.0]),
                ("n't", vec![0.0, 1.0]),
            ],
        )
        .unwrap();
        let model = LanguageModel::new(table, StopWords::english());

        for text in ["revenue's", "don't revenue", "Revenue's revenue don't"] {
            let out = vectorize(&model, text).unwrap();
            assert_eq!(out.vector.as_slice(), &[1.0, 0.0], "{text:?}");
        }
        assert_eq!(vectorize(&model, "revenue's").unwrap().qualifying, 1);
        assert_eq!(vectorize(&model, "don't revenue").unwrap().qualifying, 1);
    }

    #[test]
    fn all_stopwords_fall_back_to_zero() {
        let model = model();
        let out = vectorize(&model, "the of and").unwrap();
        assert_eq!(out.qualifying, 0);
        assert_eq!(out.vector, FeatureVector::zeros(3));
        assert!(out.vector.is_zero());
    }

    #[test]
    fn punctuation_and_oov_fall_back_to_zero() {
        let model = model();
        for text in ["!!! ...", "zzz qqq", "", "   "] {
            let out = vectorize(&model, text).unwrap();
            assert_eq!(out.vector, FeatureVector::zeros(3), "{text:?}");
        }
    }

    #[test]
    fn shape_is_always_dim() {
        let model = model();
        for text in ["", "the", "growth", "tiny huge growth revenue", "¿¡ unknown!"] {
            assert_eq!(vectorize(&model, text).unwrap().vector.dim(), 3, "{text:?}");
        }
    }

    #[test]
    fn deterministic() {
        let model = model();
        let a = vectorize(&model, "tiny huge growth").unwrap();
        let b = vectorize(&model, "tiny huge growth").unwrap();
        assert_eq!(a.vector.as_slice(), b.vector.as_slice());
    }

    #[test]
    fn order_independent_bitwise() {
        let model = model();
        let a = vectorize(&model, "tiny huge growth revenue").unwrap();
        let b = vectorize(&model, "revenue growth huge the tiny").unwrap();
        let bits = |v: &FeatureVector| v.as_slice().iter().map(|x| x.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&a.vector), bits(&b.vector));
    }

    #[test]
    fn repeated_tokens_weigh_in() {
        let model = model();
        let out = vectorize(&model, "growth growth revenue").unwrap();
        assert_eq!(out.qualifying, 3);
        let v = out.vector.as_slice();
        assert!((v[1] - 1.0 / 3.0).abs() < 1e-6);
        assert!((v[2] - 2.0 / 3.0).abs() < 1e-6);
    }
}

//! The loaded model context: tokenizer plus classifier, validated together.

use std::path::Path;
use std::time::Instant;

use titlecat_core::Label;
use tracing::{debug, info};

use crate::{
    Classifier, FeatureVector, LabelSet, LanguageModel, ModelError, Tokenizer, Vectorized,
    load_classifier, vectorize,
};

/// A single prediction with the evidence it was based on.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: Label,
    /// Tokens that contributed to the feature vector. Zero means the
    /// classifier saw the zero vector.
    pub qualifying: usize,
}

/// Immutable text → label pipeline, built once and shared by every request.
pub struct Pipeline {
    tokenizer: Box<dyn Tokenizer>,
    classifier: Box<dyn Classifier>,
    fallback: Label,
}

impl Pipeline {
    /// Pair a tokenizer with a classifier.
    ///
    /// Fails if their dimensions differ or the classifier cannot decide the
    /// zero vector, so an incompatible pair never starts serving.
    pub fn new(
        tokenizer: Box<dyn Tokenizer>,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, ModelError> {
        if classifier.dim() != tokenizer.dim() {
            return Err(ModelError::DimensionMismatch {
                expected: tokenizer.dim(),
                actual: classifier.dim(),
            });
        }
        if classifier.labels().is_empty() {
            return Err(ModelError::NoClasses);
        }

        let fallback = classifier.predict_one(FeatureVector::zeros(tokenizer.dim()))?;
        info!(
            dim = tokenizer.dim(),
            classifier = classifier.kind(),
            classes = classifier.labels().len(),
            fallback = %fallback,
            "pipeline ready"
        );

        Ok(Self {
            tokenizer,
            classifier,
            fallback,
        })
    }

    /// Load a model directory and a classifier artifact from disk.
    pub fn load(model_dir: &Path, classifier_path: &Path) -> Result<Self, ModelError> {
        let model = LanguageModel::load(model_dir)?;
        let classifier = load_classifier(classifier_path)?;
        Self::new(Box::new(model), classifier)
    }

    pub fn dim(&self) -> usize {
        self.tokenizer.dim()
    }

    pub fn labels(&self) -> &LabelSet {
        self.classifier.labels()
    }

    pub fn classifier_kind(&self) -> &'static str {
        self.classifier.kind()
    }

    /// Label the classifier assigns to the zero vector.
    pub fn fallback_label(&self) -> &Label {
        &self.fallback
    }

    pub fn tokenizer(&self) -> &dyn Tokenizer {
        self.tokenizer.as_ref()
    }

    pub fn vectorize(&self, text: &str) -> Result<Vectorized, ModelError> {
        vectorize(self.tokenizer.as_ref(), text)
    }

    pub fn predict(&self, text: &str) -> Result<Prediction, ModelError> {
        let start = Instant::now();
        let Vectorized { vector, qualifying } = self.vectorize(text)?;
        let label = self.classifier.predict_one(vector)?;
        debug!(
            label = %label,
            qualifying,
            elapsed_us = start.elapsed().as_micros() as u64,
            "predicted"
        );
        Ok(Prediction { label, qualifying })
    }
}

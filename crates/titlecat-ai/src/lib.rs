//! Title classification: static word embeddings averaged into a document
//! vector, then a pretrained classifier.

mod classifier;
mod embeddings;
mod error;
mod labels;
#[cfg(feature = "onnx")]
mod onnx;
mod pipeline;
mod stopwords;
mod tokenizer;
mod vectorizer;

pub use classifier::{
    CentroidClassifier, Classifier, ClassifierArtifact, LinearClassifier, Metric, load_classifier,
};
pub use embeddings::EmbeddingTable;
pub use error::ModelError;
pub use labels::{LabelSet, LabelSummary};
#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
pub use pipeline::{Pipeline, Prediction};
pub use stopwords::StopWords;
pub use tokenizer::{LanguageModel, Token, Tokenizer};
pub use vectorizer::{FeatureVector, Vectorized, vectorize};

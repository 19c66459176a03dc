//! Pretrained category classifiers.
//!
//! A classifier is a fixed decision function over feature vectors of
//! dimension D. Artifacts are produced offline; nothing here fits or updates
//! a model. Two JSON artifact kinds are understood:
//!
//! - `linear`: per-class weight rows and intercepts, the layout of a
//!   scikit-learn linear model's `classes_` / `coef_` / `intercept_`.
//! - `centroid`: one centroid per class, decided by nearest centroid.
//!
//! With the `onnx` feature an ONNX Runtime model is accepted as well.

use std::path::Path;

use serde::{Deserialize, Serialize};
use titlecat_core::Label;
use tracing::info;

use crate::{FeatureVector, LabelSet, ModelError};

/// A pretrained decision function from feature vectors to labels.
pub trait Classifier: Send + Sync {
    /// Short name of the artifact kind, for logs.
    fn kind(&self) -> &'static str;

    /// Expected input dimensionality.
    fn dim(&self) -> usize;

    fn labels(&self) -> &LabelSet;

    /// Predict one label per row of `batch`.
    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<Label>, ModelError>;

    /// Predict a single vector as a batch of one.
    fn predict_one(&self, vector: FeatureVector) -> Result<Label, ModelError> {
        self.predict(std::slice::from_ref(&vector))?
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Other("classifier returned an empty batch".into()))
    }
}

/// On-disk JSON form of a classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ClassifierArtifact {
    Linear {
        classes: Vec<Label>,
        coef: Vec<Vec<f32>>,
        intercept: Vec<f32>,
    },
    Centroid {
        classes: Vec<Label>,
        centroids: Vec<Vec<f32>>,
        #[serde(default)]
        metric: Metric,
    },
}

impl ClassifierArtifact {
    pub fn into_classifier(self) -> Result<Box<dyn Classifier>, ModelError> {
        Ok(match self {
            Self::Linear {
                classes,
                coef,
                intercept,
            } => Box::new(LinearClassifier::new(classes, coef, intercept)?),
            Self::Centroid {
                classes,
                centroids,
                metric,
            } => Box::new(CentroidClassifier::new(classes, centroids, metric)?),
        })
    }
}

/// Load a classifier artifact, dispatching on the file extension.
pub fn load_classifier(path: &Path) -> Result<Box<dyn Classifier>, ModelError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    let classifier: Box<dyn Classifier> = match ext.as_deref() {
        Some("json") => {
            let text = std::fs::read_to_string(path).map_err(|e| ModelError::io(path, e))?;
            let artifact: ClassifierArtifact = serde_json::from_str(&text)?;
            artifact.into_classifier()?
        }
        #[cfg(feature = "onnx")]
        Some("onnx") => Box::new(crate::onnx::OnnxClassifier::load(path)?),
        #[cfg(not(feature = "onnx"))]
        Some("onnx") => {
            return Err(ModelError::Unsupported(format!(
                "{} needs the `onnx` feature",
                path.display()
            )));
        }
        _ => {
            return Err(ModelError::Unsupported(format!(
                "{}: expected a .json or .onnx artifact",
                path.display()
            )));
        }
    };

    info!(
        kind = classifier.kind(),
        dim = classifier.dim(),
        classes = classifier.labels().len(),
        path = %path.display(),
        "loaded classifier"
    );
    Ok(classifier)
}

// ── Linear ──

/// Linear decision function: `argmax(W·x + b)`.
///
/// Binary models carry a single weight row; a positive score selects the
/// second class. At least two classes are required.
#[derive(Debug)]
pub struct LinearClassifier {
    labels: LabelSet,
    coef: Vec<Vec<f32>>,
    intercept: Vec<f32>,
    binary: bool,
    dim: usize,
}

impl LinearClassifier {
    pub fn new(
        classes: Vec<Label>,
        coef: Vec<Vec<f32>>,
        intercept: Vec<f32>,
    ) -> Result<Self, ModelError> {
        let labels = LabelSet::new(classes)?;
        let dim = matrix_dim(&coef, "coef")?;

        if labels.len() < 2 {
            return Err(ModelError::Artifact(format!(
                "a linear model needs at least 2 classes, found {}",
                labels.len()
            )));
        }
        let binary = labels.len() == 2 && coef.len() == 1;
        if !binary && coef.len() != labels.len() {
            return Err(ModelError::Artifact(format!(
                "coef has {} rows for {} classes",
                coef.len(),
                labels.len()
            )));
        }
        if intercept.len() != coef.len() {
            return Err(ModelError::Artifact(format!(
                "intercept has {} entries for {} coef rows",
                intercept.len(),
                coef.len()
            )));
        }

        Ok(Self {
            labels,
            coef,
            intercept,
            binary,
            dim,
        })
    }

    fn decide(&self, x: &[f32]) -> usize {
        let scores = self
            .coef
            .iter()
            .zip(&self.intercept)
            .map(|(w, &b)| dot(w, x) + f64::from(b));

        if self.binary {
            let score = scores.sum::<f64>();
            return usize::from(score > 0.0);
        }
        argmax(scores)
    }
}

impl Classifier for LinearClassifier {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn labels(&self) -> &LabelSet {
        &self.labels
    }

    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<Label>, ModelError> {
        batch
            .iter()
            .map(|v| {
                check_dim(self.dim, v)?;
                label_at(&self.labels, self.decide(v.as_slice()))
            })
            .collect()
    }
}

// ── Nearest centroid ──

/// Distance used by [`CentroidClassifier`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Euclidean,
    Cosine,
}

/// Assigns the label of the nearest class centroid.
#[derive(Debug)]
pub struct CentroidClassifier {
    labels: LabelSet,
    centroids: Vec<Vec<f32>>,
    metric: Metric,
    dim: usize,
}

impl CentroidClassifier {
    pub fn new(
        classes: Vec<Label>,
        mut centroids: Vec<Vec<f32>>,
        metric: Metric,
    ) -> Result<Self, ModelError> {
        let labels = LabelSet::new(classes)?;
        let dim = matrix_dim(&centroids, "centroids")?;
        if centroids.len() != labels.len() {
            return Err(ModelError::Artifact(format!(
                "{} centroids for {} classes",
                centroids.len(),
                labels.len()
            )));
        }

        if metric == Metric::Cosine {
            for c in &mut centroids {
                normalize(c);
            }
        }

        Ok(Self {
            labels,
            centroids,
            metric,
            dim,
        })
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Index of the best-matching centroid; the first one wins ties.
    fn best_match(&self, x: &[f32]) -> usize {
        match self.metric {
            Metric::Euclidean => argmax(self.centroids.iter().map(|c| -squared_distance(c, x))),
            Metric::Cosine => {
                let norm = dot(x, x).sqrt();
                argmax(self.centroids.iter().map(|c| {
                    if norm > 0.0 { dot(c, x) / norm } else { 0.0 }
                }))
            }
        }
    }
}

impl Classifier for CentroidClassifier {
    fn kind(&self) -> &'static str {
        "centroid"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn labels(&self) -> &LabelSet {
        &self.labels
    }

    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<Label>, ModelError> {
        batch
            .iter()
            .map(|v| {
                check_dim(self.dim, v)?;
                label_at(&self.labels, self.best_match(v.as_slice()))
            })
            .collect()
    }
}

// ── Helpers ──

/// Label at a decision index.
fn label_at(labels: &LabelSet, index: usize) -> Result<Label, ModelError> {
    labels
        .get(index)
        .cloned()
        .ok_or_else(|| ModelError::Other(format!("decision index {index} out of range")))
}

pub(crate) fn check_dim(expected: usize, v: &FeatureVector) -> Result<(), ModelError> {
    if v.dim() == expected {
        Ok(())
    } else {
        Err(ModelError::DimensionMismatch {
            expected,
            actual: v.dim(),
        })
    }
}

/// Common row length of a non-empty, non-ragged matrix.
fn matrix_dim(rows: &[Vec<f32>], name: &str) -> Result<usize, ModelError> {
    let dim = rows
        .first()
        .map(Vec::len)
        .ok_or_else(|| ModelError::Artifact(format!("{name} is empty")))?;
    if dim == 0 {
        return Err(ModelError::Artifact(format!("{name} rows are empty")));
    }
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dim) {
        return Err(ModelError::Artifact(format!(
            "{name} row {i} has {} values, expected {dim}",
            row.len()
        )));
    }
    Ok(dim)
}

fn argmax(scores: impl Iterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (i, s) in scores.enumerate() {
        if s > best_score {
            best = i;
            best_score = s;
        }
    }
    best
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum()
}

fn squared_distance(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum()
}

/// L2-normalize a vector in place.
fn normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}

//! ONNX Runtime classifier.
//!
//! The model directory layout is `<name>.onnx` plus a sibling `labels.json`
//! holding the class values. The model's first input takes a `[batch, D]`
//! float tensor; its first output yields one int64 class index per row.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Tensor;
use titlecat_core::Label;
use tracing::info;

use crate::classifier::check_dim;
use crate::{Classifier, FeatureVector, LabelSet, ModelError};

pub struct OnnxClassifier {
    session: Mutex<Session>,
    input_name: String,
    labels: LabelSet,
    dim: usize,
}

impl OnnxClassifier {
    /// Load `model.onnx` and the `labels.json` beside it.
    pub fn load(model_path: &Path) -> Result<Self, ModelError> {
        let labels_path = model_path.with_file_name("labels.json");

        if !model_path.exists() {
            return Err(ModelError::NotFound(model_path.to_path_buf()));
        }
        let labels_text =
            std::fs::read_to_string(&labels_path).map_err(|e| ModelError::io(&labels_path, e))?;
        let labels = LabelSet::new(serde_json::from_str::<Vec<Label>>(&labels_text)?)?;

        let session = Session::builder()?.commit_from_file(model_path)?;

        let input = session
            .inputs()
            .first()
            .ok_or_else(|| ModelError::Artifact("onnx model has no inputs".into()))?;
        let input_name = input.name().to_string();
        let dim = infer_dim(input.dtype()).ok_or_else(|| {
            ModelError::Artifact(format!("cannot infer feature dimension of input {input_name:?}"))
        })?;

        info!(dim, input = %input_name, model = %model_path.display(), "loaded onnx classifier");
        Ok(Self {
            session: Mutex::new(session),
            input_name,
            labels,
            dim,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn labels(&self) -> &LabelSet {
        &self.labels
    }

    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<Label>, ModelError> {
        if batch.is_empty() {
            return Ok(vec![]);
        }

        let mut flat = Vec::with_capacity(batch.len() * self.dim);
        for v in batch {
            check_dim(self.dim, v)?;
            flat.extend_from_slice(v.as_slice());
        }

        let shape = [batch.len() as i64, self.dim as i64];
        let input = Tensor::from_array((shape, flat.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ModelError::Other("onnx session lock poisoned".into()))?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => input])?;

        let (_, indices) = outputs[0].try_extract_tensor::<i64>()?;
        if indices.len() != batch.len() {
            return Err(ModelError::Other(format!(
                "onnx model returned {} labels for {} rows",
                indices.len(),
                batch.len()
            )));
        }

        indices
            .iter()
            .map(|&i| {
                usize::try_from(i)
                    .ok()
                    .and_then(|i| self.labels.get(i))
                    .cloned()
                    .ok_or_else(|| ModelError::Other(format!("class index {i} out of range")))
            })
            .collect()
    }
}

/// Feature dimension from the last axis of the input tensor type.
fn infer_dim(input_type: &ort::value::ValueType) -> Option<usize> {
    match input_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}

pub mod label;
pub mod predict;

pub use label::Label;
pub use predict::{ErrorBody, PredictRequest, PredictResponse};

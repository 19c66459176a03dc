use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use titlecat_ai::Pipeline;
use titlecat_core::{PredictRequest, PredictResponse};
use tracing::info;

use crate::error::{ServerError, ServerResult};

/// `POST /predict`
///
/// The pipeline is CPU-bound and synchronous, so it runs on the blocking pool.
pub async fn predict(
    State(pipeline): State<Arc<Pipeline>>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> ServerResult<Json<PredictResponse>> {
    let Json(request) = body.map_err(reject)?;
    let title = request.title().ok_or(ServerError::MissingTitle)?.to_string();

    let prediction = tokio::task::spawn_blocking(move || pipeline.predict(&title))
        .await
        .map_err(|e| ServerError::Internal(format!("prediction task: {e}")))??;

    info!(
        label = %prediction.label,
        qualifying = prediction.qualifying,
        "prediction"
    );
    Ok(Json(PredictResponse {
        prediction: prediction.label,
    }))
}

/// Undecodable or ill-typed JSON is our 400. Anything else the extractor
/// refuses (size, content type) keeps the status axum assigned.
fn reject(rejection: JsonRejection) -> ServerError {
    match rejection {
        JsonRejection::JsonSyntaxError(_) | JsonRejection::JsonDataError(_) => {
            ServerError::BadRequest(rejection.body_text())
        }
        other => ServerError::Rejected {
            status: other.status(),
            message: other.body_text(),
        },
    }
}

pub async fn not_found() -> ServerError {
    ServerError::NotFound
}

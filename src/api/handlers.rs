use crate::api::AppState;
use crate::error::{AppError, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

/// Classify a piece of text
pub async fn predict_intent(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PredictIntentRequest>, JsonRejection>,
) -> Result<Json<PredictIntentResponse>> {
    let Json(request) = payload.map_err(|rejection| AppError::Validation(rejection.body_text()))?;

    let intent = state.model.predict_intent(&request.text)?;

    tracing::debug!(intent = %intent, chars = request.text.chars().count(), "Served prediction");

    Ok(Json(PredictIntentResponse { intent }))
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PredictIntentRequest {
    pub text: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PredictIntentResponse {
    pub intent: String,
}

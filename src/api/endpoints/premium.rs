//! `POST /predict`: premium category prediction.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{PremiumContext, RequestContext};
use crate::models::{PredictionDraft, PredictionInput};
use crate::predictor::FeatureRow;

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub predicted_category: String,
}

pub async fn predict(
    State(ctx): State<PremiumContext>,
    Extension(req): Extension<RequestContext>,
    payload: Result<Json<PredictionDraft>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(draft) = payload?;
    let input = PredictionInput::try_from(draft)?;
    let row = FeatureRow::from(&input);

    tracing::debug!(
        request_id = %req.request_id,
        city = input.city(),
        occupation = input.occupation(),
        incoming_lpa = input.incoming_lpa(),
        smoker = input.smoker(),
        city_tier = row.city_tier,
        age_group = %row.age_group,
        lifestyle_risk = %input.lifestyle_risk(),
        "Premium prediction requested"
    );

    let predicted_category = ctx.model.predict(&row)?;
    Ok(Json(PredictionResponse { predicted_category }))
}

//! Patient record endpoints.
//!
//! - `GET /view`: full store dump
//! - `GET /patients/:id`: single record
//! - `GET /sort`: records ordered by height, weight, or bmi
//! - `POST /create`: insert with client-supplied id
//! - `PUT /edit/:id`: partial update
//! - `DELETE /delete/:id`: remove

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{PatientContext, RequestContext};
use crate::models::{CreatePatientRequest, PatientEntry, PatientUpdate, SortField, SortOrder};
use crate::store::PatientMap;

fn not_found() -> ApiError {
    ApiError::NotFound("Patient not found".into())
}

#[derive(Debug, Serialize)]
pub struct MutationResponse {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient: Option<PatientEntry>,
}

/// `GET /view`: every record keyed by id.
pub async fn view(State(ctx): State<PatientContext>) -> Result<Json<PatientMap>, ApiError> {
    Ok(Json(ctx.store.load()?))
}

/// `GET /patients/:id`
pub async fn detail(
    State(ctx): State<PatientContext>,
    Path(id): Path<String>,
) -> Result<Json<PatientEntry>, ApiError> {
    let mut data = ctx.store.load()?;
    let patient = data.remove(&id).ok_or_else(not_found)?;
    Ok(Json(PatientEntry { id, patient }))
}

#[derive(Debug, Deserialize)]
pub struct SortQuery {
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// Stable sort over the id-ordered collection: ties keep ascending id order
/// in both directions.
pub fn sort_patients(data: PatientMap, field: SortField, order: SortOrder) -> Vec<PatientEntry> {
    let mut entries: Vec<PatientEntry> = data
        .into_iter()
        .map(|(id, patient)| PatientEntry { id, patient })
        .collect();
    entries.sort_by(|a, b| {
        let (ka, kb) = (a.patient.sort_key(field), b.patient.sort_key(field));
        match order {
            SortOrder::Asc => ka.total_cmp(&kb),
            SortOrder::Desc => kb.total_cmp(&ka),
        }
    });
    entries
}

/// `GET /sort?sort_by=&order=`
pub async fn sort(
    State(ctx): State<PatientContext>,
    query: Result<Query<SortQuery>, QueryRejection>,
) -> Result<Json<Vec<PatientEntry>>, ApiError> {
    let Query(query) = query?;

    let field = query
        .sort_by
        .as_deref()
        .and_then(|s| s.parse::<SortField>().ok())
        .ok_or_else(|| ApiError::InvalidParameter {
            message: format!(
                "Invalid sort_by field. Must be one of {}",
                SortField::ALL.join(", ")
            ),
            allowed: SortField::ALL.to_vec(),
        })?;
    let order = match query.order.as_deref() {
        None => SortOrder::Asc,
        Some(s) => s.parse::<SortOrder>().map_err(|_| ApiError::InvalidParameter {
            message: "Invalid order. Must be 'asc' or 'desc'".into(),
            allowed: SortOrder::ALL.to_vec(),
        })?,
    };

    let data = ctx.store.load()?;
    Ok(Json(sort_patients(data, field, order)))
}

/// `POST /create`
pub async fn create(
    State(ctx): State<PatientContext>,
    Extension(req): Extension<RequestContext>,
    payload: Result<Json<CreatePatientRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MutationResponse>), ApiError> {
    let Json(request) = payload?;
    let (id, patient) = request.validate()?;

    let entry = ctx
        .store
        .update(|data| {
            if data.contains_key(&id) {
                return Err(ApiError::DuplicateId("Patient already exists".into()));
            }
            data.insert(id.clone(), patient.clone());
            Ok(PatientEntry { id, patient })
        })
        .await?;

    tracing::info!(request_id = %req.request_id, patient_id = %entry.id, "Patient created");
    Ok((
        StatusCode::CREATED,
        Json(MutationResponse {
            message: "patient created successfully",
            patient: Some(entry),
        }),
    ))
}

/// `PUT /edit/:id`: only supplied fields overwrite stored ones; the merged
/// record is validated in full before it is written.
pub async fn update(
    State(ctx): State<PatientContext>,
    Extension(req): Extension<RequestContext>,
    Path(id): Path<String>,
    payload: Result<Json<PatientUpdate>, JsonRejection>,
) -> Result<Json<MutationResponse>, ApiError> {
    let Json(changes) = payload?;

    let entry = ctx
        .store
        .update(|data| {
            let existing = data.get(&id).ok_or_else(not_found)?;
            let patient = existing.updated(changes)?;
            data.insert(id.clone(), patient.clone());
            Ok::<_, ApiError>(PatientEntry { id, patient })
        })
        .await?;

    tracing::info!(request_id = %req.request_id, patient_id = %entry.id, "Patient updated");
    Ok(Json(MutationResponse {
        message: "patient updated",
        patient: Some(entry),
    }))
}

/// `DELETE /delete/:id`
pub async fn delete(
    State(ctx): State<PatientContext>,
    Extension(req): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<Json<MutationResponse>, ApiError> {
    ctx.store
        .update(|data| data.remove(&id).map(|_| ()).ok_or_else(not_found))
        .await?;

    tracing::info!(request_id = %req.request_id, patient_id = %id, "Patient deleted");
    Ok(Json(MutationResponse {
        message: "patient deleted",
        patient: None,
    }))
}

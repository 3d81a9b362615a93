use axum::{Json, extract::rejection::JsonRejection, http::StatusCode};
use serde::Serialize;

use crate::application::error::HttpError;

#[derive(Debug, Serialize)]
pub(crate) struct SuccessBody {
    success: bool,
}

pub(crate) fn success() -> Json<SuccessBody> {
    Json(SuccessBody { success: true })
}

/// Unwrap a JSON body, answering 400 for anything the extractor rejects.
pub(crate) fn json_body<T>(
    source: &'static str,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, HttpError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        HttpError::new(
            source,
            StatusCode::BAD_REQUEST,
            "Invalid JSON body",
            rejection.body_text(),
        )
    })
}

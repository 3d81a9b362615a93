use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::application::error::HttpError;
use crate::domain::settings::UserSettings;

use super::super::{
    AdminState,
    shared::{SuccessBody, json_body, success},
};
use super::errors::admin_settings_error;

pub(crate) async fn admin_user_settings(
    State(state): State<AdminState>,
) -> Result<Json<UserSettings>, HttpError> {
    let settings = state
        .settings
        .load()
        .await
        .map_err(|err| admin_settings_error("infra::http::admin_user_settings", err))?;
    Ok(Json(settings))
}

pub(crate) async fn admin_user_settings_save(
    State(state): State<AdminState>,
    payload: Result<Json<UserSettings>, JsonRejection>,
) -> Result<Json<SuccessBody>, HttpError> {
    let settings = json_body("infra::http::admin_user_settings_save", payload)?;
    state
        .settings
        .save(settings)
        .await
        .map_err(|err| admin_settings_error("infra::http::admin_user_settings_save", err))?;
    Ok(success())
}

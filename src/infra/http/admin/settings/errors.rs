//! Error handling for user settings admin handlers.

use axum::http::StatusCode;

use crate::application::{admin::settings::AdminSettingsError, error::HttpError};

pub(super) fn admin_settings_error(source: &'static str, err: AdminSettingsError) -> HttpError {
    match err {
        AdminSettingsError::KvRequired => {
            HttpError::from_error(source, StatusCode::FORBIDDEN, err.to_string(), &err)
        }
        AdminSettingsError::MissingVerifySender
        | AdminSettingsError::SenderDomainNotAllowed { .. }
        | AdminSettingsError::InvalidMaxAddressCount => HttpError::bad_request(source, &err),
        AdminSettingsError::Domain(_)
        | AdminSettingsError::Repo(_)
        | AdminSettingsError::Encode(_) => HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to access user settings",
            &err,
        ),
    }
}

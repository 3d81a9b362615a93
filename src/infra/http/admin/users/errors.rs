//! Error handling for user admin handlers.

use axum::http::StatusCode;

use crate::application::{admin::users::AdminUserError, error::HttpError};

pub(super) fn admin_user_error(source: &'static str, err: AdminUserError) -> HttpError {
    match err {
        AdminUserError::MissingCredentials
        | AdminUserError::InvalidUserId
        | AdminUserError::UnknownRole
        | AdminUserError::Pagination(_)
        | AdminUserError::AlreadyExists => HttpError::bad_request(source, &err),
        AdminUserError::Register(_)
        | AdminUserError::Delete(_)
        | AdminUserError::ResetPassword(_)
        | AdminUserError::UpdateRoles(_)
        | AdminUserError::List(_)
        | AdminUserError::BoundAddresses(_)
        | AdminUserError::Encode(_) => HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            err.to_string(),
            &err,
        ),
    }
}

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::HeaderMap,
};

use crate::application::{
    admin::users::{CreateUserCommand, parse_user_id},
    error::HttpError,
    pagination::{OffsetPage, OffsetRequest},
};
use crate::domain::entities::UserListRecord;

use super::super::{
    AdminState,
    origin::request_geo,
    shared::{SuccessBody, json_body, success},
};
use super::errors::admin_user_error;
use super::models::{
    BoundAddressesResponse, CreateUserRequest, ResetPasswordRequest, UpdateRolesRequest,
    UserListQuery,
};

pub(crate) async fn admin_users(
    State(state): State<AdminState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<OffsetPage<UserListRecord>>, HttpError> {
    const SOURCE: &str = "infra::http::admin_users";

    let page = OffsetRequest::parse(query.limit.as_deref(), query.offset.as_deref())
        .map_err(|err| admin_user_error(SOURCE, err.into()))?;
    let listed = state
        .users
        .list_users(query.query.as_deref(), page)
        .await
        .map_err(|err| admin_user_error(SOURCE, err))?;
    Ok(Json(listed))
}

pub(crate) async fn admin_user_create(
    State(state): State<AdminState>,
    headers: HeaderMap,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<Json<SuccessBody>, HttpError> {
    const SOURCE: &str = "infra::http::admin_user_create";

    let body = json_body(SOURCE, payload)?;
    let command = CreateUserCommand {
        email: body.email,
        password: body.password,
        geo: request_geo(&headers),
    };
    state
        .users
        .create_user(command)
        .await
        .map_err(|err| admin_user_error(SOURCE, err))?;
    Ok(success())
}

pub(crate) async fn admin_user_delete(
    State(state): State<AdminState>,
    Path(user_id): Path<String>,
) -> Result<Json<SuccessBody>, HttpError> {
    const SOURCE: &str = "infra::http::admin_user_delete";

    let user_id = parse_user_id(&user_id).map_err(|err| admin_user_error(SOURCE, err))?;
    state
        .users
        .delete_user(user_id)
        .await
        .map_err(|err| admin_user_error(SOURCE, err))?;
    Ok(success())
}

pub(crate) async fn admin_user_reset_password(
    State(state): State<AdminState>,
    Path(user_id): Path<String>,
    payload: Result<Json<ResetPasswordRequest>, JsonRejection>,
) -> Result<Json<SuccessBody>, HttpError> {
    const SOURCE: &str = "infra::http::admin_user_reset_password";

    let user_id = parse_user_id(&user_id).map_err(|err| admin_user_error(SOURCE, err))?;
    let body = json_body(SOURCE, payload)?;
    state
        .users
        .reset_password(user_id, body.password)
        .await
        .map_err(|err| admin_user_error(SOURCE, err))?;
    Ok(success())
}

pub(crate) async fn admin_user_roles_update(
    State(state): State<AdminState>,
    payload: Result<Json<UpdateRolesRequest>, JsonRejection>,
) -> Result<Json<SuccessBody>, HttpError> {
    const SOURCE: &str = "infra::http::admin_user_roles_update";

    let body = json_body(SOURCE, payload)?;
    let user_id = body.user_id.as_ref().and_then(|id| id.as_id());
    state
        .users
        .update_role(user_id, body.role_text.as_deref())
        .await
        .map_err(|err| admin_user_error(SOURCE, err))?;
    Ok(success())
}

pub(crate) async fn admin_user_bound_addresses(
    State(state): State<AdminState>,
    Path(user_id): Path<String>,
) -> Result<Json<BoundAddressesResponse>, HttpError> {
    const SOURCE: &str = "infra::http::admin_user_bound_addresses";

    let user_id = parse_user_id(&user_id).map_err(|err| admin_user_error(SOURCE, err))?;
    let results = state
        .users
        .bound_addresses(user_id)
        .await
        .map_err(|err| admin_user_error(SOURCE, err))?;
    Ok(Json(BoundAddressesResponse { results }))
}

use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::info;

use crate::application::pagination::{OffsetPage, OffsetRequest, PaginationError};
use crate::application::password::{PasswordPolicyError, check_user_password};
use crate::application::repos::{
    AddressesRepo, CreateUserParams, RepoError, UserQueryFilter, UsersRepo, UsersWriteRepo,
};
use crate::application::roles::RoleCatalog;
use crate::domain::entities::{AddressRecord, UserListRecord};
use crate::domain::geo::{GeoData, UserInfo};

const METRIC_USER_MUTATIONS: &str = "mailyard_admin_user_mutations_total";

#[derive(Debug, Error)]
pub enum AdminUserError {
    #[error("Invalid email or password")]
    MissingCredentials,
    #[error("Invalid user_id")]
    InvalidUserId,
    #[error("Invalid role_text")]
    UnknownRole,
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error("User already exists")]
    AlreadyExists,
    #[error("Failed to register: {0}")]
    Register(UserWriteFailure),
    #[error("Failed to delete user")]
    Delete(#[source] RepoError),
    #[error("Failed to reset password: {0}")]
    ResetPassword(UserWriteFailure),
    #[error("Failed to update user roles")]
    UpdateRoles(#[source] RepoError),
    #[error("Failed to list users")]
    List(#[source] RepoError),
    #[error("Failed to list bound addresses")]
    BoundAddresses(#[source] RepoError),
    #[error("user info could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A rejected account write: either the password policy or the store refused it.
#[derive(Debug, Error)]
pub enum UserWriteFailure {
    #[error(transparent)]
    Policy(#[from] PasswordPolicyError),
    #[error(transparent)]
    Store(#[from] RepoError),
}

#[derive(Debug, Clone, Default)]
pub struct CreateUserCommand {
    pub email: Option<String>,
    pub password: Option<String>,
    pub geo: GeoData,
}

/// Parse a user id taken from a request path.
pub fn parse_user_id(raw: &str) -> Result<i64, AdminUserError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(AdminUserError::InvalidUserId)
}

fn require_user_id(user_id: Option<i64>) -> Result<i64, AdminUserError> {
    user_id
        .filter(|id| *id > 0)
        .ok_or(AdminUserError::InvalidUserId)
}

#[derive(Clone)]
pub struct AdminUserService {
    reader: Arc<dyn UsersRepo>,
    writer: Arc<dyn UsersWriteRepo>,
    addresses: Arc<dyn AddressesRepo>,
    roles: Arc<RoleCatalog>,
}

impl AdminUserService {
    pub fn new(
        reader: Arc<dyn UsersRepo>,
        writer: Arc<dyn UsersWriteRepo>,
        addresses: Arc<dyn AddressesRepo>,
        roles: Arc<RoleCatalog>,
    ) -> Self {
        Self {
            reader,
            writer,
            addresses,
            roles,
        }
    }

    pub async fn list_users(
        &self,
        query: Option<&str>,
        page: OffsetRequest,
    ) -> Result<OffsetPage<UserListRecord>, AdminUserError> {
        let filter = UserQueryFilter {
            email: query
                .filter(|query| !query.is_empty())
                .map(str::to_string),
        };
        self.reader
            .list_users(&filter, page)
            .await
            .map_err(AdminUserError::List)
    }

    pub async fn create_user(&self, command: CreateUserCommand) -> Result<i64, AdminUserError> {
        let CreateUserCommand {
            email,
            password,
            geo,
        } = command;
        let (Some(email), Some(password)) = (
            email.filter(|email| !email.is_empty()),
            password.filter(|password| !password.is_empty()),
        ) else {
            return Err(AdminUserError::MissingCredentials);
        };

        check_user_password(&password).map_err(|err| AdminUserError::Register(err.into()))?;

        let user_info = serde_json::to_value(UserInfo::new(geo, email.clone()))?;
        let user_id = self
            .writer
            .create_user(CreateUserParams {
                email,
                password,
                user_info,
            })
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { .. } => AdminUserError::AlreadyExists,
                other => AdminUserError::Register(other.into()),
            })?;

        counter!(METRIC_USER_MUTATIONS, "operation" => "create").increment(1);
        info!(
            target = "application::admin::users::create_user",
            user_id, "user created"
        );

        Ok(user_id)
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<(), AdminUserError> {
        self.writer
            .delete_user(user_id)
            .await
            .map_err(AdminUserError::Delete)?;

        counter!(METRIC_USER_MUTATIONS, "operation" => "delete").increment(1);
        info!(
            target = "application::admin::users::delete_user",
            user_id, "user deleted"
        );

        Ok(())
    }

    pub async fn reset_password(
        &self,
        user_id: i64,
        password: Option<String>,
    ) -> Result<(), AdminUserError> {
        let password = password.unwrap_or_default();
        check_user_password(&password)
            .map_err(|err| AdminUserError::ResetPassword(err.into()))?;

        self.writer
            .update_password(user_id, &password)
            .await
            .map_err(|err| AdminUserError::ResetPassword(err.into()))?;

        counter!(METRIC_USER_MUTATIONS, "operation" => "reset_password").increment(1);
        info!(
            target = "application::admin::users::reset_password",
            user_id, "password reset"
        );

        Ok(())
    }

    /// Assign `role_text` to a user, or clear the role when it is empty.
    pub async fn update_role(
        &self,
        user_id: Option<i64>,
        role_text: Option<&str>,
    ) -> Result<(), AdminUserError> {
        let user_id = require_user_id(user_id)?;

        match role_text.filter(|role| !role.is_empty()) {
            None => {
                self.writer
                    .clear_role(user_id)
                    .await
                    .map_err(AdminUserError::UpdateRoles)?;
                counter!(METRIC_USER_MUTATIONS, "operation" => "clear_role").increment(1);
                info!(
                    target = "application::admin::users::update_role",
                    user_id, "user role cleared"
                );
            }
            Some(role) => {
                if !self.roles.contains(role) {
                    return Err(AdminUserError::UnknownRole);
                }
                self.writer
                    .upsert_role(user_id, role)
                    .await
                    .map_err(AdminUserError::UpdateRoles)?;
                counter!(METRIC_USER_MUTATIONS, "operation" => "set_role").increment(1);
                info!(
                    target = "application::admin::users::update_role",
                    user_id,
                    role,
                    "user role updated"
                );
            }
        }

        Ok(())
    }

    pub async fn bound_addresses(&self, user_id: i64) -> Result<Vec<AddressRecord>, AdminUserError> {
        self.addresses
            .list_bound_addresses(user_id)
            .await
            .map_err(AdminUserError::BoundAddresses)
    }
}

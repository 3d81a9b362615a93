//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::application::pagination::{OffsetPage, OffsetRequest};
use crate::domain::entities::{AddressRecord, SettingRecord, UserListRecord};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("integrity error: {message}")]
    Integrity { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserQueryFilter {
    /// Case-insensitive substring matched against `user_email`.
    pub email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateUserParams {
    pub email: String,
    pub password: String,
    pub user_info: Value,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn list_users(
        &self,
        filter: &UserQueryFilter,
        page: OffsetRequest,
    ) -> Result<OffsetPage<UserListRecord>, RepoError>;
}

#[async_trait]
pub trait UsersWriteRepo: Send + Sync {
    async fn create_user(&self, params: CreateUserParams) -> Result<i64, RepoError>;

    /// Remove a user together with its address bindings and role row.
    /// Deleting an id that does not exist is not an error.
    async fn delete_user(&self, user_id: i64) -> Result<(), RepoError>;

    async fn update_password(&self, user_id: i64, password: &str) -> Result<(), RepoError>;

    async fn upsert_role(&self, user_id: i64, role_text: &str) -> Result<(), RepoError>;

    async fn clear_role(&self, user_id: i64) -> Result<(), RepoError>;
}

#[async_trait]
pub trait AddressesRepo: Send + Sync {
    /// Addresses bound to `user_id`, newest first.
    async fn list_bound_addresses(&self, user_id: i64) -> Result<Vec<AddressRecord>, RepoError>;
}

#[async_trait]
pub trait SettingsRepo: Send + Sync {
    async fn load_setting(&self, key: &str) -> Result<Option<SettingRecord>, RepoError>;

    /// Replace the blob stored under `key`, bumping its version.
    async fn save_setting(&self, key: &str, value: Value) -> Result<SettingRecord, RepoError>;
}

#[async_trait]
pub trait HealthRepo: Send + Sync {
    /// Round-trip to the store.
    async fn ping(&self) -> Result<(), RepoError>;
}

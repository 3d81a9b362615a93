use serde::{Deserialize, Serialize};

use crate::domain::entities::AddressRecord;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserListQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
    pub query: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CreateUserRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ResetPasswordRequest {
    pub password: Option<String>,
}

/// A user id as sent by clients: either a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum UserIdInput {
    Number(i64),
    Text(String),
}

impl UserIdInput {
    pub fn as_id(&self) -> Option<i64> {
        match self {
            UserIdInput::Number(id) => Some(*id),
            UserIdInput::Text(raw) => raw.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UpdateRolesRequest {
    pub user_id: Option<UserIdInput>,
    pub role_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BoundAddressesResponse {
    pub results: Vec<AddressRecord>,
}

//! Domain entities mirrored from persistent storage.

use serde::Serialize;
use time::OffsetDateTime;

/// One row of the admin user listing: the user, its role (if any) and how
/// many addresses are bound to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserListRecord {
    pub id: i64,
    pub user_email: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub role_text: Option<String>,
    pub address_count: i64,
}

/// A mail address bound to a user, annotated with mailbox activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddressRecord {
    pub id: i64,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub mail_count: i64,
    pub send_count: i64,
}

/// A stored settings blob. `version` increases by one on every save.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingRecord {
    pub key: String,
    pub value: serde_json::Value,
    pub version: i64,
    pub updated_at: OffsetDateTime,
}

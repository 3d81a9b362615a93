//! User-facing settings edited from the admin surface.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::DomainError;

/// Key under which [`UserSettings`] is stored.
pub const USER_SETTINGS_KEY: &str = "user_settings";

pub const DEFAULT_MAX_ADDRESS_COUNT: i64 = 5;

/// Global user settings, persisted as a single JSON blob.
///
/// Unknown fields are kept in `extra` and written back untouched, so newer
/// front-ends can store settings this crate does not interpret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_mail_verify: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_mail_sender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_mail_allow_list: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mail_allow_list: Option<Vec<String>>,
    #[serde(default = "default_max_address_count")]
    pub max_address_count: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_max_address_count() -> i64 {
    DEFAULT_MAX_ADDRESS_COUNT
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            enable: None,
            enable_mail_verify: None,
            verify_mail_sender: None,
            enable_mail_allow_list: None,
            mail_allow_list: None,
            max_address_count: DEFAULT_MAX_ADDRESS_COUNT,
            extra: Map::new(),
        }
    }
}

impl UserSettings {
    /// Build settings from a stored blob. A missing blob yields the defaults.
    pub fn from_stored(value: Option<Value>) -> Result<Self, DomainError> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value).map_err(|err| {
                DomainError::invariant(format!("stored user settings are unreadable: {err}"))
            }),
        }
    }

    pub fn mail_verify_enabled(&self) -> bool {
        self.enable_mail_verify.unwrap_or(false)
    }

    /// The configured verification sender, ignoring blank values.
    pub fn verify_sender(&self) -> Option<&str> {
        self.verify_mail_sender
            .as_deref()
            .map(str::trim)
            .filter(|sender| !sender.is_empty())
    }
}

/// Domain part of an address (`user@example.com` → `example.com`).
///
/// Only the segment between the first and second `@` is taken, so
/// `a@b@example.com` yields `b`.
pub fn address_domain(address: &str) -> Option<&str> {
    address.split('@').nth(1)
}

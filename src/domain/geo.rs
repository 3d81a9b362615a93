//! Request-origin metadata recorded when an account is created.

use serde::Serialize;

/// Coarse location of the client that created an account, as reported by the
/// edge proxy in front of the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoData {
    pub ip: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub timezone: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub as_organization: Option<String>,
}

/// Write-once enrichment stored alongside a user row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub geo_data: GeoData,
    pub user_email: String,
}

impl UserInfo {
    pub fn new(geo_data: GeoData, user_email: impl Into<String>) -> Self {
        Self {
            geo_data,
            user_email: user_email.into(),
        }
    }
}

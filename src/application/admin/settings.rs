use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::kv::KvStore;
use crate::application::repos::{RepoError, SettingsRepo};
use crate::domain::entities::SettingRecord;
use crate::domain::error::DomainError;
use crate::domain::settings::{USER_SETTINGS_KEY, UserSettings, address_domain};

#[derive(Debug, Error)]
pub enum AdminSettingsError {
    #[error("Please enable KV first if you want to enable mail verify")]
    KvRequired,
    #[error("Please provide verifyMailSender")]
    MissingVerifySender,
    #[error("VerifyMailSender({sender}) domain must in {allowed}")]
    SenderDomainNotAllowed { sender: String, allowed: String },
    #[error("Invalid maxAddressCount")]
    InvalidMaxAddressCount,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("user settings could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Clone)]
pub struct AdminSettingsService {
    repo: Arc<dyn SettingsRepo>,
    kv: Option<Arc<dyn KvStore>>,
    domains: Arc<[String]>,
}

impl AdminSettingsService {
    pub fn new(
        repo: Arc<dyn SettingsRepo>,
        kv: Option<Arc<dyn KvStore>>,
        domains: Arc<[String]>,
    ) -> Self {
        Self { repo, kv, domains }
    }

    pub async fn load(&self) -> Result<UserSettings, AdminSettingsError> {
        let record = self.repo.load_setting(USER_SETTINGS_KEY).await?;
        let settings = UserSettings::from_stored(record.map(|record| record.value))?;
        Ok(settings)
    }

    /// Check `settings` against the deployment. The first failing rule wins.
    pub fn validate(&self, settings: &UserSettings) -> Result<(), AdminSettingsError> {
        if settings.mail_verify_enabled() {
            if self.kv.is_none() {
                return Err(AdminSettingsError::KvRequired);
            }
            let sender = settings
                .verify_sender()
                .ok_or(AdminSettingsError::MissingVerifySender)?;
            let allowed = address_domain(sender)
                .is_some_and(|domain| self.domains.iter().any(|known| known == domain));
            if !allowed {
                return Err(AdminSettingsError::SenderDomainNotAllowed {
                    sender: sender.to_string(),
                    allowed: serde_json::to_string_pretty(&self.domains[..])?,
                });
            }
        }

        if settings.max_address_count < 0 {
            return Err(AdminSettingsError::InvalidMaxAddressCount);
        }

        Ok(())
    }

    pub async fn save(&self, settings: UserSettings) -> Result<SettingRecord, AdminSettingsError> {
        self.validate(&settings)?;

        let value = serde_json::to_value(&settings)?;
        let record = self.repo.save_setting(USER_SETTINGS_KEY, value).await?;

        info!(
            target = "application::admin::settings::save",
            key = %record.key,
            version = record.version,
            "user settings saved"
        );

        Ok(record)
    }
}

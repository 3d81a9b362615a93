use std::sync::Arc;

use crate::application::admin::{settings::AdminSettingsService, users::AdminUserService};
use crate::application::repos::HealthRepo;

#[derive(Clone)]
pub struct AdminState {
    pub health: Arc<dyn HealthRepo>,
    pub settings: Arc<AdminSettingsService>,
    pub users: Arc<AdminUserService>,
}

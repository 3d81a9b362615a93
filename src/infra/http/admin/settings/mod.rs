//! User settings admin module.
//!
//! - `handlers`: HTTP handler functions
//! - `errors`: Error handling utilities

mod errors;
mod handlers;

pub(super) use handlers::{admin_user_settings, admin_user_settings_save};

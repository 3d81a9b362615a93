//! User accounts admin module.
//!
//! - `handlers`: HTTP handler functions
//! - `models`: Request and response bodies
//! - `errors`: Error handling utilities

mod errors;
mod handlers;
mod models;

pub(super) use handlers::{
    admin_user_bound_addresses, admin_user_create, admin_user_delete, admin_user_reset_password,
    admin_user_roles_update, admin_users,
};

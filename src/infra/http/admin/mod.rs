mod health;
mod origin;
mod settings;
mod shared;
mod state;
mod users;

pub use state::AdminState;

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use super::middleware::{log_responses, set_request_context};

pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route(
            "/admin/user_settings",
            get(settings::admin_user_settings).post(settings::admin_user_settings_save),
        )
        .route(
            "/admin/users",
            get(users::admin_users).post(users::admin_user_create),
        )
        .route("/admin/users/{user_id}", delete(users::admin_user_delete))
        .route(
            "/admin/users/{user_id}/reset_password",
            post(users::admin_user_reset_password),
        )
        .route(
            "/admin/users/bind_address/{user_id}",
            get(users::admin_user_bound_addresses),
        )
        .route("/admin/user_roles", post(users::admin_user_roles_update))
        .route("/_health/db", get(health::admin_health))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

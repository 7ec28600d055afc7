//! Admin panel surface: dashboard, user management and audit logs, all
//! gated on the admin role by the `AdminUser` extractor.

mod dto;
pub mod handlers;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/admin",
        Router::new()
            .route("/", get(handlers::dashboard))
            .route("/users", get(handlers::list_users))
            .route("/users/:id/role", post(handlers::update_user_role))
            .route("/users/:id", delete(handlers::delete_user))
            .route("/logs", get(handlers::audit_logs)),
    )
}

use axum::{
    extract::{Path, Query, State},
    Form, Json,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::audit::AuditLog;
use crate::auth::extractors::{AdminUser, ClientIp};
use crate::error::AppError;
use crate::state::AppState;
use crate::stats;
use crate::users::repo::{Role, User};

use super::dto::{
    total_pages, AuditLogPage, DashboardView, PageQuery, RoleForm, SuccessResponse, UserListPage,
};

const USERS_PER_PAGE: i64 = 20;
const LOGS_PER_PAGE: i64 = 50;

/// Point-in-time user and trip statistics for the dashboard view.
#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<DashboardView>, AppError> {
    let user_stats = stats::user_stats(&state.db).await?;
    let trip_stats = stats::trip_stats(&state.db).await?;
    Ok(Json(DashboardView {
        user_stats,
        trip_stats,
    }))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<UserListPage>, AppError> {
    let page = query.page.max(1);
    let users = User::list(&state.db, page, USERS_PER_PAGE).await?;
    let total_users = User::count(&state.db).await?;

    Ok(Json(UserListPage {
        users,
        current_page: page,
        total_pages: total_pages(total_users, USERS_PER_PAGE),
        total_users,
    }))
}

#[instrument(skip(state, admin, form), fields(admin_id = %admin.id))]
pub async fn update_user_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ClientIp(ip): ClientIp,
    Path(user_id): Path<Uuid>,
    Form(form): Form<RoleForm>,
) -> Result<Json<SuccessResponse>, AppError> {
    let role: Role = form
        .role
        .parse()
        .map_err(|_| AppError::InvalidInput("Invalid role".into()))?;

    if !User::update_role(&state.db, user_id, role).await? {
        return Err(AppError::NotFound("User"));
    }

    info!(%user_id, %role, "role updated");
    record_audit(
        &state,
        admin.id,
        "update_user_role",
        &format!("Updated user {user_id} role to {role}"),
        &ip,
    )
    .await;

    Ok(Json(SuccessResponse::ok()))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ClientIp(ip): ClientIp,
    Path(user_id): Path<Uuid>,
) -> Result<Json<SuccessResponse>, AppError> {
    if !User::delete(&state.db, user_id).await? {
        return Err(AppError::NotFound("User"));
    }

    info!(%user_id, "user deleted");
    record_audit(
        &state,
        admin.id,
        "delete_user",
        &format!("Deleted user {user_id}"),
        &ip,
    )
    .await;

    Ok(Json(SuccessResponse::ok()))
}

#[instrument(skip(state, admin), fields(admin_id = %admin.id))]
pub async fn audit_logs(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<AuditLogPage>, AppError> {
    let page = query.page.max(1);
    let logs = AuditLog::list(&state.db, page, LOGS_PER_PAGE).await?;
    let total = AuditLog::count(&state.db).await?;

    Ok(Json(AuditLogPage {
        logs,
        current_page: page,
        total_pages: total_pages(total, LOGS_PER_PAGE),
    }))
}

// The mutation has already committed by the time the audit row is written;
// a failed append must not turn a completed action into a client error.
async fn record_audit(state: &AppState, actor: Uuid, action: &str, details: &str, ip: &str) {
    if let Err(e) = AuditLog::append(&state.db, actor, action, details, ip).await {
        error!(error = %e, action, "audit append failed");
    }
}

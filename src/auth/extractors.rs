use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::auth::claims::JwtKeys;
use crate::error::AppError;
use crate::state::AppState;
use crate::users::repo::{Role, User};

/// Resolves the authenticated principal from the bearer token and loads the
/// account row. Rejection redirects to the login page, so a request that
/// fails here never reaches its handler.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(AppError::AuthenticationRequired)?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or(AppError::AuthenticationRequired)?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|e| {
            warn!(error = %e, "token rejected");
            AppError::AuthenticationRequired
        })?;

        let user = User::find_by_id(&state.db, claims.sub)
            .await?
            .ok_or(AppError::AuthenticationRequired)?;

        Ok(CurrentUser(user))
    }
}

/// The authorization half of the admin gate: a resolved principal whose role
/// is `admin`. Anyone else gets a 403 that names nothing about the resource.
pub struct AdminUser(pub User);

pub(crate) fn ensure_admin(user: &User) -> Result<(), AppError> {
    match user.role {
        Role::Admin => Ok(()),
        Role::User => Err(AppError::Forbidden),
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if let Err(e) = ensure_admin(&user) {
            warn!(user_id = %user.id, "non-admin hit admin route");
            return Err(e);
        }
        Ok(AdminUser(user))
    }
}

/// Request origin address for audit entries: forwarded headers first, then
/// the socket peer.
pub struct ClientIp(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_headers = ["x-forwarded-for", "x-real-ip"]
            .iter()
            .find_map(|name| parts.headers.get(*name))
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        let ip = match from_headers {
            Some(ip) => ip,
            None => parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        };

        Ok(ClientIp(ip))
    }
}

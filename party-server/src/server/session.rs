use super::error::ApiError;
use super::state::ServerState;
use crate::admin_auth::unix_now;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

pub const COOKIE_ADMIN_TOKEN_KEY: &str = "admin_token";
pub const HEADER_ADMIN_TOKEN_KEY: &str = "Authorization";
const BEARER_PREFIX: &str = "Bearer ";

/// A request carrying a live admin session. Handlers that take this as an
/// argument are admin-only.
#[derive(Debug)]
pub struct AdminAuth {
    pub token: String,
    pub expires_at: i64,
}

fn extract_token_from_headers(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(HEADER_ADMIN_TOKEN_KEY)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn extract_token_from_cookies(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(COOKIE_ADMIN_TOKEN_KEY)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

fn extract_admin_auth(parts: &Parts, ctx: &ServerState) -> Result<AdminAuth, ApiError> {
    let Some(token) =
        extract_token_from_headers(parts).or_else(|| extract_token_from_cookies(parts))
    else {
        debug!("No admin token in headers nor cookies.");
        return Err(ApiError::Unauthorized("Unauthorized"));
    };

    match ctx.party_store.get_admin_session(&token)? {
        Some(session) if session.is_valid_at(unix_now()) => Ok(AdminAuth {
            token: session.token,
            expires_at: session.expires_at,
        }),
        Some(_) => {
            debug!("Admin token expired");
            Err(ApiError::Unauthorized("Unauthorized"))
        }
        None => {
            debug!("Admin token not found");
            Err(ApiError::Unauthorized("Unauthorized"))
        }
    }
}

impl FromRequestParts<ServerState> for AdminAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        extract_admin_auth(parts, ctx)
    }
}

use super::ServerConfig;
use super::error::{ApiError, ApiResult};
use super::json_body::JsonBody;
use super::metrics::record_login_attempt;
use super::session::{AdminAuth, COOKIE_ADMIN_TOKEN_KEY};
use super::state::{GuardedPartyStore, ServerState};
use crate::admin_auth::{new_admin_session, unix_now, verify_admin_password};

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Deserialize)]
struct LoginBody {
    #[serde(default)]
    password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
    expires_at: i64,
    message: &'static str,
}

fn session_cookie(token: String, expires_at: i64) -> Cookie<'static> {
    let mut builder = Cookie::build((COOKIE_ADMIN_TOKEN_KEY, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    if let Ok(expires) = time::OffsetDateTime::from_unix_timestamp(expires_at) {
        builder = builder.expires(expires);
    }
    builder.build()
}

async fn login(
    State(config): State<ServerConfig>,
    State(store): State<GuardedPartyStore>,
    JsonBody(body): JsonBody<LoginBody>,
) -> ApiResult<Response> {
    let start = Instant::now();
    if !verify_admin_password(&config.admin.secret, &body.password) {
        warn!("Rejected admin login attempt");
        record_login_attempt("failure", start.elapsed());
        return Err(ApiError::Unauthorized("Invalid password"));
    }

    let now = unix_now();
    store.purge_expired_admin_sessions(now)?;
    let session = new_admin_session(now, config.admin.session_ttl);
    store.insert_admin_session(&session)?;
    record_login_attempt("success", start.elapsed());
    info!("Admin logged in, session valid until {}", session.expires_at);

    let cookie = session_cookie(session.token.clone(), session.expires_at);
    let body = LoginSuccessResponse {
        token: session.token,
        expires_at: session.expires_at,
        message: "Login successful",
    };
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(body),
    )
        .into_response())
}

async fn logout(
    admin: AdminAuth,
    State(store): State<GuardedPartyStore>,
) -> ApiResult<Response> {
    store.delete_admin_session(&admin.token)?;
    debug!("Admin session ended");

    let cookie = Cookie::build((COOKIE_ADMIN_TOKEN_KEY, ""))
        .path("/")
        .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1))
        .same_site(SameSite::Lax)
        .build();
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(json!({ "message": "Logged out" })),
    )
        .into_response())
}

async fn verify(admin: AdminAuth) -> impl IntoResponse {
    Json(json!({ "valid": true, "expires_at": admin.expires_at }))
}

pub fn make_auth_routes(state: ServerState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/verify", get(verify))
        .with_state(state)
}

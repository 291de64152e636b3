//! Signup, signin, "who am I", and signout.
//!
//! Session lifecycle: issue a signed token, persist its jti in the session
//! store, hand the token to the browser as the `sid` cookie. Resolution
//! requires both the signature and a live store entry, which is what makes
//! server-side revocation work despite self-contained tokens.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    handlers::client_ip,
    models::user::{NewUser, PublicUser, SigninRequest, SignupRequest, UserId},
    services::session::{read_session, SessionRecord},
    state::AppState,
    utils::{
        cookies::{build_clear_cookie, build_session_cookie},
        jwt::sign_session,
        password::{dummy_password_check, hash_password, verify_password},
    },
};

/// Fixed session lifetime: two hours, matching the cookie Max-Age and the
/// store entry TTL.
pub const SESSION_TTL_SECONDS: u64 = 60 * 60 * 2;

pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(payload) = payload.map_err(|_| AppError::InvalidJson)?;
    payload.validate()?;

    let ip = client_ip(&headers);
    if !state
        .turnstile
        .verify(&payload.turnstile_token, ip.as_deref())
        .await
    {
        return Err(AppError::TurnstileFailed);
    }

    let email = payload.email.trim().to_lowercase();
    let first_name = payload.first_name.trim().to_string();

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::EmailInUse);
    }

    let derived = hash_password(&payload.password)?;
    let user_id = state
        .users
        .insert(&NewUser {
            first_name,
            email,
            password_hash: derived.hash,
            salt: derived.salt,
        })
        .await?;

    let cookie = open_session(&state, user_id, payload.locale.clone(), &headers).await?;
    Ok(with_session_cookie(
        cookie,
        Json(json!({ "ok": true, "userId": user_id.to_string() })),
    ))
}

pub async fn signin(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(payload) = payload.map_err(|_| AppError::InvalidJson)?;
    payload.validate()?;

    let ip = client_ip(&headers);
    if !state
        .turnstile
        .verify(&payload.turnstile_token, ip.as_deref())
        .await
    {
        return Err(AppError::TurnstileFailed);
    }

    let email = payload.email.trim().to_lowercase();
    let Some(user) = state.users.find_by_email(&email).await? else {
        // level the timing between unknown-email and wrong-password paths
        dummy_password_check();
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&payload.password, &user.salt, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let cookie = open_session(&state, user.id, payload.locale.clone(), &headers).await?;
    Ok(with_session_cookie(
        cookie,
        Json(json!({ "ok": true, "userId": user.id, "firstName": user.first_name })),
    ))
}

/// Polled opportunistically by the frontend; any resolution failure is the
/// normal `{user: null}` answer, never an error status.
pub async fn me(State(state): State<AppState>, headers: HeaderMap) -> Json<serde_json::Value> {
    let user = resolve_user(&state, &headers).await;
    Json(json!({ "user": user }))
}

pub async fn signout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(identity) = read_session(
        &headers,
        state.sessions.as_ref(),
        state.config.jwt_secret.as_deref(),
    )
    .await
    {
        if let Err(err) = state.sessions.delete(&identity.jti).await {
            tracing::warn!(error = %err, jti = %identity.jti, "Failed to delete session record");
        }
    }

    let secure = request_is_https(&state.config, &headers);
    with_session_cookie(build_clear_cookie(secure), Json(json!({ "ok": true })))
}

async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Option<PublicUser> {
    let identity = read_session(
        headers,
        state.sessions.as_ref(),
        state.config.jwt_secret.as_deref(),
    )
    .await?;
    let user = state.users.find_by_id(identity.user_id).await.ok().flatten()?;
    Some(PublicUser::from(user))
}

/// Issues a token, persists the session record, and builds the cookie.
async fn open_session(
    state: &AppState,
    user_id: UserId,
    locale: Option<String>,
    headers: &HeaderMap,
) -> AppResult<String> {
    let secret = state
        .config
        .jwt_secret
        .as_deref()
        .ok_or(AppError::ServerMisconfigured("JWT_SECRET"))?;

    let issued = sign_session(user_id, secret, SESSION_TTL_SECONDS, locale)?;
    state
        .sessions
        .put(
            &issued.jti,
            &SessionRecord {
                user_id,
                exp: issued.exp,
            },
        )
        .await?;

    let secure = request_is_https(&state.config, headers);
    Ok(build_session_cookie(
        &issued.token,
        SESSION_TTL_SECONDS,
        secure,
    ))
}

fn with_session_cookie(cookie: String, body: impl IntoResponse) -> Response {
    let mut response = body.into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

/// Behind the edge proxy the original scheme arrives in X-Forwarded-Proto;
/// without it, fall back to the configured public origin.
fn request_is_https(config: &Config, headers: &HeaderMap) -> bool {
    match headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
    {
        Some(proto) => proto.eq_ignore_ascii_case("https"),
        None => config.serves_https(),
    }
}

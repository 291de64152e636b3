//! Public Turnstile endpoints: the widget site key and a standalone
//! verification hook, separate from the inline gates in auth/contact.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{handlers::client_ip, state::AppState};

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
    #[serde(default)]
    pub ip: Option<String>,
}

pub async fn sitekey(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({ "siteKey": state.turnstile.site_key() }))
}

pub async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> Response {
    let payload = match payload {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            let code = if matches!(rejection, JsonRejection::JsonSyntaxError(_)) {
                "invalid_json"
            } else {
                "bad_request"
            };
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "ok": false, "errors": [code] })),
            )
                .into_response();
        }
    };

    let ip = payload.ip.or_else(|| client_ip(&headers));
    match state
        .turnstile
        .verify_detailed(&payload.token, ip.as_deref())
        .await
    {
        Ok(outcome) => Json(json!({ "ok": outcome.success, "errors": outcome.error_codes }))
            .into_response(),
        Err(_) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "ok": false, "errors": ["network"] })),
        )
            .into_response(),
    }
}

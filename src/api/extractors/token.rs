/*
 * Responsibility
 * - リクエストから生の access token を取り出す (検証はしない)
 * - 優先順: auth cookie → `Authorization: Bearer <token>`
 */
use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::api::cookies::AuthCookie;
use crate::state::AppState;

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub fn request_token<'a>(cookie: &AuthCookie, headers: &'a HeaderMap) -> Option<&'a str> {
    cookie.read(headers).or_else(|| bearer_token(headers))
}

/// Raw token if the client sent one. Never rejects; "no token" is `None`.
#[derive(Debug, Clone)]
pub struct RequestToken(pub Option<String>);

impl FromRequestParts<AppState> for RequestToken {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(
            request_token(&state.cookie, &parts.headers).map(str::to_string),
        ))
    }
}

/*
 * Responsibility
 * - login / logout / verify-token / auth/validate handler
 * - Supabase Auth へのパススルーと auth cookie の発行・削除
 * - token 検証は state.auth (TokenValidator) に委譲
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, header},
    response::IntoResponse,
};
use tracing::{info, warn};

use crate::{
    api::{
        dto::auth::{
            HeaderValidationResponse, LoginRequest, LoginResponse, MessageResponse,
            TokenValidationResponse,
        },
        extractors::{RequestToken, bearer_token},
    },
    error::AppError,
    repos::profile_repo,
    services::{auth::VerifiedClaims, supabase::SupabaseError},
    state::AppState,
};

fn login_error(e: SupabaseError) -> AppError {
    warn!(error = %e, "supabase password grant failed");
    match e.status() {
        Some(status) if (400..500).contains(&status) => AppError::Unauthorized("Invalid credentials"),
        _ => AppError::BadGateway,
    }
}

async fn profile_name(state: &AppState, token: &str, user_id: &str) -> Option<String> {
    match profile_repo::get(&state.supabase, token, user_id).await {
        Ok(row) => row.and_then(|r| r.full_name()),
        Err(e) => {
            // Display name is optional; login still succeeds.
            warn!(user_id, error = %e, "profile lookup failed");
            None
        }
    }
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    req.validate()
        .map_err(|m| AppError::bad_request("INVALID_REQUEST", m))?;

    let session = state
        .supabase
        .sign_in_with_password(req.email.trim(), &req.password)
        .await
        .map_err(login_error)?;

    let user = state
        .supabase
        .get_user(&session.access_token)
        .await
        .map_err(|e| {
            warn!(error = %e, "supabase get_user failed after login");
            AppError::Unauthorized("Invalid token")
        })?;

    let person_name = match user.person_name() {
        Some(name) => Some(name.to_string()),
        None => profile_name(&state, &session.access_token, &user.id).await,
    };

    let cookie = state.cookie.issue(&session.access_token)?;
    info!(user_id = %user.id, "login succeeded");

    let body = LoginResponse {
        role: user
            .role()
            .unwrap_or(VerifiedClaims::DEFAULT_ROLE)
            .to_string(),
        email: user.email.clone().unwrap_or_default(),
        user_id: user.id,
        access_token: session.access_token,
        token_type: "bearer",
        person_name,
    };

    Ok(([(header::SET_COOKIE, cookie)], Json(body)))
}

pub async fn logout(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
) -> Result<impl IntoResponse, AppError> {
    if let Some(token) = token.as_deref()
        && let Err(e) = state.supabase.sign_out(token).await
    {
        // Non-critical: the cookie is cleared regardless.
        warn!(error = %e, "supabase sign-out failed");
    }

    let cookie = state.cookie.clear()?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "Logged out successfully",
        }),
    ))
}

/// Never fails: any problem is reported as `valid: false`.
pub async fn verify_token(
    State(state): State<AppState>,
    RequestToken(token): RequestToken,
) -> Json<TokenValidationResponse> {
    let Some(token) = token else {
        return Json(TokenValidationResponse::invalid());
    };

    match state.auth.validate(&token).await {
        Ok(claims) => Json(TokenValidationResponse {
            valid: true,
            email: Some(claims.email_or_empty().to_string()),
            role: Some(claims.role_or_default().to_string()),
            user_id: Some(claims.user_id),
            person_id: claims.person_id,
            person_name: claims.person_name,
        }),
        Err(_) => Json(TokenValidationResponse::invalid()),
    }
}

/// Bearer-header only validation kept for older clients.
pub async fn validate_header(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<HeaderValidationResponse>, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized(
        "Missing or invalid Authorization header",
    ))?;

    let claims = state.auth.validate(token).await?;

    Ok(Json(HeaderValidationResponse {
        valid: true,
        email: claims.email_or_empty().to_string(),
        role: claims.role_or_default().to_string(),
        user_id: claims.user_id,
    }))
}

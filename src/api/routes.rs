/*
 * Responsibility
 * - /api の URL 構造を定義
 * - /health, /login, /logout, /verify-token, /auth/validate は認証なし
 * - /activities 配下は middleware::auth::access で保護する
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware;
use crate::state::AppState;

use crate::api::handlers::{
    activities::{create_activity, get_history, get_tags},
    auth::{login, logout, validate_header, verify_token},
    health::health,
};

pub fn routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .route("/activities/create", post(create_activity))
        .route("/activities/history", get(get_history))
        .route("/activities/tags", get(get_tags));

    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/verify-token", get(verify_token))
        .route("/auth/validate", post(validate_header))
        .merge(middleware::auth::access::apply(protected, state))
}

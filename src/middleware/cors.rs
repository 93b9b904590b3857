//! CORS policy for the browser frontend.
//!
//! Note:
//! - The frontend authenticates with an HTTP-only cookie, so credentials must be
//!   allowed, which in turn requires an explicit origin allowlist.
//! - This middleware should be applied at the Router level (not inside handlers).
//!
//! Policy:
//! - Allowlist non-empty: exact-match origins from Config, WITH credentials.
//! - Allowlist empty, development: permissive (Allow-Origin: *), WITHOUT credentials.
//! - Allowlist empty, production: no cross-origin access at all.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;

/// Apply CORS policy to the given Router.
///
/// IMPORTANT:
/// - Do not combine wildcard origin (`Any`) with `allow_credentials(true)`.
pub fn apply(router: Router, config: &Config) -> Router {
    let allowed: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();

    let cors = if !allowed.is_empty() {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_credentials(true)
    } else if config.app_env.is_production() {
        // Empty allowlist in production: allow none (no CORS headers).
        CorsLayer::new().allow_origin(AllowOrigin::list(Vec::<HeaderValue>::new()))
    } else {
        CorsLayer::new().allow_origin(Any)
    }
    .allow_methods([
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ])
    .allow_headers([
        header::AUTHORIZATION,
        header::CONTENT_TYPE,
        header::ACCEPT,
        HeaderName::from_static("x-request-id"),
    ])
    .max_age(std::time::Duration::from_secs(60 * 10));

    router.layer(cors)
}

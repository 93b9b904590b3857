//! access token（Supabase JWT）検証 → AuthCtx を extensions に入れる
//!
//! - token は auth cookie → `Authorization: Bearer` の順で探す
//! - 検証 (JWKS 署名 + exp/aud/iss) は `TokenValidator` に委譲
//! - 失敗理由はログにだけ残し、クライアントには 401 (鍵取得失敗のみ 503) を返す

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::api::extractors::{AuthCtx, request_token};
use crate::error::AppError;
use crate::services::auth::AuthError;
use crate::state::AppState;

/// 保護したい route 群に認証を掛ける。
///
/// 例：
/// ```ignore
/// let protected = Router::new().route("/activities/tags", get(get_tags));
/// let protected = middleware::auth::access::apply(protected, state.clone());
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    // route_layer: 未登録パスは 401 ではなく 404 のまま
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = request_token(&state.cookie, req.headers())
        .map(str::to_string)
        .ok_or(AuthError::MissingToken)?;

    let claims = match state.auth.validate(&token).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(
                error = %err,
                transient = err.is_transient(),
                path = %req.uri().path(),
                "access token verification failed"
            );
            return Err(err.into());
        }
    };

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::new(claims, token));

    Ok(next.run(req).await)
}

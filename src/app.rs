/*
 * Responsibility
 * - tracing / panic hook 初期化
 * - Config読み込み → 依存生成 (JWKS validator, Supabase client, cookie) → Router 組み立て
 * - Middleware の適用 (security headers / CORS / request id・trace・limit・timeout)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, cookies::AuthCookie};
use crate::config::Config;
use crate::middleware;
use crate::services::{auth::build_token_validator, supabase::SupabaseClient};
use crate::state::AppState;

const SUPABASE_TIMEOUT: Duration = Duration::from_secs(30);

fn init_tracing() {
    // RUST_LOG を優先。未設定ならデフォルト
    // 例: RUST_LOG=info,time2log_auth=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // stderr が見えない起動方法でも panic を tracing に残す
        tracing::error!(?info, "panic");

        // development: fail fast / production: default hook のみでサーバは継続
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("loading configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        jwks_url = %config.jwks_url,
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("binding {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let auth = build_token_validator(config).context("building token validator")?;

    // 起動時に鍵を温めておく。失敗しても最初のリクエストで再取得するので起動は続ける
    if let Err(e) = auth.keys().refresh().await {
        tracing::warn!(error = %e, "initial JWKS fetch failed; will retry on first request");
    }

    let supabase = SupabaseClient::new(
        &config.supabase_url,
        config.supabase_key.clone(),
        SUPABASE_TIMEOUT,
    )
    .context("building supabase client")?;

    let cookie = AuthCookie::new(config.cookie_name.clone(), config.app_env);

    Ok(AppState::new(auth, Arc::new(supabase), cookie))
}

pub(crate) fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api", api::routes(state.clone()))
        .with_state(state);

    let router = middleware::security_headers::apply(router, config.app_env);
    let router = middleware::cors::apply(router, config);
    middleware::http::apply(router)
}

/// Factory: build the JWKS-backed `TokenValidator` from application `Config`.
use std::sync::Arc;

use tracing::{error, info};

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::{
    HttpKeyFetcher, KeyCache, TokenValidator,
    clock::{Clock, SystemClock},
};

pub fn build_token_validator(config: &Config) -> Result<Arc<TokenValidator>, AppError> {
    let fetcher = HttpKeyFetcher::new(config.jwks_url.clone(), config.jwks_fetch_timeout)
        .map_err(|e| {
            error!(error = %e, "failed to build JWKS fetcher");
            AppError::Internal
        })?;
    info!(url = %fetcher.url(), ttl = ?config.jwks_cache_ttl, "JWKS source configured");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let keys = Arc::new(KeyCache::new(
        Arc::new(fetcher),
        clock.clone(),
        config.jwks_cache_ttl,
        config.jwks_fetch_timeout,
    ));

    Ok(Arc::new(TokenValidator::new(
        keys,
        clock,
        config.auth_audience.clone(),
        config.auth_issuer.clone(),
        config.access_token_leeway_seconds,
    )))
}

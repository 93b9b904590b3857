/*
 * Responsibility
 * - 環境変数や設定の読み込み (SUPABASE_URL, JWKS, Cookie, CORS 許可など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::services::auth::KeyCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

const DEFAULT_CORS_ORIGINS: &str = "http://localhost:5173,http://localhost:5174";

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub supabase_url: Url,
    pub supabase_key: String,

    pub jwks_url: Url,
    pub jwks_cache_ttl: Duration,
    pub jwks_fetch_timeout: Duration,

    pub auth_audience: String,
    pub auth_issuer: Option<String>,
    pub access_token_leeway_seconds: u64,

    pub cookie_name: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // supabase_key is a credential
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("supabase_url", &self.supabase_url.as_str())
            .field("jwks_url", &self.jwks_url.as_str())
            .field("jwks_cache_ttl", &self.jwks_cache_ttl)
            .field("jwks_fetch_timeout", &self.jwks_fetch_timeout)
            .field("auth_audience", &self.auth_audience)
            .field("auth_issuer", &self.auth_issuer)
            .field("access_token_leeway_seconds", &self.access_token_leeway_seconds)
            .field("cookie_name", &self.cookie_name)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (process env in production, a map in tests).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = match get("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 8080,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV").as_deref());

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let supabase_url = get("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let supabase_url = Url::parse(supabase_url.trim_end_matches('/'))
            .map_err(|_| ConfigError::Invalid("SUPABASE_URL"))?;

        let supabase_key = get("SUPABASE_KEY")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("SUPABASE_KEY"))?;

        let jwks_url = match get("SUPABASE_JWKS_URL") {
            Some(raw) => Url::parse(&raw).map_err(|_| ConfigError::Invalid("SUPABASE_JWKS_URL"))?,
            None => Url::parse(&format!(
                "{}/auth/v1/.well-known/jwks.json",
                supabase_url.as_str().trim_end_matches('/')
            ))
            .map_err(|_| ConfigError::Invalid("SUPABASE_URL"))?,
        };

        let jwks_cache_ttl = Duration::from_secs(parse_or(
            &get,
            "JWKS_CACHE_TTL_SECONDS",
            KeyCache::DEFAULT_TTL.as_secs(),
        )?);
        let jwks_fetch_timeout = Duration::from_secs(parse_or(
            &get,
            "JWKS_FETCH_TIMEOUT_SECONDS",
            10,
        )?);
        if jwks_fetch_timeout.is_zero() {
            return Err(ConfigError::Invalid("JWKS_FETCH_TIMEOUT_SECONDS"));
        }

        let auth_audience = get("AUTH_AUDIENCE")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "authenticated".to_string());

        let auth_issuer = get("AUTH_ISSUER").filter(|s| !s.trim().is_empty());

        let access_token_leeway_seconds = parse_or(&get, "ACCESS_TOKEN_LEEWAY_SECONDS", 0)?;

        let cookie_name = get("COOKIE_NAME")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "supabase-auth-token".to_string());

        Ok(Self {
            addr,
            app_env,
            cors_allowed_origins,
            supabase_url,
            supabase_key,
            jwks_url,
            jwks_cache_ttl,
            jwks_fetch_timeout,
            auth_audience,
            auth_issuer,
            access_token_leeway_seconds,
            cookie_name,
        })
    }
}

fn parse_or(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

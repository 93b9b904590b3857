//! Config::from_lookup with an in-memory environment.
use std::collections::HashMap;
use std::time::Duration;

use crate::config::{AppEnv, Config, ConfigError};

fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_lookup(|key| env.get(key).cloned())
}

const REQUIRED: [(&str, &str); 2] = [
    ("SUPABASE_URL", "https://project.supabase.co/"),
    ("SUPABASE_KEY", "anon-key"),
];

#[test]
fn defaults_fill_everything_but_supabase() {
    let config = load(&REQUIRED).unwrap();

    assert_eq!(config.addr.port(), 8080);
    assert_eq!(config.app_env, AppEnv::Development);
    assert_eq!(
        config.jwks_url.as_str(),
        "https://project.supabase.co/auth/v1/.well-known/jwks.json"
    );
    assert_eq!(config.jwks_cache_ttl, Duration::from_secs(300));
    assert_eq!(config.jwks_fetch_timeout, Duration::from_secs(10));
    assert_eq!(config.auth_audience, "authenticated");
    assert_eq!(config.auth_issuer, None);
    assert_eq!(config.access_token_leeway_seconds, 0);
    assert_eq!(config.cookie_name, "supabase-auth-token");
    assert_eq!(
        config.cors_allowed_origins,
        vec!["http://localhost:5173", "http://localhost:5174"]
    );
}

#[test]
fn supabase_url_and_key_are_required() {
    assert_eq!(
        load(&[("SUPABASE_KEY", "k")]).unwrap_err(),
        ConfigError::Missing("SUPABASE_URL")
    );
    assert_eq!(
        load(&[("SUPABASE_URL", "https://p.supabase.co"), ("SUPABASE_KEY", "  ")]).unwrap_err(),
        ConfigError::Missing("SUPABASE_KEY")
    );
}

#[test]
fn overrides_are_applied() {
    let mut pairs = REQUIRED.to_vec();
    pairs.extend([
        ("PORT", "9000"),
        ("APP_ENV", "Production"),
        ("SUPABASE_JWKS_URL", "https://keys.example.com/jwks"),
        ("JWKS_CACHE_TTL_SECONDS", "60"),
        ("AUTH_AUDIENCE", "api"),
        ("AUTH_ISSUER", "https://project.supabase.co/auth/v1"),
        ("ACCESS_TOKEN_LEEWAY_SECONDS", "15"),
        ("COOKIE_NAME", "sid"),
        ("CORS_ALLOWED_ORIGINS", "https://app.example.com, ,https://admin.example.com"),
    ]);

    let config = load(&pairs).unwrap();

    assert_eq!(config.addr.port(), 9000);
    assert!(config.app_env.is_production());
    assert_eq!(config.jwks_url.as_str(), "https://keys.example.com/jwks");
    assert_eq!(config.jwks_cache_ttl, Duration::from_secs(60));
    assert_eq!(config.auth_audience, "api");
    assert_eq!(
        config.auth_issuer.as_deref(),
        Some("https://project.supabase.co/auth/v1")
    );
    assert_eq!(config.access_token_leeway_seconds, 15);
    assert_eq!(config.cookie_name, "sid");
    assert_eq!(
        config.cors_allowed_origins,
        vec!["https://app.example.com", "https://admin.example.com"]
    );
}

#[test]
fn invalid_numbers_are_reported_by_key() {
    for (key, value) in [
        ("PORT", "http"),
        ("JWKS_CACHE_TTL_SECONDS", "-1"),
        ("JWKS_FETCH_TIMEOUT_SECONDS", "0"),
        ("ACCESS_TOKEN_LEEWAY_SECONDS", "soon"),
    ] {
        let mut pairs = REQUIRED.to_vec();
        pairs.push((key, value));
        assert_eq!(load(&pairs).unwrap_err(), ConfigError::Invalid(key));
    }
}

#[test]
fn debug_output_hides_the_api_key() {
    let config = load(&REQUIRED).unwrap();

    assert!(!format!("{config:?}").contains("anon-key"));
}

//! HTTP-only auth cookie: issue on login, clear on logout, read on requests.
//!
//! Policy:
//! - Production: `Secure; SameSite=None` (frontend is served from another origin).
//! - Development: `SameSite=Lax`, no `Secure` (plain http on localhost).
use axum::http::{HeaderMap, HeaderValue, header};

use crate::config::AppEnv;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct AuthCookie {
    name: String,
    production: bool,
}

impl AuthCookie {
    /// 7 days
    pub const MAX_AGE_SECONDS: u64 = 60 * 60 * 24 * 7;

    pub fn new(name: impl Into<String>, app_env: AppEnv) -> Self {
        Self {
            name: name.into(),
            production: app_env.is_production(),
        }
    }

    fn attributes(&self, max_age: u64) -> String {
        let same_site = if self.production { "None" } else { "Lax" };
        let secure = if self.production { "; Secure" } else { "" };
        format!("Path=/; Max-Age={max_age}; HttpOnly; SameSite={same_site}{secure}")
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn issue(&self, token: &str) -> Result<HeaderValue, AppError> {
        let value = format!(
            "{}={}; {}",
            self.name,
            token,
            self.attributes(Self::MAX_AGE_SECONDS)
        );
        HeaderValue::from_str(&value).map_err(|_| AppError::Internal)
    }

    /// `Set-Cookie` value that expires the cookie immediately.
    pub fn clear(&self) -> Result<HeaderValue, AppError> {
        let value = format!(
            "{}=; {}; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.name,
            self.attributes(0)
        );
        HeaderValue::from_str(&value).map_err(|_| AppError::Internal)
    }

    /// Auth cookie value from the request's `Cookie` header(s), if non-empty.
    pub fn read<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.name)
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
    }
}

//! Minimal HTTP client for Supabase Auth (GoTrue) and PostgREST.
//!
//! Only the calls the API layer makes are implemented. Table calls forward the
//! caller's access token so row-level security applies.
use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::services::supabase::error::SupabaseError;

/// Session returned by the password grant.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
}

/// `GET /auth/v1/user`
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
    #[serde(default)]
    pub app_metadata: Value,
}

impl SupabaseUser {
    pub fn role(&self) -> Option<&str> {
        self.app_metadata.get("role").and_then(Value::as_str)
    }

    pub fn person_name(&self) -> Option<&str> {
        self.user_metadata
            .get("person_name")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

/// PostgREST select: `GET /rest/v1/{table}?select=..&col=eq.value&limit=n`
#[derive(Debug, Clone)]
pub struct Select<'a> {
    schema: &'a str,
    table: &'a str,
    columns: &'a str,
    filters: Vec<(&'a str, String)>,
    limit: Option<u32>,
}

impl<'a> Select<'a> {
    pub fn new(schema: &'a str, table: &'a str) -> Self {
        Self {
            schema,
            table,
            columns: "*",
            filters: Vec::new(),
            limit: None,
        }
    }

    pub fn columns(mut self, columns: &'a str) -> Self {
        self.columns = columns;
        self
    }

    pub fn eq(mut self, column: &'a str, value: impl std::fmt::Display) -> Self {
        self.filters.push((column, format!("eq.{value}")));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn query(&self) -> Vec<(&str, String)> {
        let mut q = vec![("select", self.columns.to_string())];
        q.extend(self.filters.iter().cloned());
        if let Some(limit) = self.limit {
            q.push(("limit", limit.to_string()));
        }
        q
    }
}

#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    auth_url: String,
    rest_url: String,
    api_key: String,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print the API key
        f.debug_struct("SupabaseClient")
            .field("auth_url", &self.auth_url)
            .field("rest_url", &self.rest_url)
            .finish()
    }
}

impl SupabaseClient {
    pub fn new(base_url: &Url, api_key: impl Into<String>, timeout: Duration) -> Result<Self, SupabaseError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base = base_url.as_str().trim_end_matches('/');

        Ok(Self {
            http,
            auth_url: format!("{base}/auth/v1"),
            rest_url: format!("{base}/rest/v1"),
            api_key: api_key.into(),
        })
    }

    fn request(&self, method: Method, url: &str, token: Option<&str>) -> RequestBuilder {
        let req = self
            .http
            .request(method, url)
            .header("apikey", &self.api_key);
        match token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn expect_success(response: Response) -> Result<Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        error!(status = status.as_u16(), %body, "supabase api error");
        Err(SupabaseError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T, SupabaseError> {
        Self::expect_success(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| SupabaseError::Decode(e.to_string()))
    }

    // ----- Auth -----

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, SupabaseError> {
        let url = format!("{}/token", self.auth_url);
        let response = self
            .request(Method::POST, &url, None)
            .query(&[("grant_type", "password")])
            .json(&PasswordGrant { email, password })
            .send()
            .await?;

        Self::json(response).await
    }

    pub async fn get_user(&self, token: &str) -> Result<SupabaseUser, SupabaseError> {
        let url = format!("{}/user", self.auth_url);
        let response = self.request(Method::GET, &url, Some(token)).send().await?;

        Self::json(response).await
    }

    /// Revokes the session behind `token`.
    pub async fn sign_out(&self, token: &str) -> Result<(), SupabaseError> {
        let url = format!("{}/logout", self.auth_url);
        let response = self.request(Method::POST, &url, Some(token)).send().await?;

        Self::expect_success(response).await.map(|_| ())
    }

    // ----- PostgREST -----

    pub async fn select(
        &self,
        select: &Select<'_>,
        token: Option<&str>,
    ) -> Result<Vec<Value>, SupabaseError> {
        let url = format!("{}/{}", self.rest_url, select.table);
        debug!(table = select.table, schema = select.schema, "supabase select");

        let response = self
            .request(Method::GET, &url, token)
            .header("Accept-Profile", select.schema)
            .query(&select.query())
            .send()
            .await?;

        Self::json(response).await
    }

    /// Insert one row; returns the inserted representation.
    pub async fn insert(
        &self,
        schema: &str,
        table: &str,
        row: &Value,
        token: Option<&str>,
    ) -> Result<Vec<Value>, SupabaseError> {
        let url = format!("{}/{}", self.rest_url, table);
        debug!(table, schema, "supabase insert");

        let response = self
            .request(Method::POST, &url, token)
            .header("Content-Profile", schema)
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        Self::json(response).await
    }
}

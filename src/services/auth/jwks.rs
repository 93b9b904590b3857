//! JWKS model and the shared signing-key cache.
//!
//! Cache policy:
//! - The whole key set is replaced on every refresh; entries are never merged.
//! - A snapshot older than the TTL is not trusted: the next lookup refreshes first.
//! - A `kid` miss forces one refresh, then one more lookup. Never more than one
//!   fetch per lookup.
//! - A failed refresh leaves the previous snapshot in place and is reported.
//! - Concurrent refreshes are serialized; callers that waited on an in-flight
//!   refresh reuse its result instead of fetching again.
use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::services::auth::clock::Clock;
use crate::services::auth::error::KeyCacheError;

/// One published public signing key.
///
/// Only the fields needed to rebuild a verifier are kept; unknown members are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(default)]
    pub kid: Option<String>,
    /// "EC", "RSA" or "OKP".
    pub kty: String,
    #[serde(default)]
    pub alg: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    // EC / OKP
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crv: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    // RSA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

/// JWKS document: `{"keys": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwkSet {
    pub keys: Vec<Jwk>,
}

/// Source of the key set. The HTTP implementation is `HttpKeyFetcher`;
/// tests plug in in-memory fetchers.
#[async_trait]
pub trait KeyFetcher: Send + Sync {
    async fn fetch(&self) -> Result<JwkSet, KeyCacheError>;
}

/// Fetches the key set from the identity provider's JWKS endpoint.
#[derive(Debug, Clone)]
pub struct HttpKeyFetcher {
    client: reqwest::Client,
    url: Url,
}

impl HttpKeyFetcher {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, KeyCacheError> {
        if url.scheme() != "https" {
            warn!(%url, "JWKS URL should use HTTPS");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| KeyCacheError::FetchFailed(format!("failed to build http client: {e}")))?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl KeyFetcher for HttpKeyFetcher {
    async fn fetch(&self) -> Result<JwkSet, KeyCacheError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| KeyCacheError::FetchFailed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeyCacheError::FetchFailed(format!(
                "JWKS endpoint returned status {status}"
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| KeyCacheError::FetchFailed(format!("invalid JWKS document: {e}")))
    }
}

/// An immutable, fully-fetched key set. Every key shares `fetched_at`.
#[derive(Debug, Clone)]
pub struct KeySnapshot {
    keys: HashMap<String, Jwk>,
    fetched_at: DateTime<Utc>,
    generation: u64,
}

impl KeySnapshot {
    pub fn get(&self, kid: &str) -> Option<&Jwk> {
        self.keys.get(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Monotonic refresh counter; bumps on every successful replace.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_stale(&self, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        now - self.fetched_at > ttl
    }
}

/// Process-wide signing-key cache. Construct once, share behind `Arc`.
pub struct KeyCache {
    fetcher: Arc<dyn KeyFetcher>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
    fetch_timeout: Duration,
    snapshot: RwLock<Option<Arc<KeySnapshot>>>,
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for KeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCache")
            .field("ttl", &self.ttl)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}

impl KeyCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

    pub fn new(
        fetcher: Arc<dyn KeyFetcher>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);

        Self {
            fetcher,
            clock,
            ttl,
            fetch_timeout,
            snapshot: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Current snapshot, stale or not. `None` until the first successful refresh.
    pub async fn snapshot(&self) -> Option<Arc<KeySnapshot>> {
        self.snapshot.read().await.clone()
    }

    /// Resolve `kid` to a key.
    ///
    /// Fresh hit: no I/O. Otherwise (empty, stale, or unknown `kid`): one refresh
    /// and a single retry against the refreshed set.
    pub async fn get_key(&self, kid: &str) -> Result<Jwk, KeyCacheError> {
        let observed = self.snapshot().await;

        if let Some(snap) = &observed
            && !snap.is_stale(self.clock.now(), self.ttl)
            && let Some(jwk) = snap.get(kid)
        {
            return Ok(jwk.clone());
        }

        let seen = observed.as_ref().map(|s| s.generation());
        let refreshed = self.refresh_after(seen).await?;

        refreshed.get(kid).cloned().ok_or_else(|| {
            warn!(kid, "key id not found in JWKS after refresh");
            KeyCacheError::KeyNotFound(kid.to_string())
        })
    }

    /// Fetch the full key set and replace the snapshot.
    pub async fn refresh(&self) -> Result<Arc<KeySnapshot>, KeyCacheError> {
        let _guard = self.refresh_lock.lock().await;
        self.fetch_and_replace().await
    }

    /// Refresh unless another caller already replaced the snapshot we saw
    /// while we were waiting for the lock.
    async fn refresh_after(&self, seen: Option<u64>) -> Result<Arc<KeySnapshot>, KeyCacheError> {
        let _guard = self.refresh_lock.lock().await;

        if let Some(current) = self.snapshot().await
            && Some(current.generation()) != seen
        {
            debug!(
                generation = current.generation(),
                "JWKS refreshed by a concurrent caller; reusing"
            );
            return Ok(current);
        }

        self.fetch_and_replace().await
    }

    // Caller must hold `refresh_lock`.
    async fn fetch_and_replace(&self) -> Result<Arc<KeySnapshot>, KeyCacheError> {
        let fetched = match tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch()).await {
            Ok(Ok(set)) => set,
            Ok(Err(e)) => {
                error!(error = %e, "JWKS refresh failed; keeping previous key set");
                return Err(e);
            }
            Err(_) => {
                let e = KeyCacheError::FetchFailed(format!(
                    "timed out after {}ms",
                    self.fetch_timeout.as_millis()
                ));
                error!(error = %e, "JWKS refresh failed; keeping previous key set");
                return Err(e);
            }
        };

        let keys: HashMap<String, Jwk> = fetched
            .keys
            .into_iter()
            .filter_map(|jwk| jwk.kid.clone().map(|kid| (kid, jwk)))
            .collect();

        if keys.is_empty() {
            let e = KeyCacheError::FetchFailed("JWKS contains no usable keys".to_string());
            error!(error = %e, "JWKS refresh failed; keeping previous key set");
            return Err(e);
        }

        let mut slot = self.snapshot.write().await;
        let generation = slot.as_ref().map_or(1, |s| s.generation() + 1);
        let snapshot = Arc::new(KeySnapshot {
            keys,
            fetched_at: self.clock.now(),
            generation,
        });
        *slot = Some(snapshot.clone());

        info!(
            keys = snapshot.len(),
            generation,
            fetched_at = %snapshot.fetched_at(),
            "JWKS cache updated"
        );

        Ok(snapshot)
    }
}

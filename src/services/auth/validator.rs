//! Bearer token validation against the cached JWKS.
//!
//! Fixed pipeline, first failure wins:
//! 1. shape + header decode (no I/O)
//! 2. `kid` / `alg` from the unverified header
//! 3. key lookup (may refresh the key set once)
//! 4. signature, with the header `alg` pinned to the key's family
//! 5. claims: `exp`, `nbf`, `aud`, `iss`, `sub`
//! 6. `VerifiedClaims`
use std::sync::Arc;

use base64::{
    Engine as _, alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::services::auth::clock::Clock;
use crate::services::auth::error::AuthError;
use crate::services::auth::jwks::{Jwk, KeyCache};

/// `aud` may be a single string or an array of strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn into_vec(self) -> Vec<String> {
        match self {
            Audience::One(s) => vec![s],
            Audience::Many(v) => v,
        }
    }
}

/// Raw Supabase access-token claims. Everything optional here; required-ness
/// is decided in `check_claims` so each gap gets its own failure kind.
#[derive(Debug, Clone, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    aud: Option<Audience>,
    #[serde(default)]
    iss: Option<String>,
    #[serde(default)]
    exp: Option<i64>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    nbf: Option<i64>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    person_id: Option<String>,
    #[serde(default)]
    person_name: Option<String>,
    #[serde(default)]
    user_metadata: Option<serde_json::Value>,
}

/// Identity carried by a token that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    /// `sub`
    pub user_id: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub audience: Vec<String>,
    pub issuer: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub session_id: Option<String>,
    pub person_id: Option<String>,
    pub person_name: Option<String>,
}

impl VerifiedClaims {
    pub const DEFAULT_ROLE: &'static str = "authenticated";

    /// `role`, or "authenticated" when the token carries none.
    pub fn role_or_default(&self) -> &str {
        self.role.as_deref().unwrap_or(Self::DEFAULT_ROLE)
    }

    pub fn email_or_empty(&self) -> &str {
        self.email.as_deref().unwrap_or_default()
    }
}

pub struct TokenValidator {
    keys: Arc<KeyCache>,
    clock: Arc<dyn Clock>,
    audience: String,
    issuer: Option<String>,
    leeway_seconds: i64,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenValidator {
    pub fn new(
        keys: Arc<KeyCache>,
        clock: Arc<dyn Clock>,
        audience: impl Into<String>,
        issuer: Option<String>,
        leeway_seconds: u64,
    ) -> Self {
        Self {
            keys,
            clock,
            audience: audience.into(),
            issuer,
            leeway_seconds: i64::try_from(leeway_seconds).unwrap_or(i64::MAX),
        }
    }

    pub fn keys(&self) -> &KeyCache {
        &self.keys
    }

    /// Turn a raw bearer token into verified claims or a failure kind.
    pub async fn validate(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        match self.run(token).await {
            Ok(claims) => {
                debug!(user_id = %claims.user_id, "access token verified");
                Ok(claims)
            }
            Err(err) => {
                warn!(reason = %err, "access token rejected");
                Err(err)
            }
        }
    }

    async fn run(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        let header = decode_unverified_header(token)?;

        let kid = header.kid.ok_or(AuthError::UnknownSigningKey)?;
        let jwk = self.keys.get_key(&kid).await?;

        let key = decoding_key_for(&jwk, header.alg).inspect_err(|_| {
            warn!(kid = %kid, alg = ?header.alg, kty = %jwk.kty, "token algorithm does not fit signing key");
        })?;
        let claims = verify_signature(token, &key, header.alg)?;

        self.check_claims(claims)
    }

    fn check_claims(&self, claims: TokenClaims) -> Result<VerifiedClaims, AuthError> {
        let now = self.clock.now().timestamp();

        let exp = claims.exp.ok_or(AuthError::InvalidClaims("exp"))?;
        if now.saturating_sub(self.leeway_seconds) >= exp {
            return Err(AuthError::TokenExpired);
        }
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or(AuthError::InvalidClaims("exp"))?;

        if let Some(nbf) = claims.nbf
            && nbf > now.saturating_add(self.leeway_seconds)
        {
            return Err(AuthError::InvalidClaims("nbf"));
        }

        let audience = claims.aud.map(Audience::into_vec).unwrap_or_default();
        if !audience.iter().any(|aud| *aud == self.audience) {
            return Err(AuthError::AudienceMismatch);
        }

        if let Some(expected) = &self.issuer
            && claims.iss.as_deref() != Some(expected.as_str())
        {
            return Err(AuthError::IssuerMismatch);
        }

        let user_id = claims
            .sub
            .filter(|s| !s.trim().is_empty())
            .ok_or(AuthError::InvalidClaims("sub"))?;

        // Custom access-token hook puts person_name at the top level; older
        // tokens only have it in user_metadata.
        let person_name = claims.person_name.or_else(|| {
            claims
                .user_metadata
                .as_ref()
                .and_then(|m| m.get("person_name"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        });

        Ok(VerifiedClaims {
            user_id,
            email: claims.email,
            role: claims.role,
            audience,
            issuer: claims.iss,
            issued_at: claims.iat.and_then(|iat| DateTime::from_timestamp(iat, 0)),
            expires_at,
            session_id: claims.session_id,
            person_id: claims.person_id,
            person_name,
        })
    }
}

/// JWT segments are unpadded base64url; tolerate stray padding.
const SEGMENT_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

fn decode_unverified_header(token: &str) -> Result<jsonwebtoken::Header, AuthError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3
        || segments
            .iter()
            .any(|s| s.is_empty() || SEGMENT_ENGINE.decode(s).is_err())
    {
        return Err(AuthError::MalformedToken);
    }

    jsonwebtoken::decode_header(token).map_err(|_| AuthError::MalformedToken)
}

/// Build a verifier for `jwk`, refusing any `alg` outside the key's family.
fn decoding_key_for(jwk: &Jwk, alg: Algorithm) -> Result<DecodingKey, AuthError> {
    if let Some(published) = jwk.alg.as_deref()
        && published.parse::<Algorithm>().ok() != Some(alg)
    {
        return Err(AuthError::InvalidSignature);
    }

    let key = match (jwk.kty.as_str(), alg) {
        ("EC", Algorithm::ES256 | Algorithm::ES384) => {
            let curve = if alg == Algorithm::ES256 { "P-256" } else { "P-384" };
            if jwk.crv.as_deref() != Some(curve) {
                return Err(AuthError::InvalidSignature);
            }
            let (Some(x), Some(y)) = (jwk.x.as_deref(), jwk.y.as_deref()) else {
                return Err(AuthError::InvalidSignature);
            };
            DecodingKey::from_ec_components(x, y)
        }
        (
            "RSA",
            Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512,
        ) => {
            let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
                return Err(AuthError::InvalidSignature);
            };
            DecodingKey::from_rsa_components(n, e)
        }
        ("OKP", Algorithm::EdDSA) => {
            if jwk.crv.as_deref() != Some("Ed25519") {
                return Err(AuthError::InvalidSignature);
            }
            let Some(x) = jwk.x.as_deref() else {
                return Err(AuthError::InvalidSignature);
            };
            DecodingKey::from_ed_components(x)
        }
        _ => return Err(AuthError::InvalidSignature),
    };

    key.map_err(|e| {
        warn!(error = %e, kid = ?jwk.kid, "unusable key material in JWKS");
        AuthError::InvalidSignature
    })
}

/// Signature only. Time/audience checks are done by `check_claims` against
/// the injected clock, so the registered-claim checks are switched off here.
fn verify_signature(
    token: &str,
    key: &DecodingKey,
    alg: Algorithm,
) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(alg);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    jsonwebtoken::decode::<TokenClaims>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::Json(_) | ErrorKind::Utf8(_) => AuthError::MalformedToken,
            _ => AuthError::InvalidSignature,
        })
}

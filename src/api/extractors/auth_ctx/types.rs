/*
 * Responsibility
 * - Handler から見える「認証済みコンテキスト」の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT / JWKS の検証ロジックは services::auth の責務
 * - `token` は Supabase への RLS パススルー用。Debug には出さない
 */
use crate::services::auth::VerifiedClaims;

/// 認証済みのリクエストに付与されるコンテキスト
#[derive(Clone)]
pub struct AuthCtx {
    pub claims: VerifiedClaims,
    pub token: String,
}

impl AuthCtx {
    pub fn new(claims: VerifiedClaims, token: impl Into<String>) -> Self {
        Self {
            claims,
            token: token.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.claims.user_id
    }
}

impl std::fmt::Debug for AuthCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthCtx")
            .field("user_id", &self.claims.user_id)
            .field("role", &self.claims.role)
            .finish()
    }
}

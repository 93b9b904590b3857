/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - auth: TokenValidator (JWKS キャッシュを内包), supabase: SupabaseClient, cookie: AuthCookie
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::api::cookies::AuthCookie;
use crate::services::{auth::TokenValidator, supabase::SupabaseClient};

#[derive(Clone, Debug)]
pub struct AppState {
    pub auth: Arc<TokenValidator>,
    pub supabase: Arc<SupabaseClient>,
    pub cookie: Arc<AuthCookie>,
}

impl AppState {
    pub fn new(auth: Arc<TokenValidator>, supabase: Arc<SupabaseClient>, cookie: AuthCookie) -> Self {
        Self {
            auth,
            supabase,
            cookie: Arc::new(cookie),
        }
    }
}

/*
 * Responsibility
 * - repo が上位に伝える意味の定義
 */
use thiserror::Error;

use crate::services::supabase::SupabaseError;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("upstream error")]
    Upstream(#[from] SupabaseError),
}

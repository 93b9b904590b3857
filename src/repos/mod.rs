/*
 * Responsibility
 * - Supabase (PostgREST) 経由のデータアクセス
 * - すべて `app` スキーマ、呼び出し元の access token をそのまま渡す (RLS)
 */
pub mod activity_repo;
pub mod error;
pub mod profile_repo;

pub const APP_SCHEMA: &str = "app";

/*
 * Responsibility
 * - handler が受け取る認証関連の extractor をまとめて公開する
 */
pub mod auth_ctx;
pub mod token;

pub use auth_ctx::{AuthCtx, AuthCtxExtractor};
pub use token::{RequestToken, bearer_token, request_token};

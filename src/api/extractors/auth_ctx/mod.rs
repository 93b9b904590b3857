/*!
 * 認証済みリクエストのコンテキスト
 *
 * - types: AuthCtx (検証済み claims + RLS 用の生 token)
 * - extractor: AuthCtxExtractor (middleware::auth::access が入れた AuthCtx を取り出す)
 */

mod extractor;
mod types;

pub use extractor::AuthCtxExtractor;
pub use types::AuthCtx;

//! Test suite.
//!
//! - `test_helpers`: fixed signing keys, in-memory `KeyFetcher`, token minting
//! - `jwks_cache_tests`: TTL, refresh on miss, failure retention, single flight
//! - `validator_tests`: validation pipeline and failure kinds
//! - `http_fetcher_tests`: JWKS endpoint over HTTP (wiremock)
//! - `config_tests`, `cookie_tests`: configuration and cookie handling
//! - `router_tests`: the assembled Router against a mock Supabase (wiremock)

pub mod test_helpers;

mod config_tests;
mod http_fetcher_tests;

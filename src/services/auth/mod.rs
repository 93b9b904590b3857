pub mod clock;
pub mod error;
pub mod factory;
pub mod jwks;
pub mod validator;

pub use error::AuthError;
pub use factory::build_token_validator;
pub use jwks::{HttpKeyFetcher, KeyCache};
pub use validator::{TokenValidator, VerifiedClaims};

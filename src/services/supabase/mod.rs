pub mod client;
pub mod error;

pub use client::{Select, SupabaseClient};
pub use error::SupabaseError;

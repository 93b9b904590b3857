use thiserror::Error;

/// Supabase transport / upstream errors.
///
/// Kept apart from `AppError` so callers choose the status: a rejected login is
/// a 401, a failing table read is a 502.
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("supabase request failed: {0}")]
    Transport(String),
    #[error("supabase returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected supabase response: {0}")]
    Decode(String),
}

impl SupabaseError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SupabaseError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/*
 * Responsibility
 * - app.profiles から表示名 (person) を引く
 */
use serde::Deserialize;

use crate::repos::{APP_SCHEMA, error::RepoError};
use crate::services::supabase::{Select, SupabaseClient, SupabaseError};

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl ProfileRow {
    /// "first last", or `None` when both are blank.
    pub fn full_name(&self) -> Option<String> {
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        let full = full.trim();
        (!full.is_empty()).then(|| full.to_string())
    }
}

pub async fn get(
    db: &SupabaseClient,
    token: &str,
    user_id: &str,
) -> Result<Option<ProfileRow>, RepoError> {
    let rows = db
        .select(
            &Select::new(APP_SCHEMA, "profiles")
                .columns("first_name,last_name")
                .eq("id", user_id)
                .limit(1),
            Some(token),
        )
        .await?;

    let row = rows
        .into_iter()
        .next()
        .map(serde_json::from_value::<ProfileRow>)
        .transpose()
        .map_err(|e| SupabaseError::Decode(e.to_string()))?;

    Ok(row)
}

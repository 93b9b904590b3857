/*
 * Responsibility
 * - app.pre_defined_activities / app.activities_assignments 向け操作
 * - 行はスキーマに依存しないよう JSON のまま返す
 */
use serde::Serialize;
use serde_json::Value;

use crate::repos::{APP_SCHEMA, error::RepoError};
use crate::services::supabase::{Select, SupabaseClient, SupabaseError};

const PREDEFINED: &str = "pre_defined_activities";
const ASSIGNMENTS: &str = "activities_assignments";

#[derive(Debug, Serialize)]
pub struct NewAssignment<'a> {
    pub user_id: &'a str,
    pub activity_id: &'a Value,
    pub notes: Option<&'a str>,
    pub start_time: Option<&'a str>,
    pub end_time: Option<&'a str>,
}

pub async fn predefined_exists(
    db: &SupabaseClient,
    token: &str,
    activity_id: &str,
) -> Result<bool, RepoError> {
    let rows = db
        .select(
            &Select::new(APP_SCHEMA, PREDEFINED).eq("id", activity_id).limit(1),
            Some(token),
        )
        .await?;

    Ok(!rows.is_empty())
}

pub async fn list_predefined(db: &SupabaseClient, token: &str) -> Result<Vec<Value>, RepoError> {
    let rows = db
        .select(&Select::new(APP_SCHEMA, PREDEFINED), Some(token))
        .await?;

    Ok(rows)
}

pub async fn create_assignment(
    db: &SupabaseClient,
    token: &str,
    assignment: &NewAssignment<'_>,
) -> Result<(), RepoError> {
    let row = serde_json::to_value(assignment)
        .map_err(|e| SupabaseError::Decode(e.to_string()))?;
    db.insert(APP_SCHEMA, ASSIGNMENTS, &row, Some(token)).await?;

    Ok(())
}

pub async fn list_assignments(
    db: &SupabaseClient,
    token: &str,
    user_id: &str,
) -> Result<Vec<Value>, RepoError> {
    let rows = db
        .select(
            &Select::new(APP_SCHEMA, ASSIGNMENTS).eq("user_id", user_id),
            Some(token),
        )
        .await?;

    Ok(rows)
}

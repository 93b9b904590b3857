/*
 * Responsibility
 * - activities の request/response DTO
 * - activity.id は数値/文字列どちらも受け付ける (PostgREST の eq フィルタ用に文字列化)
 */
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
pub struct ActivityRef {
    #[serde(default)]
    pub id: Value,
}

#[derive(Debug, Deserialize)]
pub struct CreateActivityRequest {
    #[serde(default)]
    pub activity: Option<ActivityRef>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

impl CreateActivityRequest {
    /// Raw `activity.id` plus its filter form, or `None` when missing/blank.
    pub fn activity_id(&self) -> Option<(&Value, String)> {
        let id = &self.activity.as_ref()?.id;
        let filter = match id {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        Some((id, filter))
    }
}

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub data: Vec<Value>,
}

/*
 * Responsibility
 * - /activities 系 handler (認証必須: middleware::auth::access を通す)
 * - 呼び出し元の token を repo に渡し、Supabase 側の RLS に任せる
 */
use axum::{Json, extract::State};
use serde_json::Value;

use crate::{
    api::{
        dto::{
            activities::{CreateActivityRequest, TagsResponse},
            auth::MessageResponse,
        },
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    repos::activity_repo::{self, NewAssignment},
    state::AppState,
};

pub async fn create_activity(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    Json(req): Json<CreateActivityRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (activity_id, filter) = req
        .activity_id()
        .ok_or_else(|| AppError::bad_request("MISSING_ACTIVITY_ID", "Missing activity id"))?;

    if !activity_repo::predefined_exists(&state.supabase, &ctx.token, &filter).await? {
        return Err(AppError::bad_request(
            "INVALID_ACTIVITY_ID",
            "Invalid activity id",
        ));
    }

    let assignment = NewAssignment {
        user_id: ctx.user_id(),
        activity_id,
        notes: req.notes.as_deref(),
        start_time: req.start_time.as_deref(),
        end_time: req.end_time.as_deref(),
    };
    activity_repo::create_assignment(&state.supabase, &ctx.token, &assignment).await?;

    Ok(Json(MessageResponse {
        message: "Activity created successfully",
    }))
}

pub async fn get_history(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<Vec<Value>>, AppError> {
    let rows = activity_repo::list_assignments(&state.supabase, &ctx.token, ctx.user_id()).await?;
    if rows.is_empty() {
        return Err(AppError::bad_request("NO_ACTIVITIES", "No activities found"));
    }

    Ok(Json(rows))
}

pub async fn get_tags(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<TagsResponse>, AppError> {
    let rows = activity_repo::list_predefined(&state.supabase, &ctx.token).await?;
    if rows.is_empty() {
        return Err(AppError::bad_request("NO_TAGS", "No tags found"));
    }

    Ok(Json(TagsResponse { data: rows }))
}

use crate::error::{AppError, AppResult};
use crate::models::FeedbackModel;
use crate::response::ApiResponse;
use crate::services::feedback::{FeedbackService, FeedbackSort};
use axum::{extract::Query, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FeedbackRequest {
    /// Display name
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Contact email
    #[validate(email)]
    pub email: String,
    /// Feedback category (suggestion, complaint, appreciation, ...)
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    /// Rating, 1 to 5
    pub rating: i32,
    /// Feedback text
    #[validate(length(min = 1))]
    pub message: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct CommunityQuery {
    /// Category filter; omit or "all" for every category
    pub category: Option<String>,
    /// Only feedback rated at least this
    pub min_rating: Option<i32>,
    /// newest (default), oldest, highest, lowest
    pub sort: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 200, description = "Feedback recorded", body = FeedbackModel),
        (status = 400, description = "Validation error", body = AppError),
    ),
    tag = "feedback"
)]
pub async fn create_feedback(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<FeedbackRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;

    let service = FeedbackService::new(db);
    let saved = service
        .create(
            &payload.name,
            &payload.email,
            &payload.category,
            payload.rating,
            &payload.message,
        )
        .await?;

    Ok(ApiResponse::with_message(
        saved,
        "Thank you for your feedback".to_string(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/feedback/community",
    params(CommunityQuery),
    responses(
        (status = 200, description = "Community feedback listing", body = Vec<FeedbackModel>),
    ),
    tag = "feedback"
)]
pub async fn community_feedback(
    Extension(db): Extension<DatabaseConnection>,
    Query(query): Query<CommunityQuery>,
) -> AppResult<impl IntoResponse> {
    let sort = FeedbackSort::parse(query.sort.as_deref().unwrap_or(""));

    let service = FeedbackService::new(db);
    let rows = service
        .list(query.category.as_deref(), query.min_rating, sort)
        .await?;

    Ok(ApiResponse::ok(rows))
}

use crate::error::{AppError, AppResult};
use crate::middleware::auth::require_admin;
use crate::middleware::AuthUser;
use crate::models::ComplaintModel;
use crate::response::{ApiResponse, PaginatedResponse};
use crate::services::complaint::ComplaintService;
use crate::services::dashboard::{self, DashboardStats};
use crate::services::export;
use crate::services::geo::{self, DistrictHeatmap};
use crate::services::upload::{UploadConfig, UploadKind, UploadService};
use axum::{
    extract::{Multipart, Path, Query},
    http::header,
    response::IntoResponse,
    Extension,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ComplaintListQuery {
    /// Search box text; matches phone, department, pincode, district,
    /// village and complaint text
    pub q: Option<String>,
    /// Page number
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/complaints",
    security(("jwt_token" = [])),
    params(ComplaintListQuery),
    responses(
        (status = 200, description = "Complaints, filtered and paginated", body = PaginatedResponse<ComplaintModel>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn list_complaints(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<ComplaintListQuery>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(20).min(100);

    let service = ComplaintService::new(db);
    let (rows, total) = service.search(params.q.as_deref(), page, per_page).await?;

    Ok(ApiResponse::ok(PaginatedResponse::new(
        rows, total, page, per_page,
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{phone}/complaints",
    security(("jwt_token" = [])),
    params(("phone" = String, Path, description = "Account phone number")),
    responses(
        (status = 200, description = "All complaints filed by one account", body = Vec<ComplaintModel>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn user_complaints(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(phone): Path<String>,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let service = ComplaintService::new(db);
    let rows = service.list_for_user(&phone).await?;

    Ok(ApiResponse::ok(rows))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/complaints/{id}/status",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Status updated", body = ComplaintModel),
        (status = 400, description = "Unknown status, or resolving without proof", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Complaint not found", body = AppError),
    ),
    tag = "admin"
)]
pub async fn update_complaint_status(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<UploadConfig>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    // Multipart form: a "status" text field plus an optional
    // "admin_proof" file (mandatory when resolving, enforced below).
    let mut status = None;
    let mut admin_proof = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form: {}", e)))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("status") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read field: {}", e)))?;
                status = Some(value);
            }
            Some("admin_proof") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file data: {}", e)))?;
                if !data.is_empty() {
                    let url = UploadService::save_file(
                        &config,
                        &data,
                        &content_type,
                        UploadKind::Evidence,
                        "admin_proofs",
                    )
                    .await?;
                    admin_proof = Some(url);
                }
            }
            _ => {}
        }
    }

    let status = status.ok_or_else(|| AppError::Validation("Missing status field".to_string()))?;

    let service = ComplaintService::new(db);
    let updated = service.update_status(id, &status, admin_proof).await?;

    Ok(ApiResponse::with_message(
        updated,
        "Status updated successfully".to_string(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/stats",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Dashboard aggregates", body = DashboardStats),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn get_stats(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let service = ComplaintService::new(db);
    let rows = service.list_all().await?;
    let stats = dashboard::compute_stats(&rows, chrono::Utc::now().naive_utc());

    Ok(ApiResponse::ok(stats))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/heatmap",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Per-district complaint counts, boundary-dataset spellings", body = Vec<DistrictHeatmap>),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn get_heatmap(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let service = ComplaintService::new(db);
    let rows = service.list_all().await?;

    Ok(ApiResponse::ok(geo::district_heatmap(&rows)))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/export/complaints.csv",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Every complaint as CSV", content_type = "text/csv"),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "admin"
)]
pub async fn export_complaints_csv(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    require_admin(&db, &auth_user).await?;

    let service = ComplaintService::new(db);
    let rows = service.list_all().await?;
    let body = export::complaints_csv(&rows);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"complaints.csv\"",
            ),
        ],
        body,
    ))
}

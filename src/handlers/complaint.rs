use crate::error::{AppError, AppResult};
use crate::middleware::auth::current_user;
use crate::middleware::AuthUser;
use crate::models::ComplaintModel;
use crate::response::ApiResponse;
use crate::services::complaint::{ComplaintService, NewComplaint};
use crate::services::upload::{UploadConfig, UploadKind, UploadService};
use crate::utils::is_digits;
use axum::{
    extract::{Multipart, Path},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Text fields of the complaint form, shared by create (multipart) and
/// edit (JSON).
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ComplaintForm {
    /// Complainant name
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Contact number (10 digits)
    pub phone: String,
    /// District
    #[validate(length(min = 1, max = 50))]
    pub district: String,
    /// Block
    #[validate(length(min = 1, max = 50))]
    pub block: String,
    /// Gram panchayat
    #[validate(length(min = 1, max = 50))]
    pub gp: String,
    /// Village
    #[validate(length(min = 1, max = 50))]
    pub village: String,
    /// Nearby landmark
    #[validate(length(min = 1, max = 200))]
    pub landmark: String,
    /// Pincode (6 digits)
    pub pincode: String,
    /// Department the complaint concerns
    #[validate(length(min = 1, max = 100))]
    pub department: String,
    /// Complaint text
    #[validate(length(min = 1))]
    pub complaint: String,
}

impl ComplaintForm {
    fn check(&self) -> AppResult<()> {
        self.validate()
            .map_err(|e| AppError::Validation(format!("Validation error: {e}")))?;
        if !is_digits(&self.phone, 10) {
            return Err(AppError::Validation(
                "Phone number must be exactly 10 digits".to_string(),
            ));
        }
        if !is_digits(&self.pincode, 6) {
            return Err(AppError::Validation(
                "Pincode must be exactly 6 digits".to_string(),
            ));
        }
        Ok(())
    }

    fn into_new_complaint(self, proof: Option<String>, voice_proof: Option<String>) -> NewComplaint {
        NewComplaint {
            name: self.name,
            phone: self.phone,
            district: self.district,
            block: self.block,
            gp: self.gp,
            village: self.village,
            landmark: self.landmark,
            pincode: self.pincode,
            department: self.department,
            complaint: self.complaint,
            proof,
            voice_proof,
        }
    }

    fn set_field(&mut self, name: &str, value: String) -> bool {
        match name {
            "name" => self.name = value,
            "phone" => self.phone = value,
            "district" => self.district = value,
            "block" => self.block = value,
            "gp" => self.gp = value,
            "village" => self.village = value,
            "landmark" => self.landmark = value,
            "pincode" => self.pincode = value,
            "department" => self.department = value,
            "complaint" => self.complaint = value,
            _ => return false,
        }
        true
    }
}

/// Drain a complaint multipart form: known text fields into the form
/// struct, the optional `proof` and `voice_complaint` files onto disk.
async fn read_complaint_multipart(
    config: &UploadConfig,
    multipart: &mut Multipart,
) -> AppResult<(ComplaintForm, Option<String>, Option<String>)> {
    let mut form = ComplaintForm::default();
    let mut proof = None;
    let mut voice_proof = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form: {}", e)))?
    {
        let Some(field_name) = field.name().map(str::to_string) else {
            continue;
        };

        match field_name.as_str() {
            "proof" => {
                if let Some(url) = save_upload(config, field, UploadKind::Evidence, "proofs").await? {
                    proof = Some(url);
                }
            }
            "voice_complaint" => {
                if let Some(url) = save_upload(config, field, UploadKind::Voice, "voice").await? {
                    voice_proof = Some(url);
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read field: {}", e)))?;
                form.set_field(&field_name, value);
            }
        }
    }

    Ok((form, proof, voice_proof))
}

/// Save one file field, or return None when the browser submitted the
/// field empty.
async fn save_upload(
    config: &UploadConfig,
    field: axum::extract::multipart::Field<'_>,
    kind: UploadKind,
    subdirectory: &str,
) -> AppResult<Option<String>> {
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read file data: {}", e)))?;

    if data.is_empty() {
        return Ok(None);
    }

    let url = UploadService::save_file(config, &data, &content_type, kind, subdirectory).await?;
    Ok(Some(url))
}

#[utoipa::path(
    post,
    path = "/api/v1/complaints",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Complaint filed", body = ComplaintModel),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "complaints"
)]
pub async fn create_complaint(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<UploadConfig>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&db, &auth_user).await?;

    let (form, proof, voice_proof) = read_complaint_multipart(&config, &mut multipart).await?;
    form.check()?;

    let service = ComplaintService::new(db);
    let saved = service
        .create(&user.phone, form.into_new_complaint(proof, voice_proof))
        .await?;

    Ok(ApiResponse::with_message(
        saved,
        "Complaint submitted successfully".to_string(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/complaints/mine",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Caller's complaints, newest first", body = Vec<ComplaintModel>),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "complaints"
)]
pub async fn list_my_complaints(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&db, &auth_user).await?;

    let service = ComplaintService::new(db);
    let complaints = service.list_for_user(&user.phone).await?;

    Ok(ApiResponse::ok(complaints))
}

#[utoipa::path(
    get,
    path = "/api/v1/complaints/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Complaint retrieved", body = ComplaintModel),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Complaint not found", body = AppError),
    ),
    tag = "complaints"
)]
pub async fn get_complaint(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&db, &auth_user).await?;

    let service = ComplaintService::new(db);
    let complaint = service.get(id).await?;

    if complaint.user_phone != user.phone && user.role != "admin" {
        return Err(AppError::Forbidden);
    }

    Ok(ApiResponse::ok(complaint))
}

#[utoipa::path(
    put,
    path = "/api/v1/complaints/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Complaint ID")),
    request_body = ComplaintForm,
    responses(
        (status = 200, description = "Complaint updated", body = ComplaintModel),
        (status = 400, description = "Not editable in this status", body = AppError),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Complaint not found", body = AppError),
    ),
    tag = "complaints"
)]
pub async fn update_complaint(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(form): Json<ComplaintForm>,
) -> AppResult<impl IntoResponse> {
    form.check()?;

    let user = current_user(&db, &auth_user).await?;

    let service = ComplaintService::new(db);
    let updated = service
        .update_details(id, &user.phone, form.into_new_complaint(None, None))
        .await?;

    Ok(ApiResponse::with_message(
        updated,
        "Complaint updated successfully".to_string(),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/complaints/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Complaint deleted", body = String),
        (status = 400, description = "Not deletable in this status", body = AppError),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Complaint not found", body = AppError),
    ),
    tag = "complaints"
)]
pub async fn delete_complaint(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&db, &auth_user).await?;

    let service = ComplaintService::new(db);
    service.delete(id, &user.phone).await?;

    Ok(ApiResponse::ok("Complaint deleted successfully"))
}

#[utoipa::path(
    post,
    path = "/api/v1/complaints/{id}/proof",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Proof attached", body = ComplaintModel),
        (status = 400, description = "No file or bad file type", body = AppError),
        (status = 403, description = "Not the owner", body = AppError),
        (status = 404, description = "Complaint not found", body = AppError),
    ),
    tag = "complaints"
)]
pub async fn attach_proof(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<UploadConfig>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&db, &auth_user).await?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let url = save_upload(&config, field, UploadKind::Evidence, "proofs")
        .await?
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;

    let service = ComplaintService::new(db);
    let updated = service.attach_proof(id, &user.phone, url).await?;

    Ok(ApiResponse::with_message(
        updated,
        "Proof uploaded successfully".to_string(),
    ))
}

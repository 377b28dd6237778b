use crate::error::{AppError, AppResult};
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

#[derive(Clone)]
pub struct UploadConfig {
    pub upload_dir: String,
}

const MAX_FILE_SIZE: usize = 10 * 1024 * 1024; // 10 MB

/// What a given upload field is allowed to carry. Photo/video evidence
/// goes with complaints and resolutions; voice notes come from the
/// complaint form's recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Evidence,
    Voice,
}

impl UploadKind {
    fn allowed_content_types(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Evidence => &[
                "image/jpeg",
                "image/png",
                "image/gif",
                "image/webp",
                "video/mp4",
            ],
            UploadKind::Voice => &["audio/webm", "audio/mpeg", "audio/wav", "audio/ogg"],
        }
    }

    fn allowed_summary(&self) -> &'static str {
        match self {
            UploadKind::Evidence => "jpeg, png, gif, webp, mp4",
            UploadKind::Voice => "webm, mp3, wav, ogg",
        }
    }
}

/// Validate file magic bytes match the declared content type.
fn validate_magic_bytes(data: &[u8], content_type: &str) -> bool {
    match content_type {
        "image/jpeg" => data.len() >= 3 && data[..3] == [0xFF, 0xD8, 0xFF],
        "image/png" => data.len() >= 4 && data[..4] == [0x89, 0x50, 0x4E, 0x47],
        "image/gif" => data.len() >= 4 && data[..4] == [0x47, 0x49, 0x46, 0x38],
        "image/webp" => {
            data.len() >= 12
                && data[..4] == [0x52, 0x49, 0x46, 0x46]
                && data[8..12] == [0x57, 0x45, 0x42, 0x50]
        }
        // ftyp box starts at offset 4
        "video/mp4" => data.len() >= 8 && data[4..8] == [0x66, 0x74, 0x79, 0x70],
        // EBML header, shared with mkv; good enough for recorder output
        "audio/webm" => data.len() >= 4 && data[..4] == [0x1A, 0x45, 0xDF, 0xA3],
        // ID3 tag or a raw MPEG frame sync
        "audio/mpeg" => {
            (data.len() >= 3 && data[..3] == [0x49, 0x44, 0x33])
                || (data.len() >= 2 && data[0] == 0xFF && data[1] & 0xE0 == 0xE0)
        }
        "audio/wav" => {
            data.len() >= 12
                && data[..4] == [0x52, 0x49, 0x46, 0x46]
                && data[8..12] == [0x57, 0x41, 0x56, 0x45]
        }
        "audio/ogg" => data.len() >= 4 && data[..4] == [0x4F, 0x67, 0x67, 0x53],
        _ => false,
    }
}

fn extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "video/mp4" => Some("mp4"),
        "audio/webm" => Some("webm"),
        "audio/mpeg" => Some("mp3"),
        "audio/wav" => Some("wav"),
        "audio/ogg" => Some("ogg"),
        _ => None,
    }
}

pub struct UploadService;

impl UploadService {
    /// Save an uploaded file to disk.
    /// Returns the public URL path (e.g., `/uploads/proofs/uuid.jpg`).
    pub async fn save_file(
        config: &UploadConfig,
        data: &[u8],
        content_type: &str,
        kind: UploadKind,
        subdirectory: &str,
    ) -> AppResult<String> {
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::PayloadTooLarge);
        }

        if !kind.allowed_content_types().contains(&content_type) {
            return Err(AppError::Validation(format!(
                "Unsupported file type: {}. Allowed: {}",
                content_type,
                kind.allowed_summary()
            )));
        }

        if !validate_magic_bytes(data, content_type) {
            return Err(AppError::Validation(
                "File content does not match declared content type".to_string(),
            ));
        }

        let ext = extension(content_type)
            .ok_or_else(|| AppError::Validation("Unsupported file type".to_string()))?;

        let filename = format!("{}.{}", Uuid::new_v4(), ext);
        let dir = Path::new(&config.upload_dir).join(subdirectory);

        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::Validation(format!("Failed to create upload directory: {}", e))
        })?;

        let file_path = dir.join(&filename);
        fs::write(&file_path, data)
            .await
            .map_err(|e| AppError::Validation(format!("Failed to write file: {}", e)))?;

        Ok(format!("/uploads/{}/{}", subdirectory, filename))
    }
}

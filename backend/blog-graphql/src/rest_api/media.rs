//! Post image upload
//!
//! Clients upload the image first and pass the returned `filePath` as the
//! post's `imageUrl`. When replacing an image they send the previous path as
//! `oldPath`, which is discarded once the new file is stored.

use actix_multipart::{Field, Multipart};
use actix_web::{web, HttpResponse};
use futures_util::stream::StreamExt;
use serde_json::json;
use tracing::{error, info, warn};

use crate::config::UploadConfig;
use crate::error::ApiError;
use crate::images::ImageStore;
use crate::middleware::AuthContext;

const IMAGE_FIELD: &str = "image";
const OLD_PATH_FIELD: &str = "oldPath";

struct ImagePart {
    bytes: Vec<u8>,
    mime: String,
    file_name: String,
}

enum ReadError {
    TooLarge,
    Malformed(String),
}

pub async fn upload_post_image(
    auth: AuthContext,
    images: web::Data<ImageStore>,
    limits: web::Data<UploadConfig>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let user_id = auth.require_user()?;

    let mut image: Option<ImagePart> = None;
    let mut old_path: Option<String> = None;
    let mut total_bytes: usize = 0;

    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => {
                warn!(error = %e, "Malformed multipart upload");
                return Ok(HttpResponse::BadRequest().json(json!({ "message": "Malformed upload." })));
            }
        };

        let name = field.name().unwrap_or_default().to_string();
        let bytes = match read_field(&mut field, &mut total_bytes, limits.max_bytes).await {
            Ok(bytes) => bytes,
            Err(ReadError::TooLarge) => {
                warn!(user_id, limit = limits.max_bytes, "Upload exceeds size limit");
                return Ok(HttpResponse::PayloadTooLarge()
                    .json(json!({ "message": "File too large." })));
            }
            Err(ReadError::Malformed(e)) => {
                warn!(error = %e, "Error reading upload field");
                return Ok(HttpResponse::BadRequest().json(json!({ "message": "Malformed upload." })));
            }
        };

        match name.as_str() {
            IMAGE_FIELD => {
                let mime = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .unwrap_or_default();
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or_default()
                    .to_string();
                image = Some(ImagePart {
                    bytes,
                    mime,
                    file_name,
                });
            }
            OLD_PATH_FIELD => {
                let value = String::from_utf8_lossy(&bytes).trim().to_string();
                old_path = Some(value).filter(|p| !p.is_empty());
            }
            _ => {}
        }
    }

    let stored = match image {
        Some(part) => images
            .store(&part.bytes, &part.mime, &part.file_name)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to store image");
                ApiError::Internal(e.to_string())
            })?,
        None => None,
    };

    let Some(file_path) = stored else {
        return Ok(HttpResponse::Ok().json(json!({ "message": "No file provided!" })));
    };

    if let Some(old_path) = old_path {
        images.discard(&old_path).await;
    }

    info!(user_id, path = %file_path, "Post image uploaded");
    Ok(HttpResponse::Created().json(json!({
        "message": "File stored.",
        "filePath": file_path,
    })))
}

/// Drain one field, enforcing the request-wide byte budget
async fn read_field(
    field: &mut Field,
    total_bytes: &mut usize,
    max_bytes: usize,
) -> Result<Vec<u8>, ReadError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| ReadError::Malformed(e.to_string()))?;
        *total_bytes += chunk.len();
        if *total_bytes > max_bytes {
            return Err(ReadError::TooLarge);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

//! Upload metadata validation for photos and attachments.
//!
//! Byte storage is the file-storage collaborator's concern; this module
//! only gatekeeps the metadata handed over to it (content type, file name
//! extension, declared size).

use crate::error::CoreError;

/// Maximum accepted upload size: 5 MB.
pub const MAX_UPLOAD_BYTES: i64 = 5 * 1024 * 1024;

const ALLOWED_CONTENT_TYPES: &[&str] =
    &["image/jpeg", "image/jpg", "image/png", "image/webp"];

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Validate an image upload's metadata.
///
/// The content type, when provided, must be an allowed image type. The
/// extension is only checked when the file name actually carries one.
pub fn validate_image(
    content_type: Option<&str>,
    file_name: &str,
    size_bytes: i64,
) -> Result<(), CoreError> {
    if let Some(ct) = content_type {
        if !ct.is_empty() && !ALLOWED_CONTENT_TYPES.contains(&ct) {
            return Err(CoreError::Validation(
                "Upload JPG, PNG or WEBP files.".to_string(),
            ));
        }
    }

    let base_name = file_name.rsplit('/').next().unwrap_or(file_name);
    if let Some((_, ext)) = base_name.rsplit_once('.') {
        if !ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
            return Err(CoreError::Validation(
                "File extension not allowed. Use: jpg, jpeg, png or webp.".to_string(),
            ));
        }
    }

    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(
            "Image size may not exceed 5MB.".to_string(),
        ));
    }

    Ok(())
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart upload extraction

use axum::body::Bytes;
use axum_extra::extract::Multipart;
use tracing::debug;

use super::errors::ApiError;

/// Name of the multipart field every upload endpoint reads
pub const FILE_FIELD: &str = "file";

/// One uploaded file, held in memory for the lifetime of the request
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn display_name(&self) -> &str {
        self.filename.as_deref().unwrap_or("upload")
    }
}

/// Read the `file` field from a multipart body. Other fields are skipped.
pub async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, ApiError> {
    read_checked_file_field(multipart, |_| Ok(())).await
}

/// Like [`read_file_field`], but `check` sees the file name before the
/// field body is read; an error from it ends the request unread.
pub async fn read_checked_file_field<F>(
    multipart: &mut Multipart,
    check: F,
) -> Result<UploadedFile, ApiError>
where
    F: Fn(Option<&str>) -> Result<(), ApiError>,
{
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        check(filename.as_deref())?;

        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read upload: {}", e)))?;

        debug!(
            "Received upload {:?} ({} bytes, content-type {:?})",
            filename,
            bytes.len(),
            content_type
        );

        return Ok(UploadedFile {
            filename,
            content_type,
            bytes,
        });
    }

    Err(ApiError::Validation(format!(
        "Missing multipart field '{}'",
        FILE_FIELD
    )))
}

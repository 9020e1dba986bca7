//! Resume photos in S3-compatible object storage.

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;

/// Photo content types accepted by the resume form, with the extension
/// used for the stored object.
pub const PHOTO_TYPES: &[(&str, &str)] = &[("image/jpeg", "jpg"), ("image/png", "png")];

pub fn photo_extension(content_type: &str) -> Option<&'static str> {
    PHOTO_TYPES
        .iter()
        .find(|(ct, _)| ct.eq_ignore_ascii_case(content_type.trim()))
        .map(|(_, ext)| *ext)
}

pub fn content_type_for_key(key: &str) -> &'static str {
    if key.ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}

pub fn photo_key(user_id: Uuid, extension: &str) -> String {
    format!("photos/{user_id}/{}.{extension}", Uuid::new_v4())
}

/// Uploads a photo and returns its object key.
pub async fn put_photo(
    s3: &S3Client,
    bucket: &str,
    user_id: Uuid,
    content_type: &str,
    bytes: Bytes,
) -> Result<String, AppError> {
    let extension = photo_extension(content_type)
        .ok_or_else(|| AppError::Validation("Only JPG, JPEG or PNG images allowed".to_string()))?;
    let key = photo_key(user_id, extension);

    s3.put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(bytes))
        .content_type(content_type_for_key(&key))
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

    info!("Uploaded resume photo to s3://{bucket}/{key}");
    Ok(key)
}

pub async fn get_photo(s3: &S3Client, bucket: &str, key: &str) -> Result<Bytes, AppError> {
    let object = s3
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 download failed: {e}")))?;

    let data = object
        .body
        .collect()
        .await
        .map_err(|e| AppError::Storage(format!("S3 body read failed: {e}")))?;
    Ok(data.into_bytes())
}

/// Best-effort removal; a missing object is not an error for S3.
pub async fn delete_photo(s3: &S3Client, bucket: &str, key: &str) -> Result<(), AppError> {
    s3.delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::Storage(format!("S3 delete failed: {e}")))?;
    info!("Deleted resume photo s3://{bucket}/{key}");
    Ok(())
}

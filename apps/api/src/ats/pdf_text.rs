//! Text extraction from uploaded resume PDFs.

use axum::extract::{multipart::MultipartRejection, Multipart};
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

/// Multipart field carrying the uploaded resume.
pub const UPLOAD_FIELD: &str = "resume_pdf";

#[derive(Debug, Error)]
pub enum PdfTextError {
    #[error("Please upload a PDF file.")]
    Missing,

    #[error("Only PDF files are supported.")]
    NotPdf,

    #[error("Error reading PDF file: {0}")]
    Unreadable(String),

    #[error(
        "Could not read any text from the PDF. \
         Make sure it is not just an image or scanned document."
    )]
    NoText,
}

impl PdfTextError {
    /// Message shown to the user on the dashboard, where errors are reported
    /// inline rather than as HTTP failures.
    pub fn user_message(&self) -> String {
        match self {
            PdfTextError::Unreadable(_) => {
                "Error reading PDF file. Please try another file.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// A PDF file taken from a multipart request.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

impl PdfUpload {
    /// Checks the file name the way the upload form promises: `.pdf`, any case.
    pub fn validate(file_name: Option<&str>, bytes: Bytes) -> Result<Self, PdfTextError> {
        let file_name = file_name.unwrap_or_default();
        if file_name.is_empty() && bytes.is_empty() {
            return Err(PdfTextError::Missing);
        }
        if !file_name.to_lowercase().ends_with(".pdf") {
            return Err(PdfTextError::NotPdf);
        }
        Ok(Self {
            file_name: file_name.to_string(),
            bytes,
        })
    }

    /// Reads the `resume_pdf` field out of a multipart body, skipping any
    /// other fields.
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self, PdfTextError> {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| PdfTextError::Unreadable(e.to_string()))?
        {
            if field.name() != Some(UPLOAD_FIELD) {
                continue;
            }
            let file_name = field.file_name().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| PdfTextError::Unreadable(e.to_string()))?;
            return Self::validate(file_name.as_deref(), bytes);
        }
        Err(PdfTextError::Missing)
    }

    /// Like `from_multipart`, for a body that may not be multipart at all.
    /// A non-multipart body is treated as a missing upload.
    pub async fn from_body(
        multipart: Result<Multipart, MultipartRejection>,
    ) -> Result<Self, PdfTextError> {
        match multipart {
            Ok(mut multipart) => Self::from_multipart(&mut multipart).await,
            Err(rejection) => {
                debug!("Upload body is not multipart: {rejection}");
                Err(PdfTextError::Missing)
            }
        }
    }

    /// Extracts the document text on the blocking pool. Parser panics on
    /// malformed input surface as `Unreadable`.
    pub async fn extract_text(&self) -> Result<String, PdfTextError> {
        let bytes = self.bytes.clone();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| PdfTextError::Unreadable(format!("extraction task failed: {e}")))?
            .map_err(|e| PdfTextError::Unreadable(e.to_string()))?;

        let text = text.trim().to_string();
        debug!(
            "Extracted {} characters from '{}'",
            text.len(),
            self.file_name
        );
        if text.is_empty() {
            return Err(PdfTextError::NoText);
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_uppercase_extension() {
        let upload = PdfUpload::validate(Some("CV.PDF"), Bytes::from_static(b"%PDF-1.4")).unwrap();
        assert_eq!(upload.file_name, "CV.PDF");
    }

    #[test]
    fn test_validate_rejects_other_extensions() {
        assert!(matches!(
            PdfUpload::validate(Some("cv.docx"), Bytes::from_static(b"PK")),
            Err(PdfTextError::NotPdf)
        ));
    }

    #[test]
    fn test_validate_empty_field_is_missing() {
        assert!(matches!(
            PdfUpload::validate(None, Bytes::new()),
            Err(PdfTextError::Missing)
        ));
    }

    #[tokio::test]
    async fn test_garbage_bytes_are_unreadable() {
        let bytes = Bytes::from_static(b"definitely not a pdf");
        let upload = PdfUpload::validate(Some("cv.pdf"), bytes).unwrap();
        let err = upload.extract_text().await.unwrap_err();
        assert!(matches!(err, PdfTextError::Unreadable(_)));
        assert_eq!(
            err.user_message(),
            "Error reading PDF file. Please try another file."
        );
    }
}

//! Multipart resume form: parsing and field validation.

use axum::extract::Multipart;
use bytes::Bytes;
use email_address::EmailAddress;
use reqwest::Url;

use crate::errors::{AppError, FormErrors};
use crate::models::resume::ResumeFields;
use crate::storage::photo_extension;

pub const FULL_NAME_MAX_CHARS: usize = 200;
pub const MOBILE_MAX_CHARS: usize = 15;
pub const PHOTO_FIELD: &str = "photo";

const REQUIRED: &str = "This field is required.";

/// An image attached to the form.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct ResumeForm {
    pub fields: ResumeFields,
    pub photo: Option<PhotoUpload>,
}

pub(crate) fn field_mut<'a>(fields: &'a mut ResumeFields, name: &str) -> Option<&'a mut String> {
    let slot = match name {
        "full_name" => &mut fields.full_name,
        "email" => &mut fields.email,
        "mobile" => &mut fields.mobile,
        "linkedin" => &mut fields.linkedin,
        "career_objective" => &mut fields.career_objective,
        "edu_qualification" => &mut fields.edu_qualification,
        "edu_year" => &mut fields.edu_year,
        "edu_college" => &mut fields.edu_college,
        "edu_university" => &mut fields.edu_university,
        "edu_cgpa" => &mut fields.edu_cgpa,
        "edu_class" => &mut fields.edu_class,
        "achievements" => &mut fields.achievements,
        "certifications" => &mut fields.certifications,
        "languages" => &mut fields.languages,
        "skills" => &mut fields.skills,
        "projects" => &mut fields.projects,
        "hobbies" => &mut fields.hobbies,
        _ => return None,
    };
    Some(slot)
}

impl ResumeForm {
    /// Reads every known field from the body. Unknown fields are ignored;
    /// an empty file input counts as no photo.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = ResumeForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed form data: {e}")))?
        {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == PHOTO_FIELD {
                let has_file = field.file_name().is_some_and(|n| !n.is_empty());
                let content_type = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Malformed form data: {e}")))?;
                if has_file || !bytes.is_empty() {
                    form.photo = Some(PhotoUpload {
                        content_type,
                        bytes,
                    });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::Validation(format!("Malformed form data: {e}")))?;
            if let Some(slot) = field_mut(&mut form.fields, &name) {
                *slot = value.trim().to_string();
            }
        }

        Ok(form)
    }

    /// Applies the field rules. Normalizes `linkedin` (scheme added when
    /// missing) and `email` in place.
    pub fn validate(&mut self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        let mut fail = |field: &str, message: String| {
            errors.entry(field.to_string()).or_default().push(message);
        };
        let f = &mut self.fields;

        check_required_max(&f.full_name, "full_name", Some(FULL_NAME_MAX_CHARS), &mut fail);
        check_required_max(&f.mobile, "mobile", Some(MOBILE_MAX_CHARS), &mut fail);
        check_required_max(&f.career_objective, "career_objective", None, &mut fail);

        if f.email.is_empty() {
            fail("email", REQUIRED.to_string());
        } else if !EmailAddress::is_valid(&f.email) {
            fail("email", "Enter a valid email address.".to_string());
        }

        if !f.linkedin.is_empty() {
            match normalize_url(&f.linkedin) {
                Some(url) => f.linkedin = url,
                None => fail("linkedin", "Enter a valid URL.".to_string()),
            }
        }

        if let Some(photo) = &self.photo {
            if photo_extension(&photo.content_type).is_none() {
                fail(
                    PHOTO_FIELD,
                    "Only JPG, JPEG or PNG images allowed".to_string(),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_required_max(
    value: &str,
    field: &str,
    max_chars: Option<usize>,
    fail: &mut impl FnMut(&str, String),
) {
    if value.is_empty() {
        fail(field, REQUIRED.to_string());
        return;
    }
    let len = value.chars().count();
    if let Some(max) = max_chars.filter(|max| len > *max) {
        fail(
            field,
            format!("Ensure this value has at most {max} characters (it has {len})."),
        );
    }
}

/// An http(s) URL with a host. A bare domain gets `http://` prepended.
pub fn normalize_url(raw: &str) -> Option<String> {
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };
    let url = Url::parse(&candidate).ok()?;
    let web = matches!(url.scheme(), "http" | "https");
    let has_host = url.host_str().is_some_and(|h| h.contains('.') || h == "localhost");
    (web && has_host).then_some(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> ResumeForm {
        ResumeForm {
            fields: ResumeFields {
                full_name: "Grace Hopper".to_string(),
                email: "grace@navy.mil".to_string(),
                mobile: "+1 555 0100".to_string(),
                career_objective: "Make computers speak English.".to_string(),
                ..Default::default()
            },
            photo: None,
        }
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn test_required_fields_reported() {
        let mut form = ResumeForm::default();
        let errors = form.validate().unwrap_err();
        for field in ["full_name", "email", "mobile", "career_objective"] {
            assert_eq!(errors[field], vec![REQUIRED.to_string()], "{field}");
        }
        assert!(!errors.contains_key("linkedin"));
    }

    #[test]
    fn test_length_limits() {
        let mut form = valid_form();
        form.fields.full_name = "x".repeat(201);
        form.fields.mobile = "1".repeat(16);
        let errors = form.validate().unwrap_err();
        assert!(errors["full_name"][0].contains("at most 200"));
        assert!(errors["mobile"][0].contains("at most 15"));

        let mut form = valid_form();
        form.fields.full_name = "é".repeat(200);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_invalid_email() {
        let mut form = valid_form();
        form.fields.email = "grace@".to_string();
        assert!(form.validate().unwrap_err().contains_key("email"));
    }

    #[test]
    fn test_linkedin_normalized_or_rejected() {
        let mut form = valid_form();
        form.fields.linkedin = "linkedin.com/in/grace".to_string();
        form.validate().unwrap();
        assert_eq!(form.fields.linkedin, "http://linkedin.com/in/grace");

        let mut form = valid_form();
        form.fields.linkedin = "ftp://linkedin.com/in/grace".to_string();
        assert!(form.validate().unwrap_err().contains_key("linkedin"));

        let mut form = valid_form();
        form.fields.linkedin = "not a url".to_string();
        assert!(form.validate().unwrap_err().contains_key("linkedin"));
    }

    #[test]
    fn test_photo_content_type() {
        let mut form = valid_form();
        form.photo = Some(PhotoUpload {
            content_type: "image/gif".to_string(),
            bytes: Bytes::from_static(b"GIF89a"),
        });
        let errors = form.validate().unwrap_err();
        assert_eq!(errors["photo"], vec!["Only JPG, JPEG or PNG images allowed".to_string()]);

        form.photo = Some(PhotoUpload {
            content_type: "image/png".to_string(),
            bytes: Bytes::from_static(b"\x89PNG"),
        });
        assert!(form.validate().is_ok());
    }
}

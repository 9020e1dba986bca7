use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted resume. List-style sections are newline-separated strings;
/// see `resumes::text` for how they are split for rendering.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: i64,
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub linkedin: String,
    pub photo_key: Option<String>,
    pub career_objective: String,
    pub edu_qualification: String,
    pub edu_year: String,
    pub edu_college: String,
    pub edu_university: String,
    pub edu_cgpa: String,
    pub edu_class: String,
    pub achievements: String,
    pub certifications: String,
    pub languages: String,
    pub skills: String,
    pub projects: String,
    pub hobbies: String,
    pub ats_score: i32,
    pub analyzed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResumeRow {
    /// The editable fields, for prefilling the edit form.
    pub fn fields(&self) -> ResumeFields {
        ResumeFields {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            mobile: self.mobile.clone(),
            linkedin: self.linkedin.clone(),
            career_objective: self.career_objective.clone(),
            edu_qualification: self.edu_qualification.clone(),
            edu_year: self.edu_year.clone(),
            edu_college: self.edu_college.clone(),
            edu_university: self.edu_university.clone(),
            edu_cgpa: self.edu_cgpa.clone(),
            edu_class: self.edu_class.clone(),
            achievements: self.achievements.clone(),
            certifications: self.certifications.clone(),
            languages: self.languages.clone(),
            skills: self.skills.clone(),
            projects: self.projects.clone(),
            hobbies: self.hobbies.clone(),
        }
    }
}

/// The user-editable part of a resume, as submitted through the form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResumeFields {
    pub full_name: String,
    pub email: String,
    pub mobile: String,
    pub linkedin: String,
    pub career_objective: String,
    pub edu_qualification: String,
    pub edu_year: String,
    pub edu_college: String,
    pub edu_university: String,
    pub edu_cgpa: String,
    pub edu_class: String,
    pub achievements: String,
    pub certifications: String,
    pub languages: String,
    pub skills: String,
    pub projects: String,
    pub hobbies: String,
}

/// Compact listing entry used by the dashboard and profile pages.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeSummary {
    pub id: i64,
    pub full_name: String,
    pub ats_score: i32,
    pub analyzed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

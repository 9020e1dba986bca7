use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::models::resume::{ResumeFields, ResumeRow, ResumeSummary};

/// Aggregates over one user's resumes.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ResumeStats {
    pub total: i64,
    pub analyzed: i64,
    pub avg_ats: Option<f64>,
    pub last_updated: Option<DateTime<Utc>>,
}

pub async fn insert(
    pool: &PgPool,
    user_id: Uuid,
    fields: &ResumeFields,
    photo_key: Option<&str>,
) -> Result<ResumeRow, sqlx::Error> {
    let row: ResumeRow = sqlx::query_as(
        r#"
        INSERT INTO resumes (
            user_id, full_name, email, mobile, linkedin, photo_key, career_objective,
            edu_qualification, edu_year, edu_college, edu_university, edu_cgpa, edu_class,
            achievements, certifications, languages, skills, projects, hobbies,
            ats_score, analyzed
        )
        VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
            $11, $12, $13, $14, $15, $16, $17, $18, $19, 0, FALSE
        )
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(&fields.full_name)
    .bind(&fields.email)
    .bind(&fields.mobile)
    .bind(&fields.linkedin)
    .bind(photo_key)
    .bind(&fields.career_objective)
    .bind(&fields.edu_qualification)
    .bind(&fields.edu_year)
    .bind(&fields.edu_college)
    .bind(&fields.edu_university)
    .bind(&fields.edu_cgpa)
    .bind(&fields.edu_class)
    .bind(&fields.achievements)
    .bind(&fields.certifications)
    .bind(&fields.languages)
    .bind(&fields.skills)
    .bind(&fields.projects)
    .bind(&fields.hobbies)
    .fetch_one(pool)
    .await?;

    info!("Created resume {} for user {user_id}", row.id);
    Ok(row)
}

/// Looks a resume up by id AND owner.
pub async fn get_owned(
    pool: &PgPool,
    id: i64,
    user_id: Uuid,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Full-form update. `photo_key = None` keeps the stored photo.
pub async fn update(
    pool: &PgPool,
    id: i64,
    user_id: Uuid,
    fields: &ResumeFields,
    photo_key: Option<&str>,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        UPDATE resumes SET
            full_name = $3, email = $4, mobile = $5, linkedin = $6,
            photo_key = COALESCE($7, photo_key), career_objective = $8,
            edu_qualification = $9, edu_year = $10, edu_college = $11,
            edu_university = $12, edu_cgpa = $13, edu_class = $14,
            achievements = $15, certifications = $16, languages = $17,
            skills = $18, projects = $19, hobbies = $20,
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&fields.full_name)
    .bind(&fields.email)
    .bind(&fields.mobile)
    .bind(&fields.linkedin)
    .bind(photo_key)
    .bind(&fields.career_objective)
    .bind(&fields.edu_qualification)
    .bind(&fields.edu_year)
    .bind(&fields.edu_college)
    .bind(&fields.edu_university)
    .bind(&fields.edu_cgpa)
    .bind(&fields.edu_class)
    .bind(&fields.achievements)
    .bind(&fields.certifications)
    .bind(&fields.languages)
    .bind(&fields.skills)
    .bind(&fields.projects)
    .bind(&fields.hobbies)
    .fetch_optional(pool)
    .await
}

/// Deletes and returns the removed row so the caller can clean up its photo.
pub async fn delete(
    pool: &PgPool,
    id: i64,
    user_id: Uuid,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as("DELETE FROM resumes WHERE id = $1 AND user_id = $2 RETURNING *")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn set_ats_score(
    pool: &PgPool,
    id: i64,
    user_id: Uuid,
    score: i32,
) -> Result<Option<ResumeRow>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE resumes SET ats_score = $3, analyzed = TRUE, updated_at = now()
         WHERE id = $1 AND user_id = $2
         RETURNING *",
    )
    .bind(id)
    .bind(user_id)
    .bind(score)
    .fetch_optional(pool)
    .await
}

/// Newest first.
pub async fn list_summaries(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<ResumeSummary>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, full_name, ats_score, analyzed, created_at, updated_at
         FROM resumes WHERE user_id = $1
         ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn stats(pool: &PgPool, user_id: Uuid) -> Result<ResumeStats, sqlx::Error> {
    sqlx::query_as(
        "SELECT COUNT(*) AS total,
                COUNT(*) FILTER (WHERE analyzed) AS analyzed,
                AVG(ats_score)::float8 AS avg_ats,
                MAX(updated_at) AS last_updated
         FROM resumes WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

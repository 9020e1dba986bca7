use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A catalog entry describing one selectable resume layout.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeTemplateRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    /// Static image path shown on the catalog page.
    pub preview_image: String,
    pub slug: String,
}

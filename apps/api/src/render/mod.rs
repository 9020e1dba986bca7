// Resume rendering: the three selectable layouts as HTML preview and as a
// paginated PDF export. Both renderers consume the same `ResumeView`.

pub mod font_metrics;
pub mod html;
pub mod pdf;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::models::resume::ResumeRow;
use crate::resumes::text::{parse_education, split_lines, split_name, EducationRow};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// The renderable layouts. Catalog entries with any other slug can be
/// listed but not previewed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateKind {
    ProfessionalClassic,
    CreativeMinimal,
    ModernPhotoStyle,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 3] = [
        TemplateKind::ProfessionalClassic,
        TemplateKind::CreativeMinimal,
        TemplateKind::ModernPhotoStyle,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            TemplateKind::ProfessionalClassic => "professional_classic",
            TemplateKind::CreativeMinimal => "creative_minimal",
            TemplateKind::ModernPhotoStyle => "modern_photo_style",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TemplateKind::ProfessionalClassic => "Professional Classic",
            TemplateKind::CreativeMinimal => "Creative Minimal",
            TemplateKind::ModernPhotoStyle => "Modern Photo Style",
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTemplate(pub String);

impl FromStr for TemplateKind {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateKind::ALL
            .into_iter()
            .find(|t| t.slug() == s)
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

/// Everything a layout needs, with the newline-encoded fields already split.
#[derive(Debug, Clone)]
pub struct ResumeView {
    pub resume: ResumeRow,
    pub template: TemplateKind,
    pub education_rows: Vec<EducationRow>,
    pub skills: Vec<String>,
    pub projects: Vec<String>,
    pub achievements: Vec<String>,
    pub certifications: Vec<String>,
    pub languages: Vec<String>,
    pub hobbies: Vec<String>,
    pub first_name: String,
    pub last_name: String,
}

impl ResumeView {
    pub fn new(resume: ResumeRow, template: TemplateKind) -> Self {
        let [first_name, last_name] = split_name(&resume.full_name);
        Self {
            education_rows: parse_education(&resume),
            skills: split_lines(&resume.skills),
            projects: split_lines(&resume.projects),
            achievements: split_lines(&resume.achievements),
            certifications: split_lines(&resume.certifications),
            languages: split_lines(&resume.languages),
            hobbies: split_lines(&resume.hobbies),
            first_name,
            last_name,
            template,
            resume,
        }
    }

    /// Photo URL served by the resume routes, when a photo is stored.
    pub fn photo_url(&self) -> Option<String> {
        self.resume
            .photo_key
            .as_ref()
            .map(|_| format!("/resume/{}/photo/", self.resume.id))
    }

    /// Titled list sections in display order, skipping empty ones.
    pub fn list_sections(&self) -> Vec<(&'static str, &[String])> {
        [
            ("Skills", self.skills.as_slice()),
            ("Projects", self.projects.as_slice()),
            ("Achievements", self.achievements.as_slice()),
            ("Certifications", self.certifications.as_slice()),
            ("Languages", self.languages.as_slice()),
            ("Hobbies", self.hobbies.as_slice()),
        ]
        .into_iter()
        .filter(|(_, items)| !items.is_empty())
        .collect()
    }
}

// ATS scoring: keyword/section heuristic plus PDF text extraction for uploads.

pub mod pdf_text;
pub mod scoring;

pub use scoring::{score_breakdown, score_text, ScoreBreakdown};

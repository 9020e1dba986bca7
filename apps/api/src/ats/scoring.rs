//! ATS score heuristic: a fixed weighted sum over section headings, common
//! technical keywords and document length.
//!
//! Weights: sections 40, keywords 40, length 20. Matching is by substring
//! on the lower-cased text, so "projects" also matches "side-projects".

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

const SECTIONS: &[&str] = &[
    "summary",
    "objective",
    "career objective",
    "education",
    "experience",
    "work history",
    "projects",
    "skills",
    "certifications",
];

const KEYWORDS: &[&str] = &[
    "python",
    "django",
    "sql",
    "rest api",
    "html",
    "css",
    "javascript",
    "react",
    "machine learning",
    "data analysis",
    "git",
    "docker",
];

const SECTION_WEIGHT: f64 = 40.0;
const KEYWORD_WEIGHT: f64 = 40.0;
const LENGTH_FULL: f64 = 20.0;
const LENGTH_PARTIAL: f64 = 10.0;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid word regex"));

/// Per-component view of a score, returned alongside the number so callers
/// can explain it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoreBreakdown {
    pub score: u8,
    pub section_points: f64,
    pub keyword_points: f64,
    pub length_points: f64,
    pub word_count: usize,
    pub sections_found: Vec<&'static str>,
    pub keywords_found: Vec<&'static str>,
}

/// Scores free text in `[0, 100]`.
pub fn score_text(text: &str) -> u8 {
    score_breakdown(text).score
}

pub fn score_breakdown(text: &str) -> ScoreBreakdown {
    if text.is_empty() {
        return ScoreBreakdown {
            score: 0,
            section_points: 0.0,
            keyword_points: 0.0,
            length_points: 0.0,
            word_count: 0,
            sections_found: vec![],
            keywords_found: vec![],
        };
    }

    let text_lower = text.to_lowercase();

    let sections_found: Vec<&'static str> = SECTIONS
        .iter()
        .copied()
        .filter(|s| text_lower.contains(s))
        .collect();
    let per_section = SECTION_WEIGHT / SECTIONS.len() as f64;
    let section_points = sections_found.iter().map(|_| per_section).sum::<f64>();

    let keywords_found: Vec<&'static str> = KEYWORDS
        .iter()
        .copied()
        .filter(|k| text_lower.contains(k))
        .collect();
    let per_keyword = KEYWORD_WEIGHT / KEYWORDS.len() as f64;
    let keyword_points = (keywords_found.len() as f64 * per_keyword).min(KEYWORD_WEIGHT);

    let word_count = WORD_RE.find_iter(&text_lower).count();
    let length_points = length_points(word_count);

    let raw = section_points + keyword_points + length_points;
    let score = raw.round_ties_even().clamp(0.0, 100.0) as u8;

    ScoreBreakdown {
        score,
        section_points,
        keyword_points,
        length_points,
        word_count,
        sections_found,
        keywords_found,
    }
}

fn length_points(word_count: usize) -> f64 {
    match word_count {
        300..=1200 => LENGTH_FULL,
        150..=299 | 1201..=2000 => LENGTH_PARTIAL,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(words: usize) -> String {
        vec!["lorem"; words].join(" ")
    }

    #[test]
    fn test_empty_text_scores_zero() {
        assert_eq!(score_text(""), 0);
    }

    #[test]
    fn test_plain_text_without_signals_scores_zero() {
        assert_eq!(score_text("hello world"), 0);
    }

    #[test]
    fn test_all_sections_and_keywords_in_range() {
        let text = format!(
            "{} {} {}",
            SECTIONS.join(" "),
            KEYWORDS.join(" "),
            filler(400)
        );
        let b = score_breakdown(&text);
        assert_eq!(b.sections_found.len(), SECTIONS.len());
        assert_eq!(b.keywords_found.len(), KEYWORDS.len());
        assert_eq!(b.length_points, LENGTH_FULL);
        assert_eq!(b.score, 100);
    }

    #[test]
    fn test_case_insensitive_matching() {
        let b = score_breakdown("EDUCATION and Skills; PYTHON, Docker");
        assert_eq!(b.sections_found, vec!["education", "skills"]);
        assert_eq!(b.keywords_found, vec!["python", "docker"]);
    }

    #[test]
    fn test_length_bands() {
        assert_eq!(length_points(149), 0.0);
        assert_eq!(length_points(150), LENGTH_PARTIAL);
        assert_eq!(length_points(299), LENGTH_PARTIAL);
        assert_eq!(length_points(300), LENGTH_FULL);
        assert_eq!(length_points(1200), LENGTH_FULL);
        assert_eq!(length_points(1201), LENGTH_PARTIAL);
        assert_eq!(length_points(2000), LENGTH_PARTIAL);
        assert_eq!(length_points(2001), 0.0);
    }

    #[test]
    fn test_word_count_uses_word_runs() {
        let b = score_breakdown("rest-api, c++ & node.js");
        // rest, api, c, node, js
        assert_eq!(b.word_count, 5);
    }

    #[test]
    fn test_single_section_rounds() {
        // 40 / 9 = 4.44 -> 4
        assert_eq!(score_text("summary"), 4);
        // 2 * 40 / 9 = 8.89 -> 9
        assert_eq!(score_text("summary education"), 9);
    }

    #[test]
    fn test_monotonic_in_signal_count() {
        let mut text = filler(200);
        let mut previous = score_text(&text);
        for signal in SECTIONS.iter().chain(KEYWORDS.iter()) {
            text.push(' ');
            text.push_str(signal);
            let current = score_text(&text);
            assert!(current >= previous, "{signal}: {current} < {previous}");
            assert!(current <= 100);
            previous = current;
        }
    }

    #[test]
    fn test_bounded_for_huge_input() {
        let text = format!("{} {}", KEYWORDS.join(" ").repeat(50), filler(5000));
        let score = score_text(&text);
        assert!(score <= 100);
        // keywords only, too long for length points
        assert_eq!(score, 40);
    }
}

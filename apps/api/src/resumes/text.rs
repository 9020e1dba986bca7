//! Splitting of newline-encoded resume fields into renderable rows.

use serde::Serialize;

use crate::models::resume::ResumeRow;

/// One row of the education table, zipped positionally across the six
/// education columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EducationRow {
    pub qualification: String,
    pub year: String,
    pub college: String,
    pub university: String,
    pub cgpa: String,
    pub class: String,
}

/// Splits on every line boundary the form widgets may produce: `\n`, `\r\n`,
/// a lone `\r`, and the Unicode line/paragraph separators.
///
/// Lines are returned untouched (no trimming, empties kept). A trailing
/// line break does not produce a final empty line.
pub fn physical_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..idx]);
        let mut next_start = idx + c.len_utf8();
        if c == '\r' {
            if let Some(&(lf_idx, '\n')) = chars.peek() {
                chars.next();
                next_start = lf_idx + 1;
            }
        }
        start = next_start;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\u{0B}'
            | '\u{0C}'
            | '\u{1C}'
            | '\u{1D}'
            | '\u{1E}'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

/// Trimmed, non-empty lines of a list-style field.
pub fn split_lines(text: &str) -> Vec<String> {
    physical_lines(text)
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Splits a full name into `[first, rest]`. Always exactly two parts; missing
/// parts are empty strings.
pub fn split_name(full_name: &str) -> [String; 2] {
    let mut parts = full_name.split_whitespace();
    match parts.next() {
        None => [String::new(), String::new()],
        Some(first) => [first.to_string(), parts.collect::<Vec<_>>().join(" ")],
    }
}

/// Builds the education table. The qualification column drives the row
/// count; the other columns are matched by index and padded with empty
/// strings where they run short.
pub fn parse_education(resume: &ResumeRow) -> Vec<EducationRow> {
    let years = physical_lines(&resume.edu_year);
    let colleges = physical_lines(&resume.edu_college);
    let universities = physical_lines(&resume.edu_university);
    let cgpas = physical_lines(&resume.edu_cgpa);
    let classes = physical_lines(&resume.edu_class);

    let cell = |column: &[&str], idx: usize| {
        column.get(idx).copied().unwrap_or_default().to_string()
    };

    split_lines(&resume.edu_qualification)
        .into_iter()
        .enumerate()
        .map(|(idx, qualification)| EducationRow {
            qualification,
            year: cell(&years, idx),
            college: cell(&colleges, idx),
            university: cell(&universities, idx),
            cgpa: cell(&cgpas, idx),
            class: cell(&classes, idx),
        })
        .collect()
}

/// The resume as titled plain text, in reading order. This is what the ATS
/// heuristic scores for a stored resume.
pub fn plain_text(resume: &ResumeRow) -> String {
    let mut out = vec![
        resume.full_name.clone(),
        format!("{} | {} | {}", resume.email, resume.mobile, resume.linkedin),
        "Career Objective".to_string(),
        resume.career_objective.clone(),
    ];

    let education = parse_education(resume);
    if !education.is_empty() {
        out.push("Education".to_string());
        for row in education {
            let cells = [
                row.qualification,
                row.year,
                row.college,
                row.university,
                row.cgpa,
                row.class,
            ];
            let cells: Vec<&str> = cells
                .iter()
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .collect();
            out.push(cells.join(", "));
        }
    }

    for (title, field) in [
        ("Skills", &resume.skills),
        ("Projects", &resume.projects),
        ("Achievements", &resume.achievements),
        ("Certifications", &resume.certifications),
        ("Languages", &resume.languages),
        ("Hobbies", &resume.hobbies),
    ] {
        let lines = split_lines(field);
        if !lines.is_empty() {
            out.push(title.to_string());
            out.extend(lines);
        }
    }
    out.join("\n")
}

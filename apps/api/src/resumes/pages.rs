//! Server-rendered resume form, shared by the create and edit pages.

use std::fmt::Write as _;

use crate::auth::pages::page;
use crate::models::resume::ResumeFields;
use crate::render::html::escape;
use crate::resumes::form::{FULL_NAME_MAX_CHARS, MOBILE_MAX_CHARS, PHOTO_FIELD};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Widget {
    /// Required single-line text with a length cap.
    Text { max: usize },
    Email,
    Url,
    /// Free text; list sections take one entry per line.
    Lines { required: bool },
}

const LINES: Widget = Widget::Lines { required: false };

struct Input<'a> {
    name: &'static str,
    label: &'static str,
    widget: Widget,
    value: &'a str,
}

fn input<'a>(
    name: &'static str,
    label: &'static str,
    widget: Widget,
    value: &'a str,
) -> Input<'a> {
    Input {
        name,
        label,
        widget,
        value,
    }
}

fn inputs(f: &ResumeFields) -> [Input<'_>; 17] {
    let objective = Widget::Lines { required: true };
    [
        input("full_name", "Full name", Widget::Text { max: FULL_NAME_MAX_CHARS }, &f.full_name),
        input("email", "Email", Widget::Email, &f.email),
        input("mobile", "Mobile", Widget::Text { max: MOBILE_MAX_CHARS }, &f.mobile),
        input("linkedin", "LinkedIn URL", Widget::Url, &f.linkedin),
        input("career_objective", "Career objective", objective, &f.career_objective),
        input("edu_qualification", "Qualifications", LINES, &f.edu_qualification),
        input("edu_year", "Years", LINES, &f.edu_year),
        input("edu_college", "Colleges", LINES, &f.edu_college),
        input("edu_university", "Universities", LINES, &f.edu_university),
        input("edu_cgpa", "CGPA", LINES, &f.edu_cgpa),
        input("edu_class", "Class", LINES, &f.edu_class),
        input("achievements", "Achievements", LINES, &f.achievements),
        input("certifications", "Certifications", LINES, &f.certifications),
        input("languages", "Languages", LINES, &f.languages),
        input("skills", "Skills", LINES, &f.skills),
        input("projects", "Projects", LINES, &f.projects),
        input("hobbies", "Hobbies", LINES, &f.hobbies),
    ]
}

fn write_input(out: &mut String, input: &Input<'_>) {
    let Input {
        name,
        label,
        widget,
        value,
    } = input;
    let value = escape(value);
    let _ = match widget {
        Widget::Text { max } => write!(
            out,
            "<label>{label} <input type=\"text\" name=\"{name}\" value=\"{value}\" \
             maxlength=\"{max}\" required></label>"
        ),
        Widget::Email => write!(
            out,
            "<label>{label} <input type=\"email\" name=\"{name}\" value=\"{value}\" \
             required></label>"
        ),
        Widget::Url => write!(
            out,
            "<label>{label} <input type=\"text\" name=\"{name}\" value=\"{value}\"></label>"
        ),
        Widget::Lines { required } => write!(
            out,
            "<label>{label} <textarea name=\"{name}\" rows=\"3\"{req}>{value}</textarea></label>",
            req = if *required { " required" } else { "" },
        ),
    };
}

/// The resume form posting to `action`. `has_photo` notes that leaving the
/// file input empty keeps the stored photo.
pub fn resume_form(title: &str, action: &str, fields: &ResumeFields, has_photo: bool) -> String {
    let mut body = format!("<h1>{}</h1>", escape(title));
    let _ = write!(
        body,
        "<form method=\"post\" action=\"{}\" enctype=\"multipart/form-data\">",
        escape(action)
    );
    for input in inputs(fields) {
        write_input(&mut body, &input);
    }
    let _ = write!(
        body,
        "<label>Photo <input type=\"file\" name=\"{PHOTO_FIELD}\" \
         accept=\"image/jpeg,image/png\"></label>"
    );
    if has_photo {
        body.push_str("<p>Leave the photo empty to keep the current one.</p>");
    }
    body.push_str("<button type=\"submit\">Save and choose a template</button></form>");
    body.push_str("<p><a href=\"/dashboard/\">Back to dashboard</a></p>");
    page(title, &body)
}

//! HTML preview layouts.

use std::fmt::Write as _;

use super::{ResumeView, TemplateKind};

/// Escapes text for use in element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the full preview page for the view's template.
pub fn render_preview(view: &ResumeView) -> String {
    let (style, body) = match view.template {
        TemplateKind::ProfessionalClassic => (CLASSIC_CSS, classic_body(view)),
        TemplateKind::CreativeMinimal => (MINIMAL_CSS, minimal_body(view)),
        TemplateKind::ModernPhotoStyle => (PHOTO_CSS, photo_body(view)),
    };

    let mut page = String::new();
    let _ = write!(
        page,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{name} | {template}</title>\n<style>{style}</style>\n</head>\n<body>\n\
         <nav class=\"toolbar\"><a href=\"/resume/{id}/templates/\">Change template</a> \
         <a href=\"/resume/{id}/pdf/{slug}/\">Download PDF</a></nav>\n{body}\n</body>\n</html>\n",
        name = escape(&view.resume.full_name),
        template = view.template.display_name(),
        id = view.resume.id,
        slug = view.template.slug(),
    );
    page
}

fn contact_items(view: &ResumeView) -> Vec<String> {
    let r = &view.resume;
    let mut items = vec![
        format!(
            "<a href=\"mailto:{email}\">{email}</a>",
            email = escape(&r.email)
        ),
        escape(&r.mobile),
    ];
    if !r.linkedin.is_empty() {
        items.push(format!(
            "<a href=\"{url}\">{url}</a>",
            url = escape(&r.linkedin)
        ));
    }
    items
}

fn list(items: &[String]) -> String {
    let mut out = String::from("<ul>");
    for item in items {
        let _ = write!(out, "<li>{}</li>", escape(item));
    }
    out.push_str("</ul>");
    out
}

fn education_table(view: &ResumeView) -> String {
    if view.education_rows.is_empty() {
        return String::new();
    }
    let mut out = String::from(
        "<table class=\"education\"><thead><tr><th>Qualification</th><th>Year</th>\
         <th>College</th><th>University</th><th>CGPA</th><th>Class</th></tr></thead><tbody>",
    );
    for row in &view.education_rows {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&row.qualification),
            escape(&row.year),
            escape(&row.college),
            escape(&row.university),
            escape(&row.cgpa),
            escape(&row.class),
        );
    }
    out.push_str("</tbody></table>");
    out
}

fn section(title: &str, content: &str) -> String {
    format!("<section class=\"section\"><h2>{title}</h2>{content}</section>")
}

fn classic_body(view: &ResumeView) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<main class=\"page\"><header><h1>{} {}</h1><p class=\"contact\">{}</p></header>",
        escape(&view.first_name),
        escape(&view.last_name),
        contact_items(view).join(" &middot; ")
    );
    out.push_str(&section(
        "Career Objective",
        &format!("<p>{}</p>", escape(&view.resume.career_objective)),
    ));
    if !view.education_rows.is_empty() {
        out.push_str(&section("Education", &education_table(view)));
    }
    for (title, items) in view.list_sections() {
        out.push_str(&section(title, &list(items)));
    }
    out.push_str("</main>");
    out
}

fn minimal_body(view: &ResumeView) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<main class=\"page\"><header><h1><span class=\"first\">{}</span> \
         <span class=\"last\">{}</span></h1><p class=\"contact\">{}</p></header>",
        escape(&view.first_name),
        escape(&view.last_name),
        contact_items(view).join(" / ")
    );
    let _ = write!(
        out,
        "<p class=\"objective\">{}</p>",
        escape(&view.resume.career_objective)
    );
    if !view.skills.is_empty() {
        let chips: String = view
            .skills
            .iter()
            .map(|s| format!("<span class=\"chip\">{}</span>", escape(s)))
            .collect();
        out.push_str(&section("Skills", &format!("<div class=\"chips\">{chips}</div>")));
    }
    if !view.education_rows.is_empty() {
        let mut rows = String::new();
        for row in &view.education_rows {
            let _ = write!(
                rows,
                "<div class=\"edu\"><strong>{}</strong> <span>{}</span><br>{}{}{}</div>",
                escape(&row.qualification),
                escape(&row.year),
                escape(&row.college),
                if row.university.is_empty() { "" } else { ", " },
                escape(&row.university),
            );
        }
        out.push_str(&section("Education", &rows));
    }
    for (title, items) in view.list_sections() {
        if title != "Skills" {
            out.push_str(&section(title, &list(items)));
        }
    }
    out.push_str("</main>");
    out
}

fn photo_body(view: &ResumeView) -> String {
    let mut out = String::from("<main class=\"page\"><header class=\"banner\">");
    if let Some(url) = view.photo_url() {
        let _ = write!(
            out,
            "<img class=\"photo\" src=\"{}\" alt=\"{}\">",
            url,
            escape(&view.resume.full_name)
        );
    }
    let _ = write!(
        out,
        "<div><h1>{}<br><strong>{}</strong></h1><p class=\"contact\">{}</p></div></header>",
        escape(&view.first_name),
        escape(&view.last_name),
        contact_items(view).join("<br>")
    );

    out.push_str("<div class=\"columns\"><aside>");
    for (title, items) in [
        ("Skills", &view.skills),
        ("Languages", &view.languages),
        ("Hobbies", &view.hobbies),
    ] {
        if !items.is_empty() {
            out.push_str(&section(title, &list(items)));
        }
    }
    out.push_str("</aside><div class=\"content\">");
    out.push_str(&section(
        "Profile",
        &format!("<p>{}</p>", escape(&view.resume.career_objective)),
    ));
    if !view.education_rows.is_empty() {
        out.push_str(&section("Education", &education_table(view)));
    }
    for (title, items) in [
        ("Projects", &view.projects),
        ("Achievements", &view.achievements),
        ("Certifications", &view.certifications),
    ] {
        if !items.is_empty() {
            out.push_str(&section(title, &list(items)));
        }
    }
    out.push_str("</div></div></main>");
    out
}

// Shared page rules; mirrors the print sizes used by the PDF export.
macro_rules! base_css {
    () => {
        "@page { size: A4; margin: 14mm; } \
        .toolbar { font: 13px sans-serif; padding: 8px; } .toolbar a { margin-right: 12px; } \
        .page { max-width: 800px; margin: 0 auto; line-height: 1.35; font-size: 11pt; } \
        h1 { font-size: 20pt; margin: 0 0 6px 0; } h2 { font-size: 13pt; margin: 12px 0 6px 0; } \
        p, li { margin: 0 0 4px 0; } .section { page-break-inside: avoid; } \
        table.education { border-collapse: collapse; width: 100%; } \
        table.education th, table.education td { text-align: left; padding: 2px 6px; } \
        @media print { .toolbar { display: none; } } "
    };
}

const CLASSIC_CSS: &str = concat!(
    base_css!(),
    "body { font-family: 'Times New Roman', serif; color: #111; } \
    header { text-align: center; border-bottom: 2px solid #111; padding-bottom: 6px; } \
    h2 { text-transform: uppercase; letter-spacing: 1px; border-bottom: 1px solid #999; }"
);

const MINIMAL_CSS: &str = concat!(
    base_css!(),
    "body { font-family: Arial, Helvetica, sans-serif; color: #333; } \
    .first { font-weight: 300; } .last { font-weight: 700; color: #0f766e; } \
    h2 { color: #0f766e; font-weight: 600; } .objective { font-style: italic; } \
    .chip { display: inline-block; border: 1px solid #0f766e; border-radius: 10px; \
    padding: 1px 8px; margin: 0 4px 4px 0; } .edu { margin-bottom: 6px; }"
);

const PHOTO_CSS: &str = concat!(
    base_css!(),
    "body { font-family: Arial, Helvetica, sans-serif; color: #1f2937; } \
    .banner { display: flex; gap: 16px; align-items: center; background: #1e3a5f; \
    color: #fff; padding: 16px; } .banner a { color: #fff; } \
    .photo { width: 96px; height: 96px; border-radius: 50%; object-fit: cover; } \
    .columns { display: flex; gap: 16px; } \
    aside { width: 32%; background: #f1f5f9; padding: 8px; } \
    .content { flex: 1; } h2 { color: #1e3a5f; }"
);

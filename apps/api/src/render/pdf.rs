//! PDF export: draws a `ResumeView` onto A4 pages with the PDF base-14 fonts.
//!
//! Sizes follow the print stylesheet of the HTML preview: 14 mm margins,
//! 11 pt body, 20 pt name, 13 pt section headings, 1.35 line height.
//! Layout is a single flowing column; text is word-wrapped with the static
//! metric tables and spills onto new pages as needed.
//!
//! `printpdf` documents are `!Send`; call `render_pdf` from
//! `tokio::task::spawn_blocking`.

use std::collections::HashMap;

use printpdf::{
    Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Rgb,
};

use super::font_metrics::FontFace;
use super::{RenderError, ResumeView, TemplateKind};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 14.0;
const BODY_PT: f32 = 11.0;
const NAME_PT: f32 = 20.0;
const HEADING_PT: f32 = 13.0;
const LINE_HEIGHT: f32 = 1.35;
const BULLET_INDENT_MM: f32 = 5.0;
const PT_TO_MM: f32 = 25.4 / 72.0;

/// Per-template typography.
struct PdfStyle {
    body: FontFace,
    bold: FontFace,
    accent: (f32, f32, f32),
    uppercase_headings: bool,
    centered_header: bool,
}

fn style_for(template: TemplateKind) -> PdfStyle {
    match template {
        TemplateKind::ProfessionalClassic => PdfStyle {
            body: FontFace::TimesRoman,
            bold: FontFace::TimesBold,
            accent: (0.07, 0.07, 0.07),
            uppercase_headings: true,
            centered_header: true,
        },
        TemplateKind::CreativeMinimal => PdfStyle {
            body: FontFace::Helvetica,
            bold: FontFace::HelveticaBold,
            accent: (0.06, 0.46, 0.43),
            uppercase_headings: false,
            centered_header: false,
        },
        TemplateKind::ModernPhotoStyle => PdfStyle {
            body: FontFace::Helvetica,
            bold: FontFace::HelveticaBold,
            accent: (0.12, 0.23, 0.37),
            uppercase_headings: true,
            centered_header: false,
        },
    }
}

/// Renders the resume to PDF bytes.
pub fn render_pdf(view: &ResumeView) -> Result<Vec<u8>, RenderError> {
    let style = style_for(view.template);
    let title = format!("Resume - {}", view.resume.full_name);
    let mut writer = PdfWriter::new(&title, &style)?;
    let r = &view.resume;

    let name = format!("{} {}", view.first_name, view.last_name);
    writer.header_line(name.trim(), style.bold, NAME_PT, style.accent, style.centered_header);

    let mut contact = vec![r.email.clone(), r.mobile.clone()];
    if !r.linkedin.is_empty() {
        contact.push(r.linkedin.clone());
    }
    writer.header_line(
        &contact.join("  |  "),
        style.body,
        BODY_PT,
        (0.25, 0.25, 0.25),
        style.centered_header,
    );

    let objective_title = match view.template {
        TemplateKind::ModernPhotoStyle => "Profile",
        _ => "Career Objective",
    };
    writer.heading(objective_title, &style);
    writer.paragraph(&r.career_objective, style.body, 0.0);

    let sections = view.list_sections();
    let (leading, trailing): (Vec<_>, Vec<_>) = match view.template {
        // Sidebar content comes first when flattened to one column.
        TemplateKind::ModernPhotoStyle => sections
            .into_iter()
            .partition(|(t, _)| matches!(*t, "Skills" | "Languages")),
        _ => (Vec::new(), sections),
    };

    for (title, items) in &leading {
        writer.heading(title, &style);
        writer.paragraph(&items.join(", "), style.body, 0.0);
    }

    if !view.education_rows.is_empty() {
        writer.heading("Education", &style);
        for row in &view.education_rows {
            let headline = match row.year.trim() {
                "" => row.qualification.clone(),
                year => format!("{} ({year})", row.qualification),
            };
            writer.paragraph(&headline, style.bold, 0.0);

            let institution: Vec<&str> = [row.college.trim(), row.university.trim()]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect();
            let mut grade = Vec::new();
            if !row.cgpa.trim().is_empty() {
                grade.push(format!("CGPA {}", row.cgpa.trim()));
            }
            if !row.class.trim().is_empty() {
                grade.push(row.class.trim().to_string());
            }
            let detail = [institution.join(", "), grade.join(", ")]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("  -  ");
            if !detail.is_empty() {
                writer.paragraph(&detail, style.body, 0.0);
            }
        }
    }

    for (title, items) in &trailing {
        writer.heading(title, &style);
        if view.template == TemplateKind::CreativeMinimal && *title == "Skills" {
            writer.paragraph(&items.join("  /  "), style.body, 0.0);
        } else {
            for item in items.iter() {
                writer.bullet(item, style.body);
            }
        }
    }

    writer.finish()
}

struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: HashMap<FontFace, IndirectFontRef>,
    /// Baseline cursor, measured from the bottom edge.
    y_mm: f32,
    pages: usize,
}

impl PdfWriter {
    fn new(title: &str, style: &PdfStyle) -> Result<Self, RenderError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");

        let mut fonts = HashMap::new();
        for face in [style.body, style.bold] {
            let font = doc
                .add_builtin_font(face.builtin())
                .map_err(|e| RenderError::Pdf(format!("{e:?}")))?;
            fonts.insert(face, font);
        }

        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            fonts,
            y_mm: PAGE_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        })
    }

    fn text_width_mm() -> f32 {
        PAGE_WIDTH_MM - 2.0 * MARGIN_MM
    }

    fn line_advance_mm(size_pt: f32) -> f32 {
        size_pt * LINE_HEIGHT * PT_TO_MM
    }

    /// Moves the cursor down one line, starting a new page if the line would
    /// cross the bottom margin.
    fn advance(&mut self, size_pt: f32) {
        let advance = Self::line_advance_mm(size_pt);
        if self.y_mm - advance < MARGIN_MM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y_mm = PAGE_HEIGHT_MM - MARGIN_MM;
            self.pages += 1;
        }
        self.y_mm -= advance;
    }

    fn draw(&mut self, text: &str, face: FontFace, size_pt: f32, x_mm: f32) {
        if let Some(font) = self.fonts.get(&face) {
            self.layer
                .use_text(text, size_pt, Mm(x_mm), Mm(self.y_mm), font);
        }
    }

    fn set_color(&self, (r, g, b): (f32, f32, f32)) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    }

    fn header_line(
        &mut self,
        text: &str,
        face: FontFace,
        size_pt: f32,
        color: (f32, f32, f32),
        centered: bool,
    ) {
        let max_pt = Self::text_width_mm() / PT_TO_MM;
        for line in face.metrics().wrap(text, size_pt, max_pt) {
            self.advance(size_pt);
            let x = if centered {
                let width_mm = face.metrics().measure_pt(&line, size_pt) * PT_TO_MM;
                MARGIN_MM + ((Self::text_width_mm() - width_mm) / 2.0).max(0.0)
            } else {
                MARGIN_MM
            };
            self.set_color(color);
            self.draw(&line, face, size_pt, x);
        }
        self.set_color((0.0, 0.0, 0.0));
    }

    fn heading(&mut self, title: &str, style: &PdfStyle) {
        let text = if style.uppercase_headings {
            title.to_uppercase()
        } else {
            title.to_string()
        };
        // Half a line of space above, and keep at least one body line with it.
        self.y_mm -= Self::line_advance_mm(BODY_PT) / 2.0;
        if self.y_mm - Self::line_advance_mm(HEADING_PT) - Self::line_advance_mm(BODY_PT)
            < MARGIN_MM
        {
            self.y_mm = MARGIN_MM;
        }
        self.advance(HEADING_PT);
        self.set_color(style.accent);
        self.draw(&text, style.bold, HEADING_PT, MARGIN_MM);
        self.set_color((0.0, 0.0, 0.0));
    }

    fn paragraph(&mut self, text: &str, face: FontFace, indent_mm: f32) {
        let max_pt = (Self::text_width_mm() - indent_mm) / PT_TO_MM;
        for line in face.metrics().wrap(text, BODY_PT, max_pt) {
            self.advance(BODY_PT);
            self.draw(&line, face, BODY_PT, MARGIN_MM + indent_mm);
        }
    }

    fn bullet(&mut self, text: &str, face: FontFace) {
        let max_pt = (Self::text_width_mm() - BULLET_INDENT_MM) / PT_TO_MM;
        for (idx, line) in face.metrics().wrap(text, BODY_PT, max_pt).into_iter().enumerate() {
            self.advance(BODY_PT);
            if idx == 0 {
                self.draw("-", face, BODY_PT, MARGIN_MM + 1.0);
            }
            self.draw(&line, face, BODY_PT, MARGIN_MM + BULLET_INDENT_MM);
        }
    }

    fn finish(self) -> Result<Vec<u8>, RenderError> {
        tracing::debug!("Rendered resume PDF with {} page(s)", self.pages);
        self.doc
            .save_to_bytes()
            .map_err(|e| RenderError::Pdf(format!("{e:?}")))
    }
}

//! PDF composition with lopdf.
//!
//! Lays the rendering context out onto US Letter pages: colored headings,
//! statistic callout boxes, embedded chart images and footer page numbers,
//! all parameterized by the stylesheet.

use crate::{Color, RenderContext, Stylesheet, TemplateRegistry};
use folio_core::{Branding, DocumentContent};
use folio_error::{FolioResult, RenderError, RenderErrorKind};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

/// Composes paginated PDF bytes from document content.
pub struct PdfComposer {
    registry: TemplateRegistry,
}

impl Default for PdfComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfComposer {
    /// Create a composer with the built-in template registry.
    pub fn new() -> Self {
        Self {
            registry: TemplateRegistry::new(),
        }
    }

    /// Create a composer with a custom template registry.
    pub fn with_registry(registry: TemplateRegistry) -> Self {
        Self { registry }
    }

    /// Render a document to PDF bytes.
    ///
    /// The named template is attempted first; an unknown name falls back to
    /// the built-in layout. Returns the bytes and the exact page count.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBranding` for malformed branding colors and
    /// `PdfWrite` if serialization fails.
    #[tracing::instrument(skip(self, content, branding), fields(template = ?template_id, sections = content.sections.len()))]
    pub fn render_pdf(
        &self,
        content: &DocumentContent,
        template_id: Option<&str>,
        branding: &Branding,
    ) -> FolioResult<(Vec<u8>, u32)> {
        let sheet = Stylesheet::from_branding(branding)?;
        let context = self.registry.resolve(template_id).build_context(content);

        let mut layout = Layout::new(&sheet);
        layout.compose(&context);
        let pages = layout.finish();
        let page_count = pages.len() as u32;

        let bytes = assemble(pages, &sheet)?;
        tracing::info!(pages = page_count, size = bytes.len(), "Rendered PDF");
        Ok((bytes, page_count))
    }
}

/// Content stream plus image resources for one page.
struct PageBuffer {
    ops: Vec<Operation>,
    images: Vec<(String, Stream)>,
}

/// Cursor-based single-column layout.
struct Layout<'a> {
    sheet: &'a Stylesheet,
    pages: Vec<PageBuffer>,
    y: f32,
    image_counter: usize,
}

impl<'a> Layout<'a> {
    fn new(sheet: &'a Stylesheet) -> Self {
        let mut layout = Self {
            sheet,
            pages: Vec::new(),
            y: 0.0,
            image_counter: 0,
        };
        layout.new_page();
        layout
    }

    fn compose(&mut self, context: &RenderContext) {
        let sheet = self.sheet;

        // Title block
        self.text_block(&context.title, sheet.title_size, FontFace::Bold, sheet.theme.primary);
        if let Some(subtitle) = &context.subtitle {
            self.space(6.0);
            self.text_block(subtitle, sheet.h2_size, FontFace::Italic, sheet.theme.secondary);
        }
        self.space(10.0);
        self.accent_rule();
        self.space(18.0);

        // Executive summary
        self.heading("Executive Summary");
        self.body(&context.executive_summary);
        self.space(12.0);

        // Callouts up front, where a reader skims
        for callout in &context.callouts {
            self.callout(callout);
            self.space(10.0);
        }

        // Body sections
        for section in &context.sections {
            self.space(8.0);
            self.heading(&section.title);
            if !section.content.is_empty() {
                self.body(&section.content);
            }
            for (subtitle, prose) in &section.subsections {
                self.space(6.0);
                self.subheading(subtitle);
                self.body(prose);
            }
        }

        // Charts between the body and the close
        if !context.charts.is_empty() {
            self.space(8.0);
            self.heading("Key Data");
            for chart in &context.charts {
                self.chart(chart);
            }
        }

        // Conclusion
        self.space(8.0);
        self.heading("Conclusion");
        self.body(&context.conclusion);
        if !context.call_to_action.is_empty() {
            self.space(10.0);
            self.text_block(
                &context.call_to_action,
                self.sheet.h2_size,
                FontFace::BoldItalic,
                self.sheet.theme.accent,
            );
        }
    }

    fn finish(self) -> Vec<PageBuffer> {
        self.pages
    }

    fn new_page(&mut self) {
        let sheet = self.sheet;
        let mut ops = Vec::new();

        // Paint the background when it isn't plain white
        if sheet.theme.background != (Color { r: 255, g: 255, b: 255 }) {
            let (r, g, b) = sheet.theme.background.to_pdf();
            ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
            ops.push(Operation::new(
                "re",
                vec![
                    0f32.into(),
                    0f32.into(),
                    sheet.page_width.into(),
                    sheet.page_height.into(),
                ],
            ));
            ops.push(Operation::new("f", vec![]));
        }

        self.pages.push(PageBuffer {
            ops,
            images: Vec::new(),
        });
        self.y = sheet.page_height - sheet.margin;
    }

    fn ensure_space(&mut self, height: f32) {
        let floor = self.sheet.margin + self.sheet.footer_height;
        if self.y - height < floor {
            self.new_page();
        }
    }

    fn space(&mut self, amount: f32) {
        self.y -= amount;
    }

    fn page(&mut self) -> &mut PageBuffer {
        // A page always exists; the constructor opens one
        self.pages.last_mut().expect("layout always has a page")
    }

    fn heading(&mut self, text: &str) {
        let color = self.sheet.theme.primary;
        let size = self.sheet.h1_size;
        self.ensure_space(self.sheet.line_height(size) + 8.0);
        self.text_block(text, size, FontFace::Bold, color);
        self.space(4.0);
    }

    fn subheading(&mut self, text: &str) {
        let color = self.sheet.theme.secondary;
        let size = self.sheet.h2_size;
        self.ensure_space(self.sheet.line_height(size) + 6.0);
        self.text_block(text, size, FontFace::Bold, color);
        self.space(2.0);
    }

    fn body(&mut self, text: &str) {
        for paragraph in text.split("\n\n").filter(|p| !p.trim().is_empty()) {
            self.text_block(
                paragraph.trim(),
                self.sheet.body_size,
                FontFace::Regular,
                self.sheet.theme.text,
            );
            self.space(6.0);
        }
    }

    /// Wrap and emit one block of text at the current cursor.
    fn text_block(&mut self, text: &str, size: f32, face: FontFace, color: Color) {
        let width = self.sheet.content_width();
        let lines = wrap(text, width, size);
        let line_height = self.sheet.line_height(size);
        let x = self.sheet.margin;

        for line in lines {
            self.ensure_space(line_height);
            self.y -= line_height;
            let y = self.y;
            self.emit_text(&line, x, y, size, face, color);
        }
    }

    fn emit_text(&mut self, text: &str, x: f32, y: f32, size: f32, face: FontFace, color: Color) {
        let (r, g, b) = color.to_pdf();
        let ops = &mut self.page().ops;
        ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new(
            "Tf",
            vec![face.resource_name().into(), size.into()],
        ));
        ops.push(Operation::new("Td", vec![x.into(), y.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(to_latin1(text))],
        ));
        ops.push(Operation::new("ET", vec![]));
    }

    fn accent_rule(&mut self) {
        let (r, g, b) = self.sheet.theme.accent.to_pdf();
        let x = self.sheet.margin;
        self.y -= 4.0;
        let y = self.y;
        let ops = &mut self.page().ops;
        ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        ops.push(Operation::new(
            "re",
            vec![x.into(), y.into(), 120f32.into(), 3f32.into()],
        ));
        ops.push(Operation::new("f", vec![]));
    }

    fn callout(&mut self, callout: &crate::Callout) {
        let sheet = self.sheet;
        let width = sheet.content_width();
        let pad = 10.0;
        let inner_width = width - 2.0 * pad - 4.0;

        let secondary_lines = wrap(&callout.secondary, inner_width, sheet.body_size);
        let mut height = pad * 2.0
            + sheet.line_height(sheet.h1_size)
            + secondary_lines.len() as f32 * sheet.line_height(sheet.body_size);
        if callout.attribution.is_some() {
            height += sheet.line_height(sheet.small_size);
        }

        self.ensure_space(height + 4.0);
        let x = sheet.margin;
        let top = self.y;
        let bottom = top - height;

        // Tinted box with a solid accent bar on the left edge
        let tint = sheet.theme.accent.tint(0.88);
        let (r, g, b) = tint.to_pdf();
        let (ar, ag, ab) = sheet.theme.accent.to_pdf();
        {
            let ops = &mut self.page().ops;
            ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
            ops.push(Operation::new(
                "re",
                vec![x.into(), bottom.into(), width.into(), height.into()],
            ));
            ops.push(Operation::new("f", vec![]));
            ops.push(Operation::new("rg", vec![ar.into(), ag.into(), ab.into()]));
            ops.push(Operation::new(
                "re",
                vec![x.into(), bottom.into(), 4f32.into(), height.into()],
            ));
            ops.push(Operation::new("f", vec![]));
        }

        let text_x = x + 4.0 + pad;
        let mut cursor = top - pad - sheet.h1_size;
        self.emit_text(
            &callout.primary,
            text_x,
            cursor,
            sheet.h1_size,
            FontFace::Bold,
            sheet.theme.primary,
        );
        cursor -= sheet.line_height(sheet.h1_size) - sheet.h1_size;

        for line in &secondary_lines {
            cursor -= sheet.line_height(sheet.body_size);
            self.emit_text(
                line,
                text_x,
                cursor,
                sheet.body_size,
                FontFace::Regular,
                sheet.theme.text,
            );
        }

        if let Some(attribution) = &callout.attribution {
            cursor -= self.sheet.line_height(self.sheet.small_size);
            let gray = Color { r: 110, g: 110, b: 110 };
            self.emit_text(
                &format!("Source: {}", attribution),
                text_x,
                cursor,
                self.sheet.small_size,
                FontFace::Italic,
                gray,
            );
        }

        self.y = bottom;
    }

    fn chart(&mut self, chart: &crate::ChartImage) {
        let stream = match lopdf::xobject::image_from(chart.bytes.clone()) {
            Ok(stream) => stream,
            Err(e) => {
                // A bad image drops the chart, never the document
                tracing::warn!(title = %chart.title, error = %e, "Failed to embed chart, skipping");
                return;
            }
        };

        let px_width = stream
            .dict
            .get(b"Width")
            .and_then(|o| o.as_i64())
            .unwrap_or(800) as f32;
        let px_height = stream
            .dict
            .get(b"Height")
            .and_then(|o| o.as_i64())
            .unwrap_or(500) as f32;

        let sheet = self.sheet;
        let draw_width = sheet.content_width() * 0.85;
        let draw_height = draw_width * px_height / px_width;
        let caption_height = sheet.line_height(sheet.small_size);

        self.ensure_space(draw_height + caption_height + 14.0);
        self.space(8.0);
        self.y -= draw_height;
        let x = sheet.margin + (sheet.content_width() - draw_width) / 2.0;
        let y = self.y;

        self.image_counter += 1;
        let name = format!("Im{}", self.image_counter);
        {
            let page = self.page();
            page.images.push((name.clone(), stream));
            page.ops.push(Operation::new("q", vec![]));
            page.ops.push(Operation::new(
                "cm",
                vec![
                    draw_width.into(),
                    0f32.into(),
                    0f32.into(),
                    draw_height.into(),
                    x.into(),
                    y.into(),
                ],
            ));
            page.ops
                .push(Operation::new("Do", vec![Object::Name(name.into_bytes())]));
            page.ops.push(Operation::new("Q", vec![]));
        }

        self.y -= caption_height;
        let gray = Color { r: 110, g: 110, b: 110 };
        let caption_y = self.y;
        self.emit_text(
            &chart.title,
            sheet.margin,
            caption_y,
            sheet.small_size,
            FontFace::Italic,
            gray,
        );
        self.space(6.0);
    }
}

/// Standard Type1 faces mapped from the theme's font family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FontFace {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontFace {
    fn resource_name(&self) -> &'static str {
        match self {
            FontFace::Regular => "F1",
            FontFace::Bold => "F2",
            FontFace::Italic => "F3",
            FontFace::BoldItalic => "F4",
        }
    }
}

/// Base font names for the configured family within the standard 14 fonts.
fn base_fonts(family: &str) -> [&'static str; 4] {
    let family = family.to_ascii_lowercase();
    if family.contains("times") || family.contains("georgia") || family.contains("serif") {
        ["Times-Roman", "Times-Bold", "Times-Italic", "Times-BoldItalic"]
    } else if family.contains("courier") || family.contains("mono") {
        [
            "Courier",
            "Courier-Bold",
            "Courier-Oblique",
            "Courier-BoldOblique",
        ]
    } else {
        [
            "Helvetica",
            "Helvetica-Bold",
            "Helvetica-Oblique",
            "Helvetica-BoldOblique",
        ]
    }
}

/// Approximate greedy word wrap for the standard faces.
fn wrap(text: &str, width: f32, font_size: f32) -> Vec<String> {
    let max_chars = ((width / (font_size * 0.5)).floor() as usize).max(8);
    let mut lines = Vec::new();

    for raw_line in text.lines() {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(current);
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Approximate Latin-1 bytes for PDF literal strings.
fn to_latin1(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{2018}' | '\u{2019}' => bytes.push(b'\''),
            '\u{201c}' | '\u{201d}' => bytes.push(b'"'),
            '\u{2013}' | '\u{2014}' => bytes.push(b'-'),
            '\u{2026}' => bytes.extend_from_slice(b"..."),
            c if (c as u32) < 256 => bytes.push(c as u8),
            _ => bytes.push(b'?'),
        }
    }
    bytes
}

/// Assemble page buffers into the final document.
fn assemble(pages: Vec<PageBuffer>, sheet: &Stylesheet) -> FolioResult<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let faces = base_fonts(&sheet.theme.font_family);
    let font_ids: Vec<_> = faces
        .iter()
        .map(|base| {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => *base,
            })
        })
        .collect();

    let total = pages.len();
    let mut kids: Vec<Object> = Vec::with_capacity(total);

    for (index, mut page) in pages.into_iter().enumerate() {
        append_footer(&mut page.ops, sheet, index + 1, total);

        let content = Content {
            operations: page.ops,
        };
        let data = content
            .encode()
            .map_err(|e| RenderError::new(RenderErrorKind::PdfWrite(e.to_string())))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, data));

        let mut fonts = Dictionary::new();
        for (face, id) in ["F1", "F2", "F3", "F4"].iter().zip(&font_ids) {
            fonts.set(face.as_bytes(), Object::Reference(*id));
        }
        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(fonts));

        if !page.images.is_empty() {
            let mut xobjects = Dictionary::new();
            for (name, stream) in page.images {
                let id = doc.add_object(stream);
                xobjects.set(name.into_bytes(), Object::Reference(id));
            }
            resources.set("XObject", Object::Dictionary(xobjects));
        }

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![
                0f32.into(),
                0f32.into(),
                sheet.page_width.into(),
                sheet.page_height.into(),
            ],
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Dictionary(resources),
        });
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total as i64,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::new(RenderErrorKind::PdfWrite(e.to_string())))?;
    Ok(bytes)
}

fn append_footer(ops: &mut Vec<Operation>, sheet: &Stylesheet, number: usize, total: usize) {
    let text = format!("Page {} of {}", number, total);
    let size = sheet.small_size;
    let approx_width = text.chars().count() as f32 * size * 0.5;
    let x = (sheet.page_width - approx_width) / 2.0;
    let y = sheet.margin / 2.0;

    ops.push(Operation::new(
        "rg",
        vec![0.43f32.into(), 0.43f32.into(), 0.43f32.into()],
    ));
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec!["F1".into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal(to_latin1(&text))],
    ));
    ops.push(Operation::new("ET", vec![]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::{Conclusion, Section, Statistic, Subsection};

    fn sample_content() -> DocumentContent {
        DocumentContent {
            title: "The Future of Remote Work".to_string(),
            subtitle: Some("A field guide".to_string()),
            executive_summary: "Remote work reshaped knowledge work. ".repeat(20),
            sections: vec![
                Section {
                    id: "s1".to_string(),
                    title: "Where We Are".to_string(),
                    content: "Teams settled into hybrid patterns. ".repeat(40),
                    subsections: vec![],
                },
                Section {
                    id: "s2".to_string(),
                    title: "What Comes Next".to_string(),
                    content: String::new(),
                    subsections: vec![Subsection {
                        id: "s2-1".to_string(),
                        title: "Tooling".to_string(),
                        content: "Asynchronous collaboration keeps growing. ".repeat(30),
                    }],
                },
            ],
            conclusion: Conclusion {
                content: "The shift is permanent. ".repeat(10),
                call_to_action: "Talk to us about your remote strategy.".to_string(),
            },
            statistics: vec![Statistic {
                value: "73%".to_string(),
                context: "of employers plan to keep hybrid schedules".to_string(),
                source: Some("Workforce Survey 2026".to_string()),
                category: Some("adoption".to_string()),
                highlight_worthy: true,
                visualization_type: Some("percentage".to_string()),
            }],
            charts: vec![],
        }
    }

    #[test]
    fn test_render_produces_pdf_magic_and_pages() {
        let composer = PdfComposer::new();
        let (bytes, pages) = composer
            .render_pdf(&sample_content(), None, &Branding::default())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(pages >= 1);
    }

    #[test]
    fn test_unknown_template_still_renders() {
        let composer = PdfComposer::new();
        let (bytes, _) = composer
            .render_pdf(&sample_content(), Some("missing-template"), &Branding::default())
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_bad_branding_color_is_rejected() {
        let composer = PdfComposer::new();
        let branding = Branding {
            primary_color: Some("not-a-color".to_string()),
            ..Branding::default()
        };
        assert!(composer
            .render_pdf(&sample_content(), None, &branding)
            .is_err());
    }

    #[test]
    fn test_wrap_respects_line_budget() {
        let lines = wrap(&"word ".repeat(100), 200.0, 10.0);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= 40));
    }
}

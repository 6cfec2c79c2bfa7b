//! Chart rasterization.

use crate::ChartStyle;
use ab_glyph::{FontVec, PxScale};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use folio_core::{Chart, ChartType, MediaSource, VisualizationSuggestion};
use folio_error::{ChartError, ChartErrorKind, FolioResult};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
    draw_polygon_mut, draw_text_mut, text_size,
};
use imageproc::point::Point;
use imageproc::rect::Rect;
use std::f64::consts::TAU;
use std::path::Path;

/// At most this many chart suggestions are rendered per document.
pub const MAX_RENDERED_CHARTS: usize = 3;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const AXIS_GRAY: Rgba<u8> = Rgba([70, 70, 70, 255]);
const LABEL_GRAY: Rgba<u8> = Rgba([40, 40, 40, 255]);
const BORDER_GRAY: Rgba<u8> = Rgba([180, 180, 180, 255]);

/// Well-known font locations tried when no explicit font is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
];

/// Data series for a single chart.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartData {
    /// Category labels, parallel to `values`
    pub labels: Vec<String>,
    /// Numeric values, parallel to `labels`
    pub values: Vec<f64>,
}

impl ChartData {
    /// Create a data series.
    pub fn new(labels: Vec<String>, values: Vec<f64>) -> Self {
        Self { labels, values }
    }

    /// Whether there is nothing to plot.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.values.is_empty()
    }
}

/// Renders chart PNGs with a white background and annotated values.
///
/// Text labels require a TTF font. The renderer looks for one at well-known
/// system locations (or uses [`ChartRenderer::with_font_file`]); when none is
/// available charts still render with geometry only.
pub struct ChartRenderer {
    font: Option<FontVec>,
}

impl Default for ChartRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartRenderer {
    /// Create a renderer, picking up a label font from well-known locations.
    pub fn new() -> Self {
        let font = FONT_CANDIDATES.iter().find_map(|path| {
            let data = std::fs::read(path).ok()?;
            FontVec::try_from_vec(data).ok()
        });
        if font.is_none() {
            tracing::warn!("No label font found; charts will render without text");
        }
        Self { font }
    }

    /// Create a renderer with an explicit font file.
    ///
    /// # Errors
    ///
    /// Returns `FontLoad` if the file cannot be read or parsed.
    pub fn with_font_file(path: impl AsRef<Path>) -> FolioResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            ChartError::new(ChartErrorKind::FontLoad(format!("{}: {}", path.display(), e)))
        })?;
        let font = FontVec::try_from_vec(data).map_err(|e| {
            ChartError::new(ChartErrorKind::FontLoad(format!("{}: {}", path.display(), e)))
        })?;
        Ok(Self { font: Some(font) })
    }

    /// Generate a chart PNG.
    ///
    /// Unrecognized combinations never fail: empty data renders a
    /// "No data available" placeholder, and mismatched label/value lengths
    /// are trimmed to the shorter side.
    ///
    /// # Errors
    ///
    /// Returns `Encoding` only if PNG serialization itself fails.
    #[tracing::instrument(skip(self, data, style), fields(chart_type = %chart_type, points = data.values.len()))]
    pub fn generate_chart(
        &self,
        chart_type: ChartType,
        data: &ChartData,
        style: &ChartStyle,
    ) -> FolioResult<Vec<u8>> {
        let mut img = RgbaImage::from_pixel(*style.width(), *style.height(), WHITE);

        if data.is_empty() {
            tracing::debug!("Empty chart data, rendering placeholder");
            self.draw_placeholder(&mut img, style);
            return encode_png(img);
        }

        let count = data.labels.len().min(data.values.len());
        let labels = &data.labels[..count];
        let values = &data.values[..count];

        let top = self.draw_title(&mut img, style);

        match chart_type {
            ChartType::Bar => self.draw_bars(&mut img, labels, values, style, top),
            ChartType::HorizontalBar => {
                self.draw_horizontal_bars(&mut img, labels, values, style, top)
            }
            ChartType::Line => self.draw_line_chart(&mut img, labels, values, style, top),
            ChartType::Pie => self.draw_pie(&mut img, values, style, top, false),
            ChartType::Donut => self.draw_pie(&mut img, values, style, top, true),
        }

        encode_png(img)
    }

    /// Render the first [`MAX_RENDERED_CHARTS`] chart suggestions.
    ///
    /// Callout suggestions are skipped (they surface as styled text in the
    /// PDF); failed renders are logged and dropped rather than failing the
    /// stage.
    #[tracing::instrument(skip(self, suggestions, style), fields(suggestion_count = suggestions.len()))]
    pub fn render_suggestions(
        &self,
        suggestions: &[VisualizationSuggestion],
        style: &ChartStyle,
    ) -> Vec<Chart> {
        let mut charts = Vec::new();
        for suggestion in suggestions.iter().filter(|s| s.is_chart()) {
            if charts.len() >= MAX_RENDERED_CHARTS {
                break;
            }
            let chart_type = match suggestion.kind {
                folio_core::SuggestionKind::Chart(chart_type) => chart_type,
                folio_core::SuggestionKind::Callout => continue,
            };
            let data = ChartData::new(suggestion.labels.clone(), suggestion.values.clone());
            let chart_style = style.clone().with_title(suggestion.title.clone());

            match self.generate_chart(chart_type, &data, &chart_style) {
                Ok(bytes) => {
                    tracing::info!(
                        title = %suggestion.title,
                        chart_type = %chart_type,
                        size = bytes.len(),
                        "Rendered chart"
                    );
                    charts.push(Chart {
                        chart_type,
                        title: suggestion.title.clone(),
                        image: MediaSource::Base64(STANDARD.encode(&bytes)),
                    });
                }
                Err(e) => {
                    tracing::warn!(title = %suggestion.title, error = %e, "Chart render failed, skipping");
                }
            }
        }
        charts
    }

    /// Draw the title and return the y offset where the plot area starts.
    fn draw_title(&self, img: &mut RgbaImage, style: &ChartStyle) -> u32 {
        let Some(title) = style.title() else {
            return 30;
        };
        let Some(font) = &self.font else {
            return 30;
        };
        let scale = PxScale::from(style.font_size() * 1.3);
        let (text_w, _) = text_size(scale, font, title);
        let x = ((img.width() as i64 - text_w as i64) / 2).max(0) as i32;
        draw_text_mut(img, LABEL_GRAY, x, 12, scale, font, title);
        50
    }

    fn draw_text_centered(
        &self,
        img: &mut RgbaImage,
        text: &str,
        center_x: i32,
        y: i32,
        scale: PxScale,
        color: Rgba<u8>,
    ) {
        if let Some(font) = &self.font {
            let (text_w, _) = text_size(scale, font, text);
            draw_text_mut(img, color, center_x - (text_w as i32) / 2, y, scale, font, text);
        }
    }

    fn draw_bars(
        &self,
        img: &mut RgbaImage,
        labels: &[String],
        values: &[f64],
        style: &ChartStyle,
        top: u32,
    ) {
        let (w, h) = (img.width() as f64, img.height() as f64);
        let (left, right, bottom) = (60.0, 25.0, 45.0);
        let plot_w = w - left - right;
        let plot_h = h - top as f64 - bottom;
        let baseline = h - bottom;

        let max_v = values.iter().cloned().fold(0.0_f64, f64::max).max(1e-9);
        let slot = plot_w / values.len() as f64;
        let bar_w = (slot * 0.7).max(1.0);
        let scale = PxScale::from(style.font_size() * 0.8);

        for (i, (label, &value)) in labels.iter().zip(values).enumerate() {
            let bar_h = ((value.max(0.0) / max_v) * plot_h).round();
            let x = left + i as f64 * slot + (slot - bar_w) / 2.0;
            let y = baseline - bar_h;

            if bar_h >= 1.0 {
                draw_filled_rect_mut(
                    img,
                    Rect::at(x as i32, y as i32).of_size(bar_w as u32, bar_h as u32),
                    style.color(i),
                );
            }

            let center_x = (x + bar_w / 2.0) as i32;
            self.draw_text_centered(
                img,
                &format_value(value),
                center_x,
                (y - *style.font_size() as f64 - 4.0) as i32,
                scale,
                LABEL_GRAY,
            );
            self.draw_text_centered(
                img,
                &truncate_label(label, 12),
                center_x,
                (baseline + 8.0) as i32,
                scale,
                LABEL_GRAY,
            );
        }

        self.draw_axes(img, left, top as f64, baseline, w - right);
    }

    fn draw_horizontal_bars(
        &self,
        img: &mut RgbaImage,
        labels: &[String],
        values: &[f64],
        style: &ChartStyle,
        top: u32,
    ) {
        let (w, h) = (img.width() as f64, img.height() as f64);
        let (left, right, bottom) = (140.0, 70.0, 25.0);
        let plot_w = w - left - right;
        let plot_h = h - top as f64 - bottom;

        let max_v = values.iter().cloned().fold(0.0_f64, f64::max).max(1e-9);
        let slot = plot_h / values.len() as f64;
        let bar_h = (slot * 0.7).max(1.0);
        let scale = PxScale::from(style.font_size() * 0.8);

        for (i, (label, &value)) in labels.iter().zip(values).enumerate() {
            let bar_w = ((value.max(0.0) / max_v) * plot_w).round();
            let y = top as f64 + i as f64 * slot + (slot - bar_h) / 2.0;

            if bar_w >= 1.0 {
                draw_filled_rect_mut(
                    img,
                    Rect::at(left as i32, y as i32).of_size(bar_w as u32, bar_h as u32),
                    style.color(i),
                );
            }

            if let Some(font) = &self.font {
                let label = truncate_label(label, 16);
                let (text_w, text_h) = text_size(scale, font, &label);
                draw_text_mut(
                    img,
                    LABEL_GRAY,
                    (left - text_w as f64 - 8.0) as i32,
                    (y + bar_h / 2.0 - text_h as f64 / 2.0) as i32,
                    scale,
                    font,
                    &label,
                );
                draw_text_mut(
                    img,
                    LABEL_GRAY,
                    (left + bar_w + 6.0) as i32,
                    (y + bar_h / 2.0 - text_h as f64 / 2.0) as i32,
                    scale,
                    font,
                    &format_value(value),
                );
            }
        }

        self.draw_axes(img, left, top as f64, h - bottom, w - right);
    }

    fn draw_line_chart(
        &self,
        img: &mut RgbaImage,
        labels: &[String],
        values: &[f64],
        style: &ChartStyle,
        top: u32,
    ) {
        let (w, h) = (img.width() as f64, img.height() as f64);
        let (left, right, bottom) = (60.0, 25.0, 45.0);
        let plot_w = w - left - right;
        let plot_h = h - top as f64 - bottom;
        let baseline = h - bottom;

        let max_v = values.iter().cloned().fold(0.0_f64, f64::max).max(1e-9);
        let slot = plot_w / values.len() as f64;
        let color = style.color(0);
        let scale = PxScale::from(style.font_size() * 0.8);

        let points: Vec<(f32, f32)> = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let x = left + i as f64 * slot + slot / 2.0;
                let y = baseline - (value.max(0.0) / max_v) * plot_h;
                (x as f32, y as f32)
            })
            .collect();

        for pair in points.windows(2) {
            draw_line_segment_mut(img, pair[0], pair[1], color);
        }
        for (i, &(x, y)) in points.iter().enumerate() {
            draw_filled_circle_mut(img, (x as i32, y as i32), 4, color);
            self.draw_text_centered(
                img,
                &format_value(values[i]),
                x as i32,
                (y - style.font_size() * 0.8 - 6.0) as i32,
                scale,
                LABEL_GRAY,
            );
            self.draw_text_centered(
                img,
                &truncate_label(&labels[i], 12),
                x as i32,
                (baseline + 8.0) as i32,
                scale,
                LABEL_GRAY,
            );
        }

        self.draw_axes(img, left, top as f64, baseline, w - right);
    }

    fn draw_pie(
        &self,
        img: &mut RgbaImage,
        values: &[f64],
        style: &ChartStyle,
        top: u32,
        donut: bool,
    ) {
        let (w, h) = (img.width() as f64, img.height() as f64);
        let center = (w / 2.0, (h + top as f64) / 2.0);
        let radius = ((h - top as f64).min(w) / 2.0 - 30.0).max(10.0);

        let total: f64 = values.iter().filter(|v| **v > 0.0).sum();
        if total <= 0.0 {
            self.draw_placeholder(img, style);
            return;
        }

        // Slices start at 12 o'clock and sweep clockwise
        let mut angle = -TAU / 4.0;
        let scale = PxScale::from(style.font_size() * 0.8);
        let mut label_positions = Vec::new();

        for (i, &value) in values.iter().enumerate() {
            if value <= 0.0 {
                continue;
            }
            let sweep = value / total * TAU;
            let steps = ((sweep / 0.02).ceil() as usize).max(2);

            let mut polygon: Vec<Point<i32>> =
                vec![Point::new(center.0 as i32, center.1 as i32)];
            for step in 0..=steps {
                let a = angle + sweep * step as f64 / steps as f64;
                let point = Point::new(
                    (center.0 + radius * a.cos()) as i32,
                    (center.1 + radius * a.sin()) as i32,
                );
                if polygon.last() != Some(&point) {
                    polygon.push(point);
                }
            }
            if polygon.first() == polygon.last() {
                polygon.pop();
            }
            if polygon.len() >= 3 {
                draw_polygon_mut(img, &polygon, style.color(i));
            }

            let mid = angle + sweep / 2.0;
            let percent = value / total * 100.0;
            label_positions.push((mid, format!("{:.0}%", percent)));
            angle += sweep;
        }

        // Hollow center creates the ring effect
        if donut {
            draw_filled_circle_mut(
                img,
                (center.0 as i32, center.1 as i32),
                (radius / 2.0) as i32,
                WHITE,
            );
        }

        let label_radius = if donut { radius * 0.78 } else { radius * 0.65 };
        for (mid, text) in label_positions {
            let x = center.0 + label_radius * mid.cos();
            let y = center.1 + label_radius * mid.sin();
            self.draw_text_centered(
                img,
                &text,
                x as i32,
                (y - *style.font_size() as f64 * 0.4) as i32,
                scale,
                WHITE,
            );
        }
    }

    fn draw_axes(&self, img: &mut RgbaImage, left: f64, top: f64, bottom: f64, right: f64) {
        draw_line_segment_mut(
            img,
            (left as f32, top as f32),
            (left as f32, bottom as f32),
            AXIS_GRAY,
        );
        draw_line_segment_mut(
            img,
            (left as f32, bottom as f32),
            (right as f32, bottom as f32),
            AXIS_GRAY,
        );
    }

    fn draw_placeholder(&self, img: &mut RgbaImage, style: &ChartStyle) {
        let (w, h) = (img.width(), img.height());
        draw_hollow_rect_mut(
            img,
            Rect::at(10, 10).of_size(w.saturating_sub(20).max(1), h.saturating_sub(20).max(1)),
            BORDER_GRAY,
        );

        if self.font.is_some() {
            let scale = PxScale::from(style.font_size() * 1.2);
            self.draw_text_centered(
                img,
                "No data available",
                (w / 2) as i32,
                (h / 2) as i32 - *style.font_size() as i32,
                scale,
                BORDER_GRAY,
            );
        } else {
            // No font: mark the empty state with diagonals
            draw_line_segment_mut(
                img,
                (10.0, 10.0),
                ((w - 10) as f32, (h - 10) as f32),
                BORDER_GRAY,
            );
            draw_line_segment_mut(
                img,
                ((w - 10) as f32, 10.0),
                (10.0, (h - 10) as f32),
                BORDER_GRAY,
            );
        }
    }
}

fn encode_png(img: RgbaImage) -> FolioResult<Vec<u8>> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| ChartError::new(ChartErrorKind::Encoding(e.to_string())))?;
    Ok(bytes)
}

fn format_value(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let truncated: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", truncated)
    }
}

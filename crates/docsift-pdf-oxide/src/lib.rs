use std::path::Path;

use pdf_oxide::document::PdfDocument;
use pdf_oxide::layout::TextSpan;

use docsift_core::{BackendError, PdfBackend, RawLine};

/// US-Letter width in points, the floor for page-width estimation when a
/// page carries no usable geometry.
const DEFAULT_PAGE_WIDTH: f32 = 612.0;

/// pdf_oxide-based implementation of [`PdfBackend`].
///
/// This crate is the sole pdf_oxide island — it isolates span-level PDF
/// geometry so the structural pipeline stays backend-agnostic. Spans sharing
/// a baseline (within the line tolerance) are assembled into one line; the
/// line inherits the maximum span size, the first span's style flags and
/// left edge, matching how layout-aware PDF readers report lines.
pub struct OxideBackend {
    /// |x-offset − page_width/2| below this counts as centered (points).
    centering_tolerance: f32,
    /// Spans whose vertical positions differ by at most this share a line.
    line_tolerance: f32,
}

impl Default for OxideBackend {
    fn default() -> Self {
        Self {
            centering_tolerance: 50.0,
            line_tolerance: 1.0,
        }
    }
}

impl OxideBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the centered-detection tolerance in points.
    pub fn with_centering_tolerance(mut self, tolerance: f32) -> Self {
        self.centering_tolerance = tolerance;
        self
    }

    /// Set the baseline tolerance for grouping spans into lines.
    pub fn with_line_tolerance(mut self, tolerance: f32) -> Self {
        self.line_tolerance = tolerance;
        self
    }
}

impl PdfBackend for OxideBackend {
    fn extract_lines(&self, path: &Path) -> Result<Vec<RawLine>, BackendError> {
        let mut document =
            PdfDocument::open(path).map_err(|e| BackendError::Open(e.to_string()))?;
        let page_count = document
            .page_count()
            .map_err(|e| BackendError::Extraction(e.to_string()))?;

        let mut lines = Vec::new();
        for page_index in 0..page_count {
            let spans = document
                .extract_spans(page_index)
                .map_err(|e| BackendError::Extraction(e.to_string()))?;
            let geoms: Vec<SpanGeom> = spans.iter().map(SpanGeom::from_span).collect();
            lines.extend(assemble_lines(
                geoms,
                page_index as u32 + 1,
                self.line_tolerance,
                self.centering_tolerance,
            ));
        }

        Ok(lines)
    }
}

/// The slice of span data line assembly needs.
#[derive(Debug, Clone)]
struct SpanGeom {
    text: String,
    x: f32,
    y: f32,
    width: f32,
    font_size: f32,
    is_bold: bool,
    is_italic: bool,
    sequence: usize,
}

impl SpanGeom {
    fn from_span(span: &TextSpan) -> Self {
        let upper_name = span.font_name.to_uppercase();
        Self {
            text: span.text.clone(),
            x: span.bbox.x,
            y: span.bbox.y,
            width: span.bbox.width,
            font_size: span.font_size,
            is_bold: span.font_weight.is_bold() || upper_name.contains("BOLD"),
            is_italic: span.is_italic
                || upper_name.contains("ITALIC")
                || upper_name.contains("OBLIQUE"),
            sequence: span.sequence,
        }
    }
}

/// Assemble page spans into reading-order lines.
///
/// Spans are ordered vertically (extraction sequence as tie-breaker), grouped
/// by baseline proximity, then each group is ordered left to right. The line
/// text joins trimmed span texts with single spaces, the way dictionary-style
/// PDF readers render a line from its spans.
fn assemble_lines(
    mut spans: Vec<SpanGeom>,
    page: u32,
    line_tolerance: f32,
    centering_tolerance: f32,
) -> Vec<RawLine> {
    spans.retain(|s| !s.text.trim().is_empty());
    if spans.is_empty() {
        return Vec::new();
    }

    let page_width = spans
        .iter()
        .map(|s| s.x + s.width)
        .fold(DEFAULT_PAGE_WIDTH, f32::max);

    spans.sort_by(|a, b| {
        a.y.partial_cmp(&b.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.sequence.cmp(&b.sequence))
    });

    let mut groups: Vec<Vec<SpanGeom>> = Vec::new();
    for span in spans {
        match groups.last_mut() {
            Some(group) if (span.y - group[0].y).abs() <= line_tolerance => group.push(span),
            _ => groups.push(vec![span]),
        }
    }

    groups
        .into_iter()
        .map(|mut group| {
            group.sort_by(|a, b| {
                a.x.partial_cmp(&b.x)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then(a.sequence.cmp(&b.sequence))
            });

            let text = group
                .iter()
                .map(|s| s.text.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
            let font_size = group
                .iter()
                .map(|s| s.font_size)
                .fold(f32::MIN, f32::max);
            let first = &group[0];

            RawLine {
                text,
                page,
                font_size,
                is_bold: first.is_bold,
                is_italic: first.is_italic,
                is_centered: (first.x - page_width / 2.0).abs() < centering_tolerance,
                x_offset: first.x,
            }
        })
        .collect()
}

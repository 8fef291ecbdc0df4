use docsift_core::{Heading, StructuralLabel};

use crate::config::ExtractionConfig;

/// In-progress heading being grown line by line.
#[derive(Debug, Clone)]
struct Accumulator {
    text: String,
    /// Size of the first merged line; later lines are compared against it.
    font_size: f32,
    page: u32,
}

/// Aggregator state: idle, or growing a multi-line heading.
#[derive(Debug, Clone)]
enum State {
    Empty,
    Accumulating(Accumulator),
}

/// Merges consecutive classified heading lines into section headings.
///
/// PDFs carry no semantic markup, so a title wrapped across physical lines
/// is only recoverable from continuity heuristics: same page, and font size
/// within the merge tolerance of the line that opened the heading. Any
/// discontinuity flushes the accumulator and starts a new heading.
pub struct HeadingAggregator {
    document: String,
    font_size_threshold: f32,
    merge_size_tolerance: f32,
    state: State,
    headings: Vec<Heading>,
}

impl HeadingAggregator {
    pub fn new(document: impl Into<String>, config: &ExtractionConfig) -> Self {
        Self {
            document: document.into(),
            font_size_threshold: config.font_size_threshold(),
            merge_size_tolerance: config.merge_size_tolerance(),
            state: State::Empty,
            headings: Vec::new(),
        }
    }

    /// Feed one classified line, in document order.
    ///
    /// Non-heading lines and headings below the font-size threshold leave
    /// the accumulator untouched: a heading interrupted by body text stays
    /// open until a non-mergeable heading line or end of document closes it.
    pub fn observe(&mut self, text: &str, label: &StructuralLabel, font_size: f32, page: u32) {
        if !label.is_heading() || font_size < self.font_size_threshold {
            return;
        }

        match &mut self.state {
            State::Accumulating(acc)
                if acc.page == page
                    && (acc.font_size - font_size).abs() <= self.merge_size_tolerance =>
            {
                acc.text.push(' ');
                acc.text.push_str(text);
            }
            _ => {
                self.flush();
                self.state = State::Accumulating(Accumulator {
                    text: text.to_string(),
                    font_size,
                    page,
                });
            }
        }
    }

    /// Finalize any in-progress heading.
    pub fn flush(&mut self) {
        if let State::Accumulating(acc) = std::mem::replace(&mut self.state, State::Empty) {
            self.headings.push(Heading {
                document: self.document.clone(),
                section_title: acc.text.trim().to_string(),
                page_number: acc.page,
            });
        }
    }

    /// Flush and return every finalized heading, consuming the aggregator.
    pub fn finish(mut self) -> Vec<Heading> {
        self.flush();
        self.headings
    }
}

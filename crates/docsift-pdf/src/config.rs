use thiserror::Error;

/// Configuration for the per-document extraction pipeline.
///
/// The thresholds are tied to PDF point space and were tuned against real
/// document sets; override them only for unusual coordinate systems.
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Classified lines below this font size are never treated as headings.
    pub(crate) font_size_threshold: f32,
    /// Consecutive heading lines whose sizes differ by at most this merge
    /// into one multi-line title.
    pub(crate) merge_size_tolerance: f32,
    /// Lines whose trimmed text is shorter than this are dropped before
    /// feature extraction.
    pub(crate) min_line_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            font_size_threshold: 14.0,
            merge_size_tolerance: 0.5,
            min_line_chars: 4,
        }
    }
}

impl ExtractionConfig {
    pub fn font_size_threshold(&self) -> f32 {
        self.font_size_threshold
    }

    pub fn merge_size_tolerance(&self) -> f32 {
        self.merge_size_tolerance
    }

    pub fn min_line_chars(&self) -> usize {
        self.min_line_chars
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid extraction config: {0}")]
    Invalid(String),
}

/// Builder for [`ExtractionConfig`]. Fails fast on out-of-range values.
#[derive(Debug, Clone, Default)]
pub struct ExtractionConfigBuilder {
    font_size_threshold: Option<f32>,
    merge_size_tolerance: Option<f32>,
    min_line_chars: Option<usize>,
}

impl ExtractionConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn font_size_threshold(mut self, threshold: f32) -> Self {
        self.font_size_threshold = Some(threshold);
        self
    }

    pub fn merge_size_tolerance(mut self, tolerance: f32) -> Self {
        self.merge_size_tolerance = Some(tolerance);
        self
    }

    pub fn min_line_chars(mut self, chars: usize) -> Self {
        self.min_line_chars = Some(chars);
        self
    }

    pub fn build(self) -> Result<ExtractionConfig, ConfigError> {
        let defaults = ExtractionConfig::default();
        let config = ExtractionConfig {
            font_size_threshold: self.font_size_threshold.unwrap_or(defaults.font_size_threshold),
            merge_size_tolerance: self
                .merge_size_tolerance
                .unwrap_or(defaults.merge_size_tolerance),
            min_line_chars: self.min_line_chars.unwrap_or(defaults.min_line_chars),
        };

        if !config.font_size_threshold.is_finite() || config.font_size_threshold < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "font_size_threshold must be a non-negative number, got {}",
                config.font_size_threshold
            )));
        }
        if !config.merge_size_tolerance.is_finite() || config.merge_size_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "merge_size_tolerance must be a non-negative number, got {}",
                config.merge_size_tolerance
            )));
        }
        if config.min_line_chars == 0 {
            return Err(ConfigError::Invalid(
                "min_line_chars must be at least 1".to_string(),
            ));
        }

        Ok(config)
    }
}

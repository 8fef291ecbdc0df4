use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extraction: Option<ExtractionFileConfig>,
    pub ranking: Option<RankingFileConfig>,
    pub concurrency: Option<ConcurrencyFileConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionFileConfig {
    pub font_size_threshold: Option<f32>,
    pub merge_size_tolerance: Option<f32>,
    pub centering_tolerance: Option<f32>,
    pub min_line_chars: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingFileConfig {
    pub max_sections: Option<usize>,
    pub max_passages: Option<usize>,
    pub similarity_floor: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConcurrencyFileConfig {
    pub num_workers: Option<usize>,
}

/// Platform config directory path: `<config_dir>/docsift/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("docsift").join("config.toml"))
}

/// Load config by cascading CWD `.docsift.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".docsift.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &PathBuf) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    ConfigFile {
        extraction: Some(ExtractionFileConfig {
            font_size_threshold: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.font_size_threshold)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.font_size_threshold)),
            merge_size_tolerance: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.merge_size_tolerance)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.merge_size_tolerance)),
            centering_tolerance: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.centering_tolerance)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.centering_tolerance)),
            min_line_chars: overlay
                .extraction
                .as_ref()
                .and_then(|e| e.min_line_chars)
                .or_else(|| base.extraction.as_ref().and_then(|e| e.min_line_chars)),
        }),
        ranking: Some(RankingFileConfig {
            max_sections: overlay
                .ranking
                .as_ref()
                .and_then(|r| r.max_sections)
                .or_else(|| base.ranking.as_ref().and_then(|r| r.max_sections)),
            max_passages: overlay
                .ranking
                .as_ref()
                .and_then(|r| r.max_passages)
                .or_else(|| base.ranking.as_ref().and_then(|r| r.max_passages)),
            similarity_floor: overlay
                .ranking
                .as_ref()
                .and_then(|r| r.similarity_floor)
                .or_else(|| base.ranking.as_ref().and_then(|r| r.similarity_floor)),
        }),
        concurrency: Some(ConcurrencyFileConfig {
            num_workers: overlay
                .concurrency
                .as_ref()
                .and_then(|c| c.num_workers)
                .or_else(|| base.concurrency.as_ref().and_then(|c| c.num_workers)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_toml() {
        let config = ConfigFile {
            ranking: Some(RankingFileConfig {
                max_sections: Some(10),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.ranking.unwrap().max_sections.unwrap(), 10);
    }

    #[test]
    fn absent_fields_deserialize_as_none() {
        let toml_str = "[extraction]\nfont_size_threshold = 12.0\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let extraction = parsed.extraction.unwrap();
        assert_eq!(extraction.font_size_threshold, Some(12.0));
        assert!(extraction.merge_size_tolerance.is_none());
        assert!(parsed.ranking.is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            concurrency: Some(ConcurrencyFileConfig {
                num_workers: Some(2),
            }),
            ..Default::default()
        };
        let overlay = ConfigFile {
            concurrency: Some(ConcurrencyFileConfig {
                num_workers: Some(8),
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        assert_eq!(merged.concurrency.unwrap().num_workers.unwrap(), 8);
    }

    #[test]
    fn merge_base_preserved_when_overlay_absent() {
        let base = ConfigFile {
            extraction: Some(ExtractionFileConfig {
                centering_tolerance: Some(40.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, ConfigFile::default());
        assert_eq!(
            merged.extraction.unwrap().centering_tolerance.unwrap(),
            40.0
        );
    }

    #[test]
    fn load_from_missing_path_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(load_from_path(&path).is_none());
    }
}

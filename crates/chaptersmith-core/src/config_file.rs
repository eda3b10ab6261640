use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::quality::QualityWeights;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub api: Option<ApiConfig>,
    pub splitter: Option<SplitterFileConfig>,
    pub weights: Option<QualityWeights>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    pub openai_api_key: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SplitterFileConfig {
    pub min_chapter_words: Option<usize>,
    pub section_marker_min_words: Option<usize>,
    pub toc_anchor_window: Option<usize>,
    pub toc_scan_window: Option<usize>,
    pub fuzzy_threshold: Option<f64>,
    pub accept_threshold: Option<f64>,
}

/// Platform config directory path: `<config_dir>/chaptersmith/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("chaptersmith").join("config.toml"))
}

/// Load config by cascading CWD `.chaptersmith.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(&PathBuf::from(".chaptersmith.toml"));

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
        api: Some(ApiConfig {
            openai_api_key: overlay
                .api
                .as_ref()
                .and_then(|a| a.openai_api_key.clone())
                .or_else(|| base.api.as_ref().and_then(|a| a.openai_api_key.clone())),
            model: overlay
                .api
                .as_ref()
                .and_then(|a| a.model.clone())
                .or_else(|| base.api.as_ref().and_then(|a| a.model.clone())),
            timeout_secs: overlay
                .api
                .as_ref()
                .and_then(|a| a.timeout_secs)
                .or_else(|| base.api.as_ref().and_then(|a| a.timeout_secs)),
        }),
        splitter: Some(SplitterFileConfig {
            min_chapter_words: overlay
                .splitter
                .as_ref()
                .and_then(|s| s.min_chapter_words)
                .or_else(|| base.splitter.as_ref().and_then(|s| s.min_chapter_words)),
            section_marker_min_words: overlay
                .splitter
                .as_ref()
                .and_then(|s| s.section_marker_min_words)
                .or_else(|| {
                    base.splitter
                        .as_ref()
                        .and_then(|s| s.section_marker_min_words)
                }),
            toc_anchor_window: overlay
                .splitter
                .as_ref()
                .and_then(|s| s.toc_anchor_window)
                .or_else(|| base.splitter.as_ref().and_then(|s| s.toc_anchor_window)),
            toc_scan_window: overlay
                .splitter
                .as_ref()
                .and_then(|s| s.toc_scan_window)
                .or_else(|| base.splitter.as_ref().and_then(|s| s.toc_scan_window)),
            fuzzy_threshold: overlay
                .splitter
                .as_ref()
                .and_then(|s| s.fuzzy_threshold)
                .or_else(|| base.splitter.as_ref().and_then(|s| s.fuzzy_threshold)),
            accept_threshold: overlay
                .splitter
                .as_ref()
                .and_then(|s| s.accept_threshold)
                .or_else(|| base.splitter.as_ref().and_then(|s| s.accept_threshold)),
        }),
        weights: overlay.weights.or(base.weights),
    }
}

/// Apply file-config values onto a [`crate::SplitterConfigBuilder`].
/// Builder values already set by the caller (CLI flags) should be applied
/// after this, since later builder calls override earlier ones.
pub fn apply_to_builder(
    mut builder: crate::SplitterConfigBuilder,
    file: &ConfigFile,
) -> crate::SplitterConfigBuilder {
    if let Some(splitter) = &file.splitter {
        if let Some(v) = splitter.min_chapter_words {
            builder = builder.min_chapter_words(v);
        }
        if let Some(v) = splitter.section_marker_min_words {
            builder = builder.section_marker_min_words(v);
        }
        if let Some(v) = splitter.toc_anchor_window {
            builder = builder.toc_anchor_window(v);
        }
        if let Some(v) = splitter.toc_scan_window {
            builder = builder.toc_scan_window(v);
        }
        if let Some(v) = splitter.fuzzy_threshold {
            builder = builder.fuzzy_threshold(v);
        }
        if let Some(v) = splitter.accept_threshold {
            builder = builder.accept_threshold(v);
        }
    }
    if let Some(weights) = &file.weights {
        builder = builder.quality_weights(weights.clone());
    }
    builder
}

//! TOML-based configuration for linehist.
//!
//! Every section and field is optional; a missing file or an empty file
//! yields [`Config::default`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;

/// Largest accepted unified-diff context window.
pub const MAX_CONTEXT_LINES: usize = 1000;

/// Accepted range for the annotate revision column width.
pub const REVISION_ID_WIDTH_RANGE: std::ops::RangeInclusive<usize> = 4..=64;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub diff: DiffConfig,

    #[serde(default)]
    pub merge: MergeConfig,

    #[serde(default)]
    pub annotate: AnnotateConfig,

    #[serde(default)]
    pub log: LogConfig,
}

// ---------------------------------------------------------------------------
// Diff
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffConfig {
    /// Unchanged lines shown around each hunk (default 3).
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,
}

fn default_context_lines() -> usize {
    3
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
        }
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// What a file merge does when the line merge conflicts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeFallback {
    /// Report the conflict and produce nothing.
    #[default]
    None,
    /// Produce content with `<<<<<<<` / `>>>>>>>` conflict markers.
    Markers,
}

impl std::str::FromStr for MergeFallback {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "markers" => Ok(Self::Markers),
            other => Err(ConfigError::InvalidValue {
                field: "merge.fallback".into(),
                detail: format!("unknown fallback '{}', expected 'none' or 'markers'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default)]
    pub fallback: MergeFallback,
}

// ---------------------------------------------------------------------------
// Annotate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotateConfig {
    /// Characters of the revision id printed per line (default 8).
    #[serde(default = "default_revision_id_width")]
    pub revision_id_width: usize,
}

fn default_revision_id_width() -> usize {
    8
}

impl Default for AnnotateConfig {
    fn default() -> Self {
        Self {
            revision_id_width: default_revision_id_width(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum tracing level: trace, debug, info, warn, error, off.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading and validation
// ---------------------------------------------------------------------------

impl Config {
    /// Load a [`Config`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config = Self::parse(&contents)?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Load and validate the file if it exists, otherwise fall back to the
    /// defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate that all values are within their accepted ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.diff.context_lines > MAX_CONTEXT_LINES {
            return Err(ConfigError::InvalidValue {
                field: "diff.context_lines".into(),
                detail: format!("must be at most {}", MAX_CONTEXT_LINES),
            });
        }
        if !REVISION_ID_WIDTH_RANGE.contains(&self.annotate.revision_id_width) {
            return Err(ConfigError::InvalidValue {
                field: "annotate.revision_id_width".into(),
                detail: format!(
                    "must be between {} and {}",
                    REVISION_ID_WIDTH_RANGE.start(),
                    REVISION_ID_WIDTH_RANGE.end()
                ),
            });
        }
        if !LOG_LEVELS.contains(&self.log.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "log.level".into(),
                detail: format!("'{}' is not one of {}", self.log.level, LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// The default configuration as a commented TOML document.
    pub fn default_toml() -> String {
        let defaults = Self::default();
        format!(
            "# linehist configuration\n\
             \n\
             [diff]\n\
             # Unchanged lines shown around each hunk (0..={max_context}).\n\
             context_lines = {context}\n\
             \n\
             [merge]\n\
             # What to do when a merge conflicts: \"none\" or \"markers\".\n\
             fallback = \"none\"\n\
             \n\
             [annotate]\n\
             # Width of the revision column ({min_width}..={max_width}).\n\
             revision_id_width = {width}\n\
             \n\
             [log]\n\
             # trace, debug, info, warn, error or off. RUST_LOG takes precedence.\n\
             level = \"{level}\"\n",
            max_context = MAX_CONTEXT_LINES,
            context = defaults.diff.context_lines,
            min_width = REVISION_ID_WIDTH_RANGE.start(),
            max_width = REVISION_ID_WIDTH_RANGE.end(),
            width = defaults.annotate.revision_id_width,
            level = defaults.log.level,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_toml() -> &'static str {
        r#"
[diff]
context_lines = 5

[merge]
fallback = "markers"

[annotate]
revision_id_width = 12

[log]
level = "debug"
"#
    }

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(sample_toml()).expect("failed to parse toml");
        assert_eq!(config.diff.context_lines, 5);
        assert_eq!(config.merge.fallback, MergeFallback::Markers);
        assert_eq!(config.annotate.revision_id_width, 12);
        assert_eq!(config.log.level, "debug");
        config.validate().unwrap();
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        let config = Config::load_from_file(&path).expect("load_from_file failed");
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_file_not_found() {
        let result = Config::load_from_file("/nonexistent/config.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.diff.context_lines, 3);
        assert_eq!(config.merge.fallback, MergeFallback::None);
        assert_eq!(config.annotate.revision_id_width, 8);
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_default_toml_roundtrips() {
        let config = Config::parse(&Config::default_toml()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_rejects_huge_context() {
        let mut config = Config::default();
        config.diff.context_lines = MAX_CONTEXT_LINES + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "diff.context_lines"
        ));
    }

    #[test]
    fn test_validate_rejects_narrow_revision_column() {
        let mut config = Config::default();
        config.annotate.revision_id_width = 2;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "annotate.revision_id_width"
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_level() {
        let mut config = Config::default();
        config.log.level = "loud".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_fallback_is_a_parse_error() {
        let result = Config::parse("[merge]\nfallback = \"ours\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
        assert!("ours".parse::<MergeFallback>().is_err());
        assert_eq!("markers".parse::<MergeFallback>().unwrap(), MergeFallback::Markers);
    }
}

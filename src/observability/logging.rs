//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor the config names one.
const DEFAULT_FILTER: &str = "warn";

/// Filter used by `--verbose`.
const VERBOSE_FILTER: &str = "aurora_memory=debug,info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Parses a format name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Some(Self::Pretty),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Event filter.
    pub filter: EnvFilter,
    /// Append to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Resolves logging from config settings and the process environment.
    ///
    /// `AURORA_LOG_FORMAT` and `AURORA_LOG_FILE` override the config file;
    /// `RUST_LOG` overrides the filter. `verbose` raises the default filter
    /// to debug for this crate.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        Self::from_settings_with(settings, verbose, |key| std::env::var(key).ok())
    }

    /// Like [`LoggingConfig::from_settings`] with an arbitrary variable lookup.
    #[must_use]
    pub fn from_settings_with(
        settings: &LoggingSettings,
        verbose: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let format = lookup("AURORA_LOG_FORMAT")
            .or_else(|| settings.format.clone())
            .and_then(|f| LogFormat::parse(&f))
            .unwrap_or_default();

        let file = lookup("AURORA_LOG_FILE")
            .filter(|f| !f.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| settings.file.clone());

        let fallback = if verbose {
            VERBOSE_FILTER.to_string()
        } else {
            settings
                .filter
                .clone()
                .unwrap_or_else(|| DEFAULT_FILTER.to_string())
        };
        let directive = lookup(EnvFilter::DEFAULT_ENV)
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(fallback);
        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        Self {
            format,
            filter,
            file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LoggingConfig::from_settings_with(&LoggingSettings::default(), false, lookup(&[]));
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
        assert_eq!(config.filter.to_string(), "warn");
    }

    #[test]
    fn test_verbose() {
        let config = LoggingConfig::from_settings_with(&LoggingSettings::default(), true, lookup(&[]));
        assert!(config.filter.to_string().contains("aurora_memory=debug"));
    }

    #[test]
    fn test_env_overrides_settings() {
        let settings = LoggingSettings {
            format: Some("pretty".to_string()),
            filter: Some("info".to_string()),
            file: Some(PathBuf::from("/var/log/a.log")),
        };
        let config = LoggingConfig::from_settings_with(
            &settings,
            false,
            lookup(&[
                ("AURORA_LOG_FORMAT", "JSON"),
                ("AURORA_LOG_FILE", "/tmp/b.log"),
                ("RUST_LOG", "error"),
            ]),
        );
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file, Some(PathBuf::from("/tmp/b.log")));
        assert_eq!(config.filter.to_string(), "error");
    }

    #[test]
    fn test_settings_used_without_env() {
        let settings = LoggingSettings {
            format: Some("json".to_string()),
            filter: Some("info".to_string()),
            file: None,
        };
        let config = LoggingConfig::from_settings_with(&settings, false, lookup(&[]));
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.filter.to_string(), "info");
    }

    #[test]
    fn test_invalid_format_falls_back() {
        assert_eq!(LogFormat::parse("xml"), None);
        let config = LoggingConfig::from_settings_with(
            &LoggingSettings::default(),
            false,
            lookup(&[("AURORA_LOG_FORMAT", "xml")]),
        );
        assert_eq!(config.format, LogFormat::Pretty);
    }
}

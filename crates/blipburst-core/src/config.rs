use std::path::{Path, PathBuf};

use blipburst_injector::{InjectorConfig, InjectorOptions};
use blipburst_network::CallerIdentity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::SettingsArgs;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to render config")]
    Render(#[from] toml::ser::Error),
}

/// On-disk layout of the optional TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub injector: InjectorOptions,
    #[serde(default)]
    pub http: CallerIdentity,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

/// Everything the binary needs, after file and flags are merged and defaults
/// are filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub injector: InjectorConfig,
    pub http: CallerIdentity,
}

impl Settings {
    pub fn resolve(args: &SettingsArgs, now: DateTime<Utc>) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Ok(Self::merge(file, args, now))
    }

    pub fn merge(file: FileConfig, args: &SettingsArgs, now: DateTime<Utc>) -> Self {
        let options = file.injector.merge(args.injector_overrides());
        Self {
            injector: options.resolve(now),
            http: args.apply_http_overrides(file.http),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn now() -> DateTime<Utc> {
        "2026-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn parses_full_file() {
        let file = FileConfig::parse(
            r#"
            [injector]
            start = "2026-01-01T00:00:00Z"
            end = "2026-01-05T00:00:00Z"
            frequency = 0.5
            total = 4
            url = "https://example.test/posts/1"

            [http]
            user_agent = "probe/2"
            timeout_ms = 5000
            "#,
        )
        .unwrap();

        assert_eq!(file.injector.start, Some(now()));
        assert_eq!(file.injector.end, Some(now() + Duration::days(4)));
        assert_eq!(file.injector.frequency, Some(0.5));
        assert_eq!(file.injector.total, Some(4));
        assert_eq!(file.http.user_agent, "probe/2");
        assert_eq!(file.http.timeout_ms, Some(5000));
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let file = FileConfig::parse("").unwrap();
        assert_eq!(file, FileConfig::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(FileConfig::parse("[injector]\nfrequnecy = 1.0\n").is_err());
        assert!(FileConfig::parse("[retry]\nmax = 3\n").is_err());
    }

    #[test]
    fn accepts_negative_total() {
        let file = FileConfig::parse("[injector]\nfrequency = 1.0\ntotal = -1\n").unwrap();
        assert_eq!(file.injector.total, Some(-1));

        let settings = Settings::merge(file, &SettingsArgs::default(), now());
        assert_eq!(settings.injector.total, -1);
    }

    #[test]
    fn flags_override_file_values() {
        let file = FileConfig::parse(
            r#"
            [injector]
            frequency = 2.0
            total = 9
            url = "https://from-file.test"

            [http]
            user_agent = "from-file"
            "#,
        )
        .unwrap();
        let args = SettingsArgs {
            total: Some(1),
            user_agent: Some("from-flag".to_string()),
            ..SettingsArgs::default()
        };

        let settings = Settings::merge(file, &args, now());
        assert_eq!(settings.injector.frequency, 2.0);
        assert_eq!(settings.injector.total, 1);
        assert_eq!(settings.injector.url, "https://from-file.test");
        assert_eq!(settings.injector.start, now());
        assert_eq!(settings.injector.end, now() + Duration::days(4));
        assert_eq!(settings.http.user_agent, "from-flag");
    }

    #[test]
    fn renders_resolved_settings_as_toml() {
        let settings = Settings::merge(FileConfig::default(), &SettingsArgs::default(), now());
        let rendered = settings.to_toml().unwrap();

        assert!(rendered.contains("[injector]"));
        assert!(rendered.contains("total = 4"));
        assert!(rendered.contains("2026-01-05T00:00:00Z"));
        assert!(rendered.contains("[http]"));
    }
}

//! Harness configuration, loaded from an optional RON file.
//!
//! Every key may be omitted; a missing file means all defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use enricher_core::{AcceptancePattern, FieldNames};
use enricher_engine::{ClientSettings, PipelineSettings};
use enricher_logging::LogDestination;
use log::LevelFilter;
use serde::Deserialize;

pub const CONFIG_FILENAME: &str = "enricher.ron";
pub const CONFIG_ENV: &str = "ENRICHER_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("unknown log level {0:?}")]
    LogLevel(String),
    #[error("unknown log destination {0:?} (expected file, terminal or both)")]
    LogDestination(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub endpoint: String,
    pub debounce_ms: u64,
    pub domain: String,
    pub resource_segment: String,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub max_bytes: u64,
    pub log_level: String,
    pub log_destination: String,
    pub fields: FieldsConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldsConfig {
    pub trigger: String,
    pub manufacturer: String,
    pub name: String,
    pub scale: String,
    pub image_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let pattern = AcceptancePattern::default();
        Self {
            endpoint: "http://127.0.0.1:3000/api/enrich".to_string(),
            debounce_ms: 1000,
            domain: pattern.domain().to_string(),
            resource_segment: pattern.resource_segment().to_string(),
            connect_timeout_ms: None,
            request_timeout_ms: None,
            max_bytes: ClientSettings::new("").max_bytes,
            log_level: "info".to_string(),
            log_destination: "file".to_string(),
            fields: FieldsConfig::default(),
        }
    }
}

impl Default for FieldsConfig {
    fn default() -> Self {
        let names = FieldNames::default();
        Self {
            trigger: names.trigger,
            manufacturer: names.manufacturer,
            name: names.name,
            scale: names.scale,
            image_url: names.image_url,
        }
    }
}

impl AppConfig {
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            debounce: Duration::from_millis(self.debounce_ms),
            pattern: AcceptancePattern::new(&self.domain, &self.resource_segment),
            fields: self.field_names(),
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            endpoint: self.endpoint.clone(),
            connect_timeout: self.connect_timeout_ms.map(Duration::from_millis),
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
            max_bytes: self.max_bytes,
        }
    }

    pub fn field_names(&self) -> FieldNames {
        FieldNames {
            trigger: self.fields.trigger.clone(),
            manufacturer: self.fields.manufacturer.clone(),
            name: self.fields.name.clone(),
            scale: self.fields.scale.clone(),
            image_url: self.fields.image_url.clone(),
        }
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn log_destination(&self) -> Result<LogDestination, ConfigError> {
        match self.log_destination.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(LogDestination::File),
            "terminal" => Ok(LogDestination::Terminal),
            "both" => Ok(LogDestination::Both),
            _ => Err(ConfigError::LogDestination(self.log_destination.clone())),
        }
    }
}

/// `$ENRICHER_CONFIG` if set, else `./enricher.ron`.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".").join(CONFIG_FILENAME))
}

pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config: AppConfig = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.log_level()?;
    config.log_destination()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = load(&temp.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(
            config.pipeline_settings().debounce,
            Duration::from_millis(1000)
        );
        assert_eq!(config.client_settings().request_timeout, None);
        assert_eq!(config.log_destination().unwrap(), LogDestination::File);
    }

    #[test]
    fn partial_file_overrides_selected_keys() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(
                endpoint: "http://localhost:9000/scrape",
                debounce_ms: 250,
                request_timeout_ms: Some(15000),
                fields: (trigger: "mfcLink"),
            )"#,
        )
        .unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.endpoint, "http://localhost:9000/scrape");
        assert_eq!(config.pipeline_settings().debounce, Duration::from_millis(250));
        assert_eq!(
            config.client_settings().request_timeout,
            Some(Duration::from_millis(15000))
        );
        let names = config.field_names();
        assert_eq!(names.trigger, "mfcLink");
        assert_eq!(names.image_url, "imageUrl");
        assert_eq!(config.domain, "myfigurecollection.net");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(debounce_ms: \"soon\")").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn log_destination_is_selectable() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(log_destination: \"Both\")").unwrap();
        assert_eq!(
            load(&path).unwrap().log_destination().unwrap(),
            LogDestination::Both
        );

        fs::write(&path, "(log_destination: \"syslog\")").unwrap();
        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::LogDestination(name) if name == "syslog"));
    }

    #[test]
    fn bad_log_level_is_an_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILENAME);
        fs::write(&path, "(log_level: \"chatty\")").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::LogLevel(level) if level == "chatty"));
    }
}

use crate::error::{HubError, Result};
use crate::pipeline::normalize::NormalizeConfig;
use crate::pipeline::quality_gate::ScoringConfig;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub normalize: NormalizeConfig,
    pub scoring: ScoringConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the daily-rotated JSON log files
    pub dir: String,
    /// Filter used when `RUST_LOG` is unset
    pub default_filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
            default_filter: "opportunity_hub=info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "opportunityhub.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3001".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
        }
    }
}

impl Config {
    /// Load the TOML file at `path`, falling back to defaults when it does not
    /// exist, then apply environment overrides.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let content = fs::read_to_string(path).map_err(|e| {
                HubError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
            })?;
            info!("Loaded configuration from {}", path.display());
            Self::from_toml(&content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(path) = std::env::var("OPPHUB_DATABASE") {
            if !path.trim().is_empty() {
                self.database.path = path;
            }
        }
        if let Ok(bind) = std::env::var("OPPHUB_BIND") {
            if !bind.trim().is_empty() {
                self.server.bind = bind;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.normalize.title_max == 0 || self.normalize.description_max == 0 {
            return Err(HubError::Config("normalize caps must be positive".into()));
        }
        if self.scoring.pending_threshold > self.scoring.verified_threshold {
            return Err(HubError::Config(format!(
                "scoring.pending_threshold ({}) exceeds scoring.verified_threshold ({})",
                self.scoring.pending_threshold, self.scoring.verified_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.database.path, "opportunityhub.db");
        assert_eq!(config.http.timeout_seconds, 30);
        assert_eq!(config.normalize.title_max, 200);
        assert_eq!(config.scoring.verified_threshold, 80);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            [scoring]
            verified_threshold = 90
            job_location = 15

            [server]
            bind = "0.0.0.0:8080"
            "#,
        )
        .unwrap();
        assert_eq!(config.scoring.verified_threshold, 90);
        assert_eq!(config.scoring.job_location, 15);
        assert_eq!(config.scoring.pending_threshold, 60);
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.database.path, "opportunityhub.db");
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let config = Config::from_toml(
            r#"
            [scoring]
            verified_threshold = 50
            pending_threshold = 70
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn logging_section_overrides_directory() {
        let config = Config::from_toml(
            r#"
            [logging]
            dir = "/var/log/opphub"
            "#,
        )
        .unwrap();
        assert_eq!(config.logging.dir, "/var/log/opphub");
        assert_eq!(config.logging.default_filter, "opportunity_hub=info");
        assert_eq!(Config::default().logging.dir, "logs");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.normalize.description_max, 500);
    }
}

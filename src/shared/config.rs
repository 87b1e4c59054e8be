//! Application configuration. Paths, model artifact location.
//!
//! Read from `CYCLE_SYNC_*` environment variables (and `.env`), plus an
//! optional file named by `CYCLE_SYNC_CONFIG`.

use serde::Deserialize;

/// Default HTTP timeout for fetching model artifacts.
pub const DEFAULT_ARTIFACT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory for the log database and reports. Read from CYCLE_SYNC_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Local model artifact directory. Read from CYCLE_SYNC_MODELS_DIR.
    #[serde(default)]
    pub models_dir: Option<String>,

    /// Base URL for model artifacts; takes precedence over models_dir. Read from CYCLE_SYNC_MODELS_URL.
    #[serde(default)]
    pub models_url: Option<String>,

    /// Artifact fetch timeout in seconds. Read from CYCLE_SYNC_ARTIFACT_TIMEOUT_SECS.
    #[serde(default)]
    pub artifact_timeout_secs: Option<u64>,

    /// Fixed seed for response selection (reproducible sessions). Read from CYCLE_SYNC_RNG_SEED.
    #[serde(default)]
    pub rng_seed: Option<u64>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("CYCLE_SYNC").try_parsing(true));
        if let Ok(path) = std::env::var("CYCLE_SYNC_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    /// Defaults to "./data".
    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    /// Defaults to "./models".
    pub fn models_dir_or_default(&self) -> String {
        self.models_dir
            .clone()
            .unwrap_or_else(|| "./models".to_string())
    }

    /// Models URL if set and non-empty.
    pub fn models_url(&self) -> Option<String> {
        self.models_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    pub fn artifact_timeout_secs_or_default(&self) -> u64 {
        self.artifact_timeout_secs
            .unwrap_or(DEFAULT_ARTIFACT_TIMEOUT_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.data_dir_or_default(), "./data");
        assert_eq!(cfg.models_dir_or_default(), "./models");
        assert_eq!(cfg.models_url(), None);
        assert_eq!(cfg.artifact_timeout_secs_or_default(), 10);
    }

    #[test]
    fn blank_models_url_is_ignored() {
        let cfg = AppConfig {
            models_url: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.models_url(), None);
    }

    #[test]
    fn reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cycle.toml");
        std::fs::write(
            &path,
            "data_dir = \"/tmp/cs\"\nmodels_url = \"https://cdn.example.com/models\"\nrng_seed = 7\n",
        )
        .unwrap();
        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from(path.as_path()))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(cfg.data_dir_or_default(), "/tmp/cs");
        assert_eq!(cfg.models_url().as_deref(), Some("https://cdn.example.com/models"));
        assert_eq!(cfg.rng_seed, Some(7));
    }
}

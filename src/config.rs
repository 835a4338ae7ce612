//! Runtime settings.
//!
//! Settings come from an optional config file layered with
//! `REPLSET_DOCTOR_*` environment variables:
//!
//! ```toml
//! lag_warning = "10s"
//! lag_critical = "1m"
//! strict_optime = true
//! allow_duplicates = false
//! history = 3600
//! ```

use std::path::Path;

use anyhow::{bail, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::timeline::DEFAULT_CAPACITY;
use crate::data::Thresholds;
use crate::decode::Validator;

/// Settings shared by the CLI and library consumers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Replication lag warning threshold (e.g. "10s").
    pub lag_warning: String,
    /// Replication lag critical threshold (e.g. "1m").
    pub lag_critical: String,
    /// Reject data-bearing members without a readable optime.
    pub strict_optime: bool,
    /// Accept snapshots listing the same member twice.
    pub allow_duplicates: bool,
    /// Number of snapshots kept for election detection.
    pub history: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            lag_warning: "10s".to_string(),
            lag_critical: "60s".to_string(),
            strict_optime: false,
            allow_duplicates: false,
            history: DEFAULT_CAPACITY,
        }
    }
}

impl Settings {
    /// Load settings from `path` (if given) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder.add_source(env).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Parsed lag thresholds.
    pub fn thresholds(&self) -> Result<Thresholds> {
        let thresholds = Thresholds {
            lag_warning: parse_duration(&self.lag_warning)?,
            lag_critical: parse_duration(&self.lag_critical)?,
        };
        if thresholds.lag_warning > thresholds.lag_critical {
            bail!(
                "lag_warning ({}) must not exceed lag_critical ({})",
                self.lag_warning,
                self.lag_critical
            );
        }
        Ok(thresholds)
    }

    /// Validation rules for decoded snapshots.
    pub fn validator(&self) -> Validator {
        Validator {
            strict_optime: self.strict_optime,
            allow_duplicates: self.allow_duplicates,
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix("REPLSET_DOCTOR").try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn toml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.thresholds().unwrap(), Thresholds::default());
        assert_eq!(settings.validator(), Validator::default());
        assert_eq!(settings.history, DEFAULT_CAPACITY);
    }

    #[test]
    fn load_from_file() {
        let file = toml_file(
            r#"
            lag_warning = "5s"
            lag_critical = "2m"
            strict_optime = true
            history = 10
            "#,
        );

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.history, 10);
        assert!(settings.strict_optime);
        assert!(!settings.allow_duplicates);

        let thresholds = settings.thresholds().unwrap();
        assert_eq!(thresholds.lag_warning, Duration::from_secs(5));
        assert_eq!(thresholds.lag_critical, Duration::from_secs(120));
    }

    #[test]
    fn environment_overrides_file() {
        let file = toml_file(
            r#"
            lag_warning = "5s"
            history = 10
            "#,
        );
        let vars: config::Map<String, String> = [
            ("REPLSET_DOCTOR_HISTORY", "25"),
            ("REPLSET_DOCTOR_STRICT_OPTIME", "true"),
            ("UNRELATED_HISTORY", "99"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let settings =
            Settings::load_with_env(Some(file.path()), environment().source(Some(vars))).unwrap();
        assert_eq!(settings.history, 25);
        assert!(settings.strict_optime);
        assert_eq!(settings.lag_warning, "5s");
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/doctor.toml"))).is_err());
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let settings = Settings {
            lag_warning: "2m".to_string(),
            lag_critical: "30s".to_string(),
            ..Settings::default()
        };
        assert!(settings.thresholds().is_err());
    }

    #[test]
    fn malformed_threshold_is_rejected() {
        let settings = Settings {
            lag_warning: "soon".to_string(),
            ..Settings::default()
        };
        assert!(settings.thresholds().is_err());
    }
}

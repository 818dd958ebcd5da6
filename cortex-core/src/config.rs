//! Engine configuration
//!
//! Configuration is read from a YAML document. The cortex section may live
//! under `extensions.cortex` (preferred) or under a top-level `cortex` key:
//!
//! ```yaml
//! extensions:
//!   cortex:
//!     default_model: smart
//!     run_concurrency: 8
//!     logging:
//!       level: debug
//!       format: json
//!     extensions:
//!       audit:
//!         enabled: true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;

use crate::error::{Error, Result};

/// Top-level cortex configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CortexConfig {
    /// Model used when an agent does not name one
    pub default_model: String,
    /// Maximum reasoning steps per run
    pub default_max_steps: u32,
    /// Maximum output tokens per model call
    pub default_max_tokens: u32,
    /// Sampling temperature
    pub default_temperature: f64,
    /// Reasoning strategy when none is set
    pub default_reasoning_loop: String,
    /// Upper bound for the shutdown broadcast, in seconds
    pub shutdown_timeout_secs: u64,
    /// How many agent runs may execute in parallel
    pub run_concurrency: usize,
    /// Logging setup
    pub logging: LoggingConfig,
    /// Built-in extensions to enable
    pub extensions: ExtensionsConfig,
}

impl Default for CortexConfig {
    fn default() -> Self {
        Self {
            default_model: "smart".to_string(),
            default_max_steps: 25,
            default_max_tokens: 4096,
            default_temperature: 0.7,
            default_reasoning_loop: "react".to_string(),
            shutdown_timeout_secs: 30,
            run_concurrency: 4,
            logging: LoggingConfig::default(),
            extensions: ExtensionsConfig::default(),
        }
    }
}

impl CortexConfig {
    /// Load the cortex section from a YAML string.
    ///
    /// When neither `extensions.cortex` nor `cortex` is present the defaults
    /// are returned, unless `require` is set.
    pub fn from_yaml_str(yaml: &str, require: bool) -> Result<Self> {
        let doc: Value = serde_yaml_ng::from_str(yaml)?;

        let section = doc
            .get("extensions")
            .and_then(|ext| ext.get("cortex"))
            .or_else(|| doc.get("cortex"));

        let config = match section {
            Some(value) => serde_yaml_ng::from_value::<CortexConfig>(value.clone())?,
            None if require => {
                return Err(Error::config(
                    "no cortex section found under 'extensions.cortex' or 'cortex'",
                ))
            }
            None => CortexConfig::default(),
        };

        let config = config.merge_with_defaults();
        config.validate()?;
        Ok(config)
    }

    /// Load the cortex section from a YAML file
    pub fn from_file(path: impl AsRef<Path>, require: bool) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&raw, require)
    }

    /// Replace zero or empty values with their defaults
    pub fn merge_with_defaults(mut self) -> Self {
        let defaults = Self::default();

        if self.default_model.is_empty() {
            self.default_model = defaults.default_model;
        }
        if self.default_max_steps == 0 {
            self.default_max_steps = defaults.default_max_steps;
        }
        if self.default_max_tokens == 0 {
            self.default_max_tokens = defaults.default_max_tokens;
        }
        if self.default_temperature == 0.0 {
            self.default_temperature = defaults.default_temperature;
        }
        if self.default_reasoning_loop.is_empty() {
            self.default_reasoning_loop = defaults.default_reasoning_loop;
        }
        if self.shutdown_timeout_secs == 0 {
            self.shutdown_timeout_secs = defaults.shutdown_timeout_secs;
        }
        if self.run_concurrency == 0 {
            self.run_concurrency = defaults.run_concurrency;
        }
        if self.logging.level.is_empty() {
            self.logging.level = defaults.logging.level;
        }

        self
    }

    /// Reject values no engine can run with
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.default_temperature) {
            return Err(Error::config_validation(
                "default_temperature",
                format!("{} is outside 0.0..=2.0", self.default_temperature),
            ));
        }
        if self.default_max_steps == 0 {
            return Err(Error::config_validation("default_max_steps", "must be > 0"));
        }
        if self.default_max_tokens == 0 {
            return Err(Error::config_validation("default_max_tokens", "must be > 0"));
        }
        if self.run_concurrency == 0 {
            return Err(Error::config_validation("run_concurrency", "must be > 0"));
        }
        if self.shutdown_timeout_secs == 0 {
            return Err(Error::config_validation("shutdown_timeout_secs", "must be > 0"));
        }
        Ok(())
    }
}

/// Output format of the stdout log layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line human readable output
    #[default]
    Compact,
    /// Multi-line human readable output
    Pretty,
    /// Newline-delimited JSON
    Json,
}

/// Logging setup consumed by [`crate::logging::init_logging`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Stdout format
    pub format: LogFormat,
    /// Directory for daily-rotated log files; no file output when unset
    pub directory: Option<PathBuf>,
    /// File name prefix inside `directory`
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            directory: None,
            file_prefix: "cortex.log".to_string(),
        }
    }
}

/// Which built-in extensions to register
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionsConfig {
    /// Audit trail
    pub audit: AuditConfig,
    /// Lifecycle counters
    pub metrics: MetricsConfig,
    /// One log record per event
    pub log: LogExtensionConfig,
}

/// Audit hook settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Register the audit hook
    pub enabled: bool,
    /// Only record these actions; every action when empty
    pub actions: Vec<String>,
}

/// Metrics extension settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Register the metrics extension
    pub enabled: bool,
    /// Optional namespace prepended to every counter name
    pub prefix: Option<String>,
}

/// Log extension settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogExtensionConfig {
    /// Register the log extension
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = CortexConfig::default();
        assert_eq!(cfg.default_model, "smart");
        assert_eq!(cfg.default_max_steps, 25);
        assert_eq!(cfg.default_max_tokens, 4096);
        assert_eq!(cfg.default_reasoning_loop, "react");
        assert_eq!(cfg.shutdown_timeout_secs, 30);
        assert_eq!(cfg.run_concurrency, 4);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_extensions_section_preferred() {
        let yaml = r#"
cortex:
  default_model: legacy
extensions:
  cortex:
    default_model: fast
    run_concurrency: 8
"#;
        let cfg = CortexConfig::from_yaml_str(yaml, false).unwrap();
        assert_eq!(cfg.default_model, "fast");
        assert_eq!(cfg.run_concurrency, 8);
        assert_eq!(cfg.default_max_steps, 25);
    }

    #[test]
    fn test_legacy_top_level_key() {
        let yaml = "cortex:\n  default_max_steps: 5\n";
        let cfg = CortexConfig::from_yaml_str(yaml, true).unwrap();
        assert_eq!(cfg.default_max_steps, 5);
    }

    #[test]
    fn test_missing_section() {
        let yaml = "server:\n  port: 8080\n";
        assert_eq!(
            CortexConfig::from_yaml_str(yaml, false).unwrap(),
            CortexConfig::default()
        );

        let err = CortexConfig::from_yaml_str(yaml, true).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_zero_values_fall_back_to_defaults() {
        let yaml = "cortex:\n  default_model: ''\n  run_concurrency: 0\n  shutdown_timeout_secs: 0\n";
        let cfg = CortexConfig::from_yaml_str(yaml, false).unwrap();
        assert_eq!(cfg.default_model, "smart");
        assert_eq!(cfg.run_concurrency, 4);
        assert_eq!(cfg.shutdown_timeout_secs, 30);
    }

    #[test]
    fn test_temperature_out_of_range() {
        let yaml = "cortex:\n  default_temperature: 3.5\n";
        let err = CortexConfig::from_yaml_str(yaml, false).unwrap_err();
        assert!(matches!(
            err,
            Error::ConfigValidation { ref field, .. } if field == "default_temperature"
        ));
    }

    #[test]
    fn test_zero_shutdown_timeout_rejected() {
        let cfg = CortexConfig {
            shutdown_timeout_secs: 0,
            ..CortexConfig::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("shutdown_timeout_secs"));

        assert!(cfg.merge_with_defaults().validate().is_ok());
    }

    #[test]
    fn test_extensions_and_logging_sections() {
        let yaml = r#"
cortex:
  logging:
    level: debug
    format: json
    directory: /var/log/cortex
  extensions:
    audit:
      enabled: true
      actions: [cortex.tool.failed]
    metrics:
      enabled: true
      prefix: app
"#;
        let cfg = CortexConfig::from_yaml_str(yaml, false).unwrap();
        assert_eq!(cfg.logging.level, "debug");
        assert_eq!(cfg.logging.format, LogFormat::Json);
        assert_eq!(cfg.logging.directory, Some(PathBuf::from("/var/log/cortex")));
        assert_eq!(cfg.logging.file_prefix, "cortex.log");
        assert!(cfg.extensions.audit.enabled);
        assert_eq!(cfg.extensions.audit.actions, vec!["cortex.tool.failed"]);
        assert_eq!(cfg.extensions.metrics.prefix.as_deref(), Some("app"));
        assert!(!cfg.extensions.log.enabled);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "extensions:\n  cortex:\n    default_max_tokens: 1024").unwrap();

        let cfg = CortexConfig::from_file(file.path(), true).unwrap();
        assert_eq!(cfg.default_max_tokens, 1024);
    }

    #[test]
    fn test_from_missing_file() {
        let err = CortexConfig::from_file("/nonexistent/cortex.yaml", false).unwrap_err();
        assert!(err.is_config());
    }
}

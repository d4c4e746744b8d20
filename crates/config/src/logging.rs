//! Logging configuration
//!
//! Read by the `gitadora` binary to build its tracing subscriber.

use std::path::PathBuf;

use serde::Deserialize;

/// Minimum level for the server's own events
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    /// Request audit lines and startup messages (default)
    #[default]
    Info,
    /// Rejected requests and failed snapshot jobs only
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Line format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Console,
    /// One JSON object per event, for log shippers
    Json,
}

/// Where log lines go
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    /// Any other value is a file path, opened in append mode
    #[serde(untagged)]
    File(PathBuf),
}

/// Logging configuration
///
/// ```toml
/// [log]
/// level = "info"
/// format = "json"
/// output = "/var/log/gitadora.log"
/// targets = ["sqlx=warn", "tower_http=debug"]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,

    /// Per-target overrides in `target=level` form, appended after the level
    pub targets: Vec<String>,
}

impl LogConfig {
    /// Filter directive for `tracing_subscriber::EnvFilter`
    ///
    /// `level_override` (the `--log-level` flag) replaces the configured
    /// level; target overrides still apply on top of it.
    pub fn filter_directive(&self, level_override: Option<&str>) -> String {
        let level = level_override
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.level.as_str());

        std::iter::once(level)
            .chain(self.targets.iter().map(String::as_str).map(str::trim))
            .filter(|d| !d.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty() {
        let config: LogConfig = toml::from_str("").unwrap();
        assert_eq!(config.level, LogLevel::Info);
        assert_eq!(config.format, LogFormat::Console);
        assert_eq!(config.output, LogOutput::Stdout);
        assert!(config.targets.is_empty());
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
level = "debug"
format = "json"
output = "stderr"
targets = ["sqlx=warn"]
"#;
        let config: LogConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.output, LogOutput::Stderr);
        assert_eq!(config.targets, vec!["sqlx=warn".to_string()]);
    }

    #[test]
    fn test_file_output() {
        let config: LogConfig = toml::from_str(r#"output = "/var/log/gitadora.log""#).unwrap();
        assert_eq!(
            config.output,
            LogOutput::File(PathBuf::from("/var/log/gitadora.log"))
        );
    }

    #[test]
    fn test_filter_directive() {
        let config = LogConfig {
            level: LogLevel::Warn,
            targets: vec!["sqlx=error".into(), " ".into(), "gitadora_api=debug".into()],
            ..Default::default()
        };
        assert_eq!(
            config.filter_directive(None),
            "warn,sqlx=error,gitadora_api=debug"
        );
        assert_eq!(
            config.filter_directive(Some("trace")),
            "trace,sqlx=error,gitadora_api=debug"
        );
        assert_eq!(LogConfig::default().filter_directive(Some("")), "info");
    }
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Centralized logging utilities for Agent Conduit
//!
//! Binaries initialize one `tracing` subscriber through this crate. Console
//! logs always go to stderr: stdout belongs to the wrapped agent's answer.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-export Level for convenience
pub use tracing::Level;

const APP_DIR: &str = "agent-conduit";

/// Output format for log messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable plaintext format
    #[default]
    Plaintext,
    /// Structured JSON format
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Plaintext => write!(f, "plaintext"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Log level accepted on the command line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CliLogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CliLogLevel::Error => "error",
            CliLogLevel::Warn => "warn",
            CliLogLevel::Info => "info",
            CliLogLevel::Debug => "debug",
            CliLogLevel::Trace => "trace",
        };
        f.write_str(name)
    }
}

/// Logging flags shared by every binary; use with `#[command(flatten)]`
///
/// Logs go to stderr unless `--log-file` or `--log-dir` is given.
#[derive(Clone, Debug, Default, clap::Args, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliLoggingArgs {
    /// Log verbosity level (default: warn)
    #[arg(long, value_enum, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<CliLogLevel>,

    /// Log output format (default: plaintext)
    #[arg(long, value_enum, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,

    /// Directory for log files (default: platform specific)
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Log filename
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl CliLoggingArgs {
    /// Initialize logging from the parsed flags
    pub fn init(&self, component: &str, default_level: CliLogLevel) -> anyhow::Result<()> {
        let level = self.log_level.unwrap_or(default_level).into();
        let format = self.log_format.unwrap_or_default();

        if self.logs_to_file() {
            init_to_file(component, level, format, &self.resolve_log_path(component))
        } else {
            init(component, level, format)
        }
    }

    pub fn logs_to_file(&self) -> bool {
        self.log_file.is_some() || self.log_dir.is_some()
    }

    /// Resolve the log file path:
    /// 1. an absolute `log_file` is used as is
    /// 2. a relative `log_file` is placed under `log_dir` when one is given
    /// 3. without `log_file`, `<log_dir>/<component>.log`
    /// 4. otherwise the platform standard location
    pub fn resolve_log_path(&self, component: &str) -> PathBuf {
        match (&self.log_file, &self.log_dir) {
            (Some(file), _) if file.is_absolute() => file.clone(),
            (Some(file), Some(dir)) => dir.join(file),
            (Some(file), None) => file.clone(),
            (None, Some(dir)) => dir.join(format!("{}.log", component)),
            (None, None) => get_standard_log_path_for_component(component),
        }
    }
}

/// Standard log file path with the component name as the file name
pub fn get_standard_log_path_for_component(component: &str) -> PathBuf {
    let base_path = get_standard_log_path();
    let parent = base_path.parent().unwrap_or(Path::new("/tmp"));
    parent.join(format!("{}.log", component))
}

/// Standard log file path for the current OS
///
/// - Windows: %APPDATA%\agent-conduit\agent-conduit.log
/// - macOS: ~/Library/Logs/agent-conduit/agent-conduit.log
/// - Linux: ~/.local/share/agent-conduit/agent-conduit.log
/// - Other: ~/agent-conduit/agent-conduit.log
pub fn get_standard_log_path() -> PathBuf {
    #[cfg(target_os = "macos")]
    let mut path = {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
        path.push("Library");
        path.push("Logs");
        path
    };

    #[cfg(any(target_os = "windows", target_os = "linux"))]
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir);

    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));

    path.push(APP_DIR);
    path.push(format!("{}.log", APP_DIR));
    path
}

/// Initialize console logging on stderr
pub fn init(component: &str, default_level: Level, format: LogFormat) -> anyhow::Result<()> {
    init_with_writer(component, default_level, format, io::stderr)
}

/// Initialize logging appended to `log_path`, creating parent directories
pub fn init_to_file(
    component: &str,
    default_level: Level,
    format: LogFormat,
    log_path: &Path,
) -> anyhow::Result<()> {
    use std::fs;

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = fs::OpenOptions::new().create(true).append(true).open(log_path)?;

    init_with_writer(component, default_level, format, log_file)
}

/// Initialize logging with a custom writer
///
/// `RUST_LOG` takes precedence over `default_level` when set. Fails if a
/// global subscriber is already installed.
pub fn init_with_writer<W>(
    component: &str,
    default_level: Level,
    format: LogFormat,
    writer: W,
) -> anyhow::Result<()>
where
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},{}={}",
            default_level,
            component.replace('-', "_"),
            default_level
        ))
    });

    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).json();
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
        LogFormat::Plaintext => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false);
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
    }

    Ok(())
}

/// Redact sensitive information from log output
///
/// ```rust
/// use ac_logging::redact;
///
/// let api_key = "sk-1234567890abcdef";
/// tracing::info!(api_key = %redact(api_key), "API key configured");
/// ```
pub fn redact(_value: impl std::fmt::Display) -> &'static str {
    "[REDACTED]"
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Args {
        #[command(flatten)]
        logging: CliLoggingArgs,
    }

    #[test]
    fn test_redact() {
        assert_eq!(format!("{}", redact("sensitive-data")), "[REDACTED]");
    }

    #[test]
    fn test_cli_log_level_conversion() {
        assert_eq!(Level::from(CliLogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(CliLogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(CliLogLevel::Trace), Level::TRACE);
        assert_eq!(CliLogLevel::default(), CliLogLevel::Warn);
        assert_eq!(CliLogLevel::Debug.to_string(), "debug");
    }

    #[test]
    fn test_parse_logging_flags() {
        let args = Args::try_parse_from([
            "prog",
            "--log-level",
            "debug",
            "--log-format",
            "json",
            "--log-dir",
            "/var/log/ac",
        ])
        .unwrap();

        assert_eq!(args.logging.log_level, Some(CliLogLevel::Debug));
        assert_eq!(args.logging.log_format, Some(LogFormat::Json));
        assert!(args.logging.logs_to_file());
    }

    #[test]
    fn test_console_by_default() {
        let args = Args::try_parse_from(["prog"]).unwrap();
        assert!(!args.logging.logs_to_file());
        assert!(args.logging.log_level.is_none());
    }

    #[test]
    fn test_resolve_log_path() {
        let args = CliLoggingArgs {
            log_dir: Some(PathBuf::from("/var/log/ac")),
            ..Default::default()
        };
        assert_eq!(args.resolve_log_path("ac"), PathBuf::from("/var/log/ac/ac.log"));

        let args = CliLoggingArgs {
            log_dir: Some(PathBuf::from("/var/log/ac")),
            log_file: Some(PathBuf::from("run.log")),
            ..Default::default()
        };
        assert_eq!(args.resolve_log_path("ac"), PathBuf::from("/var/log/ac/run.log"));

        let args = CliLoggingArgs {
            log_dir: Some(PathBuf::from("/var/log/ac")),
            log_file: Some(PathBuf::from("/tmp/explicit.log")),
            ..Default::default()
        };
        assert_eq!(args.resolve_log_path("ac"), PathBuf::from("/tmp/explicit.log"));
    }

    #[test]
    fn test_standard_log_path_for_component() {
        let path = get_standard_log_path_for_component("ac");
        let path_str = path.to_string_lossy();
        assert!(path_str.ends_with("ac.log"));
        assert!(path_str.contains(APP_DIR));
    }

    // The only test that installs the global subscriber
    #[test]
    fn test_init_to_file_writes_and_rejects_second_init() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("nested").join("ac.log");

        init_to_file("ac", Level::INFO, LogFormat::Plaintext, &log_path).unwrap();
        tracing::warn!("written to file");

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("written to file"));

        assert!(init("ac", Level::INFO, LogFormat::Plaintext).is_err());
    }
}

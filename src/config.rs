//! Configuration management for proctable.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use anyhow::{bail, Context, Result};
use proctable::process::{DEFAULT_APP_MARKER, DEFAULT_PROC_ROOT};
use proctable::{SnapshotOptions, Units};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Locations probed when no --config is given.
const DEFAULT_CONFIG_PATHS: [&str; 4] = [
    "/etc/proctable/config.yaml",
    "/etc/proctable/config.yml",
    "./proctable.yaml",
    "./proctable.yml",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(alias = "proc-root")]
    pub proc_root: Option<PathBuf>,

    /// Case-insensitive substring marking the monitored application
    #[serde(alias = "app-marker")]
    pub app_marker: Option<String>,

    /// Page size in bytes; detected via sysconf when unset
    #[serde(alias = "page-size")]
    pub page_size: Option<u64>,

    /// Clock ticks per second; detected via sysconf when unset
    #[serde(alias = "ticks-per-second")]
    pub ticks_per_second: Option<f64>,

    #[serde(alias = "log-level")]
    pub log_level: Option<LogLevel>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            app_marker: Some(DEFAULT_APP_MARKER.to_string()),
            page_size: None,
            ticks_per_second: None,
            log_level: Some(LogLevel::default()),
        }
    }
}

impl Config {
    /// Fills fields the file and CLI left unset with their defaults.
    /// Units stay unset so they are detected at snapshot time.
    fn fill_defaults(&mut self) {
        let defaults = Config::default();
        if self.proc_root.is_none() {
            self.proc_root = defaults.proc_root;
        }
        if self.app_marker.is_none() {
            self.app_marker = defaults.app_marker;
        }
        if self.log_level.is_none() {
            self.log_level = defaults.log_level;
        }
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level.unwrap_or_default()
    }

    /// The config as a snapshot would use it, detected units included.
    pub fn effective(&self) -> Config {
        let opts = self.snapshot_options();
        Config {
            proc_root: Some(opts.proc_root),
            app_marker: Some(opts.app_marker),
            page_size: Some(opts.units.page_size),
            ticks_per_second: Some(opts.units.ticks_per_second),
            log_level: Some(self.log_level()),
        }
    }

    /// Snapshot options with detected units filled in where unset.
    pub fn snapshot_options(&self) -> SnapshotOptions {
        let detected = Units::detect();
        SnapshotOptions {
            proc_root: self
                .proc_root
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT)),
            app_marker: self
                .app_marker
                .clone()
                .unwrap_or_else(|| DEFAULT_APP_MARKER.to_string()),
            units: Units {
                page_size: self.page_size.unwrap_or(detected.page_size),
                ticks_per_second: self.ticks_per_second.unwrap_or(detected.ticks_per_second),
            },
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<()> {
    if let Some(root) = &cfg.proc_root {
        if root.as_os_str().is_empty() {
            bail!("proc_root must not be empty");
        }
    }
    if cfg.page_size == Some(0) {
        bail!("page_size must be greater than zero");
    }
    if let Some(tps) = cfg.ticks_per_second {
        if !tps.is_finite() || tps <= 0.0 {
            bail!("ticks_per_second must be a positive number, got {}", tps);
        }
    }
    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(root) = &args.proc_root {
        config.proc_root = Some(root.clone());
    }
    if let Some(marker) = &args.app_marker {
        config.app_marker = Some(marker.clone());
    }
    if args.page_size.is_some() {
        config.page_size = args.page_size;
    }
    if args.ticks_per_second.is_some() {
        config.ticks_per_second = args.ticks_per_second;
    }
    if args.log_level.is_some() {
        config.log_level = args.log_level;
    }

    config.fill_defaults();
    Ok(config)
}

/// Enhanced configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match DEFAULT_CONFIG_PATHS.iter().find(|p| Path::new(p).exists()) {
            Some(p) => PathBuf::from(p),
            None => return Ok(Config::default()),
        },
    };

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config = parse_config(&content, &path)?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

/// Parses config content, choosing the format from the file extension.
fn parse_config(content: &str, path: &Path) -> Result<Config> {
    let config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(content)
            .with_context(|| format!("Invalid JSON config {}", path.display()))?,
        Some("toml") => toml::from_str(content)
            .with_context(|| format!("Invalid TOML config {}", path.display()))?,
        // Default to YAML
        _ => serde_yaml::from_str(content)
            .with_context(|| format!("Invalid YAML config {}", path.display()))?,
    };
    Ok(config)
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<()> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_effective_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_units() {
        let mut cfg = Config::default();
        cfg.page_size = Some(0);
        assert!(validate_effective_config(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.ticks_per_second = Some(0.0);
        assert!(validate_effective_config(&cfg).is_err());

        let mut cfg = Config::default();
        cfg.ticks_per_second = Some(f64::NAN);
        assert!(validate_effective_config(&cfg).is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_log_level() {
        assert!(parse_config("log_level: loud\n", Path::new("cfg.yaml")).is_err());
        let cfg = parse_config("log-level: debug\n", Path::new("cfg.yaml")).unwrap();
        assert_eq!(cfg.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn test_log_level_precedence() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("proctable.yaml");
        fs::write(&path, "log_level: debug\n").expect("Failed to write config");
        let path = path.to_str().unwrap();

        let from_file = resolve_config(&Args::parse_from(["proctable", "--config", path])).unwrap();
        assert_eq!(from_file.log_level(), LogLevel::Debug);

        let from_cli = resolve_config(&Args::parse_from([
            "proctable",
            "--config",
            path,
            "--log-level",
            "trace",
        ]))
        .unwrap();
        assert_eq!(from_cli.log_level(), LogLevel::Trace);

        let fallback = resolve_config(&Args::parse_from(["proctable", "--no-config"])).unwrap();
        assert_eq!(fallback.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_loaded_config_fills_unset_fields() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("proctable.yaml");
        fs::write(&path, "page_size: 8192\n").expect("Failed to write config");

        let args = Args::parse_from(["proctable", "--config", path.to_str().unwrap()]);
        let cfg = resolve_config(&args).unwrap();
        assert_eq!(cfg.proc_root, Some(PathBuf::from(DEFAULT_PROC_ROOT)));
        assert_eq!(cfg.app_marker.as_deref(), Some(DEFAULT_APP_MARKER));
        assert_eq!(cfg.log_level, Some(LogLevel::Warn));

        let shown = serde_yaml::to_string(&cfg.effective()).unwrap();
        assert!(!shown.contains("null"), "shown: {shown}");
        assert!(shown.contains("page_size: 8192"), "shown: {shown}");
        assert!(shown.contains("app_marker: boinc"), "shown: {shown}");
    }

    #[test]
    fn test_parse_yaml_with_kebab_aliases() {
        let yaml = "app-marker: seti\npage-size: 16384\nticks-per-second: 250\n";
        let cfg = parse_config(yaml, Path::new("cfg.yaml")).unwrap();
        assert_eq!(cfg.app_marker.as_deref(), Some("seti"));
        assert_eq!(cfg.page_size, Some(16384));
        assert_eq!(cfg.ticks_per_second, Some(250.0));
        assert!(cfg.proc_root.is_none());
    }

    #[test]
    fn test_parse_json_and_toml() {
        let cfg = parse_config(r#"{"proc_root": "/host/proc"}"#, Path::new("c.json")).unwrap();
        assert_eq!(cfg.proc_root, Some(PathBuf::from("/host/proc")));

        let cfg = parse_config("app_marker = \"boinc\"\n", Path::new("c.toml")).unwrap();
        assert_eq!(cfg.app_marker.as_deref(), Some("boinc"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("proctable.yaml");
        fs::write(&path, "app_marker: fromfile\npage_size: 8192\n").expect("Failed to write config");

        let args = Args::parse_from([
            "proctable",
            "--config",
            path.to_str().unwrap(),
            "--app-marker",
            "fromcli",
        ]);
        let cfg = resolve_config(&args).unwrap();
        assert_eq!(cfg.app_marker.as_deref(), Some("fromcli"));
        assert_eq!(cfg.page_size, Some(8192));

        let opts = cfg.snapshot_options();
        assert_eq!(opts.units.page_size, 8192);
        assert_eq!(opts.app_marker, "fromcli");
        assert_eq!(opts.proc_root, PathBuf::from(DEFAULT_PROC_ROOT));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let dir = tempdir().expect("Failed to create temp dir");
        assert!(load_config(Some(&dir.path().join("absent.yaml"))).is_err());
    }
}

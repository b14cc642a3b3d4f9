use crate::error::AddrexError;
use crate::print::headless::default_browser_candidates;
use crate::print::PrintOptions;
use crate::spreadsheet::{DEFAULT_DATA_HEADER, DEFAULT_SPREADSHEET};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application settings. Every field may be omitted from the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Workbook that extracted rows are appended to.
    pub spreadsheet_path: PathBuf,
    /// Label of the second header cell.
    pub header_label: String,
    /// Scan subfolders as well.
    pub recursive: bool,
    pub print: PrintConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            spreadsheet_path: PathBuf::from(DEFAULT_SPREADSHEET),
            header_label: DEFAULT_DATA_HEADER.into(),
            recursive: false,
            print: PrintConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintMode {
    Headless,
    Interactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintConfig {
    pub mode: PrintMode,
    /// Browser paths or program names tried in order for headless printing.
    pub browser_candidates: Vec<String>,
    /// Reader used for interactive printing.
    pub viewer: Option<String>,
    pub timeout_secs: u64,
    pub settle_ms: u64,
    pub between_files_ms: u64,
    pub key_delay_ms: u64,
}

impl Default for PrintConfig {
    fn default() -> Self {
        PrintConfig {
            mode: PrintMode::Headless,
            browser_candidates: default_browser_candidates(),
            viewer: None,
            timeout_secs: 30,
            settle_ms: 2000,
            between_files_ms: 1000,
            key_delay_ms: 1000,
        }
    }
}

impl PrintConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn key_delay(&self) -> Duration {
        Duration::from_millis(self.key_delay_ms)
    }

    pub fn options(&self) -> PrintOptions {
        PrintOptions {
            between_files: Duration::from_millis(self.between_files_ms),
        }
    }
}

/// Load settings from a JSON file.
pub fn load_config(path: &Path) -> Result<AppConfig, AddrexError> {
    let content = std::fs::read_to_string(path).map_err(|e| AddrexError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_config(&content, path)
}

/// Parse settings from a JSON string.
pub fn parse_config(json: &str, source: &Path) -> Result<AppConfig, AddrexError> {
    let config: AppConfig = serde_json::from_str(json).map_err(|e| AddrexError::ConfigLoad {
        path: source.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_config(&config, source)?;
    Ok(config)
}

fn validate_config(config: &AppConfig, source: &Path) -> Result<(), AddrexError> {
    let invalid = |reason: &str| AddrexError::ConfigLoad {
        path: source.to_path_buf(),
        reason: reason.into(),
    };
    if config.spreadsheet_path.as_os_str().is_empty() {
        return Err(invalid("spreadsheet_path must not be empty"));
    }
    if config.header_label.trim().is_empty() {
        return Err(invalid("header_label must not be empty"));
    }
    if config.print.timeout_secs == 0 {
        return Err(invalid("print.timeout_secs must be positive"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = parse_config("{}", Path::new("cfg.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.spreadsheet_path, PathBuf::from("addresses.xlsx"));
        assert_eq!(config.print.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_print_section() {
        let json = r#"{
            "header_label": "Extracted Address",
            "print": { "mode": "interactive", "viewer": "evince", "settle_ms": 500 }
        }"#;
        let config = parse_config(json, Path::new("cfg.json")).unwrap();
        assert_eq!(config.header_label, "Extracted Address");
        assert_eq!(config.print.mode, PrintMode::Interactive);
        assert_eq!(config.print.viewer.as_deref(), Some("evince"));
        assert_eq!(config.print.settle(), Duration::from_millis(500));
        assert_eq!(config.print.between_files_ms, 1000);
    }

    #[test]
    fn rejects_blank_header() {
        let err = parse_config(r#"{"header_label": "  "}"#, Path::new("cfg.json")).unwrap_err();
        assert!(err.to_string().contains("header_label"));
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = parse_config(r#"{"print": {"mode": "fax"}}"#, Path::new("c.json")).unwrap_err();
        assert!(matches!(err, AddrexError::ConfigLoad { .. }));
    }

    #[test]
    fn missing_file() {
        let err = load_config(Path::new("/no/such/config.json")).unwrap_err();
        assert!(matches!(err, AddrexError::ConfigLoad { .. }));
    }
}

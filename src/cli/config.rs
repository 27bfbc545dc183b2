// FILE: src/cli/config.rs

use crate::error::{FormError, Result};
use crate::rules::parse_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Fixed "today" for date defaults, as YYYY-MM-DD
    pub today: Option<String>,
    pub confirm_dialogs: Option<bool>,
    /// Default output format of `fill` (text or json)
    pub output_format: Option<String>,
    /// Directory searched for `<form_type>.toml` / `<form_type>.json` layouts
    pub layout_directory: Option<String>,
}

impl ConfigFile {
    pub fn today(&self) -> Result<Option<NaiveDate>> {
        match &self.today {
            Some(text) => parse_date(text).map(Some).ok_or_else(|| {
                FormError::invalid_format(format!("Invalid date in config: {} (expected YYYY-MM-DD)", text))
            }),
            None => Ok(None),
        }
    }

    /// Layout file for `form_type` inside the layout directory, if one exists
    pub fn layout_for(&self, form_type: &str) -> Option<PathBuf> {
        let dir = Path::new(self.layout_directory.as_deref()?);
        ["toml", "json"]
            .iter()
            .map(|ext| dir.join(format!("{}.{}", form_type, ext)))
            .find(|path| path.is_file())
    }
}

pub fn load(config_path: &str) -> Result<ConfigFile> {
    let config_content = fs::read_to_string(config_path).map_err(|e| FormError::FileNotFound {
        path: format!("Config file {}: {}", config_path, e),
    })?;

    let config: ConfigFile = if config_path.ends_with(".json") {
        serde_json::from_str(&config_content).map_err(|e| FormError::InvalidFormat {
            message: format!("Invalid JSON config: {}", e),
        })?
    } else if config_path.ends_with(".toml") {
        toml::from_str(&config_content).map_err(|e| FormError::InvalidFormat {
            message: format!("Invalid TOML config: {}", e),
        })?
    } else {
        return Err(FormError::InvalidFormat {
            message: "Config file must be .json or .toml format".to_string(),
        });
    };
    log::info!("Loaded configuration from {}", config_path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_toml_and_json() {
        let dir = TempDir::new().unwrap();
        let toml_path = dir.path().join("formfill.toml");
        fs::write(&toml_path, "today = \"2024-02-29\"\nconfirm_dialogs = false\n").unwrap();
        let config = load(toml_path.to_str().unwrap()).unwrap();
        assert_eq!(config.today().unwrap(), NaiveDate::from_ymd_opt(2024, 2, 29));
        assert_eq!(config.confirm_dialogs, Some(false));

        let json_path = dir.path().join("formfill.json");
        fs::write(&json_path, r#"{"output_format": "json"}"#).unwrap();
        let config = load(json_path.to_str().unwrap()).unwrap();
        assert_eq!(config.output_format.as_deref(), Some("json"));
        assert_eq!(config.today().unwrap(), None);
    }

    #[test]
    fn test_bad_config_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("formfill.ini");
        fs::write(&path, "today=now").unwrap();
        assert!(matches!(
            load(path.to_str().unwrap()),
            Err(FormError::InvalidFormat { .. })
        ));
        assert!(matches!(load("/nonexistent.toml"), Err(FormError::FileNotFound { .. })));

        let config = ConfigFile {
            today: Some("29/02/2024".to_string()),
            ..Default::default()
        };
        assert!(config.today().is_err());
    }

    #[test]
    fn test_layout_directory_lookup() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("inventory.json"), "{}").unwrap();
        let config = ConfigFile {
            layout_directory: Some(dir.path().to_string_lossy().into_owned()),
            ..Default::default()
        };
        assert_eq!(config.layout_for("inventory"), Some(dir.path().join("inventory.json")));
        assert_eq!(config.layout_for("annual_leave"), None);
        assert_eq!(ConfigFile::default().layout_for("inventory"), None);
    }
}

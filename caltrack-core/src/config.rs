//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "weightUnit": "kg",
//!   "trendWindow": "7",
//!   "strictTrend": false
//! }
//! ```
//! Keys this crate does not know about are kept when saving.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::{Error, Result, TrendWindow, WeightUnit};

const SETTINGS_FILE: &str = "settings.json";
const WEIGHT_UNIT_ENV: &str = "CALTRACK_WEIGHT_UNIT";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    weight_unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    trend_window: Option<String>,
    #[serde(default)]
    strict_trend: bool,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// CalTrack configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub weight_unit: WeightUnit,
    pub trend_window: TrendWindow,
    pub strict_trend: bool,
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing file means defaults. `CALTRACK_WEIGHT_UNIT` overrides the
    /// stored weight unit.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = read_settings(data_dir)?;

        let unit_source = std::env::var(WEIGHT_UNIT_ENV).ok().or(raw.weight_unit);
        let weight_unit = match unit_source {
            Some(s) => s
                .parse()
                .map_err(|_| Error::Config(format!("invalid weightUnit '{}'", s)))?,
            None => WeightUnit::default(),
        };

        let trend_window = match raw.trend_window {
            Some(s) => s
                .parse()
                .map_err(|_| Error::Config(format!("invalid trendWindow '{}'", s)))?,
            None => TrendWindow::default(),
        };

        Ok(Self {
            weight_unit,
            trend_window,
            strict_trend: raw.strict_trend,
        })
    }

    /// Save config to the data directory, keeping unrelated keys
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let mut settings = read_settings(data_dir)?;

        settings.weight_unit = Some(self.weight_unit.to_string());
        settings.trend_window = Some(self.trend_window.to_string());
        settings.strict_trend = self.strict_trend;

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(data_dir.join(SETTINGS_FILE), content)?;
        Ok(())
    }
}

fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
    let path = data_dir.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&path)?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("{} is not valid: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Period;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.trend_window, TrendWindow::default());
        assert!(!config.strict_trend);
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"theme": "dark", "trendWindow": "week"}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        assert_eq!(config.trend_window, TrendWindow::Period(Period::Week));

        config.strict_trend = true;
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap(),
        )
        .unwrap();
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["strictTrend"], true);
        assert_eq!(saved["trendWindow"], "week");
    }

    #[test]
    fn test_invalid_window_is_config_error() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILE), r#"{"trendWindow": "0"}"#).unwrap();
        assert!(matches!(Config::load(dir.path()), Err(Error::Config(_))));
    }
}

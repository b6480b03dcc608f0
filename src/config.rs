use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// CSV question bank to load instead of the bundled one.
    #[serde(default)]
    pub question_bank: Option<PathBuf>,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_mini_quiz_length")]
    pub mini_quiz_length: usize,
    #[serde(default = "default_auto_advance")]
    pub auto_advance: bool,
    #[serde(default = "default_reveal_delay_ms")]
    pub reveal_delay_ms: u64,
    /// Chapters offered on the selection screen. Empty means every chapter in the bank.
    #[serde(default)]
    pub chapters: Vec<String>,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_mini_quiz_length() -> usize {
    10
}
fn default_auto_advance() -> bool {
    true
}
fn default_reveal_delay_ms() -> u64 {
    2000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            question_bank: None,
            theme: default_theme(),
            mini_quiz_length: default_mini_quiz_length(),
            auto_advance: default_auto_advance(),
            reveal_delay_ms: default_reveal_delay_ms(),
            chapters: Vec::new(),
            seed: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Read settings from `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kotoba")
            .join("config.toml")
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    /// Clamp numeric settings into usable ranges and drop blank chapter keys.
    pub fn validate(&mut self) {
        self.mini_quiz_length = self.mini_quiz_length.clamp(1, 100);
        self.reveal_delay_ms = self.reveal_delay_ms.min(10_000);
        self.chapters.retain(|c| !c.trim().is_empty());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.question_bank, None);
        assert_eq!(config.mini_quiz_length, 10);
        assert!(config.auto_advance);
        assert_eq!(config.reveal_delay_ms, 2000);
        assert!(config.chapters.is_empty());
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_config_serde_partial_fields() {
        let toml_str = r#"
question_bank = "/tmp/quizsheet.csv"
mini_quiz_length = 5
chapters = ["1", "2", "3", "4"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.question_bank, Some(PathBuf::from("/tmp/quizsheet.csv")));
        assert_eq!(config.mini_quiz_length, 5);
        assert_eq!(config.chapters.len(), 4);
        assert_eq!(config.theme, "catppuccin-mocha");
        assert!(config.auto_advance);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let mut config = Config::default();
        config.seed = Some(42);
        config.chapters = vec!["2".to_string()];
        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized.seed, Some(42));
        assert_eq!(deserialized.chapters, vec!["2".to_string()]);
        assert_eq!(deserialized.reveal_delay_ms, config.reveal_delay_ms);
    }

    #[test]
    fn test_save_to_then_load_from() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("kotoba").join("config.toml");

        let mut config = Config::default();
        config.mini_quiz_length = 7;
        config.auto_advance = false;
        config.question_bank = Some(PathBuf::from("quizsheet.csv"));
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.mini_quiz_length, 7);
        assert!(!loaded.auto_advance);
        assert_eq!(loaded.question_bank, Some(PathBuf::from("quizsheet.csv")));
    }

    #[test]
    fn test_load_from_missing_file_is_default() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.mini_quiz_length, 10);
        assert!(config.auto_advance);
    }

    #[test]
    fn test_load_from_validates() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "mini_quiz_length = 0\n").unwrap();
        assert_eq!(Config::load_from(&path).unwrap().mini_quiz_length, 1);
    }

    #[test]
    fn test_validate_clamps_values() {
        let mut config = Config::default();
        config.mini_quiz_length = 0;
        config.reveal_delay_ms = 60_000;
        config.chapters = vec!["1".to_string(), "  ".to_string()];
        config.validate();
        assert_eq!(config.mini_quiz_length, 1);
        assert_eq!(config.reveal_delay_ms, 10_000);
        assert_eq!(config.chapters, vec!["1".to_string()]);

        config.mini_quiz_length = 500;
        config.validate();
        assert_eq!(config.mini_quiz_length, 100);
    }

    #[test]
    fn test_reveal_delay_duration() {
        let config = Config::default();
        assert_eq!(config.reveal_delay(), Duration::from_secs(2));
    }
}

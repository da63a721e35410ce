use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// User preferences persisted to `prefs.toml` in the platform config dir.
#[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
pub struct Config {
  pub theme_name: Option<String>,
  /// Catalog file path or `http(s)` URL used when `--catalog` is not given.
  pub catalog: Option<String>,
  pub sort: Option<String>,
}

impl Config {
  fn config_file() -> Option<PathBuf> {
    ProjectDirs::from("", "", "televe").map(|dirs| dirs.config_dir().join("prefs.toml"))
  }

  pub fn load() -> Self {
    if let Some(config_file) = Self::config_file()
      && let Ok(content) = std::fs::read_to_string(config_file)
      && let Ok(config) = toml::from_str(&content)
    {
      return config;
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(config_file) = Self::config_file()
      && let Some(config_dir) = config_file.parent()
      && std::fs::create_dir_all(config_dir).is_ok()
      && let Ok(content) = toml::to_string(self)
    {
      let _ = std::fs::write(config_file, content);
    }
  }
}

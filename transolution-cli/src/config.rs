//! Optional `transolution.toml` settings.
//!
//! ```toml
//! default_format = "resx"
//! log_level = "info"
//! ```

use serde::Deserialize;
use std::path::Path;

/// File looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "transolution.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Format tag for files added without `--format`.
    pub default_format: Option<String>,
    /// Log level used when no `-v` flag is given.
    pub log_level: Option<String>,
}

impl Config {
    /// Loads `explicit`, or `./transolution.toml` when it exists, or defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let path = Path::new(CONFIG_FILE_NAME);
                if path.is_file() {
                    Self::from_file(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read config {}: {}", path.display(), e))?;
        Self::parse(&text).map_err(|e| format!("Invalid config {}: {}", path.display(), e))
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

//! CLI configuration: optional TOML file plus `REFDESK_*` environment
//! variables, with the database URL overridable from the command line.

use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/refdesk.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: Database,
    /// Log level fed into the env filter (`error`..`trace`).
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: Database::Sqlite("./refdesk.db".to_string()),
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Database::Memory => "sqlite::memory:".to_string(),
            Database::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

pub fn load(config_path: Option<&str>) -> Result<Settings, config::ConfigError> {
    let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
    config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(config::Environment::with_prefix("REFDESK"))
        .build()?
        .try_deserialize()
}

use serde::Deserialize;

const DEFAULT_SETTINGS_PATH: &str = "settings.toml";
const ENV_PREFIX: &str = "MONEYPLANNER";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// `memory`, or `{ sqlite = "<path>" }`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("moneyplanner.db".to_string())
    }
}

impl Database {
    pub fn url(&self) -> String {
        match self {
            Self::Memory => String::from("sqlite::memory:"),
            Self::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
}

impl Settings {
    /// `settings.toml` when present, overlaid by `MONEYPLANNER__*` variables.
    pub fn new() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name(DEFAULT_SETTINGS_PATH).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(raw: &str) -> Settings {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_source_falls_back_to_defaults() {
        let settings = from_toml("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.address(), "127.0.0.1:3000");
        assert_eq!(settings.database.url(), "sqlite:moneyplanner.db?mode=rwc");
    }

    #[test]
    fn database_variants() {
        let settings = from_toml("database = \"memory\"");
        assert_eq!(settings.database, Database::Memory);
        assert_eq!(settings.database.url(), "sqlite::memory:");

        let settings = from_toml("[database]\nsqlite = \"/tmp/mp.db\"");
        assert_eq!(settings.database, Database::Sqlite("/tmp/mp.db".to_string()));
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let settings = from_toml("[server]\nport = 8080\n[app]\nlevel = \"debug\"");
        assert_eq!(settings.address(), "127.0.0.1:8080");
        assert_eq!(settings.app.level, "debug");
    }
}

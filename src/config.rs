use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "postline.toml";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

impl LoggingConfig {
    const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    const DEFAULT_LEVEL: &str = "info";

    fn default() -> Self {
        LoggingConfig {
            level: Self::DEFAULT_LEVEL.to_string(),
        }
    }

    fn ensure_valid(&mut self) {
        let str_original = self.level.clone();
        self.level = self.level.trim().to_ascii_lowercase();
        if !Self::LOG_LEVELS.contains(&self.level.as_str()) {
            eprintln!(
                "Config error: log level of '{}' is invalid - using default of '{}'",
                str_original,
                Self::DEFAULT_LEVEL
            );
            self.level = Self::DEFAULT_LEVEL.to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    const PROTOCOLS: [&str; 2] = ["http", "https"];
    const DEFAULT_PROTOCOL: &str = "http";

    fn default() -> Self {
        ServerConfig {
            protocol: Self::DEFAULT_PROTOCOL.to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }

    fn ensure_valid(&mut self) {
        let str_original = self.protocol.clone();
        self.protocol = self.protocol.trim().to_ascii_lowercase();
        if !Self::PROTOCOLS.contains(&self.protocol.as_str()) {
            eprintln!(
                "Config error: protocol of '{}' is invalid - using default of '{}'",
                str_original,
                Self::DEFAULT_PROTOCOL
            );
            self.protocol = Self::DEFAULT_PROTOCOL.to_owned();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

impl DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: "./postline.db".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PaginationConfig {
    pub default_take: i64,
}

impl PaginationConfig {
    const DEFAULT_TAKE: i64 = 20;

    fn default() -> Self {
        PaginationConfig {
            default_take: Self::DEFAULT_TAKE,
        }
    }

    fn ensure_valid(&mut self) {
        if self.default_take <= 0 {
            eprintln!(
                "Config error: default_take of '{}' is invalid - using default of '{}'",
                self.default_take,
                Self::DEFAULT_TAKE
            );
            self.default_take = Self::DEFAULT_TAKE;
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    pub logging: LoggingConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pagination: PaginationConfig,
}

impl Config {
    /// Loads the configuration from `postline.toml` (or an explicit path),
    /// layered over built-in defaults and under `POSTLINE_`-prefixed
    /// environment variables. A missing or unparsable file falls back to
    /// defaults rather than failing startup.
    pub fn load(config_path: Option<&Path>) -> Self {
        let default_config = Config {
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            pagination: PaginationConfig::default(),
        };

        let toml_provider = match config_path {
            Some(path) => Toml::file(path),
            None => Toml::file(CONFIG_FILE),
        };

        let figment = Figment::from(Serialized::defaults(default_config.clone()))
            .merge(toml_provider)
            .merge(Env::prefixed("POSTLINE_").split("__"));

        let mut config = figment.extract().unwrap_or_else(|err| {
            eprintln!("Could not load configuration: {err}. Using default configuration.");
            default_config
        });

        config.ensure_valid();

        config
    }

    fn ensure_valid(&mut self) {
        self.logging.ensure_valid();
        self.server.ensure_valid();
        self.pagination.ensure_valid();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_when_no_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load(None);
            assert_eq!(config.server.port, 3000);
            assert_eq!(config.pagination.default_take, 20);
            assert_eq!(config.logging.level, "info");
            Ok(())
        });
    }

    #[test]
    fn test_toml_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                [server]
                protocol = "https"
                host = "feeds.example.com"
                port = 8443
                "#,
            )?;
            let config = Config::load(None);
            assert_eq!(config.server.protocol, "https");
            assert_eq!(config.server.host, "feeds.example.com");
            assert_eq!(config.server.port, 8443);
            Ok(())
        });
    }

    #[test]
    fn test_invalid_values_fall_back() {
        Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE,
                r#"
                [logging]
                level = "shouting"

                [pagination]
                default_take = -5
                "#,
            )?;
            let config = Config::load(None);
            assert_eq!(config.logging.level, "info");
            assert_eq!(config.pagination.default_take, 20);
            Ok(())
        });
    }
}

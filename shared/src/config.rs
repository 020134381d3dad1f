use tracing::warn;

/// Connection settings for the document database.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database_name: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            port: Self::DEFAULT_PORT,
            database_name: Self::DEFAULT_DATABASE.to_string(),
        }
    }
}

impl DbConfig {
    const DEFAULT_HOST: &str = "localhost";
    const DEFAULT_PORT: u16 = 27017;
    const DEFAULT_DATABASE: &str = "files_manager";

    pub fn new(host: impl Into<String>, port: u16, database_name: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            database_name: database_name.into(),
        }
    }

    /// Reads `DB_HOST`, `DB_PORT` and `DB_DATABASE`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("DB_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let port = match lookup("DB_PORT") {
            Some(raw) => raw.trim().parse::<u16>().unwrap_or_else(|_| {
                warn!(
                    "DB_PORT={:?} is not a valid port, using {}",
                    raw,
                    Self::DEFAULT_PORT
                );
                Self::DEFAULT_PORT
            }),
            None => Self::DEFAULT_PORT,
        };
        let database_name =
            lookup("DB_DATABASE").unwrap_or_else(|| Self::DEFAULT_DATABASE.to_string());

        Self {
            host,
            port,
            database_name,
        }
    }

    pub fn url(&self) -> String {
        format!("mongodb://{}:{}", self.host, self.port)
    }
}

/// HTTP listener settings for the bootstrap binary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_PORT: u16 = 5000;

    pub fn from_env() -> Self {
        let host = std::env::var("SERVER_HOST").unwrap_or_else(|_| Self::DEFAULT_HOST.to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| Self::DEFAULT_PORT.to_string())
            .parse::<u16>()
            .unwrap_or(Self::DEFAULT_PORT);
        Self { host, port }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_db_config_defaults() {
        let config = DbConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, DbConfig::default());
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 27017);
        assert_eq!(config.database_name, "files_manager");
        assert_eq!(config.url(), "mongodb://localhost:27017");
    }

    #[test]
    fn test_db_config_overrides() {
        let config = DbConfig::from_lookup(lookup_from(&[
            ("DB_HOST", "mongo.internal"),
            ("DB_PORT", "27018"),
            ("DB_DATABASE", "archive"),
        ]));
        assert_eq!(config.host, "mongo.internal");
        assert_eq!(config.port, 27018);
        assert_eq!(config.database_name, "archive");
        assert_eq!(config.url(), "mongodb://mongo.internal:27018");
    }

    #[test]
    fn test_db_config_invalid_port_falls_back() {
        let config = DbConfig::from_lookup(lookup_from(&[("DB_PORT", "not-a-port")]));
        assert_eq!(config.port, 27017);
    }
}

//! Runtime settings from environment variables.

use crate::error::ConfigError;
use crate::service::IdPolicy;
use std::net::SocketAddr;

/// Which [`crate::store::EntityStore`] implementation backs the services.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub backend: StoreBackend,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    /// Drop and recreate the tables at startup.
    pub init_tables: bool,
    pub id_policy: IdPolicy,
    /// Answer an empty list with 204 instead of `[]`.
    pub empty_list_no_content: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any variable source. `DATABASE_URL` wins over the `POSTGRES_*` parts.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => {
                let host = get("POSTGRES_HOST").unwrap_or_else(|| "localhost".into());
                let port = get("POSTGRES_PORT").unwrap_or_else(|| "5432".into());
                let user = get("POSTGRES_USER").unwrap_or_else(|| "postgres".into());
                let db = get("POSTGRES_DB").unwrap_or_else(|| "forum".into());
                match get("POSTGRES_PASSWORD") {
                    Some(pw) => format!("postgres://{}:{}@{}:{}/{}", user, pw, host, port, db),
                    None => format!("postgres://{}@{}:{}/{}", user, host, port, db),
                }
            }
        };

        let backend = match get("STORE_BACKEND").as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        let bind_addr = match get("BIND_ADDR") {
            Some(v) => v
                .parse::<SocketAddr>()
                .map_err(|_| ConfigError::Invalid { key: "BIND_ADDR", value: v })?,
            None => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse()
                .ok()
                .filter(|n: &u32| *n > 0)
                .ok_or(ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", value: v })?,
            None => 5,
        };

        let id_policy = if parse_flag("ALLOW_ID_REASSIGNMENT", get("ALLOW_ID_REASSIGNMENT"))? {
            IdPolicy::Reassignable
        } else {
            IdPolicy::Immutable
        };

        Ok(Settings {
            database_url,
            backend,
            bind_addr,
            max_connections,
            init_tables: parse_flag("INIT_TABLES", get("INIT_TABLES"))?,
            id_policy,
            empty_list_no_content: parse_flag("EMPTY_LIST_NO_CONTENT", get("EMPTY_LIST_NO_CONTENT"))?,
        })
    }
}

fn parse_flag(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    match value {
        None => Ok(false),
        Some(v) => match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value: v }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.database_url, "postgres://postgres@localhost:5432/forum");
        assert_eq!(s.backend, StoreBackend::Postgres);
        assert_eq!(s.bind_addr.port(), 3000);
        assert_eq!(s.max_connections, 5);
        assert!(!s.init_tables);
        assert_eq!(s.id_policy, IdPolicy::Immutable);
        assert!(!s.empty_list_no_content);
    }

    #[test]
    fn url_is_composed_from_parts() {
        let s = settings(&[
            ("POSTGRES_HOST", "db"),
            ("POSTGRES_PORT", "6543"),
            ("POSTGRES_USER", "forum"),
            ("POSTGRES_PASSWORD", "secret"),
            ("POSTGRES_DB", "somewhere"),
        ])
        .unwrap();
        assert_eq!(s.database_url, "postgres://forum:secret@db:6543/somewhere");
    }

    #[test]
    fn database_url_wins() {
        let s = settings(&[("DATABASE_URL", "postgres://x/y"), ("POSTGRES_HOST", "db")]).unwrap();
        assert_eq!(s.database_url, "postgres://x/y");
    }

    #[test]
    fn flags_and_backend() {
        let s = settings(&[
            ("STORE_BACKEND", "Memory"),
            ("ALLOW_ID_REASSIGNMENT", "true"),
            ("INIT_TABLES", "1"),
            ("EMPTY_LIST_NO_CONTENT", "yes"),
        ])
        .unwrap();
        assert_eq!(s.backend, StoreBackend::Memory);
        assert_eq!(s.id_policy, IdPolicy::Reassignable);
        assert!(s.init_tables);
        assert!(s.empty_list_no_content);
    }

    #[test]
    fn invalid_values_are_reported() {
        assert!(matches!(
            settings(&[("STORE_BACKEND", "sqlite")]),
            Err(ConfigError::UnknownBackend(_))
        ));
        assert!(matches!(
            settings(&[("INIT_TABLES", "maybe")]),
            Err(ConfigError::Invalid { key: "INIT_TABLES", .. })
        ));
        assert!(matches!(
            settings(&[("DB_MAX_CONNECTIONS", "0")]),
            Err(ConfigError::Invalid { key: "DB_MAX_CONNECTIONS", .. })
        ));
        assert!(settings(&[("BIND_ADDR", "nowhere")]).is_err());
    }
}

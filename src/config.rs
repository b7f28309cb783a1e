use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    pub version: String,
    pub path_prefix: String,
    pub max_body_bytes: usize,
    pub allowed_origins: Vec<String>,
    pub stats: bool,
    pub stats_host: Option<String>,
    pub db: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub driver: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 8080,
            version: "/v1".to_string(),
            path_prefix: "messages".to_string(),
            max_body_bytes: crate::routes::DEFAULT_BODY_LIMIT,
            allowed_origins: Vec::new(),
            stats: false,
            stats_host: None,
            db: StoreConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            driver: "mysql".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3306,
            user: "root".to_string(),
            password: String::new(),
            name: "messageDB".to_string(),
            max_connections: 8,
            acquire_timeout_secs: 10,
        }
    }
}

impl Config {
    /// Reads `path` if it exists, otherwise starts from the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Defaults, then the TOML file named by `SVC_CONFIG`, then the
    /// process environment.
    pub fn from_env_config() -> anyhow::Result<Self> {
        let path = std::env::var("SVC_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = Self::load(Path::new(&path))?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Overrides fields from `lookup`. Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("SVC_BIND") {
            self.bind = v;
        }
        if let Some(v) = get("SVC_PORT") {
            self.port = parse("SVC_PORT", &v)?;
        }
        if let Some(v) = get("SVC_VERSION") {
            self.version = v;
        }
        if let Some(v) = get("SVC_PATH_PREFIX") {
            self.path_prefix = v;
        }
        if let Some(v) = get("SVC_MAX_BODY_BYTES") {
            self.max_body_bytes = parse("SVC_MAX_BODY_BYTES", &v)?;
        }
        if let Some(v) = get("STATS") {
            self.stats = v == "on";
        }
        if let Some(v) = get("STATS_HOST") {
            self.stats_host = Some(v);
        }
        if let Some(v) = get("DB_DRIVER") {
            self.db.driver = v;
        }
        if let Some(v) = get("DB_HOST") {
            self.db.host = v;
        }
        if let Some(v) = get("DB_PORT") {
            self.db.port = parse("DB_PORT", &v)?;
        }
        if let Some(v) = get("DB_USER") {
            self.db.user = v;
        }
        if let Some(v) = get("DB_PASSWD") {
            self.db.password = v;
        }
        if let Some(v) = get("DB_NAME") {
            self.db.name = v;
        }
        if let Some(v) = get("DB_MAX_CONNECTIONS") {
            self.db.max_connections = parse("DB_MAX_CONNECTIONS", &v)?;
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Version segment joined with the resource segment, e.g. `/v1/messages`.
    pub fn resource_path(&self) -> String {
        let version = self.version.trim_matches('/');
        let prefix = self.path_prefix.trim_matches('/');
        match (version.is_empty(), prefix.is_empty()) {
            (true, true) => String::new(),
            (true, false) => format!("/{prefix}"),
            (false, true) => format!("/{version}"),
            (false, false) => format!("/{version}/{prefix}"),
        }
    }
}

fn parse<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("invalid value for {key}: {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.resource_path(), "/v1/messages");
        assert_eq!(cfg.db.name, "messageDB");
        assert!(!cfg.stats);
    }

    #[test]
    fn env_overrides() {
        let mut cfg = Config::default();
        cfg.apply_env(lookup(&[
            ("SVC_PORT", "9090"),
            ("SVC_VERSION", "/v2"),
            ("SVC_PATH_PREFIX", "notes"),
            ("DB_DRIVER", "sqlite"),
            ("DB_NAME", ":memory:"),
            ("STATS", "on"),
            ("SVC_MAX_BODY_BYTES", "1024"),
            ("DB_HOST", ""),
        ]))
        .unwrap();

        assert_eq!(cfg.port, 9090);
        assert_eq!(cfg.resource_path(), "/v2/notes");
        assert_eq!(cfg.db.driver, "sqlite");
        assert_eq!(cfg.db.name, ":memory:");
        assert_eq!(cfg.db.host, "127.0.0.1");
        assert!(cfg.stats);
        assert_eq!(cfg.max_body_bytes, 1024);
    }

    #[test]
    fn stats_requires_exact_on() {
        let mut cfg = Config::default();
        cfg.apply_env(lookup(&[("STATS", "yes")])).unwrap();
        assert!(!cfg.stats);
    }

    #[test]
    fn bad_port_is_an_error() {
        let mut cfg = Config::default();
        let err = cfg.apply_env(lookup(&[("SVC_PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("SVC_PORT"));
    }

    #[test]
    fn resource_path_tolerates_slashes() {
        let mut cfg = Config::default();
        cfg.version = "v1/".into();
        cfg.path_prefix = "/messages/".into();
        assert_eq!(cfg.resource_path(), "/v1/messages");

        cfg.version = String::new();
        assert_eq!(cfg.resource_path(), "/messages");
    }

    #[test]
    fn file_values_are_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "port = 7000\nallowed_origins = [\"http://localhost:3000\"]\n\n[db]\ndriver = \"memory\"\n",
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.port, 7000);
        assert_eq!(cfg.allowed_origins, vec!["http://localhost:3000".to_string()]);
        assert_eq!(cfg.db.driver, "memory");
        assert_eq!(cfg.db.port, 3306);
        assert_eq!(cfg.path_prefix, "messages");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.port, 8080);
    }
}

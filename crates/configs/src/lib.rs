use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8081,
            worker_threads: Some(4),
            log_format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// JSON file with an array of cars loaded into the store at startup.
    #[serde(default)]
    pub seed_path: Option<String>,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { seed_path: None, static_dir: default_static_dir() }
    }
}

fn default_log_format() -> String { "compact".into() }
fn default_static_dir() -> String { "static".into() }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Config file if present, otherwise `SERVER_HOST`/`SERVER_PORT` on top of defaults.
    pub fn load_or_env() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_or_env_from(&path)
    }

    /// Only a missing file falls back to the environment; a broken file is an error.
    pub fn load_or_env_from(path: &str) -> Result<Self> {
        let mut cfg = match load_from_file(path) {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => Self::from_env(),
            Err(e) => return Err(e.context(format!("cannot load config {path}"))),
        };
        cfg.normalize_and_validate()
            .map_err(|e| e.context(format!("invalid config {path}")))?;
        Ok(cfg)
    }

    pub fn from_env() -> Self {
        let mut cfg = AppConfig::default();
        if let Ok(host) = std::env::var("SERVER_HOST") {
            cfg.server.host = host;
        }
        if let Some(port) = std::env::var("SERVER_PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Some(w) = std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok()) {
            cfg.server.worker_threads = Some(w);
        }
        if let Ok(fmt) = std::env::var("LOG_FORMAT") {
            cfg.server.log_format = fmt;
        }
        if let Ok(seed) = std::env::var("CARS_SEED_PATH") {
            cfg.store.seed_path = Some(seed);
        }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.normalize();
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(w) if w > 0 => {}
            _ => self.worker_threads = Some(4),
        }
        let fmt = self.log_format.trim().to_ascii_lowercase();
        if fmt != "json" && fmt != "compact" {
            return Err(anyhow!("server.log_format must be `compact` or `json`, got `{}`", self.log_format));
        }
        self.log_format = fmt;
        Ok(())
    }
}

impl StoreConfig {
    fn normalize(&mut self) {
        if self.static_dir.trim().is_empty() {
            self.static_dir = default_static_dir();
        }
        if matches!(self.seed_path.as_deref(), Some(p) if p.trim().is_empty()) {
            self.seed_path = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tmp(content: &str) -> String {
        let path = std::env::temp_dir().join(format!("cars_config_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn parses_full_file() {
        let path = write_tmp(
            r#"
[server]
host = "0.0.0.0"
port = 9000
worker_threads = 2
log_format = "JSON"

[store]
seed_path = "data/cars.json"
static_dir = "assets"
"#,
        );
        let mut cfg = load_from_file(&path).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:9000");
        assert_eq!(cfg.server.worker_threads, Some(2));
        assert_eq!(cfg.server.log_format, "json");
        assert_eq!(cfg.store.seed_path.as_deref(), Some("data/cars.json"));
        assert_eq!(cfg.store.static_dir, "assets");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let path = write_tmp("");
        let mut cfg = load_from_file(&path).unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.bind_addr(), "127.0.0.1:8081");
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.store.static_dir, "static");
        assert!(cfg.store.seed_path.is_none());
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_falls_back_but_broken_file_fails() {
        let missing = std::env::temp_dir().join(format!("cars_config_{}.toml", uuid::Uuid::new_v4()));
        assert!(AppConfig::load_or_env_from(missing.to_str().unwrap()).is_ok());

        let syntax = write_tmp("[server\nport = 1");
        assert!(AppConfig::load_or_env_from(&syntax).is_err());

        let zero_port = write_tmp("[server]\nhost = \"127.0.0.1\"\nport = 0\n");
        assert!(AppConfig::load_or_env_from(&zero_port).is_err());

        let bad_format = write_tmp("[server]\nhost = \"127.0.0.1\"\nport = 80\nlog_format = \"xml\"\n");
        assert!(AppConfig::load_or_env_from(&bad_format).is_err());

        for p in [syntax, zero_port, bad_format] {
            let _ = std::fs::remove_file(p);
        }
    }

    #[test]
    fn rejects_zero_port_and_unknown_log_format() {
        let mut cfg = AppConfig::default();
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.server.log_format = "xml".into();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn zero_worker_threads_are_reset() {
        let mut cfg = AppConfig::default();
        cfg.server.worker_threads = Some(0);
        cfg.store.seed_path = Some("  ".into());
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert!(cfg.store.seed_path.is_none());
    }
}

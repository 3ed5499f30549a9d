// Configuration module entry point
// Manages application configuration and shared runtime state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

// Re-export public types
pub use state::AppState;
pub use types::{Config, LogLevel};

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SERVER").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "ModuleServer/1.0")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 10_485_760)? // 10MB
            .set_default("storage.root", "storage")?
            .set_default("storage.catalog", "modules.toml")?
            .set_default("tags.file", "tags.txt")?
            .set_default("tags.refresh_interval_secs", 1800)? // 30 minutes
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    pub const fn tag_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.tags.refresh_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("definitely-missing-config-file").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.storage.root, "storage");
        assert_eq!(cfg.storage.catalog, "modules.toml");
        assert_eq!(cfg.tags.file, "tags.txt");
        assert_eq!(cfg.tag_refresh_interval(), Duration::from_secs(30 * 60));
        assert_eq!(cfg.logging.access_log_format, "combined");
        assert_eq!(cfg.logging.level, LogLevel::Info);
        assert!(cfg.performance.max_connections.is_none());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9191\n\n[logging]\nlevel = \"warn\"\n\n[storage]\nroot = \"/srv/modules\"\n\n[tags]\nrefresh_interval_secs = 60"
        )
        .unwrap();

        let stem = dir.path().join("server");
        let cfg = Config::load_from(stem.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9191);
        assert_eq!(cfg.logging.level, LogLevel::Warn);
        assert_eq!(cfg.storage.root, "/srv/modules");
        assert_eq!(cfg.tag_refresh_interval(), Duration::from_secs(60));
        assert_eq!(
            cfg.get_socket_addr().unwrap().to_string(),
            "127.0.0.1:9191"
        );
    }

    #[test]
    fn test_log_level_threshold() {
        assert!(LogLevel::Info.allows(LogLevel::Warn));
        assert!(LogLevel::Info.allows(LogLevel::Info));
        assert!(!LogLevel::Info.allows(LogLevel::Debug));
        assert!(!LogLevel::Error.allows(LogLevel::Warn));
        assert!(LogLevel::Debug.allows(LogLevel::Debug));
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("bad.toml"),
            "[logging]\nlevel = \"verbose\"\n",
        )
        .unwrap();

        let stem = dir.path().join("bad");
        assert!(Config::load_from(stem.to_str().unwrap()).is_err());
    }
}

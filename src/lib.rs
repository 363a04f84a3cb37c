pub mod response;
pub mod token;

pub mod client;
pub mod database;
pub mod export;
pub mod libs;
pub mod model;
pub mod pages;
pub mod report;

use std::{path::PathBuf, time::Duration};

pub use response::Response;
use serde::{Deserialize, Serialize};

pub type ResponseResult = Result<Response, Response>;

/// 日志，转发到 tracing
#[macro_export]
macro_rules! log {
    ($($arg:tt)+) => {
        tracing::info!($($arg)+)
    };
}

/// 初始化日志输出，`RUST_LOG` 未设置时默认 info
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

pub const CONFIG_PATH: &str = "config/setting.json";

/// 服务配置，存放于 `config/setting.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    port: u16,
    data_dir: PathBuf,
    secret: String,
    token_hours: i64,
    currency: String,
    low_stock: u32,
    poll_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            data_dir: PathBuf::from("data"),
            secret: "change-me".to_owned(),
            token_hours: 12,
            currency: "$".to_owned(),
            low_stock: 5,
            poll_secs: 5,
        }
    }
}

impl Config {
    /// 读取配置，文件不存在时写入默认配置
    pub fn read() -> std::io::Result<Config> {
        let path = std::env::var("DASHBOARD_CONFIG").unwrap_or_else(|_| CONFIG_PATH.to_owned());
        Self::read_from(path)
    }
    pub fn read_from(path: impl Into<PathBuf>) -> std::io::Result<Config> {
        let path = path.into();
        match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let config = Config::default();
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                let text = serde_json::to_string_pretty(&config)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
                std::fs::write(&path, text)?;
                tracing::warn!("配置文件 {} 不存在，已写入默认配置", path.display());
                Ok(config)
            }
            Err(e) => Err(e),
        }
    }
    pub fn port(&self) -> u16 {
        self.port
    }
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }
    pub fn secret(&self) -> &str {
        &self.secret
    }
    pub fn token_hours(&self) -> i64 {
        self.token_hours
    }
    pub fn currency(&self) -> &str {
        &self.currency
    }
    pub fn low_stock(&self) -> u32 {
        self.low_stock
    }
    pub fn poll_secs(&self) -> u64 {
        self.poll_secs
    }
    /// 客户端拉取间隔，命令行给出的优先，最短1秒
    pub fn poll_interval(&self, flag: Option<u64>) -> Duration {
        Duration::from_secs(flag.unwrap_or(self.poll_secs).max(1))
    }
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_is_written_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config/setting.json");
        let config = Config::read_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(path.exists());
        let again = Config::read_from(&path).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setting.json");
        std::fs::write(&path, r#"{"port": 9000, "currency": "€"}"#).unwrap();
        let config = Config::read_from(&path).unwrap();
        assert_eq!(config.port(), 9000);
        assert_eq!(config.currency(), "€");
        assert_eq!(config.token_hours(), 12);
    }

    #[test]
    fn poll_interval_prefers_flag_over_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setting.json");
        std::fs::write(&path, r#"{"poll_secs": 30}"#).unwrap();
        let config = Config::read_from(&path).unwrap();
        assert_eq!(config.poll_interval(None), Duration::from_secs(30));
        assert_eq!(config.poll_interval(Some(2)), Duration::from_secs(2));
        assert_eq!(config.poll_interval(Some(0)), Duration::from_secs(1));
        assert_eq!(Config::default().poll_interval(None), Duration::from_secs(5));
    }

    #[test]
    fn corrupt_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("setting.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Config::read_from(&path).is_err());
    }
}

//! 看板前端用的数据层：调用接口、定时拉取、本地乐观更新、登录状态缓存。

mod api;
mod file;
mod poll;
mod session;
mod store;

use std::fmt::Debug;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub use api::{ApiClient, ApiClientBuilder};
pub use file::FileSource;
pub use poll::{OnChange, Poller, SnapshotTracker};
pub use session::{Session, SessionCache};
pub use store::LocalStore;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP 请求失败: {0}")]
    Http(String),

    #[error("解析响应失败: {0}")]
    Parse(String),

    #[error("连接失败: {0}")]
    Connection(String),

    #[error("请求超时")]
    Timeout,

    /// 服务器返回 `success: false`
    #[error("{0}")]
    Rejected(String),

    #[error("尚未登录")]
    NotLoggedIn,

    #[error("读取文件失败: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

/// 按资源名取一整份数据，例如 `sales`、`orders`
#[async_trait]
pub trait Source: Send + Sync + Debug {
    async fn fetch(&self, resource: &str) -> Result<Value, ClientError>;

    /// 日志里显示的来源
    fn description(&self) -> &str;
}

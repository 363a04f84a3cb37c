use std::fs::create_dir;

use axum::{extract::DefaultBodyLimit, http::Method};
use sales_dashboard::{
    database::Database,
    init_tracing,
    pages::{pages_router, AppState},
    Config,
};
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        tracing::error!("启动失败: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    _create_dir("config").map_err(|e| e.to_string())?;
    let setting = Config::read().map_err(|e| format!("读取配置失败: {e}"))?;
    let db = Database::open(setting.data_dir())
        .await
        .map_err(|e| format!("打开数据目录失败: {:?}", e))?;
    let port = setting.port();
    let state = AppState::new(std::sync::Arc::new(db), setting).map_err(|e| format!("{:?}", e))?;
    let router = pages_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                ])
                .allow_headers(Any),
        )
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| format!("端口 {port} 绑定失败: {e}"))?;
    tracing::info!("服务已启动，监听 0.0.0.0:{port}");
    axum::serve(listener, router).await.map_err(|e| e.to_string())
}

fn _create_dir(path: &str) -> std::io::Result<()> {
    match create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) => match e.kind() {
            std::io::ErrorKind::AlreadyExists => Ok(()),
            _ => Err(e),
        },
    }
}

use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use sales_dashboard::{
    client::{ApiClient, ClientError, FileSource, Poller, Session, SessionCache, Source},
    init_tracing, Config,
};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "dashboard-watch")]
#[command(about = "定时拉取销售、订单、商品数据，有变化时输出日志")]
struct Args {
    /// 服务地址
    #[arg(short, long, default_value = "http://localhost:8080", conflicts_with = "dir")]
    endpoint: String,

    /// 直接读取数据目录，不经过服务端
    #[arg(short, long)]
    dir: Option<PathBuf>,

    #[arg(long, default_value = "admin@admin.com")]
    email: String,

    #[arg(long, default_value = "admin")]
    password: String,

    /// 拉取间隔，秒；不填时用配置文件里的 poll_secs
    #[arg(short, long)]
    interval: Option<u64>,

    /// 登录缓存文件
    #[arg(long, default_value = "config/session.json")]
    session: PathBuf,
}

const RESOURCES: [&str; 3] = ["sales", "orders", "products"];

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Args::parse();
    let config = Config::read().unwrap_or_else(|e| {
        tracing::warn!("读取配置失败，使用默认配置: {e}");
        Config::default()
    });
    let every = config.poll_interval(args.interval);
    let source: Arc<dyn Source> = match &args.dir {
        Some(dir) => Arc::new(FileSource::new(dir)),
        None => match connect(&args).await {
            Ok(api) => Arc::new(api),
            Err(e) => {
                tracing::error!("无法登录 {}: {e}", args.endpoint);
                std::process::exit(1);
            }
        },
    };
    tracing::info!("开始监听 {}，间隔 {} 秒", source.description(), every.as_secs());
    let mut poller = Poller::spawn(
        source,
        &RESOURCES,
        every,
        Arc::new(|resource: &str, value: &Value| {
            let count = value.as_array().map_or(0, Vec::len);
            tracing::info!("{resource} 已更新，共 {count} 条");
        }),
    );
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("等待退出信号失败: {e}");
    }
    poller.stop();
    tracing::info!("已停止");
}

/// 优先沿用缓存的 token，失效时重新登录
async fn connect(args: &Args) -> Result<ApiClient, ClientError> {
    let cache = SessionCache::new(&args.session);
    if let Some(session) = cache.load() {
        let api = ApiClient::builder()
            .endpoint(&args.endpoint)
            .token(session.token)
            .build()?;
        match api.session().await {
            Ok(user) => {
                tracing::info!("沿用 {} 的登录状态", user.name);
                return Ok(api);
            }
            Err(e) => tracing::warn!("登录缓存已失效: {e}"),
        }
    }
    let api = ApiClient::builder().endpoint(&args.endpoint).build()?;
    let user = api.login(&args.email, &args.password).await?;
    if let Some(token) = api.token() {
        if let Err(e) = cache.save(&Session { token, user }) {
            tracing::warn!("保存登录缓存失败: {e}");
        }
    }
    Ok(api)
}

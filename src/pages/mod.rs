mod account;
mod export;
pub mod func;
mod user;

use std::sync::Arc;

use axum::Router;

pub use account::get_user;

use crate::{database::DB, token::TokenIssuer, Config, Response};

/// 所有路由共享的状态
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: DB,
    pub config: Arc<Config>,
    pub tokens: TokenIssuer,
}

impl AppState {
    pub fn new(db: DB, config: Config) -> Result<AppState, Response> {
        let tokens = TokenIssuer::new(config.secret(), config.token_hours())?;
        Ok(AppState {
            db,
            config: Arc::new(config),
            tokens,
        })
    }
}

pub fn pages_router(state: AppState) -> Router {
    let api = account::account_router()
        .merge(user::user_router())
        .merge(func::func_router())
        .merge(export::export_router());
    Router::new().nest("/api", api).with_state(state)
}

use axum::{
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

mod login;
mod register;
use super::AppState;
use crate::{
    bearer,
    libs::validate::min_len,
    log,
    model::User,
    token::TokenVerification,
    Response, ResponseResult,
};

pub fn account_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login::user_login))
        .route("/logout", post(login::user_logout))
        .route("/session", get(login::session))
        .route("/register", post(register::register_user))
        .route("/password", post(set_user_password))
}

/// 根据请求头里的 token 取当前用户，停用的账号视为未登录
pub async fn get_user(state: &AppState, headers: &HeaderMap) -> Result<User, Response> {
    let bearer = bearer!(headers);
    let claims = match state.tokens.verify(bearer.token()) {
        TokenVerification::Ok(claims) => claims,
        TokenVerification::Expired => return Err(Response::token_error("token已过期，请重新登录")),
        TokenVerification::Revoked => return Err(Response::token_error("token已失效，请重新登录")),
        TokenVerification::Error => return Err(Response::token_error("Invalid token")),
    };
    let user = op::some!(state.db.users.get(&claims.id).await; ret Err(Response::token_error("用户不存在")));
    if !user.active {
        return Err(Response::inactive());
    }
    Ok(user)
}

#[derive(serde::Deserialize)]
struct Password {
    old: String,
    new: String,
}

/// 修改自己的密码，之前签发的 token 全部失效，返回新的 token
async fn set_user_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(value): Json<Value>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    let password: Password = serde_json::from_value(value)?;
    if password.old != user.password {
        return Err(Response::wrong_password());
    }
    min_len("password", &password.new, 4)?;
    state
        .db
        .users
        .modify(&user.id, |u| {
            u.password = password.new;
            Ok(())
        })
        .await?;
    state.db.revoke_tokens(&user.id).await?;
    log!("{}({}) 修改了密码", user.name, user.id);
    let token = state.tokens.generate(&user.id)?;
    Ok(Response::ok(json!({ "token": token })))
}

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::{
    log,
    pages::AppState,
    response::Response,
    ResponseResult,
};

use super::get_user;

#[derive(serde::Deserialize)]
struct LoginID {
    email: String,
    password: String,
}

pub async fn user_login(State(state): State<AppState>, Json(value): Json<Value>) -> ResponseResult {
    let login: LoginID = serde_json::from_value(value)?;
    let user = state.db.users.find(|u| u.same_email(&login.email)).await;
    let Some(user) = user else {
        tracing::warn!("登录失败，{} 用户不存在", login.email);
        return Err(Response::not_exist(format!("{} 用户不存在", login.email)));
    };
    if user.password != login.password {
        tracing::warn!("{} 登录失败，密码错误", login.email);
        return Err(Response::wrong_password());
    }
    if !user.active {
        tracing::warn!("{} 登录失败，账号已停用", login.email);
        return Err(Response::inactive());
    }
    let token = state.tokens.generate(&user.id)?;
    log!("{}({}) 登录成功", user.name, user.role.as_str());
    Ok(Response::ok(json!({ "token": token, "info": user.info() })))
}

pub async fn session(State(state): State<AppState>, headers: HeaderMap) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    Ok(Response::ok(json!(user.info())))
}

pub async fn user_logout(State(state): State<AppState>, headers: HeaderMap) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    state.db.revoke_tokens(&user.id).await?;
    log!("{}({}) 已登出", user.name, user.id);
    Ok(Response::empty())
}

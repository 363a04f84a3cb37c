use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::{
    libs::{perm::Action, time::TIME},
    log,
    model::User,
    pages::AppState,
    verify_perms, Response, ResponseResult,
};

use super::get_user;

/// 管理员注册新用户
pub async fn register_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(value): Json<Value>,
) -> ResponseResult {
    let operator = get_user(&state, &headers).await?;
    verify_perms!(operator, Action::ManageUsers);
    let mut info: User = serde_json::from_value(value)?;
    info.name = info.name.trim().to_owned();
    info.email = info.email.trim().to_owned();
    info.registered = TIME::now().date();
    info.validate()?;
    let user = state
        .db
        .users
        .insert_checked(info, |users, info| {
            match users.iter().any(|u| u.same_email(&info.email)) {
                true => Err(Response::already_exist(format!("邮箱 {} 已被使用", info.email))),
                false => Ok(()),
            }
        })
        .await?;
    log!(
        "{} 注册了用户 {}({})，角色 {}",
        operator.name,
        user.name,
        user.id,
        user.role.as_str()
    );
    Ok(Response::created(json!(user.info())))
}

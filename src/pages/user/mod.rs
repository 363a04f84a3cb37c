use axum::{
    extract::{Path, State},
    http::HeaderMap,
    routing::{get, patch},
    Json, Router,
};
use serde_json::{json, Value};

use crate::{
    libs::{
        dser::deserialize_any_to_bool,
        perm::Action,
        validate::{email, min_len, required},
    },
    log,
    model::{User, UserInfo, UserUpdate},
    pages::{get_user, AppState},
    verify_perms, Response, ResponseResult,
};

pub fn user_router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route(
            "/users/:id",
            get(query_user).put(update_user).delete(delete_user),
        )
        .route("/users/:id/active", patch(set_active))
}

async fn list_users(State(state): State<AppState>, headers: HeaderMap) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    verify_perms!(user, Action::ViewUsers);
    let mut users: Vec<UserInfo> = state.db.users.all().await.iter().map(User::info).collect();
    users.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Response::ok(json!(users)))
}

/// 自己的资料任何人都可以看
async fn query_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    if user.id != id {
        verify_perms!(user, Action::ViewUsers);
    }
    let target = op::some!(state.db.users.get(&id).await; ret Err(Response::not_exist(format!("用户 {id} 不存在"))));
    Ok(Response::ok(json!(target.info())))
}

async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(value): Json<Value>,
) -> ResponseResult {
    let operator = get_user(&state, &headers).await?;
    verify_perms!(operator, Action::ManageUsers);
    let update: UserUpdate = serde_json::from_value(value)?;
    if operator.id == id && (update.role.is_some_and(|r| r != operator.role) || update.active == Some(false)) {
        return Err(Response::invalid_value("不能修改自己的角色或停用自己"));
    }
    if let Some(e) = &update.email {
        email(e)?;
    }
    let new_email = update.email.clone();
    let deactivated = update.active == Some(false);
    let user = state
        .db
        .users
        .modify_checked(
            &id,
            |users| match &new_email {
                Some(e) if users.iter().any(|u| u.id != id && u.same_email(e)) => {
                    Err(Response::already_exist(format!("邮箱 {e} 已被使用")))
                }
                _ => Ok(()),
            },
            |u| {
                update.apply(u);
                required("name", &u.name)?;
                min_len("password", &u.password, 4)
            },
        )
        .await?;
    if deactivated {
        state.db.revoke_tokens(&user.id).await?;
    }
    log!("{} 修改了用户 {}({})", operator.name, user.name, user.id);
    Ok(Response::ok(json!(user.info())))
}

async fn set_active(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(value): Json<Value>,
) -> ResponseResult {
    #[derive(serde::Deserialize)]
    struct Active {
        #[serde(deserialize_with = "deserialize_any_to_bool")]
        active: bool,
    }
    let operator = get_user(&state, &headers).await?;
    verify_perms!(operator, Action::ManageUsers);
    let data: Active = serde_json::from_value(value)?;
    if operator.id == id {
        return Err(Response::invalid_value("不能停用或启用自己"));
    }
    let user = state
        .db
        .users
        .modify(&id, |u| {
            u.active = data.active;
            Ok(())
        })
        .await?;
    if !user.active {
        state.db.revoke_tokens(&user.id).await?;
    }
    log!(
        "{} {}了用户 {}({})",
        operator.name,
        crate::do_if!(user.active => "启用", "停用"),
        user.name,
        user.id
    );
    Ok(Response::ok(json!(user.info())))
}

async fn delete_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ResponseResult {
    let operator = get_user(&state, &headers).await?;
    verify_perms!(operator, Action::ManageUsers);
    if operator.id == id {
        return Err(Response::invalid_value("不能删除自己"));
    }
    let user = state.db.users.remove(&id).await?;
    state.db.revoke_tokens(&user.id).await?;
    log!("{} 删除了用户 {}({})", operator.name, user.name, user.id);
    Ok(Response::empty())
}

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    libs::{dser::deser_empty_to_none, perm::Action},
    log,
    model::{Order, OrderStatus},
    pages::{get_user, AppState},
    verify_perms, Response, ResponseResult,
};

pub fn order_router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/:id",
            get(query_order).put(update_order).delete(delete_order),
        )
        .route("/orders/:id/status", patch(set_status))
}

#[derive(Debug, Deserialize)]
struct OrderQuery {
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    status: Option<String>,
}

async fn list_orders(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<OrderQuery>,
) -> ResponseResult {
    get_user(&state, &headers).await?;
    let status = match &query.status {
        Some(s) => Some(s.parse::<OrderStatus>()?),
        None => None,
    };
    let mut orders = state
        .db
        .orders
        .filter(|o| status.map_or(true, |s| o.status == s))
        .await;
    orders.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(Response::ok(json!(orders)))
}

async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(value): Json<Value>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    verify_perms!(user, Action::CreateOrders);
    let mut order: Order = serde_json::from_value(value)?;
    order.id.clear();
    if !user.role.can(Action::ManageOrders) {
        order.status = OrderStatus::Pending;
    }
    order.normalize();
    order.validate()?;
    let order = state.db.orders.insert(order).await?;
    log!(
        "{} 新增订单 {}，客户 {}，金额 {}",
        user.name,
        order.id,
        order.customer,
        order.amount
    );
    Ok(Response::created(json!(order)))
}

async fn query_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ResponseResult {
    get_user(&state, &headers).await?;
    let order = op::some!(state.db.orders.get(&id).await; ret Err(Response::not_exist(format!("订单 {id} 不存在"))));
    Ok(Response::ok(json!(order)))
}

async fn update_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(value): Json<Value>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    verify_perms!(user, Action::ManageOrders);
    let keep_date = value.get("date").is_none();
    let mut order: Order = serde_json::from_value(value)?;
    if keep_date {
        let old = op::some!(state.db.orders.get(&id).await; ret Err(Response::not_exist(format!("订单 {id} 不存在"))));
        order.date = old.date;
    }
    order.normalize();
    order.validate()?;
    state.db.orders.update(&id, order.clone()).await?;
    order.id = id;
    log!("{} 修改了订单 {}", user.name, order.id);
    Ok(Response::ok(json!(order)))
}

#[derive(Debug, Deserialize)]
struct StatusChange {
    status: OrderStatus,
}

async fn set_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(value): Json<Value>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    verify_perms!(user, Action::ManageOrders);
    let StatusChange { status } = serde_json::from_value(value)?;
    let order = state
        .db
        .orders
        .modify(&id, |o| {
            o.status = status;
            Ok(())
        })
        .await?;
    log!("{} 将订单 {} 标记为 {:?}", user.name, order.id, order.status);
    Ok(Response::ok(json!(order)))
}

async fn delete_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    verify_perms!(user, Action::ManageOrders);
    let order = state.db.orders.remove(&id).await?;
    log!("{} 删除了订单 {}", user.name, order.id);
    Ok(Response::empty())
}

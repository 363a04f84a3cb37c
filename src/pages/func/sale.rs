use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    libs::{dser::deser_empty_to_none, perm::Action},
    log,
    model::{PaymentMethod, Sale, User},
    pages::{get_user, AppState},
    report::within,
    verify_perms, Response, ResponseResult,
};

use super::parse_day;

pub fn sale_router() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(create_sale))
        .route(
            "/sales/:id",
            get(query_sale).put(update_sale).delete(delete_sale),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct SaleQuery {
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    pub seller: Option<String>,
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    pub payment: Option<String>,
}

/// 当前用户能看到的销售记录，按查询条件过滤，时间倒序。
/// 没有 `ViewAllSales` 权限时只返回自己名下的
pub async fn visible_sales(
    state: &AppState,
    user: &User,
    query: &SaleQuery,
) -> Result<Vec<Sale>, Response> {
    let from = parse_day("from", query.from.as_deref())?;
    let to = parse_day("to", query.to.as_deref())?;
    let payment = match &query.payment {
        Some(p) => Some(p.parse::<PaymentMethod>()?),
        None => None,
    };
    let own_only = !user.role.can(Action::ViewAllSales);
    let mut sales = state
        .db
        .sales
        .filter(|s| {
            within(s, from, to)
                && payment.map_or(true, |p| s.payment_method == p)
                && (!own_only || s.seller == user.name)
                && query
                    .seller
                    .as_ref()
                    .map_or(true, |name| s.seller.eq_ignore_ascii_case(name.trim()))
        })
        .await;
    sales.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(sales)
}

async fn list_sales(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SaleQuery>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    let sales = visible_sales(&state, &user, &query).await?;
    Ok(Response::ok(json!(sales)))
}

async fn create_sale(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(value): Json<Value>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    let mut sale: Sale = serde_json::from_value(value)?;
    sale.id.clear();
    if !user.role.can(Action::ViewAllSales) || sale.seller.trim().is_empty() {
        sale.seller = user.name.clone();
    }
    sale.normalize();
    sale.validate()?;
    let sale = state.db.sales.insert(sale).await?;
    log!(
        "{} 新增销售 {}，金额 {}",
        user.name,
        sale.id,
        sale.amount
    );
    for item in sale.items.iter().filter(|i| !i.product_id.is_empty()) {
        if state.db.products.get(&item.product_id).await.is_none() {
            continue;
        }
        let changed = state
            .db
            .products
            .modify(&item.product_id, |p| {
                if p.adjust_stock(-(item.quantity as i64)) {
                    tracing::warn!("商品 {}({}) 库存不足，已置为0", p.name, p.id);
                }
                Ok(())
            })
            .await;
        if let Err(e) = changed {
            tracing::error!("销售 {} 扣减库存 {} 失败: {:?}", sale.id, item.product_id, e);
        }
    }
    Ok(Response::created(json!(sale)))
}

async fn query_sale(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    let sale = op::some!(state.db.sales.get(&id).await; ret Err(Response::not_exist(format!("销售记录 {id} 不存在"))));
    if sale.seller != user.name {
        verify_perms!(user, Action::ViewAllSales);
    }
    Ok(Response::ok(json!(sale)))
}

async fn update_sale(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(value): Json<Value>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    verify_perms!(user, Action::EditSales);
    let keep_date = value.get("date").is_none();
    let mut sale: Sale = serde_json::from_value(value)?;
    if keep_date {
        let old = op::some!(state.db.sales.get(&id).await; ret Err(Response::not_exist(format!("销售记录 {id} 不存在"))));
        sale.date = old.date;
    }
    sale.normalize();
    sale.validate()?;
    state.db.sales.update(&id, sale.clone()).await?;
    sale.id = id;
    log!("{} 修改了销售记录 {}", user.name, sale.id);
    Ok(Response::ok(json!(sale)))
}

async fn delete_sale(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    verify_perms!(user, Action::EditSales);
    let sale = state.db.sales.remove(&id).await?;
    log!("{} 删除了销售记录 {}，金额 {}", user.name, sale.id, sale.amount);
    Ok(Response::empty())
}

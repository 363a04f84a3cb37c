use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    libs::{
        dser::{deser_empty_to_none, deser_f64},
        perm::Action,
        validate::in_range,
    },
    log,
    model::{sale_price, Product},
    pages::{get_user, AppState},
    verify_perms, Response, ResponseResult,
};

pub fn product_router() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/price", get(preview_price))
        .route(
            "/products/:id",
            get(query_product).put(update_product).delete(delete_product),
        )
        .route("/products/:id/stock", post(adjust_stock))
}

#[derive(Debug, Deserialize)]
struct ProductQuery {
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    category: Option<String>,
}

async fn list_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ProductQuery>,
) -> ResponseResult {
    get_user(&state, &headers).await?;
    let mut products = state
        .db
        .products
        .filter(|p| {
            query
                .category
                .as_ref()
                .map_or(true, |c| p.category.eq_ignore_ascii_case(c.trim()))
        })
        .await;
    products.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Response::ok(json!(products)))
}

#[derive(Debug, Deserialize)]
struct PriceQuery {
    #[serde(default, deserialize_with = "deser_f64")]
    purchase: f64,
    #[serde(default, deserialize_with = "deser_f64")]
    margin: f64,
}

/// 表单里边输入边显示售价
async fn preview_price(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PriceQuery>,
) -> ResponseResult {
    get_user(&state, &headers).await?;
    in_range("purchase", query.purchase, 0.0, f64::MAX)?;
    in_range("margin", query.margin, 0.0, 1000.0)?;
    let price = sale_price(query.purchase, query.margin);
    Ok(Response::ok(json!({
        "purchase_price": query.purchase,
        "margin": query.margin,
        "sale_price": price,
        "formatted": crate::report::format_currency(price, state.config.currency()),
    })))
}

async fn create_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(value): Json<Value>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    verify_perms!(user, Action::ManageProducts);
    let mut product: Product = serde_json::from_value(value)?;
    product.id.clear();
    product.name = product.name.trim().to_owned();
    product.validate()?;
    product.reprice();
    let product = state.db.products.insert(product).await?;
    log!(
        "{} 新增商品 {}({})，售价 {}",
        user.name,
        product.name,
        product.id,
        product.sale_price
    );
    Ok(Response::created(json!(product)))
}

async fn query_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ResponseResult {
    get_user(&state, &headers).await?;
    let product = op::some!(state.db.products.get(&id).await; ret Err(Response::not_exist(format!("商品 {id} 不存在"))));
    Ok(Response::ok(json!(product)))
}

async fn update_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(value): Json<Value>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    verify_perms!(user, Action::ManageProducts);
    // 没带 stock 时保留原库存
    let keep_stock = value.get("stock").is_none();
    let mut product: Product = serde_json::from_value(value)?;
    product.name = product.name.trim().to_owned();
    product.validate()?;
    product.reprice();
    let product = state
        .db
        .products
        .modify(&id, |stored| {
            if keep_stock {
                product.stock = stored.stock;
            }
            product.id = stored.id.clone();
            *stored = product;
            Ok(())
        })
        .await?;
    log!("{} 修改了商品 {}({})", user.name, product.name, product.id);
    Ok(Response::ok(json!(product)))
}

async fn delete_product(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    verify_perms!(user, Action::ManageProducts);
    let product = state.db.products.remove(&id).await?;
    log!("{} 删除了商品 {}({})", user.name, product.name, product.id);
    Ok(Response::empty())
}

#[derive(Debug, Deserialize)]
struct StockDelta {
    delta: i64,
}

/// 入库为正，出库为负，库存最低为0
async fn adjust_stock(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(value): Json<Value>,
) -> ResponseResult {
    let user = get_user(&state, &headers).await?;
    verify_perms!(user, Action::ManageProducts);
    let StockDelta { delta } = serde_json::from_value(value)?;
    let product = state
        .db
        .products
        .modify(&id, |p| {
            if p.adjust_stock(delta) {
                tracing::warn!("商品 {}({}) 库存不足，已置为0", p.name, p.id);
            }
            Ok(())
        })
        .await?;
    log!(
        "{} 调整商品 {} 库存 {:+}，当前 {}",
        user.name,
        product.id,
        delta,
        product.stock
    );
    Ok(Response::ok(json!(product)))
}

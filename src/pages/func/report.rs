use axum::{
    extract::{Query, State},
    http::HeaderMap,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    libs::{dser::deser_empty_to_none, time::TIME},
    model::Sale,
    pages::{get_user, AppState},
    report::{self, format_currency, Period},
    Response, ResponseResult,
};

use super::sale::{visible_sales, SaleQuery};

pub fn report_router() -> Router<AppState> {
    Router::new()
        .route("/reports/sales", get(sales_by_period))
        .route("/reports/payments", get(payment_shares))
        .route("/reports/sellers", get(seller_shares))
        .route("/reports/products", get(top_products))
        .route("/reports/summary", get(dashboard_summary))
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    pub period: Option<String>,
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    pub to: Option<String>,
    /// 是否补齐空周期，默认补齐
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    pub fill: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl ReportQuery {
    pub fn period(&self) -> Result<Period, Response> {
        self.period
            .as_deref()
            .map_or(Ok(Period::default()), str::parse::<Period>)
    }
    fn fill(&self) -> bool {
        !matches!(self.fill.as_deref(), Some("false" | "0"))
    }
    pub fn sale_query(&self) -> SaleQuery {
        SaleQuery {
            from: self.from.clone(),
            to: self.to.clone(),
            ..Default::default()
        }
    }
}

/// 报表用的销售数据，销售员只统计自己的
pub async fn report_sales(
    state: &AppState,
    headers: &HeaderMap,
    query: &ReportQuery,
) -> Result<Vec<Sale>, Response> {
    let user = get_user(state, headers).await?;
    visible_sales(state, &user, &query.sale_query()).await
}

async fn sales_by_period(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReportQuery>,
) -> ResponseResult {
    let period = query.period()?;
    let sales = report_sales(&state, &headers, &query).await?;
    let mut buckets = report::group_by_period(&sales, period, |s| s.amount);
    if query.fill() {
        buckets = report::fill_gaps(buckets, period);
    }
    Ok(Response::ok(json!(buckets)))
}

async fn payment_shares(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReportQuery>,
) -> ResponseResult {
    let sales = report_sales(&state, &headers, &query).await?;
    let shares = report::share_by(
        &sales,
        |s| s.payment_method.as_str().to_owned(),
        |s| s.amount,
    );
    Ok(Response::ok(json!(shares)))
}

async fn seller_shares(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReportQuery>,
) -> ResponseResult {
    let sales = report_sales(&state, &headers, &query).await?;
    let shares = report::share_by(&sales, |s| s.seller.clone(), |s| s.amount);
    Ok(Response::ok(json!(shares)))
}

async fn top_products(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReportQuery>,
) -> ResponseResult {
    let sales = report_sales(&state, &headers, &query).await?;
    let ranks = report::top_products(&sales, query.limit.unwrap_or(10));
    Ok(Response::ok(json!(ranks)))
}

async fn dashboard_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ReportQuery>,
) -> ResponseResult {
    let sales = report_sales(&state, &headers, &query).await?;
    let orders = state.db.orders.all().await;
    let products = state.db.products.all().await;
    let summary = report::summary(
        &sales,
        &orders,
        &products,
        TIME::now().date(),
        state.config.low_stock(),
    );
    let symbol = state.config.currency();
    Ok(Response::ok(json!({
        "currency": symbol,
        "summary": summary,
        "formatted": {
            "today_total": format_currency(summary.today_total, symbol),
            "month_total": format_currency(summary.month_total, symbol),
            "total": format_currency(summary.total, symbol),
            "average_ticket": format_currency(summary.average_ticket, symbol),
            "pending_amount": format_currency(summary.pending_amount, symbol),
        },
    })))
}

mod order;
mod product;
mod report;
mod sale;

use axum::Router;
use chrono::NaiveDate;

use crate::{libs::dser::parse_timestamp, Response};

use super::AppState;

pub use report::{report_sales, ReportQuery};
pub use sale::{visible_sales, SaleQuery};

pub fn func_router() -> Router<AppState> {
    sale::sale_router()
        .merge(product::product_router())
        .merge(order::order_router())
        .merge(report::report_router())
}

/// 查询参数里的日期，空字符串视为未填写
pub(crate) fn parse_day(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, Response> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_timestamp(s)
            .map(|t| Some(t.date()))
            .ok_or_else(|| Response::invalid_value(format!("{field} 日期格式错误: {s}"))),
    }
}

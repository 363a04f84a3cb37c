use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::{
    export::{self, Sheet, XLSX_MIME},
    libs::{dser::deser_empty_to_none, perm::Action, time::TIME},
    log,
    model::{User, UserInfo},
    pages::{
        func::{report_sales, visible_sales, ReportQuery, SaleQuery},
        get_user, AppState,
    },
    report,
    response::BodyFile,
    verify_perms, Response,
};

pub fn export_router() -> Router<AppState> {
    Router::new().route("/export/:resource", get(export_resource))
}

#[derive(Debug, Default, Deserialize)]
struct ExportQuery {
    #[serde(default, deserialize_with = "deser_empty_to_none")]
    format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Format {
    Xlsx,
    Csv,
}

impl Format {
    fn parse(value: Option<&str>) -> Result<Format, Response> {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            None | Some("xlsx") => Ok(Format::Xlsx),
            Some("csv") => Ok(Format::Csv),
            Some(other) => Err(Response::invalid_value(format!("不支持的导出格式 {other}"))),
        }
    }
    fn ext(self) -> &'static str {
        match self {
            Format::Xlsx => "xlsx",
            Format::Csv => "csv",
        }
    }
}

fn encode<T: Sheet>(format: Format, sheet: &str, records: &[T]) -> Result<Vec<u8>, Response> {
    Ok(match format {
        Format::Xlsx => export::to_xlsx(sheet, records)?,
        Format::Csv => export::to_csv(records).into_bytes(),
    })
}

async fn export_resource(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(resource): Path<String>,
    Query(query): Query<ExportQuery>,
    Query(filter): Query<ReportQuery>,
) -> Result<BodyFile, Response> {
    let user = get_user(&state, &headers).await?;
    verify_perms!(user, Action::ExportData);
    let format = Format::parse(query.format.as_deref())?;
    let body = match resource.as_str() {
        "sales" => {
            let sales = visible_sales(&state, &user, &filter.sale_query()).await?;
            encode(format, "Sales", &sales)?
        }
        "products" => encode(format, "Products", &state.db.products.all().await)?,
        "orders" => encode(format, "Orders", &state.db.orders.all().await)?,
        "users" => {
            let users: Vec<UserInfo> = state.db.users.all().await.iter().map(User::info).collect();
            encode(format, "Users", &users)?
        }
        "report" => {
            let period = filter.period()?;
            let sales = report_sales(&state, &headers, &filter).await?;
            match format {
                Format::Xlsx => export::sales_report(&sales, period)?,
                Format::Csv => {
                    let buckets = report::fill_gaps(
                        report::group_by_period(&sales, period, |s| s.amount),
                        period,
                    );
                    export::to_csv(&buckets).into_bytes()
                }
            }
        }
        other => return Err(Response::not_exist(format!("无法导出 {other}"))),
    };
    let filename = export::filename(&resource, TIME::now().date(), format.ext());
    log!("{} 导出了 {}", user.name, filename);
    let content_type = match format {
        Format::Xlsx => XLSX_MIME.to_owned(),
        Format::Csv => mime::TEXT_CSV_UTF_8.to_string(),
    };
    Ok(BodyFile::new(body, &content_type, filename))
}

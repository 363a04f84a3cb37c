//! 导出 Excel / CSV。
//!
//! 每种记录实现 [`Sheet`]，给出表头和一行数据，
//! 同一份行数据既可以写成 xlsx 也可以写成 csv。

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::{
    libs::time::TimeFormat,
    model::{Order, Product, Sale, UserInfo},
    report::{self, Bucket, Period, Share},
};

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// 金额、比例，保留两位小数
    Number(f64),
    /// 件数、库存、笔数
    Count(u64),
}

impl Cell {
    fn text(value: impl Into<String>) -> Cell {
        Cell::Text(value.into())
    }
    fn as_csv(&self) -> String {
        match self {
            Cell::Text(s) => escape_csv(s),
            Cell::Number(n) => n.to_string(),
            Cell::Count(n) => n.to_string(),
        }
    }
    /// 数字单元格在 xlsx 里的格式
    fn num_format(&self) -> Option<&'static str> {
        match self {
            Cell::Number(_) => Some("0.00"),
            Cell::Count(_) => Some("0"),
            Cell::Text(_) => None,
        }
    }
}

/// 可以导出为表格的一行
pub trait Sheet {
    const HEADERS: &'static [&'static str];
    fn row(&self) -> Vec<Cell>;
}

impl Sheet for Sale {
    const HEADERS: &'static [&'static str] =
        &["id", "date", "seller", "payment_method", "items", "amount"];
    fn row(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.id),
            Cell::Text(self.date.format(TimeFormat::YYYYMMDD_HHMMSS).to_string()),
            Cell::text(&self.seller),
            Cell::text(self.payment_method.as_str()),
            Cell::Count(self.items.iter().map(|i| i.quantity as u64).sum()),
            Cell::Number(self.amount),
        ]
    }
}

impl Sheet for Product {
    const HEADERS: &'static [&'static str] = &[
        "id",
        "name",
        "category",
        "purchase_price",
        "margin",
        "sale_price",
        "stock",
    ];
    fn row(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.id),
            Cell::text(&self.name),
            Cell::text(&self.category),
            Cell::Number(self.purchase_price),
            Cell::Number(self.margin),
            Cell::Number(self.sale_price),
            Cell::Count(self.stock as u64),
        ]
    }
}

impl Sheet for Order {
    const HEADERS: &'static [&'static str] =
        &["id", "date", "customer", "address", "status", "amount", "detail"];
    fn row(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.id),
            Cell::Text(self.date.format(TimeFormat::YYYYMMDD_HHMMSS).to_string()),
            Cell::text(&self.customer),
            Cell::text(&self.address),
            Cell::text(if self.is_pending() { "pending" } else { "paid" }),
            Cell::Number(self.amount),
            Cell::text(&self.detail),
        ]
    }
}

/// 用户导出不含密码
impl Sheet for UserInfo {
    const HEADERS: &'static [&'static str] =
        &["id", "name", "email", "role", "active", "registered"];
    fn row(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.id),
            Cell::text(&self.name),
            Cell::text(&self.email),
            Cell::text(self.role.as_str()),
            Cell::text(if self.active { "yes" } else { "no" }),
            Cell::Text(self.registered.format(TimeFormat::YYYYMMDD).to_string()),
        ]
    }
}

impl Sheet for Bucket {
    const HEADERS: &'static [&'static str] = &["period", "start", "count", "total"];
    fn row(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.label),
            Cell::Text(self.start.format(TimeFormat::YYYYMMDD).to_string()),
            Cell::Count(self.count as u64),
            Cell::Number(self.total),
        ]
    }
}

impl Sheet for Share {
    const HEADERS: &'static [&'static str] = &["key", "count", "total", "percentage"];
    fn row(&self) -> Vec<Cell> {
        vec![
            Cell::text(&self.key),
            Cell::Count(self.count as u64),
            Cell::Number(self.total),
            Cell::Number(self.percentage),
        ]
    }
}

fn worksheet<T: Sheet>(name: &str, records: &[T]) -> Result<Worksheet, XlsxError> {
    let mut worksheet = Worksheet::new();
    worksheet.set_name(name)?;
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("0.00");
    let integer = Format::new().set_num_format("0");

    let mut widths: Vec<usize> = T::HEADERS.iter().map(|h| h.len()).collect();
    for (c, header) in T::HEADERS.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, *header, &bold)?;
    }
    for (r, record) in records.iter().enumerate() {
        let row = (r + 1) as u32;
        for (c, cell) in record.row().into_iter().enumerate() {
            let col = c as u16;
            match cell {
                Cell::Text(s) => {
                    if let Some(w) = widths.get_mut(c) {
                        *w = (*w).max(s.chars().count());
                    }
                    worksheet.write_string(row, col, &s)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number_with_format(row, col, n, &money)?;
                }
                Cell::Count(n) => {
                    worksheet.write_number_with_format(row, col, n as f64, &integer)?;
                }
            }
        }
    }
    for (c, w) in widths.into_iter().enumerate() {
        worksheet.set_column_width(c as u16, (w.min(60) + 2) as f64)?;
    }
    Ok(worksheet)
}

/// 单个工作表的 xlsx
pub fn to_xlsx<T: Sheet>(name: &str, records: &[T]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(worksheet(name, records)?);
    workbook.save_to_buffer()
}

/// 销售报表：明细、按周期汇总、按付款方式、按销售员
pub fn sales_report(sales: &[Sale], period: Period) -> Result<Vec<u8>, XlsxError> {
    let buckets = report::fill_gaps(
        report::group_by_period(sales, period, |s| s.amount),
        period,
    );
    let payments = report::share_by(sales, |s| s.payment_method.as_str().to_owned(), |s| s.amount);
    let sellers = report::share_by(sales, |s| s.seller.clone(), |s| s.amount);

    let mut workbook = Workbook::new();
    workbook.push_worksheet(worksheet("Sales", sales)?);
    workbook.push_worksheet(worksheet("Summary", &buckets)?);
    workbook.push_worksheet(worksheet("Payments", &payments)?);
    workbook.push_worksheet(worksheet("Sellers", &sellers)?);
    workbook.save_to_buffer()
}

pub fn to_csv<T: Sheet>(records: &[T]) -> String {
    let mut out = T::HEADERS.join(",");
    out.push('\n');
    for record in records {
        let line: Vec<String> = record.row().iter().map(Cell::as_csv).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

fn escape_csv(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

/// `sales-20240115.xlsx`
pub fn filename(resource: &str, date: NaiveDate, ext: &str) -> String {
    format!("{resource}-{}.{ext}", date.format(TimeFormat::COMPACT))
}

//! 图表用的汇总计算。全部是对内存列表的纯函数，空输入返回空结果。

mod format;
mod period;

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::Serialize;

pub use format::format_currency;
pub use period::Period;

use crate::{
    libs::round2,
    model::{Order, Product, Sale},
};

/// 带时间的记录
pub trait Timestamped {
    fn timestamp(&self) -> NaiveDateTime;
}

impl Timestamped for Sale {
    fn timestamp(&self) -> NaiveDateTime {
        self.date
    }
}

impl Timestamped for Order {
    fn timestamp(&self) -> NaiveDateTime {
        self.date
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Bucket {
    pub label: String,
    pub start: NaiveDate,
    pub total: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Share {
    pub key: String,
    pub total: f64,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProductRank {
    pub product_id: String,
    pub name: String,
    pub quantity: u64,
    pub revenue: f64,
}

/// `part` 占 `total` 的百分比，保留两位小数；`total` 为0时返回0
pub fn percentage(part: f64, total: f64) -> f64 {
    if total == 0.0 || !total.is_finite() {
        0.0
    } else {
        round2(part / total * 100.0)
    }
}

/// 日期落在 `[from, to]` 内，两端都可以不限
pub fn within<T: Timestamped>(record: &T, from: Option<NaiveDate>, to: Option<NaiveDate>) -> bool {
    let date = record.timestamp().date();
    from.map_or(true, |f| date >= f) && to.map_or(true, |t| date <= t)
}

/// 按周期分组求和，按周期起点排序
pub fn group_by_period<T: Timestamped>(
    records: &[T],
    period: Period,
    value: impl Fn(&T) -> f64,
) -> Vec<Bucket> {
    let mut map: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for record in records {
        let start = period.start(record.timestamp().date());
        let entry = map.entry(start).or_default();
        entry.0 += value(record);
        entry.1 += 1;
    }
    map.into_iter()
        .map(|(start, (total, count))| Bucket {
            label: period.label(start),
            start,
            total: round2(total),
            count,
        })
        .collect()
}

/// 补齐后最多的周期数，超过时原样返回不补
pub const MAX_FILLED_BUCKETS: usize = 1000;

/// 从 `from` 数到 `to` 共几个周期，超过 `limit` 时返回 None
fn span(period: Period, from: NaiveDate, to: NaiveDate, limit: usize) -> Option<usize> {
    let mut cursor = from;
    let mut n = 0;
    while cursor <= to {
        n += 1;
        if n > limit {
            return None;
        }
        match period.next(cursor) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    Some(n)
}

/// 在第一个和最后一个周期之间补上空周期
pub fn fill_gaps(buckets: Vec<Bucket>, period: Period) -> Vec<Bucket> {
    let (Some(mut cursor), Some(end)) = (
        buckets.first().map(|b| b.start),
        buckets.last().map(|b| b.start),
    ) else {
        return buckets;
    };
    if span(period, cursor, end, MAX_FILLED_BUCKETS).is_none() {
        tracing::warn!(
            "{cursor} 到 {end} 超过 {MAX_FILLED_BUCKETS} 个周期，不补空周期"
        );
        return buckets;
    }
    let mut existing: BTreeMap<NaiveDate, Bucket> =
        buckets.into_iter().map(|b| (b.start, b)).collect();
    let mut out = Vec::new();
    while cursor <= end {
        out.push(existing.remove(&cursor).unwrap_or_else(|| Bucket {
            label: period.label(cursor),
            start: cursor,
            total: 0.0,
            count: 0,
        }));
        match period.next(cursor) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    out
}

/// 按 key 分组求和并计算占比，金额从大到小
pub fn share_by<T>(
    records: &[T],
    key: impl Fn(&T) -> String,
    value: impl Fn(&T) -> f64,
) -> Vec<Share> {
    let mut map: HashMap<String, (f64, usize)> = HashMap::new();
    let mut grand = 0.0;
    for record in records {
        let v = value(record);
        grand += v;
        let entry = map.entry(key(record)).or_default();
        entry.0 += v;
        entry.1 += 1;
    }
    let mut shares: Vec<Share> = map
        .into_iter()
        .map(|(key, (total, count))| Share {
            percentage: percentage(total, grand),
            key,
            total: round2(total),
            count,
        })
        .collect();
    shares.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.key.cmp(&b.key)));
    shares
}

/// 按明细统计卖得最好的商品，没有商品编号时按名称归并
pub fn top_products(sales: &[Sale], n: usize) -> Vec<ProductRank> {
    let mut map: HashMap<String, ProductRank> = HashMap::new();
    for item in sales.iter().flat_map(|s| s.items.iter()) {
        let key = rank_key(&item.product_id, &item.name);
        let rank = map.entry(key).or_insert_with(|| ProductRank {
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            quantity: 0,
            revenue: 0.0,
        });
        rank.quantity += item.quantity as u64;
        rank.revenue += item.subtotal();
    }
    let mut ranks: Vec<ProductRank> = map
        .into_values()
        .map(|mut r| {
            r.revenue = round2(r.revenue);
            r
        })
        .collect();
    ranks.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| b.quantity.cmp(&a.quantity))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranks.truncate(n);
    ranks
}

fn rank_key(product_id: &str, name: &str) -> String {
    if product_id.is_empty() {
        format!("name:{}", name.trim().to_lowercase())
    } else {
        format!("id:{product_id}")
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LowStock {
    pub id: String,
    pub name: String,
    pub stock: u32,
}

/// 首页看板数据
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Summary {
    pub today_total: f64,
    pub today_count: usize,
    pub month_total: f64,
    pub month_count: usize,
    pub total: f64,
    pub count: usize,
    pub average_ticket: f64,
    pub pending_orders: usize,
    pub pending_amount: f64,
    pub paid_amount: f64,
    pub low_stock: Vec<LowStock>,
}

pub fn summary(
    sales: &[Sale],
    orders: &[Order],
    products: &[Product],
    today: NaiveDate,
    low_stock: u32,
) -> Summary {
    let mut s = Summary {
        today_total: 0.0,
        today_count: 0,
        month_total: 0.0,
        month_count: 0,
        total: 0.0,
        count: sales.len(),
        average_ticket: 0.0,
        pending_orders: 0,
        pending_amount: 0.0,
        paid_amount: 0.0,
        low_stock: Vec::new(),
    };
    for sale in sales {
        let date = sale.date.date();
        s.total += sale.amount;
        if date == today {
            s.today_total += sale.amount;
            s.today_count += 1;
        }
        if date.year() == today.year() && date.month() == today.month() {
            s.month_total += sale.amount;
            s.month_count += 1;
        }
    }
    for order in orders {
        if order.is_pending() {
            s.pending_orders += 1;
            s.pending_amount += order.amount;
        } else {
            s.paid_amount += order.amount;
        }
    }
    if s.count > 0 {
        s.average_ticket = round2(s.total / s.count as f64);
    }
    s.total = round2(s.total);
    s.today_total = round2(s.today_total);
    s.month_total = round2(s.month_total);
    s.pending_amount = round2(s.pending_amount);
    s.paid_amount = round2(s.paid_amount);
    s.low_stock = products
        .iter()
        .filter(|p| p.stock <= low_stock)
        .map(|p| LowStock {
            id: p.id.clone(),
            name: p.name.clone(),
            stock: p.stock,
        })
        .collect();
    s.low_stock.sort_by(|a, b| a.stock.cmp(&b.stock).then_with(|| a.name.cmp(&b.name)));
    s
}

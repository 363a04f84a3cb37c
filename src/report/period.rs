use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{libs::time::TimeFormat, Response};

/// 统计周期，周从周一开始
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Day,
    Week,
    Month,
}

impl Period {
    /// `date` 所在周期的第一天
    pub fn start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => date
                .checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64))
                .unwrap_or(date),
            Period::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// 下一个周期的第一天，`start` 必须是周期起点
    pub fn next(&self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            Period::Day => start.checked_add_days(Days::new(1)),
            Period::Week => start.checked_add_days(Days::new(7)),
            Period::Month => start.checked_add_months(Months::new(1)),
        }
    }

    /// `2024-01-15`、`2024-W03`（ISO 周）、`2024-01`
    pub fn label(&self, start: NaiveDate) -> String {
        match self {
            Period::Day => start.format(TimeFormat::YYYYMMDD).to_string(),
            Period::Week => {
                let week = start.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Period::Month => start.format("%Y-%m").to_string(),
        }
    }
}

impl std::str::FromStr for Period {
    type Err = Response;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Period::Day),
            "week" | "weekly" => Ok(Period::Week),
            "month" | "monthly" => Ok(Period::Month),
            _ => Err(Response::invalid_value(format!("未知的统计周期 {s}"))),
        }
    }
}

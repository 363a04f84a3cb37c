use chrono::{Local, NaiveDate, NaiveDateTime, Utc};

pub struct TimeFormat;

impl TimeFormat {
    pub const ISO: &'static str = "%Y-%m-%dT%H:%M:%S";
    pub const YYYYMMDD: &'static str = "%Y-%m-%d";
    pub const YYYYMMDD_HHMMSS: &'static str = "%Y-%m-%d %H:%M:%S";
    /// 文件名用，`20240115`
    pub const COMPACT: &'static str = "%Y%m%d";
}

/// 当前时间的快照，业务时间统一使用本地时间
#[derive(Debug, Clone, Copy)]
pub struct TIME {
    local: NaiveDateTime,
    millis: i64,
}

impl TIME {
    pub fn now() -> TIME {
        TIME {
            local: Local::now().naive_local(),
            millis: Utc::now().timestamp_millis(),
        }
    }
    pub fn naive(&self) -> NaiveDateTime {
        self.local
    }
    pub fn date(&self) -> NaiveDate {
        self.local.date()
    }
    /// 毫秒级 unix 时间戳
    pub fn millis(&self) -> i64 {
        self.millis
    }
}

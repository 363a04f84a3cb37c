use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

use crate::libs::time::TimeFormat;

/// 数字或数字字符串都接受，前端表单常把数字当字符串提交
pub fn deser_f64<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Num {
        F(f64),
        S(String),
    }
    match Num::deserialize(de)? {
        Num::F(f) => Ok(f),
        Num::S(s) if s.trim().is_empty() => Ok(0.0),
        Num::S(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("{s} 不是数字"))),
    }
}

pub fn deser_empty_to_none<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Deserialize::deserialize(de)?;
    Ok(value.and_then(|v| op::ternary!(v.trim().is_empty() => None; Some(v))))
}

/// `true`/`false`、`1`/`0` 以及对应的字符串都可以
pub fn deserialize_any_to_bool<'de, D>(de: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        B(bool),
        I(i64),
        S(String),
    }
    match Flag::deserialize(de)? {
        Flag::B(b) => Ok(b),
        Flag::I(i) => Ok(i != 0),
        Flag::S(s) => match s.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" | "" => Ok(false),
            _ => Err(serde::de::Error::custom(format!("{s} 不是布尔值"))),
        },
    }
}

/// 解析时间戳，支持 RFC3339、`YYYY-MM-DD HH:MM:SS`、`YYYY-MM-DDTHH:MM:SS` 以及 `YYYY-MM-DD`
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.naive_utc());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"] {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn deser_timestamp<'de, D>(de: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let value: String = Deserialize::deserialize(de)?;
    parse_timestamp(&value)
        .ok_or_else(|| serde::de::Error::custom(format!("{value} 不是合法的时间")))
}

pub fn serialize_timestamp<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.format(TimeFormat::ISO).to_string())
}

pub fn deser_date<'de, D>(de: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    deser_timestamp(de).map(|t| t.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Deserialize, Serialize)]
    struct Lenient {
        #[serde(deserialize_with = "deser_f64")]
        amount: f64,
        #[serde(deserialize_with = "deserialize_any_to_bool")]
        active: bool,
        #[serde(deserialize_with = "deser_timestamp")]
        #[serde(serialize_with = "serialize_timestamp")]
        date: NaiveDateTime,
        #[serde(default, deserialize_with = "deser_empty_to_none")]
        note: Option<String>,
    }

    #[test]
    fn lenient_fields_accept_form_strings() {
        let p: Lenient = serde_json::from_str(
            r#"{"amount": "12.50", "active": "1", "date": "2024-03-01", "note": "  "}"#,
        )
        .unwrap();
        assert_eq!(p.amount, 12.5);
        assert!(p.active);
        assert_eq!(p.date.to_string(), "2024-03-01 00:00:00");
        assert!(p.note.is_none());
    }

    #[test]
    fn rfc3339_is_normalised_to_utc() {
        let p: Lenient = serde_json::from_str(
            r#"{"amount": 3, "active": false, "date": "2024-01-15T10:30:00.000Z"}"#,
        )
        .unwrap();
        let out = serde_json::to_value(&p).unwrap();
        assert_eq!(out["date"], "2024-01-15T10:30:00");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(serde_json::from_str::<Lenient>(
            r#"{"amount": "abc", "active": true, "date": "2024-01-01"}"#
        )
        .is_err());
        assert!(parse_timestamp("yesterday").is_none());
    }
}

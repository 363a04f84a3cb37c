//! 表单校验，不通过时返回 `Response::invalid_value`

use regex::Regex;

use crate::Response;

lazy_static::lazy_static! {
    static ref EMAIL: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex");
}

pub fn required(field: &str, value: &str) -> Result<(), Response> {
    if value.trim().is_empty() {
        Err(Response::invalid_value(format!("{field} 不能为空")))
    } else {
        Ok(())
    }
}

pub fn positive(field: &str, value: f64) -> Result<(), Response> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Response::invalid_value(format!("{field} 必须大于0")))
    }
}

pub fn in_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), Response> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(Response::invalid_value(format!(
            "{field} 必须在 {min} 到 {max} 之间"
        )))
    }
}

pub fn email(value: &str) -> Result<(), Response> {
    if EMAIL.is_match(value.trim()) {
        Ok(())
    } else {
        Err(Response::invalid_value(format!("{value} 不是合法的邮箱")))
    }
}

pub fn min_len(field: &str, value: &str, len: usize) -> Result<(), Response> {
    if value.chars().count() >= len {
        Ok(())
    } else {
        Err(Response::invalid_value(format!("{field} 至少 {len} 个字符")))
    }
}

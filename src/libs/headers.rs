use axum::http::{header::AUTHORIZATION, HeaderMap};

#[derive(Debug, Clone)]
pub struct Bearer(String);

impl Bearer {
    pub fn token(&self) -> &str {
        &self.0
    }
    /// 解析 `Authorization: Bearer <token>`
    pub fn from_headers(headers: &HeaderMap) -> Option<Bearer> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
        let token = value
            .strip_prefix("Bearer ")
            .or_else(|| value.strip_prefix("bearer "))?
            .trim();
        op::ternary!(token.is_empty() => None; Some(Bearer(token.to_owned())))
    }
}

/// 取出请求头中的 token，缺失时直接返回 401
#[macro_export]
macro_rules! bearer {
    ($headers:expr) => {
        match $crate::libs::headers::Bearer::from_headers($headers) {
            Some(bearer) => bearer,
            None => return Err($crate::Response::token_error("缺少 token")),
        }
    };
}

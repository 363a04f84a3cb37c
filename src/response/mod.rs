use std::fmt::Display;

use axum::{
    http::{header, HeaderValue, StatusCode},
    Json,
};
use serde::{ser::SerializeStruct, Serialize};
use serde_json::{json, Value};
/// 响应数据
#[derive(Debug)]
pub struct Response {
    /// 响应状态码
    code: StatusCode,
    status: i32,
    data: Value,
}

impl axum::response::IntoResponse for Response {
    fn into_response(self) -> axum::response::Response {
        let code = self.code;
        (code, Json(self)).into_response()
    }
}

/// 成功时 `{success, status, data}`，失败时 `{success, status, message}`
impl Serialize for Response {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut s = serializer.serialize_struct("Response", 3)?;
        s.serialize_field("success", &self.is_success())?;
        s.serialize_field("status", &self.status)?;
        if self.is_success() {
            s.serialize_field("data", &self.data)?;
        } else {
            s.serialize_field("message", &self.data)?;
        }
        s.end()
    }
}
impl Response {
    pub fn new(code: StatusCode, status: i32, data: Value) -> Response {
        Self { code, status, data }
    }
    pub fn ok(data: Value) -> Self {
        Self {
            code: StatusCode::OK,
            status: 0,
            data,
        }
    }
    pub fn created(data: Value) -> Self {
        Self {
            code: StatusCode::CREATED,
            status: 0,
            data,
        }
    }
    pub fn empty() -> Self {
        Self {
            code: StatusCode::OK,
            status: 0,
            data: json!("OK"),
        }
    }
    pub fn token_error(e: impl Display) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, -1, json!(e.to_string()))
    }
    /// 内部错误
    pub fn internal_server_error(e: impl Display) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, -1, json!(e.to_string()))
    }
    /// 参数格式错误
    pub fn invalid_format(e: impl Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, 1, json!(e.to_string()))
    }
    /// 请求的数据不存在
    pub fn not_exist(e: impl Display) -> Self {
        Self::new(StatusCode::NOT_FOUND, 2, json!(e.to_string()))
    }
    /// 要添加的数据已存在
    pub fn already_exist(e: impl Display) -> Self {
        Self::new(StatusCode::CONFLICT, 3, json!(e.to_string()))
    }
    /// 权限不足
    pub fn permission_denied() -> Self {
        Self::new(StatusCode::FORBIDDEN, 4, json!("权限不足"))
    }
    /// 密码错误
    pub fn wrong_password() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, 5, json!("密码错误"))
    }
    /// 账号已停用
    pub fn inactive() -> Self {
        Self::new(StatusCode::FORBIDDEN, 6, json!("账号已停用"))
    }
    /// 数值不对
    pub fn invalid_value(e: impl Display) -> Self {
        Self::new(StatusCode::BAD_REQUEST, 7, json!(e.to_string()))
    }
    pub fn code(&self) -> StatusCode {
        self.code
    }
    pub fn status(&self) -> i32 {
        self.status
    }
    pub fn is_success(&self) -> bool {
        self.status == 0
    }
    pub fn data(&self) -> &Value {
        &self.data
    }
}

impl From<std::io::Error> for Response {
    fn from(value: std::io::Error) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            -1,
            json!(value.to_string()),
        )
    }
}

impl From<serde_json::Error> for Response {
    fn from(value: serde_json::Error) -> Self {
        Response::invalid_format(value)
    }
}
impl From<jwt::Error> for Response {
    fn from(value: jwt::Error) -> Self {
        Response::token_error(value)
    }
}
impl From<rust_xlsxwriter::XlsxError> for Response {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Response::internal_server_error(value)
    }
}

/// 文件下载
pub struct BodyFile {
    body: Vec<u8>,
    content_type: HeaderValue,
    filename: String,
}

impl BodyFile {
    pub fn new(body: Vec<u8>, content_type: &str, filename: impl Into<String>) -> Self {
        Self {
            body,
            content_type: HeaderValue::from_str(content_type)
                .unwrap_or(HeaderValue::from_static("application/octet-stream")),
            filename: filename.into(),
        }
    }
}

impl axum::response::IntoResponse for BodyFile {
    fn into_response(self) -> axum::response::Response {
        let disposition = format!("attachment; filename=\"{}\"", self.filename);
        let disposition = HeaderValue::from_str(&disposition)
            .unwrap_or(HeaderValue::from_static("attachment"));
        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, self.content_type),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.body,
        )
            .into_response()
    }
}

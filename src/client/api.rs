use std::{
    sync::{Arc, RwLock},
    time::Duration,
};

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::model::UserInfo;

use super::{ClientError, Source};

/// 服务端统一的响应格式
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: Value,
}

impl Envelope {
    fn into_result(self) -> Result<Value, ClientError> {
        if self.success {
            return Ok(self.data);
        }
        let message = match self.message {
            Value::String(s) => s,
            Value::Null => "未知错误".to_owned(),
            other => other.to_string(),
        };
        Err(ClientError::Rejected(message))
    }
}

/// 看板接口的客户端。克隆后共享同一个 token
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: String,
    description: String,
    token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|e| e.into_inner()) = token;
    }

    /// 登录成功后保存 token，返回当前用户
    pub async fn login(&self, email: &str, password: &str) -> Result<UserInfo, ClientError> {
        #[derive(Deserialize)]
        struct Login {
            token: String,
            info: UserInfo,
        }
        let data = self
            .send(
                Method::POST,
                "login",
                Some(json!({ "email": email, "password": password })),
            )
            .await?;
        let login: Login = serde_json::from_value(data)?;
        self.set_token(Some(login.token));
        tracing::debug!("{} 已登录 {}", login.info.email, self.endpoint);
        Ok(login.info)
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.send(Method::POST, "logout", None).await?;
        self.set_token(None);
        Ok(())
    }

    pub async fn session(&self) -> Result<UserInfo, ClientError> {
        let data = self.send(Method::GET, "session", None).await?;
        Ok(serde_json::from_value(data)?)
    }

    pub async fn list<T: DeserializeOwned>(&self, resource: &str) -> Result<Vec<T>, ClientError> {
        let data = self.send(Method::GET, resource, None).await?;
        Ok(serde_json::from_value(data)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, resource: &str, id: &str) -> Result<T, ClientError> {
        let data = self
            .send(Method::GET, &format!("{resource}/{id}"), None)
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    /// 返回服务端保存后的记录（编号、售价等由服务端生成）
    pub async fn create<T>(&self, resource: &str, record: &T) -> Result<T, ClientError>
    where
        T: Serialize + DeserializeOwned,
    {
        let data = self
            .send(Method::POST, resource, Some(serde_json::to_value(record)?))
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    pub async fn update<T>(&self, resource: &str, id: &str, record: &T) -> Result<T, ClientError>
    where
        T: Serialize + DeserializeOwned,
    {
        let data = self
            .send(
                Method::PUT,
                &format!("{resource}/{id}"),
                Some(serde_json::to_value(record)?),
            )
            .await?;
        Ok(serde_json::from_value(data)?)
    }

    pub async fn remove(&self, resource: &str, id: &str) -> Result<(), ClientError> {
        self.send(Method::DELETE, &format!("{resource}/{id}"), None)
            .await?;
        Ok(())
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, ClientError> {
        let url = format!("{}/api/{}", self.endpoint, path.trim_start_matches('/'));
        let mut request = self.client.request(method, &url);
        if let Some(token) = self.token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        match serde_json::from_str::<Envelope>(&text) {
            Ok(envelope) => envelope.into_result(),
            Err(_) if status == StatusCode::UNAUTHORIZED => Err(ClientError::NotLoggedIn),
            Err(_) => Err(ClientError::Http(format!("接口返回 {status}"))),
        }
    }
}

#[async_trait]
impl Source for ApiClient {
    async fn fetch(&self, resource: &str) -> Result<Value, ClientError> {
        if self.token().is_none() {
            return Err(ClientError::NotLoggedIn);
        }
        self.send(Method::GET, resource, None).await
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Default)]
pub struct ApiClientBuilder {
    endpoint: Option<String>,
    timeout: Option<Duration>,
    token: Option<String>,
}

impl ApiClientBuilder {
    /// 服务地址，例如 `http://localhost:8080`
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// 请求超时，默认10秒
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// 沿用缓存里的 token
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn build(self) -> Result<ApiClient, ClientError> {
        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:8080".to_owned())
            .trim_end_matches('/')
            .to_owned();
        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(Duration::from_secs(10)))
            .build()?;
        Ok(ApiClient {
            client,
            description: format!("api: {endpoint}"),
            endpoint,
            token: Arc::new(RwLock::new(self.token)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let api = ApiClient::builder().build().unwrap();
        assert_eq!(api.endpoint(), "http://localhost:8080");
        assert_eq!(api.description(), "api: http://localhost:8080");
        assert!(api.token().is_none());
    }

    #[test]
    fn builder_custom() {
        let api = ApiClient::builder()
            .endpoint("http://10.0.0.2:9000/")
            .timeout(Duration::from_secs(2))
            .token("abc")
            .build()
            .unwrap();
        assert_eq!(api.endpoint(), "http://10.0.0.2:9000");
        assert_eq!(api.token().as_deref(), Some("abc"));
        let cloned = api.clone();
        api.set_token(None);
        assert!(cloned.token().is_none());
    }

    #[test]
    fn envelope_unwrapping() {
        let ok: Envelope =
            serde_json::from_str(r#"{"success": true, "status": 0, "data": [1, 2]}"#).unwrap();
        assert_eq!(ok.into_result().unwrap(), json!([1, 2]));
        let err: Envelope =
            serde_json::from_str(r#"{"success": false, "status": 4, "message": "权限不足"}"#)
                .unwrap();
        match err.into_result() {
            Err(ClientError::Rejected(m)) => assert_eq!(m, "权限不足"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_requires_login() {
        let api = ApiClient::builder().build().unwrap();
        assert!(matches!(api.fetch("sales").await, Err(ClientError::NotLoggedIn)));
    }
}

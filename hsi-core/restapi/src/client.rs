//! Configuration Manager REST API 客户端核心实现

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{HostGroupApi, LunApi, PoolApi, StorageApi};
use crate::error::{RestApiError, Result};
use crate::models::{ApiVersion, ErrorBody, SessionToken};

/// API 根路径
pub const CONFIGURATION_MANAGER: &str = "/ConfigurationManager";

/// 单次请求的最大元素数
pub const MAX_ELEMENT_COUNT: u32 = 16348;

/// 客户端配置
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// http 或 https
    pub protocol: String,

    /// 管理地址 (SVP 或 Configuration Manager 服务器)
    pub host: String,

    pub port: u16,

    pub user: String,

    pub password: String,

    /// 是否验证 SSL 证书
    pub verify_ssl: bool,

    /// 连接超时（秒）
    pub connect_timeout: u64,

    /// 请求超时（秒）
    pub request_timeout: u64,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            protocol: "https".to_string(),
            host: "localhost".to_string(),
            port: 443,
            user: String::new(),
            password: String::new(),
            verify_ssl: false,
            connect_timeout: 10,
            request_timeout: 120,
        }
    }
}

impl RestClientConfig {
    /// `<protocol>://<host>:<port>`
    pub fn base_url(&self) -> Result<String> {
        let protocol = self.protocol.to_ascii_lowercase();
        if protocol != "http" && protocol != "https" {
            return Err(RestApiError::ConfigError(format!(
                "协议必须为 http 或 https, 实际为 '{}'",
                self.protocol
            )));
        }

        let raw = format!("{}://{}:{}", protocol, self.host, self.port);
        let url = Url::parse(&raw)
            .map_err(|e| RestApiError::ConfigError(format!("无效的地址 '{}': {}", raw, e)))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(RestApiError::ConfigError(format!("缺少主机地址: {}", raw)));
        }

        Ok(raw)
    }
}

/// 已建立的会话
#[derive(Debug, Clone)]
struct Session {
    storage_device_id: String,
    token: String,
    session_id: u64,
}

/// 存储 REST API 客户端
pub struct StorageClient {
    /// API 基础 URL
    base_url: String,

    /// HTTP 客户端
    http_client: Client,

    user: String,
    password: String,

    /// 当前会话
    session: Arc<RwLock<Option<Session>>>,
}

impl StorageClient {
    /// 创建新的客户端
    pub fn new(config: RestClientConfig) -> Result<Self> {
        let base_url = config.base_url()?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .connect_timeout(Duration::from_secs(config.connect_timeout))
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()
            .map_err(|e| RestApiError::HttpError(e.to_string()))?;

        debug!("REST 客户端已创建: {}", base_url);

        Ok(Self {
            base_url,
            http_client,
            user: config.user,
            password: config.password,
            session: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 查询 REST API 版本
    pub async fn api_version(&self) -> Result<ApiVersion> {
        info!("查询 REST API 版本");
        let version: ApiVersion = self
            .request(
                Method::GET,
                &format!("{}/configuration/version", CONFIGURATION_MANAGER),
                None::<()>,
            )
            .await?;
        info!("REST API 版本: {}", version.api_version);
        Ok(version)
    }

    /// 获取存储系统 API
    pub fn storage(&self) -> StorageApi<'_> {
        StorageApi::new(self)
    }

    /// 获取存储池 API（需要已建立会话）
    pub fn pools(&self) -> PoolApi<'_> {
        PoolApi::new(self)
    }

    /// 获取主机组 API（需要已建立会话）
    pub fn host_groups(&self) -> HostGroupApi<'_> {
        HostGroupApi::new(self)
    }

    /// 获取 LUN API（需要已建立会话）
    pub fn luns(&self) -> LunApi<'_> {
        LunApi::new(self)
    }

    // ============================================
    // 会话管理
    // ============================================

    /// 为指定存储系统创建会话
    pub async fn open_session(&self, storage_device_id: &str) -> Result<()> {
        info!("创建会话: 存储系统 {}", storage_device_id);

        let path = format!(
            "{}/v1/objects/storages/{}/sessions/",
            CONFIGURATION_MANAGER, storage_device_id
        );
        let url = format!("{}{}", self.base_url, path);
        debug!("REST API 请求: POST {}", url);

        // 会话创建始终使用用户名/密码
        let request = self.with_basic_auth(self.http_client.post(&url))?;
        let response = Self::send(request).await?;
        let token: SessionToken = Self::decode(response).await?;

        info!("会话已创建: session id {}", token.session_id);
        *self.session.write().await = Some(Session {
            storage_device_id: storage_device_id.to_string(),
            token: token.token,
            session_id: token.session_id,
        });
        Ok(())
    }

    /// 删除当前会话
    ///
    /// 无会话时直接返回。无论删除成功与否本地会话都会被清除。
    pub async fn close_session(&self) -> Result<()> {
        let Some(session) = self.session.write().await.take() else {
            debug!("没有需要关闭的会话");
            return Ok(());
        };

        info!("删除会话: session id {}", session.session_id);
        let url = format!(
            "{}{}/v1/objects/storages/{}/sessions/{}",
            self.base_url, CONFIGURATION_MANAGER, session.storage_device_id, session.session_id
        );
        debug!("REST API 请求: DELETE {}", url);

        let request = self
            .http_client
            .delete(&url)
            .header("Authorization", format!("Session {}", session.token))
            .json(&serde_json::json!({ "force": false }));

        Self::send(request).await?;
        info!("会话已删除");
        Ok(())
    }

    /// 是否已建立会话
    pub async fn has_session(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// 当前会话的存储系统路径 `/ConfigurationManager/v1/objects/storages/<id>`
    pub(crate) async fn storage_path(&self) -> Result<String> {
        let session = self.session.read().await;
        let session = session
            .as_ref()
            .ok_or_else(|| RestApiError::AuthError("未建立会话，请先创建会话".to_string()))?;
        Ok(format!(
            "{}/v1/objects/storages/{}",
            CONFIGURATION_MANAGER, session.storage_device_id
        ))
    }

    // ============================================
    // 请求
    // ============================================

    /// 发送 HTTP 请求
    ///
    /// 有会话时使用 `Authorization: Session <token>`，否则使用基本认证。
    pub(crate) async fn request<T: Serialize, R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<T>,
    ) -> Result<R> {
        let url = format!("{}{}", self.base_url, path);
        debug!("REST API 请求: {} {}", method, url);

        let mut request = self.http_client.request(method, &url);

        request = match self.session.read().await.as_ref() {
            Some(session) => request.header("Authorization", format!("Session {}", session.token)),
            None => self.with_basic_auth(request)?,
        };

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = Self::send(request).await?;
        Self::decode(response).await
    }

    fn with_basic_auth(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        if self.user.is_empty() || self.password.is_empty() {
            return Err(RestApiError::AuthError(
                "未指定用户名/密码，无法发送请求".to_string(),
            ));
        }
        Ok(request.basic_auth(&self.user, Some(&self.password)))
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| RestApiError::HttpError(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "无法读取错误响应".to_string());

        // 阵列的错误响应体带有 message 字段
        let message = serde_json::from_str::<ErrorBody>(&error_text)
            .map(|body| body.message)
            .unwrap_or(error_text);

        warn!("API 请求失败: {} - {}", status, message);
        Err(RestApiError::ApiError(status.as_u16(), message))
    }

    async fn decode<R: DeserializeOwned>(response: Response) -> Result<R> {
        let text = response
            .text()
            .await
            .map_err(|e| RestApiError::HttpError(e.to_string()))?;
        debug!("REST API 响应: {}", text);

        serde_json::from_str(&text).map_err(|e| RestApiError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let config = RestClientConfig {
            host: "10.70.5.104".to_string(),
            ..RestClientConfig::default()
        };
        let client = StorageClient::new(config).unwrap();
        assert_eq!(client.base_url(), "https://10.70.5.104:443");
    }

    #[test]
    fn test_rejects_unknown_protocol() {
        let config = RestClientConfig {
            protocol: "ftp".to_string(),
            ..RestClientConfig::default()
        };
        assert!(matches!(
            StorageClient::new(config),
            Err(RestApiError::ConfigError(_))
        ));
    }

    #[test]
    fn test_protocol_case_insensitive() {
        let config = RestClientConfig {
            protocol: "HTTP".to_string(),
            port: 23450,
            ..RestClientConfig::default()
        };
        assert_eq!(config.base_url().unwrap(), "http://localhost:23450");
    }
}

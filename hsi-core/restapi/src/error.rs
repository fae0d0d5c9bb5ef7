//! REST API 客户端错误定义

use thiserror::Error;

/// REST API 客户端错误类型
#[derive(Error, Debug)]
pub enum RestApiError {
    #[error("HTTP 错误: {0}")]
    HttpError(String),

    #[error("认证错误: {0}")]
    AuthError(String),

    /// 阵列返回的错误，第二项为响应体中的 `message`
    #[error("API 错误 [{0}]: {1}")]
    ApiError(u16, String),

    #[error("解析错误: {0}")]
    ParseError(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("REST API 版本 {actual} 不受支持, 至少需要 {required}")]
    UnsupportedVersion { actual: String, required: String },

    #[error("未找到存储系统: {0}")]
    StorageNotFound(String),

    #[error("存在多个存储系统, 请通过 --storage-device-id 指定: {0}")]
    AmbiguousStorage(String),
}

/// REST API 客户端结果类型
pub type Result<T> = std::result::Result<T, RestApiError>;

//! HSI 存储 REST API 客户端
//!
//! 与 Configuration Manager REST API 交互，为指标引擎提供原始存储池数据。
//!
//! # 功能
//!
//! - **版本检查**: `api_version()` + `ApiVersion::ensure_at_least`
//! - **存储系统** (`StorageApi`): 列表与选择
//! - **会话**: 基本认证创建会话，之后使用 `Session <token>` 认证
//! - **存储池** (`PoolApi`): FMC 详细信息原始 JSON
//! - **主机组/LUN** (`HostGroupApi`, `LunApi`): LUN 预留信息
//!
//! 不做重试，任何传输错误立即返回。
//!
//! # 示例
//!
//! ```ignore
//! use hsi_restapi::{select_storage, RestClientConfig, StorageClient};
//!
//! let client = StorageClient::new(RestClientConfig::default())?;
//! client.api_version().await?.ensure_at_least("1.5.0")?;
//!
//! let storages = client.storage().list().await?;
//! let storage = select_storage(&storages, None)?;
//!
//! client.open_session(&storage.storage_device_id).await?;
//! let pools = client.pools().list_raw().await;
//! client.close_session().await?;
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod models;

pub use client::{RestClientConfig, StorageClient, CONFIGURATION_MANAGER, MAX_ELEMENT_COUNT};
pub use error::{RestApiError, Result};

pub use api::{select_storage, HostGroupApi, LunApi, PoolApi, StorageApi};

pub use models::{
    ApiVersion, DataEnvelope, HostGroup, Lun, SessionToken, StorageSystem, VersionTriplet,
};

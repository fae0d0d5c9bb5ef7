//! 公共工具函数模块
//!
//! - REST 客户端创建、版本检查与存储系统选择
//! - 会话收尾（无论工作成功与否都删除会话）

use anyhow::{Context, Result};
use hsi_restapi::{select_storage, StorageClient};
use tracing::{info, warn};

use crate::commands::output::{capture_timestamp, CsvOptions};
use crate::config::CliConfig;

/// 创建客户端并为选中的存储系统建立会话
pub async fn connect(config: &CliConfig, min_version: Option<&str>) -> Result<StorageClient> {
    let rest_config = config.rest_client_config()?;
    let client = StorageClient::new(rest_config).context("创建 REST 客户端失败")?;

    if let Some(required) = min_version {
        let version = client.api_version().await.context("查询 REST API 版本失败")?;
        version.ensure_at_least(required)?;
    }

    let storages = client.storage().list().await.context("查询存储系统失败")?;
    let storage = select_storage(&storages, config.connection.storage_device_id.as_deref())?;
    info!("使用存储系统: {}", storage);

    client
        .open_session(&storage.storage_device_id)
        .await
        .context("创建会话失败")?;

    Ok(client)
}

/// 删除会话后返回工作结果
///
/// 工作失败时优先返回工作错误，删除会话失败只记录警告。
pub async fn finish<T>(client: &StorageClient, outcome: Result<T>) -> Result<T> {
    let closed = client.close_session().await;

    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e).context("删除会话失败"),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            warn!("删除会话失败: {}", close_err);
            Err(e)
        }
    }
}

/// 根据配置生成 CSV 选项
pub fn csv_options(config: &CliConfig) -> Result<CsvOptions> {
    Ok(CsvOptions {
        separator: config.csv_separator()?,
        timestamp: config.output.timestamp.then(capture_timestamp),
    })
}

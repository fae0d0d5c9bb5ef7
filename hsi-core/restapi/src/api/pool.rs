//! 存储池 API

use reqwest::Method;
use serde_json::Value;
use tracing::info;

use crate::client::StorageClient;
use crate::error::Result;

/// 存储池 API
pub struct PoolApi<'a> {
    client: &'a StorageClient,
}

impl<'a> PoolApi<'a> {
    pub(crate) fn new(client: &'a StorageClient) -> Self {
        Self { client }
    }

    /// 查询全部存储池（含 FMC 详细信息）
    ///
    /// 原样返回 JSON，结构校验由指标引擎负责。
    pub async fn list_raw(&self) -> Result<Value> {
        info!("查询存储池列表");
        let path = format!("{}/pools?detailInfoType=FMC", self.client.storage_path().await?);
        self.client.request(Method::GET, &path, None::<()>).await
    }
}

//! 主机组 API

use reqwest::Method;
use tracing::info;

use crate::client::{StorageClient, MAX_ELEMENT_COUNT};
use crate::error::Result;
use crate::models::{DataEnvelope, HostGroup};

/// 主机组 API
pub struct HostGroupApi<'a> {
    client: &'a StorageClient,
}

impl<'a> HostGroupApi<'a> {
    pub(crate) fn new(client: &'a StorageClient) -> Self {
        Self { client }
    }

    /// 查询全部主机组
    pub async fn list(&self) -> Result<Vec<HostGroup>> {
        info!("查询主机组列表");
        let path = format!(
            "{}/host-groups?count={}",
            self.client.storage_path().await?,
            MAX_ELEMENT_COUNT
        );
        let envelope: DataEnvelope<HostGroup> =
            self.client.request(Method::GET, &path, None::<()>).await?;

        info!("找到 {} 个主机组", envelope.data.len());
        Ok(envelope.data)
    }
}

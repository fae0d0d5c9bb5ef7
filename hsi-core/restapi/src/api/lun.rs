//! LUN API

use reqwest::Method;
use tracing::debug;

use crate::client::StorageClient;
use crate::error::Result;
use crate::models::{DataEnvelope, Lun};

/// LUN API
pub struct LunApi<'a> {
    client: &'a StorageClient,
}

impl<'a> LunApi<'a> {
    pub(crate) fn new(client: &'a StorageClient) -> Self {
        Self { client }
    }

    /// 查询主机组下的 LUN
    pub async fn list(&self, port_id: &str, host_group_number: u32) -> Result<Vec<Lun>> {
        debug!("查询 LUN: {} / {}", port_id, host_group_number);
        let path = format!(
            "{}/luns?portId={}&hostGroupNumber={}",
            self.client.storage_path().await?,
            port_id,
            host_group_number
        );
        let envelope: DataEnvelope<Lun> = self.client.request(Method::GET, &path, None::<()>).await?;
        Ok(envelope.data)
    }
}

//! 存储系统 API

use reqwest::Method;
use tracing::info;

use crate::client::{StorageClient, CONFIGURATION_MANAGER};
use crate::error::{RestApiError, Result};
use crate::models::{DataEnvelope, StorageSystem};

/// 存储系统 API
pub struct StorageApi<'a> {
    client: &'a StorageClient,
}

impl<'a> StorageApi<'a> {
    pub(crate) fn new(client: &'a StorageClient) -> Self {
        Self { client }
    }

    /// 查询 Configuration Manager 管理的所有存储系统
    pub async fn list(&self) -> Result<Vec<StorageSystem>> {
        info!("查询存储系统列表");
        let envelope: DataEnvelope<StorageSystem> = self
            .client
            .request(
                Method::GET,
                &format!("{}/v1/objects/storages", CONFIGURATION_MANAGER),
                None::<()>,
            )
            .await?;

        info!("找到 {} 个存储系统", envelope.data.len());
        Ok(envelope.data)
    }
}

/// 选择要操作的存储系统
///
/// 只有一个时直接返回；多个时按 `wanted`（设备 ID 或序列号）匹配。
pub fn select_storage(storages: &[StorageSystem], wanted: Option<&str>) -> Result<StorageSystem> {
    if let Some(wanted) = wanted {
        return storages
            .iter()
            .find(|s| s.storage_device_id == wanted || s.serial_number.to_string() == wanted)
            .cloned()
            .ok_or_else(|| RestApiError::StorageNotFound(wanted.to_string()));
    }

    match storages {
        [] => Err(RestApiError::StorageNotFound(
            "Configuration Manager 未管理任何存储系统".to_string(),
        )),
        [single] => Ok(single.clone()),
        many => {
            let candidates: Vec<String> = many.iter().map(ToString::to_string).collect();
            Err(RestApiError::AmbiguousStorage(candidates.join(", ")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(id: &str, serial: u64) -> StorageSystem {
        StorageSystem {
            storage_device_id: id.to_string(),
            model: "VSP G400".to_string(),
            serial_number: serial,
            svp_ip: "10.0.0.1".to_string(),
        }
    }

    #[test]
    fn test_single_storage_selected() {
        let list = vec![storage("834000470018", 470018)];
        assert_eq!(select_storage(&list, None).unwrap().serial_number, 470018);
    }

    #[test]
    fn test_ambiguous_storage() {
        let list = vec![storage("800000050679", 50679), storage("834000470018", 470018)];
        match select_storage(&list, None) {
            Err(RestApiError::AmbiguousStorage(text)) => {
                assert!(text.contains("800000050679"));
                assert!(text.contains("834000470018"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_select_by_id_or_serial() {
        let list = vec![storage("800000050679", 50679), storage("834000470018", 470018)];
        assert_eq!(
            select_storage(&list, Some("834000470018")).unwrap().serial_number,
            470018
        );
        assert_eq!(
            select_storage(&list, Some("50679")).unwrap().storage_device_id,
            "800000050679"
        );
        assert!(matches!(
            select_storage(&list, Some("1")),
            Err(RestApiError::StorageNotFound(_))
        ));
    }

    #[test]
    fn test_no_storage() {
        assert!(matches!(
            select_storage(&[], None),
            Err(RestApiError::StorageNotFound(_))
        ));
    }
}

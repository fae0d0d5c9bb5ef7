//! LUN 预留格式化
//!
//! 每个 LUN 输出一行: 端口、主机组、LUN 号 (4 位补零)、`xx:yy` 形式的 LDEV ID
//! 以及已设置的预留标志。

use std::collections::BTreeMap;

use serde::Serialize;

use crate::rows::RowStream;

pub const LABEL_PORT: &str = "Port";
pub const LABEL_HOST_GROUP: &str = "Host group";
pub const LABEL_LUN: &str = "LUN";
pub const LABEL_LDEV: &str = "LDEV";
pub const LABEL_RESERVATIONS: &str = "Reservations";

/// 无预留时的文本
pub const NO_RESERVATION: &str = "none";

/// 预留标志（键有序，输出稳定）
pub type LuHostReserve = BTreeMap<String, bool>;

/// 单个 LUN 的预留信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LunReservation {
    pub port_id: String,
    pub host_group_number: u32,
    pub host_group_name: String,
    pub lun: u32,
    pub ldev_id: u32,
    pub lu_host_reserve: LuHostReserve,
}

impl LunReservation {
    /// 是否存在任何预留
    pub fn is_reserved(&self) -> bool {
        self.lu_host_reserve.values().any(|flag| *flag)
    }

    /// 单行文本: `LUN: 0001 LDEV: 34:00 reservations: none`
    pub fn summary(&self) -> String {
        format!(
            "LUN: {} LDEV: {} reservations: {}",
            format_lun_number(self.lun),
            format_ldev_id(self.ldev_id),
            format_reservations(&self.lu_host_reserve)
        )
    }
}

/// LDEV ID 转为 `xx:yy` 形式
///
/// 小写十六进制，不足 4 位左补零，在最后两位前插入冒号。
/// 超过 4 位时保留全部高位 (`0x12345` → `123:45`)。
pub fn format_ldev_id(ldev_id: u32) -> String {
    let hex = format!("{:04x}", ldev_id);
    let (high, low) = hex.split_at(hex.len() - 2);
    format!("{}:{}", high, low)
}

/// LUN 号补零到 4 位
pub fn format_lun_number(lun: u32) -> String {
    format!("{:04}", lun)
}

/// 预留标志文本: `(pgrKey=true; persistent=true)`，无预留时为 `none`
pub fn format_reservations(flags: &LuHostReserve) -> String {
    let set: Vec<String> = flags
        .iter()
        .filter(|(_, value)| **value)
        .map(|(key, value)| format!("{}={}", key, value))
        .collect();

    if set.is_empty() {
        NO_RESERVATION.to_string()
    } else {
        format!("({})", set.join("; "))
    }
}

/// 生成预留报表行流
pub fn reservation_rows(luns: &[LunReservation]) -> RowStream {
    let mut stream = RowStream::new();
    for lun in luns {
        stream.push_block([
            (LABEL_PORT, lun.port_id.clone()),
            (
                LABEL_HOST_GROUP,
                format!("{} ({})", lun.host_group_name, lun.host_group_number),
            ),
            (LABEL_LUN, format_lun_number(lun.lun)),
            (LABEL_LDEV, format_ldev_id(lun.ldev_id)),
            (LABEL_RESERVATIONS, format_reservations(&lun.lu_host_reserve)),
        ]);
    }
    stream
}

//! 有效可用容量归一化
//!
//! 未启用物理容量特性的存储池不会填充 `availablePhysicalVolumeCapacity`，
//! 此时退回使用虚拟口径的 `availableVolumeCapacity`。两者都表示“剩余可用容量”，
//! 但口径不同，调用方通过 [`CapacitySource`] 区分。

use crate::record::{PoolRecord, AVAILABLE_PHYSICAL_VOLUME_CAPACITY, AVAILABLE_VOLUME_CAPACITY};

/// 可用容量的来源口径
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacitySource {
    /// `availablePhysicalVolumeCapacity`
    Physical,
    /// `availableVolumeCapacity`
    Virtual,
}

impl CapacitySource {
    /// 对应的原始字段名
    pub fn field(self) -> &'static str {
        match self {
            CapacitySource::Physical => AVAILABLE_PHYSICAL_VOLUME_CAPACITY,
            CapacitySource::Virtual => AVAILABLE_VOLUME_CAPACITY,
        }
    }
}

/// 归一化后的有效可用容量 (MiB)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveFree {
    pub mib: f64,
    pub source: CapacitySource,
}

/// 计算有效可用容量：优先物理口径，否则虚拟口径
pub fn effective_free(record: &PoolRecord) -> EffectiveFree {
    match record.available_physical_volume_capacity {
        Some(mib) => EffectiveFree {
            mib,
            source: CapacitySource::Physical,
        },
        None => EffectiveFree {
            mib: record.available_volume_capacity,
            source: CapacitySource::Virtual,
        },
    }
}

//! 存储池类型分类
//!
//! 判定顺序（先匹配先生效）：
//! 1. 存在 `usedFMCPoolVolumesCapacity`（启用 FMC）:
//!    - `totalPhysicalCapacity == availablePhysicalFMCPoolVolumesCapacity` → 全闪 FMC 池
//!    - 否则 → 混合 FMC 池
//! 2. 否则按 `poolType`: RT/HDT → 分层池, HDP → 精简池, HTI → Thin Image 池
//! 3. 其他值 → 无法分类

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::{MetricsError, Result};
use crate::record::{
    PoolRecord, AVAILABLE_PHYSICAL_FMC_POOL_VOLUMES_CAPACITY, POOL_TYPE, TOTAL_PHYSICAL_CAPACITY,
};

/// 存储池技术类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PoolVariant {
    /// 全部由 FMC 卷组成的全闪池
    AllFlashCompressed,
    /// 包含 FMC 卷的混合池
    MixedCompressed,
    /// 分层池 (HDT/RT)
    Tiered,
    /// 精简置备池 (HDP)
    ThinProvisioned,
    /// Thin Image 快照池 (HTI)
    ThinImage,
}

/// 公式组
///
/// 全闪与混合 FMC 池目前共用同一组公式，这里显式映射而不是复制代码。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaSet {
    /// 物理容量字段 + 压缩比
    Compressed,
    /// 已用 = (虚拟总容量 - 可用) / 1024
    Tiered,
    /// 已用 = 总容量 GB - 可用 GB
    Thin,
}

impl PoolVariant {
    /// 该类型使用的公式组
    pub fn formula_set(self) -> FormulaSet {
        match self {
            // TODO: 混合池是否应区分公式，待产品确认
            PoolVariant::AllFlashCompressed | PoolVariant::MixedCompressed => FormulaSet::Compressed,
            PoolVariant::Tiered => FormulaSet::Tiered,
            PoolVariant::ThinProvisioned | PoolVariant::ThinImage => FormulaSet::Thin,
        }
    }

    /// 是否支持压缩比
    pub fn supports_compression(self) -> bool {
        self.formula_set() == FormulaSet::Compressed
    }

    /// 显示名称
    pub fn display_name(self) -> &'static str {
        match self {
            PoolVariant::AllFlashCompressed => "All FMC pool (all flash)",
            PoolVariant::MixedCompressed => "FMC containing pool",
            PoolVariant::Tiered => "No FMC HDT pool",
            PoolVariant::ThinProvisioned => "No FMC HDP pool",
            PoolVariant::ThinImage => "No FMC HTI pool",
        }
    }
}

impl fmt::Display for PoolVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// 对存储池记录分类
pub fn classify(record: &PoolRecord) -> Result<PoolVariant> {
    let variant = if record.has_fmc() {
        let total = record.require(TOTAL_PHYSICAL_CAPACITY, record.total_physical_capacity)?;
        let fmc_available = record.require(
            AVAILABLE_PHYSICAL_FMC_POOL_VOLUMES_CAPACITY,
            record.available_physical_fmc_pool_volumes_capacity,
        )?;

        // 原始 MiB 值精确比较
        if total == fmc_available {
            PoolVariant::AllFlashCompressed
        } else {
            PoolVariant::MixedCompressed
        }
    } else {
        let pool_type = record.pool_type.as_deref().ok_or_else(|| {
            MetricsError::MissingOrMistypedField {
                pool: record.pool_ref(),
                field: POOL_TYPE,
                expected: "string",
            }
        })?;

        match pool_type {
            "RT" | "HDT" => PoolVariant::Tiered,
            "HDP" => PoolVariant::ThinProvisioned,
            "HTI" => PoolVariant::ThinImage,
            other => {
                return Err(MetricsError::UnclassifiablePoolType {
                    pool: record.pool_ref(),
                    pool_type: other.to_string(),
                })
            }
        }
    };

    debug!("存储池 {} ({}) 分类为: {}", record.pool_id, record.pool_name, variant);
    Ok(variant)
}

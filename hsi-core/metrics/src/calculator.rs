//! 存储池指标计算
//!
//! 按 [`FormulaSet`] 计算物理容量 (GiB) 与压缩比。所有 GB 与比值都按
//! [`round_half_up`] 保留两位小数。
//!
//! | 公式组 | 总物理容量 | 已用物理容量 | 可用物理容量 | FMC 压缩比 | 总压缩比 | 有效可用 |
//! |---|---|---|---|---|---|---|
//! | Compressed | totalPhysical/1024 | usedPhysical/1024 | free/1024 | usedFMC/usedPhysicalFMC | (totalPool-free)/usedPhysical | free/1024 × round(总压缩比) |
//! | Tiered | totalPool/1024 | (totalPool-free)/1024 | free/1024 | -1.00 | -1.00 | 可用物理容量 |
//! | Thin | totalPool/1024 | 总 - 可用 | free/1024 | -1.00 | -1.00 | 可用物理容量 |

use std::fmt;

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::classifier::{FormulaSet, PoolVariant};
use crate::error::{MetricsError, Result};
use crate::normalizer::EffectiveFree;
use crate::record::{
    PoolRecord, TOTAL_PHYSICAL_CAPACITY, USED_FMC_POOL_VOLUMES_CAPACITY,
    USED_PHYSICAL_CAPACITY, USED_PHYSICAL_FMC_POOL_VOLUMES_CAPACITY,
};

/// MiB → GiB
pub const MIB_PER_GIB: f64 = 1024.0;

/// 输出保留的小数位数
pub const ROUND_PRECISION: i32 = 2;

/// 不支持压缩比时的哨兵值
pub const RATIO_SENTINEL: f64 = -1.0;

/// 容量平衡校验允许的舍入误差
pub const BALANCE_TOLERANCE: f64 = 0.01;

/// 四舍五入（半数向上），不使用银行家舍入
///
/// 放大后的小数部分按相对误差容忍二进制表示偏差，
/// 保证 `3.005` 这类十进制中点值进位到 `3.01`。
pub fn round_half_up(value: f64, places: i32) -> f64 {
    let pow = 10f64.powi(places);
    let scaled = value.abs() * pow;
    let floor = scaled.floor();
    let fraction = scaled - floor;
    let tolerance = scaled * f64::EPSILON * 4.0;

    let rounded = if fraction + tolerance >= 0.5 {
        floor + 1.0
    } else {
        floor
    };

    // 舍入到零时不保留负号，避免输出 -0.00
    if rounded == 0.0 {
        return 0.0;
    }
    (rounded / pow).copysign(value)
}

/// 压缩比
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompressionRatio {
    /// 该存储池类型不支持压缩
    Unsupported,
    /// 已计算并舍入的比值
    Measured(f64),
}

impl CompressionRatio {
    /// 数值形式，不支持时为 -1.00
    pub fn as_f64(self) -> f64 {
        match self {
            CompressionRatio::Unsupported => RATIO_SENTINEL,
            CompressionRatio::Measured(value) => value,
        }
    }

    /// 是否为哨兵值
    pub fn is_sentinel(self) -> bool {
        matches!(self, CompressionRatio::Unsupported)
    }
}

impl fmt::Display for CompressionRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.as_f64())
    }
}

impl Serialize for CompressionRatio {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

/// 存储池指标（每条记录推导一次，之后不再修改）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolMetrics {
    pub pool_id: i64,
    pub pool_name: String,
    pub variant: PoolVariant,
    #[serde(rename = "totalPhysicalCapacityGB")]
    pub total_physical_capacity_gb: f64,
    #[serde(rename = "usedPhysicalCapacityGB")]
    pub used_physical_capacity_gb: f64,
    #[serde(rename = "freePhysicalCapacityGB")]
    pub free_physical_capacity_gb: f64,
    pub fmc_compression_ratio: CompressionRatio,
    pub total_compression_ratio: CompressionRatio,
    #[serde(rename = "effectiveFreeGB")]
    pub effective_free_gb: f64,
}

impl PoolMetrics {
    /// 已用 + 可用 是否等于总容量（允许 ±0.01 舍入误差）
    pub fn capacity_balanced(&self) -> bool {
        let sum = self.used_physical_capacity_gb + self.free_physical_capacity_gb;
        // 加一点余量吸收两次舍入后的浮点误差
        (sum - self.total_physical_capacity_gb).abs() <= BALANCE_TOLERANCE + 1e-9
    }
}

/// 该公式组的 已用 + 可用 是否应等于总容量
///
/// 压缩池的三个物理字段相互独立，平衡关系不成立，不做校验。
fn checks_balance(set: FormulaSet) -> bool {
    matches!(set, FormulaSet::Tiered | FormulaSet::Thin)
}

/// 按存储池类型计算指标
pub fn calculate(
    record: &PoolRecord,
    variant: PoolVariant,
    free: EffectiveFree,
) -> Result<PoolMetrics> {
    debug!(
        "存储池 {} 可用容量取自 `{}`",
        record.pool_id,
        free.source.field()
    );

    let set = variant.formula_set();
    let metrics = match set {
        FormulaSet::Compressed => compressed(record, variant, free)?,
        FormulaSet::Tiered => {
            let total = record.total_pool_capacity / MIB_PER_GIB;
            let used = (record.total_pool_capacity - free.mib) / MIB_PER_GIB;
            let free_gb = free.mib / MIB_PER_GIB;
            uncompressed(record, variant, total, used, free_gb)
        }
        FormulaSet::Thin => {
            let total = record.total_pool_capacity / MIB_PER_GIB;
            let free_gb = free.mib / MIB_PER_GIB;
            uncompressed(record, variant, total, total - free_gb, free_gb)
        }
    };

    if checks_balance(set) && !metrics.capacity_balanced() {
        warn!(
            "存储池 {} ({}) 容量不平衡: 已用 {:.2} + 可用 {:.2} != 总计 {:.2}",
            metrics.pool_id,
            metrics.pool_name,
            metrics.used_physical_capacity_gb,
            metrics.free_physical_capacity_gb,
            metrics.total_physical_capacity_gb
        );
    }

    debug!("存储池 {} 指标: {:?}", metrics.pool_id, metrics);
    Ok(metrics)
}

fn uncompressed(
    record: &PoolRecord,
    variant: PoolVariant,
    total_gb: f64,
    used_gb: f64,
    free_gb: f64,
) -> PoolMetrics {
    let free_physical = round_half_up(free_gb, ROUND_PRECISION);

    PoolMetrics {
        pool_id: record.pool_id,
        pool_name: record.pool_name.clone(),
        variant,
        total_physical_capacity_gb: round_half_up(total_gb, ROUND_PRECISION),
        used_physical_capacity_gb: round_half_up(used_gb, ROUND_PRECISION),
        free_physical_capacity_gb: free_physical,
        fmc_compression_ratio: CompressionRatio::Unsupported,
        total_compression_ratio: CompressionRatio::Unsupported,
        effective_free_gb: free_physical,
    }
}

fn compressed(record: &PoolRecord, variant: PoolVariant, free: EffectiveFree) -> Result<PoolMetrics> {
    let total_physical = record.require(TOTAL_PHYSICAL_CAPACITY, record.total_physical_capacity)?;
    let used_physical = record.require(USED_PHYSICAL_CAPACITY, record.used_physical_capacity)?;
    let used_fmc = record.require(
        USED_FMC_POOL_VOLUMES_CAPACITY,
        record.used_fmc_pool_volumes_capacity,
    )?;
    let used_physical_fmc = record.require(
        USED_PHYSICAL_FMC_POOL_VOLUMES_CAPACITY,
        record.used_physical_fmc_pool_volumes_capacity,
    )?;

    let fmc_ratio = divide(
        record,
        "fmcCompressionRatio",
        used_fmc,
        USED_PHYSICAL_FMC_POOL_VOLUMES_CAPACITY,
        used_physical_fmc,
    )?;
    let total_ratio = divide(
        record,
        "totalCompressionRatio",
        record.total_pool_capacity - free.mib,
        USED_PHYSICAL_CAPACITY,
        used_physical,
    )?;

    let total_ratio = round_half_up(total_ratio, ROUND_PRECISION);
    let free_gb = free.mib / MIB_PER_GIB;

    Ok(PoolMetrics {
        pool_id: record.pool_id,
        pool_name: record.pool_name.clone(),
        variant,
        total_physical_capacity_gb: round_half_up(total_physical / MIB_PER_GIB, ROUND_PRECISION),
        used_physical_capacity_gb: round_half_up(used_physical / MIB_PER_GIB, ROUND_PRECISION),
        free_physical_capacity_gb: round_half_up(free_gb, ROUND_PRECISION),
        fmc_compression_ratio: CompressionRatio::Measured(round_half_up(fmc_ratio, ROUND_PRECISION)),
        total_compression_ratio: CompressionRatio::Measured(total_ratio),
        // 未舍入的可用容量 × 已舍入的总压缩比
        effective_free_gb: round_half_up(free_gb * total_ratio, ROUND_PRECISION),
    })
}

fn divide(
    record: &PoolRecord,
    ratio: &'static str,
    dividend: f64,
    divisor_field: &'static str,
    divisor: f64,
) -> Result<f64> {
    if divisor == 0.0 {
        return Err(MetricsError::DivisionByZero {
            pool: record.pool_ref(),
            ratio,
            divisor: divisor_field,
        });
    }
    Ok(dividend / divisor)
}

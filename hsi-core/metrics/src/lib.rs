//! HSI 存储池指标推导引擎
//!
//! 把存储管理 API 返回的原始存储池描述转换为面向运维的容量与压缩比指标。
//!
//! # 流程
//!
//! - **解码** (`record`): `{"data": [...]}` 包装校验 + 强类型记录
//! - **归一化** (`normalizer`): 有效可用容量（物理口径优先，否则虚拟口径）
//! - **分类** (`classifier`): 五种存储池类型之一
//! - **计算** (`calculator`): 按公式组计算 GiB 容量与压缩比，半数向上舍入两位小数
//! - **行构建** (`rows`): 带开始/结束标记的 (标签, 值) 行流
//! - **LUN 预留** (`reserve`): LDEV ID 与预留标志格式化
//!
//! # 示例
//!
//! ```ignore
//! use hsi_metrics::{derive_page, EngineConfig};
//!
//! let report = derive_page(&response, &EngineConfig::default())?;
//! for block in report.rows.blocks() {
//!     println!("{:?}", block);
//! }
//! ```

pub mod calculator;
pub mod classifier;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod record;
pub mod reserve;
pub mod rows;

pub use error::{MetricsError, PoolRef, Result};

pub use calculator::{calculate, round_half_up, CompressionRatio, PoolMetrics};
pub use classifier::{classify, FormulaSet, PoolVariant};
pub use normalizer::{effective_free, CapacitySource, EffectiveFree};
pub use pipeline::{
    derive_page, derive_pool, EngineConfig, PoolReport, RecordPolicy, SkippedPool,
    UnclassifiedPolicy,
};
pub use record::{unwrap_data_envelope, PoolRecord};
pub use reserve::{
    format_ldev_id, format_lun_number, format_reservations, reservation_rows, LuHostReserve,
    LunReservation,
};
pub use rows::{build_rows, RowBlock, RowEntry, RowStream, POOL_LABELS};

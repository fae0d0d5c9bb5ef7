//! 指标引擎错误定义

use std::fmt;

use thiserror::Error;

/// 指标引擎结果类型
pub type Result<T> = std::result::Result<T, MetricsError>;

/// 出错存储池的标识（尽可能携带 ID 与名称）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolRef {
    /// 存储池 ID
    pub id: Option<i64>,
    /// 存储池名称
    pub name: Option<String>,
}

impl PoolRef {
    /// 创建存储池标识
    pub fn new(id: Option<i64>, name: Option<String>) -> Self {
        Self { id, name }
    }
}

impl fmt::Display for PoolRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.id, &self.name) {
            (Some(id), Some(name)) => write!(f, "pool {} ({})", id, name),
            (Some(id), None) => write!(f, "pool {}", id),
            (None, Some(name)) => write!(f, "pool ? ({})", name),
            (None, None) => write!(f, "pool ?"),
        }
    }
}

/// 指标引擎错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    /// 响应顶层结构不是单键 `data` 包装
    #[error("响应结构错误: {0}")]
    SchemaViolation(String),

    /// 当前存储池类型所需字段缺失或类型错误
    #[error("{pool}: 字段 `{field}` 缺失或类型错误 (期望 {expected})")]
    MissingOrMistypedField {
        pool: PoolRef,
        field: &'static str,
        expected: &'static str,
    },

    /// 无法识别的存储池类型
    #[error("{pool}: 无法识别的存储池类型 `{pool_type}`")]
    UnclassifiablePoolType { pool: PoolRef, pool_type: String },

    /// 压缩比分母为零
    #[error("{pool}: 计算 {ratio} 时除数 `{divisor}` 为 0")]
    DivisionByZero {
        pool: PoolRef,
        ratio: &'static str,
        divisor: &'static str,
    },
}

impl MetricsError {
    /// 出错的存储池（整体结构错误时为 None）
    pub fn pool(&self) -> Option<&PoolRef> {
        match self {
            MetricsError::SchemaViolation(_) => None,
            MetricsError::MissingOrMistypedField { pool, .. }
            | MetricsError::UnclassifiablePoolType { pool, .. }
            | MetricsError::DivisionByZero { pool, .. } => Some(pool),
        }
    }
}

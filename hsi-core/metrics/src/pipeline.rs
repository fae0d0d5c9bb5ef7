//! 指标推导流水线
//!
//! 对每条记录依次执行 归一化 → 分类 → 计算 → 行构建，严格按数组顺序，
//! 记录之间不共享状态。跳过策略通过 [`EngineConfig`] 显式传入。

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::calculator::{calculate, PoolMetrics};
use crate::classifier::classify;
use crate::error::{MetricsError, PoolRef, Result};
use crate::normalizer::effective_free;
use crate::record::{unwrap_data_envelope, PoolRecord};
use crate::rows::RowStream;

/// 无法分类的存储池如何处理
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnclassifiedPolicy {
    /// 记录警告并跳过，不输出行
    #[default]
    Skip,
    /// 作为错误终止
    Error,
}

/// 字段缺失/类型错误的记录如何处理
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordPolicy {
    /// 终止整个运行
    #[default]
    Abort,
    /// 记录警告并跳过
    Skip,
}

/// 引擎配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub unclassified: UnclassifiedPolicy,
    #[serde(default)]
    pub invalid_record: RecordPolicy,
}

impl EngineConfig {
    /// 该错误在当前策略下是否可跳过
    fn skips(&self, err: &MetricsError) -> bool {
        match err {
            MetricsError::UnclassifiablePoolType { .. } => {
                self.unclassified == UnclassifiedPolicy::Skip
            }
            MetricsError::MissingOrMistypedField { .. } => {
                self.invalid_record == RecordPolicy::Skip
            }
            // 结构错误与除零始终致命
            MetricsError::SchemaViolation(_) | MetricsError::DivisionByZero { .. } => false,
        }
    }
}

/// 被跳过的存储池
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPool {
    pub pool: PoolRef,
    pub reason: MetricsError,
}

/// 一页存储池的推导结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoolReport {
    /// 渲染用行流
    pub rows: RowStream,
    /// 按输入顺序的指标
    pub metrics: Vec<PoolMetrics>,
    /// 按策略跳过的存储池
    pub skipped: Vec<SkippedPool>,
}

/// 推导单个存储池，按策略跳过时返回 `Ok(None)`
pub fn derive_pool(record: &PoolRecord, config: &EngineConfig) -> Result<Option<PoolMetrics>> {
    match derive(record) {
        Ok(metrics) => Ok(Some(metrics)),
        Err(err) if config.skips(&err) => {
            warn!("跳过存储池: {}", err);
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn derive(record: &PoolRecord) -> Result<PoolMetrics> {
    let free = effective_free(record);
    let variant = classify(record)?;
    calculate(record, variant, free)
}

/// 推导整页响应 (`{"data": [...]}`)
pub fn derive_page(response: &Value, config: &EngineConfig) -> Result<PoolReport> {
    let items = unwrap_data_envelope(response)?;
    info!("开始处理 {} 个存储池", items.len());

    let mut report = PoolReport::default();

    for item in items {
        match PoolRecord::from_json(item).and_then(|record| derive(&record)) {
            Ok(metrics) => {
                report.rows.push_pool(&metrics);
                report.metrics.push(metrics);
            }
            Err(err) if config.skips(&err) => {
                warn!("跳过存储池: {}", err);
                report.skipped.push(SkippedPool {
                    pool: err.pool().cloned().unwrap_or_default(),
                    reason: err,
                });
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        "存储池处理完成: 输出 {} 个, 跳过 {} 个",
        report.metrics.len(),
        report.skipped.len()
    );
    Ok(report)
}

//! 存储池原始记录
//!
//! 在系统边界把 REST API 返回的 JSON 元素解码为强类型记录。
//! 之后的归一化、分类和计算只处理 `Option<f64>` 等类型化字段，
//! 不再接触 `serde_json::Value`。
//!
//! 所有容量字段单位均为 MiB。

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{MetricsError, PoolRef, Result};

/// 响应包装字段名
pub const DATA_ELEMENT: &str = "data";

// ============================================
// 字段名
// ============================================

pub(crate) const POOL_ID: &str = "poolId";
pub(crate) const POOL_NAME: &str = "poolName";
pub(crate) const POOL_TYPE: &str = "poolType";
pub(crate) const TOTAL_POOL_CAPACITY: &str = "totalPoolCapacity";
pub(crate) const AVAILABLE_VOLUME_CAPACITY: &str = "availableVolumeCapacity";
pub(crate) const USED_PHYSICAL_CAPACITY_RATE: &str = "usedPhysicalCapacityRate";
pub(crate) const TOTAL_PHYSICAL_CAPACITY: &str = "totalPhysicalCapacity";
pub(crate) const USED_PHYSICAL_CAPACITY: &str = "usedPhysicalCapacity";
pub(crate) const AVAILABLE_PHYSICAL_VOLUME_CAPACITY: &str = "availablePhysicalVolumeCapacity";
pub(crate) const USED_FMC_POOL_VOLUMES_CAPACITY: &str = "usedFMCPoolVolumesCapacity";
pub(crate) const USED_PHYSICAL_FMC_POOL_VOLUMES_CAPACITY: &str =
    "usedPhysicalFMCPoolVolumesCapacity";
pub(crate) const AVAILABLE_PHYSICAL_FMC_POOL_VOLUMES_CAPACITY: &str =
    "availablePhysicalFMCPoolVolumesCapacity";

/// 存储池原始记录（每个 API 数组元素一条）
#[derive(Debug, Clone, PartialEq)]
pub struct PoolRecord {
    /// 存储池 ID
    pub pool_id: i64,
    /// 存储池名称
    pub pool_name: String,
    /// 存储池类型 (HDP/RT/HDT/HTI/...)，仅在无 FMC 字段时参与分类
    pub pool_type: Option<String>,
    /// 虚拟总容量
    pub total_pool_capacity: f64,
    /// 虚拟可用容量
    pub available_volume_capacity: f64,

    // 以下字段仅在支持硬件压缩的阵列/固件上出现
    pub used_physical_capacity_rate: Option<f64>,
    pub total_physical_capacity: Option<f64>,
    pub used_physical_capacity: Option<f64>,
    pub available_physical_volume_capacity: Option<f64>,
    pub used_fmc_pool_volumes_capacity: Option<f64>,
    pub used_physical_fmc_pool_volumes_capacity: Option<f64>,
    pub available_physical_fmc_pool_volumes_capacity: Option<f64>,
}

impl PoolRecord {
    /// 从单个 JSON 数组元素解码
    pub fn from_json(value: &Value) -> Result<Self> {
        let Some(map) = value.as_object() else {
            return Err(MetricsError::SchemaViolation(format!(
                "存储池元素不是 JSON 对象: {}",
                value
            )));
        };

        // 先尽力取出标识，保证后续错误信息能定位到存储池
        let pool = PoolRef::new(
            map.get(POOL_ID).and_then(as_integer),
            map.get(POOL_NAME).and_then(Value::as_str).map(str::to_string),
        );
        let fields = Fields { map, pool: &pool };

        let record = Self {
            pool_id: fields.required_integer(POOL_ID)?,
            pool_name: fields.required_str(POOL_NAME)?,
            pool_type: fields.optional_str(POOL_TYPE)?,
            total_pool_capacity: fields.required_number(TOTAL_POOL_CAPACITY)?,
            available_volume_capacity: fields.required_number(AVAILABLE_VOLUME_CAPACITY)?,
            used_physical_capacity_rate: fields.optional_number(USED_PHYSICAL_CAPACITY_RATE)?,
            total_physical_capacity: fields.optional_number(TOTAL_PHYSICAL_CAPACITY)?,
            used_physical_capacity: fields.optional_number(USED_PHYSICAL_CAPACITY)?,
            available_physical_volume_capacity: fields
                .optional_number(AVAILABLE_PHYSICAL_VOLUME_CAPACITY)?,
            used_fmc_pool_volumes_capacity: fields.optional_number(USED_FMC_POOL_VOLUMES_CAPACITY)?,
            used_physical_fmc_pool_volumes_capacity: fields
                .optional_number(USED_PHYSICAL_FMC_POOL_VOLUMES_CAPACITY)?,
            available_physical_fmc_pool_volumes_capacity: fields
                .optional_number(AVAILABLE_PHYSICAL_FMC_POOL_VOLUMES_CAPACITY)?,
        };

        debug!("解码存储池记录: {} ({})", record.pool_id, record.pool_name);
        Ok(record)
    }

    /// 存储池标识（用于错误信息）
    pub fn pool_ref(&self) -> PoolRef {
        PoolRef::new(Some(self.pool_id), Some(self.pool_name.clone()))
    }

    /// 是否启用了 FMC 压缩
    pub fn has_fmc(&self) -> bool {
        self.used_fmc_pool_volumes_capacity.is_some()
    }

    /// 取出当前存储池类型所需的可选字段，缺失时返回类型化错误
    pub fn require(&self, field: &'static str, value: Option<f64>) -> Result<f64> {
        value.ok_or_else(|| MetricsError::MissingOrMistypedField {
            pool: self.pool_ref(),
            field,
            expected: "number",
        })
    }
}

/// 校验顶层响应为 `{"data": [...]}` 单键包装并返回数组
pub fn unwrap_data_envelope(response: &Value) -> Result<&[Value]> {
    let Some(map) = response.as_object() else {
        return Err(MetricsError::SchemaViolation(
            "响应不是 JSON 对象".to_string(),
        ));
    };

    if map.len() != 1 {
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        return Err(MetricsError::SchemaViolation(format!(
            "响应应只包含 `{}` 一个键, 实际为 {:?}",
            DATA_ELEMENT, keys
        )));
    }

    match map.get(DATA_ELEMENT) {
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(MetricsError::SchemaViolation(format!(
            "`{}` 不是数组: {}",
            DATA_ELEMENT, other
        ))),
        None => Err(MetricsError::SchemaViolation(format!(
            "响应缺少 `{}` 键",
            DATA_ELEMENT
        ))),
    }
}

/// 整数字段同时接受 `20` 与 `20.0`
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|v| v.fract() == 0.0 && v.abs() < i64::MAX as f64)
            .map(|v| v as i64)
    })
}

/// 带存储池上下文的字段读取器
struct Fields<'a> {
    map: &'a Map<String, Value>,
    pool: &'a PoolRef,
}

impl Fields<'_> {
    fn mistyped(&self, field: &'static str, expected: &'static str) -> MetricsError {
        MetricsError::MissingOrMistypedField {
            pool: self.pool.clone(),
            field,
            expected,
        }
    }

    /// `null` 与缺失同等对待
    fn present(&self, field: &str) -> Option<&Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    fn required_integer(&self, field: &'static str) -> Result<i64> {
        self.present(field)
            .and_then(as_integer)
            .ok_or_else(|| self.mistyped(field, "integer"))
    }

    fn required_str(&self, field: &'static str) -> Result<String> {
        self.optional_str(field)?
            .ok_or_else(|| self.mistyped(field, "string"))
    }

    fn optional_str(&self, field: &'static str) -> Result<Option<String>> {
        match self.present(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(self.mistyped(field, "string")),
        }
    }

    fn required_number(&self, field: &'static str) -> Result<f64> {
        self.optional_number(field)?
            .ok_or_else(|| self.mistyped(field, "number"))
    }

    fn optional_number(&self, field: &'static str) -> Result<Option<f64>> {
        match self.present(field) {
            None => Ok(None),
            Some(v) => v
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.mistyped(field, "number")),
        }
    }
}

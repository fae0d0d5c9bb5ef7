//! Configuration Manager REST API 数据模型
//!
//! 列表接口统一返回 `{"data": [...]}`，由 [`DataEnvelope`] 严格解码。

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{RestApiError, Result};

/// 列表响应包装
///
/// 只允许 `data` 一个键，多余的顶层键视为结构错误。
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataEnvelope<T> {
    pub data: Vec<T>,
}

/// 错误响应体
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

// ============================================
// 版本
// ============================================

/// REST API 版本信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVersion {
    #[serde(default)]
    pub product_name: String,
    pub api_version: String,
}

/// 三段式版本号 (`1.5.0`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct VersionTriplet {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl VersionTriplet {
    /// 解析 `major.minor.patch`，允许后缀 (`1.9.0-01`)
    pub fn parse(text: &str) -> Result<Self> {
        let pattern = Regex::new(r"^\s*(\d+)\.(\d+)\.(\d+)")
            .map_err(|e| RestApiError::ParseError(e.to_string()))?;

        let caps = pattern
            .captures(text)
            .ok_or_else(|| RestApiError::ParseError(format!("无法解析版本号: {}", text)))?;

        let part = |index: usize| -> Result<u32> {
            caps[index]
                .parse()
                .map_err(|_| RestApiError::ParseError(format!("无法解析版本号: {}", text)))
        };

        Ok(Self {
            major: part(1)?,
            minor: part(2)?,
            patch: part(3)?,
        })
    }
}

impl fmt::Display for VersionTriplet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl ApiVersion {
    /// 当前版本不低于 `required`，否则返回 `UnsupportedVersion`
    pub fn ensure_at_least(&self, required: &str) -> Result<()> {
        let actual = VersionTriplet::parse(&self.api_version)?;
        let minimum = VersionTriplet::parse(required)?;

        match actual.cmp(&minimum) {
            Ordering::Less => Err(RestApiError::UnsupportedVersion {
                actual: self.api_version.clone(),
                required: required.to_string(),
            }),
            _ => Ok(()),
        }
    }
}

// ============================================
// 存储系统与会话
// ============================================

/// 存储系统
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSystem {
    pub storage_device_id: String,
    #[serde(default)]
    pub model: String,
    pub serial_number: u64,
    #[serde(default)]
    pub svp_ip: String,
}

impl fmt::Display for StorageSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Serial:{} StorageDeviceID:{} IP:{})",
            self.model, self.serial_number, self.storage_device_id, self.svp_ip
        )
    }
}

/// 会话令牌
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    pub token: String,
    pub session_id: u64,
}

// ============================================
// 主机组与 LUN
// ============================================

/// 主机组
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostGroup {
    pub host_group_id: String,
    pub port_id: String,
    pub host_group_number: u32,
    pub host_group_name: String,
    #[serde(default)]
    pub host_mode: Option<String>,
}

/// LUN 路径
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lun {
    pub lun_id: String,
    pub port_id: String,
    pub host_group_number: u32,
    pub lun: u32,
    pub ldev_id: u32,
    /// 预留标志 (openSystem/persistent/pgrKey/mainframe/acaReserve)
    #[serde(default)]
    pub lu_host_reserve: BTreeMap<String, bool>,
}

//! CLI 配置管理
//!
//! **数据存储方式**: TOML 文件 (~/.config/hsi/config.toml)
//!
//! 优先级（高 → 低）: 命令行参数 > 环境变量 (`HSI_HOST`/`HSI_USER`/`HSI_PASSWORD`) > 配置文件 > 默认值

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use hsi_metrics::{EngineConfig, RecordPolicy, UnclassifiedPolicy};
use hsi_restapi::RestClientConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::commands::output::OutputFormat;

pub const ENV_HOST: &str = "HSI_HOST";
pub const ENV_USER: &str = "HSI_USER";
pub const ENV_PASSWORD: &str = "HSI_PASSWORD";

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("读取配置文件失败 {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("解析配置文件失败 {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("缺少配置项: {0}")]
    Missing(&'static str),

    #[error("无效的配置: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 连接设置
    pub connection: ConnectionConfig,

    /// 输出设置
    pub output: OutputConfig,

    /// 记录处理策略
    pub policy: EngineConfig,
}

/// 连接设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// http 或 https
    pub protocol: String,

    pub host: String,

    pub port: u16,

    pub user: Option<String>,

    pub password: Option<String>,

    /// 是否验证 SSL 证书
    pub verify_ssl: bool,

    /// 连接超时（秒）
    pub connect_timeout: u64,

    /// 请求超时（秒）
    pub request_timeout: u64,

    /// 多个存储系统时使用的设备 ID 或序列号
    pub storage_device_id: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        let rest = RestClientConfig::default();
        Self {
            protocol: rest.protocol,
            host: rest.host,
            port: rest.port,
            user: None,
            password: None,
            verify_ssl: rest.verify_ssl,
            connect_timeout: rest.connect_timeout,
            request_timeout: rest.request_timeout,
            storage_device_id: None,
        }
    }
}

/// 输出设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// CSV 分隔符
    pub separator: char,

    /// CSV 是否输出时间戳列
    pub timestamp: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Table,
            separator: ',',
            timestamp: true,
        }
    }
}

/// 命令行覆盖项
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// 协议 (http/https)
    #[arg(long, global = true)]
    pub protocol: Option<String>,

    /// 管理地址 (SVP 或 Configuration Manager 服务器)
    #[arg(short = 'H', long, global = true)]
    pub host: Option<String>,

    /// 端口
    #[arg(short = 'P', long, global = true)]
    pub port: Option<u16>,

    /// 用户名
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// 密码
    #[arg(short, long, global = true)]
    pub password: Option<String>,

    /// 存储系统设备 ID 或序列号
    #[arg(long, global = true)]
    pub storage_device_id: Option<String>,

    /// 验证 SSL 证书
    #[arg(long, global = true)]
    pub verify_ssl: bool,

    /// 输出格式
    #[arg(short = 'o', long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// CSV 分隔符
    #[arg(long, global = true)]
    pub separator: Option<char>,

    /// CSV 不输出时间戳列
    #[arg(long, global = true)]
    pub no_timestamp: bool,

    /// 无法分类的存储池: skip 或 error
    #[arg(long, value_parser = ["skip", "error"], global = true)]
    pub unclassified: Option<String>,

    /// 字段缺失的存储池: abort 或 skip
    #[arg(long, value_parser = ["abort", "skip"], global = true)]
    pub invalid_record: Option<String>,
}

impl CliConfig {
    /// 默认配置文件路径
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("hsi").join("config.toml"))
    }

    /// 加载配置
    ///
    /// 显式指定的文件必须存在；默认路径不存在时使用默认值。
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let expanded = shellexpand::tilde(path);
                Self::load_from_file(Path::new(expanded.as_ref()))?
            }
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::load_from_file(&path)?,
                _ => {
                    debug!("未找到配置文件, 使用默认配置");
                    Self::default()
                }
            },
        };

        config.apply_env_vars();
        Ok(config)
    }

    /// 从文件加载
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("加载配置文件: {:?}", path);

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 应用环境变量
    pub fn apply_env_vars(&mut self) {
        self.apply_env(|key| env::var(key).ok());
    }

    fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(host) = lookup(ENV_HOST) {
            self.connection.host = host;
        }
        if let Some(user) = lookup(ENV_USER) {
            self.connection.user = Some(user);
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.connection.password = Some(password);
        }
    }

    /// 应用命令行覆盖项
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        let connection = &mut self.connection;
        if let Some(protocol) = &overrides.protocol {
            connection.protocol = protocol.clone();
        }
        if let Some(host) = &overrides.host {
            connection.host = host.clone();
        }
        if let Some(port) = overrides.port {
            connection.port = port;
        }
        if let Some(user) = &overrides.user {
            connection.user = Some(user.clone());
        }
        if let Some(password) = &overrides.password {
            connection.password = Some(password.clone());
        }
        if let Some(id) = &overrides.storage_device_id {
            connection.storage_device_id = Some(id.clone());
        }
        if overrides.verify_ssl {
            connection.verify_ssl = true;
        }

        if let Some(format) = overrides.format {
            self.output.format = format;
        }
        if let Some(separator) = overrides.separator {
            self.output.separator = separator;
        }
        if overrides.no_timestamp {
            self.output.timestamp = false;
        }

        match overrides.unclassified.as_deref() {
            Some("error") => self.policy.unclassified = UnclassifiedPolicy::Error,
            Some("skip") => self.policy.unclassified = UnclassifiedPolicy::Skip,
            _ => {}
        }
        match overrides.invalid_record.as_deref() {
            Some("skip") => self.policy.invalid_record = RecordPolicy::Skip,
            Some("abort") => self.policy.invalid_record = RecordPolicy::Abort,
            _ => {}
        }
    }

    /// 校验连接所需的配置项
    pub fn validate(&self) -> Result<()> {
        if self.connection.host.trim().is_empty() {
            return Err(ConfigError::Missing("connection.host"));
        }
        if self.connection.user.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::Missing("connection.user"));
        }
        if self.connection.password.as_deref().map_or(true, str::is_empty) {
            return Err(ConfigError::Missing("connection.password"));
        }
        self.csv_separator()?;
        Ok(())
    }

    /// CSV 分隔符（必须是单字节 ASCII 字符）
    pub fn csv_separator(&self) -> Result<u8> {
        let separator = self.output.separator;
        if separator.is_ascii() {
            Ok(separator as u8)
        } else {
            Err(ConfigError::Invalid(format!(
                "CSV 分隔符必须是 ASCII 字符: '{}'",
                separator
            )))
        }
    }

    /// 转换为 REST 客户端配置
    pub fn rest_client_config(&self) -> Result<RestClientConfig> {
        self.validate()?;
        let connection = &self.connection;

        Ok(RestClientConfig {
            protocol: connection.protocol.clone(),
            host: connection.host.clone(),
            port: connection.port,
            user: connection.user.clone().unwrap_or_default(),
            password: connection.password.clone().unwrap_or_default(),
            verify_ssl: connection.verify_ssl,
            connect_timeout: connection.connect_timeout,
            request_timeout: connection.request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.connection.protocol, "https");
        assert_eq!(config.connection.port, 443);
        assert!(!config.connection.verify_ssl);
        assert_eq!(config.output.format, OutputFormat::Table);
        assert_eq!(config.output.separator, ',');
        assert!(config.output.timestamp);
        assert_eq!(config.policy, EngineConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
[connection]
host = "10.70.5.104"
port = 23451
user = "maintenance"
password = "raid-maintenance"
storage_device_id = "834000470018"

[output]
format = "csv"
separator = ";"

[policy]
unclassified = "error"
invalid_record = "skip"
"#,
        );

        let config = CliConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.connection.host, "10.70.5.104");
        assert_eq!(config.connection.port, 23451);
        assert_eq!(config.connection.protocol, "https");
        assert_eq!(config.connection.storage_device_id.as_deref(), Some("834000470018"));
        assert_eq!(config.output.format, OutputFormat::Csv);
        assert_eq!(config.csv_separator().unwrap(), b';');
        assert!(config.output.timestamp);
        assert_eq!(config.policy.unclassified, UnclassifiedPolicy::Error);
        assert_eq!(config.policy.invalid_record, RecordPolicy::Skip);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let err = CliConfig::load(path.to_str()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_toml() {
        let file = write_config("[connection\nhost = ");
        assert!(matches!(
            CliConfig::load_from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_env_then_flags() {
        let mut config = CliConfig::default();
        let env: HashMap<&str, &str> = [(ENV_HOST, "env-host"), (ENV_USER, "env-user")].into();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.connection.host, "env-host");
        assert_eq!(config.connection.user.as_deref(), Some("env-user"));
        assert!(config.connection.password.is_none());

        let overrides = ConfigOverrides {
            host: Some("flag-host".to_string()),
            password: Some("secret".to_string()),
            format: Some(OutputFormat::Json),
            no_timestamp: true,
            unclassified: Some("error".to_string()),
            ..ConfigOverrides::default()
        };
        config.apply_overrides(&overrides);

        assert_eq!(config.connection.host, "flag-host");
        assert_eq!(config.connection.user.as_deref(), Some("env-user"));
        assert_eq!(config.connection.password.as_deref(), Some("secret"));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(!config.output.timestamp);
        assert_eq!(config.policy.unclassified, UnclassifiedPolicy::Error);
    }

    #[test]
    fn test_validate_requires_credentials() {
        let mut config = CliConfig::default();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("connection.user"))
        ));

        config.connection.user = Some("maintenance".to_string());
        config.connection.password = Some(String::new());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Missing("connection.password"))
        ));

        config.connection.password = Some("raid-maintenance".to_string());
        let rest = config.rest_client_config().unwrap();
        assert_eq!(rest.user, "maintenance");
        assert_eq!(rest.port, 443);
    }

    #[test]
    fn test_non_ascii_separator() {
        let mut config = CliConfig::default();
        config.output.separator = '；';
        assert!(matches!(config.csv_separator(), Err(ConfigError::Invalid(_))));
    }
}

//! HSI CLI 应用
//!
//! 查询存储阵列的存储池并输出容量与压缩比报表，或输出 LUN 预留信息。

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use hsi_metrics::MetricsError;
use hsi_restapi::RestApiError;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{CliConfig, ConfigError, ConfigOverrides};

#[derive(Parser)]
#[command(name = "hsi")]
#[command(about = "HSI - 存储池容量与压缩比报表工具", long_about = None)]
#[command(version)]
struct Cli {
    /// 日志级别 (trace/debug/info/warn/error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// 输出详细日志 (等同 --log-level info)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// 输出跟踪日志 (等同 --log-level trace)
    #[arg(long, global = true)]
    trace: bool,

    /// 配置文件路径 (默认 ~/.config/hsi/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(flatten)]
    overrides: ConfigOverrides,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 存储池容量与压缩比报表
    Pool,

    /// LUN 预留报表
    Reserve {
        /// 只输出存在预留的 LUN
        #[arg(long)]
        reserved_only: bool,
    },

    /// 查询 REST API 版本
    Version,
}

// ============================================
// 退出码
// ============================================

const EXIT_OTHER: u8 = 2;
const EXIT_CONFIG: u8 = 1;
const EXIT_STORAGE_SELECTION: u8 = 20;
const EXIT_SCHEMA: u8 = 41;
const EXIT_MISSING_FIELD: u8 = 42;
const EXIT_UNCLASSIFIABLE: u8 = 43;
const EXIT_DIVISION_BY_ZERO: u8 = 44;
const EXIT_HTTP: u8 = 100;
const EXIT_AUTH: u8 = 101;
const EXIT_API: u8 = 104;
const EXIT_VERSION: u8 = 204;

/// 按错误链中第一个已知错误类型确定退出码
fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<MetricsError>() {
            return match e {
                MetricsError::SchemaViolation(_) => EXIT_SCHEMA,
                MetricsError::MissingOrMistypedField { .. } => EXIT_MISSING_FIELD,
                MetricsError::UnclassifiablePoolType { .. } => EXIT_UNCLASSIFIABLE,
                MetricsError::DivisionByZero { .. } => EXIT_DIVISION_BY_ZERO,
            };
        }
        if let Some(e) = cause.downcast_ref::<RestApiError>() {
            return match e {
                RestApiError::ConfigError(_) => EXIT_CONFIG,
                RestApiError::AuthError(_) => EXIT_AUTH,
                RestApiError::ApiError(..) => EXIT_API,
                RestApiError::HttpError(_) | RestApiError::ParseError(_) => EXIT_HTTP,
                RestApiError::UnsupportedVersion { .. } => EXIT_VERSION,
                RestApiError::StorageNotFound(_) | RestApiError::AmbiguousStorage(_) => {
                    EXIT_STORAGE_SELECTION
                }
            };
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return EXIT_CONFIG;
        }
    }
    EXIT_OTHER
}

/// 面向用户的单行错误提示（含完整错误链）
fn diagnostic(err: &anyhow::Error) -> String {
    format!("{} {:#}", "错误:".red(), err)
}

fn init_logging(cli: &Cli) {
    let log_level = cli.log_level.to_lowercase();
    let level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "info"
    } else {
        match log_level.as_str() {
            level @ ("trace" | "debug" | "info" | "warn" | "error") => level,
            _ => "warn",
        }
    }
    .to_string();

    // RUST_LOG 优先
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // 日志写入 stderr，stdout 只输出报表
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = CliConfig::load(cli.config.as_deref())?;
    config.apply_overrides(&cli.overrides);

    match cli.command {
        Commands::Pool => commands::pool::handle(&config).await,
        Commands::Reserve { reserved_only } => commands::reserve::handle(&config, reserved_only).await,
        Commands::Version => commands::version::handle(&config).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    info!("HSI CLI 启动");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = exit_code(&err);
            debug!("执行失败, 退出码 {}", code);
            eprintln!("{}", diagnostic(&err));
            ExitCode::from(code)
        }
    }
}

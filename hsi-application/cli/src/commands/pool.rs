//! 存储池容量报表

use anyhow::{Context, Result};
use colored::Colorize;
use hsi_metrics::{derive_page, PoolReport};
use hsi_restapi::StorageClient;
use tracing::info;

use crate::commands::{common, output};
use crate::config::CliConfig;

/// FMC 详细信息需要的最低 REST API 版本
pub const MIN_API_VERSION: &str = "1.5.0";

pub async fn handle(config: &CliConfig) -> Result<()> {
    let csv = common::csv_options(config)?;
    let client = common::connect(config, Some(MIN_API_VERSION)).await?;

    let outcome = collect(&client, config).await;
    let report = common::finish(&client, outcome).await?;

    for skipped in &report.skipped {
        eprintln!("{} {}", "跳过:".yellow(), skipped.reason);
    }

    output::render(config.output.format, &report.rows, &report.metrics, &csv)
}

async fn collect(client: &StorageClient, config: &CliConfig) -> Result<PoolReport> {
    let raw = client.pools().list_raw().await.context("查询存储池失败")?;
    let report = derive_page(&raw, &config.policy)?;
    info!("存储池报表: {} 个存储池", report.metrics.len());
    Ok(report)
}

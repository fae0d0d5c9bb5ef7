//! REST API 版本查询

use anyhow::{Context, Result};
use colored::Colorize;
use hsi_restapi::StorageClient;

use crate::commands::pool::MIN_API_VERSION;
use crate::config::CliConfig;

pub async fn handle(config: &CliConfig) -> Result<()> {
    let client = StorageClient::new(config.rest_client_config()?).context("创建 REST 客户端失败")?;
    let version = client.api_version().await.context("查询 REST API 版本失败")?;

    println!("{}: {}", version.product_name, version.api_version.green());
    match version.ensure_at_least(MIN_API_VERSION) {
        Ok(()) => println!("存储池报表: {}", "支持".green()),
        Err(e) => println!("存储池报表: {} ({})", "不支持".red(), e),
    }
    Ok(())
}

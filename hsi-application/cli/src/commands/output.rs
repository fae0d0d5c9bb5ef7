//! CLI 通用输出格式化模块
//!
//! 行流 (`RowStream`) 的 table/csv 渲染与 JSON 输出

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{Local, SecondsFormat};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use hsi_metrics::RowStream;
use serde::{Deserialize, Serialize};
use tracing::info;

/// CSV 时间戳列标题
pub const TIMESTAMP_HEADER: &str = "Time(RFC3339)";

/// 输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 每个块一张表
    #[default]
    Table,
    /// 每个块一行
    Csv,
    /// JSON 数组
    Json,
}

/// CSV 选项
#[derive(Debug, Clone)]
pub struct CsvOptions {
    pub separator: u8,
    /// 每行前缀的采集时间
    pub timestamp: Option<String>,
}

/// 当前时间 (RFC 3339，秒精度)
pub fn capture_timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// 按格式输出到标准输出
pub fn render<T: Serialize>(
    format: OutputFormat,
    rows: &RowStream,
    items: &[T],
    csv: &CsvOptions,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Table => write_table(&mut out, rows)?,
        OutputFormat::Csv => write_csv(&mut out, rows, csv)?,
        OutputFormat::Json => write_json(&mut out, items)?,
    }

    out.flush().context("写入标准输出失败")
}

/// 表格格式输出，块之间空一行
pub fn write_table<W: Write>(out: &mut W, rows: &RowStream) -> Result<()> {
    let blocks = rows.blocks();
    if blocks.is_empty() {
        info!("没有数据可输出");
        return Ok(());
    }

    for (index, block) in blocks.iter().enumerate() {
        if index > 0 {
            writeln!(out)?;
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        for (label, value) in block {
            table.add_row(vec![label.as_str(), value.as_str()]);
        }

        writeln!(out, "{}", table)?;
    }

    Ok(())
}

/// CSV 格式输出: 标题行取自第一个块的标签，之后每个块一行
pub fn write_csv<W: Write>(out: &mut W, rows: &RowStream, options: &CsvOptions) -> Result<()> {
    let blocks = rows.blocks();
    let Some(first) = blocks.first() else {
        info!("没有数据可输出");
        return Ok(());
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.separator)
        .from_writer(out);

    let mut header: Vec<&str> = Vec::with_capacity(first.len() + 1);
    if options.timestamp.is_some() {
        header.push(TIMESTAMP_HEADER);
    }
    header.extend(first.iter().map(|(label, _)| label.as_str()));
    writer.write_record(&header).context("写入 CSV 标题失败")?;

    for block in &blocks {
        let mut record: Vec<&str> = Vec::with_capacity(block.len() + 1);
        if let Some(timestamp) = &options.timestamp {
            record.push(timestamp);
        }
        record.extend(block.iter().map(|(_, value)| value.as_str()));
        writer.write_record(&record).context("写入 CSV 行失败")?;
    }

    writer.flush().context("写入 CSV 失败")?;
    Ok(())
}

/// JSON 格式输出
pub fn write_json<W: Write, T: Serialize>(out: &mut W, items: &[T]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, items).context("序列化 JSON 失败")?;
    writeln!(out)?;
    Ok(())
}

//! 行构建
//!
//! 把 [`PoolMetrics`] 展开为有序的 (标签, 值) 字符串对，
//! 每个存储池前后各有一个分隔标记，渲染器据此在扁平流中分组。

use crate::calculator::PoolMetrics;

pub const LABEL_POOL_ID: &str = "Pool ID";
pub const LABEL_POOL_NAME: &str = "Pool name";
pub const LABEL_TOTAL_PHYSICAL: &str = "Total physical capacity [GB]";
pub const LABEL_USED_PHYSICAL: &str = "Used physical capacity [GB]";
pub const LABEL_FREE_PHYSICAL: &str = "Free physical capacity [GB]";
pub const LABEL_FMC_RATIO: &str = "Compression ratio FMC";
pub const LABEL_TOTAL_RATIO: &str = "Compression ratio total";
pub const LABEL_EFFECTIVE_FREE: &str = "Effective total GB free [GB]";

/// 固定输出顺序
pub const POOL_LABELS: [&str; 8] = [
    LABEL_POOL_ID,
    LABEL_POOL_NAME,
    LABEL_TOTAL_PHYSICAL,
    LABEL_USED_PHYSICAL,
    LABEL_FREE_PHYSICAL,
    LABEL_FMC_RATIO,
    LABEL_TOTAL_RATIO,
    LABEL_EFFECTIVE_FREE,
];

/// 行流中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEntry {
    /// 一个块的开始
    Start,
    /// 标签与值
    Pair { label: String, value: String },
    /// 一个块的结束
    End,
}

impl RowEntry {
    pub fn pair(label: impl Into<String>, value: impl Into<String>) -> Self {
        RowEntry::Pair {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// 一个块内的 (标签, 值) 对
pub type RowBlock = Vec<(String, String)>;

/// 扁平化的多块行流
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowStream {
    entries: Vec<RowEntry>,
}

impl RowStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个完整的块（自动加上开始/结束标记）
    pub fn push_block<I, L, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (L, V)>,
        L: Into<String>,
        V: Into<String>,
    {
        self.entries.push(RowEntry::Start);
        self.entries
            .extend(pairs.into_iter().map(|(l, v)| RowEntry::pair(l, v)));
        self.entries.push(RowEntry::End);
    }

    /// 追加一个存储池的行
    pub fn push_pool(&mut self, metrics: &PoolMetrics) {
        self.entries.extend(build_rows(metrics));
    }

    pub fn entries(&self) -> &[RowEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按开始/结束标记重新分组
    ///
    /// 标记之外的孤立 `Pair` 会被忽略。
    pub fn blocks(&self) -> Vec<RowBlock> {
        let mut blocks = Vec::new();
        let mut current: Option<RowBlock> = None;

        for entry in &self.entries {
            match entry {
                RowEntry::Start => current = Some(Vec::new()),
                RowEntry::Pair { label, value } => {
                    if let Some(block) = current.as_mut() {
                        block.push((label.clone(), value.clone()));
                    }
                }
                RowEntry::End => {
                    if let Some(block) = current.take() {
                        blocks.push(block);
                    }
                }
            }
        }

        blocks
    }
}

/// 构建单个存储池的行（含开始/结束标记）
pub fn build_rows(metrics: &PoolMetrics) -> Vec<RowEntry> {
    let values = [
        metrics.pool_id.to_string(),
        metrics.pool_name.clone(),
        format_gb(metrics.total_physical_capacity_gb),
        format_gb(metrics.used_physical_capacity_gb),
        format_gb(metrics.free_physical_capacity_gb),
        metrics.fmc_compression_ratio.to_string(),
        metrics.total_compression_ratio.to_string(),
        format_gb(metrics.effective_free_gb),
    ];

    let mut rows = Vec::with_capacity(POOL_LABELS.len() + 2);
    rows.push(RowEntry::Start);
    rows.extend(
        POOL_LABELS
            .iter()
            .zip(values)
            .map(|(label, value)| RowEntry::pair(*label, value)),
    );
    rows.push(RowEntry::End);
    rows
}

fn format_gb(value: f64) -> String {
    format!("{:.2}", value)
}

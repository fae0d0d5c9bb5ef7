//! CLI 命令处理模块

pub mod common; // 公共工具函数
pub mod output;
pub mod pool;
pub mod reserve;
pub mod version;

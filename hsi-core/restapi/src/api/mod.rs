//! Configuration Manager REST API 模块
//!
//! - 存储系统 (StorageApi)
//! - 存储池 (PoolApi)
//! - 主机组 (HostGroupApi)
//! - LUN (LunApi)

pub mod host_group;
pub mod lun;
pub mod pool;
pub mod storage;

pub use host_group::HostGroupApi;
pub use lun::LunApi;
pub use pool::PoolApi;
pub use storage::{select_storage, StorageApi};

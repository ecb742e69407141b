//! Mock 实现模块
//!
//! 提供外部子系统的 Mock 实现，用于测试

pub mod gpio;
pub mod hwmon;
pub mod of;

//! 测试支持 crate
//!
//! 提供子系统的 Mock 实现和设备树构造工具

#![no_std]

extern crate alloc;

pub mod dtb;
pub mod mock;

//! CAN 总线终端电阻状态监控
//!
//! 两路 CAN 总线各有一根终端电阻检测 GPIO。本驱动从设备描述中找到这两根 GPIO，
//! 将其申请为输入，并在 hwmon 设备下发布只读属性：
//!
//! | 属性 | 内容 |
//! |---|---|
//! | `name` | 实例名 |
//! | `can0_status` / `can1_status` | `canN termination is: ON\|OFF` |
//! | `can0_value` / `can1_value` | `0` 或 `1` |
//!
//! # 模块
//!
//! - [`channel`] - 通道枚举及名称映射
//! - [`binding`] - 设备描述 → 通道绑定表（GPIO 申请与回滚）
//! - [`attr`] - 属性读取与属性描述表
//! - [`lifecycle`] - probe / remove 与撤销栈
//! - [`error`] - 错误类型

#![no_std]

extern crate alloc;

pub mod attr;
pub mod binding;
pub mod channel;
pub mod error;
pub mod lifecycle;

use alloc::sync::Arc;

use device::{DeviceError, GpioOps, HwmonOps};

pub use binding::{BindingTable, CanHwmonPlatformData};
pub use channel::Channel;
pub use error::CanHwmonError;
pub use lifecycle::{CanHwmonDriver, DRIVER_NAME, OF_MATCH_TABLE};

/// 创建驱动并注册到全局平台总线
pub fn driver_init(
    gpio: Arc<dyn GpioOps>,
    hwmon: Arc<dyn HwmonOps>,
) -> Result<Arc<CanHwmonDriver>, DeviceError> {
    let driver = Arc::new(CanHwmonDriver::new(gpio, hwmon));
    device::register_driver(driver.clone())?;
    Ok(driver)
}

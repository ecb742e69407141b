//! 平台设备模型
//!
//! 此 crate 提供驱动与外部子系统之间的抽象接口和通用实现，包括：
//!
//! - [`DeviceNode`] - 设备描述（设备树）查询接口，以及基于 `fdt` 的 [`FdtDeviceNode`]
//! - [`GpioOps`] - GPIO 子系统接口，[`GpioLine`] 以 RAII 方式持有已申请的线
//! - [`HwmonOps`] - hwmon 注册/属性文件接口，[`HwmonClass`] 为内存实现
//! - [`PlatformDriver`] / [`PlatformBus`] - 平台驱动模型与全局总线 [`PLATFORM_BUS`]
//! - `dev_err!` 等带设备名前缀的日志宏
//!
//! # 架构解耦
//!
//! GPIO 与 hwmon 子系统由平台实现，驱动只依赖 trait，
//! 初始化驱动时以 `Arc<dyn ...>` 传入具体实现。

#![no_std]

extern crate alloc;

pub mod driver;
pub mod error;
pub mod gpio;
pub mod hwmon;
mod macros;
pub mod of;
pub mod sysfs;

#[doc(hidden)]
pub use log as __private_log;

// Re-export driver
pub use driver::{DeviceId, PLATFORM_BUS, PlatformBus, PlatformDevice, PlatformDriver, register_driver};

// Re-export error
pub use error::DeviceError;

// Re-export gpio
pub use gpio::{GpioLine, GpioNum, GpioOps};

// Re-export hwmon
pub use hwmon::{HwmonClass, HwmonDevice, HwmonOps};

// Re-export of
#[cfg(feature = "fdt")]
pub use of::FdtDeviceNode;
pub use of::{DeviceNode, PhandleArgs};

// Re-export sysfs
pub use sysfs::{FileMode, SysfsAttr};

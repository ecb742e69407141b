//! 硬件监控（hwmon）服务接口
//!
//! 驱动向 hwmon 子系统注册一个设备，并在其下发布属性文件。
//! [`HwmonClass`] 是一个内存中的 hwmon 类实现，供平台直接使用。

mod class;

pub use class::HwmonClass;

use core::fmt;

use crate::error::DeviceError;
use crate::sysfs::SysfsAttr;

/// 已注册的 hwmon 设备句柄，显示为 `hwmonN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HwmonDevice(u32);

impl HwmonDevice {
    /// 由 hwmon 子系统分配的编号构造句柄
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// 设备编号
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for HwmonDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hwmon{}", self.0)
    }
}

/// hwmon 子系统操作
pub trait HwmonOps: Send + Sync {
    /// 为父设备 `parent` 注册一个 hwmon 设备
    fn register(&self, parent: &str) -> Result<HwmonDevice, DeviceError>;

    /// 注销 hwmon 设备
    fn unregister(&self, dev: HwmonDevice);

    /// 在设备下创建属性文件
    fn create_file(&self, dev: HwmonDevice, attr: SysfsAttr) -> Result<(), DeviceError>;

    /// 删除属性文件，文件不存在时忽略
    fn remove_file(&self, dev: HwmonDevice, name: &str);
}

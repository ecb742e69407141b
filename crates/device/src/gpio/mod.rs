//! GPIO 服务接口
//!
//! GPIO 子系统由平台提供，驱动只通过 [`GpioOps`] 使用它。
//! [`GpioLine`] 以 RAII 方式持有一根已申请的线，离开作用域时自动释放。

use alloc::sync::Arc;
use core::fmt;

use crate::error::DeviceError;
use crate::of::{DeviceNode, PhandleArgs};

/// 全局 GPIO 编号
pub type GpioNum = u32;

/// GPIO 控制器节点上描述参数个数的属性名
pub const GPIO_CELLS: &str = "#gpio-cells";

/// GPIO 子系统操作
///
/// 平台需要实现此 trait 并在初始化驱动时传入。
pub trait GpioOps: Send + Sync {
    /// 将设备描述中的引用（控制器 phandle + 参数）翻译为全局 GPIO 编号
    fn xlate(&self, spec: &PhandleArgs) -> Result<GpioNum, DeviceError>;

    /// 独占申请一根 GPIO，`label` 为使用者标签
    ///
    /// 已被其他使用者持有时返回 [`DeviceError::Busy`]。
    fn request(&self, gpio: GpioNum, label: &str) -> Result<(), DeviceError>;

    /// 释放之前申请的 GPIO
    fn free(&self, gpio: GpioNum);

    /// 将 GPIO 配置为输入
    fn direction_input(&self, gpio: GpioNum) -> Result<(), DeviceError>;

    /// 采样 GPIO 当前电平，有效返回 true
    fn get_value(&self, gpio: GpioNum) -> bool;
}

/// 统计节点 `list` 属性中的 GPIO 引用个数
pub fn of_gpio_named_count(node: &dyn DeviceNode, list: &str) -> Result<usize, DeviceError> {
    node.count_phandle_with_args(list, GPIO_CELLS)
}

/// 取得节点 `list` 属性中第 `index` 个 GPIO 的全局编号
pub fn of_get_named_gpio(
    node: &dyn DeviceNode,
    list: &str,
    index: usize,
    ops: &dyn GpioOps,
) -> Result<GpioNum, DeviceError> {
    let spec = node.parse_phandle_with_args(list, GPIO_CELLS, index)?;
    ops.xlate(&spec)
}

/// 一根已申请并配置为输入的 GPIO 线
///
/// Drop 时调用 [`GpioOps::free`]。
pub struct GpioLine {
    gpio: GpioNum,
    ops: Arc<dyn GpioOps>,
}

impl GpioLine {
    /// 申请 `gpio` 并配置为输入
    ///
    /// 配置失败时已申请的线会在返回前释放。
    pub fn request_input(
        ops: &Arc<dyn GpioOps>,
        gpio: GpioNum,
        label: &str,
    ) -> Result<Self, DeviceError> {
        ops.request(gpio, label)?;
        let line = GpioLine {
            gpio,
            ops: Arc::clone(ops),
        };
        ops.direction_input(gpio)?;
        Ok(line)
    }

    /// 全局 GPIO 编号
    pub fn gpio(&self) -> GpioNum {
        self.gpio
    }

    /// 采样当前电平
    pub fn is_active(&self) -> bool {
        self.ops.get_value(self.gpio)
    }
}

impl Drop for GpioLine {
    fn drop(&mut self) {
        self.ops.free(self.gpio);
    }
}

impl fmt::Debug for GpioLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpioLine").field("gpio", &self.gpio).finish()
    }
}

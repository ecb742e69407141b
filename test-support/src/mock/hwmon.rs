//! hwmon 子系统的 Mock 实现
//!
//! 包装 [`HwmonClass`]，在其上增加故障注入与事件日志。失败的调用不记入日志。

use alloc::{
    collections::btree_set::BTreeSet,
    string::{String, ToString},
    vec::Vec,
};
use core::sync::atomic::{AtomicBool, Ordering};

use device::{DeviceError, HwmonClass, HwmonDevice, HwmonOps, SysfsAttr};
use sync::SpinLock;

/// hwmon 事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwmonEvent {
    /// 注册（设备、父设备名）
    Register(HwmonDevice, String),
    /// 注销
    Unregister(HwmonDevice),
    /// 创建属性文件
    CreateFile(HwmonDevice, String),
    /// 删除属性文件
    RemoveFile(HwmonDevice, String),
}

/// Mock 的 hwmon 子系统
#[derive(Default)]
pub struct MockHwmon {
    class: HwmonClass,
    fail_register: AtomicBool,
    fail_create: SpinLock<BTreeSet<String>>,
    events: SpinLock<Vec<HwmonEvent>>,
}

impl MockHwmon {
    /// 创建空的 hwmon 子系统
    pub fn new() -> Self {
        Self::default()
    }

    /// 之后的注册返回 [`DeviceError::NoMemory`]
    pub fn fail_register(&self, fail: bool) {
        self.fail_register.store(fail, Ordering::Relaxed);
    }

    /// 之后创建名为 `name` 的属性文件返回 [`DeviceError::NoMemory`]
    pub fn fail_create(&self, name: &str) {
        self.fail_create.lock().insert(name.to_string());
    }

    /// 被包装的 hwmon 类
    pub fn class(&self) -> &HwmonClass {
        &self.class
    }

    /// 读取属性文件
    pub fn read(&self, dev: HwmonDevice, name: &str) -> Result<String, DeviceError> {
        self.class.read(dev, name)
    }

    /// 事件日志
    pub fn events(&self) -> Vec<HwmonEvent> {
        self.events.lock().clone()
    }

    /// 清空事件日志
    pub fn clear_events(&self) {
        self.events.lock().clear();
    }

    fn record(&self, event: HwmonEvent) {
        self.events.lock().push(event);
    }
}

impl HwmonOps for MockHwmon {
    fn register(&self, parent: &str) -> Result<HwmonDevice, DeviceError> {
        if self.fail_register.load(Ordering::Relaxed) {
            return Err(DeviceError::NoMemory);
        }
        let dev = self.class.register(parent)?;
        self.record(HwmonEvent::Register(dev, parent.to_string()));
        Ok(dev)
    }

    fn unregister(&self, dev: HwmonDevice) {
        self.class.unregister(dev);
        self.record(HwmonEvent::Unregister(dev));
    }

    fn create_file(&self, dev: HwmonDevice, attr: SysfsAttr) -> Result<(), DeviceError> {
        if self.fail_create.lock().contains(&attr.name) {
            return Err(DeviceError::NoMemory);
        }
        let name = attr.name.clone();
        self.class.create_file(dev, attr)?;
        self.record(HwmonEvent::CreateFile(dev, name));
        Ok(())
    }

    fn remove_file(&self, dev: HwmonDevice, name: &str) {
        self.class.remove_file(dev, name);
        self.record(HwmonEvent::RemoveFile(dev, name.to_string()));
    }
}

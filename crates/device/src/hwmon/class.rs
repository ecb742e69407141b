//! 内存中的 hwmon 类

use alloc::{
    collections::btree_map::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};
use core::sync::atomic::{AtomicU32, Ordering};

use sync::RwLock;

use super::{HwmonDevice, HwmonOps};
use crate::error::DeviceError;
use crate::sysfs::SysfsAttr;

/// 一个已注册的 hwmon 设备
struct HwmonEntry {
    /// 父设备名
    parent: String,
    /// 属性文件，按名称排序
    attrs: BTreeMap<String, SysfsAttr>,
}

/// hwmon 类：`/sys/class/hwmon/hwmonN/<attr>` 的内存实现
///
/// 读取属性时只在查找阶段持有读锁，`show` 回调在锁外执行，
/// 因此多个读者可以并发读取，回调本身也可以较慢。
pub struct HwmonClass {
    next_index: AtomicU32,
    devices: RwLock<BTreeMap<HwmonDevice, HwmonEntry>>,
}

impl HwmonClass {
    /// 创建空的 hwmon 类
    pub fn new() -> Self {
        Self {
            next_index: AtomicU32::new(0),
            devices: RwLock::new(BTreeMap::new()),
        }
    }

    /// 读取属性文件内容
    ///
    /// 设备不存在返回 [`DeviceError::NoDevice`]，文件不存在返回 [`DeviceError::NotFound`]。
    pub fn read(&self, dev: HwmonDevice, name: &str) -> Result<String, DeviceError> {
        let attr = {
            let devices = self.devices.read();
            let entry = devices.get(&dev).ok_or(DeviceError::NoDevice)?;
            entry.attrs.get(name).cloned().ok_or(DeviceError::NotFound)?
        };
        attr.show()
    }

    /// 列出设备下的属性文件名
    pub fn attr_names(&self, dev: HwmonDevice) -> Vec<String> {
        self.devices
            .read()
            .get(&dev)
            .map(|entry| entry.attrs.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// 查找属性文件的权限位
    pub fn attr_mode(&self, dev: HwmonDevice, name: &str) -> Option<u16> {
        self.devices
            .read()
            .get(&dev)
            .and_then(|entry| entry.attrs.get(name))
            .map(|attr| attr.mode.bits())
    }

    /// 所有已注册的设备
    pub fn devices(&self) -> Vec<HwmonDevice> {
        self.devices.read().keys().copied().collect()
    }

    /// 设备是否已注册
    pub fn is_registered(&self, dev: HwmonDevice) -> bool {
        self.devices.read().contains_key(&dev)
    }

    /// 查找父设备名为 `parent` 的 hwmon 设备
    pub fn find_by_parent(&self, parent: &str) -> Option<HwmonDevice> {
        self.devices
            .read()
            .iter()
            .find(|(_, entry)| entry.parent == parent)
            .map(|(dev, _)| *dev)
    }
}

impl Default for HwmonClass {
    fn default() -> Self {
        Self::new()
    }
}

impl HwmonOps for HwmonClass {
    fn register(&self, parent: &str) -> Result<HwmonDevice, DeviceError> {
        let dev = HwmonDevice::new(self.next_index.fetch_add(1, Ordering::Relaxed));
        self.devices.write().insert(
            dev,
            HwmonEntry {
                parent: parent.to_string(),
                attrs: BTreeMap::new(),
            },
        );
        log::debug!("{}: registered {}", parent, dev);
        Ok(dev)
    }

    fn unregister(&self, dev: HwmonDevice) {
        if let Some(entry) = self.devices.write().remove(&dev) {
            if !entry.attrs.is_empty() {
                log::warn!(
                    "{}: {} unregistered with {} attribute(s) still present",
                    entry.parent,
                    dev,
                    entry.attrs.len()
                );
            }
        }
    }

    fn create_file(&self, dev: HwmonDevice, attr: SysfsAttr) -> Result<(), DeviceError> {
        if attr.is_writable() {
            return Err(DeviceError::NotSupported);
        }
        let mut devices = self.devices.write();
        let entry = devices.get_mut(&dev).ok_or(DeviceError::NoDevice)?;
        if entry.attrs.contains_key(&attr.name) {
            return Err(DeviceError::AlreadyExists);
        }
        entry.attrs.insert(attr.name.clone(), attr);
        Ok(())
    }

    fn remove_file(&self, dev: HwmonDevice, name: &str) {
        if let Some(entry) = self.devices.write().get_mut(&dev) {
            entry.attrs.remove(name);
        }
    }
}

//! 驱动生命周期
//!
//! 探测按固定顺序推进：
//! `Unbound → Bound（GPIO 已申请）→ Registered（hwmon 已注册）→ Published（属性已创建）`，
//! 全部属性发布后实例才写入实例表。
//! 每前进一步都把它的逆操作压入撤销栈；探测失败时栈在返回前被 drop，
//! 逆序撤销已完成的步骤。探测成功后栈随实例保存，`remove` 时完整展开，
//! 因此 remove 与失败回滚走的是同一条路径。
//!
//! 实例状态记录在驱动自己的实例表中，以平台设备的 [`DeviceId`] 为键。

use alloc::{collections::btree_map::BTreeMap, sync::Arc, vec::Vec};

use device::{
    DeviceError, DeviceId, GpioOps, HwmonDevice, HwmonOps, PlatformDevice, PlatformDriver,
    dev_err, dev_info, dev_warn,
};
use sync::SpinLock;

use crate::attr::CAN_HWMON_ATTRS;
use crate::binding::{self, BindingTable, CanHwmonPlatformData};
use crate::error::CanHwmonError;

/// 驱动名，同时用于平台设备名匹配
pub const DRIVER_NAME: &str = "can-hwmon";

/// OF 匹配表
pub static OF_MATCH_TABLE: [&str; 1] = ["can-hwmon"];

/// 撤销栈所处阶段，只用于回滚日志
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Stage {
    /// 没有实例
    Unbound,
    /// GPIO 已申请
    Bound,
    /// hwmon 设备已注册
    Registered,
    /// 至少一个属性已发布
    Published,
}

/// 一个已完成步骤的逆操作
enum Undo {
    /// 释放绑定表，表中的 GPIO 随之释放
    Release(Arc<BindingTable>),
    /// 注销 hwmon 设备
    Unregister(HwmonDevice),
    /// 删除属性文件
    Unpublish(HwmonDevice, &'static str),
}

/// 撤销栈，Drop 时逆序执行所有未撤销的步骤
struct UndoStack {
    hwmon: Arc<dyn HwmonOps>,
    steps: Vec<Undo>,
}

impl UndoStack {
    fn new(hwmon: Arc<dyn HwmonOps>) -> Self {
        Self {
            hwmon,
            steps: Vec::new(),
        }
    }

    fn push(&mut self, step: Undo) {
        self.steps.push(step);
    }

    fn stage(&self) -> Stage {
        match self.steps.last() {
            None => Stage::Unbound,
            Some(Undo::Release(_)) => Stage::Bound,
            Some(Undo::Unregister(_)) => Stage::Registered,
            Some(Undo::Unpublish(..)) => Stage::Published,
        }
    }

    fn unwind(&mut self) {
        if !self.steps.is_empty() {
            log::debug!("[can-hwmon] unwinding from {:?}", self.stage());
        }
        while let Some(step) = self.steps.pop() {
            match step {
                Undo::Unpublish(dev, name) => self.hwmon.remove_file(dev, name),
                Undo::Unregister(dev) => self.hwmon.unregister(dev),
                Undo::Release(table) => drop(table),
            }
        }
    }
}

impl Drop for UndoStack {
    fn drop(&mut self) {
        self.unwind();
    }
}

/// 一个已探测的设备
struct Instance {
    hwmon_dev: HwmonDevice,
    undo: UndoStack,
}

/// CAN 终端电阻状态驱动
pub struct CanHwmonDriver {
    gpio: Arc<dyn GpioOps>,
    hwmon: Arc<dyn HwmonOps>,
    instances: SpinLock<BTreeMap<DeviceId, Instance>>,
}

impl CanHwmonDriver {
    /// 使用给定的 GPIO 与 hwmon 子系统创建驱动
    pub fn new(gpio: Arc<dyn GpioOps>, hwmon: Arc<dyn HwmonOps>) -> Self {
        Self {
            gpio,
            hwmon,
            instances: SpinLock::new(BTreeMap::new()),
        }
    }

    /// 探测设备
    pub fn probe_device(&self, dev: &PlatformDevice<'_>) -> Result<(), CanHwmonError> {
        if self.instances.lock().contains_key(&dev.id()) {
            dev_err!(dev, "already bound to can-hwmon");
            return Err(CanHwmonError::AlreadyBound);
        }

        let pdata = dev.platform_data::<CanHwmonPlatformData>();
        let mut table = match (dev.of_node(), pdata) {
            (Some(node), _) => binding::resolve(node, &self.gpio)?,
            (None, Some(pdata)) => binding::resolve_platform_data(dev.name(), pdata, &self.gpio)?,
            (None, None) => {
                dev_err!(dev, "No platform init data supplied.");
                return Err(CanHwmonError::NoConfiguration);
            }
        };
        let name = pdata
            .and_then(|pdata| pdata.name.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(dev.name());
        table.set_name(name);

        let table = Arc::new(table);
        let attr_table = Arc::downgrade(&table);
        let mut undo = UndoStack::new(Arc::clone(&self.hwmon));
        undo.push(Undo::Release(table));

        let hwmon_dev = self.hwmon.register(dev.name()).map_err(|err| {
            dev_err!(dev, "failed to register can-hwmon driver");
            CanHwmonError::RegistrationFailed(err)
        })?;
        undo.push(Undo::Unregister(hwmon_dev));

        for desc in CAN_HWMON_ATTRS.iter() {
            self.hwmon
                .create_file(hwmon_dev, desc.to_sysfs_attr(attr_table.clone()))
                .map_err(|err| {
                    dev_err!(dev, "unable to create {} sysfs file", desc.name);
                    CanHwmonError::AttributeCreationFailed {
                        name: desc.name,
                        source: err,
                    }
                })?;
            undo.push(Undo::Unpublish(hwmon_dev, desc.name));
        }

        self.instances
            .lock()
            .insert(dev.id(), Instance { hwmon_dev, undo });
        dev_info!(dev, "can-hwmon successfully probed.");
        Ok(())
    }

    /// 移除设备：删除全部属性文件，注销 hwmon 设备，释放 GPIO
    ///
    /// 总是成功；设备没有实例时只记录警告。
    pub fn remove_device(&self, dev: &PlatformDevice<'_>) {
        let Some(mut instance) = self.instances.lock().remove(&dev.id()) else {
            dev_warn!(dev, "remove called without a can-hwmon instance");
            return;
        };
        instance.undo.unwind();
        dev_info!(dev, "{} removed", instance.hwmon_dev);
    }

    /// 设备对应的 hwmon 设备
    pub fn hwmon_device(&self, id: DeviceId) -> Option<HwmonDevice> {
        self.instances.lock().get(&id).map(|instance| instance.hwmon_dev)
    }

    /// 设备是否已探测成功且尚未移除
    pub fn is_bound(&self, id: DeviceId) -> bool {
        self.instances.lock().contains_key(&id)
    }

    /// 当前实例个数
    pub fn instance_count(&self) -> usize {
        self.instances.lock().len()
    }
}

impl PlatformDriver for CanHwmonDriver {
    fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    fn of_match_table(&self) -> &'static [&'static str] {
        &OF_MATCH_TABLE
    }

    fn probe(&self, dev: &PlatformDevice<'_>) -> Result<(), DeviceError> {
        self.probe_device(dev).map_err(DeviceError::from)
    }

    fn remove(&self, dev: &PlatformDevice<'_>) -> Result<(), DeviceError> {
        self.remove_device(dev);
        Ok(())
    }
}

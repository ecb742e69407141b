//! 平台设备与平台驱动
//!
//! 平台总线按以下顺序为设备匹配驱动：
//! 1) 设备带有描述节点时，按驱动的 OF 匹配表比较 `compatible`；
//! 2) 否则（或 OF 未匹配）按设备名与驱动名比较，设备名中 `.` 之后的实例号被忽略。
//!
//! 匹配成功后调用驱动的 `probe`；成功探测的设备记录在绑定表中，`remove_device` 时调用驱动的 `remove`。
//! 探测失败不会自动重试。

use alloc::{
    collections::btree_map::BTreeMap,
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};
use core::any::Any;
use core::sync::atomic::{AtomicUsize, Ordering};

use lazy_static::lazy_static;
use sync::{RwLock, SpinLock};

use crate::error::DeviceError;
use crate::of::DeviceNode;

/// 平台设备的唯一标识，每个 [`PlatformDevice`] 创建时分配
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(usize);

static NEXT_DEVICE_ID: AtomicUsize = AtomicUsize::new(0);

/// 平台设备
///
/// 携带可选的设备描述节点和可选的静态平台数据，二者都由总线枚举方提供。
pub struct PlatformDevice<'a> {
    id: DeviceId,
    name: String,
    of_node: Option<&'a dyn DeviceNode>,
    platform_data: Option<&'a (dyn Any + Send + Sync)>,
}

impl<'a> PlatformDevice<'a> {
    /// 创建名为 `name` 的平台设备
    pub fn new(name: &str) -> Self {
        Self {
            id: DeviceId(NEXT_DEVICE_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.to_string(),
            of_node: None,
            platform_data: None,
        }
    }

    /// 附加设备描述节点
    pub fn with_of_node(mut self, node: &'a dyn DeviceNode) -> Self {
        self.of_node = Some(node);
        self
    }

    /// 附加静态平台数据
    pub fn with_platform_data(mut self, data: &'a (dyn Any + Send + Sync)) -> Self {
        self.platform_data = Some(data);
        self
    }

    /// 设备标识
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// 设备名（dev_name）
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 设备描述节点
    pub fn of_node(&self) -> Option<&'a dyn DeviceNode> {
        self.of_node
    }

    /// 以类型 `T` 取得静态平台数据，类型不符时返回 None
    pub fn platform_data<T: Any>(&self) -> Option<&'a T> {
        self.platform_data.and_then(|data| data.downcast_ref::<T>())
    }
}

/// 平台驱动
pub trait PlatformDriver: Send + Sync {
    /// 驱动名，用于按设备名匹配
    fn name(&self) -> &'static str;

    /// OF 匹配表（`compatible` 字符串列表）
    fn of_match_table(&self) -> &'static [&'static str] {
        &[]
    }

    /// 绑定设备
    fn probe(&self, dev: &PlatformDevice<'_>) -> Result<(), DeviceError>;

    /// 解绑设备
    fn remove(&self, dev: &PlatformDevice<'_>) -> Result<(), DeviceError>;
}

fn driver_matches(driver: &Arc<dyn PlatformDriver>, dev: &PlatformDevice<'_>) -> bool {
    let of_match = dev.of_node().is_some_and(|node| {
        driver
            .of_match_table()
            .iter()
            .any(|compat| node.is_compatible(compat))
    });
    of_match || dev.name().split('.').next() == Some(driver.name())
}

/// 平台总线
pub struct PlatformBus {
    drivers: RwLock<Vec<Arc<dyn PlatformDriver>>>,
    bindings: SpinLock<BTreeMap<DeviceId, Arc<dyn PlatformDriver>>>,
}

impl PlatformBus {
    /// 创建空总线
    pub fn new() -> Self {
        Self {
            drivers: RwLock::new(Vec::new()),
            bindings: SpinLock::new(BTreeMap::new()),
        }
    }

    /// 注册驱动，同名驱动已存在时返回 [`DeviceError::AlreadyExists`]
    pub fn register_driver(&self, driver: Arc<dyn PlatformDriver>) -> Result<(), DeviceError> {
        let mut drivers = self.drivers.write();
        if drivers.iter().any(|d| d.name() == driver.name()) {
            return Err(DeviceError::AlreadyExists);
        }
        log::info!("[Device] registered platform driver {}", driver.name());
        drivers.push(driver);
        Ok(())
    }

    /// 添加设备并尝试绑定驱动
    ///
    /// 返回绑定的驱动名；没有匹配的驱动时返回 `Ok(None)`，设备保持未绑定。
    pub fn add_device(&self, dev: &PlatformDevice<'_>) -> Result<Option<&'static str>, DeviceError> {
        if self.bindings.lock().contains_key(&dev.id()) {
            return Err(DeviceError::Busy);
        }
        let driver = self
            .drivers
            .read()
            .iter()
            .find(|driver| driver_matches(driver, dev))
            .cloned();
        let Some(driver) = driver else {
            log::debug!("[Device] no driver for {}", dev.name());
            return Ok(None);
        };
        if let Err(err) = driver.probe(dev) {
            log::error!(
                "[Device] {}: probe with driver {} failed: {}",
                dev.name(),
                driver.name(),
                err
            );
            return Err(err);
        }
        let name = driver.name();
        self.bindings.lock().insert(dev.id(), driver);
        Ok(Some(name))
    }

    /// 解绑并移除设备，设备未绑定时返回 [`DeviceError::NoDevice`]
    pub fn remove_device(&self, dev: &PlatformDevice<'_>) -> Result<(), DeviceError> {
        let driver = self
            .bindings
            .lock()
            .remove(&dev.id())
            .ok_or(DeviceError::NoDevice)?;
        driver.remove(dev)
    }

    /// 设备当前绑定的驱动名
    pub fn bound_driver(&self, id: DeviceId) -> Option<&'static str> {
        self.bindings.lock().get(&id).map(|driver| driver.name())
    }
}

impl Default for PlatformBus {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    // NOTE: 驱动表只在初始化阶段有写操作，运行时均为读操作
    /// 全局平台总线
    pub static ref PLATFORM_BUS: PlatformBus = PlatformBus::new();
}

/// 向全局平台总线注册驱动
pub fn register_driver(driver: Arc<dyn PlatformDriver>) -> Result<(), DeviceError> {
    PLATFORM_BUS.register_driver(driver)
}

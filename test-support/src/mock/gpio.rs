//! GPIO 子系统的 Mock 实现
//!
//! 记录每根线的申请者、方向、电平与采样次数，并支持故障注入。
//! 所有成功的 `request` / `direction_input` / `free` 调用按顺序记入事件日志。

use alloc::{
    collections::{btree_map::BTreeMap, btree_set::BTreeSet},
    string::{String, ToString},
    vec::Vec,
};

use device::{DeviceError, GpioNum, GpioOps, PhandleArgs};
use sync::SpinLock;

/// GPIO 事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GpioEvent {
    /// 申请成功（编号、标签）
    Request(GpioNum, String),
    /// 配置为输入
    DirectionInput(GpioNum),
    /// 释放
    Free(GpioNum),
}

#[derive(Default)]
struct Line {
    label: Option<String>,
    input: bool,
    value: bool,
    samples: usize,
}

#[derive(Default)]
struct State {
    chips: BTreeMap<u32, GpioNum>,
    lines: BTreeMap<GpioNum, Line>,
    fail_request: BTreeSet<GpioNum>,
    fail_direction: BTreeSet<GpioNum>,
    events: Vec<GpioEvent>,
}

/// Mock 的 GPIO 子系统
#[derive(Default)]
pub struct MockGpio {
    state: SpinLock<State>,
}

impl MockGpio {
    /// 创建没有任何控制器的 GPIO 子系统
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册 phandle 为 `phandle` 的控制器，其第 n 根线的全局编号为 `base + n`
    pub fn add_chip(&self, phandle: u32, base: GpioNum) {
        self.state.lock().chips.insert(phandle, base);
    }

    /// 设置线的电平
    pub fn set_value(&self, gpio: GpioNum, value: bool) {
        self.state.lock().lines.entry(gpio).or_default().value = value;
    }

    /// 以 `label` 的名义占用一根线，不记入事件日志
    pub fn claim(&self, gpio: GpioNum, label: &str) {
        self.state.lock().lines.entry(gpio).or_default().label = Some(label.to_string());
    }

    /// 之后对 `gpio` 的申请返回 [`DeviceError::IoError`]
    pub fn fail_request(&self, gpio: GpioNum) {
        self.state.lock().fail_request.insert(gpio);
    }

    /// 之后对 `gpio` 的方向配置返回 [`DeviceError::IoError`]
    pub fn fail_direction(&self, gpio: GpioNum) {
        self.state.lock().fail_direction.insert(gpio);
    }

    /// 线是否已被申请
    pub fn is_requested(&self, gpio: GpioNum) -> bool {
        self.label(gpio).is_some()
    }

    /// 线是否已被申请且配置为输入
    pub fn is_input(&self, gpio: GpioNum) -> bool {
        self.state
            .lock()
            .lines
            .get(&gpio)
            .is_some_and(|line| line.label.is_some() && line.input)
    }

    /// 当前申请者的标签
    pub fn label(&self, gpio: GpioNum) -> Option<String> {
        self.state
            .lock()
            .lines
            .get(&gpio)
            .and_then(|line| line.label.clone())
    }

    /// 线被采样的次数
    pub fn sample_count(&self, gpio: GpioNum) -> usize {
        self.state
            .lock()
            .lines
            .get(&gpio)
            .map_or(0, |line| line.samples)
    }

    /// 事件日志
    pub fn events(&self) -> Vec<GpioEvent> {
        self.state.lock().events.clone()
    }
}

impl GpioOps for MockGpio {
    fn xlate(&self, spec: &PhandleArgs) -> Result<GpioNum, DeviceError> {
        let state = self.state.lock();
        let base = state
            .chips
            .get(&spec.phandle)
            .ok_or(DeviceError::NotFound)?;
        let offset = spec.args.first().ok_or(DeviceError::InvalidArgument)?;
        Ok(base + offset)
    }

    fn request(&self, gpio: GpioNum, label: &str) -> Result<(), DeviceError> {
        let mut state = self.state.lock();
        if state.fail_request.contains(&gpio) {
            return Err(DeviceError::IoError);
        }
        let line = state.lines.entry(gpio).or_default();
        if line.label.is_some() {
            return Err(DeviceError::Busy);
        }
        line.label = Some(label.to_string());
        line.input = false;
        state.events.push(GpioEvent::Request(gpio, label.to_string()));
        Ok(())
    }

    fn free(&self, gpio: GpioNum) {
        let mut state = self.state.lock();
        if let Some(line) = state.lines.get_mut(&gpio) {
            line.label = None;
            line.input = false;
        }
        state.events.push(GpioEvent::Free(gpio));
    }

    fn direction_input(&self, gpio: GpioNum) -> Result<(), DeviceError> {
        let mut state = self.state.lock();
        if state.fail_direction.contains(&gpio) {
            return Err(DeviceError::IoError);
        }
        state.lines.entry(gpio).or_default().input = true;
        state.events.push(GpioEvent::DirectionInput(gpio));
        Ok(())
    }

    fn get_value(&self, gpio: GpioNum) -> bool {
        let mut state = self.state.lock();
        let line = state.lines.entry(gpio).or_default();
        line.samples += 1;
        line.value
    }
}

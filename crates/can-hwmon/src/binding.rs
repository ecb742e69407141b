//! 通道绑定解析
//!
//! 从设备描述（或静态平台数据）得到每个通道对应的 GPIO，逐个申请并配置为输入，
//! 产出 [`BindingTable`]。绑定是全有或全无的：任何一步失败，
//! 本次调用中已申请的 GPIO 都会按申请顺序释放，然后返回错误。
//!
//! 设备描述示例：
//!
//! ```text
//! can-hwmon {
//!     compatible = "can-hwmon";
//!     gpios = <&gpio0 5 0>, <&gpio0 6 0>;
//!     gpio-names = "can0", "can1";
//! };
//! ```

use alloc::{
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};

use device::gpio::{of_get_named_gpio, of_gpio_named_count};
use device::{DeviceNode, GpioLine, GpioNum, GpioOps, dev_dbg, dev_err};

use crate::channel::{CHANNEL_COUNT, Channel};
use crate::error::CanHwmonError;

/// GPIO 引用列表属性
pub const GPIOS_PROP: &str = "gpios";

/// GPIO 名称列表属性，与 [`GPIOS_PROP`] 一一对应
pub const GPIO_NAMES_PROP: &str = "gpio-names";

/// 实例名缓冲区大小（含结尾 NUL），实例名最多保留 `PLATFORM_NAME_SIZE - 1` 字节
pub const PLATFORM_NAME_SIZE: usize = 20;

/// 静态平台数据，用于没有设备描述的平台
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanHwmonPlatformData {
    /// 每个通道的 GPIO，下标为 [`Channel::index`]
    pub gpios: [GpioNum; CHANNEL_COUNT],
    /// 显式实例名，None 时使用设备名
    pub name: Option<String>,
}

/// 一个驱动实例的通道绑定表
///
/// 每个通道都持有一根已申请、已配置为输入的 GPIO；表被 drop 时这些 GPIO 按通道顺序释放。
/// 构造完成后只读。
#[derive(Debug)]
pub struct BindingTable {
    /// 下标为 [`Channel::index`]，长度恒为 [`CHANNEL_COUNT`]
    lines: Vec<GpioLine>,
    name: String,
}

impl BindingTable {
    /// 通道对应的 GPIO 线
    pub fn line(&self, ch: Channel) -> &GpioLine {
        &self.lines[ch.index()]
    }

    /// 通道对应的全局 GPIO 编号
    pub fn gpio(&self, ch: Channel) -> GpioNum {
        self.line(ch).gpio()
    }

    /// 采样通道当前电平
    pub fn is_active(&self, ch: Channel) -> bool {
        self.line(ch).is_active()
    }

    /// 实例名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 设置实例名，超出 `PLATFORM_NAME_SIZE - 1` 字节的部分被截断
    pub fn set_name(&mut self, name: &str) {
        self.name = truncate_name(name);
    }
}

fn truncate_name(name: &str) -> String {
    let max = PLATFORM_NAME_SIZE - 1;
    if name.len() <= max {
        return name.to_string();
    }
    let mut end = max;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

/// 从设备描述解析并申请所有通道的 GPIO
pub fn resolve(
    node: &dyn DeviceNode,
    gpio: &Arc<dyn GpioOps>,
) -> Result<BindingTable, CanHwmonError> {
    let count = match of_gpio_named_count(node, GPIOS_PROP) {
        Ok(count) if count >= 1 => count,
        _ => {
            dev_err!(node, "you need to define at least one gpio...");
            return Err(CanHwmonError::NoResourcesDescribed);
        }
    };

    let names = node.property_count_strings(GPIO_NAMES_PROP).unwrap_or(0);
    if names != count {
        dev_err!(node, "you need one name in gpio-names per triple in gpios...");
        return Err(CanHwmonError::NameCountMismatch {
            gpios: count,
            names,
        });
    }
    dev_dbg!(node, "{} termination gpio(s) described", count);

    acquire(node.name(), gpio, |ch| {
        let index = node
            .property_match_string(GPIO_NAMES_PROP, ch.name())
            .map_err(|_| {
                dev_err!(node, "couldn't find a matching name for {}", ch);
                CanHwmonError::MissingChannelBinding(ch)
            })?;
        of_get_named_gpio(node, GPIOS_PROP, index, gpio.as_ref()).map_err(|source| {
            dev_err!(node, "couldn't translate {} gpio: {}", ch, source);
            CanHwmonError::AcquisitionFailed {
                channel: ch,
                gpio: None,
                source,
            }
        })
    })
}

/// 按静态平台数据申请所有通道的 GPIO
pub fn resolve_platform_data(
    dev_name: &str,
    pdata: &CanHwmonPlatformData,
    gpio: &Arc<dyn GpioOps>,
) -> Result<BindingTable, CanHwmonError> {
    acquire(dev_name, gpio, |ch| Ok(pdata.gpios[ch.index()]))
}

/// 按通道顺序查找、申请并配置 GPIO
///
/// 出错返回时 `lines` 被 drop，已申请的线按申请顺序释放。
fn acquire<F>(
    dev_name: &str,
    ops: &Arc<dyn GpioOps>,
    mut lookup: F,
) -> Result<BindingTable, CanHwmonError>
where
    F: FnMut(Channel) -> Result<GpioNum, CanHwmonError>,
{
    let mut lines = Vec::with_capacity(CHANNEL_COUNT);
    for ch in Channel::ALL {
        let num = lookup(ch)?;
        let line = GpioLine::request_input(ops, num, ch.name()).map_err(|source| {
            dev_err!(name = dev_name, "unable to claim gpio {} for {}: {}", num, ch, source);
            CanHwmonError::AcquisitionFailed {
                channel: ch,
                gpio: Some(num),
                source,
            }
        })?;
        dev_dbg!(name = dev_name, "found {} termination monitor pin", ch);
        lines.push(line);
    }
    Ok(BindingTable {
        lines,
        name: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use device::DeviceError;
    use test_support::mock::gpio::{GpioEvent, MockGpio};
    use test_support::mock::of::StaticNode;

    const CTRL: u32 = 1;

    fn setup() -> (Arc<MockGpio>, Arc<dyn GpioOps>) {
        let mock = Arc::new(MockGpio::new());
        mock.add_chip(CTRL, 0);
        let ops: Arc<dyn GpioOps> = mock.clone();
        (mock, ops)
    }

    #[test]
    fn test_resolve_binds_both_channels() {
        let (mock, ops) = setup();
        let node = StaticNode::can_hwmon(CTRL, &[(5, "can0"), (6, "can1")]);
        let table = resolve(&node, &ops).unwrap();
        assert_eq!(table.gpio(Channel::Can0), 5);
        assert_eq!(table.gpio(Channel::Can1), 6);
        assert!(mock.is_input(5) && mock.is_input(6));
        assert_eq!(mock.label(5).as_deref(), Some("can0"));
        assert_eq!(mock.label(6).as_deref(), Some("can1"));
    }

    #[test]
    fn test_resolve_reversed_names() {
        let (_mock, ops) = setup();
        // gpios = [A, B], gpio-names = ["can1", "can0"]
        let node = StaticNode::can_hwmon(CTRL, &[(10, "can1"), (11, "can0")]);
        let table = resolve(&node, &ops).unwrap();
        assert_eq!(table.gpio(Channel::Can0), 11);
        assert_eq!(table.gpio(Channel::Can1), 10);
    }

    #[test]
    fn test_no_gpios_described() {
        let (mock, ops) = setup();
        let node = StaticNode::new("can-hwmon").compatible("can-hwmon");
        assert_eq!(
            resolve(&node, &ops).unwrap_err(),
            CanHwmonError::NoResourcesDescribed
        );
        assert!(mock.events().is_empty());
    }

    #[test]
    fn test_name_count_mismatch_acquires_nothing() {
        let (mock, ops) = setup();
        let node = StaticNode::new("can-hwmon")
            .gpios(CTRL, &[5, 6])
            .strings(GPIO_NAMES_PROP, &["can0"]);
        assert_eq!(
            resolve(&node, &ops).unwrap_err(),
            CanHwmonError::NameCountMismatch { gpios: 2, names: 1 }
        );
        assert!(mock.events().is_empty());
    }

    #[test]
    fn test_missing_names_property() {
        let (mock, ops) = setup();
        let node = StaticNode::new("can-hwmon").gpios(CTRL, &[5, 6]);
        assert_eq!(
            resolve(&node, &ops).unwrap_err(),
            CanHwmonError::NameCountMismatch { gpios: 2, names: 0 }
        );
        assert!(mock.events().is_empty());
    }

    #[test]
    fn test_missing_channel_releases_acquired() {
        let (mock, ops) = setup();
        // gpios = [A], gpio-names = ["can0"]
        let node = StaticNode::can_hwmon(CTRL, &[(5, "can0")]);
        assert_eq!(
            resolve(&node, &ops).unwrap_err(),
            CanHwmonError::MissingChannelBinding(Channel::Can1)
        );
        assert!(!mock.is_requested(5));
        assert_eq!(
            mock.events(),
            [
                GpioEvent::Request(5, "can0".to_string()),
                GpioEvent::DirectionInput(5),
                GpioEvent::Free(5),
            ]
        );
    }

    #[test]
    fn test_missing_first_channel_acquires_nothing() {
        let (mock, ops) = setup();
        let node = StaticNode::can_hwmon(CTRL, &[(5, "can1"), (6, "can2")]);
        assert_eq!(
            resolve(&node, &ops).unwrap_err(),
            CanHwmonError::MissingChannelBinding(Channel::Can0)
        );
        assert!(mock.events().is_empty());
    }

    #[test]
    fn test_prefix_names_do_not_match() {
        let (_mock, ops) = setup();
        let node = StaticNode::can_hwmon(CTRL, &[(5, "can0"), (6, "can10")]);
        assert_eq!(
            resolve(&node, &ops).unwrap_err(),
            CanHwmonError::MissingChannelBinding(Channel::Can1)
        );
    }

    #[test]
    fn test_request_conflict_rolls_back() {
        let (mock, ops) = setup();
        mock.claim(6, "other");
        let node = StaticNode::can_hwmon(CTRL, &[(5, "can0"), (6, "can1")]);
        assert_eq!(
            resolve(&node, &ops).unwrap_err(),
            CanHwmonError::AcquisitionFailed {
                channel: Channel::Can1,
                gpio: Some(6),
                source: DeviceError::Busy,
            }
        );
        assert!(!mock.is_requested(5));
        assert_eq!(mock.label(6).as_deref(), Some("other"));
    }

    #[test]
    fn test_request_io_error_rolls_back() {
        let (mock, ops) = setup();
        mock.fail_request(6);
        let node = StaticNode::can_hwmon(CTRL, &[(5, "can0"), (6, "can1")]);
        assert_eq!(
            resolve(&node, &ops).unwrap_err(),
            CanHwmonError::AcquisitionFailed {
                channel: Channel::Can1,
                gpio: Some(6),
                source: DeviceError::IoError,
            }
        );
        assert!(!mock.is_requested(5));
        assert!(!mock.is_requested(6));
        assert!(!mock.events().contains(&GpioEvent::Request(6, "can1".to_string())));
    }

    #[test]
    fn test_direction_failure_rolls_back() {
        let (mock, ops) = setup();
        mock.fail_direction(6);
        let node = StaticNode::can_hwmon(CTRL, &[(5, "can0"), (6, "can1")]);
        let err = resolve(&node, &ops).unwrap_err();
        assert!(matches!(
            err,
            CanHwmonError::AcquisitionFailed {
                channel: Channel::Can1,
                ..
            }
        ));
        assert!(!mock.is_requested(5));
        assert!(!mock.is_requested(6));
        assert_eq!(mock.events().last(), Some(&GpioEvent::Free(5)));
    }

    #[test]
    fn test_unknown_controller_fails_translation() {
        let (mock, ops) = setup();
        let node = StaticNode::can_hwmon(7, &[(5, "can0"), (6, "can1")]);
        assert!(matches!(
            resolve(&node, &ops).unwrap_err(),
            CanHwmonError::AcquisitionFailed {
                channel: Channel::Can0,
                gpio: None,
                ..
            }
        ));
        assert!(mock.events().is_empty());
    }

    #[test]
    fn test_drop_releases_in_channel_order() {
        let (mock, ops) = setup();
        let node = StaticNode::can_hwmon(CTRL, &[(9, "can1"), (3, "can0")]);
        let table = resolve(&node, &ops).unwrap();
        drop(table);
        let frees: Vec<_> = mock
            .events()
            .into_iter()
            .filter(|e| matches!(e, GpioEvent::Free(_)))
            .collect();
        assert_eq!(frees, [GpioEvent::Free(3), GpioEvent::Free(9)]);
    }

    #[test]
    fn test_platform_data_path() {
        let (mock, ops) = setup();
        let pdata = CanHwmonPlatformData {
            gpios: [20, 21],
            name: None,
        };
        let table = resolve_platform_data("can-hwmon.0", &pdata, &ops).unwrap();
        assert_eq!(table.gpio(Channel::Can0), 20);
        assert_eq!(table.gpio(Channel::Can1), 21);
        assert!(mock.is_input(20) && mock.is_input(21));
    }

    #[test]
    fn test_set_name_truncates() {
        let (_mock, ops) = setup();
        let pdata = CanHwmonPlatformData {
            gpios: [1, 2],
            name: None,
        };
        let mut table = resolve_platform_data("p", &pdata, &ops).unwrap();
        table.set_name("a-very-long-platform-device-name");
        assert_eq!(table.name(), "a-very-long-platfor");
        assert_eq!(table.name().len(), PLATFORM_NAME_SIZE - 1);
        table.set_name("short");
        assert_eq!(table.name(), "short");
    }
}

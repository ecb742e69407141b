//! 属性读取
//!
//! 每次读取都直接采样 GPIO，不缓存。属性名到通道的映射见 [`Channel::from_attribute`]。

use alloc::{
    format,
    string::String,
    sync::{Arc, Weak},
};

use device::{DeviceError, FileMode, SysfsAttr};

use crate::binding::BindingTable;
use crate::channel::{Channel, UNDEF_CHANNEL};

/// 属性读取处理函数：绑定表 + 属性名 → 文件内容
pub type AttrHandler = fn(&BindingTable, &str) -> String;

/// 静态属性描述
#[derive(Debug, Clone, Copy)]
pub struct AttrDescriptor {
    /// 属性名
    pub name: &'static str,
    /// 权限
    pub mode: FileMode,
    /// 读取处理函数
    pub show: AttrHandler,
}

impl AttrDescriptor {
    /// 生成绑定到 `table` 的属性文件
    ///
    /// 属性文件只持有绑定表的弱引用；实例销毁后再读取返回 [`DeviceError::NoDevice`]。
    pub fn to_sysfs_attr(&self, table: Weak<BindingTable>) -> SysfsAttr {
        let name = self.name;
        let show = self.show;
        SysfsAttr {
            name: String::from(name),
            mode: self.mode,
            show: Arc::new(move || {
                let table = table.upgrade().ok_or(DeviceError::NoDevice)?;
                Ok(show(&table, name))
            }),
        }
    }
}

/// 发布顺序固定的属性表
pub static CAN_HWMON_ATTRS: [AttrDescriptor; 5] = [
    AttrDescriptor {
        name: "name",
        mode: FileMode::S_IRUGO,
        show: show_name,
    },
    AttrDescriptor {
        name: "can0_status",
        mode: FileMode::S_IRUGO,
        show: read_status,
    },
    AttrDescriptor {
        name: "can1_status",
        mode: FileMode::S_IRUGO,
        show: read_status,
    },
    AttrDescriptor {
        name: "can0_value",
        mode: FileMode::S_IRUGO,
        show: read_value,
    },
    AttrDescriptor {
        name: "can1_value",
        mode: FileMode::S_IRUGO,
        show: read_value,
    },
];

/// `canN_value`：`"1\n"` 表示终端电阻接入，`"0\n"` 表示未接入
pub fn read_value(table: &BindingTable, attr: &str) -> String {
    let state = Channel::from_attribute(attr).is_some_and(|ch| table.is_active(ch));
    format!("{}\n", u32::from(state))
}

/// `canN_status`：`"<通道> termination is: ON|OFF\n"`
pub fn read_status(table: &BindingTable, attr: &str) -> String {
    let (name, status) = match Channel::from_attribute(attr) {
        Some(ch) => (ch.name(), if table.is_active(ch) { "ON" } else { "OFF" }),
        None => (UNDEF_CHANNEL, ""),
    };
    format!("{} termination is: {}\n", name, status)
}

/// `name`：实例名
pub fn read_name(table: &BindingTable) -> String {
    format!("{}\n", table.name())
}

fn show_name(table: &BindingTable, _attr: &str) -> String {
    read_name(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{CanHwmonPlatformData, resolve_platform_data};
    use alloc::vec::Vec;
    use device::GpioOps;
    use test_support::mock::gpio::MockGpio;

    fn table(mock: &Arc<MockGpio>) -> BindingTable {
        let ops: Arc<dyn GpioOps> = mock.clone();
        let pdata = CanHwmonPlatformData {
            gpios: [4, 9],
            name: None,
        };
        let mut table = resolve_platform_data("can-hwmon.0", &pdata, &ops).unwrap();
        table.set_name("can-hwmon.0");
        table
    }

    #[test]
    fn test_read_value_follows_line() {
        let mock = Arc::new(MockGpio::new());
        let table = table(&mock);
        assert_eq!(read_value(&table, "can0_value"), "0\n");
        mock.set_value(4, true);
        assert_eq!(read_value(&table, "can0_value"), "1\n");
        assert_eq!(read_value(&table, "can1_value"), "0\n");
        mock.set_value(9, true);
        mock.set_value(4, false);
        assert_eq!(read_value(&table, "can0_value"), "0\n");
        assert_eq!(read_value(&table, "can1_value"), "1\n");
    }

    #[test]
    fn test_read_value_idempotent() {
        let mock = Arc::new(MockGpio::new());
        let table = table(&mock);
        mock.set_value(9, true);
        let first = read_value(&table, "can1_value");
        let second = read_value(&table, "can1_value");
        assert_eq!(first, second);
    }

    #[test]
    fn test_read_status_on_off() {
        let mock = Arc::new(MockGpio::new());
        let table = table(&mock);
        assert_eq!(read_status(&table, "can0_status"), "can0 termination is: OFF\n");
        mock.set_value(4, true);
        let on = read_status(&table, "can0_status");
        assert_eq!(on, "can0 termination is: ON\n");
        assert!(on.contains("ON") && !on.contains("OFF"));
        assert_eq!(read_status(&table, "can1_status"), "can1 termination is: OFF\n");
    }

    #[test]
    fn test_unmatched_attribute_uses_sentinel() {
        let mock = Arc::new(MockGpio::new());
        let table = table(&mock);
        mock.set_value(4, true);
        mock.set_value(9, true);
        assert_eq!(read_value(&table, "can10_value"), "0\n");
        assert_eq!(read_status(&table, "bogus"), "undef termination is: \n");
    }

    #[test]
    fn test_every_read_samples_hardware() {
        let mock = Arc::new(MockGpio::new());
        let table = table(&mock);
        let before = mock.sample_count(4);
        read_value(&table, "can0_value");
        read_status(&table, "can0_status");
        assert_eq!(mock.sample_count(4), before + 2);
    }

    #[test]
    fn test_read_name() {
        let mock = Arc::new(MockGpio::new());
        assert_eq!(read_name(&table(&mock)), "can-hwmon.0\n");
    }

    #[test]
    fn test_descriptor_order_and_mode() {
        let names: Vec<_> = CAN_HWMON_ATTRS.iter().map(|a| a.name).collect();
        assert_eq!(
            names,
            ["name", "can0_status", "can1_status", "can0_value", "can1_value"]
        );
        assert!(CAN_HWMON_ATTRS.iter().all(|a| a.mode.bits() == 0o444));
    }

    #[test]
    fn test_sysfs_attr_after_table_dropped() {
        let mock = Arc::new(MockGpio::new());
        let table = Arc::new(table(&mock));
        let attr = CAN_HWMON_ATTRS[1].to_sysfs_attr(Arc::downgrade(&table));
        assert_eq!(attr.show().unwrap(), "can0 termination is: OFF\n");
        drop(table);
        assert_eq!(attr.show(), Err(DeviceError::NoDevice));
        assert!(!mock.is_requested(4));
    }
}

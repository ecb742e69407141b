//! 驱动错误类型
//!
//! 所有错误都发生在探测阶段；属性发布之后的读取不会失败。
//! 上报给总线时通过 `From` 转换为 [`DeviceError`]，errno 见 [`CanHwmonError::to_errno()`]。

use core::fmt;

use device::{DeviceError, GpioNum};

use crate::channel::Channel;

/// 驱动错误类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanHwmonError {
    /// 既没有设备描述也没有静态平台数据 (-ENODEV)
    NoConfiguration,
    /// 设备描述中没有 GPIO 引用 (-EINVAL)
    NoResourcesDescribed,
    /// `gpio-names` 与 `gpios` 个数不一致 (-ENODATA)
    NameCountMismatch {
        /// GPIO 引用个数
        gpios: usize,
        /// 名称个数，查询失败时为 0
        names: usize,
    },
    /// 某个通道在 `gpio-names` 中没有对应项 (-EINVAL)
    MissingChannelBinding(Channel),
    /// GPIO 翻译、申请或配置失败
    AcquisitionFailed {
        /// 正在绑定的通道
        channel: Channel,
        /// 已翻译出的 GPIO 编号，翻译本身失败时为 None
        gpio: Option<GpioNum>,
        /// GPIO 子系统返回的错误
        source: DeviceError,
    },
    /// hwmon 设备注册失败
    RegistrationFailed(DeviceError),
    /// 属性文件创建失败
    AttributeCreationFailed {
        /// 失败的属性名
        name: &'static str,
        /// hwmon 子系统返回的错误
        source: DeviceError,
    },
    /// 设备已经绑定了一个实例 (-EBUSY)
    AlreadyBound,
}

impl CanHwmonError {
    /// 转换为错误码（负数）
    pub fn to_errno(&self) -> isize {
        DeviceError::from(*self).to_errno()
    }
}

impl From<CanHwmonError> for DeviceError {
    fn from(err: CanHwmonError) -> Self {
        match err {
            CanHwmonError::NoConfiguration => DeviceError::NoDevice,
            CanHwmonError::NoResourcesDescribed => DeviceError::InvalidArgument,
            CanHwmonError::NameCountMismatch { .. } => DeviceError::NoData,
            CanHwmonError::MissingChannelBinding(_) => DeviceError::InvalidArgument,
            CanHwmonError::AcquisitionFailed { source, .. } => source,
            CanHwmonError::RegistrationFailed(source) => source,
            CanHwmonError::AttributeCreationFailed { source, .. } => source,
            CanHwmonError::AlreadyBound => DeviceError::Busy,
        }
    }
}

impl fmt::Display for CanHwmonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanHwmonError::NoConfiguration => write!(f, "no platform init data supplied"),
            CanHwmonError::NoResourcesDescribed => {
                write!(f, "you need to define at least one gpio")
            }
            CanHwmonError::NameCountMismatch { gpios, names } => write!(
                f,
                "you need one name in gpio-names per entry in gpios ({} gpios, {} names)",
                gpios, names
            ),
            CanHwmonError::MissingChannelBinding(ch) => {
                write!(f, "couldn't find a matching name for {}", ch)
            }
            CanHwmonError::AcquisitionFailed {
                channel,
                gpio: Some(gpio),
                source,
            } => write!(f, "failed to acquire gpio {} for {}: {}", gpio, channel, source),
            CanHwmonError::AcquisitionFailed {
                channel,
                gpio: None,
                source,
            } => write!(f, "failed to resolve gpio for {}: {}", channel, source),
            CanHwmonError::RegistrationFailed(source) => {
                write!(f, "failed to register can-hwmon driver: {}", source)
            }
            CanHwmonError::AttributeCreationFailed { name, source } => {
                write!(f, "unable to create {} sysfs file: {}", name, source)
            }
            CanHwmonError::AlreadyBound => write!(f, "device already bound"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_errno_mapping() {
        assert_eq!(CanHwmonError::NoConfiguration.to_errno(), -19);
        assert_eq!(CanHwmonError::NoResourcesDescribed.to_errno(), -22);
        assert_eq!(
            CanHwmonError::NameCountMismatch { gpios: 2, names: 1 }.to_errno(),
            -61
        );
        assert_eq!(
            CanHwmonError::MissingChannelBinding(Channel::Can1).to_errno(),
            -22
        );
        assert_eq!(CanHwmonError::AlreadyBound.to_errno(), -16);
    }

    #[test]
    fn test_source_errno_is_propagated() {
        let err = CanHwmonError::AcquisitionFailed {
            channel: Channel::Can0,
            gpio: Some(5),
            source: DeviceError::Busy,
        };
        assert_eq!(err.to_errno(), -16);
        let err = CanHwmonError::AttributeCreationFailed {
            name: "can0_value",
            source: DeviceError::NoMemory,
        };
        assert_eq!(DeviceError::from(err), DeviceError::NoMemory);
    }

    #[test]
    fn test_display_names_channel() {
        let msg = CanHwmonError::MissingChannelBinding(Channel::Can1).to_string();
        assert_eq!(msg, "couldn't find a matching name for can1");
    }
}

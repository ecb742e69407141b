//! 设备模型错误类型
//!
//! 与 Linux 驱动核心一致的错误码，可通过 [`DeviceError::to_errno()`] 转换为负数 errno 上报给总线。

use core::fmt;

/// 设备模型错误类型
///
/// 各错误码对应标准 POSIX errno 值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceError {
    /// 属性或节点不存在 (-ENOENT)
    NotFound,
    /// I/O 错误 (-EIO)
    IoError,
    /// 内存不足 (-ENOMEM)
    NoMemory,
    /// 资源被占用 (-EBUSY)
    Busy,
    /// 已存在 (-EEXIST)
    AlreadyExists,
    /// 设备不存在 (-ENODEV)
    NoDevice,
    /// 无效参数 (-EINVAL)
    InvalidArgument,
    /// 没有可用数据 (-ENODATA)
    NoData,
    /// 操作不支持 (-ENOTSUP)
    NotSupported,
}

impl DeviceError {
    /// 转换为错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            DeviceError::NotFound => -2,
            DeviceError::IoError => -5,
            DeviceError::NoMemory => -12,
            DeviceError::Busy => -16,
            DeviceError::AlreadyExists => -17,
            DeviceError::NoDevice => -19,
            DeviceError::InvalidArgument => -22,
            DeviceError::NoData => -61,
            DeviceError::NotSupported => -95,
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            DeviceError::NotFound => "no such entry",
            DeviceError::IoError => "I/O error",
            DeviceError::NoMemory => "out of memory",
            DeviceError::Busy => "resource busy",
            DeviceError::AlreadyExists => "already exists",
            DeviceError::NoDevice => "no such device",
            DeviceError::InvalidArgument => "invalid argument",
            DeviceError::NoData => "no data available",
            DeviceError::NotSupported => "operation not supported",
        };
        write!(f, "{} ({})", msg, self.to_errno())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_errno_values() {
        assert_eq!(DeviceError::NoDevice.to_errno(), -19);
        assert_eq!(DeviceError::InvalidArgument.to_errno(), -22);
        assert_eq!(DeviceError::NoData.to_errno(), -61);
        assert_eq!(DeviceError::Busy.to_errno(), -16);
    }

    #[test]
    fn test_display_carries_errno() {
        assert_eq!(DeviceError::Busy.to_string(), "resource busy (-16)");
    }
}

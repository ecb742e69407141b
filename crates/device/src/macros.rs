//! 设备日志宏
//!
//! 在 `log` 门面之上加一层设备名前缀，输出格式为 `<dev_name>: <message>`。
//! 第一个参数是任何带有 `name()` 方法的值，例如 [`PlatformDevice`](crate::driver::PlatformDevice)
//! 或 [`DeviceNode`](crate::of::DeviceNode)。只有设备名字符串时写作 `dev_err!(name = dev_name, ...)`。

/// 以 error 级别记录设备日志
#[macro_export]
macro_rules! dev_err {
    (name = $name:expr, $($arg:tt)*) => {
        $crate::__private_log::error!("{}: {}", $name, format_args!($($arg)*))
    };
    ($dev:expr, $($arg:tt)*) => {
        $crate::__private_log::error!("{}: {}", $dev.name(), format_args!($($arg)*))
    };
}

/// 以 warn 级别记录设备日志
#[macro_export]
macro_rules! dev_warn {
    (name = $name:expr, $($arg:tt)*) => {
        $crate::__private_log::warn!("{}: {}", $name, format_args!($($arg)*))
    };
    ($dev:expr, $($arg:tt)*) => {
        $crate::__private_log::warn!("{}: {}", $dev.name(), format_args!($($arg)*))
    };
}

/// 以 info 级别记录设备日志
#[macro_export]
macro_rules! dev_info {
    (name = $name:expr, $($arg:tt)*) => {
        $crate::__private_log::info!("{}: {}", $name, format_args!($($arg)*))
    };
    ($dev:expr, $($arg:tt)*) => {
        $crate::__private_log::info!("{}: {}", $dev.name(), format_args!($($arg)*))
    };
}

/// 以 debug 级别记录设备日志
#[macro_export]
macro_rules! dev_dbg {
    (name = $name:expr, $($arg:tt)*) => {
        $crate::__private_log::debug!("{}: {}", $name, format_args!($($arg)*))
    };
    ($dev:expr, $($arg:tt)*) => {
        $crate::__private_log::debug!("{}: {}", $dev.name(), format_args!($($arg)*))
    };
}

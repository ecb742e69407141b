//! sysfs 风格的属性文件
//!
//! 驱动通过 [`SysfsAttr`] 描述一个可读属性：名称、权限以及在每次读取时调用的 `show` 回调。

use alloc::{string::String, sync::Arc};
use core::fmt;

use bitflags::bitflags;

use crate::error::DeviceError;

bitflags! {
    /// 属性文件权限位
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FileMode: u16 {
        /// 所有者可读
        const S_IRUSR = 0o400;
        /// 所有者可写
        const S_IWUSR = 0o200;
        /// 同组可读
        const S_IRGRP = 0o040;
        /// 其他用户可读
        const S_IROTH = 0o004;
        /// 所有人可读 (S_IRUGO)
        const S_IRUGO = 0o444;
    }
}

/// 属性读取回调
pub type ShowFn = Arc<dyn Fn() -> Result<String, DeviceError> + Send + Sync>;

/// 一个属性文件
#[derive(Clone)]
pub struct SysfsAttr {
    /// 文件名
    pub name: String,
    /// 权限
    pub mode: FileMode,
    /// 读取回调，每次读取都会重新调用
    pub show: ShowFn,
}

impl SysfsAttr {
    /// 读取属性内容
    pub fn show(&self) -> Result<String, DeviceError> {
        (self.show)()
    }

    /// 属性是否允许写入；没有写回调的属性文件不能带写权限
    pub fn is_writable(&self) -> bool {
        self.mode.contains(FileMode::S_IWUSR)
    }
}

impl fmt::Debug for SysfsAttr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SysfsAttr")
            .field("name", &self.name)
            .field("mode", &format_args!("{:#o}", self.mode.bits()))
            .finish_non_exhaustive()
    }
}

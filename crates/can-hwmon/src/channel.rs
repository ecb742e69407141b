//! 受监控的 CAN 通道

use core::fmt;

/// 通道个数，编译期固定
pub const CHANNEL_COUNT: usize = 2;

/// 未匹配到通道时使用的名称
pub const UNDEF_CHANNEL: &str = "undef";

/// 一路 CAN 总线的终端电阻检测输入
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    /// 第一路
    Can0,
    /// 第二路
    Can1,
}

impl Channel {
    /// 所有通道，按绑定顺序排列
    pub const ALL: [Channel; CHANNEL_COUNT] = [Channel::Can0, Channel::Can1];

    /// 规范名称，也是 `gpio-names` 中的名称
    pub const fn name(self) -> &'static str {
        match self {
            Channel::Can0 => "can0",
            Channel::Can1 => "can1",
        }
    }

    /// 绑定表中的下标
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 按规范名称精确查找通道
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ch| ch.name() == name)
    }

    /// 由属性名（如 `can0_status`）查找通道
    ///
    /// 取第一个 `_` 之前的部分做精确比较，因此 `can10_value` 不会被当成 `can1`。
    pub fn from_attribute(attr: &str) -> Option<Self> {
        let prefix = attr.split_once('_').map_or(attr, |(prefix, _)| prefix);
        Self::from_name(prefix)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

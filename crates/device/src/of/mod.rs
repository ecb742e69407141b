//! 设备描述（Open Firmware / 设备树）查询接口
//!
//! 驱动只通过 [`DeviceNode`] 查询自己的描述节点，不关心描述来自扁平设备树、
//! 还是测试中构造的内存节点。
//!
//! # 属性编码
//!
//! 与 DTB 一致：
//! - 单元（cell）列表为大端 `u32` 序列，例如 `gpios = <&gpio0 5 0>`；
//! - 字符串列表为若干个以 NUL 结尾的字符串拼接，例如 `gpio-names = "can0", "can1"`。

#[cfg(feature = "fdt")]
mod fdt_node;

#[cfg(feature = "fdt")]
pub use fdt_node::FdtDeviceNode;

use alloc::vec::Vec;

use crate::error::DeviceError;

/// 一个 phandle 引用及其参数单元，例如 `<&gpio0 5 0>` 解析为 `phandle = &gpio0, args = [5, 0]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhandleArgs {
    /// 被引用的控制器节点 phandle
    pub phandle: u32,
    /// 参数单元，个数由控制器的 `#xxx-cells` 属性决定
    pub args: Vec<u32>,
}

/// 设备描述节点查询服务
pub trait DeviceNode {
    /// 节点名
    fn name(&self) -> &str;

    /// 节点的 `compatible` 列表中是否包含 `compat`
    fn is_compatible(&self, compat: &str) -> bool;

    /// 统计 `list` 属性中的 phandle 引用个数，每个引用的参数个数由被引用节点的 `cells_name` 属性给出
    fn count_phandle_with_args(&self, list: &str, cells_name: &str) -> Result<usize, DeviceError>;

    /// 解析 `list` 属性中第 `index` 个 phandle 引用
    fn parse_phandle_with_args(
        &self,
        list: &str,
        cells_name: &str,
        index: usize,
    ) -> Result<PhandleArgs, DeviceError>;

    /// 统计字符串列表属性中的字符串个数
    fn property_count_strings(&self, prop: &str) -> Result<usize, DeviceError>;

    /// 在字符串列表属性中精确查找 `s`，返回其下标
    fn property_match_string(&self, prop: &str, s: &str) -> Result<usize, DeviceError>;
}

/// 将属性值按大端 `u32` 单元解码
///
/// 长度不是 4 的整数倍时返回 [`DeviceError::InvalidArgument`]。
pub fn decode_cells(value: &[u8]) -> Result<Vec<u32>, DeviceError> {
    if value.len() % 4 != 0 {
        return Err(DeviceError::InvalidArgument);
    }
    Ok(value
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// 将字符串列表属性解码
///
/// 空属性返回 [`DeviceError::NoData`]；缺少结尾 NUL 或不是合法 UTF-8 时返回
/// [`DeviceError::InvalidArgument`]。
pub fn decode_string_list(value: &[u8]) -> Result<Vec<&str>, DeviceError> {
    let Some((&last, body)) = value.split_last() else {
        return Err(DeviceError::NoData);
    };
    if last != 0 {
        return Err(DeviceError::InvalidArgument);
    }
    body.split(|b| *b == 0)
        .map(|s| core::str::from_utf8(s).map_err(|_| DeviceError::InvalidArgument))
        .collect()
}

/// 将 `list` 属性的单元按 phandle 引用切分
///
/// `arg_count` 给出每个控制器 phandle 对应的参数个数；phandle 为 0 表示空引用，不带参数。
pub fn split_phandle_list<F>(cells: &[u32], mut arg_count: F) -> Result<Vec<PhandleArgs>, DeviceError>
where
    F: FnMut(u32) -> Result<usize, DeviceError>,
{
    let mut entries = Vec::new();
    let mut pos = 0;
    while pos < cells.len() {
        let phandle = cells[pos];
        pos += 1;
        let count = if phandle == 0 { 0 } else { arg_count(phandle)? };
        let end = pos.checked_add(count).ok_or(DeviceError::InvalidArgument)?;
        let args = cells
            .get(pos..end)
            .ok_or(DeviceError::InvalidArgument)?
            .to_vec();
        pos = end;
        entries.push(PhandleArgs { phandle, args });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_decode_cells() {
        let raw = [0, 0, 0, 1, 0, 0, 0x01, 0x02];
        assert_eq!(decode_cells(&raw).unwrap(), vec![1, 0x102]);
        assert_eq!(decode_cells(&raw[..3]), Err(DeviceError::InvalidArgument));
    }

    #[test]
    fn test_decode_string_list() {
        assert_eq!(decode_string_list(b"can0\0can1\0").unwrap(), vec!["can0", "can1"]);
        assert_eq!(decode_string_list(b""), Err(DeviceError::NoData));
        assert_eq!(decode_string_list(b"can0"), Err(DeviceError::InvalidArgument));
    }

    #[test]
    fn test_split_phandle_list() {
        // <&ctrl 5 0>, <0>, <&ctrl 7 1>
        let cells = [3, 5, 0, 0, 3, 7, 1];
        let entries = split_phandle_list(&cells, |_| Ok(2)).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0], PhandleArgs { phandle: 3, args: vec![5, 0] });
        assert!(entries[1].args.is_empty());
        assert_eq!(entries[2].args, vec![7, 1]);
    }

    #[test]
    fn test_split_phandle_list_truncated() {
        let cells = [3, 5];
        assert_eq!(
            split_phandle_list(&cells, |_| Ok(2)),
            Err(DeviceError::InvalidArgument)
        );
    }

    #[test]
    fn test_split_phandle_list_huge_cell_count() {
        let cells = [3, 5, 0];
        assert_eq!(
            split_phandle_list(&cells, |_| Ok(usize::MAX)),
            Err(DeviceError::InvalidArgument)
        );
    }
}

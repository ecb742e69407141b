//! 基于扁平设备树（`fdt` crate）的 [`DeviceNode`] 实现

use alloc::vec::Vec;

use fdt::{Fdt, node::FdtNode};

use super::{DeviceNode, PhandleArgs, decode_cells, decode_string_list, split_phandle_list};
use crate::error::DeviceError;

/// 设备树中的一个节点
///
/// 同时持有整棵树的引用，以便按 phandle 查找被引用的控制器节点。
pub struct FdtDeviceNode<'b, 'a: 'b> {
    fdt: &'b Fdt<'a>,
    node: FdtNode<'b, 'a>,
}

impl<'b, 'a: 'b> FdtDeviceNode<'b, 'a> {
    /// 包装设备树节点
    pub fn new(fdt: &'b Fdt<'a>, node: FdtNode<'b, 'a>) -> Self {
        Self { fdt, node }
    }

    /// 查找所有 `compatible` 包含 `compat` 的节点，按设备树顺序返回
    pub fn find_compatible(fdt: &'b Fdt<'a>, compat: &str) -> Vec<Self> {
        fdt.all_nodes()
            .filter(|node| {
                node.compatible()
                    .is_some_and(|c| c.all().any(|s| s == compat))
            })
            .map(|node| Self::new(fdt, node))
            .collect()
    }

    fn phandle_entries(&self, list: &str, cells_name: &str) -> Result<Vec<PhandleArgs>, DeviceError> {
        let prop = self.node.property(list).ok_or(DeviceError::NotFound)?;
        let cells = decode_cells(prop.value)?;
        split_phandle_list(&cells, |phandle| {
            let controller = self
                .fdt
                .find_phandle(phandle)
                .ok_or(DeviceError::InvalidArgument)?;
            controller
                .property(cells_name)
                .and_then(|p| p.as_usize())
                .ok_or(DeviceError::InvalidArgument)
        })
    }

    fn strings(&self, prop: &str) -> Result<Vec<&'a str>, DeviceError> {
        // 与 Linux 一致：属性不存在返回 -EINVAL
        let prop = self
            .node
            .property(prop)
            .ok_or(DeviceError::InvalidArgument)?;
        decode_string_list(prop.value)
    }
}

impl DeviceNode for FdtDeviceNode<'_, '_> {
    fn name(&self) -> &str {
        self.node.name
    }

    fn is_compatible(&self, compat: &str) -> bool {
        self.node
            .compatible()
            .is_some_and(|c| c.all().any(|s| s == compat))
    }

    fn count_phandle_with_args(&self, list: &str, cells_name: &str) -> Result<usize, DeviceError> {
        Ok(self.phandle_entries(list, cells_name)?.len())
    }

    fn parse_phandle_with_args(
        &self,
        list: &str,
        cells_name: &str,
        index: usize,
    ) -> Result<PhandleArgs, DeviceError> {
        self.phandle_entries(list, cells_name)?
            .into_iter()
            .nth(index)
            .ok_or(DeviceError::NotFound)
    }

    fn property_count_strings(&self, prop: &str) -> Result<usize, DeviceError> {
        Ok(self.strings(prop)?.len())
    }

    fn property_match_string(&self, prop: &str, s: &str) -> Result<usize, DeviceError> {
        self.strings(prop)?
            .iter()
            .position(|name| *name == s)
            .ok_or(DeviceError::NoData)
    }
}

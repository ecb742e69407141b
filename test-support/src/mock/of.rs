//! 内存中的设备描述节点
//!
//! 属性按 DTB 的编码保存，查询时复用 `device::of` 的解码函数，
//! 因此错误码与扁平设备树后端一致。

use alloc::{
    collections::btree_map::BTreeMap,
    string::{String, ToString},
    vec::Vec,
};

use device::of::{decode_cells, decode_string_list, split_phandle_list};
use device::{DeviceError, DeviceNode, PhandleArgs};

/// 测试中构造的设备描述节点
///
/// 通过 [`StaticNode::gpios`] 引用的控制器固定为 `#gpio-cells = <2>`。
#[derive(Debug, Clone, Default)]
pub struct StaticNode {
    name: String,
    compatible: Vec<String>,
    props: BTreeMap<String, Vec<u8>>,
    controllers: BTreeMap<u32, usize>,
}

impl StaticNode {
    /// 创建名为 `name` 的空节点
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// 追加 `compatible` 字符串
    pub fn compatible(mut self, compat: &str) -> Self {
        self.compatible.push(compat.to_string());
        self
    }

    /// 设置 `gpios = <&ctrl line 0>, ...`
    pub fn gpios(mut self, ctrl: u32, lines: &[u32]) -> Self {
        let bytes = lines
            .iter()
            .flat_map(|line| [ctrl, *line, 0])
            .flat_map(u32::to_be_bytes)
            .collect();
        self.props.insert("gpios".to_string(), bytes);
        self.controllers.insert(ctrl, 2);
        self
    }

    /// 设置字符串列表属性
    pub fn strings(mut self, prop: &str, values: &[&str]) -> Self {
        let mut bytes = Vec::new();
        for value in values {
            bytes.extend_from_slice(value.as_bytes());
            bytes.push(0);
        }
        self.props.insert(prop.to_string(), bytes);
        self
    }

    /// 构造一个 `can-hwmon` 节点，`bindings` 为 `(线号, 名称)` 列表
    pub fn can_hwmon(ctrl: u32, bindings: &[(u32, &str)]) -> Self {
        let lines: Vec<u32> = bindings.iter().map(|(line, _)| *line).collect();
        let names: Vec<&str> = bindings.iter().map(|(_, name)| *name).collect();
        Self::new("can-hwmon")
            .compatible("can-hwmon")
            .gpios(ctrl, &lines)
            .strings("gpio-names", &names)
    }

    fn phandle_entries(&self, list: &str) -> Result<Vec<PhandleArgs>, DeviceError> {
        let value = self.props.get(list).ok_or(DeviceError::NotFound)?;
        let cells = decode_cells(value)?;
        split_phandle_list(&cells, |phandle| {
            self.controllers
                .get(&phandle)
                .copied()
                .ok_or(DeviceError::InvalidArgument)
        })
    }

    fn string_list(&self, prop: &str) -> Result<Vec<&str>, DeviceError> {
        let value = self.props.get(prop).ok_or(DeviceError::InvalidArgument)?;
        decode_string_list(value)
    }
}

impl DeviceNode for StaticNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_compatible(&self, compat: &str) -> bool {
        self.compatible.iter().any(|c| c == compat)
    }

    fn count_phandle_with_args(&self, list: &str, _cells_name: &str) -> Result<usize, DeviceError> {
        Ok(self.phandle_entries(list)?.len())
    }

    fn parse_phandle_with_args(
        &self,
        list: &str,
        _cells_name: &str,
        index: usize,
    ) -> Result<PhandleArgs, DeviceError> {
        self.phandle_entries(list)?
            .into_iter()
            .nth(index)
            .ok_or(DeviceError::NotFound)
    }

    fn property_count_strings(&self, prop: &str) -> Result<usize, DeviceError> {
        Ok(self.string_list(prop)?.len())
    }

    fn property_match_string(&self, prop: &str, s: &str) -> Result<usize, DeviceError> {
        self.string_list(prop)?
            .iter()
            .position(|name| *name == s)
            .ok_or(DeviceError::NoData)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_can_hwmon_node() {
        let node = StaticNode::can_hwmon(1, &[(5, "can0"), (6, "can1")]);
        assert!(node.is_compatible("can-hwmon"));
        assert_eq!(node.count_phandle_with_args("gpios", "#gpio-cells"), Ok(2));
        assert_eq!(
            node.parse_phandle_with_args("gpios", "#gpio-cells", 1),
            Ok(PhandleArgs {
                phandle: 1,
                args: vec![6, 0],
            })
        );
        assert_eq!(node.property_count_strings("gpio-names"), Ok(2));
        assert_eq!(node.property_match_string("gpio-names", "can1"), Ok(1));
        assert_eq!(
            node.property_match_string("gpio-names", "can"),
            Err(DeviceError::NoData)
        );
    }

    #[test]
    fn test_missing_properties() {
        let node = StaticNode::new("empty");
        assert_eq!(
            node.count_phandle_with_args("gpios", "#gpio-cells"),
            Err(DeviceError::NotFound)
        );
        assert_eq!(
            node.property_count_strings("gpio-names"),
            Err(DeviceError::InvalidArgument)
        );
    }
}

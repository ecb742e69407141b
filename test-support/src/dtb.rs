//! 扁平设备树（DTB）构造工具
//!
//! 按 DTB v17 格式生成设备树二进制：40 字节头部，紧随一个空的内存保留表，
//! 然后是结构块与字符串块。
//!
//! ```ignore
//! let mut dtb = DtbBuilder::new();
//! dtb.begin_node("");
//! dtb.begin_node("can-hwmon");
//! dtb.prop_strs("compatible", &["can-hwmon"]);
//! dtb.end_node();
//! dtb.end_node();
//! let blob = dtb.build();
//! ```

use alloc::{string::String, vec::Vec};

const FDT_MAGIC: u32 = 0xd00d_feed;
const FDT_VERSION: u32 = 17;
const FDT_LAST_COMP_VERSION: u32 = 16;

const FDT_BEGIN_NODE: u32 = 0x1;
const FDT_END_NODE: u32 = 0x2;
const FDT_PROP: u32 = 0x3;
const FDT_END: u32 = 0x9;

const HEADER_SIZE: usize = 40;
const RSVMAP_SIZE: usize = 16;

/// DTB 构造器
#[derive(Debug, Default)]
pub struct DtbBuilder {
    structure: Vec<u8>,
    strings: Vec<u8>,
    names: Vec<(String, u32)>,
    depth: usize,
}

impl DtbBuilder {
    /// 创建空的构造器
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始一个节点，根节点名为空串
    pub fn begin_node(&mut self, name: &str) -> &mut Self {
        self.push_u32(FDT_BEGIN_NODE);
        self.structure.extend_from_slice(name.as_bytes());
        self.structure.push(0);
        self.align();
        self.depth += 1;
        self
    }

    /// 结束当前节点
    pub fn end_node(&mut self) -> &mut Self {
        self.push_u32(FDT_END_NODE);
        self.depth = self.depth.saturating_sub(1);
        self
    }

    /// 添加原始字节属性
    pub fn prop(&mut self, name: &str, value: &[u8]) -> &mut Self {
        let nameoff = self.string_offset(name);
        self.push_u32(FDT_PROP);
        self.push_u32(value.len() as u32);
        self.push_u32(nameoff);
        self.structure.extend_from_slice(value);
        self.align();
        self
    }

    /// 添加单元列表属性
    pub fn prop_u32s(&mut self, name: &str, cells: &[u32]) -> &mut Self {
        let value: Vec<u8> = cells.iter().flat_map(|c| c.to_be_bytes()).collect();
        self.prop(name, &value)
    }

    /// 添加字符串列表属性
    pub fn prop_strs(&mut self, name: &str, values: &[&str]) -> &mut Self {
        let mut value = Vec::new();
        for s in values {
            value.extend_from_slice(s.as_bytes());
            value.push(0);
        }
        self.prop(name, &value)
    }

    /// 添加空属性，例如 `gpio-controller;`
    pub fn prop_empty(&mut self, name: &str) -> &mut Self {
        self.prop(name, &[])
    }

    /// 生成 DTB，未结束的节点会被自动结束
    pub fn build(&mut self) -> Vec<u8> {
        while self.depth > 0 {
            self.end_node();
        }
        let mut structure = core::mem::take(&mut self.structure);
        structure.extend_from_slice(&FDT_END.to_be_bytes());

        let off_dt_struct = HEADER_SIZE + RSVMAP_SIZE;
        let off_dt_strings = off_dt_struct + structure.len();
        let total_size = off_dt_strings + self.strings.len();

        let mut blob = Vec::with_capacity(total_size);
        for word in [
            FDT_MAGIC,
            total_size as u32,
            off_dt_struct as u32,
            off_dt_strings as u32,
            HEADER_SIZE as u32,
            FDT_VERSION,
            FDT_LAST_COMP_VERSION,
            0,
            self.strings.len() as u32,
            structure.len() as u32,
        ] {
            blob.extend_from_slice(&word.to_be_bytes());
        }
        blob.extend_from_slice(&[0; RSVMAP_SIZE]);
        blob.extend_from_slice(&structure);
        blob.extend_from_slice(&self.strings);
        blob
    }

    fn push_u32(&mut self, value: u32) {
        self.structure.extend_from_slice(&value.to_be_bytes());
    }

    fn align(&mut self) {
        while self.structure.len() % 4 != 0 {
            self.structure.push(0);
        }
    }

    fn string_offset(&mut self, name: &str) -> u32 {
        if let Some((_, off)) = self.names.iter().find(|(n, _)| n == name) {
            return *off;
        }
        let off = self.strings.len() as u32;
        self.strings.extend_from_slice(name.as_bytes());
        self.strings.push(0);
        self.names.push((String::from(name), off));
        off
    }
}

//! # 内存页面模型
//!
//! ## 设计思路
//!
//! 用一个 arena（`Vec<NodeData>`）保存所有节点，节点之间通过 `NodeId` 索引互相引用，
//! 避免引用计数与生命周期纠缠。父子关系双向维护：`parent` 用于背景合成时向上查找，
//! `children` 用于按文档顺序枚举图片与检查包裹结果。
//!
//! ## 实现思路
//!
//! - 图片节点附带 `ImageSlot`：尺寸 + 位图或“被拒绝读取”的原因。
//! - 所有会改变页面结构或类名的操作都会累加 `mutation_count`，
//!   便于验证“过小图片不触发任何页面修改”。

use std::collections::BTreeMap;

use image::RgbaImage;
use serde::Serialize;

use super::Document;
use crate::image_handler::ImageError;

/// 节点句柄（arena 下标）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

/// 图片像素来源。
#[derive(Debug, Clone)]
pub(crate) enum PixelSource {
    Bitmap(RgbaImage),
    /// 像素不可读，附带原因。
    Blocked(String),
}

#[derive(Debug, Clone)]
pub(crate) struct ImageSlot {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) src: Option<String>,
    pub(crate) pixels: PixelSource,
}

#[derive(Debug, Clone)]
struct NodeData {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    background: Option<String>,
    text: Option<String>,
    image: Option<ImageSlot>,
}

impl NodeData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            parent: None,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            background: None,
            text: None,
            image: None,
        }
    }
}

/// 内存中的页面。
#[derive(Debug, Clone)]
pub struct StaticPage {
    nodes: Vec<NodeData>,
    root: NodeId,
    mutation_count: usize,
}

impl StaticPage {
    /// 以给定标签创建只含根元素的页面。
    pub fn new(root_tag: &str) -> Self {
        Self {
            nodes: vec![NodeData::new(root_tag)],
            root: NodeId(0),
            mutation_count: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// 在 `parent` 下追加一个普通元素（构建阶段使用，不计入修改次数）。
    pub fn add_element(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = self.push_node(NodeData::new(tag));
        self.attach(parent, id);
        id
    }

    /// 在 `parent` 下追加一张可读取像素的图片，尺寸取位图尺寸。
    pub fn add_image(&mut self, parent: NodeId, bitmap: RgbaImage) -> NodeId {
        let (width, height) = bitmap.dimensions();
        self.add_image_slot(
            parent,
            ImageSlot {
                width,
                height,
                src: None,
                pixels: PixelSource::Bitmap(bitmap),
            },
        )
    }

    /// 在 `parent` 下追加一张像素不可读的图片（模拟跨域图片）。
    pub fn add_blocked_image(
        &mut self,
        parent: NodeId,
        width: u32,
        height: u32,
        reason: impl Into<String>,
    ) -> NodeId {
        self.add_image_slot(
            parent,
            ImageSlot {
                width,
                height,
                src: None,
                pixels: PixelSource::Blocked(reason.into()),
            },
        )
    }

    pub(crate) fn add_image_slot(&mut self, parent: NodeId, slot: ImageSlot) -> NodeId {
        let mut data = NodeData::new("img");
        if let Some(src) = &slot.src {
            data.attributes.insert("src".to_string(), src.clone());
        }
        data.image = Some(slot);
        let id = self.push_node(data);
        self.attach(parent, id);
        id
    }

    /// 构建阶段写入初始类名，不计入修改次数。
    pub(crate) fn push_initial_class(&mut self, node: NodeId, class: &str) {
        let classes = &mut self.nodes[node.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    /// 设置元素的计算背景色（CSS 字符串）。
    pub fn set_background(&mut self, node: NodeId, css: impl Into<String>) {
        self.nodes[node.0].background = Some(css.into());
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0].attributes.get(name).map(String::as_str)
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.0].text.as_deref()
    }

    pub fn classes(&self, node: NodeId) -> &[String] {
        &self.nodes[node.0].classes
    }

    pub fn image_src(&self, node: NodeId) -> Option<&str> {
        self.nodes[node.0]
            .image
            .as_ref()
            .and_then(|slot| slot.src.as_deref())
    }

    /// 图片位图；非图片或像素不可读时返回 `None`。
    pub fn bitmap(&self, node: NodeId) -> Option<&RgbaImage> {
        match self.nodes[node.0].image.as_ref().map(|slot| &slot.pixels) {
            Some(PixelSource::Bitmap(bitmap)) => Some(bitmap),
            _ => None,
        }
    }

    /// 自创建以来发生的页面修改次数。
    pub fn mutation_count(&self) -> usize {
        self.mutation_count
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// 从 `node` 所在位置出发，判断 `ancestor` 是否是其自身或祖先。
    fn is_self_or_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }
}

impl Document for StaticPage {
    type Node = NodeId;

    fn images(&self) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.image.is_some() {
                found.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        found
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn background_color(&self, node: NodeId) -> Option<String> {
        self.nodes[node.0].background.clone()
    }

    fn image_dimensions(&self, node: NodeId) -> (u32, u32) {
        self.nodes[node.0]
            .image
            .as_ref()
            .map(|slot| (slot.width, slot.height))
            .unwrap_or((0, 0))
    }

    fn rasterize(&self, node: NodeId) -> Result<RgbaImage, ImageError> {
        match self.nodes[node.0].image.as_ref().map(|slot| &slot.pixels) {
            Some(PixelSource::Bitmap(bitmap)) => Ok(bitmap.clone()),
            Some(PixelSource::Blocked(reason)) => Err(ImageError::PixelAccess(reason.clone())),
            None => Err(ImageError::Decode(format!("节点 {:?} 不是图片元素", node))),
        }
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.mutation_count += 1;
        self.push_node(NodeData::new(tag))
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        self.mutation_count += 1;
        self.nodes[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        self.mutation_count += 1;
        self.nodes[node.0].text = Some(text.to_string());
    }

    fn insert_before(&mut self, node: NodeId, reference: NodeId) {
        let Some(parent) = self.nodes[reference.0].parent else {
            log::warn!("⚠️ 参照节点 {:?} 没有父节点，忽略插入", reference);
            return;
        };
        if node == reference || self.is_self_or_ancestor(node, parent) {
            log::warn!("⚠️ 插入 {:?} 会形成环，忽略", node);
            return;
        }

        self.mutation_count += 1;
        self.detach(node);
        let siblings = &mut self.nodes[parent.0].children;
        let position = siblings
            .iter()
            .position(|&c| c == reference)
            .unwrap_or(siblings.len());
        siblings.insert(position, node);
        self.nodes[node.0].parent = Some(parent);
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if self.is_self_or_ancestor(child, parent) {
            log::warn!("⚠️ 追加 {:?} 会形成环，忽略", child);
            return;
        }

        self.mutation_count += 1;
        self.detach(child);
        self.attach(parent, child);
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        self.mutation_count += 1;
        let classes = &mut self.nodes[node.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        self.mutation_count += 1;
        self.nodes[node.0].classes.retain(|c| c != class);
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes[node.0].classes.iter().any(|c| c == class)
    }
}

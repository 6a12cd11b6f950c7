//! # 宿主页面抽象模块（page）
//!
//! ## 设计思路
//!
//! 启发式本身不关心页面来自浏览器 DOM 还是内存模型，
//! 只依赖一组最小能力：枚举图片、向上查找祖先、读取背景色、读取像素、
//! 创建元素与调整类名/父子关系。这些能力统一收敛到 `Document` trait。
//!
//! - `static_page`：基于 arena 的内存实现，供 CLI 与测试使用
//! - `manifest`：页面清单（JSON）到 `StaticPage` 的加载
//!
//! ## 实现思路
//!
//! 节点句柄以关联类型 `Node` 表示，要求 `Copy`，
//! 这样每张图片的状态对象可以直接持有句柄而不借用文档本身。

mod manifest;
mod static_page;

pub use manifest::{ElementSpec, PageManifest};
pub use static_page::{NodeId, StaticPage};

use image::RgbaImage;

use crate::image_handler::ImageError;

/// 宿主文档需要提供的能力集合。
pub trait Document {
    /// 节点句柄。
    type Node: Copy + Eq + std::hash::Hash + std::fmt::Debug;

    /// 当前文档中的全部图片元素，按文档顺序返回快照。
    ///
    /// 之后插入的元素不会出现在已返回的快照中。
    fn images(&self) -> Vec<Self::Node>;

    /// 父元素；根元素返回 `None`。
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    /// 计算后的 `background-color` 值；未声明时返回 `None`。
    fn background_color(&self, node: Self::Node) -> Option<String>;

    /// 图片的像素尺寸（宽、高）。
    fn image_dimensions(&self, node: Self::Node) -> (u32, u32);

    /// 读取图片的完整 RGBA 位图。
    ///
    /// 宿主禁止读取像素时（如跨域图片）返回 `ImageError::PixelAccess`。
    fn rasterize(&self, node: Self::Node) -> Result<RgbaImage, ImageError>;

    /// 创建一个尚未挂载的元素。
    fn create_element(&mut self, tag: &str) -> Self::Node;

    fn set_attribute(&mut self, node: Self::Node, name: &str, value: &str);

    fn set_text(&mut self, node: Self::Node, text: &str);

    /// 把 `node` 插入到 `reference` 之前，成为其兄弟节点（会先从原位置移除）。
    fn insert_before(&mut self, node: Self::Node, reference: Self::Node);

    /// 把 `child` 追加为 `parent` 的最后一个子节点（会先从原位置移除）。
    fn append_child(&mut self, parent: Self::Node, child: Self::Node);

    fn add_class(&mut self, node: Self::Node, class: &str);

    fn remove_class(&mut self, node: Self::Node, class: &str);

    fn has_class(&self, node: Self::Node, class: &str) -> bool;
}

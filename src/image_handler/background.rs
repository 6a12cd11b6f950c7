//! # 背景采样模块
//!
//! ## 设计思路
//!
//! 图片“看起来”落在什么颜色上，取决于从根元素到图片自身每一层声明的背景色。
//! 半透明背景会与下层混合，透明背景则让下层透出。
//! 因此从白色底色出发，由外向内逐层叠加，最后一层是图片元素自身的背景。
//!
//! ## 实现思路
//!
//! 1. 从目标元素沿 `parent` 向上收集祖先链
//! 2. 反转为“根 → 目标”的顺序
//! 3. 以白色为初值，依次做 source-over 合成（fold）
//!
//! 只考虑 `background-color`，`background-image` 不参与计算。

use image::Rgba;

use crate::color::{self, WHITE};
use crate::page::Document;

/// 收集从根元素到 `node`（含）的祖先链。
///
/// `node` 为 `None` 时返回空链。
pub fn ancestor_chain<D: Document>(doc: &D, node: Option<D::Node>) -> Vec<D::Node> {
    let mut chain = Vec::new();
    let mut current = node;
    while let Some(id) = current {
        chain.push(id);
        current = doc.parent(id);
    }
    chain.reverse();
    chain
}

/// 计算 `node` 背后实际可见的背景像素。
///
/// 未声明背景或背景无法解析的层视为透明，不影响结果。
pub fn sample_background<D: Document>(doc: &D, node: Option<D::Node>) -> Rgba<u8> {
    ancestor_chain(doc, node)
        .into_iter()
        .fold(WHITE, |accumulated, layer| {
            let Some(css) = doc.background_color(layer) else {
                return accumulated;
            };

            match color::parse_css_color(&css) {
                Some(paint) => color::composite_over(accumulated, paint),
                None => {
                    log::warn!("⚠️ 无法解析背景色 {:?}（节点 {:?}），按透明处理", css, layer);
                    accumulated
                }
            }
        })
}

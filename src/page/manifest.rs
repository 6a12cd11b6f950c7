//! # 页面清单加载
//!
//! ## 设计思路
//!
//! CLI 无法直接访问浏览器，因此用一个 JSON 清单描述页面结构：
//! 元素树、每层的背景色、图片路径以及是否模拟跨域。
//! 清单被一次性构建为 `StaticPage`，之后的扫描流程与真实页面一致。
//!
//! ## 实现思路
//!
//! - 图片路径相对清单文件所在目录解析。
//! - 加载失败的图片不会中断清单构建：尺寸退化为声明值或 0，像素标记为不可读，
//!   由扫描阶段按“单图失败”处理或按尺寸下限跳过。
//! - 跨域图片依然读取尺寸，但像素标记为不可读。

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::static_page::{ImageSlot, PixelSource};
use super::{Document, NodeId, StaticPage};
use crate::error::AppError;

/// 页面清单根结构。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageManifest {
    pub root: ElementSpec,
}

/// 清单中的单个元素。
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    /// 仅 `img` 使用：图片文件路径。
    #[serde(default)]
    pub src: Option<String>,
    /// 覆盖图片宽度（未提供时取文件尺寸）。
    #[serde(default)]
    pub width: Option<u32>,
    /// 覆盖图片高度（未提供时取文件尺寸）。
    #[serde(default)]
    pub height: Option<u32>,
    /// 模拟跨域图片：可以显示，但不能读取像素。
    #[serde(default)]
    pub cross_origin: bool,
    #[serde(default)]
    pub children: Vec<ElementSpec>,
}

impl PageManifest {
    /// 从 JSON 文本解析清单。
    pub fn from_json(content: &str) -> Result<Self, AppError> {
        serde_json::from_str(content)
            .map_err(|e| AppError::Manifest(format!("解析页面清单失败: {}", e)))
    }
}

impl StaticPage {
    /// 读取清单文件并构建页面。
    pub fn from_manifest_file(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path)?;
        let manifest = PageManifest::from_json(&content)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(Self::from_manifest(&manifest, &base_dir))
    }

    /// 由已解析的清单构建页面，图片路径相对 `base_dir` 解析。
    pub fn from_manifest(manifest: &PageManifest, base_dir: &Path) -> Self {
        let mut page = StaticPage::new(&manifest.root.tag);
        let root = page.root();
        apply_element_properties(&mut page, root, &manifest.root);

        // 显式栈代替递归，避免深层嵌套清单导致栈溢出
        let mut pending: Vec<(NodeId, &ElementSpec)> = manifest
            .root
            .children
            .iter()
            .rev()
            .map(|child| (root, child))
            .collect();

        while let Some((parent, spec)) = pending.pop() {
            let node = if spec.tag.eq_ignore_ascii_case("img") {
                page.add_image_slot(parent, load_image_slot(spec, base_dir))
            } else {
                page.add_element(parent, &spec.tag)
            };
            apply_element_properties(&mut page, node, spec);
            pending.extend(spec.children.iter().rev().map(|child| (node, child)));
        }

        log::info!("📄 页面清单已加载：{} 张图片", page.images().len());
        page
    }
}

fn apply_element_properties(page: &mut StaticPage, node: NodeId, spec: &ElementSpec) {
    if let Some(background) = &spec.background {
        page.set_background(node, background.clone());
    }
    for class in &spec.classes {
        page.push_initial_class(node, class);
    }
}

fn load_image_slot(spec: &ElementSpec, base_dir: &Path) -> ImageSlot {
    let Some(src) = spec.src.as_deref() else {
        return ImageSlot {
            width: spec.width.unwrap_or(0),
            height: spec.height.unwrap_or(0),
            src: None,
            pixels: PixelSource::Blocked("图片缺少 src".to_string()),
        };
    };

    let path: PathBuf = base_dir.join(src);
    match image::open(&path) {
        Ok(decoded) => {
            let bitmap = decoded.to_rgba8();
            let (file_width, file_height) = bitmap.dimensions();
            let pixels = if spec.cross_origin {
                PixelSource::Blocked(format!("跨域图片禁止读取像素: {}", src))
            } else {
                PixelSource::Bitmap(bitmap)
            };
            ImageSlot {
                width: spec.width.unwrap_or(file_width),
                height: spec.height.unwrap_or(file_height),
                src: Some(src.to_string()),
                pixels,
            }
        }
        Err(err) => {
            log::warn!("⚠️ 图片加载失败 {}: {}", path.display(), err);
            ImageSlot {
                width: spec.width.unwrap_or(0),
                height: spec.height.unwrap_or(0),
                src: Some(src.to_string()),
                pixels: PixelSource::Blocked(format!("图片加载失败: {}", err)),
            }
        }
    }
}

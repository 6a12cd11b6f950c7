//! # 命令实现模块
//!
//! ## 设计思路
//!
//! CLI 的每个子命令在这里对应一个函数，`main.rs` 只负责解析参数与打印输出。
//!
//! - `scan_manifest`：加载页面清单并整页扫描，返回页面、扫描记录与报告
//! - `export_inverted`：先结束所有未完成的过渡，再导出最终处于反色状态的图片
//! - `classify_bitmap` / `classify_file`：单张图片对指定背景色分类
//!
//! ## 实现思路
//!
//! 单图分类时，背景色先合成到白色底色上，与页面扫描的背景合成保持一致。

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use serde::Serialize;

use crate::color;
use crate::error::AppError;
use crate::image_handler::{Classification, ImageProcessor, ProcessOutcome, ScanEntry};
use crate::page::{NodeId, StaticPage};
use crate::report::ScanReport;

/// 一次整页扫描的全部产物。
#[derive(Debug)]
pub struct ScanRun {
    pub page: StaticPage,
    pub entries: Vec<ScanEntry<NodeId>>,
    pub report: ScanReport,
}

/// 单张图片的分类输出。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClassifyReport {
    #[serde(rename_all = "camelCase")]
    Classified {
        image: String,
        classification: Classification,
        auto_invert: bool,
    },
    #[serde(rename_all = "camelCase")]
    Skipped {
        image: String,
        skipped: bool,
        width: u32,
        height: u32,
    },
}

/// 加载清单并扫描全部图片。
pub fn scan_manifest(processor: &ImageProcessor, manifest: &Path) -> Result<ScanRun, AppError> {
    let mut page = StaticPage::from_manifest_file(manifest)?;
    let entries = processor.scan_document(&mut page);
    let report = ScanReport::from_entries(&page, processor.config(), &entries);

    Ok(ScanRun {
        page,
        entries,
        report,
    })
}

/// 结束所有未完成的过渡后，把最终处于反色状态的图片写为 PNG，返回写入的路径。
pub fn export_inverted(
    page: &mut StaticPage,
    entries: &mut [ScanEntry<NodeId>],
    dir: &Path,
) -> Result<Vec<PathBuf>, AppError> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for (index, entry) in entries.iter_mut().enumerate() {
        let Ok(ProcessOutcome::Annotated(annotation)) = &mut entry.result else {
            continue;
        };

        annotation.image_animation_end(page);
        if !annotation.toggle().is_on() {
            continue;
        }

        let Some(bitmap) = page.bitmap(annotation.image()) else {
            continue;
        };

        let mut inverted = bitmap.clone();
        image::imageops::invert(&mut inverted);

        let stem = page
            .image_src(annotation.image())
            .and_then(|src| Path::new(src).file_stem())
            .and_then(|stem| stem.to_str())
            .unwrap_or("image");
        let target = dir.join(format!("{:03}-{}-inverted.png", index, stem));
        inverted
            .save(&target)
            .map_err(|e| AppError::Output(format!("写入 {} 失败: {}", target.display(), e)))?;
        written.push(target);
    }

    log::info!("🖼️ 已导出 {} 张反色图片到 {}", written.len(), dir.display());
    Ok(written)
}

/// 把 CSS 背景色合成到白色底色上，得到不透明背景像素。
pub fn opaque_background(css: &str) -> Result<Rgba<u8>, AppError> {
    color::parse_css_color(css)
        .map(|paint| color::composite_over(color::WHITE, paint))
        .ok_or_else(|| AppError::Settings(format!("无法解析背景色: {}", css)))
}

/// 对一张位图按指定背景色分类；低于尺寸下限时返回跳过形态。
pub fn classify_bitmap(
    processor: &ImageProcessor,
    image: &str,
    bitmap: &RgbaImage,
    background_css: &str,
) -> Result<ClassifyReport, AppError> {
    let background = opaque_background(background_css)?;

    let report = match processor.classify_bitmap(bitmap, background)? {
        Some(classification) => ClassifyReport::Classified {
            image: image.to_string(),
            auto_invert: classification.should_auto_invert(processor.config()),
            classification,
        },
        None => {
            let (width, height) = bitmap.dimensions();
            ClassifyReport::Skipped {
                image: image.to_string(),
                skipped: true,
                width,
                height,
            }
        }
    };
    Ok(report)
}

/// 读取图片文件后分类。
pub fn classify_file(
    processor: &ImageProcessor,
    path: &Path,
    background_css: &str,
) -> Result<ClassifyReport, AppError> {
    let bitmap = image::open(path)
        .map_err(|e| AppError::Output(format!("读取图片 {} 失败: {}", path.display(), e)))?
        .to_rgba8();

    classify_bitmap(processor, &path.display().to_string(), &bitmap, background_css)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_handler::ScanConfig;
    use crate::image_handler::config::CLASS_INVERTED;
    use crate::page::Document;

    fn processor() -> ImageProcessor {
        ImageProcessor::new(ScanConfig::default()).unwrap()
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("yin-yang-cmd-{}-{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_opaque_background_composites_over_white() {
        assert_eq!(opaque_background("transparent").unwrap(), color::WHITE);
        assert_eq!(
            opaque_background("rgba(0, 0, 0, 0.5)").unwrap(),
            Rgba([127, 127, 127, 255])
        );
        assert!(matches!(opaque_background("nope"), Err(AppError::Settings(_))));
    }

    #[test]
    fn test_classify_small_bitmap_reports_skipped() {
        let bitmap = RgbaImage::from_pixel(63, 64, color::WHITE);

        let report = classify_bitmap(&processor(), "tiny.png", &bitmap, "black").unwrap();

        assert_eq!(
            report,
            ClassifyReport::Skipped {
                image: "tiny.png".to_string(),
                skipped: true,
                width: 63,
                height: 64,
            }
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["skipped"], true);
        assert_eq!(json["width"], 63);
        assert!(json.get("classification").is_none());
    }

    #[test]
    fn test_classify_light_screenshot_on_transparent_dark_background() {
        let bitmap = RgbaImage::from_pixel(100, 100, color::WHITE);

        // 半透明黑色合成到白底后为中灰，仍属于“暗”
        let report = classify_bitmap(&processor(), "shot.png", &bitmap, "rgba(0, 0, 0, 0.5)").unwrap();

        let ClassifyReport::Classified {
            classification,
            auto_invert,
            ..
        } = &report
        else {
            panic!("100x100 bitmap should be classified");
        };
        assert!(classification.is_screenshot);
        assert!((classification.background_lightness - 127.0 / 255.0).abs() < 1e-9);
        assert!(*auto_invert);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["autoInvert"], true);
        assert_eq!(json["classification"]["isScreenshot"], true);
    }

    #[test]
    fn test_classify_against_default_white_does_not_invert_light_image() {
        let bitmap = RgbaImage::from_pixel(100, 100, color::WHITE);

        let report = classify_bitmap(&processor(), "shot.png", &bitmap, "white").unwrap();

        assert!(matches!(report, ClassifyReport::Classified { auto_invert: false, .. }));
    }

    #[test]
    fn test_export_writes_only_images_that_end_inverted() {
        let mut page = StaticPage::new("body");
        let root = page.root();
        page.set_background(root, "black");
        page.add_image(root, RgbaImage::from_pixel(100, 100, color::WHITE));
        let dark = page.add_image(root, RgbaImage::from_pixel(100, 100, Rgba([0, 0, 0, 255])));
        let mut entries = processor().scan_document(&mut page);
        let dir = temp_dir("export");

        let written = export_inverted(&mut page, &mut entries, &dir).unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(written[0], dir.join("000-image-inverted.png"));
        let exported = image::open(&written[0]).unwrap().to_rgba8();
        assert!(exported.pixels().all(|p| *p == Rgba([0, 0, 0, 255])));

        // 暗图在暗背景上不反色，也不导出
        assert!(!page.has_class(dark, CLASS_INVERTED));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_export_completes_pending_transitions_first() {
        let mut page = StaticPage::new("body");
        let root = page.root();
        page.set_background(root, "black");
        let image = page.add_image(root, RgbaImage::from_pixel(100, 100, color::WHITE));
        let mut entries = processor().scan_document(&mut page);

        // 自动反色后用户又点回原图，动画尚未结束
        if let Ok(ProcessOutcome::Annotated(annotation)) = &mut entries[0].result {
            annotation.click(&mut page);
        }
        let dir = temp_dir("export-toggled");

        let written = export_inverted(&mut page, &mut entries, &dir).unwrap();

        assert!(written.is_empty());
        assert!(!page.has_class(image, CLASS_INVERTED));
        let _ = fs::remove_dir_all(&dir);
    }
}

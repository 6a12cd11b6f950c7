//! # 扫描报告
//!
//! 把一次整页扫描的结果整理为可序列化的结构，供 CLI 输出 JSON 与摘要行。

use serde::Serialize;

use crate::image_handler::{Classification, ProcessOutcome, ScanConfig, ScanEntry, ToggleState};
use crate::page::{NodeId, StaticPage};

/// 整页扫描报告。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub config: ScanConfig,
    pub annotated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub images: Vec<ImageReport>,
}

/// 单张图片的报告。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageReport {
    /// 在文档顺序中的位置。
    pub index: usize,
    pub src: Option<String>,
    #[serde(flatten)]
    pub outcome: ImageOutcome,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ImageOutcome {
    #[serde(rename_all = "camelCase")]
    Skipped { width: u32, height: u32 },
    #[serde(rename_all = "camelCase")]
    Annotated {
        classification: Classification,
        auto_inverted: bool,
        state: ToggleState,
        tooltip: String,
    },
    #[serde(rename_all = "camelCase")]
    Failed { error: String },
}

impl ScanReport {
    /// 由扫描记录生成报告。
    pub fn from_entries(page: &StaticPage, config: &ScanConfig, entries: &[ScanEntry<NodeId>]) -> Self {
        let images: Vec<ImageReport> = entries
            .iter()
            .enumerate()
            .map(|(index, entry)| ImageReport {
                index,
                src: page.image_src(entry.image).map(str::to_string),
                outcome: match &entry.result {
                    Ok(ProcessOutcome::Skipped { width, height }) => ImageOutcome::Skipped {
                        width: *width,
                        height: *height,
                    },
                    Ok(ProcessOutcome::Annotated(annotation)) => ImageOutcome::Annotated {
                        classification: *annotation.classification(),
                        auto_inverted: annotation.auto_inverted(),
                        state: annotation.state(),
                        tooltip: annotation.tooltip().to_string(),
                    },
                    Err(err) => ImageOutcome::Failed {
                        error: err.to_string(),
                    },
                },
            })
            .collect();

        let count = |pred: fn(&ImageOutcome) -> bool| images.iter().filter(|r| pred(&r.outcome)).count();

        Self {
            config: *config,
            annotated: count(|o| matches!(o, ImageOutcome::Annotated { .. })),
            skipped: count(|o| matches!(o, ImageOutcome::Skipped { .. })),
            failed: count(|o| matches!(o, ImageOutcome::Failed { .. })),
            images,
        }
    }

    /// 每张图片一行的可读摘要。
    pub fn summary_lines(&self) -> Vec<String> {
        self.images
            .iter()
            .map(|image| {
                let name = image.src.as_deref().unwrap_or("<inline>");
                match &image.outcome {
                    ImageOutcome::Skipped { width, height } => {
                        format!("#{} {}: skipped ({}x{})", image.index, name, width, height)
                    }
                    ImageOutcome::Annotated {
                        classification,
                        auto_inverted,
                        ..
                    } => format!(
                        "#{} {}: {} colors={}/{} lightness={:.2} background={:.2}{}",
                        image.index,
                        name,
                        if classification.is_screenshot { "screenshot" } else { "photo" },
                        classification.distinct_colors,
                        classification.distinct_colors_threshold,
                        classification.lightness,
                        classification.background_lightness,
                        if *auto_inverted { " -> inverted" } else { "" }
                    ),
                    ImageOutcome::Failed { error } => {
                        format!("#{} {}: failed ({})", image.index, name, error)
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::WHITE;
    use crate::image_handler::ImageProcessor;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_report_counts_and_json_shape() {
        let mut page = StaticPage::new("body");
        let root = page.root();
        page.set_background(root, "rgb(0, 0, 0)");
        page.add_image(root, RgbaImage::from_pixel(10, 10, WHITE));
        page.add_image(root, RgbaImage::from_pixel(100, 100, WHITE));
        page.add_blocked_image(root, 100, 100, "cross-origin");

        let config = ScanConfig::default();
        let processor = ImageProcessor::new(config).unwrap();
        let entries = processor.scan_document(&mut page);
        let report = ScanReport::from_entries(&page, &config, &entries);

        assert_eq!((report.annotated, report.skipped, report.failed), (1, 1, 1));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["images"][0]["status"], "skipped");
        assert_eq!(json["images"][1]["status"], "annotated");
        assert_eq!(json["images"][1]["autoInverted"], true);
        assert_eq!(json["images"][1]["state"], "animatingToInverted");
        assert_eq!(json["images"][1]["classification"]["isScreenshot"], true);
        assert_eq!(json["images"][2]["status"], "failed");
        assert_eq!(json["images"][2]["error"], "像素读取被拒绝：cross-origin");
        assert_eq!(json["config"]["sampling"], 10);

        let lines = report.summary_lines();
        assert!(lines[1].ends_with("-> inverted"));
        assert!(lines[2].contains("failed"));
    }

    #[test]
    fn test_summary_marks_photo() {
        let mut page = StaticPage::new("body");
        let root = page.root();
        let noisy = RgbaImage::from_fn(200, 100, |x, y| Rgba([x as u8, (y * 2) as u8, 128, 255]));
        page.add_image(root, noisy);

        let config = ScanConfig::default();
        let entries = ImageProcessor::new(config).unwrap().scan_document(&mut page);
        let report = ScanReport::from_entries(&page, &config, &entries);

        assert!(report.summary_lines()[0].contains(": photo "));
    }
}

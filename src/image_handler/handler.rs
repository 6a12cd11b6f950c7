//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `ImageProcessor` 只负责流程编排，不绑定任何具体宿主。
//! 单张图片的处理链路固定为：
//! 1. 读取尺寸，低于下限直接跳过（不做任何页面修改）
//! 2. 采样背景像素（尽早执行，失败可少做无用功）
//! 3. 读取位图并降采样
//! 4. 分类
//! 5. 自动反色决策 + 包裹容器与按钮
//!
//! ## 实现思路
//!
//! - 批量扫描按文档顺序迭代图片快照，每张图片的失败在本层捕获并记录，
//!   不影响后续图片。
//! - 记录 `background/sample/classify/annotate/total` 阶段耗时，便于性能诊断。

use std::time::Instant;

use image::{Rgba, RgbaImage};

use super::annotator::{self, Annotation};
use super::background;
use super::classifier::{self, Classification};
use super::pipeline;
use super::{ConfigError, ImageError, ScanConfig};
use crate::color;
use crate::page::Document;

/// 图片处理器。
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    config: ScanConfig,
}

/// 单张图片的处理结果。
#[derive(Debug, Clone)]
pub enum ProcessOutcome<N> {
    /// 图片过小，未做任何处理。
    Skipped { width: u32, height: u32 },
    /// 已分类并完成标注。
    Annotated(Annotation<N>),
}

/// 批量扫描中的一条记录。
#[derive(Debug)]
pub struct ScanEntry<N> {
    pub image: N,
    pub result: Result<ProcessOutcome<N>, ImageError>,
}

impl ImageProcessor {
    /// 根据配置创建处理器，配置非法时返回错误。
    pub fn new(config: ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// 对一张独立位图分类（不涉及页面），过小时返回 `Ok(None)`。
    ///
    /// `background` 为图片背后的不透明背景像素。
    pub fn classify_bitmap(
        &self,
        bitmap: &RgbaImage,
        background: Rgba<u8>,
    ) -> Result<Option<Classification>, ImageError> {
        let (width, height) = bitmap.dimensions();
        if !pipeline::meets_size_floor(width, height) {
            return Ok(None);
        }
        let sample = self.prepare_sample(bitmap, width, height)?;
        Ok(Some(classifier::classify(&sample, background)))
    }

    /// 处理页面中的一张图片。
    pub fn process_image<D: Document>(
        &self,
        doc: &mut D,
        image: D::Node,
    ) -> Result<ProcessOutcome<D::Node>, ImageError> {
        let total_start = Instant::now();
        let (width, height) = doc.image_dimensions(image);

        if !pipeline::meets_size_floor(width, height) {
            log::debug!("⏭️ 图片 {:?} 过小（{}x{}），跳过", image, width, height);
            return Ok(ProcessOutcome::Skipped { width, height });
        }

        let background_start = Instant::now();
        let background_pixel = background::sample_background(doc, Some(image));
        let background_ms = background_start.elapsed().as_millis();

        let sample_start = Instant::now();
        let bitmap = doc.rasterize(image)?;
        let sample = self.prepare_sample(&bitmap, width, height)?;
        let sample_ms = sample_start.elapsed().as_millis();

        let classify_start = Instant::now();
        let classification = classifier::classify(&sample, background_pixel);
        let classify_ms = classify_start.elapsed().as_millis();

        let annotate_start = Instant::now();
        let annotation = annotator::annotate(doc, image, width, classification, &self.config);
        let annotate_ms = annotate_start.elapsed().as_millis();

        log::info!(
            "☯ 图片 {:?} {}x{}：{}，颜色 {}/{}，亮度 {:.2}，背景亮度 {:.2}{}",
            image,
            width,
            height,
            if classification.is_screenshot { "截图" } else { "照片" },
            classification.distinct_colors,
            classification.distinct_colors_threshold,
            classification.lightness,
            classification.background_lightness,
            if annotation.auto_inverted() { "，已自动反色" } else { "" }
        );
        log::debug!(
            "⏱️ 图片 {:?} 阶段耗时 background={}ms sample={}ms classify={}ms annotate={}ms total={}ms（背景 {:?}，亮度 {:.3}）",
            image,
            background_ms,
            sample_ms,
            classify_ms,
            annotate_ms,
            total_start.elapsed().as_millis(),
            background_pixel,
            color::lightness(background_pixel)
        );

        Ok(ProcessOutcome::Annotated(annotation))
    }

    /// 扫描文档中的全部图片。
    ///
    /// 按文档顺序处理扫描开始时存在的图片；单张失败只记录日志，不中断批量。
    pub fn scan_document<D: Document>(&self, doc: &mut D) -> Vec<ScanEntry<D::Node>> {
        let images = doc.images();
        log::info!("🔍 开始扫描 {} 张图片", images.len());

        let entries: Vec<ScanEntry<D::Node>> = images
            .into_iter()
            .map(|image| {
                let result = self.process_image(doc, image);
                if let Err(err) = &result {
                    log::error!("❌ 图片处理失败 {:?}: {}", image, err);
                }
                ScanEntry { image, result }
            })
            .collect();

        let failed = entries.iter().filter(|e| e.result.is_err()).count();
        log::info!("✅ 扫描完成：共 {} 张，失败 {} 张", entries.len(), failed);
        entries
    }
}

//! # 分类器模块
//!
//! ## 设计思路
//!
//! 截图通常由大块纯色构成，照片则颜色丰富。对采样网格做一次扫描：
//! - 统计量化后不同颜色的数量，判断“截图 / 照片”
//! - 累加 R+G+B，计算平均亮度，判断“暗 / 亮”
//!
//! ## 实现思路
//!
//! - 每个通道取高 6 位（`channel >> 2`），拼成 18 位颜色键，alpha 忽略。
//! - 不同颜色数超过 `round(sampleSize / 10)` 时立即停止扫描并判定为照片。
//!   此时亮度分子只包含停止前扫描过的像素，分母仍是完整采样数，
//!   照片的亮度因此系统性偏暗。这一偏差原样保留。
//! - `scanned_pixels` 记录实际访问的像素数，便于验证提前退出的位置。

use std::collections::HashSet;

use image::{Rgba, RgbaImage};
use serde::Serialize;

use super::ScanConfig;
use super::config::DISTINCT_COLORS_DIVISOR;
use crate::color::{self, MAX_CHANNEL_SUM, round_half_up};

/// 单张图片的分类结果。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub is_screenshot: bool,
    /// 扫描结束时见过的不同量化颜色数。
    pub distinct_colors: u32,
    pub distinct_colors_threshold: u32,
    /// 采样网格像素总数 `sw * sh`。
    pub sample_size: u64,
    /// 实际扫描过的像素数（提前退出时小于 `sample_size`）。
    pub scanned_pixels: u64,
    /// 图片亮度，位于 `[0, 1]`。
    pub lightness: f64,
    /// 背景亮度，位于 `[0, 1]`。
    pub background_lightness: f64,
}

impl Classification {
    pub fn is_image_dark(&self, config: &ScanConfig) -> bool {
        config.is_dark(self.lightness)
    }

    pub fn is_background_dark(&self, config: &ScanConfig) -> bool {
        config.is_dark(self.background_lightness)
    }

    /// 加载时是否自动反色。
    pub fn should_auto_invert(&self, config: &ScanConfig) -> bool {
        should_auto_invert(
            self.is_screenshot,
            self.is_image_dark(config),
            self.is_background_dark(config),
        )
    }
}

/// 自动反色规则：只对截图生效，且图片与背景明暗不一致。
pub fn should_auto_invert(is_screenshot: bool, is_image_dark: bool, is_background_dark: bool) -> bool {
    is_screenshot && (is_image_dark ^ is_background_dark)
}

/// 18 位量化颜色键：每通道取高 6 位。
pub fn quantized_key(r: u8, g: u8, b: u8) -> u32 {
    (((r >> 2) as u32) << 12) | (((g >> 2) as u32) << 6) | ((b >> 2) as u32)
}

/// 不同颜色数阈值：`round(sampleSize / 10)`。
pub fn distinct_colors_threshold(sample_size: u64) -> u32 {
    round_half_up(sample_size as f64 / DISTINCT_COLORS_DIVISOR as f64) as u32
}

/// 扫描采样网格并结合背景像素给出分类结果。
pub fn classify(sample: &RgbaImage, background: Rgba<u8>) -> Classification {
    let (sample_width, sample_height) = sample.dimensions();
    let sample_size = sample_width as u64 * sample_height as u64;
    let threshold = distinct_colors_threshold(sample_size);

    let mut seen: HashSet<u32> = HashSet::new();
    let mut distinct_colors = 0u32;
    let mut is_screenshot = true;
    let mut sample_value = 0u64;
    let mut scanned_pixels = 0u64;

    // 按行优先顺序扫描，与网格内存布局一致
    for pixel in sample.pixels() {
        scanned_pixels += 1;
        let [r, g, b, _] = pixel.0;

        if seen.insert(quantized_key(r, g, b)) {
            distinct_colors += 1;
            if distinct_colors > threshold {
                is_screenshot = false;
                break;
            }
        }

        sample_value += color::channel_sum(*pixel);
    }

    let lightness = if sample_size == 0 {
        0.0
    } else {
        sample_value as f64 / (MAX_CHANNEL_SUM * sample_size as f64)
    };

    Classification {
        is_screenshot,
        distinct_colors,
        distinct_colors_threshold: threshold,
        sample_size,
        scanned_pixels,
        lightness,
        background_lightness: color::lightness(background),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::WHITE;

    /// 第 j 种颜色：三个通道都是 `j * 4`，量化后互不相同。
    fn palette(j: u32) -> Rgba<u8> {
        let v = (j * 4) as u8;
        Rgba([v, v, v, 255])
    }

    /// 10×10 网格：前 `k` 个像素依次使用 k 种颜色，其余像素使用 `fill`。
    fn grid_with_leading_colors(k: u32, fill: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_fn(10, 10, |x, y| {
            let i = y * 10 + x;
            if i < k { palette(i) } else { fill }
        })
    }

    #[test]
    fn test_quantized_key_drops_low_bits() {
        assert_eq!(quantized_key(0, 0, 0), 0);
        assert_eq!(quantized_key(3, 3, 3), 0);
        assert_eq!(quantized_key(4, 0, 0), 1 << 12);
        assert_eq!(quantized_key(255, 255, 255), (1 << 18) - 1);
    }

    #[test]
    fn test_threshold_rounding() {
        assert_eq!(distinct_colors_threshold(49), 5);
        assert_eq!(distinct_colors_threshold(45), 5);
        assert_eq!(distinct_colors_threshold(44), 4);
        assert_eq!(distinct_colors_threshold(100), 10);
    }

    #[test]
    fn test_flat_white_is_light_screenshot() {
        let sample = RgbaImage::from_pixel(10, 10, WHITE);
        let result = classify(&sample, WHITE);

        assert!(result.is_screenshot);
        assert_eq!(result.distinct_colors, 1);
        assert_eq!(result.scanned_pixels, 100);
        assert_eq!(result.lightness, 1.0);
        assert_eq!(result.background_lightness, 1.0);
    }

    #[test]
    fn test_colors_at_threshold_remain_screenshot() {
        // 阈值为 10，正好 10 种颜色
        let sample = grid_with_leading_colors(10, palette(0));
        let result = classify(&sample, WHITE);

        assert_eq!(result.distinct_colors_threshold, 10);
        assert_eq!(result.distinct_colors, 10);
        assert!(result.is_screenshot);
        assert_eq!(result.scanned_pixels, 100);
    }

    #[test]
    fn test_exceeding_threshold_stops_at_offending_pixel() {
        let sample = grid_with_leading_colors(11, WHITE);
        let result = classify(&sample, WHITE);

        assert!(!result.is_screenshot);
        assert_eq!(result.distinct_colors, 11);
        // 第 11 个像素把计数推过阈值
        assert_eq!(result.scanned_pixels, 11);
    }

    #[test]
    fn test_early_exit_biases_lightness_dark() {
        // 只有前 10 个像素计入分子：3 * 4 * (0 + 1 + ... + 9) = 540
        let sample = grid_with_leading_colors(11, WHITE);
        let result = classify(&sample, WHITE);

        let expected = 540.0 / (765.0 * 100.0);
        assert!((result.lightness - expected).abs() < 1e-12);
        assert!(result.is_image_dark(&ScanConfig::default()));
    }

    #[test]
    fn test_alpha_is_ignored() {
        let opaque = RgbaImage::from_pixel(10, 10, Rgba([40, 80, 120, 255]));
        let translucent = RgbaImage::from_pixel(10, 10, Rgba([40, 80, 120, 7]));

        let a = classify(&opaque, WHITE);
        let b = classify(&translucent, WHITE);

        assert_eq!(a.distinct_colors, b.distinct_colors);
        assert_eq!(a.lightness, b.lightness);
    }

    #[test]
    fn test_background_lightness_from_pixel() {
        let sample = RgbaImage::from_pixel(10, 10, WHITE);
        let result = classify(&sample, Rgba([0, 0, 0, 255]));

        assert_eq!(result.background_lightness, 0.0);
        assert!(result.is_background_dark(&ScanConfig::default()));
    }

    #[test]
    fn test_auto_invert_truth_table() {
        let cases = [
            (true, true, true, false),
            (true, true, false, true),
            (true, false, true, true),
            (true, false, false, false),
            (false, true, true, false),
            (false, true, false, false),
            (false, false, true, false),
            (false, false, false, false),
        ];

        for (is_screenshot, image_dark, background_dark, expected) in cases {
            assert_eq!(
                should_auto_invert(is_screenshot, image_dark, background_dark),
                expected,
                "screenshot={} image_dark={} background_dark={}",
                is_screenshot,
                image_dark,
                background_dark
            );
        }
    }
}

//! # 降采样流水线模块
//!
//! ## 设计思路
//!
//! 分类器需要逐像素扫描，因此先把原图缩小到固定预算的小网格。
//! 缩放必须使用最近邻：插值会凭空产生中间色，污染“不同颜色数”的统计。
//!
//! ## 实现思路
//!
//! 1. 按尺寸下限快速拒绝过小图片（`width * height < 4096`）
//! 2. 计算网格尺寸 `round(len / sampling + 0.5)`（四舍五入取“半数向上”）
//! 3. 优先使用 `fast_image_resize` 最近邻缩放，失败时回退 `image::imageops::resize`
//! 4. 完全透明的像素归一化为 `(0, 0, 0, 0)`，与画布读回结果一致

use fast_image_resize as fr;
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Rgba, RgbaImage};

use super::config::MIN_IMAGE_PIXELS;
use super::{ImageError, ImageProcessor};
use crate::color::round_half_up;

/// 图片是否达到处理下限。
pub fn meets_size_floor(width: u32, height: u32) -> bool {
    (width as u64) * (height as u64) >= MIN_IMAGE_PIXELS
}

/// 计算采样网格尺寸 `(sw, sh)`，每个轴至少为 1。
///
/// 公式为 `round(len / sampling + 0.5)`，对整倍数会比向上取整多 1。
pub fn sample_dimensions(width: u32, height: u32, sampling: u32) -> (u32, u32) {
    let sampling = sampling.max(1) as f64;
    let axis = |len: u32| (round_half_up(len as f64 / sampling + 0.5) as u32).max(1);
    (axis(width), axis(height))
}

/// 把位图最近邻缩放到 `sample_width × sample_height`。
pub fn downsample(
    bitmap: &RgbaImage,
    sample_width: u32,
    sample_height: u32,
) -> Result<RgbaImage, ImageError> {
    if sample_width == 0 || sample_height == 0 {
        return Err(ImageError::Resize(format!(
            "采样网格尺寸无效：{}x{}",
            sample_width, sample_height
        )));
    }

    let (width, height) = bitmap.dimensions();
    if width == 0 || height == 0 {
        return Err(ImageError::Decode("位图为空".to_string()));
    }

    let mut sample = match resize_with_fast_image_resize(bitmap, sample_width, sample_height) {
        Ok(resized) => resized,
        Err(err) => {
            log::warn!(
                "⚠️ fast_image_resize 降采样失败，回退 image::imageops::resize：{}",
                err
            );
            imageops::resize(bitmap, sample_width, sample_height, FilterType::Nearest)
        }
    };

    normalize_transparent(&mut sample);
    Ok(sample)
}

fn resize_with_fast_image_resize(
    bitmap: &RgbaImage,
    target_width: u32,
    target_height: u32,
) -> Result<RgbaImage, ImageError> {
    let (src_width, src_height) = bitmap.dimensions();

    let src_image = fr::images::Image::from_vec_u8(
        src_width,
        src_height,
        bitmap.as_raw().clone(),
        fr::PixelType::U8x4,
    )
    .map_err(|e| ImageError::Resize(format!("构建源图像缓冲失败：{}", e)))?;

    let mut dst_image = fr::images::Image::new(target_width, target_height, fr::PixelType::U8x4);

    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Nearest);

    resizer
        .resize(&src_image, &mut dst_image, Some(&options))
        .map_err(|e| ImageError::Resize(format!("fast_image_resize 执行失败：{}", e)))?;

    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(target_width, target_height, dst_image.into_vec())
        .ok_or_else(|| ImageError::Resize("fast_image_resize 输出缓冲长度异常".to_string()))
}

fn normalize_transparent(sample: &mut RgbaImage) {
    for pixel in sample.pixels_mut() {
        if pixel[3] == 0 {
            *pixel = Rgba([0, 0, 0, 0]);
        }
    }
}

impl ImageProcessor {
    /// 按声明尺寸生成采样网格，调用方负责先检查尺寸下限。
    pub(crate) fn prepare_sample(
        &self,
        bitmap: &RgbaImage,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, ImageError> {
        let (sample_width, sample_height) = sample_dimensions(width, height, self.config().sampling);
        let sample = downsample(bitmap, sample_width, sample_height)?;

        log::debug!(
            "🧩 降采样：{}x{} -> {}x{}（sampling={}）",
            width,
            height,
            sample_width,
            sample_height,
            self.config().sampling
        );

        Ok(sample)
    }
}

//! # 配置模块
//!
//! ## 设计思路
//!
//! 启发式只有两个可调参数：采样除数与明暗阈值，集中在 `ScanConfig` 中。
//! 其余数值（最小像素下限、颜色计数除数、CSS 类名）是固定常量，不对外开放。
//!
//! ## 实现思路
//!
//! - `Default` 提供与浏览器脚本一致的取值（10 / 0.75）。
//! - `validate` 在处理器构建前拒绝无意义的参数。
//! - 图片与背景的明暗判断共用 `is_dark`，保证阈值一致。

use serde::{Deserialize, Serialize};

/// 默认采样除数：每个轴缩小约 10 倍后再扫描。
pub const DEFAULT_SAMPLING: u32 = 10;

/// 默认明暗阈值：亮度低于该值视为“暗”。
pub const DEFAULT_LIGHTNESS_THRESHOLD: f64 = 0.75;

/// 处理下限：`width * height` 小于该值的图片直接跳过（64×64）。
pub const MIN_IMAGE_PIXELS: u64 = 64 * 64;

/// 颜色计数阈值 = 采样点数 / 该除数（四舍五入）。
pub const DISTINCT_COLORS_DIVISOR: u64 = 10;

/// 图片处于反色终态时的类名。
pub const CLASS_INVERTED: &str = "yin-yang-inverted";
/// 正在过渡到反色的动画类名。
pub const CLASS_ANIM_TO_INVERTED: &str = "yin-yang-anim-to-inverted";
/// 正在过渡回原图的动画类名。
pub const CLASS_ANIM_TO_ORIGINAL: &str = "yin-yang-anim-to-original";
/// 包裹图片与按钮的容器类名。
pub const CLASS_CONTAINER: &str = "yin-yang-img-container";
/// 手动切换按钮类名。
pub const CLASS_TOGGLE_BUTTON: &str = "yin-yang-toggle-button";
/// 按钮点击后的旋转动画类名。
pub const CLASS_ANIM_ROTATE: &str = "yin-yang-anim-rotate";

/// 按钮显示的字符。
pub const TOGGLE_BUTTON_GLYPH: &str = "☯";

/// 配置取值非法。
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("配置错误：{0}")]
pub struct ConfigError(pub String);

/// 扫描配置。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScanConfig {
    /// 采样除数，控制降采样力度。
    pub sampling: u32,
    /// 明暗阈值，图片与背景共用。
    pub lightness_threshold: f64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            sampling: DEFAULT_SAMPLING,
            lightness_threshold: DEFAULT_LIGHTNESS_THRESHOLD,
        }
    }
}

impl ScanConfig {
    /// 校验参数取值范围。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sampling == 0 {
            return Err(ConfigError("sampling 必须大于 0".to_string()));
        }

        if !(self.lightness_threshold > 0.0 && self.lightness_threshold <= 1.0) {
            return Err(ConfigError(format!(
                "lightness_threshold 必须位于 (0, 1]：{}",
                self.lightness_threshold
            )));
        }

        Ok(())
    }

    /// 亮度是否属于“暗”。
    pub fn is_dark(&self, lightness: f64) -> bool {
        lightness < self.lightness_threshold
    }
}

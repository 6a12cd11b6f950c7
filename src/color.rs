//! # 颜色工具模块
//!
//! ## 设计思路
//!
//! 页面背景色以 CSS 计算样式字符串的形式给出（如 `rgba(0, 0, 0, 0)`），
//! 图片像素则是 8 位 RGBA。本模块把两者统一到 `image::Rgba<u8>`：
//! - 解析 CSS 颜色值（函数式 `rgb()/rgba()`、十六进制、基础命名色）
//! - 按“source-over”语义合成两个像素
//! - 计算亮度（R+G+B 之和归一化到 `[0, 1]`）
//!
//! ## 实现思路
//!
//! - 正则通过 `once_cell::sync::Lazy` 首次使用时编译，后续复用。
//! - 每次合成后立即量化回 8 位，与逐层绘制到画布的效果一致。

use image::Rgba;
use once_cell::sync::Lazy;
use regex::Regex;

/// 不透明白色，背景合成的起始底色。
pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// 全透明像素。
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// 单像素 R+G+B 的最大值（3 × 255）。
pub const MAX_CHANNEL_SUM: f64 = 765.0;

/// 半数向上取整：`floor(x + 0.5)`。
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

static FUNCTIONAL_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*rgba?\(\s*(.*?)\s*\)\s*$").unwrap());

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^\s*#([0-9a-f]+)\s*$").unwrap());

/// 解析 CSS 颜色值。
///
/// 支持的形式：
/// - `rgb(r, g, b)` / `rgba(r, g, b, a)`，逗号或空格分隔，也支持 `rgb(r g b / a)`
/// - 通道可为数字或百分比，alpha 可为 `0..1` 小数或百分比
/// - `#rgb`、`#rgba`、`#rrggbb`、`#rrggbbaa`
/// - `transparent` 与 CSS 基础命名色
///
/// 无法识别时返回 `None`，由调用方决定如何处理。
pub fn parse_css_color(value: &str) -> Option<Rgba<u8>> {
    if let Some(caps) = FUNCTIONAL_COLOR.captures(value) {
        return parse_functional_args(caps.get(1)?.as_str());
    }

    if let Some(caps) = HEX_COLOR.captures(value) {
        return parse_hex_digits(caps.get(1)?.as_str());
    }

    named_color(value.trim())
}

fn parse_functional_args(args: &str) -> Option<Rgba<u8>> {
    let normalized = args.replace([',', '/'], " ");
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    if tokens.len() != 3 && tokens.len() != 4 {
        return None;
    }

    let r = parse_channel(tokens[0])?;
    let g = parse_channel(tokens[1])?;
    let b = parse_channel(tokens[2])?;
    let a = match tokens.get(3) {
        Some(token) => parse_alpha(token)?,
        None => 255,
    };

    Some(Rgba([r, g, b, a]))
}

fn parse_channel(token: &str) -> Option<u8> {
    let value = match token.strip_suffix('%') {
        Some(percent) => percent.parse::<f64>().ok()? * 255.0 / 100.0,
        None => token.parse::<f64>().ok()?,
    };
    if !value.is_finite() {
        return None;
    }
    Some(value.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha(token: &str) -> Option<u8> {
    let value = match token.strip_suffix('%') {
        Some(percent) => percent.parse::<f64>().ok()? / 100.0,
        None => token.parse::<f64>().ok()?,
    };
    if !value.is_finite() {
        return None;
    }
    Some((value.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn parse_hex_digits(digits: &str) -> Option<Rgba<u8>> {
    let nibble = |i: usize| u8::from_str_radix(&digits[i..i + 1], 16).ok();
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();

    match digits.len() {
        3 => Some(Rgba([nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17, 255])),
        4 => Some(Rgba([
            nibble(0)? * 17,
            nibble(1)? * 17,
            nibble(2)? * 17,
            nibble(3)? * 17,
        ])),
        6 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, 255])),
        8 => Some(Rgba([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Rgba<u8>> {
    let rgb = match name.to_ascii_lowercase().as_str() {
        "transparent" => return Some(TRANSPARENT),
        "black" => [0, 0, 0],
        "silver" => [192, 192, 192],
        "gray" | "grey" => [128, 128, 128],
        "white" => [255, 255, 255],
        "maroon" => [128, 0, 0],
        "red" => [255, 0, 0],
        "purple" => [128, 0, 128],
        "fuchsia" => [255, 0, 255],
        "green" => [0, 128, 0],
        "lime" => [0, 255, 0],
        "olive" => [128, 128, 0],
        "yellow" => [255, 255, 0],
        "navy" => [0, 0, 128],
        "blue" => [0, 0, 255],
        "teal" => [0, 128, 128],
        "aqua" => [0, 255, 255],
        "orange" => [255, 165, 0],
        _ => return None,
    };
    Some(Rgba([rgb[0], rgb[1], rgb[2], 255]))
}

/// 将 `src` 以 source-over 方式叠加到 `dst` 上，结果量化为 8 位。
pub fn composite_over(dst: Rgba<u8>, src: Rgba<u8>) -> Rgba<u8> {
    let sa = src[3] as f64 / 255.0;
    let da = dst[3] as f64 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return TRANSPARENT;
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let value = (src[c] as f64 * sa + dst[c] as f64 * da * (1.0 - sa)) / out_a;
        out[c] = value.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba(out)
}

/// 单像素亮度：`(R + G + B) / 765`，alpha 不参与计算。
pub fn lightness(pixel: Rgba<u8>) -> f64 {
    channel_sum(pixel) as f64 / MAX_CHANNEL_SUM
}

/// 单像素 R+G+B 之和。
pub fn channel_sum(pixel: Rgba<u8>) -> u64 {
    pixel[0] as u64 + pixel[1] as u64 + pixel[2] as u64
}

//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 单张图片处理中的所有失败都归为同一类“图片处理失败”，
//! 由批量扫描在单图边界捕获、记录日志后继续处理下一张。
//! 通过 `thiserror` 保持可读错误，同时保留具体原因分支供调用侧匹配。

/// 图片处理统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// 宿主拒绝读取像素（典型场景：跨域图片污染画布）。
    #[error("像素读取被拒绝：{0}")]
    PixelAccess(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("降采样错误：{0}")]
    Resize(String),
}

//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 单张图片的失败由 `ImageError` 表示并在扫描边界消化；
//! 除此之外的失败（读清单、读配置、写报告）属于整次运行，统一为 `AppError`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `ImageError`、`std::io::Error` 提供 `From` 转换，无需手动 map。
//! - 配置校验失败使用独立的 `ConfigError`，不混入单图处理错误。

use crate::image_handler::ImageError;
use crate::image_handler::config::ConfigError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图片处理错误
    #[error("{0}")]
    Image(#[from] ImageError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 页面清单无效
    #[error("页面清单错误: {0}")]
    Manifest(String),

    /// 配置文件无法解析
    #[error("配置文件错误: {0}")]
    Settings(String),

    /// 配置取值非法
    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    /// 报告或导出写入失败
    #[error("输出错误: {0}")]
    Output(String),
}

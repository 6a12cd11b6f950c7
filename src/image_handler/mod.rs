//! # 图片处理模块（image_handler）
//!
//! ## 设计思路
//!
//! 该模块把“背景采样 → 降采样 → 分类 → 反色决策与标注”按职责拆分为多个子模块，
//! 每张图片独立处理，互不共享可变状态。
//!
//! - `config`：两个可调参数与固定常量
//! - `error`：单图处理错误
//! - `background`：沿祖先链合成背景像素
//! - `pipeline`：尺寸下限与最近邻降采样
//! - `classifier`：截图/照片、明暗判断
//! - `toggle`：反色切换状态机
//! - `annotator`：自动反色决策、容器与按钮
//! - `handler`：编排单张图片与整页扫描
//!
//! ## 新同事快速上手
//!
//! ```text
//! ImageProcessor::scan_document
//!    ↓ 逐张（失败记录日志后继续）
//! ImageProcessor::process_image
//!    ├─ pipeline::meets_size_floor（过小直接跳过）
//!    ├─ background::sample_background
//!    ├─ Document::rasterize + pipeline::downsample
//!    ├─ classifier::classify
//!    └─ annotator::annotate（toggle 状态机 + 容器/按钮）
//!    ↓
//! ScanEntry { image, result }
//! ```

pub mod annotator;
pub mod background;
pub mod classifier;
pub mod config;
mod error;
mod handler;
pub mod pipeline;
pub mod toggle;

pub use annotator::Annotation;
pub use classifier::Classification;
pub use config::{ConfigError, ScanConfig};
pub use error::ImageError;
pub use handler::{ImageProcessor, ProcessOutcome, ScanEntry};
pub use toggle::{Completion, InvertToggle, ToggleState};

//! # Yin-Yang 暗色页面截图自动反色 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │            宿主页面（浏览器 DOM / 内存 StaticPage）         │
//! │                                                          │
//! │   page::Document trait                                   │
//! │   图片枚举 · 祖先链 · 背景色 · 像素读取 · 类名/父子关系       │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            image_handler                         │
//! │                                                          │
//! │  ┌─ background ── 祖先链背景合成（白色底色 + source-over）   │
//! │  ├─ pipeline ──── 尺寸下限 + 最近邻降采样                  │
//! │  ├─ classifier ── 量化颜色计数 + 平均亮度                  │
//! │  ├─ toggle ────── 四状态反色切换状态机                     │
//! │  ├─ annotator ─── 自动反色决策 + 容器/按钮/诊断提示          │
//! │  └─ handler ───── 单图编排 + 整页扫描（单图失败不中断）       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`commands`] | CLI 子命令的实现：整页扫描、反色导出、单图分类 |
//! | [`color`] | CSS 颜色解析、像素合成、亮度计算 |
//! | [`page`] | 宿主页面抽象 `Document` 与内存实现 `StaticPage` |
//! | [`image_handler`] | 采样、分类、反色决策与标注的完整流水线 |
//! | [`error`] | 应用级错误类型 `AppError` |
//! | [`settings`] | 扫描配置文件读写 |
//! | [`report`] | 可序列化的扫描报告 |

pub mod color;
pub mod commands;
pub mod error;
pub mod image_handler;
pub mod page;
pub mod report;
pub mod settings;

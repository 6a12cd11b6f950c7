//! # 反色切换状态机
//!
//! ## 设计思路
//!
//! 每张图片拥有一个独立的 `InvertToggle`，用显式状态替代闭包捕获：
//!
//! ```text
//!            turn_invert_on                 动画结束
//! Original ───────────────▶ AnimatingToInverted ─────────▶ Inverted
//!    ▲                            │ ▲                          │
//!    │ 动画结束      turn_invert_off│ │turn_invert_on            │ turn_invert_off
//!    │                            ▼ │                          ▼
//!    └──────────────────── AnimatingToOriginal ◀───────────────┘
//! ```
//!
//! 逻辑开关 `invert_filter_on` 在过渡开始时立即翻转，而不是等动画结束。
//!
//! ## 实现思路
//!
//! - 视觉效果完全由图片上的类名驱动，状态机只负责增删类名。
//! - “动画结束”回调以 `Completion` 列表表示：注册时按函数去重（同一回调不会重复注册），
//!   触发时按注册顺序依次执行并自行注销。
//! - 快速连续切换时，旧方向的回调不会被取消，两个方向的回调可能同时存在，
//!   最终表现以最后执行的回调为准。该行为与浏览器端一致，测试中显式覆盖。

use serde::Serialize;

use super::config::{CLASS_ANIM_TO_INVERTED, CLASS_ANIM_TO_ORIGINAL, CLASS_INVERTED};
use crate::page::Document;

/// 切换状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleState {
    Original,
    AnimatingToInverted,
    Inverted,
    AnimatingToOriginal,
}

/// 已注册、等待动画结束时执行的回调。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// 添加反色终态类名。
    SetInverted,
    /// 移除反色终态类名。
    SetOriginal,
}

/// 单张图片的反色开关。
#[derive(Debug, Clone)]
pub struct InvertToggle<N> {
    image: N,
    invert_filter_on: bool,
    state: ToggleState,
    pending: Vec<Completion>,
}

impl<N: Copy + std::fmt::Debug> InvertToggle<N> {
    pub fn new(image: N) -> Self {
        Self {
            image,
            invert_filter_on: false,
            state: ToggleState::Original,
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> ToggleState {
        self.state
    }

    /// 逻辑开关（过渡开始即翻转）。
    pub fn is_on(&self) -> bool {
        self.invert_filter_on
    }

    /// 当前已注册、尚未触发的回调。
    pub fn pending_completions(&self) -> &[Completion] {
        &self.pending
    }

    /// 开始过渡到反色。
    pub fn turn_invert_on<D: Document<Node = N>>(&mut self, doc: &mut D) {
        doc.remove_class(self.image, CLASS_ANIM_TO_ORIGINAL);
        doc.add_class(self.image, CLASS_ANIM_TO_INVERTED);
        self.register(Completion::SetInverted);
        self.invert_filter_on = true;
        self.state = ToggleState::AnimatingToInverted;
        log::debug!("☯ 图片 {:?} 开始反色过渡", self.image);
    }

    /// 开始过渡回原图。
    pub fn turn_invert_off<D: Document<Node = N>>(&mut self, doc: &mut D) {
        doc.remove_class(self.image, CLASS_INVERTED);
        doc.remove_class(self.image, CLASS_ANIM_TO_INVERTED);
        doc.add_class(self.image, CLASS_ANIM_TO_ORIGINAL);
        self.register(Completion::SetOriginal);
        self.invert_filter_on = false;
        self.state = ToggleState::AnimatingToOriginal;
        log::debug!("☯ 图片 {:?} 开始恢复原图过渡", self.image);
    }

    /// 按逻辑开关切换方向。
    pub fn toggle_invert<D: Document<Node = N>>(&mut self, doc: &mut D) {
        if self.invert_filter_on {
            self.turn_invert_off(doc);
        } else {
            self.turn_invert_on(doc);
        }
    }

    /// 图片的过渡动画结束：按注册顺序执行并注销全部回调。
    pub fn on_animation_end<D: Document<Node = N>>(&mut self, doc: &mut D) {
        for completion in std::mem::take(&mut self.pending) {
            match completion {
                Completion::SetInverted => {
                    doc.add_class(self.image, CLASS_INVERTED);
                    self.state = ToggleState::Inverted;
                }
                Completion::SetOriginal => {
                    doc.remove_class(self.image, CLASS_INVERTED);
                    self.state = ToggleState::Original;
                }
            }
        }
    }

    fn register(&mut self, completion: Completion) {
        if !self.pending.contains(&completion) {
            self.pending.push(completion);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{NodeId, StaticPage};
    use image::{Rgba, RgbaImage};

    fn page_with_image() -> (StaticPage, NodeId) {
        let mut page = StaticPage::new("body");
        let root = page.root();
        let image = page.add_image(root, RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])));
        (page, image)
    }

    #[test]
    fn test_initial_state_is_original() {
        let (_, image) = page_with_image();
        let toggle = InvertToggle::new(image);

        assert_eq!(toggle.state(), ToggleState::Original);
        assert!(!toggle.is_on());
        assert!(toggle.pending_completions().is_empty());
    }

    #[test]
    fn test_turn_on_then_complete() {
        let (mut page, image) = page_with_image();
        let mut toggle = InvertToggle::new(image);

        toggle.turn_invert_on(&mut page);
        assert_eq!(toggle.state(), ToggleState::AnimatingToInverted);
        assert!(toggle.is_on());
        assert!(page.has_class(image, CLASS_ANIM_TO_INVERTED));
        assert!(!page.has_class(image, CLASS_INVERTED));

        toggle.on_animation_end(&mut page);
        assert_eq!(toggle.state(), ToggleState::Inverted);
        assert!(page.has_class(image, CLASS_INVERTED));
        assert!(toggle.pending_completions().is_empty());
    }

    #[test]
    fn test_turn_off_from_inverted() {
        let (mut page, image) = page_with_image();
        let mut toggle = InvertToggle::new(image);
        toggle.turn_invert_on(&mut page);
        toggle.on_animation_end(&mut page);

        toggle.turn_invert_off(&mut page);
        assert_eq!(toggle.state(), ToggleState::AnimatingToOriginal);
        assert!(!toggle.is_on());
        assert!(!page.has_class(image, CLASS_INVERTED));
        assert!(!page.has_class(image, CLASS_ANIM_TO_INVERTED));
        assert!(page.has_class(image, CLASS_ANIM_TO_ORIGINAL));

        toggle.on_animation_end(&mut page);
        assert_eq!(toggle.state(), ToggleState::Original);
        assert!(!page.has_class(image, CLASS_INVERTED));
    }

    #[test]
    fn test_toggle_dispatches_on_flag() {
        let (mut page, image) = page_with_image();
        let mut toggle = InvertToggle::new(image);

        toggle.toggle_invert(&mut page);
        assert!(toggle.is_on());
        toggle.on_animation_end(&mut page);

        toggle.toggle_invert(&mut page);
        assert!(!toggle.is_on());
        toggle.on_animation_end(&mut page);
        assert_eq!(toggle.state(), ToggleState::Original);
    }

    #[test]
    fn test_rapid_toggle_leaves_both_completions_registered() {
        let (mut page, image) = page_with_image();
        let mut toggle = InvertToggle::new(image);

        toggle.toggle_invert(&mut page);
        toggle.toggle_invert(&mut page);

        assert_eq!(
            toggle.pending_completions(),
            &[Completion::SetInverted, Completion::SetOriginal]
        );

        // 两个回调都会执行，后注册的 SetOriginal 决定最终外观
        toggle.on_animation_end(&mut page);
        assert_eq!(toggle.state(), ToggleState::Original);
        assert!(!page.has_class(image, CLASS_INVERTED));
        assert!(toggle.pending_completions().is_empty());
    }

    #[test]
    fn test_stale_completion_desyncs_flag_and_appearance() {
        let (mut page, image) = page_with_image();
        let mut toggle = InvertToggle::new(image);

        // on -> off -> on，动画都未结束；同一回调不会重复注册
        toggle.toggle_invert(&mut page);
        toggle.toggle_invert(&mut page);
        toggle.toggle_invert(&mut page);
        assert!(toggle.is_on());
        assert_eq!(
            toggle.pending_completions(),
            &[Completion::SetInverted, Completion::SetOriginal]
        );

        toggle.on_animation_end(&mut page);
        assert!(toggle.is_on());
        assert_eq!(toggle.state(), ToggleState::Original);
        assert!(!page.has_class(image, CLASS_INVERTED));
    }

    #[test]
    fn test_animation_end_without_pending_is_noop() {
        let (mut page, image) = page_with_image();
        let mut toggle = InvertToggle::new(image);
        let before = page.mutation_count();

        toggle.on_animation_end(&mut page);

        assert_eq!(page.mutation_count(), before);
        assert_eq!(toggle.state(), ToggleState::Original);
    }
}

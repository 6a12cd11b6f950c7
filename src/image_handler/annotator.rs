//! # 决策与标注模块
//!
//! ## 设计思路
//!
//! 分类完成后，对每张达标图片做两件事：
//! 1. 按自动反色规则决定是否立即开始反色过渡
//! 2. 无论是否反色，都用容器包裹图片并附加一个手动切换按钮，
//!    按钮悬停提示中给出诊断信息，便于用户纠正误判
//!
//! ## 实现思路
//!
//! - 顺序与浏览器脚本一致：先自动反色，再创建容器与按钮，最后调整父子关系。
//! - `Annotation` 是每张图片独立持有的状态对象，宿主事件循环把点击与
//!   动画结束事件转发给它即可，不存在跨图片共享的可变状态。
//! - 标注过程不保证原子性：中途失败不会回滚已做的修改。

use super::ScanConfig;
use super::classifier::Classification;
use super::config::{
    CLASS_ANIM_ROTATE, CLASS_CONTAINER, CLASS_TOGGLE_BUTTON, TOGGLE_BUTTON_GLYPH,
};
use super::toggle::{InvertToggle, ToggleState};
use crate::page::Document;

/// 单张图片标注后的状态对象。
#[derive(Debug, Clone)]
pub struct Annotation<N> {
    image: N,
    container: N,
    button: N,
    classification: Classification,
    auto_inverted: bool,
    tooltip: String,
    toggle: InvertToggle<N>,
}

impl<N: Copy + std::fmt::Debug> Annotation<N> {
    pub fn image(&self) -> N {
        self.image
    }

    pub fn container(&self) -> N {
        self.container
    }

    pub fn button(&self) -> N {
        self.button
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    /// 加载时是否触发了自动反色。
    pub fn auto_inverted(&self) -> bool {
        self.auto_inverted
    }

    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    pub fn toggle(&self) -> &InvertToggle<N> {
        &self.toggle
    }

    pub fn state(&self) -> ToggleState {
        self.toggle.state()
    }

    /// 按钮点击：切换反色方向，并播放按钮旋转动画。
    pub fn click<D: Document<Node = N>>(&mut self, doc: &mut D) {
        self.toggle.toggle_invert(doc);
        doc.add_class(self.button, CLASS_ANIM_ROTATE);
    }

    /// 图片过渡动画结束。
    pub fn image_animation_end<D: Document<Node = N>>(&mut self, doc: &mut D) {
        self.toggle.on_animation_end(doc);
    }

    /// 按钮旋转动画结束。
    pub fn button_animation_end<D: Document<Node = N>>(&mut self, doc: &mut D) {
        doc.remove_class(self.button, CLASS_ANIM_ROTATE);
    }
}

/// 生成按钮悬停提示文本。
pub fn tooltip_text(classification: &Classification, sampling: u32) -> String {
    let verdict = if classification.is_screenshot {
        "✓ A screenshot!"
    } else {
        "❌ A photo?"
    };

    format!(
        "{verdict}\nsampling={sampling};\ndistinctColors={}/{};\nlightness={:.2};\nbackgroundLightness={:.2}\n\nClick to toggle invert.",
        classification.distinct_colors,
        classification.distinct_colors_threshold,
        classification.lightness,
        classification.background_lightness,
    )
}

/// 对已分类的图片执行自动反色决策并挂载容器与按钮。
pub(crate) fn annotate<D: Document>(
    doc: &mut D,
    image: D::Node,
    width: u32,
    classification: Classification,
    config: &ScanConfig,
) -> Annotation<D::Node> {
    let mut toggle = InvertToggle::new(image);
    let auto_inverted = classification.should_auto_invert(config);
    if auto_inverted {
        toggle.turn_invert_on(doc);
    }

    let container = doc.create_element("div");
    doc.add_class(container, CLASS_CONTAINER);
    doc.set_attribute(container, "style", &format!("width: {}px", width));

    let tooltip = tooltip_text(&classification, config.sampling);
    let button = doc.create_element("span");
    doc.add_class(button, CLASS_TOGGLE_BUTTON);
    doc.set_attribute(button, "title", &tooltip);
    doc.set_text(button, TOGGLE_BUTTON_GLYPH);

    doc.insert_before(container, image);
    doc.append_child(container, image);
    doc.append_child(container, button);

    Annotation {
        image,
        container,
        button,
        classification,
        auto_inverted,
        tooltip,
        toggle,
    }
}

//! # Dialogue 模块
//!
//! 对话立绘：把消息中的控制字符转换为两个槽位的显示指令，
//! 并在每帧推进槽位动画、维护聚焦色调。

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::control_code::{SlotDirective, parse_message};
use crate::error::LoadError;
use crate::motion::{Motion, MotionPlayer};
use crate::renderer::{ImageSize, Renderer, Tone};
use crate::slot::{SlotId, SlotStateMachine, StandingPicture};
use crate::transition::TransitionKind;

/// 按 ID 索引的立绘列表
#[derive(Debug, Clone, Default)]
pub struct PictureCatalog {
    by_id: BTreeMap<u32, StandingPicture>,
}

impl PictureCatalog {
    /// 构建列表，重复 ID 以第一次定义为准
    pub fn new(pictures: Vec<StandingPicture>) -> Self {
        let mut by_id = BTreeMap::new();
        for picture in pictures {
            if by_id.contains_key(&picture.id) {
                warn!(id = picture.id, image = %picture.image, "立绘 ID 重复，忽略后续定义");
                continue;
            }
            by_id.insert(picture.id, picture);
        }
        Self { by_id }
    }

    pub fn get(&self, id: u32) -> Option<&StandingPicture> {
        self.by_id.get(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// 对话立绘舞台（两个槽位 + 聚焦状态）
#[derive(Debug, Clone)]
pub struct DialogueStage {
    catalog: PictureCatalog,
    primary: SlotStateMachine,
    secondary: SlotStateMachine,
    focus: Option<SlotId>,
    /// 非聚焦槽位的 RGB 偏移
    focus_tone_adjust: i32,
}

impl DialogueStage {
    pub fn new(
        catalog: PictureCatalog,
        transition: TransitionKind,
        transition2: TransitionKind,
        player: MotionPlayer,
        focus_tone_adjust: i32,
    ) -> Self {
        Self {
            catalog,
            primary: SlotStateMachine::new(SlotId::Primary, transition, player),
            secondary: SlotStateMachine::new(SlotId::Secondary, transition2, player),
            focus: None,
            focus_tone_adjust,
        }
    }

    pub fn catalog(&self) -> &PictureCatalog {
        &self.catalog
    }

    pub fn slot(&self, id: SlotId) -> &SlotStateMachine {
        match id {
            SlotId::Primary => &self.primary,
            SlotId::Secondary => &self.secondary,
        }
    }

    fn slot_mut(&mut self, id: SlotId) -> &mut SlotStateMachine {
        match id {
            SlotId::Primary => &mut self.primary,
            SlotId::Secondary => &mut self.secondary,
        }
    }

    pub fn focus(&self) -> Option<SlotId> {
        self.focus
    }

    /// 消息开始：解析控制字符，更新槽位，返回移除控制字符后的文本
    pub fn on_message_start(&mut self, text: &str, renderer: &mut dyn Renderer) -> String {
        let message = parse_message(text);
        self.apply_directive(SlotId::Primary, message.directives.primary, renderer);
        self.apply_directive(SlotId::Secondary, message.directives.secondary, renderer);
        self.focus = message.directives.focus;
        message.text
    }

    fn apply_directive(
        &mut self,
        id: SlotId,
        directive: Option<SlotDirective>,
        renderer: &mut dyn Renderer,
    ) {
        let Some(directive) = directive else {
            self.slot_mut(id).clear();
            return;
        };

        // 无法解析的 ID 等同于未指定
        let Some(picture) = self.catalog.get(directive.picture_id).cloned() else {
            warn!(slot = ?id, id = directive.picture_id, "立绘 ID 未定义，槽位淡出");
            self.slot_mut(id).clear();
            return;
        };

        let motion = Motion::parse(directive.motion.as_deref().unwrap_or("none"));
        if let Some(name) = &directive.motion
            && motion == Motion::None
            && name != "none"
        {
            debug!(slot = ?id, motion = %name, "未知的动作名，视为 none");
        }
        self.slot_mut(id).show(picture, motion, renderer);
    }

    /// 消息窗口关闭：两个槽位都淡出
    pub fn on_message_window_closed(&mut self) {
        self.primary.clear();
        self.secondary.clear();
        self.focus = None;
    }

    /// 场景重建：槽位恢复初始状态
    pub fn on_scene_enter(&mut self) {
        self.primary.reset();
        self.secondary.reset();
        self.focus = None;
    }

    /// 槽位应使用的色调：基础色调，非聚焦槽位叠加偏移
    pub fn tone_for(&self, id: SlotId, base: Tone) -> Tone {
        if self.focus == Some(id.other()) {
            base.offset_rgb(self.focus_tone_adjust)
        } else {
            base
        }
    }

    /// 图片加载回调
    pub fn on_image_loaded(
        &mut self,
        id: SlotId,
        image: &str,
        result: Result<ImageSize, LoadError>,
        base: Tone,
        renderer: &mut dyn Renderer,
    ) -> bool {
        let tone = self.tone_for(id, base);
        self.slot_mut(id).on_image_loaded(image, result, tone, renderer)
    }

    /// 推进一帧
    ///
    /// `enabled == false` 时两个槽位保持透明，动画冻结。
    pub fn tick(&mut self, base: Tone, enabled: bool, renderer: &mut dyn Renderer) {
        for id in [SlotId::Primary, SlotId::Secondary] {
            let tone = self.tone_for(id, base);
            let slot = self.slot_mut(id);
            if enabled {
                slot.tick(renderer);
                slot.apply_tone(tone, renderer);
            } else {
                slot.suppress(renderer);
            }
        }
    }
}

//! # Overlay 模块
//!
//! 立绘系统的上下文对象，宿主适配层唯一需要持有的类型。
//!
//! 持有对话立绘的两个槽位、战斗立绘的显示记录和运行时设置。
//! 宿主在对应的生命周期点调用 `on_*` 回调：
//!
//! | 回调 | 时机 |
//! |------|------|
//! | [`Overlay::on_frame_tick`] | 每帧一次 |
//! | [`Overlay::on_scene_enter`] | 场景重建精灵后 |
//! | [`Overlay::on_message_start`] | 消息开始显示前 |
//! | [`Overlay::on_message_window_closed`] | 消息窗口关闭完成 |
//! | [`Overlay::on_image_loaded`] | 宿主完成一次图片加载 |
//! | [`Overlay::on_battle_start`] / [`Overlay::on_battle_end`] | 战斗开始/结束 |

use tracing::{info, warn};

use crate::battle::BattleStage;
use crate::dialogue::{DialogueStage, PictureCatalog};
use crate::error::{LoadError, StandResult, ToneError};
use crate::game_state::{ActorId, GameState};
use crate::motion::{DEFAULT_MOTION_BOUND, MotionPlayer};
use crate::pattern::{Pattern, PatternBook};
use crate::renderer::{ImageSize, RenderTarget, Renderer, Tone};
use crate::slot::StandingPicture;
use crate::transition::TransitionKind;

/// 非聚焦槽位的默认 RGB 偏移
pub const DEFAULT_FOCUS_TONE_ADJUST: i32 = -96;

/// 运行时设置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySettings {
    /// 立绘 1 的切换效果
    pub transition: TransitionKind,
    /// 立绘 2 的切换效果
    pub transition2: TransitionKind,
    /// 初始是否启用
    pub enabled: bool,
    pub focus_tone_adjust: i32,
    /// 跑动动作的屏幕边界
    pub motion_bound: f32,
}

impl Default for OverlaySettings {
    fn default() -> Self {
        Self {
            transition: TransitionKind::Fade,
            transition2: TransitionKind::Fade,
            enabled: true,
            focus_tone_adjust: DEFAULT_FOCUS_TONE_ADJUST,
            motion_bound: DEFAULT_MOTION_BOUND,
        }
    }
}

/// 立绘系统上下文
#[derive(Debug, Clone)]
pub struct Overlay {
    dialogue: DialogueStage,
    battle: BattleStage,
    enabled: bool,
    tone: Tone,
}

impl Overlay {
    pub fn new(
        settings: OverlaySettings,
        pictures: Vec<StandingPicture>,
        patterns: Vec<Pattern>,
    ) -> Self {
        let player = MotionPlayer::new(settings.motion_bound);
        let catalog = PictureCatalog::new(pictures);
        let book = PatternBook::new(patterns);
        info!(
            pictures = catalog.len(),
            patterns = book.len(),
            "立绘系统初始化"
        );

        Self {
            dialogue: DialogueStage::new(
                catalog,
                settings.transition,
                settings.transition2,
                player,
                settings.focus_tone_adjust,
            ),
            battle: BattleStage::new(book),
            enabled: settings.enabled,
            tone: Tone::NEUTRAL,
        }
    }

    pub fn dialogue(&self) -> &DialogueStage {
        &self.dialogue
    }

    pub fn battle(&self) -> &BattleStage {
        &self.battle
    }

    /// 每帧推进
    pub fn on_frame_tick(&mut self, state: &dyn GameState, renderer: &mut dyn Renderer) {
        self.dialogue.tick(self.tone, self.enabled, renderer);
        self.battle.tick(state, renderer);
    }

    /// 场景重建：对话槽位回到初始状态
    pub fn on_scene_enter(&mut self) {
        self.dialogue.on_scene_enter();
    }

    /// 消息开始，返回移除控制字符后的文本
    pub fn on_message_start(&mut self, text: &str, renderer: &mut dyn Renderer) -> String {
        self.dialogue.on_message_start(text, renderer)
    }

    pub fn on_message_window_closed(&mut self) {
        self.dialogue.on_message_window_closed();
    }

    /// 图片加载回调
    ///
    /// 只有对话槽位的加载需要回报；返回 `false` 表示结果被忽略。
    pub fn on_image_loaded(
        &mut self,
        target: RenderTarget,
        image: &str,
        result: Result<ImageSize, LoadError>,
        renderer: &mut dyn Renderer,
    ) -> bool {
        match target {
            RenderTarget::Slot(id) => {
                self.dialogue
                    .on_image_loaded(id, image, result, self.tone, renderer)
            }
            RenderTarget::Picture(_) => false,
        }
    }

    pub fn on_battle_start(
        &mut self,
        party: &[ActorId],
        state: &dyn GameState,
        renderer: &mut dyn Renderer,
    ) {
        self.battle.on_battle_start(party, state, renderer);
    }

    pub fn on_battle_end(&mut self, renderer: &mut dyn Renderer) {
        self.battle.on_battle_end(renderer);
    }

    /// 启用/禁用对话立绘
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            info!(enabled, "立绘显示切换");
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// 设置全局色调，下一帧生效
    pub fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
    }

    /// 以原始数值设置全局色调（校验范围）
    pub fn set_tone_values(&mut self, red: i32, green: i32, blue: i32, gray: i32) -> StandResult<()> {
        let tone = Tone::new(red, green, blue, gray).inspect_err(|e: &ToneError| {
            warn!(error = %e, "色调参数无效");
        })?;
        self.set_tone(tone);
        Ok(())
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }
}

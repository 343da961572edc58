//! # Slot 模块
//!
//! 对话立绘槽位的状态机。
//!
//! ## 状态转换
//!
//! ```text
//! Idle ──show──► Opening ──透明度到达目标──► Showing
//!   ▲               │                           │
//!   │               └──────clear / 关闭窗口─────┤
//!   │                                           ▼
//!   └────────────透明度归零────────────── Closing
//! ```
//!
//! - `show` 从任意状态进入 `Opening` 并请求加载图片；
//!   图片加载完成前不推进淡入
//! - 同一张图重新加载期间，渲染端上的旧图仍由槽位驱动：
//!   淡出、禁用和加载失败照常下发 move
//! - 淡入淡出中途切换方向时，不重置透明度，只改变方向
//! - 待机动作只在 `Showing` 且图片已加载时推进

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::LoadError;
use crate::motion::{Motion, MotionPlayer};
use crate::renderer::{
    BlendMode, ImageSize, Origin, PictureParams, Placement, RenderTarget, Renderer, Tone,
};
use crate::transition::{TransitionKind, approach};

/// 槽位编号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SlotId {
    /// 立绘 1（`\F`）
    Primary,
    /// 立绘 2（`\FF`）
    Secondary,
}

impl SlotId {
    /// 另一个槽位
    pub fn other(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }

    /// 对应的渲染目标
    pub fn target(self) -> RenderTarget {
        RenderTarget::Slot(self)
    }
}

/// 槽位阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlotPhase {
    /// 不可见
    #[default]
    Idle,
    /// 淡入中（含等待图片加载）
    Opening,
    /// 已完全显示
    Showing,
    /// 淡出中
    Closing,
}

/// 立绘列表中的一项
#[derive(Debug, Clone, PartialEq)]
pub struct StandingPicture {
    /// 控制字符引用的 ID
    pub id: u32,
    pub image: String,
    pub origin: Origin,
    /// 立绘 1 的位置
    pub x: f32,
    pub y: f32,
    /// 立绘 2 的位置
    pub x2: f32,
    pub y2: f32,
    /// 立绘 2 是否水平翻转
    pub reverse: bool,
    /// X 缩放（百分比）
    pub scale_x: f32,
    /// Y 缩放（百分比）
    pub scale_y: f32,
    pub opacity: u8,
    pub blend_mode: BlendMode,
}

impl StandingPicture {
    /// 以默认参数创建
    pub fn new(id: u32, image: impl Into<String>) -> Self {
        Self {
            id,
            image: image.into(),
            origin: Origin::UpperLeft,
            x: 464.0,
            y: 96.0,
            x2: 20.0,
            y2: 96.0,
            reverse: false,
            scale_x: 100.0,
            scale_y: 100.0,
            opacity: 255,
            blend_mode: BlendMode::Normal,
        }
    }

    /// 槽位上实际使用的 X 缩放（立绘 2 可翻转）
    pub fn effective_scale_x(&self, slot: SlotId) -> f32 {
        if slot == SlotId::Secondary && self.reverse {
            -self.scale_x
        } else {
            self.scale_x
        }
    }

    /// 槽位上的静止位置（左上角坐标）
    pub fn rest_position(&self, slot: SlotId, size: ImageSize) -> (f32, f32) {
        let (x, y) = match slot {
            SlotId::Primary => (self.x, self.y),
            SlotId::Secondary => (self.x2, self.y2),
        };
        match self.origin {
            Origin::UpperLeft => (x, y),
            Origin::Center => (
                x - size.width as f32 * self.effective_scale_x(slot) / 100.0 / 2.0,
                y - size.height as f32 * self.scale_y / 100.0 / 2.0,
            ),
        }
    }
}

/// 槽位的运行时状态
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplaySlot {
    /// 当前（或正在淡出的）立绘
    pub picture: Option<StandingPicture>,
    pub x: f32,
    pub y: f32,
    /// 静止位置（图片加载后确定）
    pub rest_x: f32,
    pub rest_y: f32,
    /// 透明度，范围 0..=255
    pub opacity: f32,
    pub phase: SlotPhase,
    pub motion: Motion,
    pub motion_counter: u32,
    /// 最后一次下发的色调
    pub tint: Option<Tone>,
    /// 渲染端是否持有该槽位的图片
    pub loaded: bool,
    /// 当前指令是否要求显示
    pub wanted: bool,
}

/// 单个槽位的状态机
#[derive(Debug, Clone)]
pub struct SlotStateMachine {
    id: SlotId,
    transition: TransitionKind,
    player: MotionPlayer,
    state: DisplaySlot,
    /// 等待加载完成的图片名
    pending_image: Option<String>,
    /// 最后一次下发的位置
    last_placement: Option<Placement>,
}

impl SlotStateMachine {
    pub fn new(id: SlotId, transition: TransitionKind, player: MotionPlayer) -> Self {
        Self {
            id,
            transition,
            player,
            state: DisplaySlot::default(),
            pending_image: None,
            last_placement: None,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    pub fn state(&self) -> &DisplaySlot {
        &self.state
    }

    pub fn phase(&self) -> SlotPhase {
        self.state.phase
    }

    pub fn opacity(&self) -> f32 {
        self.state.opacity
    }

    pub fn position(&self) -> (f32, f32) {
        (self.state.x, self.state.y)
    }

    /// 是否有图片在等待加载
    pub fn is_loading(&self) -> bool {
        self.pending_image.is_some()
    }

    /// 显示立绘并设置动作
    ///
    /// 图片不同则先擦除旧图，再请求加载新图。
    pub fn show(&mut self, picture: StandingPicture, motion: Motion, renderer: &mut dyn Renderer) {
        let target = self.id.target();
        if let Some(current) = &self.state.picture
            && current.image != picture.image
        {
            renderer.erase(target);
            self.last_placement = None;
            self.state.tint = None;
            self.state.loaded = false;
        }

        debug!(slot = ?self.id, image = %picture.image, motion = motion.name(), "立绘显示");
        renderer.load_image(target, &picture.image);
        self.pending_image = Some(picture.image.clone());
        self.state.picture = Some(picture);
        self.state.wanted = true;
        self.state.phase = SlotPhase::Opening;
        self.state.motion = motion;
        self.state.motion_counter = motion.frame_budget();
    }

    /// 清除指令：槽位淡出，动作取消
    pub fn clear(&mut self) {
        self.state.wanted = false;
        self.cancel_motion();
    }

    /// 图片加载回调
    ///
    /// 返回 `false` 表示结果已过期（槽位已请求了其他图片）而被忽略。
    pub fn on_image_loaded(
        &mut self,
        image: &str,
        result: Result<ImageSize, LoadError>,
        tone: Tone,
        renderer: &mut dyn Renderer,
    ) -> bool {
        if self.pending_image.as_deref() != Some(image) {
            return false;
        }
        self.pending_image = None;

        let size = match result {
            Ok(size) => size,
            Err(e) => {
                warn!(slot = ?self.id, error = %e, "立绘加载失败，槽位转为关闭");
                self.state.wanted = false;
                self.state.opacity = 0.0;
                self.state.phase = SlotPhase::Closing;
                self.cancel_motion();
                self.sync(renderer);
                return true;
            }
        };

        let Some(picture) = &self.state.picture else {
            return true;
        };
        if !self.state.wanted {
            return true;
        }

        let (rest_x, rest_y) = picture.rest_position(self.id, size);
        let (mut x, mut y) = (rest_x, rest_y);
        if self.state.opacity <= 0.0 {
            if self.transition.is_instant() {
                self.state.opacity = picture.opacity as f32;
            } else {
                let (dx, dy) = self.transition.offset();
                x += dx;
                y += dy;
            }
        }

        let params = PictureParams {
            image: picture.image.clone(),
            origin: Origin::UpperLeft,
            x,
            y,
            scale_x: picture.effective_scale_x(self.id),
            scale_y: picture.scale_y,
            opacity: to_u8(self.state.opacity),
            blend_mode: picture.blend_mode,
        };

        self.state.rest_x = rest_x;
        self.state.rest_y = rest_y;
        self.state.x = x;
        self.state.y = y;
        self.state.loaded = true;

        let target = self.id.target();
        renderer.show(target, &params);
        renderer.tint(target, tone, 0);
        self.state.tint = Some(tone);
        self.last_placement = Some(self.placement());
        true
    }

    /// 推进一帧
    pub fn tick(&mut self, renderer: &mut dyn Renderer) {
        if self.state.wanted {
            self.fade_in();
        } else {
            self.fade_out();
        }

        if self.state.phase == SlotPhase::Showing
            && self.state.loaded
            && self.state.motion_counter > 0
        {
            let step = self
                .player
                .step(self.state.motion, self.state.motion_counter, self.state.x);
            self.state.x += step.dx;
            self.state.y += step.dy;
            self.state.motion_counter = step.counter;
            if step.counter == 0 {
                self.state.motion = Motion::None;
            }
        }

        self.sync(renderer);
    }

    /// 更新色调（仅在变化时下发）
    pub fn apply_tone(&mut self, tone: Tone, renderer: &mut dyn Renderer) {
        if !self.state.loaded || self.state.tint == Some(tone) {
            return;
        }
        renderer.tint(self.id.target(), tone, 0);
        self.state.tint = Some(tone);
    }

    /// 立绘显示被禁用：强制透明，冻结动画
    pub fn suppress(&mut self, renderer: &mut dyn Renderer) {
        self.state.opacity = 0.0;
        self.state.phase = match self.state.phase {
            SlotPhase::Closing | SlotPhase::Idle => SlotPhase::Idle,
            SlotPhase::Opening | SlotPhase::Showing => SlotPhase::Opening,
        };
        self.sync(renderer);
    }

    /// 重置为初始状态（场景重建精灵时使用）
    pub fn reset(&mut self) {
        self.state = DisplaySlot::default();
        self.pending_image = None;
        self.last_placement = None;
    }

    fn fade_in(&mut self) {
        if !self.state.loaded || self.pending_image.is_some() {
            return;
        }
        let Some(picture) = &self.state.picture else {
            return;
        };
        let target = picture.opacity as f32;

        if self.state.opacity >= target {
            self.state.opacity = target;
            self.state.phase = SlotPhase::Showing;
            return;
        }

        self.state.phase = SlotPhase::Opening;
        self.state.x = approach(self.state.x, self.state.rest_x);
        self.state.y = approach(self.state.y, self.state.rest_y);
        self.state.opacity = (self.state.opacity + self.transition.fade_step(target)).min(target);
        if self.state.opacity >= target {
            self.state.phase = SlotPhase::Showing;
        }
    }

    fn fade_out(&mut self) {
        if self.state.opacity <= 0.0 {
            self.state.opacity = 0.0;
            self.finish_closing();
            return;
        }

        self.state.phase = SlotPhase::Closing;
        let step = self
            .state
            .picture
            .as_ref()
            .map(|p| self.transition.fade_step(p.opacity as f32))
            .unwrap_or(0.0);

        // 步长为 0（目标透明度为 0 或没有立绘）时直接归零
        if step <= 0.0 || self.transition.is_instant() {
            self.state.opacity = 0.0;
        } else {
            self.state.opacity = (self.state.opacity - step).max(0.0);
        }

        let (x, y) = self.transition.exit_position(
            (self.state.x, self.state.y),
            (self.state.rest_x, self.state.rest_y),
        );
        self.state.x = x;
        self.state.y = y;

        if self.state.opacity <= 0.0 {
            self.finish_closing();
        }
    }

    fn finish_closing(&mut self) {
        if self.state.phase != SlotPhase::Idle {
            debug!(slot = ?self.id, "立绘已隐藏");
        }
        self.state.phase = SlotPhase::Idle;
        self.cancel_motion();
    }

    fn cancel_motion(&mut self) {
        self.state.motion = Motion::None;
        self.state.motion_counter = 0;
    }

    fn placement(&self) -> Placement {
        Placement {
            x: self.state.x,
            y: self.state.y,
            opacity: to_u8(self.state.opacity),
        }
    }

    /// 位置或透明度变化时下发 move
    fn sync(&mut self, renderer: &mut dyn Renderer) {
        if !self.state.loaded {
            return;
        }
        let placement = self.placement();
        if self.last_placement != Some(placement) {
            renderer.move_to(self.id.target(), placement, 0);
            self.last_placement = Some(placement);
        }
    }
}

fn to_u8(opacity: f32) -> u8 {
    opacity.round().clamp(0.0, 255.0) as u8
}

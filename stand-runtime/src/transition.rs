//! # Transition 模块
//!
//! 立绘出现/消失时的切换效果：入场偏移、退场方向与淡入淡出时长。
//!
//! | 值 | 效果 | 偏移 |
//! |----|------|------|
//! | 0 | 无 | 透明度瞬间变化 |
//! | 1 | 淡入淡出 | 无 |
//! | 2 | 左侧浮入 | x - 30 |
//! | 3 | 右侧浮入 | x + 30 |
//! | 4 | 下方浮入 | y + 30 |
//! | 5 | 上方浮入 | y - 30 |
//!
//! 退场时向同一方向移动，直到离开静止位置 30 像素为止。

use serde::{Deserialize, Serialize};

/// 淡入淡出帧数（与目标透明度无关）
pub const FADE_TICKS: u32 = 15;

/// 浮入距离
pub const FLOAT_DISTANCE: f32 = 30.0;

/// 浮入/浮出每帧位移
pub const FLOAT_STEP: f32 = 2.0;

/// 切换效果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TransitionKind {
    None,
    #[default]
    Fade,
    FloatLeft,
    FloatRight,
    FloatBottom,
    FloatTop,
}

impl TryFrom<u8> for TransitionKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Fade),
            2 => Ok(Self::FloatLeft),
            3 => Ok(Self::FloatRight),
            4 => Ok(Self::FloatBottom),
            5 => Ok(Self::FloatTop),
            _ => Err(format!("未知的切换效果 {}（有效范围 0-5）", value)),
        }
    }
}

impl From<TransitionKind> for u8 {
    fn from(kind: TransitionKind) -> Self {
        match kind {
            TransitionKind::None => 0,
            TransitionKind::Fade => 1,
            TransitionKind::FloatLeft => 2,
            TransitionKind::FloatRight => 3,
            TransitionKind::FloatBottom => 4,
            TransitionKind::FloatTop => 5,
        }
    }
}

impl TransitionKind {
    /// 入场起点相对静止位置的偏移，也是退场方向
    pub fn offset(self) -> (f32, f32) {
        match self {
            Self::None | Self::Fade => (0.0, 0.0),
            Self::FloatLeft => (-FLOAT_DISTANCE, 0.0),
            Self::FloatRight => (FLOAT_DISTANCE, 0.0),
            Self::FloatBottom => (0.0, FLOAT_DISTANCE),
            Self::FloatTop => (0.0, -FLOAT_DISTANCE),
        }
    }

    /// 是否瞬间切换
    pub fn is_instant(self) -> bool {
        self == Self::None
    }

    /// 淡入/淡出所需帧数
    pub fn duration_ticks(self) -> u32 {
        if self.is_instant() { 0 } else { FADE_TICKS }
    }

    /// 每帧透明度变化量
    pub fn fade_step(self, target_opacity: f32) -> f32 {
        match self.duration_ticks() {
            0 => target_opacity,
            ticks => target_opacity / ticks as f32,
        }
    }

    /// 退场时的下一帧位置
    ///
    /// 沿偏移方向每帧移动 [`FLOAT_STEP`]，到达 `rest + offset` 后停止。
    pub fn exit_position(self, (x, y): (f32, f32), (rest_x, rest_y): (f32, f32)) -> (f32, f32) {
        let (dx, dy) = self.offset();
        (
            drift_away(x, rest_x, dx),
            drift_away(y, rest_y, dy),
        )
    }
}

fn drift_away(current: f32, rest: f32, offset: f32) -> f32 {
    if offset < 0.0 && current > rest + offset {
        current - FLOAT_STEP
    } else if offset > 0.0 && current < rest + offset {
        current + FLOAT_STEP
    } else {
        current
    }
}

/// 向静止位置靠近一步
pub fn approach(current: f32, rest: f32) -> f32 {
    if current < rest {
        (current + FLOAT_STEP).min(rest)
    } else if current > rest {
        (current - FLOAT_STEP).max(rest)
    } else {
        current
    }
}

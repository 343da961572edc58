//! # Motion 模块
//!
//! 立绘待机动作表与单帧推进。
//!
//! 动作由"动作名 → 帧预算 + 每帧位移表"描述。[`MotionPlayer::step`]
//! 是纯函数：给定动作、当前计数器和当前 X 坐标，返回本帧位移和新的计数器。
//!
//! ## 计数器规则
//!
//! - 普通动作从帧预算倒数到 0 结束
//! - `jumploop` 倒数到 0 时回绕到 48，永不自行结束
//! - `shake` / `shakeloop` 从 1 正数；`shake` 数完归 0，`shakeloop` 回绕到 1
//! - `runleft` / `runright` 计数器保持不变，直到越过屏幕边界才被置 0

use serde::{Deserialize, Serialize};

/// 默认的跑出屏幕边界
pub const DEFAULT_MOTION_BOUND: f32 = 2000.0;

/// 跑动每帧位移
const RUN_SPEED: f32 = 16.0;

/// 待机动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Motion {
    #[default]
    None,
    Yes,
    YesYes,
    No,
    NoSlow,
    Jump,
    JumpJump,
    JumpLoop,
    Shake,
    ShakeLoop,
    RunLeft,
    RunRight,
}

impl Motion {
    /// 从动作名解析（区分大小写），未知名称视为 `None`
    pub fn parse(name: &str) -> Self {
        match name {
            "yes" => Self::Yes,
            "yesyes" => Self::YesYes,
            "no" => Self::No,
            "noslow" => Self::NoSlow,
            "jump" => Self::Jump,
            "jumpjump" => Self::JumpJump,
            "jumploop" => Self::JumpLoop,
            "shake" => Self::Shake,
            "shakeloop" => Self::ShakeLoop,
            "runleft" => Self::RunLeft,
            "runright" => Self::RunRight,
            _ => Self::None,
        }
    }

    /// 动作名
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Yes => "yes",
            Self::YesYes => "yesyes",
            Self::No => "no",
            Self::NoSlow => "noslow",
            Self::Jump => "jump",
            Self::JumpJump => "jumpjump",
            Self::JumpLoop => "jumploop",
            Self::Shake => "shake",
            Self::ShakeLoop => "shakeloop",
            Self::RunLeft => "runleft",
            Self::RunRight => "runright",
        }
    }

    /// 计数器初始值
    pub fn frame_budget(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Yes | Self::No | Self::Jump => 24,
            Self::YesYes | Self::NoSlow | Self::JumpJump | Self::JumpLoop => 48,
            Self::Shake | Self::ShakeLoop | Self::RunLeft | Self::RunRight => 1,
        }
    }

    /// 是否永不自行结束
    pub fn is_looping(self) -> bool {
        matches!(self, Self::JumpLoop | Self::ShakeLoop)
    }
}

/// 单帧推进结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionStep {
    pub dx: f32,
    pub dy: f32,
    /// 新的计数器值，0 表示动作结束
    pub counter: u32,
}

impl MotionStep {
    fn new(dx: f32, dy: f32, counter: u32) -> Self {
        Self { dx, dy, counter }
    }
}

/// 动作播放器
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPlayer {
    /// 跑动动作的屏幕边界（绝对值）
    bound: f32,
}

impl Default for MotionPlayer {
    fn default() -> Self {
        Self::new(DEFAULT_MOTION_BOUND)
    }
}

impl MotionPlayer {
    pub fn new(bound: f32) -> Self {
        Self { bound }
    }

    /// 推进一帧
    ///
    /// `x` 为当前 X 坐标（仅跑动动作使用）。计数器为 0 时不产生位移。
    pub fn step(&self, motion: Motion, counter: u32, x: f32) -> MotionStep {
        if counter == 0 {
            return MotionStep::new(0.0, 0.0, 0);
        }
        let next = counter - 1;

        match motion {
            Motion::None => MotionStep::new(0.0, 0.0, 0),
            Motion::Yes => {
                let dy = if counter > 12 { 2.0 } else { -2.0 };
                MotionStep::new(0.0, dy, next)
            }
            Motion::YesYes => {
                let dy = match counter {
                    37.. => 2.0,
                    25..=36 => -2.0,
                    13..=24 => 2.0,
                    _ => -2.0,
                };
                MotionStep::new(0.0, dy, next)
            }
            Motion::No => {
                let dx = match counter {
                    19.. => 2.0,
                    7..=18 => -2.0,
                    _ => 2.0,
                };
                MotionStep::new(dx, 0.0, next)
            }
            Motion::NoSlow => {
                let dx = match counter {
                    37.. => 1.0,
                    13..=36 => -1.0,
                    _ => 1.0,
                };
                MotionStep::new(dx, 0.0, next)
            }
            Motion::Jump => {
                let dy = if counter > 12 { -2.0 } else { 2.0 };
                MotionStep::new(0.0, dy, next)
            }
            Motion::JumpJump => {
                let dy = match counter {
                    37.. => -2.0,
                    25..=36 => 2.0,
                    13..=24 => -2.0,
                    _ => 2.0,
                };
                MotionStep::new(0.0, dy, next)
            }
            Motion::JumpLoop => {
                let dy = match counter {
                    37.. => -2.0,
                    25..=36 => 2.0,
                    _ => 0.0,
                };
                let wrapped = if next == 0 {
                    Motion::JumpLoop.frame_budget()
                } else {
                    next
                };
                MotionStep::new(0.0, dy, wrapped)
            }
            Motion::Shake => {
                let (dx, dy) = shake_delta(counter, 2.0);
                let counter = if counter >= 10 { 0 } else { counter + 1 };
                MotionStep::new(dx, dy, counter)
            }
            Motion::ShakeLoop => {
                let (dx, dy) = shake_delta(counter, 1.0);
                let counter = if counter >= 10 { 1 } else { counter + 1 };
                MotionStep::new(dx, dy, counter)
            }
            Motion::RunLeft => {
                let counter = if x - RUN_SPEED < -self.bound { 0 } else { counter };
                MotionStep::new(-RUN_SPEED, 0.0, counter)
            }
            Motion::RunRight => {
                let counter = if x + RUN_SPEED > self.bound { 0 } else { counter };
                MotionStep::new(RUN_SPEED, 0.0, counter)
            }
        }
    }
}

/// 抖动位移表（以 `unit` 为单位）
fn shake_delta(counter: u32, unit: f32) -> (f32, f32) {
    match counter {
        0..=2 => (-unit, 0.0),
        3..=4 => (0.0, -unit),
        5..=6 => (unit * 2.0, unit * 2.0),
        7..=8 => (0.0, -unit),
        _ => (-unit, 0.0),
    }
}

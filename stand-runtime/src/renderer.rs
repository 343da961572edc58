//! # Renderer 模块
//!
//! 立绘系统对宿主渲染层的抽象。
//!
//! ## 设计说明
//!
//! - Runtime 不持有任何纹理或精灵，只通过 [`Renderer`] 发出指令
//! - 图片加载是异步的：[`Renderer::load_image`] 只发起请求，
//!   宿主加载完成后调用 `Overlay::on_image_loaded` 回报结果
//! - [`RecordingRenderer`] 记录所有调用，用于测试和 headless 宿主

use serde::{Deserialize, Serialize};

use crate::error::ToneError;
use crate::slot::SlotId;

/// 渲染目标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RenderTarget {
    /// 编号图片（战斗立绘使用）
    Picture(u32),
    /// 对话立绘槽位
    Slot(SlotId),
}

/// 图片原点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Origin {
    /// 左上角
    #[default]
    UpperLeft,
    /// 中心
    Center,
}

/// 混合模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Multiply,
    Screen,
}

/// 色调 `[r, g, b, gray]`
///
/// RGB 范围 -255..=255，灰度范围 0..=255。
/// 字段私有，只能经由 [`Tone::new`] 或反序列化（同样校验）构造。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "[i32; 4]", into = "[i32; 4]")]
pub struct Tone {
    red: i32,
    green: i32,
    blue: i32,
    gray: i32,
}

impl Tone {
    /// 无色调
    pub const NEUTRAL: Tone = Tone {
        red: 0,
        green: 0,
        blue: 0,
        gray: 0,
    };

    /// 创建并校验色调
    pub fn new(red: i32, green: i32, blue: i32, gray: i32) -> Result<Self, ToneError> {
        for (channel, value) in [('r', red), ('g', green), ('b', blue)] {
            if !(-255..=255).contains(&value) {
                return Err(ToneError::ChannelOutOfRange { channel, value });
            }
        }
        if !(0..=255).contains(&gray) {
            return Err(ToneError::GrayOutOfRange(gray));
        }
        Ok(Self {
            red,
            green,
            blue,
            gray,
        })
    }

    /// RGB 通道统一加上偏移（灰度不变），结果限制在合法范围内
    pub fn offset_rgb(self, delta: i32) -> Self {
        Self {
            red: (self.red + delta).clamp(-255, 255),
            green: (self.green + delta).clamp(-255, 255),
            blue: (self.blue + delta).clamp(-255, 255),
            gray: self.gray,
        }
    }

    pub fn red(self) -> i32 {
        self.red
    }

    pub fn green(self) -> i32 {
        self.green
    }

    pub fn blue(self) -> i32 {
        self.blue
    }

    pub fn gray(self) -> i32 {
        self.gray
    }

    /// 以数组形式返回
    pub fn to_array(self) -> [i32; 4] {
        [self.red, self.green, self.blue, self.gray]
    }
}

impl TryFrom<[i32; 4]> for Tone {
    type Error = ToneError;

    fn try_from([red, green, blue, gray]: [i32; 4]) -> Result<Self, Self::Error> {
        Self::new(red, green, blue, gray)
    }
}

impl From<Tone> for [i32; 4] {
    fn from(tone: Tone) -> Self {
        tone.to_array()
    }
}

/// 加载完成的图片尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// 显示参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PictureParams {
    /// 图片名
    pub image: String,
    pub origin: Origin,
    pub x: f32,
    pub y: f32,
    /// X 缩放（百分比，负数为水平翻转）
    pub scale_x: f32,
    /// Y 缩放（百分比）
    pub scale_y: f32,
    pub opacity: u8,
    pub blend_mode: BlendMode,
}

/// 位置与透明度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub opacity: u8,
}

/// 渲染能力
///
/// 宿主实现此 trait，把指令转换为实际的精灵操作。
pub trait Renderer {
    /// 显示图片（替换目标上原有的图片）
    fn show(&mut self, target: RenderTarget, params: &PictureParams);

    /// 移动图片 / 修改透明度，`duration_ticks == 0` 表示立即生效
    fn move_to(&mut self, target: RenderTarget, placement: Placement, duration_ticks: u32);

    /// 设置色调
    fn tint(&mut self, target: RenderTarget, tone: Tone, duration_ticks: u32);

    /// 消除图片
    fn erase(&mut self, target: RenderTarget);

    /// 请求异步加载图片，完成后由宿主回调
    fn load_image(&mut self, target: RenderTarget, image: &str);
}

/// 记录下来的渲染调用
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Show {
        target: RenderTarget,
        params: PictureParams,
    },
    Move {
        target: RenderTarget,
        placement: Placement,
        duration_ticks: u32,
    },
    Tint {
        target: RenderTarget,
        tone: Tone,
        duration_ticks: u32,
    },
    Erase {
        target: RenderTarget,
    },
    Load {
        target: RenderTarget,
        image: String,
    },
}

impl RenderCall {
    /// 调用的目标
    pub fn target(&self) -> RenderTarget {
        match self {
            RenderCall::Show { target, .. }
            | RenderCall::Move { target, .. }
            | RenderCall::Tint { target, .. }
            | RenderCall::Erase { target }
            | RenderCall::Load { target, .. } => *target,
        }
    }
}

/// 记录所有调用的渲染器
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Vec<RenderCall>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出并清空已记录的调用
    pub fn take(&mut self) -> Vec<RenderCall> {
        std::mem::take(&mut self.calls)
    }

    /// show 调用次数
    pub fn show_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RenderCall::Show { .. }))
            .count()
    }

    /// erase 调用次数
    pub fn erase_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, RenderCall::Erase { .. }))
            .count()
    }

    /// 最后一次 move 调用的位置
    pub fn last_placement(&self, target: RenderTarget) -> Option<Placement> {
        self.calls.iter().rev().find_map(|c| match c {
            RenderCall::Move {
                target: t,
                placement,
                ..
            } if *t == target => Some(*placement),
            _ => None,
        })
    }

    /// 最后一次 tint 调用的色调
    pub fn last_tone(&self, target: RenderTarget) -> Option<Tone> {
        self.calls.iter().rev().find_map(|c| match c {
            RenderCall::Tint { target: t, tone, .. } if *t == target => Some(*tone),
            _ => None,
        })
    }
}

impl Renderer for RecordingRenderer {
    fn show(&mut self, target: RenderTarget, params: &PictureParams) {
        self.calls.push(RenderCall::Show {
            target,
            params: params.clone(),
        });
    }

    fn move_to(&mut self, target: RenderTarget, placement: Placement, duration_ticks: u32) {
        self.calls.push(RenderCall::Move {
            target,
            placement,
            duration_ticks,
        });
    }

    fn tint(&mut self, target: RenderTarget, tone: Tone, duration_ticks: u32) {
        self.calls.push(RenderCall::Tint {
            target,
            tone,
            duration_ticks,
        });
    }

    fn erase(&mut self, target: RenderTarget) {
        self.calls.push(RenderCall::Erase { target });
    }

    fn load_image(&mut self, target: RenderTarget, image: &str) {
        self.calls.push(RenderCall::Load {
            target,
            image: image.to_string(),
        });
    }
}

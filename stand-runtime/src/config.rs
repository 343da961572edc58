//! # Config 模块
//!
//! 立绘系统的配置文件（JSON）。
//!
//! 配置记录保持插件参数的 camelCase 键名，加载时只做结构解析；
//! [`OverlayConfig::validate`] 报告所有硬错误，[`OverlayConfig::build`]
//! 则跳过无效条目（打印警告）并构建运行时 [`Overlay`]。
//!
//! ```json
//! {
//!   "transition": 2,
//!   "pictures": [{ "id": 1, "imageName": "alice", "origin": 1 }],
//!   "patterns": [{
//!     "actorId": 1, "picture": "hero_hurt", "pictureId": 10,
//!     "conditions": [{ "kind": "hp-percentage", "lte": 30 }]
//!   }]
//! }
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::condition::{Comparison, Condition, ConditionKind};
use crate::error::ConfigError;
use crate::motion::DEFAULT_MOTION_BOUND;
use crate::overlay::{DEFAULT_FOCUS_TONE_ADJUST, Overlay, OverlaySettings};
use crate::pattern::Pattern;
use crate::renderer::{BlendMode, Origin};
use crate::slot::StandingPicture;
use crate::transition::TransitionKind;

/// 立绘配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayConfig {
    /// 对话立绘列表
    #[serde(default)]
    pub pictures: Vec<PictureRecord>,

    /// 战斗立绘模式列表（每个角色内顺序有意义）
    #[serde(default)]
    pub patterns: Vec<PatternRecord>,

    /// 立绘 1 的切换效果（0-5）
    #[serde(default = "default_transition")]
    pub transition: u8,

    /// 立绘 2 的切换效果（0-5）
    #[serde(default = "default_transition")]
    pub transition2: u8,

    /// 初始是否显示立绘
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// 非聚焦立绘的 RGB 偏移
    #[serde(default = "default_focus_tone_adjust")]
    pub focus_tone_adjust: i32,

    /// 跑动动作的屏幕边界
    #[serde(default = "default_motion_bound")]
    pub motion_bound: f32,
}

/// 对话立绘记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureRecord {
    /// 控制字符中使用的 ID（从 1 开始）
    pub id: u32,

    #[serde(default)]
    pub image_name: String,

    /// 原点：0 = 左上，1 = 中心
    #[serde(default)]
    pub origin: u8,

    #[serde(default = "default_x")]
    pub x: f32,

    #[serde(default = "default_y")]
    pub y: f32,

    #[serde(default = "default_x2")]
    pub x2: f32,

    #[serde(default = "default_y")]
    pub y2: f32,

    /// 立绘 2 的左右翻转：1 或 -1
    #[serde(default = "default_reverse")]
    pub reverse: i32,

    #[serde(default = "default_scale")]
    pub scale_x: f32,

    #[serde(default = "default_scale")]
    pub scale_y: f32,

    #[serde(default = "default_opacity")]
    pub opacity: u32,

    /// 0 = 通常，1 = 加算，2 = 乘算，3 = 滤色
    #[serde(default)]
    pub blend_mode: u8,
}

/// 战斗立绘模式记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternRecord {
    #[serde(default)]
    pub actor_id: u32,

    #[serde(default)]
    pub conditions: Vec<ConditionRecord>,

    /// 图片名
    #[serde(default)]
    pub picture: String,

    /// 图片编号
    #[serde(default)]
    pub picture_id: u32,

    #[serde(default)]
    pub pos_x: f32,

    #[serde(default)]
    pub pos_y: f32,

    #[serde(default = "default_scale")]
    pub scale_x: f32,

    #[serde(default = "default_scale")]
    pub scale_y: f32,

    #[serde(default = "default_opacity")]
    pub opacity: u32,
}

/// 条件记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionRecord {
    pub kind: ConditionKind,

    #[serde(default)]
    pub negative: bool,

    #[serde(default)]
    pub target_switch: Option<u32>,

    #[serde(default)]
    pub switch_condition: Option<bool>,

    #[serde(default)]
    pub target_variable: Option<u32>,

    #[serde(default)]
    pub is_equal: Option<i64>,

    #[serde(default)]
    pub gte: Option<i64>,

    #[serde(default)]
    pub lte: Option<i64>,

    #[serde(default)]
    pub target_state: Option<u32>,
}

// 默认值函数
fn default_transition() -> u8 {
    TransitionKind::Fade.into()
}

fn default_enabled() -> bool {
    true
}

fn default_focus_tone_adjust() -> i32 {
    DEFAULT_FOCUS_TONE_ADJUST
}

fn default_motion_bound() -> f32 {
    DEFAULT_MOTION_BOUND
}

fn default_x() -> f32 {
    464.0
}

fn default_x2() -> f32 {
    20.0
}

fn default_y() -> f32 {
    96.0
}

fn default_reverse() -> i32 {
    1
}

fn default_scale() -> f32 {
    100.0
}

fn default_opacity() -> u32 {
    255
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            pictures: Vec::new(),
            patterns: Vec::new(),
            transition: default_transition(),
            transition2: default_transition(),
            enabled: default_enabled(),
            focus_tone_adjust: default_focus_tone_adjust(),
            motion_bound: default_motion_bound(),
        }
    }
}

impl OverlayConfig {
    /// 从 JSON 字符串解析
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// 从文件读取（错误直接返回）
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&content)
    }

    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并打印警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(?path, "立绘配置文件不存在，使用默认配置");
            return Self::default();
        }

        match Self::read(path) {
            Ok(config) => {
                info!(?path, "立绘配置加载成功");
                config
            }
            Err(e) => {
                warn!(error = %e, "立绘配置加载失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("transition", self.transition), ("transition2", self.transition2)] {
            TransitionKind::try_from(value)
                .map_err(|e| ConfigError::Validation(format!("{}: {}", name, e)))?;
        }

        if !self.motion_bound.is_finite() || self.motion_bound <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "motionBound 必须为正数: {}",
                self.motion_bound
            )));
        }

        let mut ids = BTreeSet::new();
        for record in &self.pictures {
            record.to_picture()?;
            if !ids.insert(record.id) {
                return Err(ConfigError::Validation(format!(
                    "立绘 ID 重复: {}",
                    record.id
                )));
            }
        }

        for (index, record) in self.patterns.iter().enumerate() {
            record.to_pattern(index)?;
        }

        Ok(())
    }

    /// 运行时设置（切换效果越界时回退为淡入淡出）
    pub fn settings(&self) -> OverlaySettings {
        let transition = |value: u8| {
            TransitionKind::try_from(value).unwrap_or_else(|e| {
                warn!(error = %e, "切换效果无效，使用淡入淡出");
                TransitionKind::Fade
            })
        };
        let motion_bound = if self.motion_bound.is_finite() && self.motion_bound > 0.0 {
            self.motion_bound
        } else {
            warn!(value = self.motion_bound, "motionBound 无效，使用默认值");
            DEFAULT_MOTION_BOUND
        };

        OverlaySettings {
            transition: transition(self.transition),
            transition2: transition(self.transition2),
            enabled: self.enabled,
            focus_tone_adjust: self.focus_tone_adjust,
            motion_bound,
        }
    }

    /// 有效的对话立绘（无效条目跳过）
    pub fn pictures(&self) -> Vec<StandingPicture> {
        self.pictures
            .iter()
            .filter_map(|record| {
                record
                    .to_picture()
                    .inspect_err(|e| warn!(id = record.id, error = %e, "跳过无效的立绘定义"))
                    .ok()
            })
            .collect()
    }

    /// 有效的战斗立绘模式（无效条目跳过，保持声明顺序）
    pub fn patterns(&self) -> Vec<Pattern> {
        self.patterns
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record
                    .to_pattern(index)
                    .inspect_err(|e| warn!(index, error = %e, "跳过无效的战斗立绘模式"))
                    .ok()
            })
            .collect()
    }

    /// 构建运行时上下文
    pub fn build(&self) -> Overlay {
        Overlay::new(self.settings(), self.pictures(), self.patterns())
    }
}

impl PictureRecord {
    /// 转换为运行时立绘
    pub fn to_picture(&self) -> Result<StandingPicture, ConfigError> {
        let invalid = |message: String| ConfigError::Validation(format!("立绘 {}: {}", self.id, message));

        if self.id == 0 {
            return Err(invalid("ID 必须从 1 开始".to_string()));
        }
        if self.image_name.is_empty() {
            return Err(invalid("未指定图片".to_string()));
        }
        let origin = match self.origin {
            0 => Origin::UpperLeft,
            1 => Origin::Center,
            other => return Err(invalid(format!("原点 {} 无效（0 或 1）", other))),
        };
        let reverse = match self.reverse {
            1 => false,
            -1 => true,
            other => return Err(invalid(format!("reverse {} 无效（1 或 -1）", other))),
        };
        let blend_mode = blend_mode(self.blend_mode).ok_or_else(|| {
            invalid(format!("合成方式 {} 无效（0-3）", self.blend_mode))
        })?;

        Ok(StandingPicture {
            id: self.id,
            image: self.image_name.clone(),
            origin,
            x: self.x,
            y: self.y,
            x2: self.x2,
            y2: self.y2,
            reverse,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            opacity: opacity(self.opacity).map_err(invalid)?,
            blend_mode,
        })
    }
}

impl PatternRecord {
    /// 转换为运行时模式，`index` 为声明顺序
    pub fn to_pattern(&self, index: usize) -> Result<Pattern, ConfigError> {
        let invalid =
            |message: String| ConfigError::Validation(format!("模式 #{}: {}", index, message));

        if self.actor_id == 0 {
            return Err(invalid("未指定角色".to_string()));
        }
        if self.picture_id == 0 {
            return Err(invalid("未指定图片编号".to_string()));
        }
        if self.picture.is_empty() {
            return Err(invalid("未指定图片".to_string()));
        }

        Ok(Pattern {
            id: index,
            actor_id: self.actor_id,
            conditions: self.conditions.iter().map(ConditionRecord::to_condition).collect(),
            image: self.picture.clone(),
            picture_id: self.picture_id,
            x: self.pos_x,
            y: self.pos_y,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            opacity: opacity(self.opacity).map_err(invalid)?,
        })
    }
}

impl ConditionRecord {
    /// 转换为条件（缺失字段保留为 `None`，求值时为假）
    pub fn to_condition(&self) -> Condition {
        let target = match self.kind {
            ConditionKind::Switch => self.target_switch,
            ConditionKind::Variable => self.target_variable,
            ConditionKind::State => self.target_state,
            _ => None,
        };

        Condition {
            kind: self.kind,
            negate: self.negative,
            target,
            switch_value: self.switch_condition,
            comparison: Comparison::infer(self.is_equal, self.gte, self.lte),
        }
    }
}

fn blend_mode(value: u8) -> Option<BlendMode> {
    match value {
        0 => Some(BlendMode::Normal),
        1 => Some(BlendMode::Additive),
        2 => Some(BlendMode::Multiply),
        3 => Some(BlendMode::Screen),
        _ => None,
    }
}

fn opacity(value: u32) -> Result<u8, String> {
    u8::try_from(value).map_err(|_| format!("不透明度 {} 超出范围 0-255", value))
}

//! # Stand Runtime
//!
//! 立绘（Standing Picture）系统的核心运行时库。
//!
//! ## 架构概述
//!
//! `stand-runtime` 是纯逻辑核心，不依赖任何 IO 或渲染引擎。
//! 它包含两条相互独立的链路：
//!
//! ```text
//! 对话：消息文本 ── control_code ──► 指令 ──► SlotStateMachine ×2 ──┐
//!                                                                 ├──► Renderer
//! 战斗：GameState ── condition/pattern ──► DisplayRegistry ───────┘
//! ```
//!
//! 两条链路都由宿主每帧调用一次 [`Overlay::on_frame_tick`] 推进。
//! 游戏数据通过 [`GameState`] 只读查询，画面输出通过 [`Renderer`] 指令完成。
//!
//! ## 使用示例
//!
//! ```ignore
//! use stand_runtime::{OverlayConfig, RenderTarget};
//!
//! let mut overlay = OverlayConfig::load("stand_overlay.json").build();
//!
//! // 消息开始：控制字符被移除后再交给文本渲染
//! let text = overlay.on_message_start(raw_text, &mut renderer);
//!
//! // 宿主完成图片加载后回报
//! overlay.on_image_loaded(target, &image, Ok(size), &mut renderer);
//!
//! // 每帧
//! overlay.on_frame_tick(&game_state, &mut renderer);
//! ```
//!
//! ## 模块结构
//!
//! - [`condition`] / [`pattern`] / [`registry`] / [`battle`]：战斗立绘
//! - [`control_code`] / [`slot`] / [`motion`] / [`transition`] / [`dialogue`]：对话立绘
//! - [`overlay`]：上下文对象
//! - [`config`]：配置文件
//! - [`game_state`] / [`renderer`]：宿主接口
//! - [`error`]：错误类型定义

pub mod battle;
pub mod condition;
pub mod config;
pub mod control_code;
pub mod dialogue;
pub mod error;
pub mod game_state;
pub mod motion;
pub mod overlay;
pub mod pattern;
pub mod registry;
pub mod renderer;
pub mod slot;
pub mod transition;

// 重导出核心类型
pub use battle::BattleStage;
pub use condition::{Comparison, Condition, ConditionKind, SpecifiedStateIndex};
pub use config::{ConditionRecord, OverlayConfig, PatternRecord, PictureRecord};
pub use control_code::{Directives, ParsedMessage, SlotDirective, parse_message, strip};
pub use dialogue::{DialogueStage, PictureCatalog};
pub use error::{ConfigError, LoadError, StandError, StandResult, ToneError};
pub use game_state::{ActorId, ActorStats, GameState, MemoryGameState, StateId};
pub use motion::{Motion, MotionPlayer, MotionStep};
pub use overlay::{Overlay, OverlaySettings};
pub use pattern::{Pattern, PatternBook};
pub use registry::{ApplyOutcome, DisplayRegistry, PictureIdentity};
pub use renderer::{
    BlendMode, ImageSize, Origin, PictureParams, Placement, RecordingRenderer, RenderCall,
    RenderTarget, Renderer, Tone,
};
pub use slot::{DisplaySlot, SlotId, SlotPhase, SlotStateMachine, StandingPicture};
pub use transition::TransitionKind;

//! # Scenario 模块
//!
//! 剧本文件：按顺序执行的宿主事件，用于在没有游戏引擎的情况下驱动立绘系统。
//!
//! ```json
//! {
//!   "state": { "actors": { "1": { "hp": 100, "maxHp": 100, "mp": 0, "maxMp": 0 } } },
//!   "steps": [
//!     { "message": "\\F[1]\\M[yes]你好" },
//!     { "ticks": 30 },
//!     "closeWindow",
//!     { "battleStart": [1] },
//!     { "setHp": { "actor": 1, "hp": 10, "max": 100 } },
//!     { "ticks": 1 },
//!     "battleEnd"
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use stand_runtime::{ActorId, MemoryGameState, Overlay, StateId, Tone};
use tracing::{info, warn};

use crate::renderer::LoggingRenderer;

/// 剧本
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    /// 初始游戏状态
    #[serde(default)]
    pub state: MemoryGameState,

    pub steps: Vec<Step>,
}

/// 剧本步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    /// 显示一条消息
    Message(String),
    /// 关闭消息窗口
    CloseWindow,
    /// 推进若干帧
    Ticks(u32),
    BattleStart(Vec<ActorId>),
    BattleEnd,
    SceneEnter,
    SetSwitch { id: u32, value: bool },
    SetVariable { id: u32, value: i64 },
    SetHp { actor: ActorId, hp: i64, max: i64 },
    SetMp { actor: ActorId, mp: i64, max: i64 },
    AddState { actor: ActorId, state: StateId },
    RemoveState { actor: ActorId, state: StateId },
    SetEnabled(bool),
    /// `[r, g, b, gray]`
    SetTone([i32; 4]),
    /// 之后加载该图片都会失败
    FailImage(String),
}

impl Scenario {
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("剧本解析失败")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("无法读取剧本: {:?}", path))?;
        Self::from_json_str(&content)
    }
}

/// 执行结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub messages: Vec<String>,
}

/// 剧本执行器（模拟宿主的生命周期）
pub struct ScenarioRunner {
    overlay: Overlay,
    state: MemoryGameState,
    renderer: LoggingRenderer,
    summary: RunSummary,
}

impl ScenarioRunner {
    pub fn new(overlay: Overlay, state: MemoryGameState, renderer: LoggingRenderer) -> Self {
        Self {
            overlay,
            state,
            renderer,
            summary: RunSummary::default(),
        }
    }

    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    pub fn renderer(&self) -> &LoggingRenderer {
        &self.renderer
    }

    /// 执行全部步骤
    pub fn run(&mut self, steps: &[Step]) -> &RunSummary {
        for step in steps {
            self.execute(step);
        }
        &self.summary
    }

    pub fn execute(&mut self, step: &Step) {
        match step {
            Step::Message(text) => {
                let text = self.overlay.on_message_start(text, &mut self.renderer);
                info!(text = %text, "消息");
                self.summary.messages.push(text);
            }
            Step::CloseWindow => self.overlay.on_message_window_closed(),
            Step::Ticks(count) => {
                for _ in 0..*count {
                    self.frame();
                }
            }
            Step::BattleStart(party) => {
                self.overlay
                    .on_battle_start(party, &self.state, &mut self.renderer)
            }
            Step::BattleEnd => self.overlay.on_battle_end(&mut self.renderer),
            Step::SceneEnter => self.overlay.on_scene_enter(),
            Step::SetSwitch { id, value } => self.state.set_switch(*id, *value),
            Step::SetVariable { id, value } => self.state.set_variable(*id, *value),
            Step::SetHp { actor, hp, max } => self.state.set_hp(*actor, *hp, *max),
            Step::SetMp { actor, mp, max } => self.state.set_mp(*actor, *mp, *max),
            Step::AddState { actor, state } => self.state.add_state(*actor, *state),
            Step::RemoveState { actor, state } => self.state.remove_state(*actor, *state),
            Step::SetEnabled(enabled) => self.overlay.set_enabled(*enabled),
            Step::SetTone([r, g, b, gray]) => {
                if let Err(e) = self.overlay.set_tone_values(*r, *g, *b, *gray) {
                    warn!(error = %e, "忽略无效的色调");
                }
            }
            Step::FailImage(image) => self.renderer.fail_image(image.clone()),
        }
    }

    /// 一帧：先回报上一帧的加载结果，再推进
    fn frame(&mut self) {
        for (target, image, result) in self.renderer.complete_loads() {
            self.overlay
                .on_image_loaded(target, &image, result, &mut self.renderer);
        }
        self.overlay.on_frame_tick(&self.state, &mut self.renderer);
        self.summary.frames += 1;
    }

    /// 当前全局色调
    pub fn tone(&self) -> Tone {
        self.overlay.tone()
    }
}

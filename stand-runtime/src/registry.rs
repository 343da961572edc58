//! # DisplayRegistry 模块
//!
//! 记录每个角色当前显示的模式，并与新解析结果做差异比较。
//!
//! | 旧记录 | 新模式 | 渲染调用 |
//! |--------|--------|----------|
//! | 无 | 任意 | `show` |
//! | 相同模式 | 相同模式 | 无 |
//! | 图片身份相同 | 其他模式 | `show`（原地替换） |
//! | 图片身份不同 | 其他模式 | `erase`（旧）→ `show`（新） |

use std::collections::BTreeMap;

use tracing::debug;

use crate::game_state::ActorId;
use crate::pattern::Pattern;
use crate::renderer::{RenderTarget, Renderer};

/// 图片身份：图片编号 + 图片名
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PictureIdentity {
    pub picture_id: u32,
    pub image: String,
}

/// `apply` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// 首次显示
    Shown,
    /// 擦除旧图后显示新图
    Replaced,
    /// 同一图片身份，以新参数重新显示
    Reshown,
    /// 无变化
    Unchanged,
}

/// 当前显示记录
#[derive(Debug, Clone, Default)]
pub struct DisplayRegistry {
    shown: BTreeMap<ActorId, Pattern>,
}

impl DisplayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 将解析结果应用到角色
    pub fn apply(
        &mut self,
        actor: ActorId,
        pattern: &Pattern,
        renderer: &mut dyn Renderer,
    ) -> ApplyOutcome {
        let outcome = match self.shown.get(&actor) {
            None => ApplyOutcome::Shown,
            Some(previous) if previous == pattern => return ApplyOutcome::Unchanged,
            Some(previous) if previous.identity() == pattern.identity() => ApplyOutcome::Reshown,
            Some(previous) => {
                renderer.erase(RenderTarget::Picture(previous.picture_id));
                ApplyOutcome::Replaced
            }
        };

        debug!(actor, image = %pattern.image, picture_id = pattern.picture_id, ?outcome, "战斗立绘切换");
        renderer.show(RenderTarget::Picture(pattern.picture_id), &pattern.show_params());
        self.shown.insert(actor, pattern.clone());
        outcome
    }

    /// 擦除所有记录的图片并清空
    pub fn erase_all(&mut self, renderer: &mut dyn Renderer) {
        for pattern in self.shown.values() {
            renderer.erase(RenderTarget::Picture(pattern.picture_id));
        }
        self.shown.clear();
    }

    /// 角色当前显示的模式
    pub fn shown(&self, actor: ActorId) -> Option<&Pattern> {
        self.shown.get(&actor)
    }

    pub fn len(&self) -> usize {
        self.shown.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shown.is_empty()
    }
}

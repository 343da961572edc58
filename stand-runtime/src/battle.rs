//! # Battle 模块
//!
//! 战斗立绘：战斗期间每帧为参战角色解析模式，只在图片变化时下发渲染指令。

use tracing::info;

use crate::game_state::{ActorId, GameState};
use crate::pattern::PatternBook;
use crate::registry::DisplayRegistry;
use crate::renderer::Renderer;

/// 战斗立绘舞台
#[derive(Debug, Clone, Default)]
pub struct BattleStage {
    book: PatternBook,
    registry: DisplayRegistry,
    /// 参战角色（按队伍顺序）
    party: Vec<ActorId>,
    in_battle: bool,
}

impl BattleStage {
    pub fn new(book: PatternBook) -> Self {
        Self {
            book,
            ..Self::default()
        }
    }

    pub fn book(&self) -> &PatternBook {
        &self.book
    }

    pub fn registry(&self) -> &DisplayRegistry {
        &self.registry
    }

    pub fn is_in_battle(&self) -> bool {
        self.in_battle
    }

    /// 战斗开始：记录参战角色并立即解析
    pub fn on_battle_start(
        &mut self,
        party: &[ActorId],
        state: &dyn GameState,
        renderer: &mut dyn Renderer,
    ) {
        info!(?party, "战斗立绘开始");
        self.party = party.to_vec();
        self.in_battle = true;
        self.refresh(state, renderer);
    }

    /// 每帧重新解析（仅战斗中）
    pub fn tick(&mut self, state: &dyn GameState, renderer: &mut dyn Renderer) {
        if self.in_battle {
            self.refresh(state, renderer);
        }
    }

    fn refresh(&mut self, state: &dyn GameState, renderer: &mut dyn Renderer) {
        for &actor in &self.party {
            if let Some(pattern) = self.book.resolve(actor, state) {
                self.registry.apply(actor, pattern, renderer);
            }
        }
    }

    /// 战斗结束：擦除所有战斗立绘
    pub fn on_battle_end(&mut self, renderer: &mut dyn Renderer) {
        if !self.in_battle {
            return;
        }
        info!(count = self.registry.len(), "战斗立绘结束");
        self.registry.erase_all(renderer);
        self.party.clear();
        self.in_battle = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::{Comparison, Condition};
    use crate::game_state::MemoryGameState;
    use crate::pattern::Pattern;
    use crate::renderer::{RecordingRenderer, RenderCall, RenderTarget};

    fn stage() -> BattleStage {
        BattleStage::new(PatternBook::new(vec![
            Pattern::new(0, 1, "hero_hurt", 11)
                .with_condition(Condition::hp_percentage(Comparison::AtMost(30))),
            Pattern::new(1, 1, "hero", 10),
            Pattern::new(2, 3, "healer", 12),
        ]))
    }

    #[test]
    fn test_battle_start_resolves_immediately() {
        let mut stage = stage();
        let mut renderer = RecordingRenderer::new();
        let mut state = MemoryGameState::new();
        state.set_hp(1, 100, 100);

        stage.on_battle_start(&[1, 2, 3], &state, &mut renderer);
        assert!(stage.is_in_battle());
        assert_eq!(renderer.show_count(), 2);
        assert_eq!(stage.registry().shown(1).unwrap().image, "hero");
        assert!(stage.registry().shown(2).is_none());
    }

    #[test]
    fn test_tick_only_reacts_to_changes() {
        let mut stage = stage();
        let mut renderer = RecordingRenderer::new();
        let mut state = MemoryGameState::new();
        state.set_hp(1, 100, 100);
        stage.on_battle_start(&[1], &state, &mut renderer);
        renderer.take();

        for _ in 0..10 {
            stage.tick(&state, &mut renderer);
        }
        assert!(renderer.calls.is_empty());

        state.set_hp(1, 20, 100);
        stage.tick(&state, &mut renderer);
        let calls = renderer.take();
        assert_eq!(calls[0], RenderCall::Erase { target: RenderTarget::Picture(10) });
        assert_eq!(calls[1].target(), RenderTarget::Picture(11));
    }

    #[test]
    fn test_tick_outside_battle_is_noop() {
        let mut stage = stage();
        let mut renderer = RecordingRenderer::new();
        stage.tick(&MemoryGameState::new(), &mut renderer);
        assert!(renderer.calls.is_empty());
    }

    #[test]
    fn test_battle_end_erases_everything() {
        let mut stage = stage();
        let mut renderer = RecordingRenderer::new();
        stage.on_battle_start(&[1, 3], &MemoryGameState::new(), &mut renderer);
        renderer.take();

        stage.on_battle_end(&mut renderer);
        assert_eq!(renderer.erase_count(), 2);
        assert!(stage.registry().is_empty());
        assert!(!stage.is_in_battle());

        stage.on_battle_end(&mut renderer);
        assert_eq!(renderer.erase_count(), 2);
    }
}

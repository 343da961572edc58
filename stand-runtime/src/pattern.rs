//! # Pattern 模块
//!
//! 战斗立绘模式与模式解析。
//!
//! 每个角色有一个有序的模式列表。解析时按声明顺序查找第一个
//! 条件全部满足（或没有条件）的模式；都不满足时返回列表中的**最后一个**
//! 模式作为兜底，无论它自己的条件是否满足。

use std::collections::HashMap;

use crate::condition::{Condition, SpecifiedStateIndex};
use crate::game_state::{ActorId, GameState};
use crate::registry::PictureIdentity;
use crate::renderer::{BlendMode, Origin, PictureParams};

/// 立绘模式
///
/// 加载后不可变。`picture_id` 是显示用的图片编号（同一编号同时只能显示一张图）。
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    /// 加载顺序编号
    pub id: usize,
    /// 所属角色
    pub actor_id: ActorId,
    /// 条件列表（全部满足时匹配）
    pub conditions: Vec<Condition>,
    /// 图片名
    pub image: String,
    /// 图片编号
    pub picture_id: u32,
    pub x: f32,
    pub y: f32,
    /// X 缩放（百分比）
    pub scale_x: f32,
    /// Y 缩放（百分比）
    pub scale_y: f32,
    pub opacity: u8,
}

impl Pattern {
    /// 创建无条件、默认几何参数的模式
    pub fn new(id: usize, actor_id: ActorId, image: impl Into<String>, picture_id: u32) -> Self {
        Self {
            id,
            actor_id,
            conditions: Vec::new(),
            image: image.into(),
            picture_id,
            x: 0.0,
            y: 0.0,
            scale_x: 100.0,
            scale_y: 100.0,
            opacity: 255,
        }
    }

    /// 追加条件
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// 条件是否全部满足（无条件视为满足）
    pub fn matches(&self, state: &dyn GameState, index: &SpecifiedStateIndex) -> bool {
        self.conditions
            .iter()
            .all(|c| c.evaluate(self.actor_id, state, index))
    }

    /// 图片身份（编号 + 图片名）
    pub fn identity(&self) -> PictureIdentity {
        PictureIdentity {
            picture_id: self.picture_id,
            image: self.image.clone(),
        }
    }

    /// 显示参数
    pub fn show_params(&self) -> PictureParams {
        PictureParams {
            image: self.image.clone(),
            origin: Origin::UpperLeft,
            x: self.x,
            y: self.y,
            scale_x: self.scale_x,
            scale_y: self.scale_y,
            opacity: self.opacity,
            blend_mode: BlendMode::Normal,
        }
    }
}

/// 从有序模式列表中选出当前应显示的模式
///
/// - 第一个完全匹配的模式胜出
/// - 无匹配时返回最后一个模式
/// - 列表为空时返回 `None`
pub fn resolve<'a>(
    patterns: &'a [Pattern],
    state: &dyn GameState,
    index: &SpecifiedStateIndex,
) -> Option<&'a Pattern> {
    patterns
        .iter()
        .find(|p| p.matches(state, index))
        .or_else(|| patterns.last())
}

/// 按角色分组的模式表
///
/// 同时持有由全部模式派生的 [`SpecifiedStateIndex`]。
#[derive(Debug, Clone, Default)]
pub struct PatternBook {
    by_actor: HashMap<ActorId, Vec<Pattern>>,
    index: SpecifiedStateIndex,
}

impl PatternBook {
    /// 从模式列表构建（保持每个角色内的声明顺序）
    pub fn new(patterns: Vec<Pattern>) -> Self {
        let index = SpecifiedStateIndex::build(&patterns);
        let mut by_actor: HashMap<ActorId, Vec<Pattern>> = HashMap::new();
        for pattern in patterns {
            by_actor.entry(pattern.actor_id).or_default().push(pattern);
        }
        Self { by_actor, index }
    }

    /// 角色的模式列表
    pub fn patterns_for(&self, actor: ActorId) -> &[Pattern] {
        self.by_actor.get(&actor).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 状态引用索引
    pub fn index(&self) -> &SpecifiedStateIndex {
        &self.index
    }

    /// 为角色解析模式
    pub fn resolve(&self, actor: ActorId, state: &dyn GameState) -> Option<&Pattern> {
        resolve(self.patterns_for(actor), state, &self.index)
    }

    /// 模式总数
    pub fn len(&self) -> usize {
        self.by_actor.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_actor.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Comparison;
    use crate::game_state::MemoryGameState;

    fn book() -> PatternBook {
        PatternBook::new(vec![
            Pattern::new(0, 1, "hero_hurt", 1)
                .with_condition(Condition::hp_percentage(Comparison::AtMost(30))),
            Pattern::new(1, 1, "hero_poison", 1).with_condition(Condition::state(Some(4))),
            Pattern::new(2, 2, "mage_default", 2),
            Pattern::new(3, 1, "hero_night", 1).with_condition(Condition::switch(5, true)),
        ])
    }

    #[test]
    fn test_first_match_wins() {
        let book = book();
        let mut state = MemoryGameState::new();
        state.set_hp(1, 10, 100);
        state.add_state(1, 4);

        let resolved = book.resolve(1, &state).unwrap();
        assert_eq!(resolved.image, "hero_hurt");
    }

    #[test]
    fn test_declared_order_is_kept_per_actor() {
        let book = book();
        let images: Vec<_> = book.patterns_for(1).iter().map(|p| p.image.as_str()).collect();
        assert_eq!(images, ["hero_hurt", "hero_poison", "hero_night"]);
        assert_eq!(book.len(), 4);
    }

    #[test]
    fn test_fallback_is_last_pattern_even_if_it_fails() {
        let book = book();
        let mut state = MemoryGameState::new();
        state.set_hp(1, 100, 100);

        let resolved = book.resolve(1, &state).unwrap();
        assert_eq!(resolved.image, "hero_night");
        assert!(!resolved.matches(&state, book.index()));
    }

    #[test]
    fn test_unconditional_pattern_matches_immediately() {
        let book = book();
        let state = MemoryGameState::new();
        assert_eq!(book.resolve(2, &state).unwrap().image, "mage_default");
    }

    #[test]
    fn test_empty_list_resolves_to_none() {
        let book = book();
        let state = MemoryGameState::new();
        assert!(book.resolve(99, &state).is_none());
        assert!(resolve(&[], &state, book.index()).is_none());
    }

    #[test]
    fn test_non_empty_list_always_resolves() {
        let book = book();
        let mut state = MemoryGameState::new();
        for hp in [0, 25, 50, 100] {
            for switch in [false, true] {
                state.set_hp(1, hp, 100);
                state.set_switch(5, switch);
                assert!(book.resolve(1, &state).is_some());
            }
        }
    }

    #[test]
    fn test_book_builds_state_index() {
        let book = book();
        assert!(book.index().get(1).unwrap().contains(&4));
        assert!(book.index().get(2).is_none());
    }
}

//! # Condition 模块
//!
//! 单条显示条件的定义与求值。
//!
//! ## 求值规则
//!
//! | 种类 | 为真条件 |
//! |------|----------|
//! | `switch` | 开关值等于 `switch_value` |
//! | `variable` / `hp-percentage` / `mp-percentage` | 数值满足比较（`=` 优先，其次 `>=`，再次 `<=`） |
//! | `state`（有目标） | 角色附加了目标状态 |
//! | `state`（无目标） | 角色不带有该角色在其他条件中引用过的任何状态 |
//!
//! 最后若 `negate` 为真则取反。缺少必要字段的条件恒为假（取反前）。

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::game_state::{ActorId, GameState, StateId};
use crate::pattern::Pattern;

/// 条件种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionKind {
    /// 开关
    Switch,
    /// 变量
    Variable,
    /// HP 百分比
    HpPercentage,
    /// MP 百分比
    MpPercentage,
    /// 状态
    State,
    /// 无法识别的种类（恒为假）
    #[serde(other)]
    Unknown,
}

/// 数值比较
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    /// `value == n`
    Equal(i64),
    /// `value >= n`
    AtLeast(i64),
    /// `value <= n`
    AtMost(i64),
}

impl Comparison {
    /// 按优先级（`=` > `>=` > `<=`）推断比较方式，三者都缺失时返回 `None`
    pub fn infer(is_equal: Option<i64>, gte: Option<i64>, lte: Option<i64>) -> Option<Self> {
        is_equal
            .map(Self::Equal)
            .or(gte.map(Self::AtLeast))
            .or(lte.map(Self::AtMost))
    }

    /// 判断数值是否满足比较
    pub fn matches(&self, value: i64) -> bool {
        match *self {
            Self::Equal(n) => value == n,
            Self::AtLeast(n) => value >= n,
            Self::AtMost(n) => value <= n,
        }
    }
}

/// 单条显示条件
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// 条件种类
    pub kind: ConditionKind,
    /// 是否取反
    pub negate: bool,
    /// 目标 ID（开关/变量/状态，百分比类不使用）
    pub target: Option<u32>,
    /// 开关期望值
    pub switch_value: Option<bool>,
    /// 数值比较
    pub comparison: Option<Comparison>,
}

impl Condition {
    fn new(kind: ConditionKind) -> Self {
        Self {
            kind,
            negate: false,
            target: None,
            switch_value: None,
            comparison: None,
        }
    }

    /// 开关条件
    pub fn switch(id: u32, value: bool) -> Self {
        Self {
            target: Some(id),
            switch_value: Some(value),
            ..Self::new(ConditionKind::Switch)
        }
    }

    /// 变量条件
    pub fn variable(id: u32, comparison: Comparison) -> Self {
        Self {
            target: Some(id),
            comparison: Some(comparison),
            ..Self::new(ConditionKind::Variable)
        }
    }

    /// HP 百分比条件
    pub fn hp_percentage(comparison: Comparison) -> Self {
        Self {
            comparison: Some(comparison),
            ..Self::new(ConditionKind::HpPercentage)
        }
    }

    /// MP 百分比条件
    pub fn mp_percentage(comparison: Comparison) -> Self {
        Self {
            comparison: Some(comparison),
            ..Self::new(ConditionKind::MpPercentage)
        }
    }

    /// 状态条件，`None` 表示"不带有任何已引用状态"
    pub fn state(state: Option<StateId>) -> Self {
        Self {
            target: state,
            ..Self::new(ConditionKind::State)
        }
    }

    /// 取反
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    /// 对指定角色求值
    pub fn evaluate(
        &self,
        actor: ActorId,
        state: &dyn GameState,
        index: &SpecifiedStateIndex,
    ) -> bool {
        let result = match self.kind {
            ConditionKind::Switch => match (self.target, self.switch_value) {
                (Some(id), Some(expected)) => state.switch(id) == expected,
                _ => false,
            },
            ConditionKind::Variable => match self.target {
                Some(id) => self.compare(state.variable(id)),
                None => false,
            },
            ConditionKind::HpPercentage => self.compare(state.hp_pct(actor)),
            ConditionKind::MpPercentage => self.compare(state.mp_pct(actor)),
            ConditionKind::State => match self.target {
                Some(id) => state.has_state(actor, id),
                None => match index.get(actor) {
                    Some(referenced) => state
                        .states_of(actor)
                        .iter()
                        .all(|s| !referenced.contains(s)),
                    None => false,
                },
            },
            // 未知种类直接返回，不参与取反
            ConditionKind::Unknown => return false,
        };

        result != self.negate
    }

    fn compare(&self, value: i64) -> bool {
        self.comparison.is_some_and(|c| c.matches(value))
    }
}

/// 每个角色在 `state` 条件中显式引用过的状态集合
///
/// 用于无目标的 `state` 条件：只检查这些状态，而不是角色身上的所有状态。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpecifiedStateIndex {
    by_actor: HashMap<ActorId, BTreeSet<StateId>>,
}

impl SpecifiedStateIndex {
    /// 从模式列表构建索引
    pub fn build<'a>(patterns: impl IntoIterator<Item = &'a Pattern>) -> Self {
        let mut index = Self::default();
        for pattern in patterns {
            for condition in &pattern.conditions {
                if condition.kind == ConditionKind::State
                    && let Some(state) = condition.target
                {
                    index.insert(pattern.actor_id, state);
                }
            }
        }
        index
    }

    /// 记录一个被引用的状态
    pub fn insert(&mut self, actor: ActorId, state: StateId) {
        self.by_actor.entry(actor).or_default().insert(state);
    }

    /// 获取角色的引用状态集合
    pub fn get(&self, actor: ActorId) -> Option<&BTreeSet<StateId>> {
        self.by_actor.get(&actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_state::MemoryGameState;

    fn eval(condition: &Condition, state: &MemoryGameState) -> bool {
        condition.evaluate(1, state, &SpecifiedStateIndex::default())
    }

    fn with_variable(value: i64) -> MemoryGameState {
        let mut state = MemoryGameState::new();
        state.set_variable(10, value);
        state
    }

    #[test]
    fn test_comparison_infer_priority() {
        assert_eq!(
            Comparison::infer(Some(5), Some(1), Some(9)),
            Some(Comparison::Equal(5))
        );
        assert_eq!(
            Comparison::infer(None, Some(1), Some(9)),
            Some(Comparison::AtLeast(1))
        );
        assert_eq!(
            Comparison::infer(None, None, Some(9)),
            Some(Comparison::AtMost(9))
        );
        assert_eq!(Comparison::infer(None, None, None), None);
    }

    #[test]
    fn test_variable_truth_table() {
        let equal = Condition::variable(10, Comparison::Equal(5));
        assert!(eval(&equal, &with_variable(5)));
        assert!(!eval(&equal, &with_variable(4)));
        assert!(!eval(&equal, &with_variable(6)));

        let gte = Condition::variable(10, Comparison::AtLeast(5));
        assert!(eval(&gte, &with_variable(5)));
        assert!(eval(&gte, &with_variable(6)));
        assert!(!eval(&gte, &with_variable(4)));

        let lte = Condition::variable(10, Comparison::AtMost(5));
        assert!(eval(&lte, &with_variable(5)));
        assert!(eval(&lte, &with_variable(4)));
        assert!(!eval(&lte, &with_variable(6)));
    }

    #[test]
    fn test_negate_flips_truth_table() {
        let cases = [
            (Comparison::Equal(5), [(5, true), (4, false), (6, false)]),
            (Comparison::AtLeast(5), [(5, true), (6, true), (4, false)]),
            (Comparison::AtMost(5), [(5, true), (4, true), (6, false)]),
        ];

        for (comparison, rows) in cases {
            let negated = Condition::variable(10, comparison).negated();
            for (value, plain) in rows {
                assert_eq!(
                    eval(&negated, &with_variable(value)),
                    !plain,
                    "{:?} on {}",
                    comparison,
                    value
                );
            }
        }
    }

    #[test]
    fn test_missing_comparison_is_false_before_negation() {
        let mut condition = Condition::variable(10, Comparison::Equal(0));
        condition.comparison = None;
        assert!(!eval(&condition, &with_variable(0)));
        assert!(eval(&condition.negated(), &with_variable(0)));
    }

    #[test]
    fn test_switch_condition() {
        let mut state = MemoryGameState::new();
        let on = Condition::switch(3, true);
        let off = Condition::switch(3, false);

        assert!(!eval(&on, &state));
        assert!(eval(&off, &state));

        state.set_switch(3, true);
        assert!(eval(&on, &state));
        assert!(!eval(&off, &state));
    }

    #[test]
    fn test_malformed_switch_is_false() {
        let mut condition = Condition::switch(3, true);
        condition.switch_value = None;
        let mut state = MemoryGameState::new();
        state.set_switch(3, true);
        assert!(!eval(&condition, &state));
    }

    #[test]
    fn test_hp_and_mp_percentage() {
        let mut state = MemoryGameState::new();
        state.set_hp(1, 1, 3);
        state.set_mp(1, 2, 3);

        assert!(eval(&Condition::hp_percentage(Comparison::Equal(33)), &state));
        assert!(eval(&Condition::hp_percentage(Comparison::AtMost(50)), &state));
        assert!(eval(&Condition::mp_percentage(Comparison::Equal(67)), &state));
        assert!(!eval(&Condition::mp_percentage(Comparison::AtMost(50)), &state));
    }

    #[test]
    fn test_state_with_target() {
        let mut state = MemoryGameState::new();
        let poisoned = Condition::state(Some(4));
        assert!(!eval(&poisoned, &state));

        state.add_state(1, 4);
        assert!(eval(&poisoned, &state));
        assert!(!eval(&poisoned.negated(), &state));
    }

    #[test]
    fn test_state_without_target_uses_referenced_states_only() {
        let mut index = SpecifiedStateIndex::default();
        index.insert(1, 3);
        index.insert(1, 7);

        let no_state = Condition::state(None);
        let mut state = MemoryGameState::new();

        // 仅持有无关状态 9
        state.add_state(1, 9);
        assert!(no_state.evaluate(1, &state, &index));

        // 持有被引用的状态 3
        state.add_state(1, 3);
        assert!(!no_state.evaluate(1, &state, &index));
    }

    #[test]
    fn test_state_without_target_and_without_index_is_false() {
        let state = MemoryGameState::new();
        let no_state = Condition::state(None);
        assert!(!no_state.evaluate(1, &state, &SpecifiedStateIndex::default()));
    }

    #[test]
    fn test_unknown_kind_is_false_even_when_negated() {
        let condition = Condition::new(ConditionKind::Unknown).negated();
        assert!(!eval(&condition, &MemoryGameState::new()));
    }

    #[test]
    fn test_kind_deserialization() {
        let kind: ConditionKind = serde_json::from_str(r#""hp-percentage""#).unwrap();
        assert_eq!(kind, ConditionKind::HpPercentage);
        let kind: ConditionKind = serde_json::from_str(r#""weather""#).unwrap();
        assert_eq!(kind, ConditionKind::Unknown);
    }
}

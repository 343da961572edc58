//! # GameState 模块
//!
//! 只读的游戏状态查询接口。
//!
//! 立绘系统不直接访问引擎内部的开关、变量和角色数据，
//! 而是通过 [`GameState`] trait 查询。宿主负责实现它；
//! [`MemoryGameState`] 是一个纯内存实现，用于测试和 headless 宿主。

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// 角色 ID
pub type ActorId = u32;

/// 状态（异常状态/增益等）ID
pub type StateId = u32;

/// 只读游戏状态
///
/// 所有方法都必须是无副作用的，每帧可能被调用多次。
pub trait GameState {
    /// 开关值（未定义的开关为 `false`）
    fn switch(&self, id: u32) -> bool;

    /// 变量值（未定义的变量为 0）
    fn variable(&self, id: u32) -> i64;

    /// HP 百分比：`round(hp / max_hp * 100)`
    fn hp_pct(&self, actor: ActorId) -> i64;

    /// MP 百分比：`round(mp / max_mp * 100)`
    fn mp_pct(&self, actor: ActorId) -> i64;

    /// 角色当前附加的所有状态
    fn states_of(&self, actor: ActorId) -> BTreeSet<StateId>;

    /// 角色是否附加了指定状态
    fn has_state(&self, actor: ActorId, state: StateId) -> bool {
        self.states_of(actor).contains(&state)
    }
}

/// 计算四舍五入后的百分比，`max <= 0` 时返回 0
pub fn stat_percentage(current: i64, max: i64) -> i64 {
    if max <= 0 {
        return 0;
    }
    (current as f64 / max as f64 * 100.0).round() as i64
}

/// 单个角色的数值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorStats {
    pub hp: i64,
    pub max_hp: i64,
    pub mp: i64,
    pub max_mp: i64,
    #[serde(default)]
    pub states: BTreeSet<StateId>,
}

impl Default for ActorStats {
    fn default() -> Self {
        Self {
            hp: 100,
            max_hp: 100,
            mp: 100,
            max_mp: 100,
            states: BTreeSet::new(),
        }
    }
}

/// 纯内存的游戏状态
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryGameState {
    #[serde(default)]
    pub switches: HashMap<u32, bool>,
    #[serde(default)]
    pub variables: HashMap<u32, i64>,
    #[serde(default)]
    pub actors: HashMap<ActorId, ActorStats>,
}

impl MemoryGameState {
    /// 创建空状态
    pub fn new() -> Self {
        Self::default()
    }

    /// 设置开关
    pub fn set_switch(&mut self, id: u32, value: bool) {
        self.switches.insert(id, value);
    }

    /// 设置变量
    pub fn set_variable(&mut self, id: u32, value: i64) {
        self.variables.insert(id, value);
    }

    /// 获取角色数据（不存在时以默认值创建）
    pub fn actor_mut(&mut self, actor: ActorId) -> &mut ActorStats {
        self.actors.entry(actor).or_default()
    }

    /// 设置 HP
    pub fn set_hp(&mut self, actor: ActorId, hp: i64, max_hp: i64) {
        let stats = self.actor_mut(actor);
        stats.hp = hp;
        stats.max_hp = max_hp;
    }

    /// 设置 MP
    pub fn set_mp(&mut self, actor: ActorId, mp: i64, max_mp: i64) {
        let stats = self.actor_mut(actor);
        stats.mp = mp;
        stats.max_mp = max_mp;
    }

    /// 附加状态
    pub fn add_state(&mut self, actor: ActorId, state: StateId) {
        self.actor_mut(actor).states.insert(state);
    }

    /// 解除状态
    pub fn remove_state(&mut self, actor: ActorId, state: StateId) {
        if let Some(stats) = self.actors.get_mut(&actor) {
            stats.states.remove(&state);
        }
    }
}

impl GameState for MemoryGameState {
    fn switch(&self, id: u32) -> bool {
        self.switches.get(&id).copied().unwrap_or(false)
    }

    fn variable(&self, id: u32) -> i64 {
        self.variables.get(&id).copied().unwrap_or(0)
    }

    fn hp_pct(&self, actor: ActorId) -> i64 {
        self.actors
            .get(&actor)
            .map(|s| stat_percentage(s.hp, s.max_hp))
            .unwrap_or(0)
    }

    fn mp_pct(&self, actor: ActorId) -> i64 {
        self.actors
            .get(&actor)
            .map(|s| stat_percentage(s.mp, s.max_mp))
            .unwrap_or(0)
    }

    fn states_of(&self, actor: ActorId) -> BTreeSet<StateId> {
        self.actors
            .get(&actor)
            .map(|s| s.states.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_percentage_rounds() {
        assert_eq!(stat_percentage(1, 3), 33);
        assert_eq!(stat_percentage(2, 3), 67);
        assert_eq!(stat_percentage(50, 100), 50);
        assert_eq!(stat_percentage(10, 0), 0);
    }

    #[test]
    fn test_memory_state_defaults() {
        let state = MemoryGameState::new();
        assert!(!state.switch(1));
        assert_eq!(state.variable(1), 0);
        assert_eq!(state.hp_pct(1), 0);
        assert!(state.states_of(1).is_empty());
    }

    #[test]
    fn test_memory_state_updates() {
        let mut state = MemoryGameState::new();
        state.set_switch(3, true);
        state.set_variable(4, -7);
        state.set_hp(1, 30, 120);
        state.add_state(1, 9);

        assert!(state.switch(3));
        assert_eq!(state.variable(4), -7);
        assert_eq!(state.hp_pct(1), 25);
        assert_eq!(state.mp_pct(1), 100);
        assert!(state.has_state(1, 9));

        state.remove_state(1, 9);
        assert!(!state.has_state(1, 9));
    }

    #[test]
    fn test_memory_state_deserialization() {
        let json = r#"{
            "switches": {"1": true},
            "actors": {"2": {"hp": 10, "maxHp": 40, "mp": 0, "maxMp": 0, "states": [4]}}
        }"#;
        let state: MemoryGameState = serde_json::from_str(json).unwrap();
        assert!(state.switch(1));
        assert_eq!(state.hp_pct(2), 25);
        assert_eq!(state.mp_pct(2), 0);
        assert!(state.has_state(2, 4));
    }
}

// ==========================================
// 联赛赛程恢复引擎 - 决策变量索引
// ==========================================
// 职责: 为每个候选键分配稳定的整数下标
// 红线: 幂等，同一键重复索引返回同一下标
// ==========================================

use crate::domain::fixture::{Match, MatchId};
use crate::domain::types::TeamId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;

/// 逐场建模的变量键
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchDateKey {
    pub home: TeamId,
    pub away: TeamId,
    pub original_date: NaiveDate,
    pub game_date: NaiveDate,
    pub proposed_date: NaiveDate,
}

impl MatchDateKey {
    pub fn new(m: &Match, proposed_date: NaiveDate) -> Self {
        Self {
            home: m.home.clone(),
            away: m.away.clone(),
            original_date: m.original_date,
            game_date: m.game_date,
            proposed_date,
        }
    }

    pub fn match_id(&self) -> MatchId {
        MatchId {
            home: self.home.clone(),
            away: self.away.clone(),
            game_date: self.game_date,
        }
    }

    pub fn day_delta(&self) -> i64 {
        (self.proposed_date - self.original_date).num_days().abs()
    }

    pub fn is_modified(&self) -> bool {
        self.proposed_date != self.original_date
    }

    pub fn to_match(&self) -> Match {
        Match {
            home: self.home.clone(),
            away: self.away.clone(),
            original_date: self.original_date,
            game_date: self.game_date,
            proposed_date: self.proposed_date,
        }
    }
}

// ==========================================
// DecisionVariableIndexer - 变量索引器
// ==========================================
#[derive(Debug, Clone)]
pub struct DecisionVariableIndexer<K> {
    keys: Vec<K>,
    index: HashMap<K, usize>,
}

impl<K: Clone + Eq + Hash> DecisionVariableIndexer<K> {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// 返回键的下标，不存在时按插入顺序分配
    pub fn index(&mut self, key: K) -> usize {
        if let Some(&i) = self.index.get(&key) {
            return i;
        }
        let i = self.keys.len();
        self.keys.push(key.clone());
        self.index.insert(key, i);
        i
    }

    /// 批量索引
    pub fn index_all(&mut self, keys: impl IntoIterator<Item = K>) -> Vec<usize> {
        keys.into_iter().map(|k| self.index(k)).collect()
    }

    pub fn get(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn key(&self, i: usize) -> Option<&K> {
        self.keys.get(i)
    }

    /// 按下标顺序的全部键
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K: Clone + Eq + Hash> Default for DecisionVariableIndexer<K> {
    fn default() -> Self {
        Self::new()
    }
}

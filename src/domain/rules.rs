// ==========================================
// 联赛赛程恢复引擎 - 联赛规则表
// ==========================================
// 职责: N 天窗口最大比赛数、连续比赛 (back-to-back) 上限
// 输入: 列名 Max_games_<N>_<condition> / Back2Backs_<condition>
// 红线: 每列取所有行的最大值作为生效规则
// ==========================================

use crate::domain::types::Condition;
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

const MAX_GAMES_PREFIX: &str = "max_games_";
const BACK2BACKS_PREFIX: &str = "back2backs_";

// ==========================================
// LeagueRules - 规则表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueRules {
    max_games: BTreeMap<(Condition, u32), u32>,
    back_to_backs: BTreeMap<Condition, u32>,
}

impl LeagueRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从原始表格行解析规则
    ///
    /// # 参数
    /// - rows: 每行为 列名 → 值 的映射（可包含多套规则场景）
    ///
    /// # 返回
    /// 每列取最大值后的规则表；无法识别的列忽略
    pub fn from_table(rows: &[HashMap<String, String>]) -> EngineResult<Self> {
        let mut rules = Self::new();

        for row in rows {
            for (column, raw) in row {
                let value = match raw.trim().parse::<f64>() {
                    Ok(v) if v >= 0.0 => v.round() as u32,
                    Ok(_) => {
                        return Err(EngineError::InvalidConfig(format!(
                            "规则列 {} 出现负值: {}",
                            column, raw
                        )))
                    }
                    Err(_) => continue, // 空单元格
                };

                let lower = column.trim().to_lowercase();
                if let Some(rest) = lower.strip_prefix(MAX_GAMES_PREFIX) {
                    if let Some((window, condition)) = parse_window_condition(rest) {
                        let entry = rules.max_games.entry((condition, window)).or_insert(0);
                        *entry = (*entry).max(value);
                    }
                } else if let Some(rest) = lower.strip_prefix(BACK2BACKS_PREFIX) {
                    if let Ok(condition) = rest.parse::<Condition>() {
                        let entry = rules.back_to_backs.entry(condition).or_insert(0);
                        *entry = (*entry).max(value);
                    }
                }
            }
        }

        Ok(rules)
    }

    /// 设置 N 天窗口最大比赛数（保留较大值）
    pub fn insert_max_games(&mut self, condition: Condition, window: u32, value: u32) {
        let entry = self.max_games.entry((condition, window)).or_insert(0);
        *entry = (*entry).max(value);
    }

    pub fn insert_back_to_backs(&mut self, condition: Condition, value: u32) {
        let entry = self.back_to_backs.entry(condition).or_insert(0);
        *entry = (*entry).max(value);
    }

    /// 查询 (condition, window) 规则
    pub fn max_games(&self, condition: Condition, window: u32) -> EngineResult<u32> {
        self.max_games
            .get(&(condition, window))
            .copied()
            .ok_or(EngineError::RuleLookupMiss { condition, window })
    }

    /// 某条件下规则表中出现的所有窗口长度（升序）
    pub fn windows(&self, condition: Condition) -> Vec<u32> {
        self.max_games
            .keys()
            .filter(|(c, _)| *c == condition)
            .map(|(_, w)| *w)
            .collect()
    }

    pub fn back_to_backs(&self, condition: Condition) -> Option<u32> {
        self.back_to_backs.get(&condition).copied()
    }
}

/// 解析 "<N>_<condition>"
fn parse_window_condition(rest: &str) -> Option<(u32, Condition)> {
    let (window, condition) = rest.split_once('_')?;
    let window = window.parse::<u32>().ok()?;
    let condition = condition.parse::<Condition>().ok()?;
    Some((window, condition))
}

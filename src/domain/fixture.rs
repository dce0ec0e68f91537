// ==========================================
// 联赛赛程恢复引擎 - 赛程数据模型
// ==========================================
// 职责: 赛程行 (FixtureRow)、工作比赛 (Match)、赛程快照 (Fixture)
// 红线: (home, away, game_date) 唯一确定一场比赛
// 红线: game_date 为历史实际比赛日期，加载后不可变
// ==========================================

use crate::domain::types::{Condition, TeamId};
use crate::engine::error::{EngineError, EngineResult};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

// ==========================================
// MatchId - 比赛身份键
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchId {
    pub home: TeamId,
    pub away: TeamId,
    pub game_date: NaiveDate,
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} ({})", self.away, self.home, self.game_date)
    }
}

// ==========================================
// FixtureRow - 赛程表输入行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRow {
    pub home: TeamId,
    pub visitor: TeamId,
    /// 当前轮次的计划日期（跨轮次会被更新）
    pub original_date: NaiveDate,
    /// 历史实际比赛日期
    pub game_date: NaiveDate,
    /// 历史上是否发生过改期
    pub reschedule: bool,
    /// game_date 与最初计划日期的差值（天）
    pub day_difference: i64,
}

impl FixtureRow {
    pub fn id(&self) -> MatchId {
        MatchId {
            home: self.home.clone(),
            away: self.visitor.clone(),
            game_date: self.game_date,
        }
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home == team || self.visitor == team
    }

    /// 球队在本场的主客场条件
    pub fn condition_for(&self, team: &str) -> Option<Condition> {
        if self.home == team {
            Some(Condition::Home)
        } else if self.visitor == team {
            Some(Condition::Away)
        } else {
            None
        }
    }

    /// 历史改期的锚点日期（最初计划日期）
    ///
    /// 仅依赖历史字段，跨轮次保持不变
    pub fn planned_anchor(&self) -> NaiveDate {
        self.game_date - Duration::days(self.day_difference)
    }

    /// 是否为已观测到的延期（封锁窗口来源）
    pub fn is_observed_postponement(&self) -> bool {
        self.reschedule && self.day_difference > 0
    }

    /// 转换为工作比赛，proposed_date 初始化为 original_date
    pub fn to_match(&self) -> Match {
        Match {
            home: self.home.clone(),
            away: self.visitor.clone(),
            original_date: self.original_date,
            game_date: self.game_date,
            proposed_date: self.original_date,
        }
    }
}

// ==========================================
// Match - 工作比赛
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Match {
    pub home: TeamId,
    pub away: TeamId,
    pub original_date: NaiveDate,
    pub game_date: NaiveDate,
    pub proposed_date: NaiveDate,
}

impl Match {
    pub fn id(&self) -> MatchId {
        MatchId {
            home: self.home.clone(),
            away: self.away.clone(),
            game_date: self.game_date,
        }
    }

    /// 改期天数 |proposed_date - original_date|
    pub fn day_delta(&self) -> i64 {
        (self.proposed_date - self.original_date).num_days().abs()
    }

    pub fn is_modified(&self) -> bool {
        self.proposed_date != self.original_date
    }

    pub fn involves(&self, team: &str) -> bool {
        self.home == team || self.away == team
    }

    /// 以新日期复制（用于生成候选，不修改原对象）
    pub fn with_proposed(&self, proposed_date: NaiveDate) -> Match {
        Match {
            proposed_date,
            ..self.clone()
        }
    }
}

// ==========================================
// DateOverride - 赛程日期修正
// ==========================================
// 加载时应用的人工修正，按 (home, visitor, from) 定位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateOverride {
    pub home: TeamId,
    pub visitor: TeamId,
    pub from: NaiveDate,
    pub to: NaiveDate,
}

// ==========================================
// Fixture - 赛程快照
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    rows: Vec<FixtureRow>,
}

impl Fixture {
    /// 构建赛程快照并校验 (home, visitor, game_date) 唯一性
    pub fn new(rows: Vec<FixtureRow>) -> EngineResult<Self> {
        let mut seen = HashSet::with_capacity(rows.len());
        for row in &rows {
            if !seen.insert(row.id()) {
                return Err(EngineError::DuplicateMatch(row.id()));
            }
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[FixtureRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [FixtureRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 所有球队（主客队并集，有序）
    pub fn teams(&self) -> BTreeSet<TeamId> {
        self.rows
            .iter()
            .flat_map(|r| [r.home.clone(), r.visitor.clone()])
            .collect()
    }

    /// 球队的全部比赛，按 original_date 排序
    pub fn team_rows(&self, team: &str) -> Vec<&FixtureRow> {
        let mut rows: Vec<&FixtureRow> = self.rows.iter().filter(|r| r.involves(team)).collect();
        rows.sort_by(|a, b| {
            a.original_date
                .cmp(&b.original_date)
                .then(a.game_date.cmp(&b.game_date))
        });
        rows
    }

    pub fn find(&self, id: &MatchId) -> Option<&FixtureRow> {
        self.rows.iter().find(|r| {
            r.home == id.home && r.visitor == id.away && r.game_date == id.game_date
        })
    }

    /// 最早计划日期
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|r| r.original_date).min()
    }

    /// 最晚计划日期（已知赛程的终点）
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.iter().map(|r| r.original_date).max()
    }

    /// 应用人工日期修正，返回命中条数
    pub fn apply_overrides(&mut self, overrides: &[DateOverride]) -> usize {
        let mut applied = 0;
        for ov in overrides {
            for row in self.rows.iter_mut() {
                if row.home == ov.home && row.visitor == ov.visitor && row.original_date == ov.from
                {
                    row.original_date = ov.to;
                    applied += 1;
                }
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, day).unwrap()
    }

    fn row(home: &str, visitor: &str, day: u32) -> FixtureRow {
        FixtureRow {
            home: home.to_string(),
            visitor: visitor.to_string(),
            original_date: d(day),
            game_date: d(day),
            reschedule: false,
            day_difference: 0,
        }
    }

    #[test]
    fn test_duplicate_match_is_rejected() {
        let result = Fixture::new(vec![row("A", "B", 3), row("A", "B", 3)]);
        assert!(matches!(result, Err(EngineError::DuplicateMatch(_))));
    }

    #[test]
    fn test_team_rows_sorted_by_original_date() {
        let fixture = Fixture::new(vec![row("A", "B", 9), row("C", "A", 2), row("B", "C", 5)]).unwrap();
        let dates: Vec<_> = fixture.team_rows("A").iter().map(|r| r.original_date).collect();
        assert_eq!(dates, vec![d(2), d(9)]);
        assert_eq!(fixture.teams().len(), 3);
    }

    #[test]
    fn test_planned_anchor_uses_day_difference() {
        let mut r = row("A", "B", 20);
        r.reschedule = true;
        r.day_difference = 6;
        assert_eq!(r.planned_anchor(), d(14));
        assert!(r.is_observed_postponement());
    }

    #[test]
    fn test_apply_overrides() {
        let mut fixture = Fixture::new(vec![row("A", "B", 9)]).unwrap();
        let applied = fixture.apply_overrides(&[DateOverride {
            home: "A".to_string(),
            visitor: "B".to_string(),
            from: d(9),
            to: d(11),
        }]);
        assert_eq!(applied, 1);
        assert_eq!(fixture.rows()[0].original_date, d(11));
    }
}

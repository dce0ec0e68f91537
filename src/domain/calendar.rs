// ==========================================
// 联赛赛程恢复引擎 - 赛历与封锁窗口
// ==========================================
// 职责: 联赛日期区间、延长期日期、球队封锁窗口表
// 红线: 封锁窗口为闭区间，窗口内不得分配候选日期
// ==========================================

use crate::domain::fixture::Fixture;
use crate::domain::types::TeamId;
use crate::engine::error::{EngineError, EngineResult};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// BlackoutWindow - 封锁窗口
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlackoutWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BlackoutWindow {
    /// 构建闭区间窗口；start > end 时返回 None
    pub fn new(start: NaiveDate, end: NaiveDate) -> Option<Self> {
        (start <= end).then_some(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

// ==========================================
// RescheduleWindowTable - 各球队封锁窗口
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RescheduleWindowTable {
    windows: BTreeMap<TeamId, Vec<BlackoutWindow>>,
}

impl RescheduleWindowTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加窗口（同一球队重复窗口去重）
    pub fn insert(&mut self, team: &str, window: BlackoutWindow) {
        let list = self.windows.entry(team.to_string()).or_default();
        if !list.contains(&window) {
            list.push(window);
            list.sort();
        }
    }

    pub fn windows_for(&self, team: &str) -> &[BlackoutWindow] {
        self.windows.get(team).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, team: &str, date: NaiveDate) -> bool {
        self.windows_for(team).iter().any(|w| w.contains(date))
    }

    /// 日期是否落入任一参赛球队的封锁窗口
    pub fn blocks_match(&self, home: &str, away: &str, date: NaiveDate) -> bool {
        self.contains(home, date) || self.contains(away, date)
    }

    pub fn total_windows(&self) -> usize {
        self.windows.values().map(Vec::len).sum()
    }
}

// ==========================================
// LeagueCalendar - 联赛赛历
// ==========================================
// 联赛日期 = [最早计划日期, 最晚计划日期]
// 延长期 = 最晚计划日期之后的 extended_horizon_days 天
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeagueCalendar {
    first: NaiveDate,
    last: NaiveDate,
    extended_horizon_days: i64,
}

impl LeagueCalendar {
    pub fn new(first: NaiveDate, last: NaiveDate, extended_horizon_days: i64) -> Self {
        Self {
            first,
            last,
            extended_horizon_days: extended_horizon_days.max(0),
        }
    }

    pub fn from_fixture(fixture: &Fixture, extended_horizon_days: i64) -> EngineResult<Self> {
        match (fixture.first_date(), fixture.last_date()) {
            (Some(first), Some(last)) => Ok(Self::new(first, last, extended_horizon_days)),
            _ => Err(EngineError::InvalidConfig("赛程为空，无法构建赛历".to_string())),
        }
    }

    pub fn first_date(&self) -> NaiveDate {
        self.first
    }

    /// 已知赛程终点
    pub fn last_date(&self) -> NaiveDate {
        self.last
    }

    pub fn league_dates(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last;
        self.first.iter_days().take_while(move |d| *d <= last)
    }

    pub fn extended_dates(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.last + Duration::days(1);
        let end = self.last + Duration::days(self.extended_horizon_days);
        start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn extended_end(&self) -> NaiveDate {
        self.last + Duration::days(self.extended_horizon_days)
    }

    pub fn is_extended(&self, date: NaiveDate) -> bool {
        date > self.last
    }

    /// 超出已知赛程终点的天数（未超出为 0）
    pub fn days_beyond_horizon(&self, date: NaiveDate) -> i64 {
        (date - self.last).num_days().max(0)
    }
}

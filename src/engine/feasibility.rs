// ==========================================
// 联赛赛程恢复引擎 - 可行性校验
// ==========================================
// 职责: 校验比赛序列是否满足 N 天窗口最大比赛数规则
// 输入: 带 proposed_date 的比赛序列
// 输出: bool
// 红线: 所有序列变更路径（平移、插入）共用同一校验入口
// 红线: 规则缺失在构建时报错 (RuleLookupMiss)
// ==========================================

use crate::domain::fixture::Match;
use crate::domain::rules::LeagueRules;
use crate::domain::types::Condition;
use crate::engine::error::EngineResult;
use chrono::{Duration, NaiveDate};

// ==========================================
// FeasibilityValidator - 可行性校验器
// ==========================================
#[derive(Debug, Clone)]
pub struct FeasibilityValidator {
    /// 序列校验使用的 (窗口长度, 上限)，窗口 1..=max_window
    sequence_limits: Vec<(u32, u32)>,
    /// 单日预筛使用的 (窗口长度, 上限)，规则表中全部 all 窗口
    density_limits: Vec<(u32, u32)>,
}

impl FeasibilityValidator {
    /// 构建校验器
    ///
    /// # 参数
    /// - rules: 联赛规则表
    /// - max_window: 序列校验的最大窗口长度（通常为 3）
    ///
    /// # 返回
    /// - Err(RuleLookupMiss): 规则表缺少 (all, w) 规则
    pub fn new(rules: &LeagueRules, max_window: u32) -> EngineResult<Self> {
        let sequence_limits = (1..=max_window)
            .map(|w| Ok((w, rules.max_games(Condition::All, w)?)))
            .collect::<EngineResult<Vec<_>>>()?;

        let density_limits = rules
            .windows(Condition::All)
            .into_iter()
            .map(|w| Ok((w, rules.max_games(Condition::All, w)?)))
            .collect::<EngineResult<Vec<_>>>()?;

        Ok(Self {
            sequence_limits,
            density_limits,
        })
    }

    /// 校验比赛序列
    ///
    /// 对序列覆盖的每一天 d 与每个窗口 w，统计 proposed_date ∈ [d, d+w-1] 的比赛数，
    /// 超过 max_games(all, w) 即不可行
    pub fn validate(&self, sequence: &[Match]) -> bool {
        let mut dates: Vec<NaiveDate> = sequence.iter().map(|m| m.proposed_date).collect();
        dates.sort();

        let (first, last) = match (dates.first(), dates.last()) {
            (Some(f), Some(l)) => (*f, *l),
            _ => return true,
        };

        first
            .iter_days()
            .take_while(|d| *d <= last)
            .all(|day| window_counts_ok(&dates, day, &self.sequence_limits))
    }

    /// 单日预筛：在球队现有比赛日期上再加一场是否仍满足全部密度规则
    ///
    /// # 参数
    /// - team_dates: 球队已排定的比赛日期（无需有序）
    /// - candidate: 候选日期
    pub fn admits_additional_game(&self, team_dates: &[NaiveDate], candidate: NaiveDate) -> bool {
        let mut dates: Vec<NaiveDate> = team_dates.to_vec();
        dates.push(candidate);
        dates.sort();

        self.density_limits.iter().all(|&(window, limit)| {
            (0..window as i64).all(|back| {
                let start = candidate - Duration::days(back);
                count_in(&dates, start, window) <= limit as usize
            })
        })
    }
}

fn window_counts_ok(sorted: &[NaiveDate], day: NaiveDate, limits: &[(u32, u32)]) -> bool {
    limits
        .iter()
        .all(|&(window, limit)| count_in(sorted, day, window) <= limit as usize)
}

/// 有序日期中落入 [start, start+window-1] 的数量
fn count_in(sorted: &[NaiveDate], start: NaiveDate, window: u32) -> usize {
    let end = start + Duration::days(window as i64 - 1);
    let lo = sorted.partition_point(|d| *d < start);
    let hi = sorted.partition_point(|d| *d <= end);
    hi.saturating_sub(lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::EngineError;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 4, day).unwrap()
    }

    fn m(away: &str, day: u32) -> Match {
        Match {
            home: "H".to_string(),
            away: away.to_string(),
            original_date: d(day),
            game_date: d(day),
            proposed_date: d(day),
        }
    }

    fn rules() -> LeagueRules {
        let mut rules = LeagueRules::new();
        rules.insert_max_games(Condition::All, 1, 1);
        rules.insert_max_games(Condition::All, 2, 2);
        rules.insert_max_games(Condition::All, 3, 2);
        rules
    }

    #[test]
    fn test_same_day_pair_is_infeasible() {
        let v = FeasibilityValidator::new(&rules(), 3).unwrap();
        let seq = vec![m("A", 5), m("B", 5).with_proposed(d(5))];
        assert!(!v.validate(&seq));
    }

    #[test]
    fn test_three_in_three_days_is_infeasible() {
        let v = FeasibilityValidator::new(&rules(), 3).unwrap();
        assert!(v.validate(&[m("A", 5), m("B", 6)]));
        assert!(!v.validate(&[m("A", 5), m("B", 6), m("C", 7)]));
        assert!(v.validate(&[m("A", 5), m("B", 7), m("C", 9)]));
    }

    #[test]
    fn test_unsorted_sequence_is_checked_by_date() {
        let v = FeasibilityValidator::new(&rules(), 3).unwrap();
        assert!(!v.validate(&[m("C", 7), m("A", 5), m("B", 6)]));
    }

    #[test]
    fn test_missing_rule_fails_construction() {
        let mut partial = LeagueRules::new();
        partial.insert_max_games(Condition::All, 1, 1);
        let err = FeasibilityValidator::new(&partial, 3).unwrap_err();
        assert!(matches!(err, EngineError::RuleLookupMiss { window: 2, .. }));
    }

    #[test]
    fn test_admits_additional_game() {
        let v = FeasibilityValidator::new(&rules(), 3).unwrap();
        assert!(!v.admits_additional_game(&[d(5)], d(5)));
        assert!(!v.admits_additional_game(&[d(5), d(6)], d(7)));
        assert!(v.admits_additional_game(&[d(5)], d(7)));
    }
}

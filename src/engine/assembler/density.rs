// ==========================================
// 联赛赛程恢复引擎 - 密度约束行
// ==========================================
// 职责: 每支球队每个 N 天滚动窗口的比赛数上限
// 红线: 右端项 = max_games(all, N) - 窗口内固定比赛数
// ==========================================

use super::model::{ConstraintFamily, MilpModel, Sense};
use crate::domain::fixture::{Fixture, MatchId};
use crate::domain::rules::LeagueRules;
use crate::domain::types::{Condition, TeamId};
use crate::engine::error::EngineResult;
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap, HashSet};

/// 变量在某球队某日的一次落点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Placement {
    pub var: usize,
    /// 互斥组：同组至多一个变量取 1
    pub group: usize,
}

pub(super) type TeamPlacements = BTreeMap<TeamId, BTreeMap<NaiveDate, Vec<Placement>>>;

/// 不由变量决定的比赛（按球队，日期有序）
pub(super) fn fixed_games(
    fixture: &Fixture,
    decided: &HashSet<MatchId>,
) -> BTreeMap<TeamId, Vec<NaiveDate>> {
    let mut fixed: BTreeMap<TeamId, Vec<NaiveDate>> = BTreeMap::new();
    for row in fixture.rows() {
        if decided.contains(&row.id()) {
            continue;
        }
        fixed.entry(row.home.clone()).or_default().push(row.original_date);
        fixed.entry(row.visitor.clone()).or_default().push(row.original_date);
    }
    for dates in fixed.values_mut() {
        dates.sort();
    }
    fixed
}

/// 添加密度约束行
///
/// 窗口起点遍历 [first_day, last_day]；最大可能活动量不超过右端项的行不添加
///
/// # 返回
/// 添加的行数
pub(super) fn add_density_rows(
    model: &mut MilpModel,
    rules: &LeagueRules,
    placements: &TeamPlacements,
    fixed: &BTreeMap<TeamId, Vec<NaiveDate>>,
    first_day: NaiveDate,
    last_day: NaiveDate,
) -> EngineResult<usize> {
    let mut added = 0;
    let no_fixed: Vec<NaiveDate> = Vec::new();

    for (team, by_date) in placements {
        let fixed_dates = fixed.get(team).unwrap_or(&no_fixed);

        for window in rules.windows(Condition::All) {
            let limit = rules.max_games(Condition::All, window)? as f64;
            let span = Duration::days(window as i64 - 1);

            for start in first_day.iter_days().take_while(|d| *d <= last_day) {
                let end = start + span;

                let mut coefficients: BTreeMap<usize, f64> = BTreeMap::new();
                let mut group_of: HashMap<usize, usize> = HashMap::new();
                for list in by_date.range(start..=end).map(|(_, l)| l) {
                    for p in list {
                        *coefficients.entry(p.var).or_insert(0.0) += 1.0;
                        group_of.insert(p.var, p.group);
                    }
                }
                if coefficients.is_empty() {
                    continue;
                }

                let lo = fixed_dates.partition_point(|d| *d < start);
                let hi = fixed_dates.partition_point(|d| *d <= end);
                let rhs = limit - (hi - lo) as f64;

                let mut group_max: HashMap<usize, f64> = HashMap::new();
                for (var, coef) in &coefficients {
                    let g = group_of.get(var).copied().unwrap_or(*var);
                    let entry = group_max.entry(g).or_insert(0.0);
                    *entry = entry.max(*coef);
                }
                let max_activity: f64 = group_max.values().sum();
                if max_activity <= rhs {
                    continue;
                }

                let (indices, values): (Vec<usize>, Vec<f64>) = coefficients.into_iter().unzip();
                model.add_row(ConstraintFamily::Density, indices, values, Sense::LessEqual, rhs);
                added += 1;
            }
        }
    }

    Ok(added)
}

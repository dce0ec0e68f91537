// ==========================================
// 联赛赛程恢复引擎 - 距离筛选
// ==========================================
// 职责: 按旅行距离容差筛选比赛的候选日期
// 输入: 待安排比赛 + 距离矩阵 + 当前赛程 + 容差序列
// 输出: 比赛 → 可选日期
// 红线: 候选日期严格晚于 end_date，且不落入任一参赛球队的封锁窗口
// 红线: 容差逐档放宽，最后一档不设最少天数门槛
// ==========================================

use crate::domain::calendar::{LeagueCalendar, RescheduleWindowTable};
use crate::domain::distance::DistanceMatrix;
use crate::domain::fixture::{Fixture, FixtureRow, Match, MatchId};
use crate::domain::types::TeamId;
use crate::engine::error::EngineResult;
use crate::engine::feasibility::FeasibilityValidator;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument};

/// 单场比赛的筛选结果
#[derive(Debug, Clone)]
pub struct ScreenedMatch {
    pub m: Match,
    pub dates: Vec<NaiveDate>,
    /// 命中的容差档
    pub margin: f64,
}

/// 逐档筛选结果
#[derive(Debug, Clone, Default)]
pub struct ScreeningResult {
    pub admissible: BTreeMap<MatchId, ScreenedMatch>,
    /// 所有容差档均未找到日期的比赛
    pub unmatched: Vec<Match>,
}

/// 候选日期的两段距离（前一对手主场 → 主场，主场 → 后一对手主场）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoLegTrip {
    pub inbound: f64,
    pub outbound: f64,
}

impl TwoLegTrip {
    pub fn total(&self) -> f64 {
        self.inbound + self.outbound
    }

    /// 距离接受判定
    ///
    /// 满足任一条件即接受:
    /// - total ≤ reference × (1 + margin)
    /// - 两段均为正且 |max/min - 1| ≤ margin
    pub fn accepted(&self, reference: f64, margin: f64) -> bool {
        if self.total() <= reference * (1.0 + margin) {
            return true;
        }
        let (lo, hi) = if self.inbound <= self.outbound {
            (self.inbound, self.outbound)
        } else {
            (self.outbound, self.inbound)
        };
        lo > 0.0 && (hi / lo - 1.0).abs() <= margin
    }
}

// ==========================================
// DistanceScreener - 距离筛选器
// ==========================================
pub struct DistanceScreener<'a> {
    distances: &'a DistanceMatrix,
    windows: &'a RescheduleWindowTable,
    calendar: LeagueCalendar,
    end_date: NaiveDate,
    feasibility_days: usize,
    prescreen: Option<&'a FeasibilityValidator>,
    /// 球队比赛，按 original_date 排序
    team_rows: BTreeMap<TeamId, Vec<&'a FixtureRow>>,
}

impl<'a> DistanceScreener<'a> {
    pub fn new(
        fixture: &'a Fixture,
        distances: &'a DistanceMatrix,
        windows: &'a RescheduleWindowTable,
        calendar: LeagueCalendar,
        end_date: NaiveDate,
        feasibility_days: usize,
    ) -> Self {
        let team_rows = fixture
            .teams()
            .into_iter()
            .map(|team| {
                let rows = fixture.team_rows(&team);
                (team, rows)
            })
            .collect();

        Self {
            distances,
            windows,
            calendar,
            end_date,
            feasibility_days,
            prescreen: None,
            team_rows,
        }
    }

    /// 启用单日密度预筛
    pub fn with_prescreen(mut self, validator: &'a FeasibilityValidator) -> Self {
        self.prescreen = Some(validator);
        self
    }

    /// 单档筛选
    ///
    /// # 参数
    /// - candidates: 待安排比赛
    /// - margin: 距离容差
    /// - thresholded: 是否要求每队至少 feasibility_days 个可选日期
    ///
    /// # 返回
    /// 找到至少一个日期的比赛 → 日期列表（双方可选日期的交集）
    pub fn screen(
        &self,
        candidates: &[Match],
        margin: f64,
        thresholded: bool,
    ) -> EngineResult<BTreeMap<MatchId, Vec<NaiveDate>>> {
        let mut result = BTreeMap::new();
        for m in candidates {
            let dates = self.screen_match(m, margin, thresholded)?;
            if !dates.is_empty() {
                result.insert(m.id(), dates);
            }
        }
        Ok(result)
    }

    /// 逐档放宽筛选，未命中的比赛顺延到下一档
    #[instrument(skip(self, candidates, margins), fields(candidates = candidates.len(), passes = margins.len()))]
    pub fn screen_progressive(
        &self,
        candidates: &[Match],
        margins: &[f64],
    ) -> EngineResult<ScreeningResult> {
        let mut result = ScreeningResult::default();
        let mut remaining: Vec<Match> = candidates.to_vec();

        for (pass, &margin) in margins.iter().enumerate() {
            if remaining.is_empty() {
                break;
            }
            let thresholded = pass + 1 < margins.len();
            let found = self.screen(&remaining, margin, thresholded)?;

            remaining.retain(|m| match found.get(&m.id()) {
                Some(dates) => {
                    result.admissible.insert(
                        m.id(),
                        ScreenedMatch {
                            m: m.clone(),
                            dates: dates.clone(),
                            margin,
                        },
                    );
                    false
                }
                None => true,
            });

            debug!(
                pass = pass,
                margin = margin,
                matched = found.len(),
                remaining = remaining.len(),
                "距离筛选档完成"
            );
        }

        result.unmatched = remaining;
        info!(
            matched = result.admissible.len(),
            unmatched = result.unmatched.len(),
            "距离筛选完成"
        );
        Ok(result)
    }

    /// 单场比赛在某容差下的可选日期（主客双方交集）
    pub fn screen_match(
        &self,
        m: &Match,
        margin: f64,
        thresholded: bool,
    ) -> EngineResult<Vec<NaiveDate>> {
        let home_dates = self.team_admissible_dates(m, &m.home, margin, thresholded)?;
        if home_dates.is_empty() {
            return Ok(Vec::new());
        }
        let away_dates = self.team_admissible_dates(m, &m.away, margin, thresholded)?;

        Ok(home_dates
            .intersection(&away_dates)
            .copied()
            .filter(|d| *d > self.end_date)
            .filter(|d| !self.windows.blocks_match(&m.home, &m.away, *d))
            .collect())
    }

    /// 单支球队视角下的可选日期
    ///
    /// 参考距离 = 原赛程中 (前一对手主场 → 主场) + (主场 → 后一对手主场)；
    /// 参考距离为 0 时改用涉及该球队的最小正距离
    pub fn team_admissible_dates(
        &self,
        m: &Match,
        team: &str,
        margin: f64,
        thresholded: bool,
    ) -> EngineResult<BTreeSet<NaiveDate>> {
        let own_id = m.id();
        let rows: Vec<&FixtureRow> = self
            .team_rows
            .get(team)
            .map(|rows| rows.iter().copied().filter(|r| r.id() != own_id).collect())
            .unwrap_or_default();
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.original_date).collect();

        let host = m.home.as_str();
        let (prev, next) = neighbours(&rows, &dates, m.original_date);
        let reference_trip = TwoLegTrip {
            inbound: self
                .distances
                .distance(prev.map_or(team, |r| r.home.as_str()), host)?,
            outbound: self
                .distances
                .distance(host, next.map_or(team, |r| r.home.as_str()))?,
        };
        let reference = if reference_trip.total() == 0.0 {
            self.distances.min_positive_distance(team).unwrap_or(0.0)
        } else {
            reference_trip.total()
        };

        let mut admissible = BTreeSet::new();
        for day in self.calendar.league_dates().filter(|d| *d > self.end_date) {
            let (pot_prev, pot_next) = match neighbours(&rows, &dates, day) {
                (Some(p), Some(n)) => (p, n),
                _ => continue,
            };
            let trip = TwoLegTrip {
                inbound: self.distances.distance(&pot_prev.home, host)?,
                outbound: self.distances.distance(host, &pot_next.home)?,
            };
            if !trip.accepted(reference, margin) {
                continue;
            }
            if let Some(validator) = self.prescreen {
                if !validator.admits_additional_game(&dates, day) {
                    continue;
                }
            }
            admissible.insert(day);
        }

        if thresholded && admissible.len() < self.feasibility_days {
            return Ok(BTreeSet::new());
        }
        Ok(admissible)
    }
}

/// 日期前后最近的比赛（严格早于 / 严格晚于）
fn neighbours<'r>(
    rows: &[&'r FixtureRow],
    sorted_dates: &[NaiveDate],
    day: NaiveDate,
) -> (Option<&'r FixtureRow>, Option<&'r FixtureRow>) {
    let before = sorted_dates.partition_point(|d| *d < day);
    let after = sorted_dates.partition_point(|d| *d <= day);
    let prev = before.checked_sub(1).and_then(|i| rows.get(i).copied());
    let next = rows.get(after).copied();
    (prev, next)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 6, day).unwrap()
    }

    #[test]
    fn test_symmetric_legs_accepted_at_zero_margin() {
        let trip = TwoLegTrip {
            inbound: 800.0,
            outbound: 800.0,
        };
        // 绝对距离远超参考值，但两段相等
        assert!(trip.accepted(200.0, 0.0));

        let lopsided = TwoLegTrip {
            inbound: 100.0,
            outbound: 700.0,
        };
        assert!(!lopsided.accepted(200.0, 0.0));
        assert!(lopsided.accepted(200.0, 3.0));
    }

    #[test]
    fn test_zero_leg_never_passes_ratio_clause() {
        let trip = TwoLegTrip {
            inbound: 0.0,
            outbound: 500.0,
        };
        assert!(!trip.accepted(100.0, 10.0));
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

    // H 主场对 V 的比赛（第 2 天）待安排，end_date 为第 3 天
    // H 的客场: A(1) B(3) C(7) D(10) D(13)，到 H 的距离 A 10 / B 20 / C 22 / D 50
    // 参考行程 A→H→B = 30
    // - 第 4-6 天: B→H→C = 42，两段比 1.1
    // - 第 7-10 天: 70 或 72
    // - 第 11-12 天: D→H→D，两段相等
    // V 只在第 1、20 天客场对 C，第 4-19 天均可接受
    // E 对 F 没有其他比赛，任何日期都找不到前后对手
    fn relaxation_fixture() -> (Fixture, DistanceMatrix) {
        let fixture = Fixture::new(vec![
            row("A", "H", 1),
            row("H", "V", 2),
            row("B", "H", 3),
            row("C", "H", 7),
            row("D", "H", 10),
            row("D", "H", 13),
            row("C", "V", 1),
            row("C", "V", 20),
            row("E", "F", 2),
        ])
        .unwrap();

        let mut distances = DistanceMatrix::new();
        for (team, km) in [("A", 10.0), ("B", 20.0), ("C", 22.0), ("D", 50.0), ("V", 5.0)] {
            distances.insert("H", team, km);
        }
        distances.insert("E", "F", 30.0);
        (fixture, distances)
    }

    #[test]
    fn test_progressive_margins_follow_feasibility_days() {
        let (fixture, distances) = relaxation_fixture();
        let windows = RescheduleWindowTable::new();
        let calendar = LeagueCalendar::new(d(1), d(20), 0);
        let disrupted = fixture.rows()[1].to_match();
        let isolated = fixture.rows()[8].to_match();
        let candidates = vec![disrupted.clone(), isolated.clone()];
        let margins = [0.0, 0.2, 2.0];
        let days = |list: &[u32]| list.iter().map(|&n| d(n)).collect::<Vec<_>>();

        let cases: [(usize, f64, Vec<NaiveDate>); 3] = [
            // 严格容差下 H 只有两天，已满足门槛
            (1, 0.0, days(&[11, 12])),
            // 两天不足三天，顺延到 0.2 档，比值子句放入第 4-6 天
            (3, 0.2, days(&[4, 5, 6, 11, 12])),
            // 前两档都达不到门槛，最后一档不设门槛
            (50, 2.0, days(&[4, 5, 6, 7, 8, 9, 10, 11, 12])),
        ];

        for (feasibility_days, margin, dates) in cases {
            let screener = DistanceScreener::new(
                &fixture,
                &distances,
                &windows,
                calendar,
                d(3),
                feasibility_days,
            );
            let result = screener.screen_progressive(&candidates, &margins).unwrap();

            let screened = &result.admissible[&disrupted.id()];
            assert_eq!(screened.margin, margin, "feasibility_days={}", feasibility_days);
            assert_eq!(screened.dates, dates, "feasibility_days={}", feasibility_days);

            assert_eq!(result.unmatched.len(), 1);
            assert_eq!(result.unmatched[0].id(), isolated.id());
            assert!(!result.admissible.contains_key(&isolated.id()));
        }
    }

    #[test]
    fn test_threshold_only_applies_to_thresholded_pass() {
        let (fixture, distances) = relaxation_fixture();
        let windows = RescheduleWindowTable::new();
        let calendar = LeagueCalendar::new(d(1), d(20), 0);
        let screener = DistanceScreener::new(&fixture, &distances, &windows, calendar, d(3), 3);
        let disrupted = fixture.rows()[1].to_match();

        let strict = screener.team_admissible_dates(&disrupted, "H", 0.0, true).unwrap();
        assert!(strict.is_empty(), "两天不足门槛");

        let open = screener.team_admissible_dates(&disrupted, "H", 0.0, false).unwrap();
        assert_eq!(open.into_iter().collect::<Vec<_>>(), vec![d(11), d(12)]);
    }

    #[test]
    fn test_neighbours_skip_same_day() {
        let rows_owned: Vec<FixtureRow> = [3u32, 5, 9]
            .iter()
            .map(|&day| FixtureRow {
                home: format!("H{}", day),
                visitor: "A".to_string(),
                original_date: d(day),
                game_date: d(day),
                reschedule: false,
                day_difference: 0,
            })
            .collect();
        let rows: Vec<&FixtureRow> = rows_owned.iter().collect();
        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.original_date).collect();

        let (prev, next) = neighbours(&rows, &dates, d(5));
        assert_eq!(prev.unwrap().original_date, d(3));
        assert_eq!(next.unwrap().original_date, d(9));

        let (prev, next) = neighbours(&rows, &dates, d(10));
        assert_eq!(prev.unwrap().original_date, d(9));
        assert!(next.is_none());
    }
}

// ==========================================
// 联赛赛程恢复引擎 - 目标系数
// ==========================================
// 职责: 变量成本 = f(|proposed_date - original_date|)
// ==========================================

use crate::domain::calendar::LeagueCalendar;
use crate::domain::fixture::Match;
use crate::domain::types::ObjectiveKind;

#[derive(Debug, Clone, Copy)]
pub struct ObjectiveFunction {
    kind: ObjectiveKind,
    calendar: LeagueCalendar,
}

impl ObjectiveFunction {
    pub fn new(kind: ObjectiveKind, calendar: LeagueCalendar) -> Self {
        Self { kind, calendar }
    }

    /// 单场比赛改期成本
    ///
    /// - basic: 天数
    /// - double: 2 × 天数
    /// - squared: 天数²
    /// - unitary: 1；延长期日期按天数计
    pub fn match_cost(&self, m: &Match) -> f64 {
        let days = m.day_delta() as f64;
        match self.kind {
            ObjectiveKind::Basic => days,
            ObjectiveKind::Double => 2.0 * days,
            ObjectiveKind::Squared => days * days,
            ObjectiveKind::Unitary => {
                if self.calendar.is_extended(m.proposed_date) {
                    days
                } else {
                    1.0
                }
            }
        }
    }

    /// 之旅变体成本 = Σ 单场成本 + 距离权重 × 距离
    pub fn sequence_cost(&self, sequence: &[Match], distance: f64, distance_weight: f64) -> f64 {
        sequence.iter().map(|m| self.match_cost(m)).sum::<f64>() + distance_weight * distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 7, day).unwrap()
    }

    fn moved(to: u32) -> Match {
        Match {
            home: "B".to_string(),
            away: "A".to_string(),
            original_date: d(5),
            game_date: d(5),
            proposed_date: d(to),
        }
    }

    #[test]
    fn test_objective_kinds() {
        let cal = LeagueCalendar::new(d(1), d(20), 30);
        let cost = |kind| ObjectiveFunction::new(kind, cal).match_cost(&moved(8));
        assert_eq!(cost(ObjectiveKind::Basic), 3.0);
        assert_eq!(cost(ObjectiveKind::Double), 6.0);
        assert_eq!(cost(ObjectiveKind::Squared), 9.0);
        assert_eq!(cost(ObjectiveKind::Unitary), 1.0);

        let unitary = ObjectiveFunction::new(ObjectiveKind::Unitary, cal);
        assert_eq!(unitary.match_cost(&moved(25)), 20.0);
    }

    #[test]
    fn test_sequence_cost_adds_weighted_distance() {
        let cal = LeagueCalendar::new(d(1), d(20), 30);
        let f = ObjectiveFunction::new(ObjectiveKind::Basic, cal);
        assert_eq!(f.sequence_cost(&[moved(6), moved(5)], 100.0, 0.5), 51.0);
    }
}

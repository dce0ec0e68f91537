// ==========================================
// 联赛赛程恢复引擎 - 客场之旅旅行距离
// ==========================================
// 职责: 计算之旅序列的累计旅行距离
// 输入: 球队 + 按日期排序的之旅序列
// 输出: 距离（超出已知赛程终点的航段按天加权）
// ==========================================

use crate::domain::calendar::LeagueCalendar;
use crate::domain::distance::DistanceMatrix;
use crate::domain::fixture::Match;
use crate::engine::error::EngineResult;
use chrono::NaiveDate;

// ==========================================
// TravelCost - 旅行距离计算
// ==========================================
pub struct TravelCost<'a> {
    distances: &'a DistanceMatrix,
    calendar: LeagueCalendar,
}

impl<'a> TravelCost<'a> {
    pub fn new(distances: &'a DistanceMatrix, calendar: LeagueCalendar) -> Self {
        Self {
            distances,
            calendar,
        }
    }

    /// 之旅累计距离: team → host₁ → … → hostₖ → team
    ///
    /// 每个航段的起始比赛若晚于已知赛程终点，乘以 (超出天数 + 1)
    pub fn tour_distance(&self, team: &str, sequence: &[Match]) -> EngineResult<f64> {
        let (first, last) = match (sequence.first(), sequence.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Ok(0.0),
        };

        let mut total =
            self.distances.distance(team, &first.home)? * self.leg_factor(first.proposed_date);

        for pair in sequence.windows(2) {
            let leg = self.distances.distance(&pair[0].home, &pair[1].home)?;
            total += leg * self.leg_factor(pair[0].proposed_date);
        }

        total += self.distances.distance(&last.home, team)? * self.leg_factor(last.proposed_date);
        Ok(total)
    }

    /// 航段加权系数
    fn leg_factor(&self, date: NaiveDate) -> f64 {
        if self.calendar.is_extended(date) {
            (self.calendar.days_beyond_horizon(date) + 1) as f64
        } else {
            1.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 5, day).unwrap()
    }

    fn at(host: &str, day: u32) -> Match {
        Match {
            home: host.to_string(),
            away: "A".to_string(),
            original_date: d(day),
            game_date: d(day),
            proposed_date: d(day),
        }
    }

    fn matrix() -> DistanceMatrix {
        let mut m = DistanceMatrix::new();
        m.insert("A", "B", 100.0);
        m.insert("A", "C", 150.0);
        m.insert("B", "C", 60.0);
        m
    }

    #[test]
    fn test_chain_distance() {
        let dm = matrix();
        let cost = TravelCost::new(&dm, LeagueCalendar::new(d(1), d(20), 30));
        let dist = cost.tour_distance("A", &[at("B", 3), at("C", 5)]).unwrap();
        assert_eq!(dist, 100.0 + 60.0 + 150.0);
    }

    #[test]
    fn test_legs_beyond_horizon_are_inflated() {
        let dm = matrix();
        let cost = TravelCost::new(&dm, LeagueCalendar::new(d(1), d(20), 30));
        // 22 日超出 2 天 → 系数 3
        let dist = cost.tour_distance("A", &[at("B", 22)]).unwrap();
        assert_eq!(dist, 100.0 * 3.0 + 100.0 * 3.0);
    }
}

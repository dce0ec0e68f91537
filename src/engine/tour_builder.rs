// ==========================================
// 联赛赛程恢复引擎 - 之旅切分
// ==========================================
// 职责: 将球队比赛切分为连续同条件（主/客）的之旅
// 输入: 赛程快照 + 球队
// 输出: 按时间排序的 Tour 列表
// 红线: 每场比赛恰好属于一个之旅
// ==========================================

use crate::domain::fixture::Fixture;
use crate::domain::tour::{Tour, TourKey};
use crate::domain::types::{Condition, TeamId};
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

// ==========================================
// TourBuilder - 之旅切分器
// ==========================================
pub struct TourBuilder {
    /// 相邻比赛最大间隔（天），超过则开始新之旅
    gap_days: i64,
}

impl TourBuilder {
    pub fn new(gap_days: i64) -> Self {
        Self { gap_days }
    }

    /// 切分单支球队的之旅
    ///
    /// 按 original_date 遍历；条件变化或间隔超过 gap_days 时开始新之旅
    ///
    /// # 返回
    /// - Err(EmptyTeamFixture): 球队没有任何比赛
    pub fn build_tours(&self, fixture: &Fixture, team: &str) -> EngineResult<Vec<Tour>> {
        let rows = fixture.team_rows(team);
        if rows.is_empty() {
            return Err(EngineError::EmptyTeamFixture(team.to_string()));
        }

        let mut tours: Vec<Tour> = Vec::new();
        for row in rows {
            // team_rows 已保证 row 涉及该球队
            let condition = match row.condition_for(team) {
                Some(c) => c,
                None => continue,
            };

            let extend = tours.last().map_or(false, |tour| {
                tour.condition == condition
                    && tour.last_date().map_or(false, |last| {
                        (row.original_date - last).num_days() <= self.gap_days
                    })
            });

            if extend {
                if let Some(tour) = tours.last_mut() {
                    tour.matches.push(row.to_match());
                }
            } else {
                let index = tours.len();
                tours.push(Tour {
                    key: TourKey::Natural {
                        team: team.to_string(),
                        index,
                    },
                    team: team.to_string(),
                    condition,
                    matches: vec![row.to_match()],
                });
            }
        }

        debug!(team = %team, tours = tours.len(), "之旅切分完成");
        Ok(tours)
    }

    /// 所有球队的之旅（按球队名有序）
    #[instrument(skip(self, fixture), fields(rows = fixture.len()))]
    pub fn build_all(&self, fixture: &Fixture) -> EngineResult<BTreeMap<TeamId, Vec<Tour>>> {
        fixture
            .teams()
            .into_iter()
            .map(|team| {
                let tours = self.build_tours(fixture, &team)?;
                Ok((team, tours))
            })
            .collect()
    }

    /// 仅保留首场日期严格晚于 cutoff 的客场之旅（可修改的之旅）
    pub fn get_away_tours(tours: &[Tour], cutoff_date: NaiveDate) -> Vec<Tour> {
        tours
            .iter()
            .filter(|t| t.condition == Condition::Away)
            .filter(|t| t.first_date().map_or(false, |first| first > cutoff_date))
            .cloned()
            .collect()
    }
}

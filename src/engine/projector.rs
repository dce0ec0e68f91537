// ==========================================
// 联赛赛程恢复引擎 - 结果投影
// ==========================================
// 职责: 将求解取值映射回具体赛程，并找出仍需再次改期的比赛
// 输入: AssembledModel + 逐变量取值 + 当前赛程快照
// 输出: Projection（更新后的赛程 + 本轮处理记录）
// 红线: 每场比赛至多被一个取 1 的变量定日期
// 红线: 需再次改期 ⇔ 新日期落入任一方（重算后）封锁窗口且不等于历史 game_date
// ==========================================

use crate::domain::fixture::{Fixture, Match, MatchId};
use crate::domain::types::TeamId;
use crate::engine::assembler::AssembledModel;
use crate::engine::blackout::BlackoutCalculator;
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// 本轮处理的一场比赛
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedMatch {
    pub home: TeamId,
    pub visitor: TeamId,
    pub original_date: NaiveDate,
    pub game_date: NaiveDate,
    pub proposed_date: NaiveDate,
    /// 模型是否改动了日期
    pub model_reschedule: bool,
}

impl ProjectedMatch {
    pub fn id(&self) -> MatchId {
        MatchId {
            home: self.home.clone(),
            away: self.visitor.clone(),
            game_date: self.game_date,
        }
    }

    fn from_match(m: &Match) -> Self {
        Self {
            home: m.home.clone(),
            visitor: m.away.clone(),
            original_date: m.original_date,
            game_date: m.game_date,
            proposed_date: m.proposed_date,
            model_reschedule: m.proposed_date != m.original_date,
        }
    }
}

/// 投影结果
#[derive(Debug, Clone)]
pub struct Projection {
    /// 本轮处理的比赛（按 proposed_date 排序）
    pub processed: Vec<ProjectedMatch>,
    /// 更新后的赛程快照（下一轮的输入）
    pub fixture: Fixture,
    /// 新日期仍落入封锁窗口的比赛
    pub needs_reschedule: Vec<MatchId>,
    pub chosen_variables: usize,
}

impl Projection {
    pub fn moved(&self) -> impl Iterator<Item = &ProjectedMatch> {
        self.processed.iter().filter(|p| p.model_reschedule)
    }
}

// ==========================================
// ResultProjector - 结果投影器
// ==========================================
pub struct ResultProjector {
    // 无状态
}

impl ResultProjector {
    pub fn new() -> Self {
        Self {}
    }

    /// 投影求解结果
    ///
    /// # 参数
    /// - `values`: 逐变量取值，长度必须等于变量数
    #[instrument(skip_all, fields(variables = assembled.variable_count()))]
    pub fn project(
        &self,
        assembled: &AssembledModel,
        values: &[f64],
        fixture: &Fixture,
    ) -> EngineResult<Projection> {
        if values.len() != assembled.variable_count() {
            return Err(EngineError::AssignmentMismatch {
                expected: assembled.variable_count(),
                actual: values.len(),
            });
        }

        // ===== 收集取 1 的变量 =====
        let mut assigned: BTreeMap<MatchId, Match> = BTreeMap::new();
        let mut chosen = 0;
        for (var, value) in values.iter().enumerate() {
            if value.round() != 1.0 {
                continue;
            }
            chosen += 1;
            for m in assembled.placements(var) {
                if let Some(previous) = assigned.insert(m.id(), m.clone()) {
                    if previous.proposed_date != m.proposed_date {
                        return Err(EngineError::Solver(format!(
                            "比赛 {} 被分配了两个日期: {} / {}",
                            m.id(),
                            previous.proposed_date,
                            m.proposed_date
                        )));
                    }
                }
            }
        }

        // ===== 更新赛程快照 =====
        let mut updated = fixture.clone();
        for row in updated.rows_mut() {
            if let Some(m) = assigned.get(&row.id()) {
                row.original_date = m.proposed_date;
            }
        }

        // ===== 重算封锁窗口，找出需再次改期的比赛 =====
        let windows = BlackoutCalculator::new().compute(&updated);
        let needs_reschedule: Vec<MatchId> = assigned
            .values()
            .filter(|m| {
                m.proposed_date != m.game_date
                    && windows.blocks_match(&m.home, &m.away, m.proposed_date)
            })
            .map(|m| m.id())
            .collect();
        for id in &needs_reschedule {
            warn!(matchup = %id, "新日期仍落入封锁窗口，需再次改期");
        }

        let mut processed: Vec<ProjectedMatch> =
            assigned.values().map(ProjectedMatch::from_match).collect();
        processed.sort_by(|a, b| {
            (a.proposed_date, &a.home, &a.visitor).cmp(&(b.proposed_date, &b.home, &b.visitor))
        });

        info!(
            chosen = chosen,
            processed = processed.len(),
            moved = processed.iter().filter(|p| p.model_reschedule).count(),
            needs_reschedule = needs_reschedule.len(),
            "结果投影完成"
        );

        Ok(Projection {
            processed,
            fixture: updated,
            needs_reschedule,
            chosen_variables: chosen,
        })
    }
}

impl Default for ResultProjector {
    fn default() -> Self {
        Self::new()
    }
}

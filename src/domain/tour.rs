// ==========================================
// 联赛赛程恢复引擎 - 客场之旅模型
// ==========================================
// 职责: Tour（连续同条件比赛）与 TourVariant（之旅的可行改期快照）
// 红线: TourVariant 创建后不可变，且创建时必须通过可行性校验
// 红线: 变体不得与原始之旅共享可变比赛列表
// ==========================================

use crate::domain::fixture::{Match, MatchId};
use crate::domain::types::{Condition, TeamId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==========================================
// TourKey - 之旅身份
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TourKey {
    /// 由赛程切分得到的之旅（球队内序号）
    Natural { team: TeamId, index: usize },
    /// 为承载单场中断比赛而合成的占位之旅
    Synthetic {
        team: TeamId,
        disruption: MatchId,
        date: NaiveDate,
    },
}

impl TourKey {
    pub fn team(&self) -> &str {
        match self {
            TourKey::Natural { team, .. } | TourKey::Synthetic { team, .. } => team,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, TourKey::Synthetic { .. })
    }
}

// ==========================================
// Tour - 之旅
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub key: TourKey,
    pub team: TeamId,
    pub condition: Condition,
    pub matches: Vec<Match>,
}

impl Tour {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.matches.first().map(|m| m.original_date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.matches.last().map(|m| m.original_date)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

// ==========================================
// VariantKey - 变体值键
// ==========================================
// (之旅, 比赛 → 日期 分配) 唯一确定一个变体
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariantKey {
    pub tour: TourKey,
    pub assignment: Vec<(MatchId, NaiveDate)>,
}

// ==========================================
// TourVariant - 之旅变体
// ==========================================
#[derive(Debug, Clone)]
pub struct TourVariant {
    pub tour: TourKey,
    pub original_start: NaiveDate,
    pub original_end: NaiveDate,
    /// 原始之旅序列（只读共享）
    pub original_sequence: Arc<Vec<Match>>,
    pub new_start: NaiveDate,
    pub new_end: NaiveDate,
    /// 按 proposed_date 排序的新序列
    pub new_sequence: Vec<Match>,
    pub n_mods: usize,
    pub distance: f64,
    pub is_synthetic: bool,
    /// 插入本变体的中断比赛
    pub inserted: Vec<MatchId>,
}

impl TourVariant {
    pub fn team(&self) -> &str {
        self.tour.team()
    }

    pub fn key(&self) -> VariantKey {
        let mut assignment: Vec<(MatchId, NaiveDate)> = self
            .new_sequence
            .iter()
            .map(|m| (m.id(), m.proposed_date))
            .collect();
        assignment.sort();
        VariantKey {
            tour: self.tour.clone(),
            assignment,
        }
    }

    pub fn contains(&self, id: &MatchId) -> bool {
        self.new_sequence.iter().any(|m| &m.id() == id)
    }

    /// 统计序列中日期被改动的非中断比赛数
    pub fn count_mods(sequence: &[Match], inserted: &[MatchId]) -> usize {
        sequence
            .iter()
            .filter(|m| m.is_modified() && !inserted.contains(&m.id()))
            .count()
    }
}

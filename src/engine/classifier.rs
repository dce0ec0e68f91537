// ==========================================
// 联赛赛程恢复引擎 - 中断分类器
// ==========================================
// 职责: 将赛程划分为中断比赛 / 非中断比赛
// 输入: 赛程快照 + 封锁窗口表 + 评估窗口 [start, end]
// 输出: Classification
// 红线: 纯函数，不修改赛程；同一时点一场比赛至多属于一类
// ==========================================

use crate::domain::calendar::RescheduleWindowTable;
use crate::domain::fixture::{Fixture, FixtureRow, Match};
use crate::domain::types::MatchClass;
use chrono::NaiveDate;
use tracing::{info, instrument};

/// 分类结果
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub disruptions: Vec<Match>,
    pub non_disruptions: Vec<Match>,
}

impl Classification {
    pub fn is_disruption(&self, m: &Match) -> bool {
        let id = m.id();
        self.disruptions.iter().any(|d| d.id() == id)
    }
}

// ==========================================
// DisruptionClassifier - 中断分类器
// ==========================================
pub struct DisruptionClassifier {
    // 无状态
}

impl DisruptionClassifier {
    pub fn new() -> Self {
        Self {}
    }

    /// 单场比赛在评估窗口下的分类
    ///
    /// # 返回
    /// - Some(Disruption): original_date ∈ [start, end] 且落入主队或客队封锁窗口
    /// - Some(NonDisruption): original_date > end
    /// - None: 历史比赛或窗口内正常进行的比赛
    pub fn class_of(
        &self,
        row: &FixtureRow,
        windows: &RescheduleWindowTable,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Option<MatchClass> {
        let date = row.original_date;
        if date > end_date {
            Some(MatchClass::NonDisruption)
        } else if date >= start_date && windows.blocks_match(&row.home, &row.visitor, date) {
            Some(MatchClass::Disruption)
        } else {
            None
        }
    }

    /// 划分中断 / 非中断比赛，结果按 (original_date, home, away) 排序
    #[instrument(skip(self, fixture, windows), fields(start = %start_date, end = %end_date))]
    pub fn classify(
        &self,
        fixture: &Fixture,
        windows: &RescheduleWindowTable,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Classification {
        let mut result = Classification::default();

        for row in fixture.rows() {
            match self.class_of(row, windows, start_date, end_date) {
                Some(MatchClass::Disruption) => result.disruptions.push(row.to_match()),
                Some(MatchClass::NonDisruption) => result.non_disruptions.push(row.to_match()),
                None => {}
            }
        }

        let order = |a: &Match, b: &Match| {
            (a.original_date, &a.home, &a.away).cmp(&(b.original_date, &b.home, &b.away))
        };
        result.disruptions.sort_by(order);
        result.non_disruptions.sort_by(order);

        info!(
            disruptions = result.disruptions.len(),
            non_disruptions = result.non_disruptions.len(),
            "中断分类完成"
        );
        result
    }
}

impl Default for DisruptionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// 联赛赛程恢复引擎 - 逐场候选日期
// ==========================================
// 职责: 为逐场建模生成 (比赛, 候选日期) 集合
// 输入: 分类结果 + 距离筛选器 + 赛历
// 输出: CandidateSet（中断比赛在前，非中断比赛在后，顺序稳定）
// 红线: 中断比赛候选为空时报 UnresolvableMatch，不得静默丢弃
// ==========================================

use crate::domain::calendar::{LeagueCalendar, RescheduleWindowTable};
use crate::domain::fixture::{Match, MatchId};
use crate::domain::types::MatchClass;
use crate::engine::classifier::Classification;
use crate::engine::distance_screener::DistanceScreener;
use crate::engine::error::{EngineError, EngineResult};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;
use tracing::{debug, info, instrument};

/// 单场比赛的候选
#[derive(Debug, Clone)]
pub struct CandidateEntry {
    pub m: Match,
    pub class: MatchClass,
    pub dates: Vec<NaiveDate>,
    /// 距离筛选命中的容差档（仅中断比赛）
    pub margin: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub entries: Vec<CandidateEntry>,
}

impl CandidateSet {
    pub fn entry(&self, id: &MatchId) -> Option<&CandidateEntry> {
        self.entries.iter().find(|e| &e.m.id() == id)
    }

    pub fn of_class(&self, class: MatchClass) -> impl Iterator<Item = &CandidateEntry> {
        self.entries.iter().filter(move |e| e.class == class)
    }

    pub fn total_dates(&self) -> usize {
        self.entries.iter().map(|e| e.dates.len()).sum()
    }
}

// ==========================================
// CandidateGenerator - 候选生成器
// ==========================================
pub struct CandidateGenerator<'a> {
    screener: &'a DistanceScreener<'a>,
    windows: &'a RescheduleWindowTable,
    calendar: LeagueCalendar,
    end_date: NaiveDate,
    max_adj_days: i64,
    margins: Vec<f64>,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(
        screener: &'a DistanceScreener<'a>,
        windows: &'a RescheduleWindowTable,
        calendar: LeagueCalendar,
        end_date: NaiveDate,
        max_adj_days: i64,
        margins: Vec<f64>,
    ) -> Self {
        Self {
            screener,
            windows,
            calendar,
            end_date,
            max_adj_days,
            margins,
        }
    }

    /// 生成全部候选
    ///
    /// - 中断比赛: 距离筛选日期 ∪ 延长期日期（均排除封锁窗口）
    /// - 非中断比赛: original_date + k, k ∈ [-max_adj_days, max_adj_days]，仅保留晚于 end_date 的日期
    #[instrument(skip(self, classification), fields(
        disruptions = classification.disruptions.len(),
        non_disruptions = classification.non_disruptions.len()
    ))]
    pub fn generate(&self, classification: &Classification) -> EngineResult<CandidateSet> {
        let screening = self
            .screener
            .screen_progressive(&classification.disruptions, &self.margins)?;

        let mut set = CandidateSet::default();

        for m in &classification.disruptions {
            let screened = screening.admissible.get(&m.id());
            let mut dates: BTreeSet<NaiveDate> = screened
                .map(|s| s.dates.iter().copied().collect())
                .unwrap_or_default();
            dates.extend(
                self.calendar
                    .extended_dates()
                    .filter(|d| *d > self.end_date)
                    .filter(|d| !self.windows.blocks_match(&m.home, &m.away, *d)),
            );

            if dates.is_empty() {
                return Err(EngineError::UnresolvableMatch(m.id()));
            }
            debug!(
                game = %m.id(),
                dates = dates.len(),
                margin = ?screened.map(|s| s.margin),
                "中断比赛候选生成"
            );
            set.entries.push(CandidateEntry {
                m: m.clone(),
                class: MatchClass::Disruption,
                dates: dates.into_iter().collect(),
                margin: screened.map(|s| s.margin),
            });
        }

        for m in &classification.non_disruptions {
            let dates: Vec<NaiveDate> = (-self.max_adj_days..=self.max_adj_days)
                .filter_map(|k| {
                    let date = m.original_date + Duration::days(k);
                    let allowed = date > self.end_date
                        && (k == 0 || !self.windows.blocks_match(&m.home, &m.away, date));
                    allowed.then_some(date)
                })
                .collect();

            set.entries.push(CandidateEntry {
                m: m.clone(),
                class: MatchClass::NonDisruption,
                dates,
                margin: None,
            });
        }

        info!(
            entries = set.entries.len(),
            dates = set.total_dates(),
            unscreened = screening.unmatched.len(),
            "候选日期生成完成"
        );
        Ok(set)
    }
}

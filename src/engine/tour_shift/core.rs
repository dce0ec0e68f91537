use super::arena::{VariantArena, VariantId};
use crate::config::RescheduleConfig;
use crate::domain::calendar::{LeagueCalendar, RescheduleWindowTable};
use crate::domain::fixture::{Match, MatchId};
use crate::domain::tour::{Tour, TourKey, TourVariant};
use crate::engine::error::EngineResult;
use crate::engine::feasibility::FeasibilityValidator;
use crate::engine::travel::TravelCost;
use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// 生成参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftSettings {
    pub max_adj_days: i64,
    pub max_mods_per_tour: usize,
    pub insertion_margin_days: i64,
    pub max_insertions_per_variant: usize,
    pub synthetic_days_before: i64,
    pub synthetic_days_after: i64,
}

impl From<&RescheduleConfig> for ShiftSettings {
    fn from(cfg: &RescheduleConfig) -> Self {
        Self {
            max_adj_days: cfg.max_adj_days,
            max_mods_per_tour: cfg.max_mods_per_tour,
            insertion_margin_days: cfg.insertion_margin_days,
            max_insertions_per_variant: cfg.max_insertions_per_variant,
            synthetic_days_before: cfg.synthetic_days_before,
            synthetic_days_after: cfg.synthetic_days_after,
        }
    }
}

/// 生成统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShiftStats {
    pub generated: usize,
    pub infeasible: usize,
    pub duplicates: usize,
}

impl ShiftStats {
    fn record(&mut self, outcome: Option<bool>) {
        match outcome {
            Some(true) => self.generated += 1,
            Some(false) => self.duplicates += 1,
            None => self.infeasible += 1,
        }
    }

    fn merge(&mut self, other: ShiftStats) {
        self.generated += other.generated;
        self.infeasible += other.infeasible;
        self.duplicates += other.duplicates;
    }
}

// ==========================================
// TourShiftGenerator - 之旅平移生成器
// ==========================================
pub struct TourShiftGenerator<'a> {
    validator: &'a FeasibilityValidator,
    travel: &'a TravelCost<'a>,
    windows: &'a RescheduleWindowTable,
    calendar: LeagueCalendar,
    end_date: NaiveDate,
    settings: ShiftSettings,
}

impl<'a> TourShiftGenerator<'a> {
    pub fn new(
        validator: &'a FeasibilityValidator,
        travel: &'a TravelCost<'a>,
        windows: &'a RescheduleWindowTable,
        calendar: LeagueCalendar,
        end_date: NaiveDate,
        settings: ShiftSettings,
    ) -> Self {
        Self {
            validator,
            travel,
            windows,
            calendar,
            end_date,
            settings,
        }
    }

    // ==========================================
    // 之旅日期微调
    // ==========================================

    /// 为球队的可修改之旅生成全部微调变体
    ///
    /// 每个之旅先放入未改动的变体，再枚举偏移掩码：
    /// 至多 max_mods_per_tour 个位置取 [-max_adj_days, max_adj_days] 内的非零偏移
    #[instrument(skip(self, tours, arena), fields(team = %team, tours = tours.len()))]
    pub fn generate(
        &self,
        team: &str,
        tours: &[Tour],
        arena: &mut VariantArena,
    ) -> EngineResult<ShiftStats> {
        let mut stats = ShiftStats::default();

        for tour in tours {
            if tour.is_empty() {
                continue;
            }
            let base = Arc::new(tour.matches.clone());

            let unmodified = self.materialize(team, &tour.key, &base, base.to_vec(), Vec::new())?;
            if unmodified.is_none() {
                warn!(team = %team, tour = ?tour.key, "原始之旅未通过可行性校验");
            }
            stats.record(unmodified.map(|v| arena.push(v).1));

            for mask in shift_masks(base.len(), self.settings.max_adj_days, self.settings.max_mods_per_tour) {
                let shifted: Option<Vec<Match>> = base
                    .iter()
                    .zip(&mask)
                    .map(|(m, &offset)| {
                        if offset == 0 {
                            return Some(m.clone());
                        }
                        let date = m.original_date + Duration::days(offset);
                        self.shift_allowed(m, date).then(|| m.with_proposed(date))
                    })
                    .collect();

                let outcome = match shifted {
                    Some(seq) => self.materialize(team, &tour.key, &base, seq, Vec::new())?,
                    None => None,
                };
                stats.record(outcome.map(|v| arena.push(v).1));
            }
        }

        debug!(
            team = %team,
            generated = stats.generated,
            infeasible = stats.infeasible,
            duplicates = stats.duplicates,
            "之旅微调完成"
        );
        Ok(stats)
    }

    // ==========================================
    // 中断比赛插入
    // ==========================================

    /// 将中断比赛插入客队现有之旅变体，并为其合成单场占位之旅
    #[instrument(skip(self, disruptions, arena), fields(disruptions = disruptions.len()))]
    pub fn insert_disruptions(
        &self,
        disruptions: &[Match],
        arena: &mut VariantArena,
    ) -> EngineResult<ShiftStats> {
        let mut stats = ShiftStats::default();

        for disruption in disruptions {
            stats.merge(self.insert_into_tours(disruption, arena)?);
            stats.merge(self.add_synthetic_tours(disruption, arena)?);
        }

        info!(
            generated = stats.generated,
            infeasible = stats.infeasible,
            variants = arena.len(),
            "中断比赛插入完成"
        );
        Ok(stats)
    }

    /// 插入客队已有的自然之旅变体
    fn insert_into_tours(
        &self,
        disruption: &Match,
        arena: &mut VariantArena,
    ) -> EngineResult<ShiftStats> {
        let mut stats = ShiftStats::default();
        let team = disruption.away.as_str();
        let margin = Duration::days(self.settings.insertion_margin_days);

        // 快照：本场比赛新生成的变体不再作为宿主
        let hosts: Vec<VariantId> = arena
            .team_tours(team)
            .into_iter()
            .filter(|(key, _)| !key.is_synthetic())
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();

        for host_id in hosts {
            let host = match arena.get(host_id) {
                Some(v) if v.inserted.len() < self.settings.max_insertions_per_variant => v.clone(),
                _ => continue,
            };

            let used: BTreeSet<NaiveDate> = host.new_sequence.iter().map(|m| m.proposed_date).collect();
            let first = host.new_start - margin;
            let last = host.new_end + margin;

            for date in first.iter_days().take_while(|d| *d <= last) {
                if used.contains(&date) || !self.insertion_allowed(disruption, date) {
                    continue;
                }

                let mut seq = host.new_sequence.clone();
                seq.push(disruption.with_proposed(date));
                let mut inserted = host.inserted.clone();
                inserted.push(disruption.id());

                let outcome = self
                    .materialize(team, &host.tour, &host.original_sequence, seq, inserted)?
                    .map(|v| arena.push(v).1);
                stats.record(outcome);
            }
        }

        Ok(stats)
    }

    /// 已知赛程终点附近的单场占位之旅
    fn add_synthetic_tours(
        &self,
        disruption: &Match,
        arena: &mut VariantArena,
    ) -> EngineResult<ShiftStats> {
        let mut stats = ShiftStats::default();
        let team = disruption.away.as_str();
        let horizon = self.calendar.last_date();
        let first = horizon - Duration::days(self.settings.synthetic_days_before);
        let last = horizon + Duration::days(self.settings.synthetic_days_after);
        let original = Arc::new(vec![disruption.clone()]);

        for date in first.iter_days().take_while(|d| *d <= last) {
            if !self.insertion_allowed(disruption, date) {
                continue;
            }
            let key = TourKey::Synthetic {
                team: team.to_string(),
                disruption: disruption.id(),
                date,
            };
            let seq = vec![disruption.with_proposed(date)];
            let outcome = self
                .materialize(team, &key, &original, seq, vec![disruption.id()])?
                .map(|v| arena.push(v).1);
            stats.record(outcome);
        }

        Ok(stats)
    }

    // ==========================================
    // 公共校验与物化
    // ==========================================

    /// 排序、校验、计算距离并构造变体；不可行时返回 None（本地丢弃）
    fn materialize(
        &self,
        team: &str,
        tour: &TourKey,
        original: &Arc<Vec<Match>>,
        mut sequence: Vec<Match>,
        inserted: Vec<MatchId>,
    ) -> EngineResult<Option<TourVariant>> {
        sequence.sort_by(|a, b| a.proposed_date.cmp(&b.proposed_date));
        if !self.validator.validate(&sequence) {
            return Ok(None);
        }

        let (new_start, new_end) = match (sequence.first(), sequence.last()) {
            (Some(f), Some(l)) => (f.proposed_date, l.proposed_date),
            _ => return Ok(None),
        };
        let (original_start, original_end) = match (original.first(), original.last()) {
            (Some(f), Some(l)) => (f.original_date, l.original_date),
            _ => return Ok(None),
        };

        let distance = self.travel.tour_distance(team, &sequence)?;
        let n_mods = TourVariant::count_mods(&sequence, &inserted);

        Ok(Some(TourVariant {
            tour: tour.clone(),
            original_start,
            original_end,
            original_sequence: Arc::clone(original),
            new_start,
            new_end,
            new_sequence: sequence,
            n_mods,
            distance,
            is_synthetic: tour.is_synthetic(),
            inserted,
        }))
    }

    /// 非中断比赛平移后的日期是否允许
    fn shift_allowed(&self, m: &Match, date: NaiveDate) -> bool {
        date > self.end_date && !self.windows.blocks_match(&m.home, &m.away, date)
    }

    /// 中断比赛插入日期是否允许
    fn insertion_allowed(&self, m: &Match, date: NaiveDate) -> bool {
        date > self.end_date
            && date <= self.calendar.extended_end()
            && !self.windows.blocks_match(&m.home, &m.away, date)
    }
}

/// 偏移掩码枚举（不含全零掩码）
///
/// 长度为 len，至多 max_mods 个位置取非零偏移 ∈ [-max_adj, max_adj]
pub(super) fn shift_masks(len: usize, max_adj: i64, max_mods: usize) -> Vec<Vec<i64>> {
    let offsets: Vec<i64> = (-max_adj..=max_adj).filter(|o| *o != 0).collect();
    let mut masks = Vec::new();
    if offsets.is_empty() || max_mods == 0 {
        return masks;
    }

    let mut current = vec![0i64; len];
    extend_masks(&offsets, 0, max_mods, &mut current, &mut masks);
    masks
}

fn extend_masks(
    offsets: &[i64],
    from: usize,
    budget: usize,
    current: &mut Vec<i64>,
    out: &mut Vec<Vec<i64>>,
) {
    if budget == 0 {
        return;
    }
    for pos in from..current.len() {
        for &offset in offsets {
            current[pos] = offset;
            out.push(current.clone());
            extend_masks(offsets, pos + 1, budget - 1, current, out);
        }
        current[pos] = 0;
    }
}

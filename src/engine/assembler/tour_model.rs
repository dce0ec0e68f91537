// ==========================================
// 联赛赛程恢复引擎 - 之旅建模装配
// ==========================================
// 职责: 变量 = 之旅变体，构建全部约束族
// 输入: VariantArena + 分类结果 + 规则表 + 参数
// 输出: AssembledModel
// 红线: 仅由合成占位变体组成的之旅使用 ≤ 1，避免强制生成无关之旅
// ==========================================

use super::density::{add_density_rows, fixed_games, Placement, TeamPlacements};
use super::model::{ConstraintFamily, MilpModel, Sense};
use super::objective::ObjectiveFunction;
use super::{AssembledModel, ModelVariables};
use crate::config::RescheduleConfig;
use crate::domain::calendar::LeagueCalendar;
use crate::domain::fixture::{Fixture, MatchId};
use crate::domain::rules::LeagueRules;
use crate::domain::tour::TourKey;
use crate::engine::classifier::Classification;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::indexer::DecisionVariableIndexer;
use crate::engine::tour_shift::VariantArena;
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{info, instrument};

// ==========================================
// TourModelAssembler - 之旅建模装配器
// ==========================================
pub struct TourModelAssembler<'a> {
    fixture: &'a Fixture,
    rules: &'a LeagueRules,
    config: &'a RescheduleConfig,
    calendar: LeagueCalendar,
    start_date: NaiveDate,
}

impl<'a> TourModelAssembler<'a> {
    pub fn new(
        fixture: &'a Fixture,
        rules: &'a LeagueRules,
        config: &'a RescheduleConfig,
        calendar: LeagueCalendar,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            fixture,
            rules,
            config,
            calendar,
            start_date,
        }
    }

    /// 装配之旅模型（arena 移入结果，供结果投影使用）
    #[instrument(skip(self, arena, classification), fields(variants = arena.len()))]
    pub fn assemble(
        &self,
        arena: VariantArena,
        classification: &Classification,
    ) -> EngineResult<AssembledModel> {
        let objective = ObjectiveFunction::new(self.config.objective, self.calendar);

        // ===== 变量索引 =====
        let mut indexer = DecisionVariableIndexer::new();
        let mut variant_of = Vec::with_capacity(arena.len());
        let mut var_of_variant: HashMap<usize, usize> = HashMap::new();
        for (id, variant) in arena.iter() {
            let var = indexer.index(variant.key());
            if var == variant_of.len() {
                variant_of.push(id);
            }
            var_of_variant.insert(id, var);
        }
        let var = |id: &usize| var_of_variant.get(id).copied();

        let mut model = MilpModel::new(indexer.len());
        for (v, id) in variant_of.iter().enumerate() {
            if let Some(variant) = arena.get(*id) {
                model.objective[v] = objective.sequence_cost(
                    &variant.new_sequence,
                    variant.distance,
                    self.config.distance_weight,
                );
            }
        }

        // ===== 每场中断比赛恰好一个宿主 =====
        for d in &classification.disruptions {
            let vars: BTreeSet<usize> = arena.variants_containing(&d.id()).iter().filter_map(var).collect();
            if vars.is_empty() {
                return Err(EngineError::UnresolvableMatch(d.id()));
            }
            model.add_unit_row(
                ConstraintFamily::DisruptionAssignment,
                vars.into_iter().collect(),
                Sense::Equal,
                1.0,
            );
        }

        // ===== 每个之旅恰好一个变体 =====
        let mut group_of_tour: HashMap<TourKey, usize> = HashMap::new();
        for (key, ids) in arena.tours() {
            group_of_tour.insert(key.clone(), group_of_tour.len());
            let synthetic = key.is_synthetic()
                || ids.iter().any(|id| arena.get(*id).map_or(false, |v| v.is_synthetic));
            let sense = if synthetic { Sense::LessEqual } else { Sense::Equal };
            let vars: BTreeSet<usize> = ids.iter().filter_map(var).collect();
            model.add_unit_row(
                ConstraintFamily::TourAssignment,
                vars.into_iter().collect(),
                sense,
                1.0,
            );
        }

        // ===== 每场被覆盖的非中断比赛恰好一个日期 =====
        for m in &classification.non_disruptions {
            let vars: BTreeSet<usize> = arena.variants_containing(&m.id()).iter().filter_map(var).collect();
            model.add_unit_row(
                ConstraintFamily::NonDisruptionAssignment,
                vars.into_iter().collect(),
                Sense::Equal,
                1.0,
            );
        }

        // ===== 密度规则 =====
        let mut placements: TeamPlacements = BTreeMap::new();
        for (v, id) in variant_of.iter().enumerate() {
            let Some(variant) = arena.get(*id) else { continue };
            let group = group_of_tour.get(&variant.tour).copied().unwrap_or(v);
            for m in &variant.new_sequence {
                for team in [&m.home, &m.away] {
                    placements
                        .entry(team.clone())
                        .or_default()
                        .entry(m.proposed_date)
                        .or_default()
                        .push(Placement { var: v, group });
                }
            }
        }
        let mut decided: HashSet<MatchId> = arena.covered_matches().cloned().collect();
        decided.extend(classification.disruptions.iter().map(|d| d.id()));
        let fixed = fixed_games(self.fixture, &decided);
        let density_rows = add_density_rows(
            &mut model,
            self.rules,
            &placements,
            &fixed,
            self.start_date - Duration::days(self.config.density_lookback_days),
            self.calendar.extended_end(),
        )?;

        // ===== 改动预算 =====
        let mut over_budget = Vec::new();
        let mut weighted: (Vec<usize>, Vec<f64>) = (Vec::new(), Vec::new());
        for (v, id) in variant_of.iter().enumerate() {
            let Some(variant) = arena.get(*id) else { continue };
            if variant.n_mods > self.config.max_mods_per_tour {
                over_budget.push(v);
            } else if variant.n_mods > 0 {
                weighted.0.push(v);
                weighted.1.push(variant.n_mods as f64);
            }
        }
        model.add_unit_row(ConstraintFamily::TourModifications, over_budget, Sense::Equal, 0.0);
        model.add_row(
            ConstraintFamily::GlobalModifications,
            weighted.0,
            weighted.1,
            Sense::LessEqual,
            self.config.max_non_dis_mods as f64,
        );

        // ===== 停赛日 =====
        let no_play: BTreeSet<NaiveDate> = self.config.no_play_dates.iter().copied().collect();
        let blocked: Vec<usize> = variant_of
            .iter()
            .enumerate()
            .filter(|(_, id)| {
                arena.get(**id).map_or(false, |v| {
                    v.new_sequence.iter().any(|m| no_play.contains(&m.proposed_date))
                })
            })
            .map(|(v, _)| v)
            .collect();
        model.add_unit_row(ConstraintFamily::NoPlayDates, blocked, Sense::Equal, 0.0);

        // ===== 同一球队不同之旅不得重叠 =====
        if !self.config.allow_tour_overlap {
            let mut by_team: BTreeMap<&str, Vec<(NaiveDate, NaiveDate, usize, &TourKey)>> = BTreeMap::new();
            for (v, id) in variant_of.iter().enumerate() {
                if let Some(variant) = arena.get(*id) {
                    by_team.entry(variant.team()).or_default().push((
                        variant.new_start,
                        variant.new_end,
                        v,
                        &variant.tour,
                    ));
                }
            }
            let mut pairs = Vec::new();
            for spans in by_team.values_mut() {
                spans.sort_by(|a, b| (a.0, a.2).cmp(&(b.0, b.2)));
                for (i, a) in spans.iter().enumerate() {
                    for b in spans[i + 1..].iter().take_while(|b| b.0 <= a.1) {
                        if a.3 != b.3 {
                            pairs.push((a.2, b.2));
                        }
                    }
                }
            }
            for (a, b) in pairs {
                model.add_unit_row(ConstraintFamily::TourOrder, vec![a, b], Sense::LessEqual, 1.0);
            }
        }

        info!(
            variables = model.variable_count(),
            rows = model.row_count(),
            density_rows = density_rows,
            "之旅模型装配完成"
        );

        Ok(AssembledModel {
            model,
            variables: ModelVariables::TourSequence {
                indexer,
                arena,
                variant_of,
            },
        })
    }
}

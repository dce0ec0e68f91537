// ==========================================
// 联赛赛程恢复引擎 - 逐场建模装配
// ==========================================
// 职责: 变量 = (比赛, 候选日期)，构建全部约束族
// 输入: CandidateSet + 之旅切分 + 规则表 + 参数
// 输出: AssembledModel
// ==========================================

use super::density::{add_density_rows, fixed_games, Placement, TeamPlacements};
use super::model::{ConstraintFamily, MilpModel, Sense};
use super::objective::ObjectiveFunction;
use super::{AssembledModel, ModelVariables};
use crate::config::RescheduleConfig;
use crate::domain::calendar::LeagueCalendar;
use crate::domain::fixture::{Fixture, MatchId};
use crate::domain::rules::LeagueRules;
use crate::domain::tour::Tour;
use crate::domain::types::{MatchClass, TeamId};
use crate::engine::candidates::CandidateSet;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::indexer::{DecisionVariableIndexer, MatchDateKey};
use chrono::{Duration, NaiveDate};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{info, instrument};

// ==========================================
// MatchModelAssembler - 逐场建模装配器
// ==========================================
pub struct MatchModelAssembler<'a> {
    fixture: &'a Fixture,
    rules: &'a LeagueRules,
    tours: &'a BTreeMap<TeamId, Vec<Tour>>,
    config: &'a RescheduleConfig,
    calendar: LeagueCalendar,
    start_date: NaiveDate,
}

impl<'a> MatchModelAssembler<'a> {
    pub fn new(
        fixture: &'a Fixture,
        rules: &'a LeagueRules,
        tours: &'a BTreeMap<TeamId, Vec<Tour>>,
        config: &'a RescheduleConfig,
        calendar: LeagueCalendar,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            fixture,
            rules,
            tours,
            config,
            calendar,
            start_date,
        }
    }

    /// 装配逐场模型
    #[instrument(skip(self, candidates), fields(entries = candidates.entries.len()))]
    pub fn assemble(&self, candidates: &CandidateSet) -> EngineResult<AssembledModel> {
        let objective = ObjectiveFunction::new(self.config.objective, self.calendar);

        // ===== 变量索引 =====
        let mut indexer = DecisionVariableIndexer::new();
        let mut vars_of_entry: Vec<Vec<usize>> = Vec::with_capacity(candidates.entries.len());
        let mut entry_of: HashMap<MatchId, usize> = HashMap::new();
        let mut placements: TeamPlacements = BTreeMap::new();

        for (group, entry) in candidates.entries.iter().enumerate() {
            let vars: Vec<usize> = entry
                .dates
                .iter()
                .map(|date| indexer.index(MatchDateKey::new(&entry.m, *date)))
                .collect();
            for (var, date) in vars.iter().zip(&entry.dates) {
                for team in [&entry.m.home, &entry.m.away] {
                    placements
                        .entry(team.clone())
                        .or_default()
                        .entry(*date)
                        .or_default()
                        .push(Placement { var: *var, group });
                }
            }
            entry_of.insert(entry.m.id(), group);
            vars_of_entry.push(vars);
        }

        let mut model = MilpModel::new(indexer.len());
        for (var, key) in indexer.keys().iter().enumerate() {
            model.objective[var] = objective.match_cost(&key.to_match());
        }

        // ===== 每场比赛恰好一个日期 =====
        for (entry, vars) in candidates.entries.iter().zip(&vars_of_entry) {
            let family = match entry.class {
                MatchClass::Disruption => ConstraintFamily::DisruptionAssignment,
                MatchClass::NonDisruption => ConstraintFamily::NonDisruptionAssignment,
            };
            if vars.is_empty() {
                if entry.class == MatchClass::Disruption {
                    return Err(EngineError::UnresolvableMatch(entry.m.id()));
                }
                continue;
            }
            model.add_unit_row(family, vars.clone(), Sense::Equal, 1.0);
        }

        // ===== 密度规则 =====
        let decided: HashSet<MatchId> = entry_of.keys().cloned().collect();
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
        let modified_vars = |group: usize| -> Vec<usize> {
            let entry = &candidates.entries[group];
            if entry.class != MatchClass::NonDisruption {
                return Vec::new();
            }
            vars_of_entry[group]
                .iter()
                .copied()
                .filter(|v| indexer.key(*v).map_or(false, |k| k.is_modified()))
                .collect()
        };

        for tours in self.tours.values() {
            for tour in tours {
                let groups: BTreeSet<usize> = tour
                    .matches
                    .iter()
                    .filter_map(|m| entry_of.get(&m.id()).copied())
                    .collect();
                let touched: Vec<usize> = groups
                    .iter()
                    .filter(|g| !modified_vars(**g).is_empty())
                    .copied()
                    .collect();
                if touched.len() <= self.config.max_mods_per_tour {
                    continue;
                }
                let vars: Vec<usize> = touched.iter().flat_map(|g| modified_vars(*g)).collect();
                model.add_unit_row(
                    ConstraintFamily::TourModifications,
                    vars,
                    Sense::LessEqual,
                    self.config.max_mods_per_tour as f64,
                );
            }
        }

        let global: Vec<usize> = (0..candidates.entries.len()).flat_map(modified_vars).collect();
        let touched_matches: BTreeSet<MatchId> = global
            .iter()
            .filter_map(|v| indexer.key(*v).map(|k| k.match_id()))
            .collect();
        if touched_matches.len() > self.config.max_non_dis_mods {
            model.add_unit_row(
                ConstraintFamily::GlobalModifications,
                global,
                Sense::LessEqual,
                self.config.max_non_dis_mods as f64,
            );
        }

        // ===== 停赛日 =====
        let no_play: BTreeSet<NaiveDate> = self.config.no_play_dates.iter().copied().collect();
        let blocked: Vec<usize> = indexer
            .keys()
            .iter()
            .enumerate()
            .filter(|(_, k)| no_play.contains(&k.proposed_date))
            .map(|(v, _)| v)
            .collect();
        model.add_unit_row(ConstraintFamily::NoPlayDates, blocked, Sense::Equal, 0.0);

        // ===== 相邻之旅保持先后顺序 =====
        if !self.config.allow_tour_overlap {
            let mut seen: HashSet<(usize, usize)> = HashSet::new();
            for tours in self.tours.values() {
                for pair in tours.windows(2) {
                    let earlier = self.non_disruption_groups(&pair[0], &entry_of, candidates);
                    let later = self.non_disruption_groups(&pair[1], &entry_of, candidates);
                    for &gi in &earlier {
                        for &gj in &later {
                            for &vi in &vars_of_entry[gi] {
                                for &vj in &vars_of_entry[gj] {
                                    let (Some(ki), Some(kj)) = (indexer.key(vi), indexer.key(vj)) else {
                                        continue;
                                    };
                                    if kj.proposed_date < ki.proposed_date && seen.insert((vi, vj)) {
                                        model.add_unit_row(
                                            ConstraintFamily::TourOrder,
                                            vec![vi, vj],
                                            Sense::LessEqual,
                                            1.0,
                                        );
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }

        info!(
            variables = model.variable_count(),
            rows = model.row_count(),
            density_rows = density_rows,
            "逐场模型装配完成"
        );

        Ok(AssembledModel {
            model,
            variables: ModelVariables::MatchDate(indexer),
        })
    }

    /// 之旅中属于非中断比赛的候选组
    fn non_disruption_groups(
        &self,
        tour: &Tour,
        entry_of: &HashMap<MatchId, usize>,
        candidates: &CandidateSet,
    ) -> Vec<usize> {
        tour.matches
            .iter()
            .filter_map(|m| entry_of.get(&m.id()).copied())
            .filter(|g| candidates.entries[*g].class == MatchClass::NonDisruption)
            .collect()
    }
}

// ==========================================
// 联赛赛程恢复引擎 - 引擎编排器
// ==========================================
// 职责: 串联单轮流程并按窗口顺序执行多轮恢复
// 流程: 封锁窗口 → 分类 → 之旅切分 → 候选/变体生成 → 约束装配 → 求解 → 投影
// 红线: 各轮严格串行，每轮读取上一轮输出的赛程快照
// 红线: 生成阶段必须完整结束后才能求解，不输出部分变量集
// ==========================================

use crate::config::{EvaluationWindow, RescheduleConfig};
use crate::domain::calendar::LeagueCalendar;
use crate::domain::distance::DistanceMatrix;
use crate::domain::fixture::{Fixture, MatchId};
use crate::domain::rules::LeagueRules;
use crate::domain::types::Formulation;
use crate::engine::assembler::{AssembledModel, MatchModelAssembler, TourModelAssembler};
use crate::engine::blackout::BlackoutCalculator;
use crate::engine::candidates::CandidateGenerator;
use crate::engine::classifier::{Classification, DisruptionClassifier};
use crate::engine::distance_screener::DistanceScreener;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::feasibility::FeasibilityValidator;
use crate::engine::projector::{Projection, ResultProjector};
use crate::engine::solver::{require_assignment, MilpSolver};
use crate::engine::tour_builder::TourBuilder;
use crate::engine::tour_shift::{ShiftSettings, TourShiftGenerator, VariantArena};
use crate::engine::travel::TravelCost;
use std::time::Instant;
use tracing::{error, info, info_span, instrument};
use uuid::Uuid;

// ==========================================
// PassModel / PassOutcome / RunReport
// ==========================================

/// 单轮装配结果（求解前）
#[derive(Debug)]
pub struct PassModel {
    pub window: EvaluationWindow,
    pub classification: Classification,
    pub assembled: AssembledModel,
}

/// 单轮执行结果
#[derive(Debug, Clone)]
pub struct PassOutcome {
    pub window: EvaluationWindow,
    pub disruptions: usize,
    pub non_disruptions: usize,
    pub variables: usize,
    pub rows: usize,
    pub objective_value: Option<f64>,
    pub projection: Projection,
    pub elapsed_ms: u128,
}

/// 多轮执行报告
///
/// 某轮失败时保留已完成的各轮，并携带该错误
#[derive(Debug)]
pub struct RunReport {
    pub run_id: Uuid,
    pub passes: Vec<PassOutcome>,
    /// 最后一个成功轮次输出的赛程
    pub fixture: Fixture,
    pub error: Option<EngineError>,
}

impl RunReport {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// 全部轮次中仍需再次改期的比赛
    pub fn needs_reschedule(&self) -> Vec<MatchId> {
        self.passes
            .iter()
            .flat_map(|p| p.projection.needs_reschedule.iter().cloned())
            .collect()
    }
}

// ==========================================
// PassBuilder - 单轮建模器
// ==========================================
// 只构建模型不求解，供导出与编排器共用
pub struct PassBuilder {
    rules: LeagueRules,
    distances: DistanceMatrix,
    config: RescheduleConfig,
}

impl PassBuilder {
    /// 创建建模器
    ///
    /// # 返回
    /// - Err(InvalidConfig): 参数不合法
    pub fn new(
        rules: LeagueRules,
        distances: DistanceMatrix,
        config: RescheduleConfig,
    ) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            rules,
            distances,
            config,
        })
    }

    pub fn config(&self) -> &RescheduleConfig {
        &self.config
    }

    /// 加载时的赛程准备：应用日期修正并校验距离矩阵覆盖全部球队
    pub fn prepare(&self, mut fixture: Fixture) -> EngineResult<Fixture> {
        let applied = fixture.apply_overrides(&self.config.date_overrides);
        if applied > 0 {
            info!(applied = applied, "已应用赛程日期修正");
        }
        self.distances.ensure_covers(fixture.teams().iter())?;
        Ok(fixture)
    }

    /// 构建单个窗口的模型（不求解）
    pub fn build_pass_model(
        &self,
        fixture: &Fixture,
        window: &EvaluationWindow,
    ) -> EngineResult<PassModel> {
        let cfg = &self.config;
        let (start, end) = (window.start, window.end);

        let calendar = LeagueCalendar::from_fixture(fixture, cfg.extended_horizon_days)?;
        let windows = BlackoutCalculator::new().compute(fixture);
        let classification = DisruptionClassifier::new().classify(fixture, &windows, start, end);
        let tours = TourBuilder::new(cfg.tour_gap_days).build_all(fixture)?;
        let validator = FeasibilityValidator::new(&self.rules, cfg.feasibility_window_days)?;

        info!(
            blackout_windows = windows.total_windows(),
            disruptions = classification.disruptions.len(),
            non_disruptions = classification.non_disruptions.len(),
            formulation = ?cfg.formulation,
            "分类完成"
        );

        let assembled = match cfg.formulation {
            Formulation::MatchDate => {
                let mut screener = DistanceScreener::new(
                    fixture,
                    &self.distances,
                    &windows,
                    calendar,
                    end,
                    cfg.feasibility_days,
                );
                if cfg.density_prescreen {
                    screener = screener.with_prescreen(&validator);
                }
                let candidates = CandidateGenerator::new(
                    &screener,
                    &windows,
                    calendar,
                    end,
                    cfg.max_adj_days,
                    cfg.margins(),
                )
                .generate(&classification)?;

                MatchModelAssembler::new(fixture, &self.rules, &tours, cfg, calendar, start)
                    .assemble(&candidates)?
            }
            Formulation::TourSequence => {
                let travel = TravelCost::new(&self.distances, calendar);
                let generator = TourShiftGenerator::new(
                    &validator,
                    &travel,
                    &windows,
                    calendar,
                    end,
                    ShiftSettings::from(cfg),
                );

                let mut arena = VariantArena::new();
                for (team, team_tours) in &tours {
                    let modifiable = TourBuilder::get_away_tours(team_tours, end);
                    generator.generate(team, &modifiable, &mut arena)?;
                }
                generator.insert_disruptions(&classification.disruptions, &mut arena)?;

                TourModelAssembler::new(fixture, &self.rules, cfg, calendar, start)
                    .assemble(arena, &classification)?
            }
        };

        Ok(PassModel {
            window: *window,
            classification,
            assembled,
        })
    }
}

// ==========================================
// RescheduleOrchestrator - 引擎编排器
// ==========================================
pub struct RescheduleOrchestrator<S>
where
    S: MilpSolver,
{
    builder: PassBuilder,
    solver: S,
    run_id: Uuid,
}

impl<S> RescheduleOrchestrator<S>
where
    S: MilpSolver,
{
    pub fn new(builder: PassBuilder, solver: S) -> Self {
        Self {
            builder,
            solver,
            run_id: Uuid::new_v4(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn builder(&self) -> &PassBuilder {
        &self.builder
    }

    // ==========================================
    // 多轮执行
    // ==========================================

    /// 按顺序执行全部窗口
    ///
    /// # 参数
    /// - `windows`: 为空时使用配置中的 evaluation_windows
    pub fn run(&self, fixture: Fixture, windows: &[EvaluationWindow]) -> RunReport {
        let span = info_span!("reschedule_run", run_id = %self.run_id);
        let _guard = span.enter();

        let windows = if windows.is_empty() {
            self.builder.config.evaluation_windows.as_slice()
        } else {
            windows
        };

        let mut report = RunReport {
            run_id: self.run_id,
            passes: Vec::new(),
            fixture: fixture.clone(),
            error: None,
        };

        let mut current = match self.builder.prepare(fixture) {
            Ok(f) => f,
            Err(e) => {
                error!(error = %e, "赛程准备失败");
                report.error = Some(e);
                return report;
            }
        };

        for window in windows {
            match self.run_pass(&current, window) {
                Ok(outcome) => {
                    current = outcome.projection.fixture.clone();
                    report.passes.push(outcome);
                }
                Err(e) => {
                    error!(start = %window.start, end = %window.end, error = %e, "本轮失败，终止后续窗口");
                    report.error = Some(e);
                    break;
                }
            }
        }

        report.fixture = current;
        info!(
            passes = report.passes.len(),
            complete = report.is_complete(),
            needs_reschedule = report.needs_reschedule().len(),
            "恢复流程结束"
        );
        report
    }

    // ==========================================
    // 单轮执行
    // ==========================================

    /// 执行单个窗口：装配 → 求解 → 投影
    #[instrument(skip(self, fixture), fields(start = %window.start, end = %window.end))]
    pub fn run_pass(&self, fixture: &Fixture, window: &EvaluationWindow) -> EngineResult<PassOutcome> {
        let started = Instant::now();
        let pass = self.builder.build_pass_model(fixture, window)?;

        info!(solver = self.solver.name(), "开始求解");
        let solution = self.solver.solve(&pass.assembled.model)?;
        let objective_value = solution.objective_value;
        let values = require_assignment(
            solution,
            &pass.assembled.model,
            (window.start, window.end),
        )?;

        let projection = ResultProjector::new().project(&pass.assembled, &values, fixture)?;

        Ok(PassOutcome {
            window: *window,
            disruptions: pass.classification.disruptions.len(),
            non_disruptions: pass.classification.non_disruptions.len(),
            variables: pass.assembled.variable_count(),
            rows: pass.assembled.model.row_count(),
            objective_value,
            projection,
            elapsed_ms: started.elapsed().as_millis(),
        })
    }
}

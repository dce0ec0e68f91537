// ==========================================
// 赛程恢复全流程测试
// ==========================================
// 覆盖: 两种建模方式端到端、回投后复分类、多轮窗口、中途失败、模型导出
// ==========================================


use league_reschedule::config::RescheduleConfig;
use league_reschedule::domain::{Fixture, MatchId};
use league_reschedule::engine::{
    BlackoutCalculator, DisruptionClassifier, EngineError, LpWriter, MilpSolver, PassBuilder,
    PassOutcome, RescheduleOrchestrator, SolveStatus,
};
use league_reschedule::Formulation;
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap};
use test_helpers::*;

fn disruption_id() -> MatchId {
    MatchId {
        home: "A".to_string(),
        away: "C".to_string(),
        game_date: day(30),
    }
}

fn builder(config: RescheduleConfig) -> PassBuilder {
    PassBuilder::new(standard_rules(), four_team_distances(), config).unwrap()
}

fn tour_config() -> RescheduleConfig {
    RescheduleConfig {
        formulation: Formulation::TourSequence,
        ..four_team_config()
    }
}

/// 校验单轮结果：中断比赛移出封锁窗口、非中断比赛调整幅度受限、同日不双赛
fn assert_pass_consistent(before: &Fixture, outcome: &PassOutcome, max_adj_days: i64) {
    let after = &outcome.projection.fixture;
    assert_eq!(after.len(), before.len(), "回投后比赛数量不变");

    let resolved = after.find(&disruption_id()).expect("中断比赛应保留在赛程中");
    assert!(resolved.original_date > outcome.window.end, "中断比赛应改到窗口之后");
    let windows = BlackoutCalculator::new().compute(before);
    assert!(
        !windows.blocks_match(&resolved.home, &resolved.visitor, resolved.original_date),
        "新日期不能落入任一球队的封锁窗口"
    );

    for row in before.rows() {
        if row.id() == disruption_id() {
            continue;
        }
        let moved = after.find(&row.id()).expect("比赛应保留");
        let shift = (moved.original_date - row.original_date).num_days().abs();
        assert!(
            shift <= max_adj_days,
            "{} 调整了 {} 天，超过上限 {}",
            row.id(),
            shift,
            max_adj_days
        );
    }

    let mut per_day: HashMap<(String, chrono::NaiveDate), usize> = HashMap::new();
    for row in after.rows() {
        for team in [&row.home, &row.visitor] {
            *per_day.entry((team.clone(), row.original_date)).or_insert(0) += 1;
        }
    }
    for ((team, date), count) in per_day {
        assert!(count <= 1, "{} 在 {} 有 {} 场比赛", team, date, count);
    }
}

// ==========================================
// 逐场建模
// ==========================================

#[test]
fn test_match_formulation_end_to_end() {
    let fixture = four_team_fixture();
    let orchestrator = RescheduleOrchestrator::new(
        builder(four_team_config()),
        MicroLpSolver,
    );

    let report = orchestrator.run(fixture.clone(), &[]);
    assert!(report.is_complete(), "求解应成功: {:?}", report.error);
    assert_eq!(report.passes.len(), 1);
    assert_eq!(report.run_id, orchestrator.run_id());

    let outcome = &report.passes[0];
    assert_eq!(outcome.disruptions, 1, "应识别一场中断比赛");
    assert_eq!(outcome.non_disruptions, 12, "窗口之后的比赛均为非中断");
    assert!(outcome.objective_value.unwrap_or(0.0) >= 4.0, "最早可用日期为第 9 天");
    assert_pass_consistent(&fixture, outcome, 1);

    let moved: Vec<_> = outcome.projection.moved().collect();
    assert!(
        moved.iter().any(|m| m.id() == disruption_id() && m.model_reschedule),
        "中断比赛应标记为模型改期"
    );
    println!(
        "✓ 逐场建模: {} 个变量, {} 条约束, 目标值 {:?}",
        outcome.variables, outcome.rows, outcome.objective_value
    );
}

#[test]
fn test_solution_satisfies_every_row() {
    let fixture = four_team_fixture();
    for config in [four_team_config(), tour_config()] {
        let builder = builder(config);
        let prepared = builder.prepare(fixture.clone()).unwrap();
        let pass = builder
            .build_pass_model(&prepared, &window(4, 6))
            .unwrap();

        let solution = MicroLpSolver
            .solve(&pass.assembled.model)
            .unwrap();
        assert_eq!(solution.status, SolveStatus::Optimal, "模型应求得最优解");
        assert!(
            pass.assembled.model.violated_rows(&solution.values).is_empty(),
            "解必须满足全部约束"
        );
        println!(
            "✓ {:?}: {} 个变量全部约束满足",
            builder.config().formulation,
            pass.assembled.variable_count()
        );
    }
}

// ==========================================
// 之旅建模
// ==========================================

#[test]
fn test_tour_formulation_end_to_end() {
    let fixture = four_team_fixture();
    let orchestrator =
        RescheduleOrchestrator::new(builder(tour_config()), MicroLpSolver);

    let report = orchestrator.run(fixture.clone(), &[]);
    assert!(report.is_complete(), "求解应成功: {:?}", report.error);

    let outcome = &report.passes[0];
    assert_eq!(outcome.disruptions, 1);
    assert_pass_consistent(&fixture, outcome, 1);
    println!(
        "✓ 之旅建模: {} 个变量, 选中 {} 个变体",
        outcome.variables, outcome.projection.chosen_variables
    );
}

// ==========================================
// 回投与复分类
// ==========================================

#[test]
fn test_reclassify_after_projection_finds_no_resolved_disruption() {
    let fixture = four_team_fixture();
    for config in [four_team_config(), tour_config()] {
        let orchestrator =
            RescheduleOrchestrator::new(builder(config), MicroLpSolver);
        let report = orchestrator.run(fixture.clone(), &[]);
        assert!(report.is_complete());

        let updated = &report.fixture;
        let windows = BlackoutCalculator::new().compute(updated);
        let again = DisruptionClassifier::new().classify(updated, &windows, day(4), day(6));
        assert!(
            again.disruptions.iter().all(|m| m.id() != disruption_id()),
            "已解决的中断比赛不应再次被判为中断"
        );
        assert!(report.needs_reschedule().is_empty(), "不应遗留需要再次改期的比赛");
    }
    println!("✓ 回投后复分类无自相矛盾");
}

// ==========================================
// 多轮窗口
// ==========================================

#[test]
fn test_consecutive_windows_chain_fixtures() {
    let fixture = four_team_fixture();
    let orchestrator = RescheduleOrchestrator::new(
        builder(four_team_config()),
        MicroLpSolver,
    );

    let report = orchestrator.run(fixture, &[window(4, 6), window(10, 12)]);
    assert!(report.is_complete(), "两轮都应成功: {:?}", report.error);
    assert_eq!(report.passes.len(), 2);
    assert_eq!(report.passes[1].disruptions, 0, "第二轮没有新的中断");

    let first = &report.passes[0].projection.fixture;
    let resolved = first.find(&disruption_id()).unwrap().original_date;
    let finally = report.fixture.find(&disruption_id()).unwrap().original_date;
    assert!(
        (finally - resolved).num_days().abs() <= 1,
        "第二轮只允许非中断比赛微调"
    );
    println!("✓ 多轮窗口依次推进");
}

#[test]
fn test_failed_pass_keeps_earlier_results() {
    let fixture = four_team_fixture();
    let solver = FailAfterSolver {
        inner: MicroLpSolver,
        remaining: Cell::new(1),
    };
    let orchestrator = RescheduleOrchestrator::new(builder(four_team_config()), solver);

    let report = orchestrator.run(fixture, &[window(4, 6), window(10, 12), window(14, 16)]);
    assert!(!report.is_complete());
    assert_eq!(report.passes.len(), 1, "失败前的窗口结果应保留");
    assert!(matches!(report.error, Some(EngineError::Solver(_))));
    assert_eq!(
        report.fixture.find(&disruption_id()).unwrap().original_date,
        report.passes[0]
            .projection
            .fixture
            .find(&disruption_id())
            .unwrap()
            .original_date,
        "报告中的赛程应停在最后一个成功窗口"
    );
    println!("✓ 中途失败保留已完成窗口");
}

#[test]
fn test_no_play_everywhere_is_infeasible() {
    let config = RescheduleConfig {
        no_play_dates: (0..=60).map(day).collect(),
        ..four_team_config()
    };
    let orchestrator =
        RescheduleOrchestrator::new(builder(config), MicroLpSolver);

    let report = orchestrator.run(four_team_fixture(), &[]);
    assert!(report.passes.is_empty());
    match report.error {
        Some(EngineError::SolverInfeasible { start, end }) => {
            assert_eq!((start, end), (day(4), day(6)));
        }
        other => panic!("期望 SolverInfeasible，实际 {:?}", other),
    }
    println!("✓ 全部停赛日时报告不可行");
}

#[test]
fn test_missing_distance_fails_preparation() {
    // D 未出现在距离表中
    let distances = distances(&[("A", "B", 100.0), ("A", "C", 200.0), ("B", "C", 150.0)]);
    let builder = PassBuilder::new(standard_rules(), distances, four_team_config()).unwrap();
    let err = builder.prepare(four_team_fixture()).unwrap_err();
    assert!(matches!(err, EngineError::UnknownTeam(ref t) if t == "D"));
    println!("✓ 距离矩阵缺队时准备阶段失败");
}

#[test]
fn test_date_override_applied_before_modelling() {
    let mut config = four_team_config();
    config.date_overrides = vec![league_reschedule::domain::DateOverride {
        home: "A".to_string(),
        visitor: "D".to_string(),
        from: day(8),
        to: day(9),
    }];
    let builder = builder(config);
    let prepared = builder.prepare(four_team_fixture()).unwrap();
    let row = prepared
        .rows()
        .iter()
        .find(|r| r.home == "A" && r.visitor == "D")
        .unwrap();
    assert_eq!(row.original_date, day(9));
    println!("✓ 日期修正在建模前生效");
}

// ==========================================
// 模型导出
// ==========================================

#[test]
fn test_export_writes_lp_and_variable_map() {
    let builder = builder(four_team_config());
    let fixture = builder.prepare(four_team_fixture()).unwrap();
    let pass = builder.build_pass_model(&fixture, &window(4, 6)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let (lp_path, map_path) = LpWriter::export(&pass.assembled, dir.path(), "pass_1").unwrap();

    let lp = std::fs::read_to_string(&lp_path).unwrap();
    for section in ["Minimize", "Subject To", "Bounds", "Binary", "End"] {
        assert!(lp.contains(section), "LP 文件缺少 {} 段", section);
    }
    assert!(lp.contains(" dis_0:"), "应包含中断比赛约束");
    assert!(lp.contains(" density_0:"), "应包含密度约束");

    let mut reader = csv::Reader::from_path(&map_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.get(0), Some("variable"));
    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), pass.assembled.variable_count(), "逐场模型每个变量一行");

    let mut by_match: BTreeMap<(String, String), usize> = BTreeMap::new();
    for record in &records {
        *by_match
            .entry((record[1].to_string(), record[2].to_string()))
            .or_insert(0) += 1;
    }
    assert!(by_match[&("A".to_string(), "C".to_string())] >= 1);
    println!("✓ 导出 {} 行变量映射", records.len());
}

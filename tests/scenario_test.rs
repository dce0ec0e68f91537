// ==========================================
// 典型场景测试
// ==========================================
// 覆盖: 封锁窗口判定中断、同日双赛不可行、零调整天数、对称行程放行
// ==========================================


use league_reschedule::domain::types::Condition;
use league_reschedule::domain::{BlackoutWindow, Fixture, LeagueCalendar, Match, MatchId};
use league_reschedule::engine::{
    BlackoutCalculator, CandidateGenerator, DisruptionClassifier, DistanceScreener,
    FeasibilityValidator, ShiftSettings, TourBuilder, TourShiftGenerator, TravelCost, TwoLegTrip,
    VariantArena,
};
use league_reschedule::LeagueRules;
use test_helpers::*;

/// A 客场对 B：第 7、13 天正常进行，第 10 天的比赛延期到第 25 天
fn two_team_fixture() -> Fixture {
    Fixture::new(vec![
        game("A", "B", 7),
        postponed("B", "A", 10, 25),
        game("B", "A", 13),
    ])
    .unwrap()
}

#[test]
fn test_blackout_match_becomes_single_disruption() {
    let fixture = two_team_fixture();
    let windows = BlackoutCalculator::new().compute(&fixture);
    let expected = BlackoutWindow::new(day(8), day(12)).unwrap();
    assert_eq!(windows.windows_for("A"), &[expected], "A 的封锁窗口应为 [8,12]");

    let classification = DisruptionClassifier::new().classify(&fixture, &windows, day(1), day(10));
    assert_eq!(classification.disruptions.len(), 1, "应恰好识别一场中断比赛");
    let disruption = &classification.disruptions[0];
    assert_eq!(
        disruption.id(),
        MatchId {
            home: "B".to_string(),
            away: "A".to_string(),
            game_date: day(25),
        }
    );
    assert_eq!(disruption.original_date, day(10));
    println!("✓ 封锁窗口内的比赛被识别为中断");

    let distances = distances(&[("A", "B", 400.0)]);
    let calendar = LeagueCalendar::from_fixture(&fixture, 30).unwrap();
    let screener = DistanceScreener::new(&fixture, &distances, &windows, calendar, day(10), 5);
    let candidates = CandidateGenerator::new(
        &screener,
        &windows,
        calendar,
        day(10),
        1,
        vec![0.0, 0.2, 0.7, 1.0],
    )
    .generate(&classification)
    .unwrap();

    let entry = candidates.entry(&disruption.id()).expect("中断比赛应有候选条目");
    assert!(!entry.dates.is_empty(), "候选日期不应为空");
    assert!(
        entry.dates.iter().all(|d| !expected.contains(*d) && *d > day(10)),
        "候选日期必须晚于窗口终点且不在封锁窗口内"
    );
    println!("✓ 候选日期 {} 个，全部位于封锁窗口之外", entry.dates.len());
}

#[test]
fn test_same_day_pair_fails_feasibility() {
    let mut rules = LeagueRules::new();
    rules.insert_max_games(Condition::All, 1, 1);
    let validator = FeasibilityValidator::new(&rules, 1).unwrap();

    let first = game("B", "A", 12).to_match();
    let second = game("C", "A", 14).to_match().with_proposed(day(12));
    assert!(
        !validator.validate(&[first.clone(), second]),
        "同一天两场比赛必须判为不可行"
    );
    assert!(validator.validate(&[first]), "单场比赛应可行");
    println!("✓ 同日双赛被可行性校验拒绝");
}

#[test]
fn test_zero_adjustment_keeps_only_unmodified_variants() {
    let fixture = four_team_fixture();
    let rules = standard_rules();
    let distances = four_team_distances();
    let calendar = LeagueCalendar::from_fixture(&fixture, 30).unwrap();
    let windows = BlackoutCalculator::new().compute(&fixture);
    let validator = FeasibilityValidator::new(&rules, 3).unwrap();
    let travel = TravelCost::new(&distances, calendar);

    let config = four_team_config();
    let settings = ShiftSettings {
        max_adj_days: 0,
        ..ShiftSettings::from(&config)
    };
    let generator =
        TourShiftGenerator::new(&validator, &travel, &windows, calendar, day(6), settings);

    let tours = TourBuilder::new(config.tour_gap_days).build_all(&fixture).unwrap();
    let mut arena = VariantArena::new();
    let mut expected_tours = 0;
    for (team, team_tours) in &tours {
        let modifiable = TourBuilder::get_away_tours(team_tours, day(6));
        expected_tours += modifiable.len();
        generator.generate(team, &modifiable, &mut arena).unwrap();
    }

    assert!(expected_tours > 0, "应存在可调整的客场之旅");
    assert_eq!(arena.len(), expected_tours, "每个之旅只应有一个变体");
    for (key, ids) in arena.tours() {
        assert_eq!(ids.len(), 1, "之旅 {:?} 的变体数应为 1", key);
        let variant = arena.get(ids[0]).unwrap();
        assert_eq!(variant.n_mods, 0, "唯一变体不应有改动");
        assert!(variant
            .new_sequence
            .iter()
            .all(|m| m.proposed_date == m.original_date));
    }
    println!("✓ max_adj_days=0 时仅保留 {} 个原始变体", arena.len());
}

#[test]
fn test_symmetric_legs_pass_zero_margin() {
    let trip = TwoLegTrip {
        inbound: 500.0,
        outbound: 500.0,
    };
    assert!(trip.total() > 300.0, "总距离超过参考值");
    assert!(trip.accepted(300.0, 0.0), "两段等长的行程应通过比例条件");

    let lopsided = TwoLegTrip {
        inbound: 200.0,
        outbound: 800.0,
    };
    assert!(!lopsided.accepted(300.0, 0.0), "不对称且超距的行程应被拒绝");

    let one_leg = TwoLegTrip {
        inbound: 0.0,
        outbound: 900.0,
    };
    assert!(!one_leg.accepted(300.0, 0.0), "单段为零时比例条件不适用");
    println!("✓ 对称行程在零容差下通过");
}

#[test]
fn test_screener_admits_symmetric_day_over_reference() {
    // C 原计划第 10 天客场对 A（前后都在 B 主场），候选日前后分别在 D 主场
    let fixture = Fixture::new(vec![
        game("B", "C", 8),
        game("A", "C", 10),
        game("B", "C", 12),
        game("D", "C", 20),
        game("D", "C", 24),
    ])
    .unwrap();
    let distances = distances(&[
        ("A", "B", 100.0),
        ("A", "C", 300.0),
        ("A", "D", 500.0),
        ("B", "C", 300.0),
        ("B", "D", 600.0),
        ("C", "D", 700.0),
    ]);
    let windows = BlackoutCalculator::new().compute(&fixture);
    let calendar = LeagueCalendar::from_fixture(&fixture, 0).unwrap();
    let screener = DistanceScreener::new(&fixture, &distances, &windows, calendar, day(15), 1);

    let m: Match = fixture
        .rows()
        .iter()
        .find(|r| r.home == "A")
        .map(|r| r.to_match())
        .unwrap();
    let dates = screener
        .team_admissible_dates(&m, "C", 0.0, false)
        .unwrap();
    assert!(dates.contains(&day(22)), "D→A→D 两段等长，应被放行");
    println!("✓ 距离筛选对对称往返放行");
}

// ==========================================
// 数据目录仓储集成测试
// ==========================================
// 测试目标: 从 CSV 目录加载赛程、规则、距离矩阵并直接建模
// ==========================================


use league_reschedule::domain::types::Condition;
use league_reschedule::engine::PassBuilder;
use league_reschedule::importer::ImportError;
use league_reschedule::repository::{
    FileScheduleRepository, RepositoryError, ScheduleRepository, ScheduleTable,
};
use std::fs;
use std::path::Path;
use test_helpers::{day, four_team_config, window};

const FIXTURE_CSV: &str = "\
home,visitor,game_date,original_date,reschedule,day_difference
A,B,2021-01-02,2021-01-02,0,0
C,D,2021-01-02,2021-01-02,0,0
B,C,2021-01-04,2021-01-04,0,0
D,A,2021-01-04,2021-01-04,0,0
A,C,2021-01-31,2021-01-06,1,25
B,D,2021-01-06,2021-01-06,0,0
A,D,2021-01-09,2021-01-09,0,0
C,B,2021-01-10,2021-01-10,0,0
B,A,2021-01-12,2021-01-12,0,0
D,C,2021-01-12,2021-01-12,0,0
C,A,2021-01-14,2021-01-14,0,0
B,D,2021-01-14,2021-01-14,0,0
";

const RULES_CSV: &str = "\
Max_games_1_all,Max_games_2_all,Max_games_3_all,Back2Backs_all
1,2,2,15
1,2,2,20
";

const DISTANCES_CSV: &str = "\
Team,A,B,C,D
A,0,100,200,300
B,100,0,150,250
C,200,150,0,120
D,300,250,120,0
";

fn write_league(dir: &Path) {
    fs::write(dir.join("demo_original_and_true_schedule.csv"), FIXTURE_CSV).unwrap();
    fs::write(dir.join("demo_schedule_rules.csv"), RULES_CSV).unwrap();
    fs::write(dir.join("demo_distances_matrix.csv"), DISTANCES_CSV).unwrap();
}

#[test]
fn test_load_all_tables() {
    let dir = tempfile::tempdir().unwrap();
    write_league(dir.path());
    let repo = FileScheduleRepository::new(dir.path()).unwrap();

    let fixture = repo.load_fixture().unwrap();
    assert_eq!(fixture.len(), 12);
    assert_eq!(fixture.teams().len(), 4);
    let postponed: Vec<_> = fixture.rows().iter().filter(|r| r.reschedule).collect();
    assert_eq!(postponed.len(), 1);
    assert_eq!(postponed[0].original_date, day(5));
    assert_eq!(postponed[0].day_difference, 25);
    println!("✓ 赛程表加载 {} 行", fixture.len());

    let rules = repo.load_rules().unwrap();
    assert_eq!(rules.windows(Condition::All), vec![1, 2, 3]);
    assert_eq!(rules.back_to_backs(Condition::All), Some(20), "列取最大值");
    println!("✓ 规则表加载");

    let distances = repo.load_distances().unwrap();
    assert_eq!(distances.distance("C", "D").unwrap(), 120.0);
    assert_eq!(distances.distance("D", "C").unwrap(), 120.0);
    assert_eq!(distances.teams().len(), 4);
    println!("✓ 距离矩阵加载");
}

#[test]
fn test_loaded_tables_build_a_model() {
    let dir = tempfile::tempdir().unwrap();
    write_league(dir.path());
    let repo = FileScheduleRepository::new(dir.path()).unwrap();

    let builder = PassBuilder::new(
        repo.load_rules().unwrap(),
        repo.load_distances().unwrap(),
        four_team_config(),
    )
    .unwrap();
    let fixture = builder.prepare(repo.load_fixture().unwrap()).unwrap();
    let pass = builder.build_pass_model(&fixture, &window(4, 6)).unwrap();

    assert_eq!(pass.classification.disruptions.len(), 1);
    assert!(pass.assembled.variable_count() > 0);
    println!("✓ 目录数据直接建模: {} 个变量", pass.assembled.variable_count());
}

#[test]
fn test_missing_table_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("demo_schedule_rules.csv"), RULES_CSV).unwrap();
    let repo = FileScheduleRepository::new(dir.path()).unwrap();

    assert!(repo.locate(ScheduleTable::Rules).is_ok());
    match repo.load_fixture() {
        Err(RepositoryError::TableNotFound { table, .. }) => assert_eq!(table, "fixture"),
        other => panic!("期望 TableNotFound，实际 {:?}", other.map(|f| f.len())),
    }
    println!("✓ 缺表时报告 TableNotFound");
}

#[test]
fn test_fixture_without_required_column() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("bad_fixture.csv"),
        "home,game_date\nA,2021-01-02\n",
    )
    .unwrap();
    let repo = FileScheduleRepository::new(dir.path()).unwrap();

    let err = repo.load_fixture().unwrap_err();
    assert!(
        matches!(err, RepositoryError::Import(ImportError::FieldMappingError { .. })),
        "缺少 visitor 列应报错: {:?}",
        err
    );
    println!("✓ 缺列时报告字段映射错误");
}

#[test]
fn test_header_only_table_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("demo_distances.csv"), "Team,A,B\n").unwrap();
    let repo = FileScheduleRepository::new(dir.path()).unwrap();

    assert!(matches!(
        repo.load_distances(),
        Err(RepositoryError::Import(ImportError::EmptyTable(_)))
    ));
    println!("✓ 空表被拒绝");
}

// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 配置库读写、改期参数加载、非法值回退
// ==========================================


use league_reschedule::config::{config_keys, ConfigManager, RescheduleConfig};
use league_reschedule::{DistanceMode, Formulation, ObjectiveKind};
use test_helpers::{create_test_db, day, window};

#[test]
fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path);
    assert!(config_manager.is_ok(), "ConfigManager 应创建成功");
}

#[test]
fn test_empty_store_yields_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();

    let cfg = manager.load_reschedule_config().unwrap();
    let defaults = RescheduleConfig::default();
    assert_eq!(cfg.formulation, defaults.formulation);
    assert_eq!(cfg.max_adj_days, defaults.max_adj_days);
    assert_eq!(cfg.distance_margins, defaults.distance_margins);
    assert!(cfg.evaluation_windows.is_empty());
    println!("✓ 空配置库返回默认参数");
}

#[test]
fn test_values_override_defaults() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();

    manager
        .set_global_config_value(config_keys::FORMULATION, "tour_sequence")
        .unwrap();
    manager
        .set_global_config_value(config_keys::OBJECTIVE, "squared")
        .unwrap();
    manager
        .set_global_config_value(config_keys::MAX_ADJ_DAYS, "2")
        .unwrap();
    manager
        .set_global_config_value(config_keys::DISTANCE_MARGINS, "0.1, 0.5, 1.0")
        .unwrap();
    manager
        .set_global_config_value(config_keys::DISTANCE_WEIGHT, "0.25")
        .unwrap();
    manager
        .set_global_config_value(config_keys::NO_PLAY_DATES, r#"["2021-01-10", "2021-01-11"]"#)
        .unwrap();
    manager
        .set_global_config_value(
            config_keys::EVALUATION_WINDOWS,
            r#"[{"start": "2021-01-05", "end": "2021-01-07"}]"#,
        )
        .unwrap();

    let cfg = manager.load_reschedule_config().unwrap();
    assert_eq!(cfg.formulation, Formulation::TourSequence);
    assert_eq!(cfg.objective, ObjectiveKind::Squared);
    assert_eq!(cfg.max_adj_days, 2);
    assert_eq!(cfg.distance_margins, vec![0.1, 0.5, 1.0]);
    assert_eq!(cfg.distance_weight, 0.25);
    assert_eq!(cfg.no_play_dates, vec![day(9), day(10)]);
    assert_eq!(cfg.evaluation_windows, vec![window(4, 6)]);
    assert!(cfg.validate().is_ok());

    assert_eq!(manager.get_no_play_dates().unwrap().len(), 2);
    assert_eq!(manager.get_evaluation_windows().unwrap(), vec![window(4, 6)]);
    println!("✓ 配置库覆写默认参数");
}

#[test]
fn test_upsert_replaces_value() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();

    manager
        .set_global_config_value(config_keys::MAX_NON_DIS_MODS, "5")
        .unwrap();
    manager
        .set_global_config_value(config_keys::MAX_NON_DIS_MODS, "8")
        .unwrap();
    assert_eq!(
        manager
            .get_global_config_value(config_keys::MAX_NON_DIS_MODS)
            .unwrap()
            .as_deref(),
        Some("8")
    );
    assert_eq!(manager.load_reschedule_config().unwrap().max_non_dis_mods, 8);
    println!("✓ 同键写入覆盖旧值");
}

#[test]
fn test_invalid_values_fall_back() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();

    manager
        .set_global_config_value(config_keys::MAX_ADJ_DAYS, "many")
        .unwrap();
    manager
        .set_global_config_value(config_keys::FORMULATION, "per_season")
        .unwrap();
    manager
        .set_global_config_value(config_keys::NO_PLAY_DATES, "not json")
        .unwrap();
    manager
        .set_global_config_value(config_keys::DISTANCE_MARGINS, "0.1,,x")
        .unwrap();

    let cfg = manager.load_reschedule_config().unwrap();
    let defaults = RescheduleConfig::default();
    assert_eq!(cfg.max_adj_days, defaults.max_adj_days, "非法整数回退默认值");
    assert_eq!(cfg.formulation, defaults.formulation, "未知建模方式回退默认值");
    assert!(cfg.no_play_dates.is_empty(), "非法 JSON 回退默认值");
    assert_eq!(cfg.distance_margins, defaults.distance_margins);
    println!("✓ 非法配置值回退默认值");
}

#[test]
fn test_distance_mode_switches_margins() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();
    manager
        .set_global_config_value(config_keys::DISTANCE_MODE, "mid")
        .unwrap();

    let cfg = manager.load_reschedule_config().unwrap();
    assert_eq!(cfg.distance_mode, Some(DistanceMode::Mid));
    assert_eq!(cfg.margins(), DistanceMode::Mid.margins());
    println!("✓ 距离档位决定容差序列");
}

#[test]
fn test_config_snapshot_lists_keys() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let manager = ConfigManager::new(&db_path).unwrap();
    manager
        .set_global_config_value(config_keys::MAX_ADJ_DAYS, "3")
        .unwrap();

    let snapshot = manager.get_config_snapshot().unwrap();
    let value: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
    assert_eq!(value[config_keys::MAX_ADJ_DAYS], "3");
    println!("✓ 配置快照为 JSON");
}

#[test]
fn test_json_config_file() {
    let cfg = RescheduleConfig::from_json(
        r#"{
            "formulation": "tour_sequence",
            "max_mods_per_tour": 1,
            "evaluation_windows": [{"start": "2021-01-05", "end": "2021-01-07"}],
            "date_overrides": [{"home": "A", "visitor": "D", "from": "2021-01-09", "to": "2021-01-10"}]
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.formulation, Formulation::TourSequence);
    assert_eq!(cfg.max_mods_per_tour, 1);
    assert_eq!(cfg.date_overrides.len(), 1);
    assert_eq!(cfg.date_overrides[0].to, day(9));
    assert_eq!(cfg.extended_horizon_days, 180, "缺省字段取默认值");
    println!("✓ JSON 配置文件加载");
}

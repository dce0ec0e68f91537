// ==========================================
// 联赛赛程恢复引擎 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// 红线: 非法配置值记录告警并回退默认值，不中断加载
// ==========================================

use crate::config::reschedule_config::{EvaluationWindow, RescheduleConfig};
use crate::db::{ensure_config_schema, open_sqlite_connection};
use crate::domain::fixture::DateOverride;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（自动建表）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_config_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            ensure_config_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 用途
    /// - 运行时记录本次改期使用的配置
    pub fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;

        let mut config_map: HashMap<String, String> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        let json_value = json!(config_map);
        Ok(serde_json::to_string(&json_value)?)
    }

    // ===== 改期参数 =====

    /// 加载改期参数：以默认值为底，逐键覆写
    pub fn load_reschedule_config(&self) -> Result<RescheduleConfig, Box<dyn Error>> {
        let mut cfg = RescheduleConfig::default();

        cfg.formulation = self.parsed_or(config_keys::FORMULATION, cfg.formulation)?;
        cfg.objective = self.parsed_or(config_keys::OBJECTIVE, cfg.objective)?;
        if let Some(raw) = self.get_config_value(config_keys::DISTANCE_MODE)? {
            match raw.parse() {
                Ok(mode) => cfg.distance_mode = Some(mode),
                Err(e) => warn_invalid(config_keys::DISTANCE_MODE, &raw, &e),
            }
        }
        if let Some(raw) = self.get_config_value(config_keys::DISTANCE_MARGINS)? {
            let margins: Result<Vec<f64>, _> =
                raw.split(',').map(|s| s.trim().parse::<f64>()).collect();
            match margins {
                Ok(m) if !m.is_empty() => cfg.distance_margins = m,
                _ => warn_invalid(config_keys::DISTANCE_MARGINS, &raw, &"容差列表格式错误"),
            }
        }
        cfg.feasibility_days = self.parsed_or(config_keys::FEASIBILITY_DAYS, cfg.feasibility_days)?;
        cfg.max_adj_days = self.parsed_or(config_keys::MAX_ADJ_DAYS, cfg.max_adj_days)?;
        cfg.max_mods_per_tour =
            self.parsed_or(config_keys::MAX_MODS_PER_TOUR, cfg.max_mods_per_tour)?;
        cfg.max_non_dis_mods = self.parsed_or(config_keys::MAX_NON_DIS_MODS, cfg.max_non_dis_mods)?;
        cfg.allow_tour_overlap =
            self.parsed_or(config_keys::ALLOW_TOUR_OVERLAP, cfg.allow_tour_overlap)?;
        cfg.extended_horizon_days =
            self.parsed_or(config_keys::EXTENDED_HORIZON_DAYS, cfg.extended_horizon_days)?;
        cfg.distance_weight = self.parsed_or(config_keys::DISTANCE_WEIGHT, cfg.distance_weight)?;
        cfg.density_prescreen =
            self.parsed_or(config_keys::DENSITY_PRESCREEN, cfg.density_prescreen)?;

        cfg.no_play_dates = self.json_or(config_keys::NO_PLAY_DATES, cfg.no_play_dates)?;
        cfg.date_overrides = self.json_or(config_keys::DATE_OVERRIDES, cfg.date_overrides)?;
        cfg.evaluation_windows =
            self.json_or(config_keys::EVALUATION_WINDOWS, cfg.evaluation_windows)?;

        Ok(cfg)
    }

    /// 停赛日列表
    pub fn get_no_play_dates(&self) -> Result<Vec<NaiveDate>, Box<dyn Error>> {
        self.json_or(config_keys::NO_PLAY_DATES, Vec::new())
    }

    /// 赛程日期修正列表
    pub fn get_date_overrides(&self) -> Result<Vec<DateOverride>, Box<dyn Error>> {
        self.json_or(config_keys::DATE_OVERRIDES, Vec::new())
    }

    /// 评估窗口列表
    pub fn get_evaluation_windows(&self) -> Result<Vec<EvaluationWindow>, Box<dyn Error>> {
        self.json_or(config_keys::EVALUATION_WINDOWS, Vec::new())
    }

    fn parsed_or<T>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_config_value(key)? {
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => Ok(v),
                Err(e) => {
                    warn_invalid(key, &raw, &e);
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }

    fn json_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T, Box<dyn Error>> {
        match self.get_config_value(key)? {
            Some(raw) => match serde_json::from_str::<T>(&raw) {
                Ok(v) => Ok(v),
                Err(e) => {
                    warn_invalid(key, &raw, &e);
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }
}

fn warn_invalid(key: &str, raw: &str, err: &dyn std::fmt::Display) {
    tracing::warn!(
        config_key = key,
        raw_value = %raw,
        error = %err,
        "配置值格式错误，使用默认值"
    );
}

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 建模
    pub const FORMULATION: &str = "reschedule/formulation";
    pub const OBJECTIVE: &str = "reschedule/objective";

    // 距离筛选
    pub const DISTANCE_MODE: &str = "reschedule/distance_mode";
    pub const DISTANCE_MARGINS: &str = "reschedule/distance_margins"; // 逗号分隔
    pub const FEASIBILITY_DAYS: &str = "reschedule/feasibility_days";
    pub const DENSITY_PRESCREEN: &str = "reschedule/density_prescreen";

    // 改动预算
    pub const MAX_ADJ_DAYS: &str = "reschedule/max_adj_days";
    pub const MAX_MODS_PER_TOUR: &str = "reschedule/max_mods_per_tour";
    pub const MAX_NON_DIS_MODS: &str = "reschedule/max_non_dis_mods";
    pub const ALLOW_TOUR_OVERLAP: &str = "reschedule/allow_tour_overlap";

    // 赛历
    pub const EXTENDED_HORIZON_DAYS: &str = "reschedule/extended_horizon_days";
    pub const NO_PLAY_DATES: &str = "calendar/no_play_dates"; // JSON 数组
    pub const DATE_OVERRIDES: &str = "calendar/date_overrides"; // JSON 数组
    pub const EVALUATION_WINDOWS: &str = "calendar/evaluation_windows"; // JSON 数组

    // 目标函数
    pub const DISTANCE_WEIGHT: &str = "objective/distance_weight";
}

// ==========================================
// 联赛赛程恢复引擎 - 改期参数
// ==========================================
// 职责: 候选生成、约束装配、轮次划分的全部可调参数
// 存储: JSON 文件或 config_kv（逐键覆写默认值）
// ==========================================

use crate::domain::fixture::DateOverride;
use crate::domain::types::{DistanceMode, Formulation, ObjectiveKind};
use crate::engine::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 改期评估窗口 [start, end]（一个轮次）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// 改期参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RescheduleConfig {
    /// 建模方式
    pub formulation: Formulation,

    /// 目标函数
    pub objective: ObjectiveKind,

    /// 距离容差档位；设置后覆盖 distance_margins
    pub distance_mode: Option<DistanceMode>,

    /// 逐步放宽的距离容差序列（最后一档不设最少天数门槛）
    pub distance_margins: Vec<f64>,

    /// 每支球队至少需要的可选日期数
    pub feasibility_days: usize,

    /// 非中断比赛允许的最大日期偏移（天）
    pub max_adj_days: i64,

    /// 单个之旅最多改动的非中断比赛数
    pub max_mods_per_tour: usize,

    /// 全局最多改动的非中断比赛数
    pub max_non_dis_mods: usize,

    /// 是否允许同一球队的之旅重叠
    pub allow_tour_overlap: bool,

    /// 延长期天数（已知赛程终点之后）
    pub extended_horizon_days: i64,

    /// 之旅内相邻比赛的最大间隔（天）
    pub tour_gap_days: i64,

    /// 可行性校验的最大窗口长度
    pub feasibility_window_days: u32,

    /// 密度约束从评估窗口开始前多少天起算
    pub density_lookback_days: i64,

    /// 中断比赛插入之旅时向两侧扩展的天数
    pub insertion_margin_days: i64,

    /// 单个变体最多插入的中断比赛数
    pub max_insertions_per_variant: usize,

    /// 合成之旅起点：已知赛程终点之前的天数
    pub synthetic_days_before: i64,

    /// 合成之旅终点：已知赛程终点之后的天数
    pub synthetic_days_after: i64,

    /// 之旅变体目标中旅行距离的权重
    pub distance_weight: f64,

    /// 距离筛选时是否同时做单日密度预筛
    pub density_prescreen: bool,

    /// 联赛统一停赛日
    pub no_play_dates: Vec<NaiveDate>,

    /// 加载时应用的赛程日期修正
    pub date_overrides: Vec<DateOverride>,

    /// 按顺序执行的评估窗口
    pub evaluation_windows: Vec<EvaluationWindow>,
}

impl Default for RescheduleConfig {
    fn default() -> Self {
        Self {
            formulation: Formulation::MatchDate,
            objective: ObjectiveKind::Basic,
            distance_mode: None,
            distance_margins: vec![0.0, 0.2, 0.7, 1.0],
            feasibility_days: 5,
            max_adj_days: 1,
            max_mods_per_tour: 2,
            max_non_dis_mods: 20,
            allow_tour_overlap: false,
            extended_horizon_days: 180,
            tour_gap_days: 3,
            feasibility_window_days: 3,
            density_lookback_days: 7,
            insertion_margin_days: 2,
            max_insertions_per_variant: 2,
            synthetic_days_before: 4,
            synthetic_days_after: 30,
            distance_weight: 0.0,
            density_prescreen: false,
            no_play_dates: Vec::new(),
            date_overrides: Vec::new(),
            evaluation_windows: Vec::new(),
        }
    }
}

impl RescheduleConfig {
    /// 从 JSON 文本加载（缺省字段取默认值）
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// 生效的距离容差序列
    pub fn margins(&self) -> Vec<f64> {
        match self.distance_mode {
            Some(mode) => mode.margins(),
            None => self.distance_margins.clone(),
        }
    }

    /// 参数合法性校验
    pub fn validate(&self) -> EngineResult<()> {
        let margins = self.margins();
        if margins.is_empty() {
            return Err(EngineError::InvalidConfig("距离容差序列为空".to_string()));
        }
        if margins.iter().any(|m| *m < 0.0 || !m.is_finite()) {
            return Err(EngineError::InvalidConfig(format!("距离容差非法: {:?}", margins)));
        }
        if self.max_adj_days < 0 {
            return Err(EngineError::InvalidConfig(format!(
                "max_adj_days 不能为负: {}",
                self.max_adj_days
            )));
        }
        if self.tour_gap_days < 0 || self.extended_horizon_days < 0 {
            return Err(EngineError::InvalidConfig(
                "tour_gap_days / extended_horizon_days 不能为负".to_string(),
            ));
        }
        if self.feasibility_window_days == 0 {
            return Err(EngineError::InvalidConfig(
                "feasibility_window_days 至少为 1".to_string(),
            ));
        }
        for window in &self.evaluation_windows {
            if window.start > window.end {
                return Err(EngineError::InvalidConfig(format!(
                    "评估窗口起点晚于终点: [{}, {}]",
                    window.start, window.end
                )));
            }
        }
        Ok(())
    }
}

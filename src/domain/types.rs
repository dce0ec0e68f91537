// ==========================================
// 联赛赛程恢复引擎 - 领域类型定义
// ==========================================
// 职责: 主客场条件、比赛分类、目标函数与建模方式等枚举
// 红线: 枚举的序列化格式与配置文件保持一致 (snake_case)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 球队标识（球队名称）
pub type TeamId = String;

// ==========================================
// 比赛条件 (Condition)
// ==========================================
// 规则表按条件区分: home / away / all (all 聚合主客场)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    Home,
    Away,
    All,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Home => write!(f, "home"),
            Condition::Away => write!(f, "away"),
            Condition::All => write!(f, "all"),
        }
    }
}

impl FromStr for Condition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" => Ok(Condition::Home),
            "away" => Ok(Condition::Away),
            "all" => Ok(Condition::All),
            other => Err(format!("未知比赛条件: {}", other)),
        }
    }
}

// ==========================================
// 比赛分类 (Match Class)
// ==========================================
// 某一评估时点的分类标签，不是独立存储
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchClass {
    Disruption,    // 落入封锁窗口，需要改期
    NonDisruption, // 未来比赛，可能被连带微调
}

// ==========================================
// 目标函数 (Objective Kind)
// ==========================================
// 变量成本 = f(|proposed_date - original_date|)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    Basic,   // 线性天数
    Double,  // 2 × 天数
    Squared, // 天数²
    Unitary, // 1，延长期日期按天数计
}

impl Default for ObjectiveKind {
    fn default() -> Self {
        ObjectiveKind::Basic
    }
}

impl fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveKind::Basic => write!(f, "basic"),
            ObjectiveKind::Double => write!(f, "double"),
            ObjectiveKind::Squared => write!(f, "squared"),
            ObjectiveKind::Unitary => write!(f, "unitary"),
        }
    }
}

impl FromStr for ObjectiveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(ObjectiveKind::Basic),
            "double" => Ok(ObjectiveKind::Double),
            "squared" => Ok(ObjectiveKind::Squared),
            "unitary" => Ok(ObjectiveKind::Unitary),
            other => Err(format!("未知目标函数: {}", other)),
        }
    }
}

// ==========================================
// 建模方式 (Formulation)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formulation {
    /// 变量 = (比赛, 候选日期)
    MatchDate,
    /// 变量 = 客场之旅变体
    TourSequence,
}

impl Default for Formulation {
    fn default() -> Self {
        Formulation::MatchDate
    }
}

impl FromStr for Formulation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "match_date" => Ok(Formulation::MatchDate),
            "tour_sequence" => Ok(Formulation::TourSequence),
            other => Err(format!("未知建模方式: {}", other)),
        }
    }
}

// ==========================================
// 距离容差档位 (Distance Mode)
// ==========================================
// 每档对应一组逐步放宽的容差序列，最后一档不设最少天数门槛
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMode {
    Low,
    Mid,
    High,
}

impl DistanceMode {
    /// 档位对应的容差序列
    pub fn margins(self) -> Vec<f64> {
        match self {
            DistanceMode::Low => vec![0.0, 0.2, 0.7, 2400.0, 2500.0],
            DistanceMode::Mid => vec![0.2, 0.7, 1.0, 2400.0, 2500.0],
            DistanceMode::High => vec![1500.0, 2000.0, 2200.0, 2400.0, 2500.0],
        }
    }
}

impl FromStr for DistanceMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(DistanceMode::Low),
            "mid" => Ok(DistanceMode::Mid),
            "high" => Ok(DistanceMode::High),
            other => Err(format!("未知距离档位: {}", other)),
        }
    }
}

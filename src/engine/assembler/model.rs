// ==========================================
// 联赛赛程恢复引擎 - MILP 模型表示
// ==========================================
// 职责: 二元变量、目标系数、稀疏约束行
// 红线: 这是与外部求解器的全部契约，不含求解器专有参数
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 约束方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sense {
    LessEqual,
    Equal,
    GreaterEqual,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::LessEqual => write!(f, "<="),
            Sense::Equal => write!(f, "="),
            Sense::GreaterEqual => write!(f, ">="),
        }
    }
}

/// 约束族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintFamily {
    DisruptionAssignment,
    NonDisruptionAssignment,
    TourAssignment,
    Density,
    TourModifications,
    GlobalModifications,
    NoPlayDates,
    TourOrder,
}

impl ConstraintFamily {
    /// LP 导出时的行名前缀
    pub fn prefix(&self) -> &'static str {
        match self {
            ConstraintFamily::DisruptionAssignment => "dis",
            ConstraintFamily::NonDisruptionAssignment => "nondis",
            ConstraintFamily::TourAssignment => "tour",
            ConstraintFamily::Density => "density",
            ConstraintFamily::TourModifications => "tour_mods",
            ConstraintFamily::GlobalModifications => "global_mods",
            ConstraintFamily::NoPlayDates => "no_play",
            ConstraintFamily::TourOrder => "order",
        }
    }
}

/// 稀疏约束行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintRow {
    pub family: ConstraintFamily,
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
    pub sense: Sense,
    pub rhs: f64,
}

impl ConstraintRow {
    /// 在给定 0/1 取值下是否满足
    pub fn is_satisfied(&self, values: &[f64]) -> bool {
        let activity: f64 = self
            .indices
            .iter()
            .zip(&self.values)
            .map(|(i, c)| c * values.get(*i).copied().unwrap_or(0.0))
            .sum();
        const EPS: f64 = 1e-6;
        match self.sense {
            Sense::LessEqual => activity <= self.rhs + EPS,
            Sense::Equal => (activity - self.rhs).abs() <= EPS,
            Sense::GreaterEqual => activity >= self.rhs - EPS,
        }
    }
}

// ==========================================
// MilpModel - 二元指派模型
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MilpModel {
    /// 目标系数（按变量下标），变量均为 [0, 1] 二元变量
    pub objective: Vec<f64>,
    pub rows: Vec<ConstraintRow>,
}

impl MilpModel {
    pub fn new(variable_count: usize) -> Self {
        Self {
            objective: vec![0.0; variable_count],
            rows: Vec::new(),
        }
    }

    pub fn variable_count(&self) -> usize {
        self.objective.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// 添加系数全为 1 的约束行
    pub fn add_unit_row(
        &mut self,
        family: ConstraintFamily,
        indices: Vec<usize>,
        sense: Sense,
        rhs: f64,
    ) {
        let values = vec![1.0; indices.len()];
        self.add_row(family, indices, values, sense, rhs);
    }

    /// 添加约束行（空行忽略）
    pub fn add_row(
        &mut self,
        family: ConstraintFamily,
        indices: Vec<usize>,
        values: Vec<f64>,
        sense: Sense,
        rhs: f64,
    ) {
        if indices.is_empty() {
            return;
        }
        self.rows.push(ConstraintRow {
            family,
            indices,
            values,
            sense,
            rhs,
        });
    }

    pub fn rows_of(&self, family: ConstraintFamily) -> impl Iterator<Item = &ConstraintRow> {
        self.rows.iter().filter(move |r| r.family == family)
    }

    /// 目标值
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.iter().zip(values).map(|(c, x)| c * x).sum()
    }

    /// 违反的约束行
    pub fn violated_rows(&self, values: &[f64]) -> Vec<&ConstraintRow> {
        self.rows.iter().filter(|r| !r.is_satisfied(values)).collect()
    }
}

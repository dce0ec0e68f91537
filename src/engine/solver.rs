// ==========================================
// 联赛赛程恢复引擎 - 求解器边界
// ==========================================
// 职责: 定义外部 MILP 求解器的调用契约
// 输入: MilpModel（二元变量、目标系数、稀疏约束行）
// 输出: SolverSolution（逐变量取值）
// 红线: 引擎不携带任何求解器调参；超时与取消由求解器负责
// ==========================================

use crate::engine::assembler::MilpModel;
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 求解状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    /// 可行但未证明最优（如达到时间上限）
    Feasible,
    Infeasible,
    Unbounded,
    Aborted,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "optimal",
            SolveStatus::Feasible => "feasible",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded => "unbounded",
            SolveStatus::Aborted => "aborted",
        };
        write!(f, "{}", s)
    }
}

/// 求解结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverSolution {
    pub status: SolveStatus,
    /// 按变量下标的取值
    pub values: Vec<f64>,
    pub objective_value: Option<f64>,
}

impl SolverSolution {
    pub fn has_assignment(&self) -> bool {
        matches!(self.status, SolveStatus::Optimal | SolveStatus::Feasible)
    }

    /// 取整后为 1 的变量下标
    pub fn chosen(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| v.round() == 1.0)
            .map(|(i, _)| i)
            .collect()
    }
}

/// 外部求解器
///
/// 实现方可以是进程内绑定，也可以是读取 LP 文件的外部程序
pub trait MilpSolver {
    fn name(&self) -> &str;

    fn solve(&self, model: &MilpModel) -> EngineResult<SolverSolution>;
}

/// 检查求解结果，转换为可投影的取值
///
/// # 参数
/// - `window`: 当前改期窗口（用于错误信息）
pub fn require_assignment(
    solution: SolverSolution,
    model: &MilpModel,
    window: (chrono::NaiveDate, chrono::NaiveDate),
) -> EngineResult<Vec<f64>> {
    match solution.status {
        SolveStatus::Optimal | SolveStatus::Feasible => {
            if solution.values.len() != model.variable_count() {
                return Err(EngineError::AssignmentMismatch {
                    expected: model.variable_count(),
                    actual: solution.values.len(),
                });
            }
            Ok(solution.values)
        }
        SolveStatus::Infeasible => Err(EngineError::SolverInfeasible {
            start: window.0,
            end: window.1,
        }),
        other => Err(EngineError::Solver(format!("求解状态: {}", other))),
    }
}

// ==========================================
// 联赛赛程恢复引擎 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 致命错误必须中止当前窗口，不得静默输出部分正确的赛程
// 红线: 不可行的之旅变体在本地丢弃，不作为错误传播
// ==========================================

use crate::domain::fixture::MatchId;
use crate::domain::types::{Condition, TeamId};
use chrono::NaiveDate;
use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 候选生成错误 =====
    #[error("无法安排的比赛: {0}（所有距离容差与插入尝试均已耗尽）")]
    UnresolvableMatch(MatchId),

    // ===== 规则与数据错误 =====
    #[error("规则表缺少规则: condition={condition}, window={window}")]
    RuleLookupMiss { condition: Condition, window: u32 },

    #[error("球队没有任何比赛: {0}")]
    EmptyTeamFixture(TeamId),

    #[error("重复比赛记录: {0}")]
    DuplicateMatch(MatchId),

    #[error("距离矩阵缺少球队: {0}")]
    UnknownTeam(TeamId),

    #[error("距离矩阵无效: {0}")]
    InvalidDistanceMatrix(String),

    #[error("配置无效: {0}")]
    InvalidConfig(String),

    // ===== 求解器错误 =====
    #[error("模型无可行解: 窗口 [{start}, {end}]")]
    SolverInfeasible { start: NaiveDate, end: NaiveDate },

    #[error("求解器失败: {0}")]
    Solver(String),

    #[error("求解结果长度不匹配: 期望 {expected} 个变量，实际 {actual} 个")]
    AssignmentMismatch { expected: usize, actual: usize },

    // ===== 输出错误 =====
    #[error("模型导出失败: {0}")]
    Export(#[from] std::io::Error),
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;

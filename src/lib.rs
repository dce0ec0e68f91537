// ==========================================
// 联赛赛程恢复引擎 - 核心库
// ==========================================
// 职责: 中断比赛改期的候选生成与约束装配
// 技术栈: Rust + SQLite（配置）+ 外部 MILP 求解器
// 系统定位: 批处理建模引擎，按改期窗口逐轮执行
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 输入数据访问
pub mod repository;

// 引擎层 - 候选生成与约束装配
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 改期参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{Condition, DistanceMode, Formulation, MatchClass, ObjectiveKind};

// 领域实体
pub use domain::{
    DistanceMatrix, Fixture, FixtureRow, LeagueCalendar, LeagueRules, Match, MatchId, Tour,
    TourVariant,
};

// 引擎
pub use engine::{
    AssembledModel, EngineError, EngineResult, LpWriter, MilpModel, MilpSolver, PassBuilder,
    RescheduleOrchestrator, ResultProjector, RunReport, SolveStatus, SolverSolution,
};

// 配置
pub use config::{ConfigManager, EvaluationWindow, RescheduleConfig};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "联赛赛程恢复引擎";

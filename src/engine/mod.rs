// ==========================================
// 联赛赛程恢复引擎 - 引擎层
// ==========================================
// 职责: 候选生成与约束装配，求解器作为外部协作者
// 红线: 引擎不读写文件、不访问数据库，输入输出均为内存结构
// 红线: 约束行引用的变量下标在装配前确定且顺序稳定
// ==========================================

pub mod assembler;
pub mod blackout;
pub mod candidates;
pub mod classifier;
pub mod distance_screener;
pub mod error;
pub mod feasibility;
pub mod indexer;
pub mod lp_writer;
pub mod orchestrator;
pub mod projector;
pub mod solver;
pub mod tour_builder;
pub mod tour_shift;
pub mod travel;

// 重导出核心引擎
pub use assembler::{
    AssembledModel, ConstraintFamily, ConstraintRow, MatchModelAssembler, MilpModel,
    ModelVariables, ObjectiveFunction, Sense, TourModelAssembler,
};
pub use blackout::BlackoutCalculator;
pub use candidates::{CandidateEntry, CandidateGenerator, CandidateSet};
pub use classifier::{Classification, DisruptionClassifier};
pub use distance_screener::{DistanceScreener, ScreenedMatch, ScreeningResult, TwoLegTrip};
pub use error::{EngineError, EngineResult};
pub use feasibility::FeasibilityValidator;
pub use indexer::{DecisionVariableIndexer, MatchDateKey};
pub use lp_writer::LpWriter;
pub use orchestrator::{PassBuilder, PassModel, PassOutcome, RescheduleOrchestrator, RunReport};
pub use projector::{ProjectedMatch, Projection, ResultProjector};
pub use solver::{MilpSolver, SolveStatus, SolverSolution};
pub use tour_builder::TourBuilder;
pub use tour_shift::{ShiftSettings, ShiftStats, TourShiftGenerator, VariantArena, VariantId};
pub use travel::TravelCost;

// ==========================================
// 联赛赛程恢复引擎 - 数据仓储层
// ==========================================
// 职责: 提供输入数据访问接口，屏蔽文件格式细节
// 红线: Repository 不含业务逻辑
// ==========================================

pub mod error;
pub mod schedule_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use schedule_repo::{FileScheduleRepository, ScheduleRepository, ScheduleTable};

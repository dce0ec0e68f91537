// ==========================================
// 联赛赛程恢复引擎 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::engine::error::EngineError;
use crate::importer::error::ImportError;
use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据源错误 =====
    #[error("数据目录不存在: {0}")]
    DataDirNotFound(String),

    #[error("未找到数据表: {table}（目录 {dir}）")]
    TableNotFound { table: String, dir: String },

    #[error("距离矩阵无法识别行标签列")]
    TeamColumnNotFound,

    // ===== 下层错误 =====
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

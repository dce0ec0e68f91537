// ==========================================
// 联赛赛程恢复引擎 - 导入层
// ==========================================
// 职责: 读取赛程表、规则表、距离矩阵
// 支持: Excel, CSV
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{parse_date_text, FixtureFieldMapper};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRecord, UniversalFileParser};

// ==========================================
// 联赛赛程恢复引擎 - 配置层
// ==========================================
// 职责: 改期参数定义与加载，支持 JSON 与 config_kv 覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod reschedule_config;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager};
pub use reschedule_config::{EvaluationWindow, RescheduleConfig};

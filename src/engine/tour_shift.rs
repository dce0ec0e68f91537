// ==========================================
// 联赛赛程恢复引擎 - 之旅平移生成器
// ==========================================
// 红线: 只物化通过可行性校验的变体
// 红线: 每条变更路径都在基础序列的副本上进行
// ==========================================
// 职责: 之旅日期微调、中断比赛插入、合成占位之旅
// 输入: 可修改的客场之旅 + 中断比赛
// 输出: VariantArena（变体 + (球队, 日期) / 之旅 / 比赛 二级索引）
// ==========================================

mod arena;
mod core;


pub use arena::{VariantArena, VariantId};
pub use core::{ShiftSettings, ShiftStats, TourShiftGenerator};

// ==========================================
// 联赛赛程恢复引擎 - 约束装配
// ==========================================
// 红线: 约束行只引用全局变量下标，装配前索引必须完整且有序
// 红线: 中断比赛没有任何变量时报 UnresolvableMatch
// ==========================================
// 职责: 在已索引变量上构建约束族与目标系数
// 输入: 候选集合（逐场建模）或变体 arena（之旅建模）
// 输出: AssembledModel（MilpModel + 变量键）
// ==========================================

mod density;
mod match_model;
mod model;
mod objective;
mod tour_model;

pub use match_model::MatchModelAssembler;
pub use model::{ConstraintFamily, ConstraintRow, MilpModel, Sense};
pub use objective::ObjectiveFunction;
pub use tour_model::TourModelAssembler;

use crate::domain::fixture::{Match, MatchId};
use crate::domain::tour::VariantKey;
use crate::engine::indexer::{DecisionVariableIndexer, MatchDateKey};
use crate::engine::tour_shift::{VariantArena, VariantId};
use std::collections::BTreeMap;

/// 变量键（按建模方式）
#[derive(Debug)]
pub enum ModelVariables {
    MatchDate(DecisionVariableIndexer<MatchDateKey>),
    TourSequence {
        indexer: DecisionVariableIndexer<VariantKey>,
        arena: VariantArena,
        /// 变量下标 → arena 下标
        variant_of: Vec<VariantId>,
    },
}

/// 装配完成的模型
#[derive(Debug)]
pub struct AssembledModel {
    pub model: MilpModel,
    pub variables: ModelVariables,
}

impl AssembledModel {
    pub fn variable_count(&self) -> usize {
        self.model.variable_count()
    }

    /// 变量取 1 时确定的比赛日期
    pub fn placements(&self, var: usize) -> Vec<Match> {
        match &self.variables {
            ModelVariables::MatchDate(indexer) => indexer
                .key(var)
                .map(|k| vec![k.to_match()])
                .unwrap_or_default(),
            ModelVariables::TourSequence {
                arena, variant_of, ..
            } => variant_of
                .get(var)
                .and_then(|id| arena.get(*id))
                .map(|v| v.new_sequence.clone())
                .unwrap_or_default(),
        }
    }

    /// 比赛 → 涉及该比赛的变量下标
    pub fn variables_by_match(&self) -> BTreeMap<MatchId, Vec<usize>> {
        let mut map: BTreeMap<MatchId, Vec<usize>> = BTreeMap::new();
        for var in 0..self.variable_count() {
            for m in self.placements(var) {
                map.entry(m.id()).or_default().push(var);
            }
        }
        map
    }

    /// LP 导出用的变量名
    pub fn variable_name(&self, var: usize) -> String {
        format!("x{}", var)
    }
}

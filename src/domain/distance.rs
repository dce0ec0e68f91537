// ==========================================
// 联赛赛程恢复引擎 - 球队距离矩阵
// ==========================================
// 职责: 两两球队城市间距离查询
// 红线: 对称矩阵，对角线为 0
// ==========================================

use crate::domain::types::TeamId;
use crate::engine::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// 对称性校验容差
const SYMMETRY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistanceMatrix {
    teams: BTreeSet<TeamId>,
    distances: HashMap<(TeamId, TeamId), f64>,
}

impl DistanceMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写入一对球队距离（双向）
    pub fn insert(&mut self, a: &str, b: &str, distance: f64) {
        self.teams.insert(a.to_string());
        self.teams.insert(b.to_string());
        self.distances.insert((a.to_string(), b.to_string()), distance);
        self.distances.insert((b.to_string(), a.to_string()), distance);
    }

    /// 从方阵表格构建
    ///
    /// # 参数
    /// - rows: 每行 列名 → 值
    /// - team_column: 行标签所在列名
    ///
    /// # 返回
    /// 校验对称性与零对角线后的矩阵
    pub fn from_table(rows: &[HashMap<String, String>], team_column: &str) -> EngineResult<Self> {
        let mut raw: HashMap<(TeamId, TeamId), f64> = HashMap::new();
        let mut teams = BTreeSet::new();

        for row in rows {
            let team = row
                .get(team_column)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    EngineError::InvalidDistanceMatrix(format!("缺少行标签列 {}", team_column))
                })?;
            teams.insert(team.clone());

            for (column, value) in row {
                if column == team_column {
                    continue;
                }
                let distance = value.trim().parse::<f64>().map_err(|_| {
                    EngineError::InvalidDistanceMatrix(format!(
                        "{} → {} 距离无法解析: {}",
                        team, column, value
                    ))
                })?;
                raw.insert((team.clone(), column.trim().to_string()), distance);
            }
        }

        for ((a, b), d) in &raw {
            if a == b && d.abs() > SYMMETRY_TOLERANCE {
                return Err(EngineError::InvalidDistanceMatrix(format!(
                    "对角线 {} 非零: {}",
                    a, d
                )));
            }
            if let Some(back) = raw.get(&(b.clone(), a.clone())) {
                if (back - d).abs() > SYMMETRY_TOLERANCE {
                    return Err(EngineError::InvalidDistanceMatrix(format!(
                        "{} 与 {} 距离不对称: {} / {}",
                        a, b, d, back
                    )));
                }
            }
        }

        Ok(Self {
            teams,
            distances: raw,
        })
    }

    /// 两队距离，同一球队为 0
    pub fn distance(&self, a: &str, b: &str) -> EngineResult<f64> {
        if a == b {
            return Ok(0.0);
        }
        self.distances
            .get(&(a.to_string(), b.to_string()))
            .copied()
            .ok_or_else(|| {
                let missing = if self.teams.contains(a) { b } else { a };
                EngineError::UnknownTeam(missing.to_string())
            })
    }

    /// 涉及该球队的最小正距离
    pub fn min_positive_distance(&self, team: &str) -> Option<f64> {
        self.distances
            .iter()
            .filter(|((a, b), d)| (a == team || b == team) && **d > 0.0)
            .map(|(_, d)| *d)
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.min(d))))
    }

    /// 校验赛程中的每对球队都有距离
    pub fn ensure_covers<'a>(&self, teams: impl IntoIterator<Item = &'a TeamId>) -> EngineResult<()> {
        let teams: Vec<&TeamId> = teams.into_iter().collect();
        for a in &teams {
            for b in &teams {
                self.distance(a, b)?;
            }
        }
        Ok(())
    }

    pub fn teams(&self) -> &BTreeSet<TeamId> {
        &self.teams
    }
}

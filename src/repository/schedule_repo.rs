// ==========================================
// 联赛赛程恢复引擎 - 赛程数据仓储
// ==========================================
// 职责: 从数据目录加载赛程表、规则表、距离矩阵
// 红线: 仓储只做读取与映射，不含候选生成逻辑
// ==========================================

use crate::domain::distance::DistanceMatrix;
use crate::domain::fixture::Fixture;
use crate::domain::rules::LeagueRules;
use crate::importer::{FixtureFieldMapper, ImportError, RawRecord, UniversalFileParser};
use crate::repository::error::{RepositoryError, RepositoryResult};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 赛程数据仓储
pub trait ScheduleRepository {
    fn load_fixture(&self) -> RepositoryResult<Fixture>;

    fn load_rules(&self) -> RepositoryResult<LeagueRules>;

    fn load_distances(&self) -> RepositoryResult<DistanceMatrix>;
}

/// 数据表种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleTable {
    Fixture,
    Rules,
    Distances,
}

impl ScheduleTable {
    /// 文件名主干的可接受后缀（如 nba_original_and_true_schedule.csv）
    fn stem_suffixes(&self) -> &'static [&'static str] {
        match self {
            ScheduleTable::Fixture => &["original_and_true_schedule", "fixture"],
            ScheduleTable::Rules => &["schedule_rules", "rules"],
            ScheduleTable::Distances => &["distances_matrix", "distances"],
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ScheduleTable::Fixture => "fixture",
            ScheduleTable::Rules => "rules",
            ScheduleTable::Distances => "distances",
        }
    }
}

// ==========================================
// FileScheduleRepository - 基于目录的仓储实现
// ==========================================
pub struct FileScheduleRepository {
    data_dir: PathBuf,
    parser: UniversalFileParser,
}

impl FileScheduleRepository {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> RepositoryResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        if !data_dir.is_dir() {
            return Err(RepositoryError::DataDirNotFound(
                data_dir.display().to_string(),
            ));
        }
        Ok(Self {
            data_dir,
            parser: UniversalFileParser,
        })
    }

    /// 定位数据表文件（按文件名排序取第一个匹配项）
    pub fn locate(&self, table: ScheduleTable) -> RepositoryResult<PathBuf> {
        let entries = std::fs::read_dir(&self.data_dir).map_err(ImportError::from)?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| {
                let ext = p
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(str::to_lowercase)
                    .unwrap_or_default();
                matches!(ext.as_str(), "csv" | "xlsx" | "xls")
            })
            .filter(|p| {
                p.file_stem()
                    .and_then(|s| s.to_str())
                    .map(|stem| {
                        let stem = stem.to_lowercase();
                        table.stem_suffixes().iter().any(|suffix| stem.ends_with(suffix))
                    })
                    .unwrap_or(false)
            })
            .collect();
        candidates.sort();

        candidates
            .into_iter()
            .next()
            .ok_or_else(|| RepositoryError::TableNotFound {
                table: table.name().to_string(),
                dir: self.data_dir.display().to_string(),
            })
    }

    fn read(&self, table: ScheduleTable) -> RepositoryResult<Vec<RawRecord>> {
        let path = self.locate(table)?;
        let records = self.parser.parse(&path)?;
        debug!(table = table.name(), path = %path.display(), rows = records.len(), "数据表读取完成");
        if records.is_empty() {
            return Err(ImportError::EmptyTable(table.name().to_string()).into());
        }
        Ok(records)
    }
}

impl ScheduleRepository for FileScheduleRepository {
    fn load_fixture(&self) -> RepositoryResult<Fixture> {
        let records = self.read(ScheduleTable::Fixture)?;
        let rows = FixtureFieldMapper.map_rows(&records)?;
        let fixture = Fixture::new(rows)?;
        info!(rows = fixture.len(), teams = fixture.teams().len(), "赛程加载完成");
        Ok(fixture)
    }

    fn load_rules(&self) -> RepositoryResult<LeagueRules> {
        let records = self.read(ScheduleTable::Rules)?;
        Ok(LeagueRules::from_table(&records)?)
    }

    fn load_distances(&self) -> RepositoryResult<DistanceMatrix> {
        let records = self.read(ScheduleTable::Distances)?;
        let team_column = detect_team_column(&records).ok_or(RepositoryError::TeamColumnNotFound)?;
        let matrix = DistanceMatrix::from_table(&records, &team_column)?;
        info!(teams = matrix.teams().len(), team_column = %team_column, "距离矩阵加载完成");
        Ok(matrix)
    }
}

/// 行标签列：其取值全部是其他列名的那一列
fn detect_team_column(records: &[RawRecord]) -> Option<String> {
    let headers: BTreeSet<&String> = records.iter().flat_map(|r| r.keys()).collect();
    headers
        .iter()
        .find(|h| {
            records.iter().all(|r| {
                r.get(h.as_str())
                    .map_or(false, |v| v != **h && headers.contains(&v))
            })
        })
        .map(|h| (*h).clone())
}

// ==========================================
// 联赛赛程恢复引擎 - 赛程字段映射
// ==========================================
// 职责: 原始记录 → FixtureRow，含别名、类型转换与缺省推导
// 红线: original_date 缺失时回填 game_date
// 红线: day_difference 缺失时按 game_date - original_date 推导
// ==========================================

use crate::domain::fixture::FixtureRow;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawRecord;
use chrono::NaiveDate;

/// 支持的日期格式（带时间的值只取日期部分）
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"];

pub struct FixtureFieldMapper;

impl FixtureFieldMapper {
    /// 映射整张赛程表
    ///
    /// # 参数
    /// - `records`: 原始记录，行号从 1 开始计（不含表头）
    pub fn map_rows(&self, records: &[RawRecord]) -> ImportResult<Vec<FixtureRow>> {
        if records.is_empty() {
            return Err(ImportError::EmptyTable("fixture".to_string()));
        }
        records
            .iter()
            .enumerate()
            .map(|(i, record)| self.map_row(record, i + 1))
            .collect()
    }

    pub fn map_row(&self, row: &RawRecord, row_number: usize) -> ImportResult<FixtureRow> {
        let home = self.require_string(row, "home", row_number)?;
        let visitor = self.require_string(row, "visitor", row_number)?;

        let game_date = self
            .parse_date(row, "game_date", row_number)?
            .ok_or_else(|| ImportError::FieldMappingError {
                row: row_number,
                message: "game_date 为空".to_string(),
            })?;
        let original_date = self
            .parse_date(row, "original_date", row_number)?
            .unwrap_or(game_date);

        let day_difference = self
            .parse_i64(row, "day_difference", row_number)?
            .unwrap_or_else(|| (game_date - original_date).num_days());
        let reschedule = self
            .parse_flag(row, "reschedule", row_number)?
            .unwrap_or(day_difference != 0);

        Ok(FixtureRow {
            home,
            visitor,
            original_date,
            game_date,
            reschedule,
            day_difference,
        })
    }

    /// 提取字符串字段，支持列名别名
    fn get_string(&self, row: &RawRecord, key: &str) -> Option<String> {
        let aliases: &[&str] = match key {
            "home" => &["home", "Home", "home_team"],
            "visitor" => &["visitor", "Visitor", "away", "away_team"],
            "game_date" => &["game_date", "date", "Date"],
            "original_date" => &["original_date", "planned_date"],
            "day_difference" => &["day_difference", "day_diff"],
            _ => &[],
        };

        std::iter::once(key)
            .chain(aliases.iter().copied())
            .filter_map(|alias| row.get(alias))
            .map(|v| v.trim())
            .find(|v| !v.is_empty() && !v.eq_ignore_ascii_case("nan"))
            .map(str::to_string)
    }

    fn require_string(&self, row: &RawRecord, key: &str, row_number: usize) -> ImportResult<String> {
        self.get_string(row, key)
            .ok_or_else(|| ImportError::FieldMappingError {
                row: row_number,
                message: format!("{} 为空", key),
            })
    }

    /// 解析整数（兼容 "3.0" 形式）
    fn parse_i64(&self, row: &RawRecord, key: &str, row_number: usize) -> ImportResult<Option<i64>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => value
                .parse::<i64>()
                .ok()
                .or_else(|| {
                    value
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.fract() == 0.0)
                        .map(|f| f as i64)
                })
                .map(Some)
                .ok_or_else(|| ImportError::TypeConversionError {
                    row: row_number,
                    field: key.to_string(),
                    message: format!("无法解析为整数: {}", value),
                }),
        }
    }

    /// 解析 0/1 标记（兼容 1.0 / true / false）
    fn parse_flag(&self, row: &RawRecord, key: &str, row_number: usize) -> ImportResult<Option<bool>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => match value.to_lowercase().as_str() {
                "1" | "1.0" | "true" => Ok(Some(true)),
                "0" | "0.0" | "false" => Ok(Some(false)),
                _ => Err(ImportError::TypeConversionError {
                    row: row_number,
                    field: key.to_string(),
                    message: format!("无法解析为 0/1 标记: {}", value),
                }),
            },
        }
    }

    /// 解析日期
    fn parse_date(
        &self,
        row: &RawRecord,
        key: &str,
        row_number: usize,
    ) -> ImportResult<Option<NaiveDate>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => parse_date_text(&value)
                .map(Some)
                .ok_or_else(|| ImportError::DateFormatError {
                    row: row_number,
                    field: key.to_string(),
                    value,
                }),
        }
    }
}

/// 解析日期文本；"2021-01-05 19:30:00" / "2021-01-05T19:30" 只取日期部分
pub fn parse_date_text(value: &str) -> Option<NaiveDate> {
    let date_part = value
        .split(|c: char| c == ' ' || c == 'T')
        .next()
        .unwrap_or(value);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> RawRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_full_row() {
        let row = record(&[
            ("home", "BOS"),
            ("visitor", "NYK"),
            ("original_date", "2021-01-05"),
            ("game_date", "2021-02-10"),
            ("reschedule", "1.0"),
            ("day_difference", "36.0"),
        ]);
        let mapped = FixtureFieldMapper.map_row(&row, 1).unwrap();
        assert_eq!(mapped.home, "BOS");
        assert_eq!(mapped.visitor, "NYK");
        assert!(mapped.reschedule);
        assert_eq!(mapped.day_difference, 36);
    }

    #[test]
    fn test_missing_original_date_backfilled() {
        let row = record(&[("home", "BOS"), ("visitor", "NYK"), ("game_date", "20210105")]);
        let mapped = FixtureFieldMapper.map_row(&row, 1).unwrap();
        assert_eq!(mapped.original_date, mapped.game_date);
        assert_eq!(mapped.day_difference, 0);
        assert!(!mapped.reschedule);
    }

    #[test]
    fn test_day_difference_derived() {
        let row = record(&[
            ("home", "BOS"),
            ("away", "NYK"),
            ("original_date", "2021-01-05 00:00:00"),
            ("game_date", "2021-01-08"),
        ]);
        let mapped = FixtureFieldMapper.map_row(&row, 1).unwrap();
        assert_eq!(mapped.day_difference, 3);
        assert!(mapped.reschedule);
    }

    #[test]
    fn test_bad_date_reports_row() {
        let row = record(&[("home", "BOS"), ("visitor", "NYK"), ("game_date", "05.01.2021")]);
        let err = FixtureFieldMapper.map_row(&row, 7).unwrap_err();
        assert!(matches!(err, ImportError::DateFormatError { row: 7, .. }));
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(
            FixtureFieldMapper.map_rows(&[]),
            Err(ImportError::EmptyTable(_))
        ));
    }
}

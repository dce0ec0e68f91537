// ==========================================
// 联赛赛程恢复引擎 - 模型导出
// ==========================================
// 职责: 以 CPLEX LP 文本格式导出模型，并导出变量映射表
// 输入: AssembledModel
// 输出: <stem>.lp + <stem>_variables.csv
// 红线: 行名 = 约束族前缀 + 族内序号，变量名 = x<下标>，与变量映射表一致
// ==========================================

use crate::engine::assembler::AssembledModel;
use crate::engine::error::EngineResult;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// 每行最多写出的项数（LP 格式对行长有限制）
const TERMS_PER_LINE: usize = 8;

/// 变量映射表的一行
#[derive(Debug, Serialize)]
struct VariableMapRecord<'a> {
    variable: String,
    home: &'a str,
    away: &'a str,
    original_date: String,
    game_date: String,
    proposed_date: String,
    cost: f64,
}

/// 导出器
pub struct LpWriter;

impl LpWriter {
    /// 写出 LP 文本
    pub fn write_lp<W: Write>(assembled: &AssembledModel, out: &mut W) -> EngineResult<()> {
        let model = &assembled.model;

        writeln!(out, "\\ league reschedule model")?;
        writeln!(
            out,
            "\\ variables: {}, rows: {}",
            model.variable_count(),
            model.row_count()
        )?;

        writeln!(out, "Minimize")?;
        let objective: Vec<(usize, f64)> = model.objective.iter().copied().enumerate().collect();
        write!(out, " obj:")?;
        Self::write_terms(out, assembled, &objective)?;
        writeln!(out)?;

        writeln!(out, "Subject To")?;
        let mut counters: HashMap<&'static str, usize> = HashMap::new();
        for row in &model.rows {
            let prefix = row.family.prefix();
            let n = counters.entry(prefix).or_insert(0);
            write!(out, " {}_{}:", prefix, n)?;
            *n += 1;

            let terms: Vec<(usize, f64)> = row
                .indices
                .iter()
                .copied()
                .zip(row.values.iter().copied())
                .collect();
            Self::write_terms(out, assembled, &terms)?;
            writeln!(out, " {} {}", row.sense, format_number(row.rhs))?;
        }

        writeln!(out, "Bounds")?;
        for var in 0..model.variable_count() {
            writeln!(out, " 0 <= {} <= 1", assembled.variable_name(var))?;
        }

        writeln!(out, "Binary")?;
        let names: Vec<String> = (0..model.variable_count())
            .map(|var| assembled.variable_name(var))
            .collect();
        for chunk in names.chunks(TERMS_PER_LINE) {
            writeln!(out, " {}", chunk.join(" "))?;
        }

        writeln!(out, "End")?;
        Ok(())
    }

    /// 写出变量映射表（旅程变量每场比赛一行）
    ///
    /// # 返回
    /// 写出的记录数
    pub fn write_variable_map<W: Write>(assembled: &AssembledModel, out: W) -> EngineResult<usize> {
        let mut writer = csv::Writer::from_writer(out);
        let mut written = 0;

        for var in 0..assembled.variable_count() {
            let cost = assembled.model.objective.get(var).copied().unwrap_or(0.0);
            for m in assembled.placements(var) {
                writer
                    .serialize(VariableMapRecord {
                        variable: assembled.variable_name(var),
                        home: &m.home,
                        away: &m.away,
                        original_date: m.original_date.to_string(),
                        game_date: m.game_date.to_string(),
                        proposed_date: m.proposed_date.to_string(),
                        cost,
                    })
                    .map_err(std::io::Error::from)?;
                written += 1;
            }
        }

        writer.flush()?;
        Ok(written)
    }

    /// 导出到目录
    ///
    /// # 返回
    /// (LP 文件路径, 变量映射表路径)
    pub fn export(
        assembled: &AssembledModel,
        dir: &Path,
        stem: &str,
    ) -> EngineResult<(PathBuf, PathBuf)> {
        std::fs::create_dir_all(dir)?;

        let lp_path = dir.join(format!("{}.lp", stem));
        let mut lp = BufWriter::new(File::create(&lp_path)?);
        Self::write_lp(assembled, &mut lp)?;
        lp.flush()?;

        let map_path = dir.join(format!("{}_variables.csv", stem));
        let records = Self::write_variable_map(assembled, File::create(&map_path)?)?;

        info!(
            lp = %lp_path.display(),
            variable_map = %map_path.display(),
            records = records,
            "模型已导出"
        );
        Ok((lp_path, map_path))
    }

    fn write_terms<W: Write>(
        out: &mut W,
        assembled: &AssembledModel,
        terms: &[(usize, f64)],
    ) -> EngineResult<()> {
        if terms.is_empty() {
            // 空行写常数 0
            write!(out, " 0")?;
            return Ok(());
        }
        for (i, (var, coef)) in terms.iter().enumerate() {
            if i > 0 && i % TERMS_PER_LINE == 0 {
                write!(out, "\n   ")?;
            }
            let sign = if *coef < 0.0 { "-" } else { "+" };
            let name = assembled.variable_name(*var);
            if i == 0 && sign == "+" {
                write!(out, " {} {}", format_number(*coef), name)?;
            } else {
                write!(out, " {} {} {}", sign, format_number(coef.abs()), name)?;
            }
        }
        Ok(())
    }
}

/// 数值格式：整数不带小数点
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

// ==========================================
// 联赛赛程恢复引擎 - 命令行入口
// ==========================================
// 用法: league-reschedule <data_dir> <output_dir> [config.json | config.db]
// 职责: 加载三张输入表，构建首个改期窗口的模型并导出 LP 与变量映射表
// 说明: 求解由外部求解器读取 LP 文件完成
// ==========================================

use anyhow::{anyhow, bail, Context, Result};
use league_reschedule::config::{ConfigManager, EvaluationWindow, RescheduleConfig};
use league_reschedule::engine::{LpWriter, PassBuilder};
use league_reschedule::logging;
use league_reschedule::repository::{FileScheduleRepository, ScheduleRepository};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let (data_dir, output_dir) = match (args.next(), args.next()) {
        (Some(d), Some(o)) => (PathBuf::from(d), PathBuf::from(o)),
        _ => bail!("用法: league-reschedule <data_dir> <output_dir> [config.json | config.db]"),
    };
    let config = load_config(args.next().as_deref())?;

    tracing::info!("==================================================");
    tracing::info!("{} v{}", league_reschedule::APP_NAME, league_reschedule::VERSION);
    tracing::info!(data_dir = %data_dir.display(), output_dir = %output_dir.display(), "开始建模");
    tracing::info!("==================================================");

    let repo = FileScheduleRepository::new(&data_dir)?;
    let fixture = repo.load_fixture()?;
    let rules = repo.load_rules()?;
    let distances = repo.load_distances()?;

    let builder = PassBuilder::new(rules, distances, config)?;
    let fixture = builder.prepare(fixture)?;

    let window: EvaluationWindow = builder
        .config()
        .evaluation_windows
        .first()
        .copied()
        .context("配置中没有改期窗口 (evaluation_windows)")?;

    let pass = builder.build_pass_model(&fixture, &window)?;
    let stem = format!("reschedule_{}_{}", window.start, window.end);
    let (lp_path, map_path) = LpWriter::export(&pass.assembled, &output_dir, &stem)?;

    println!(
        "variables={} rows={} disruptions={}",
        pass.assembled.variable_count(),
        pass.assembled.model.row_count(),
        pass.classification.disruptions.len()
    );
    println!("lp={}", lp_path.display());
    println!("variable_map={}", map_path.display());
    Ok(())
}

/// 加载配置：JSON 文件或 SQLite 配置库，缺省时使用默认值
fn load_config(path: Option<&str>) -> Result<RescheduleConfig> {
    let Some(path) = path else {
        return Ok(RescheduleConfig::default());
    };

    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "json" => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("无法读取配置文件 {}", path))?;
            RescheduleConfig::from_json(&raw).with_context(|| format!("配置文件格式错误 {}", path))
        }
        "db" | "sqlite" => {
            let manager = ConfigManager::new(path).map_err(|e| anyhow!(e.to_string()))?;
            manager
                .load_reschedule_config()
                .map_err(|e| anyhow!(e.to_string()))
        }
        other => bail!("不支持的配置文件类型: {}", other),
    }
}

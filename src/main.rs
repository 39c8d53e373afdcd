// ==========================================
// 供应链碳足迹计算器 - 命令行入口
// ==========================================
// 用法:
//   folkcharm-impact [show]                 显示当前输入的计算结果
//   folkcharm-impact import <file>          导入 JSON 快照（任意历史版本）
//   folkcharm-impact reset                  重新开始（清空输入）
//   folkcharm-impact export-csv <file>      导出分类明细 CSV
//   folkcharm-impact validate               按向导步骤校验当前输入
//   folkcharm-impact factors                显示生效的排放因子
// 数据库: FOLKCHARM_IMPACT_DB_PATH 或用户数据目录
// ==========================================

use folkcharm_impact::api::InputValidator;
use folkcharm_impact::app::{get_default_db_path, AppState};
use folkcharm_impact::report::ReportSummary;
use folkcharm_impact::{logging, StateMigrator};
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "show".to_string());

    let db_path = get_default_db_path();
    tracing::debug!("使用数据库: {}", db_path);
    let state = AppState::new(db_path)?;
    let migrator = StateMigrator::for_today();

    match command.as_str() {
        "show" => {
            let session = state.open_session(migrator)?;
            let factors = state.emission_factors()?;
            let result = session.results(&factors);
            let summary = ReportSummary::build(&session.record().meta, &result);

            println!("{} ({})", summary.title, summary.period_label);
            for row in &summary.rows {
                println!("  {:<16} {:>12.3} kg CO2e  {:>5.1}%", row.label, row.emissions_kg, row.share_pct);
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        "import" => {
            let file = args.next().ok_or("import 需要文件路径")?;
            let raw = std::fs::read_to_string(&file)?;
            let mut session = state.open_session(migrator)?;
            session.import_snapshot(&raw)?;
            println!("imported {}", file);
        }
        "reset" => {
            let mut session = state.open_session(migrator)?;
            session.restart()?;
            println!("reset");
        }
        "export-csv" => {
            let file = args.next().ok_or("export-csv 需要文件路径")?;
            let session = state.open_session(migrator)?;
            let factors = state.emission_factors()?;
            let result = session.results(&factors);
            ReportSummary::build(&session.record().meta, &result)
                .write_breakdown_csv_file(Path::new(&file))?;
            println!("exported {}", file);
        }
        "validate" => {
            let session = state.open_session(migrator)?;
            let violations = InputValidator::new().validate_all(session.record());
            if violations.is_empty() {
                println!("ok");
            } else {
                for v in &violations {
                    println!("{} [{}] {}", v.field, v.code, v.message);
                }
            }
        }
        "factors" => {
            let factors = state.emission_factors()?;
            println!("{}", serde_json::to_string_pretty(&factors)?);
        }
        other => {
            return Err(format!(
                "未知命令: {} (可用: show | import <file> | reset | export-csv <file> | validate | factors)",
                other
            )
            .into());
        }
    }

    Ok(())
}

// ==========================================
// 报告摘要与 CSV 导出集成测试
// ==========================================

mod test_helpers;

use folkcharm_impact::config::EmissionFactors;
use folkcharm_impact::engine::compute;
use folkcharm_impact::i18n::set_locale;
use folkcharm_impact::report::{period_label, ReportSummary};
use folkcharm_impact::CalculationScope;
use test_helpers::{assert_close, sample_record};

#[test]
fn test_csv_export_to_file() {
    // 本文件内唯一设置 locale 的测试
    set_locale("zh-CN");

    let mut r = sample_record();
    r.meta.scope = CalculationScope::Monthly;
    r.meta.start_date = "2026-01".to_string();
    r.meta.end_date = "2026-03".to_string();

    let result = compute(&r, &EmissionFactors::default());
    let summary = ReportSummary::build(&r.meta, &result);
    assert_eq!(summary.title, "月度碳足迹报告");
    assert_eq!(summary.period_label, "2026-01 — 2026-03");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("breakdown.csv");
    summary.write_breakdown_csv_file(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

    // 5 个类别 + 合计
    assert_eq!(rows.len(), 6);
    assert_eq!(&rows[0][0], "原材料");
    assert_eq!(&rows[5][0], "合计");

    let share_sum: f64 = summary.rows.iter().map(|r| r.share_pct).sum();
    assert_close(share_sum, 100.0);
}

#[test]
fn test_single_day_period_label() {
    let r = sample_record();
    assert_eq!(period_label(&r.meta), "2026-03-15");
}

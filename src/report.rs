// ==========================================
// 供应链碳足迹计算器 - 报告摘要与导出
// ==========================================
// 职责: 结果页标题 / 期间文字 / 分类明细 CSV
// 红线: 只读 CalculationResult,不参与计算
// ==========================================

use crate::api::error::ApiResult;
use crate::domain::record::PeriodMeta;
use crate::domain::result::CalculationResult;
use crate::domain::types::{CalculationScope, EmissionCategory};
use crate::i18n::{category_label, t};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

// ==========================================
// BreakdownRow - 分类明细行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub category: EmissionCategory,
    pub label: String,
    pub emissions_kg: f64,
    pub share_pct: f64,
}

// ==========================================
// ReportSummary - 结果页摘要
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub title: String,
    pub period_label: String,
    pub scope: CalculationScope,
    pub rows: Vec<BreakdownRow>,
    pub total_emissions_kg: f64,
    pub emission_intensity_kg_per_kg: f64,
    pub material_savings_kg: f64,
}

impl ReportSummary {
    /// 由期间与结果构建摘要（文案使用当前 locale）
    pub fn build(meta: &PeriodMeta, result: &CalculationResult) -> Self {
        let rows = EmissionCategory::ALL
            .iter()
            .map(|c| BreakdownRow {
                category: *c,
                label: category_label(*c),
                emissions_kg: result.category(*c),
                share_pct: result.category_share_pct(*c),
            })
            .collect();

        Self {
            title: report_title(meta.scope),
            period_label: period_label(meta),
            scope: meta.scope,
            rows,
            total_emissions_kg: result.total_emissions_kg,
            emission_intensity_kg_per_kg: result.emission_intensity_kg_per_kg,
            material_savings_kg: result.material_savings_kg,
        }
    }

    /// 写出分类明细 CSV（类别, kg CO2e, 占比 %）,末行为合计
    pub fn write_breakdown_csv<W: Write>(&self, writer: W) -> ApiResult<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        wtr.write_record([t("report.csv_category"), t("report.csv_emissions"), t("report.csv_share")])?;
        for row in &self.rows {
            wtr.write_record([
                row.label.clone(),
                format!("{:.3}", row.emissions_kg),
                format!("{:.1}", row.share_pct),
            ])?;
        }

        let total_share = if self.total_emissions_kg > 0.0 { 100.0 } else { 0.0 };
        wtr.write_record([
            t("report.total"),
            format!("{:.3}", self.total_emissions_kg),
            format!("{:.1}", total_share),
        ])?;

        wtr.flush()?;
        Ok(())
    }

    /// 写出分类明细 CSV 到文件
    pub fn write_breakdown_csv_file(&self, path: &Path) -> ApiResult<()> {
        let file = std::fs::File::create(path)?;
        self.write_breakdown_csv(file)?;
        tracing::info!(path = %path.display(), "分类明细已导出");
        Ok(())
    }
}

/// 报告标题（批次 / 月度）
pub fn report_title(scope: CalculationScope) -> String {
    match scope {
        CalculationScope::Batch => t("report.title_batch"),
        CalculationScope::Monthly => t("report.title_monthly"),
    }
}

/// 期间文字: 起止相同显示单值,否则以破折号连接起止
pub fn period_label(meta: &PeriodMeta) -> String {
    if meta.start_date == meta.end_date {
        meta.start_date.clone()
    } else {
        format!("{} — {}", meta.start_date, meta.end_date)
    }
}

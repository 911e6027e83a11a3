//! 報表輸出：季節計劃表（CSV）、可行性報告、求解器參數與整體摘要（JSON）
//!
//! 四捨五入只在這裡進行。

use replen_core::{PlanLine, SeasonTotals};
use replen_optimizer::{CeilingViolation, FeasibilityResult};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::planner::{PlanningResult, SeasonPlan};

/// 計劃表的一列（已四捨五入）
#[derive(Debug, Serialize)]
struct PlanRow {
    ingredient: String,
    q: Decimal,
    t: Option<Decimal>,
    n_orders: u32,
    #[serde(rename = "D")]
    total_demand: Decimal,
    #[serde(rename = "S_max")]
    max_stock: Decimal,
    #[serde(rename = "CTE")]
    expected_total_cost: Decimal,
    volume_occupied: Decimal,
    value_immobilized: Decimal,
    reorder_point: Decimal,
}

impl PlanRow {
    fn from_line(line: &PlanLine, places: u32) -> Self {
        let round = |v: Decimal| v.round_dp(places).normalize();
        Self {
            ingredient: line.ingredient.clone(),
            q: round(line.lot_size),
            t: line.reorder_interval.map(round),
            n_orders: line.order_count,
            total_demand: round(line.total_demand),
            max_stock: round(line.max_stock),
            expected_total_cost: round(line.expected_total_cost),
            volume_occupied: round(line.volume_occupied),
            value_immobilized: round(line.value_immobilized),
            reorder_point: round(line.reorder_point),
        }
    }
}

/// 寫出季節計劃表
pub fn write_plan_table<W: io::Write>(
    writer: W,
    plan: &SeasonPlan,
    places: u32,
) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    for line in &plan.lines {
        wtr.serialize(PlanRow::from_line(line, places))?;
    }
    wtr.flush()?;
    Ok(())
}

/// 將季節計劃表渲染為字串
pub fn render_plan_table(plan: &SeasonPlan, places: u32) -> Result<String, csv::Error> {
    let mut buffer = Vec::new();
    write_plan_table(&mut buffer, plan, places)?;
    String::from_utf8(buffer).map_err(|e| {
        csv::Error::from(io::Error::new(io::ErrorKind::InvalidData, e))
    })
}

/// 渲染季節可行性報告
pub fn render_feasibility_report(plan: &SeasonPlan, places: u32) -> String {
    FeasibilityReport { plan, places }.to_string()
}

struct FeasibilityReport<'a> {
    plan: &'a SeasonPlan,
    places: u32,
}

impl fmt::Display for FeasibilityReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let round = |v: Decimal| v.round_dp(self.places).normalize();
        let plan = self.plan;
        let totals = &plan.totals;

        let verdict = match (&plan.feasibility, plan.aggregate_checked) {
            (FeasibilityResult::Feasible, true) => "Feasible",
            (FeasibilityResult::Feasible, false) => "Feasible (aggregate check disabled by policy)",
            (FeasibilityResult::Infeasible { .. }, _) => "Infeasible",
        };

        writeln!(f, "season: {}", plan.season)?;
        writeln!(f, "duration_weeks: {}", plan.duration_weeks)?;
        writeln!(f, "verdict: {}", verdict)?;
        writeln!(f, "volume_refrigerated: {}", round(totals.refrigerated_volume))?;
        writeln!(f, "volume_non_refrigerated: {}", round(totals.non_refrigerated_volume))?;
        writeln!(f, "value_immobilized: {}", round(totals.value_immobilized))?;
        writeln!(f, "expected_total_cost: {}", round(totals.expected_total_cost))?;

        for violation in plan.feasibility.violations() {
            writeln!(
                f,
                "exceeded {}: actual {} > limit {} (excess {})",
                violation.ceiling.label(),
                round(violation.actual),
                round(violation.limit),
                round(violation.excess())
            )?;
        }

        for warning in &plan.warnings {
            writeln!(
                f,
                "{:?}: {} - {}",
                warning.severity, warning.ingredient, warning.message
            )?;
        }

        Ok(())
    }
}

/// 單季摘要
#[derive(Debug, Serialize)]
pub struct SeasonSummary<'a> {
    pub season: &'a str,
    pub feasible: bool,
    pub aggregate_checked: bool,
    pub totals: &'a SeasonTotals,
    pub violations: &'a [CeilingViolation],
}

/// 整體摘要
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub seasons: Vec<SeasonSummary<'a>>,
    pub errors: Vec<String>,
}

impl<'a> RunSummary<'a> {
    pub fn from_result(result: &'a PlanningResult) -> Self {
        Self {
            seasons: result
                .plans
                .iter()
                .map(|plan| SeasonSummary {
                    season: &plan.season,
                    feasible: plan.is_feasible(),
                    aggregate_checked: plan.aggregate_checked,
                    totals: &plan.totals,
                    violations: plan.feasibility.violations(),
                })
                .collect(),
            errors: result.errors.iter().map(|e| e.to_string()).collect(),
        }
    }
}

/// 檔名用的季節代號
fn file_stem(season: &str) -> String {
    season
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

/// 將整次規劃結果寫入輸出目錄，回傳寫出的檔案
pub fn write_outputs(
    dir: &Path,
    result: &PlanningResult,
    places: u32,
) -> Result<Vec<PathBuf>, crate::input::InputError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    for plan in &result.plans {
        let stem = file_stem(&plan.season);

        let plan_path = dir.join(format!("plan_{}.csv", stem));
        write_plan_table(std::fs::File::create(&plan_path)?, plan, places)?;
        written.push(plan_path);

        let report_path = dir.join(format!("feasibility_{}.txt", stem));
        std::fs::write(&report_path, render_feasibility_report(plan, places))?;
        written.push(report_path);

        if let Some(export) = &plan.solver_export {
            let export_path = dir.join(format!("solver_{}.txt", stem));
            std::fs::write(&export_path, export)?;
            written.push(export_path);
        }
    }

    let summary_path = dir.join("summary.json");
    let summary = serde_json::to_string_pretty(&RunSummary::from_result(result))
        .map_err(io::Error::from)?;
    std::fs::write(&summary_path, summary)?;
    written.push(summary_path);

    tracing::debug!("寫出 {} 個檔案到 {}", written.len(), dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::SeasonalPlanner;
    use replen_core::{CapacityCeilings, Ingredient, IngredientCatalog, PlannerConfig, Season};
    use rstest::rstest;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn planner(max_non_refrigerated: &str) -> SeasonalPlanner {
        let catalog = IngredientCatalog::new(vec![
            Ingredient::new("Harina de Trigo", d("1600"), d("685.12"), d("120"), d("0.0018"), false)
                .unwrap(),
            Ingredient::new("Sal", d("1600"), d("685.12"), d("3"), d("0.00075"), false).unwrap(),
        ])
        .unwrap();
        let config = PlannerConfig::new(
            CapacityCeilings::new(d("30000"), d(max_non_refrigerated), d("2.5"), d("3000000"))
                .unwrap(),
        );
        SeasonalPlanner::new(catalog, config).unwrap()
    }

    fn season() -> Season {
        Season::new("1", 14)
            .unwrap()
            .with_demand("Harina de Trigo", d("179.656"))
            .unwrap()
    }

    #[test]
    fn test_plan_table_rounds_at_presentation() {
        let plan = planner("25").plan_season(&season()).unwrap();
        let table = render_plan_table(&plan, 2).unwrap();
        let rows: Vec<&str> = table.lines().collect();

        assert_eq!(
            rows[0],
            "ingredient,q,t,n_orders,D,S_max,CTE,volume_occupied,value_immobilized,reorder_point"
        );
        assert!(rows[1].starts_with("Harina de Trigo,469.33,2.61,6,2515.18,589.33,"));
        // 無需求：t 留空
        assert!(rows[2].starts_with("Sal,0,,0,0,3,"));

        // 明細本身保持完整精度
        assert!(plan.lines[0].lot_size.scale() > 2);
    }

    #[test]
    fn test_feasibility_report_names_violation() {
        let plan = planner("1").plan_season(&season()).unwrap();
        let report = render_feasibility_report(&plan, 2);

        assert!(report.contains("verdict: Infeasible"));
        assert!(report.contains("exceeded max_volume_non_refrigerated: actual 1.06 > limit 1"));
    }

    #[test]
    fn test_write_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let planner = planner("1");
        let result = planner.plan(&[season()]);

        let written = write_outputs(dir.path(), &result, 2).unwrap();

        assert_eq!(written.len(), 4);
        assert!(dir.path().join("plan_1.csv").exists());
        assert!(dir.path().join("solver_1.txt").exists());
        let summary = std::fs::read_to_string(dir.path().join("summary.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&summary).unwrap();
        assert_eq!(value["seasons"][0]["feasible"], serde_json::Value::Bool(false));
    }

    #[rstest]
    #[case("1", "1")]
    #[case("verano-2025", "verano-2025")]
    #[case("2024 Q1/a", "2024_Q1_a")]
    fn test_file_stem(#[case] season: &str, #[case] expected: &str) {
        assert_eq!(file_stem(season), expected);
    }
}

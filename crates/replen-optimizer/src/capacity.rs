//! 季節容量檢查

use replen_core::config::FEASIBILITY_TOLERANCE;
use replen_core::{overflow, CapacityCeilings, IngredientCatalog, PlanLine, SeasonTotals};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 季節容量上限種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ceiling {
    /// 非冷藏體積
    NonRefrigeratedVolume,
    /// 冷藏體積
    RefrigeratedVolume,
    /// 資金佔用總額
    TotalBudget,
}

impl Ceiling {
    /// 報表用順序
    pub const ALL: [Ceiling; 3] = [
        Ceiling::NonRefrigeratedVolume,
        Ceiling::RefrigeratedVolume,
        Ceiling::TotalBudget,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Ceiling::NonRefrigeratedVolume => "max_volume_non_refrigerated",
            Ceiling::RefrigeratedVolume => "max_volume_refrigerated",
            Ceiling::TotalBudget => "max_total_budget",
        }
    }

    /// 求解器參數名稱
    pub fn symbol(self) -> &'static str {
        match self {
            Ceiling::NonRefrigeratedVolume => "VMAXNR",
            Ceiling::RefrigeratedVolume => "VMAXR",
            Ceiling::TotalBudget => "PMAX",
        }
    }

    pub fn limit(self, ceilings: &CapacityCeilings) -> Decimal {
        match self {
            Ceiling::NonRefrigeratedVolume => ceilings.max_volume_non_refrigerated,
            Ceiling::RefrigeratedVolume => ceilings.max_volume_refrigerated,
            Ceiling::TotalBudget => ceilings.max_total_budget,
        }
    }

    fn actual(self, totals: &SeasonTotals) -> Decimal {
        match self {
            Ceiling::NonRefrigeratedVolume => totals.non_refrigerated_volume,
            Ceiling::RefrigeratedVolume => totals.refrigerated_volume,
            Ceiling::TotalBudget => totals.value_immobilized,
        }
    }
}

/// 超出的上限
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CeilingViolation {
    pub ceiling: Ceiling,
    pub limit: Decimal,
    pub actual: Decimal,
}

impl CeilingViolation {
    /// 超出量
    pub fn excess(&self) -> Decimal {
        self.actual - self.limit
    }
}

/// 外部求解器需要的單一原料參數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientSnapshot {
    pub name: String,
    /// 首字母（用於求解器參數名稱）
    pub initial: char,
    pub total_demand: Decimal,
    pub holding_cost: Decimal,
    pub safety_stock: Decimal,
    pub unit_volume: Decimal,
    pub unit_cost: Decimal,
    pub refrigerated: bool,
    /// 目前（不可行的）批量
    pub lot_size: Decimal,
}

/// 容量檢查結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeasibilityResult {
    Feasible,
    Infeasible {
        violations: Vec<CeilingViolation>,
        snapshot: Vec<IngredientSnapshot>,
    },
}

impl FeasibilityResult {
    pub fn is_feasible(&self) -> bool {
        matches!(self, FeasibilityResult::Feasible)
    }

    pub fn violations(&self) -> &[CeilingViolation] {
        match self {
            FeasibilityResult::Feasible => &[],
            FeasibilityResult::Infeasible { violations, .. } => violations,
        }
    }
}

/// 季節容量檢查器
///
/// 單次掃描已計算好的計劃明細，不做任何調整。
pub struct CapacityChecker;

impl CapacityChecker {
    /// 檢查季節總量是否超出上限
    ///
    /// 冷藏分區依原料表中的冷藏標記判定。
    pub fn check_season(
        season_id: &str,
        lines: &[PlanLine],
        catalog: &IngredientCatalog,
        ceilings: &CapacityCeilings,
    ) -> replen_core::Result<FeasibilityResult> {
        let mut totals = SeasonTotals::empty(season_id);
        let mut snapshot = Vec::with_capacity(lines.len());

        for line in lines {
            let ingredient = catalog.require(season_id, &line.ingredient)?;
            let partition = if ingredient.is_refrigerated() {
                &mut totals.refrigerated_volume
            } else {
                &mut totals.non_refrigerated_volume
            };
            *partition = partition
                .checked_add(line.volume_occupied)
                .ok_or_else(|| overflow(format!("季節 {} 的體積合計", season_id)))?;
            totals.value_immobilized = totals
                .value_immobilized
                .checked_add(line.value_immobilized)
                .ok_or_else(|| overflow(format!("季節 {} 的資金佔用合計", season_id)))?;

            snapshot.push(IngredientSnapshot {
                name: ingredient.name().to_string(),
                initial: ingredient.initial(),
                total_demand: line.total_demand,
                holding_cost: ingredient.holding_cost(),
                safety_stock: ingredient.safety_stock(),
                unit_volume: ingredient.unit_volume(),
                unit_cost: ingredient.unit_cost(),
                refrigerated: ingredient.is_refrigerated(),
                lot_size: line.lot_size,
            });
        }

        let violations: Vec<CeilingViolation> = Ceiling::ALL
            .iter()
            .filter_map(|&ceiling| {
                let limit = ceiling.limit(ceilings);
                let actual = ceiling.actual(&totals);
                (actual - limit > FEASIBILITY_TOLERANCE).then_some(CeilingViolation {
                    ceiling,
                    limit,
                    actual,
                })
            })
            .collect();

        if violations.is_empty() {
            Ok(FeasibilityResult::Feasible)
        } else {
            tracing::debug!(
                "季節 {} 超出上限: {:?}",
                season_id,
                violations.iter().map(|v| v.ceiling.label()).collect::<Vec<_>>()
            );
            Ok(FeasibilityResult::Infeasible {
                violations,
                snapshot,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::SolverExporter;
    use replen_core::Ingredient;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn line(ingredient: &str, refrigerated: bool, volume: &str, value: &str) -> PlanLine {
        PlanLine {
            ingredient: ingredient.to_string(),
            season: "1".to_string(),
            refrigerated,
            lot_size: d("10"),
            reorder_interval: Some(d("1")),
            order_count: 1,
            total_demand: d("100"),
            max_stock: d("10"),
            expected_total_cost: d("0"),
            volume_occupied: d(volume),
            value_immobilized: d(value),
            reorder_point: d("0"),
            refined: false,
        }
    }

    fn catalog() -> IngredientCatalog {
        IngredientCatalog::new(vec![
            Ingredient::new("Manteca", d("13000"), d("5566.6"), d("12"), d("0.0015"), true).unwrap(),
            Ingredient::new("Crema", d("9000"), d("3000"), d("5"), d("0.001"), true).unwrap(),
            Ingredient::new("Levadura", d("5000"), d("2000"), d("2"), d("0.002"), true).unwrap(),
            Ingredient::new("Harina", d("1600"), d("685.12"), d("120"), d("0.0018"), false).unwrap(),
        ])
        .unwrap()
    }

    fn ceilings() -> CapacityCeilings {
        CapacityCeilings::new(d("30000"), d("25"), d("2.5"), d("3000000")).unwrap()
    }

    #[test]
    fn test_feasible_season() {
        let lines = vec![
            line("Manteca", true, "1", "100000"),
            line("Harina", false, "10", "900000"),
        ];

        let result = CapacityChecker::check_season("1", &lines, &catalog(), &ceilings()).unwrap();
        assert!(result.is_feasible());
        assert!(result.violations().is_empty());
    }

    #[test]
    fn test_refrigerated_ceiling_exceeded() {
        // 三種冷藏原料合計 2.6 > 2.5
        let lines = vec![
            line("Manteca", true, "1.2", "100000"),
            line("Crema", true, "0.9", "100000"),
            line("Levadura", true, "0.5", "100000"),
            line("Harina", false, "3", "100000"),
        ];

        let result = CapacityChecker::check_season("1", &lines, &catalog(), &ceilings()).unwrap();

        let violations = result.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].ceiling, Ceiling::RefrigeratedVolume);
        assert_eq!(violations[0].actual, d("2.6"));
        assert_eq!(violations[0].excess(), d("0.1"));

        match result {
            FeasibilityResult::Infeasible { snapshot, .. } => {
                assert_eq!(snapshot.len(), 4);
                assert_eq!(snapshot[0].initial, 'M');
                assert_eq!(snapshot[3].holding_cost, d("685.12"));
            }
            FeasibilityResult::Feasible => panic!("expected infeasible"),
        }
    }

    #[test]
    fn test_refrigerated_overrun_exports_all_items() {
        // 三種冷藏原料合計 2.501，略高於 2.5
        let mut lines = vec![
            line("Manteca", true, "1.2", "100000"),
            line("Crema", true, "0.9", "100000"),
            line("Levadura", true, "0.401", "100000"),
        ];
        lines[0].total_demand = d("278.69");
        lines[1].total_demand = d("140.5");
        lines[2].total_demand = d("63.25");

        let ceilings = ceilings();
        let result = CapacityChecker::check_season("3", &lines, &catalog(), &ceilings).unwrap();

        let violations = result.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].ceiling, Ceiling::RefrigeratedVolume);
        assert_eq!(violations[0].excess(), d("0.001"));

        let snapshot = match &result {
            FeasibilityResult::Infeasible { snapshot, .. } => snapshot,
            FeasibilityResult::Feasible => panic!("expected infeasible"),
        };
        let text = SolverExporter::export_infeasible("3", snapshot, &ceilings);

        assert!(text.starts_with("! season 3:"));
        for expected in [
            "DM = 278.69;", "C1M = 5566.6;", "SPM = 12;", "VM = 0.0015;", "BM = 13000;",
            "DC = 140.5;", "C1C = 3000;", "SPC = 5;", "VC = 0.001;", "BC = 9000;",
            "DL = 63.25;", "C1L = 2000;", "SPL = 2;", "VL = 0.002;", "BL = 5000;",
            "VMAXR = 2.5;",
        ] {
            assert!(text.contains(expected), "missing {} in\n{}", expected, text);
        }
    }

    #[test]
    fn test_volume_overflow_is_error() {
        let mut lines = vec![
            line("Manteca", true, "1", "1"),
            line("Crema", true, "1", "1"),
        ];
        lines[0].volume_occupied = Decimal::MAX;
        lines[1].volume_occupied = Decimal::MAX;

        let result = CapacityChecker::check_season("1", &lines, &catalog(), &ceilings());
        assert!(matches!(result, Err(replen_core::PlanningError::Calculation(_))));
    }

    #[test]
    fn test_partition_uses_catalog_flag() {
        // 明細上的標記與原料表不一致時，以原料表為準
        let lines = vec![line("Harina", true, "2.6", "100")];

        let result = CapacityChecker::check_season("1", &lines, &catalog(), &ceilings()).unwrap();
        assert!(result.is_feasible());
    }

    #[test]
    fn test_value_exactly_at_ceiling_is_feasible() {
        let lines = vec![line("Harina", false, "1", "3000000")];

        let result = CapacityChecker::check_season("1", &lines, &catalog(), &ceilings()).unwrap();
        assert!(result.is_feasible());
    }

    #[test]
    fn test_unknown_line_is_data_gap() {
        let lines = vec![line("Chocolate", false, "1", "1")];
        assert!(CapacityChecker::check_season("1", &lines, &catalog(), &ceilings()).is_err());
    }
}

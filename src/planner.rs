//! 季節補貨規劃器
//!
//! 每個季節走一次狀態機：計算明細 → 檢查總量 → 可行則結束，不可行則匯出參數後結束。
//! 不可行的季節不重試，也不做近似修正。

use rayon::prelude::*;
use replen_calc::{PlanWarning, SeasonCalculator};
use replen_core::{
    IngredientCatalog, PlanLine, PlannerConfig, PlanningError, Result, Season, SeasonTotals,
};
use replen_optimizer::{CapacityChecker, FeasibilityResult, SolverExporter};

/// 單一季節的規劃結果
#[derive(Debug, Clone)]
pub struct SeasonPlan {
    pub season: String,
    pub duration_weeks: u32,
    pub lines: Vec<PlanLine>,
    pub totals: SeasonTotals,
    pub feasibility: FeasibilityResult,

    /// 是否執行了季節總量檢查（單品策略下不檢查）
    pub aggregate_checked: bool,

    /// 不可行時的求解器參數清單
    pub solver_export: Option<String>,

    pub warnings: Vec<PlanWarning>,
}

impl SeasonPlan {
    pub fn is_feasible(&self) -> bool {
        self.feasibility.is_feasible()
    }
}

/// 整次規劃結果
#[derive(Debug, Clone, Default)]
pub struct PlanningResult {
    /// 完成計算的季節（順序同輸入）
    pub plans: Vec<SeasonPlan>,

    /// 因輸入錯誤而中止的季節
    pub errors: Vec<PlanningError>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl PlanningResult {
    pub fn infeasible_seasons(&self) -> impl Iterator<Item = &SeasonPlan> {
        self.plans.iter().filter(|p| !p.is_feasible())
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// 季節補貨規劃器
pub struct SeasonalPlanner {
    catalog: IngredientCatalog,
    config: PlannerConfig,
}

impl SeasonalPlanner {
    /// 創建規劃器，配置不合法時報錯
    pub fn new(catalog: IngredientCatalog, config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { catalog, config })
    }

    pub fn catalog(&self) -> &IngredientCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// 規劃所有季節
    ///
    /// 季節之間互相獨立，以 rayon 並行計算；結果順序同輸入。
    pub fn plan(&self, seasons: &[Season]) -> PlanningResult {
        tracing::info!(
            "開始補貨規劃：季節 {} 個，原料 {} 種，策略 {:?}",
            seasons.len(),
            self.catalog.len(),
            self.config.policy()
        );

        let start_time = std::time::Instant::now();

        let outcomes: Vec<Result<SeasonPlan>> = seasons
            .par_iter()
            .map(|season| self.plan_season(season))
            .collect();

        let mut result = PlanningResult::default();
        for outcome in outcomes {
            match outcome {
                Ok(plan) => result.plans.push(plan),
                Err(err) => {
                    tracing::error!("季節規劃失敗: {}", err);
                    result.errors.push(err);
                }
            }
        }
        result.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!(
            "補貨規劃完成，耗時 {:?}：完成 {} 個季節，不可行 {} 個，錯誤 {} 個",
            start_time.elapsed(),
            result.plans.len(),
            result.infeasible_seasons().count(),
            result.errors.len()
        );

        result
    }

    /// 規劃單一季節
    pub fn plan_season(&self, season: &Season) -> Result<SeasonPlan> {
        // 計算明細
        let calc = SeasonCalculator::new(&self.catalog, &self.config).calculate(season)?;

        // 檢查季節總量
        let aggregate_checked = self.config.policy().checks_aggregate();
        let feasibility = if aggregate_checked {
            CapacityChecker::check_season(
                season.id(),
                &calc.lines,
                &self.catalog,
                &self.config.ceilings,
            )?
        } else {
            FeasibilityResult::Feasible
        };

        // 不可行時匯出參數
        let solver_export = match &feasibility {
            FeasibilityResult::Feasible => None,
            FeasibilityResult::Infeasible {
                violations,
                snapshot,
            } => {
                for violation in violations {
                    tracing::info!(
                        "季節 {} 超出 {}：{} > {}（超出 {}）",
                        season.id(),
                        violation.ceiling.label(),
                        violation.actual.normalize(),
                        violation.limit.normalize(),
                        violation.excess().normalize()
                    );
                }
                Some(SolverExporter::export_infeasible(
                    season.id(),
                    snapshot,
                    &self.config.ceilings,
                ))
            }
        };

        Ok(SeasonPlan {
            season: calc.season,
            duration_weeks: season.duration_weeks(),
            lines: calc.lines,
            totals: calc.totals,
            feasibility,
            aggregate_checked,
            solver_export,
            warnings: calc.warnings,
        })
    }
}

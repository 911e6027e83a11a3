//! # Seasonal Replenishment Planner
//!
//! 烘焙原料的季節性補貨規劃：EOQ 批量、單品 / 季節容量檢查、不可行時匯出求解器參數。

pub mod input;
pub mod logging;
pub mod planner;
pub mod report;

// Re-export 主要類型
pub use planner::{PlanningResult, SeasonPlan, SeasonalPlanner};
pub use replen_calc::{PlanWarning, WarningSeverity};
pub use replen_core::{
    CapacityCeilings, CapacityPolicy, Ingredient, IngredientCatalog, PlanLine, PlannerConfig,
    PlanningError, Season, SeasonTotals,
};
pub use replen_optimizer::{Ceiling, CeilingViolation, FeasibilityResult};

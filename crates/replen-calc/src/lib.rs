//! # Replenishment Calculation Engine
//!
//! 季節性補貨的數值核心：EOQ 批量、單品容量調整、計劃指標

pub mod calculator;
pub mod lot_sizing;
pub mod metrics;
pub mod refinement;

// Re-export 主要類型
pub use calculator::SeasonCalculator;
pub use lot_sizing::LotSizingCalculator;
pub use metrics::MetricsBuilder;
pub use refinement::{ItemLimits, ItemRefiner, Refinement};

use replen_core::{PlanLine, SeasonTotals};
use serde::{Deserialize, Serialize};

/// 單一季節計算結果
#[derive(Debug, Clone)]
pub struct SeasonCalcResult {
    /// 季節代號
    pub season: String,

    /// 計劃明細（順序同原料表）
    pub lines: Vec<PlanLine>,

    /// 季節彙總
    pub totals: SeasonTotals,

    /// 警告信息
    pub warnings: Vec<PlanWarning>,
}

impl SeasonCalcResult {
    /// 創建空的計算結果
    pub fn empty(season: impl Into<String>) -> Self {
        let season = season.into();
        Self {
            totals: SeasonTotals::empty(season.clone()),
            season,
            lines: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: PlanWarning) {
        self.warnings.push(warning);
    }
}

/// 規劃警告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanWarning {
    pub season: String,
    pub ingredient: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl PlanWarning {
    pub fn new(
        season: impl Into<String>,
        ingredient: impl Into<String>,
        message: String,
        severity: WarningSeverity,
    ) -> Self {
        Self {
            season: season.into(),
            ingredient: ingredient.into(),
            message,
            severity,
        }
    }

    pub fn info(season: impl Into<String>, ingredient: impl Into<String>, message: String) -> Self {
        Self::new(season, ingredient, message, WarningSeverity::Info)
    }

    pub fn warning(
        season: impl Into<String>,
        ingredient: impl Into<String>,
        message: String,
    ) -> Self {
        Self::new(season, ingredient, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningSeverity {
    Info,
    Warning,
}

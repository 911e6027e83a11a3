//! # Replenishment Core
//!
//! 季節性補貨規劃的核心資料模型與錯誤類型

pub mod config;
pub mod ingredient;
pub mod plan;
pub mod season;

// Re-export 主要類型
pub use config::{CapacityCeilings, CapacityPolicy, PlannerConfig, PlannerSettings};
pub use ingredient::{Ingredient, IngredientCatalog, IngredientRecord, ItemCaps};
pub use plan::{PlanLine, SeasonTotals};
pub use season::Season;

use rust_decimal::Decimal;

/// 規劃錯誤類型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanningError {
    /// 參數非正、鍵值重複、或單品調整後批量不為正
    #[error("配置錯誤 [{}]: {reason}", scope_label(.season.as_deref(), .subject))]
    Configuration {
        season: Option<String>,
        subject: String,
        reason: String,
    },

    /// 季節需求引用了原料表中不存在的原料
    #[error("資料缺口: 季節 {season} 引用不存在的原料 {ingredient}")]
    DataGap { season: String, ingredient: String },

    #[error("計算錯誤: {0}")]
    Calculation(String),
}

impl PlanningError {
    /// 建立配置錯誤
    pub fn config(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            season: None,
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    /// 補上季節上下文（已有季節時保留原值）
    pub fn in_season(self, season_id: &str) -> Self {
        match self {
            Self::Configuration {
                season: None,
                subject,
                reason,
            } => Self::Configuration {
                season: Some(season_id.to_string()),
                subject,
                reason,
            },
            other => other,
        }
    }

    /// 錯誤所屬季節
    pub fn season(&self) -> Option<&str> {
        match self {
            Self::Configuration { season, .. } => season.as_deref(),
            Self::DataGap { season, .. } => Some(season),
            Self::Calculation(_) => None,
        }
    }
}

fn scope_label(season: Option<&str>, subject: &str) -> String {
    match season {
        Some(season) => format!("季節 {} / {}", season, subject),
        None => subject.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, PlanningError>;

/// 檢查數值嚴格為正
pub fn ensure_positive(subject: &str, field: &str, value: Decimal) -> Result<Decimal> {
    if value > Decimal::ZERO {
        Ok(value)
    } else {
        Err(PlanningError::config(
            subject,
            format!("{} 必須大於 0，實際為 {}", field, value),
        ))
    }
}

/// 數值溢位錯誤
pub fn overflow(context: impl std::fmt::Display) -> PlanningError {
    PlanningError::Calculation(format!("數值溢位: {}", context))
}

/// 檢查數值非負
pub fn ensure_non_negative(subject: &str, field: &str, value: Decimal) -> Result<Decimal> {
    if value >= Decimal::ZERO {
        Ok(value)
    } else {
        Err(PlanningError::config(
            subject,
            format!("{} 不可為負，實際為 {}", field, value),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_scope_includes_season() {
        let err = PlanningError::config("Harina", "refinement failed").in_season("1");
        assert_eq!(err.season(), Some("1"));
        assert_eq!(err.to_string(), "配置錯誤 [季節 1 / Harina]: refinement failed");

        // 已有季節時不覆蓋
        let err = err.in_season("2");
        assert_eq!(err.season(), Some("1"));
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive("Sal", "b", Decimal::ONE).is_ok());
        let err = ensure_positive("Sal", "b", Decimal::ZERO).unwrap_err();
        assert!(err.to_string().contains("b 必須大於 0"));
        assert!(ensure_non_negative("Sal", "Sp", Decimal::ZERO).is_ok());
        assert!(ensure_non_negative("Sal", "Sp", Decimal::NEGATIVE_ONE).is_err());
    }

    #[test]
    fn test_overflow_is_calculation_error() {
        let err = overflow("Harina S·b");
        assert!(matches!(err, PlanningError::Calculation(_)));
        assert_eq!(err.season(), None);
        assert!(err.to_string().contains("Harina S·b"));
    }
}

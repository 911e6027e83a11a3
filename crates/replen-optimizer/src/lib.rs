//! # Replenishment Optimizer
//!
//! 季節容量約束：總量檢查與外部求解器參數匯出
//!
//! 本模組不求解多品項約束問題，只判定可行性並準備求解器所需的參數。

pub mod capacity;
pub mod constraint;

// Re-export 主要類型
pub use capacity::{CapacityChecker, Ceiling, CeilingViolation, FeasibilityResult, IngredientSnapshot};
pub use constraint::SolverExporter;

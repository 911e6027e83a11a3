//! 單品容量調整
//!
//! 從無約束批量出發，反覆檢查最大庫存 `S = q + Sp` 的體積 `S·v` 與資金 `S·b`，
//! 超出上限時把 `q` 設為恰好滿足該上限的值，直到兩者同時成立。

use replen_core::config::FEASIBILITY_TOLERANCE;
use replen_core::{overflow, Ingredient, PlanningError, Result};
use rust_decimal::Decimal;

/// 單品調整結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Refinement {
    /// 調整後批量
    pub lot_size: Decimal,

    /// 是否縮小過批量
    pub adjusted: bool,

    /// 實際迭代次數
    pub iterations: u32,
}

/// 單品上限參數
#[derive(Debug, Clone, Copy)]
pub struct ItemLimits {
    pub safety_stock: Decimal,
    pub unit_volume: Decimal,
    pub max_volume: Option<Decimal>,
    pub unit_cost: Decimal,
    pub max_budget: Option<Decimal>,
}

impl From<&Ingredient> for ItemLimits {
    fn from(ingredient: &Ingredient) -> Self {
        let caps = ingredient.caps();
        Self {
            safety_stock: ingredient.safety_stock(),
            unit_volume: ingredient.unit_volume(),
            max_volume: caps.max_volume,
            unit_cost: ingredient.unit_cost(),
            max_budget: caps.max_budget,
        }
    }
}

/// 單品調整器（有界不動點迭代）
#[derive(Debug, Clone, Copy)]
pub struct ItemRefiner {
    max_iterations: u32,
}

impl ItemRefiner {
    pub fn new(max_iterations: u32) -> Self {
        Self { max_iterations }
    }

    /// 針對原料的單品上限調整批量
    pub fn refine_ingredient(&self, ingredient: &Ingredient, initial: Decimal) -> Result<Refinement> {
        self.refine(ingredient.name(), initial, ItemLimits::from(ingredient))
    }

    /// 調整批量直到體積與資金上限同時滿足
    pub fn refine(&self, subject: &str, initial: Decimal, limits: ItemLimits) -> Result<Refinement> {
        let mut lot_size = initial;
        let mut adjusted = false;

        for iteration in 1..=self.max_iterations {
            let mut corrected = false;

            if let Some(max_volume) = limits.max_volume {
                let volume = occupied(subject, lot_size, limits.safety_stock, limits.unit_volume)?;
                if volume - max_volume > FEASIBILITY_TOLERANCE {
                    lot_size = lot_for_cap(subject, max_volume, limits.unit_volume, limits.safety_stock)?;
                    corrected = true;
                }
            }

            if let Some(max_budget) = limits.max_budget {
                let value = occupied(subject, lot_size, limits.safety_stock, limits.unit_cost)?;
                if value - max_budget > FEASIBILITY_TOLERANCE {
                    lot_size = lot_for_cap(subject, max_budget, limits.unit_cost, limits.safety_stock)?;
                    corrected = true;
                }
            }

            if lot_size <= Decimal::ZERO {
                return Err(PlanningError::config(
                    subject,
                    format!(
                        "單品上限小於保護庫存所需（Sp = {}），調整後批量 q = {}",
                        limits.safety_stock, lot_size
                    ),
                ));
            }

            if !corrected {
                return Ok(Refinement {
                    lot_size,
                    adjusted,
                    iterations: iteration,
                });
            }
            adjusted = true;
        }

        Err(PlanningError::config(
            subject,
            format!("單品調整未在 {} 次迭代內收斂", self.max_iterations),
        ))
    }

    /// 本季不下單時只持有保護庫存，Sp 本身也必須在單品上限內
    pub fn check_safety_stock(subject: &str, limits: ItemLimits) -> Result<()> {
        let exceeded = |field: &str, held: Decimal, cap: Decimal| {
            PlanningError::config(
                subject,
                format!(
                    "單品上限小於保護庫存所需（Sp = {}），{} = {} > {}",
                    limits.safety_stock, field, held, cap
                ),
            )
        };

        if let Some(max_volume) = limits.max_volume {
            let volume = occupied(subject, Decimal::ZERO, limits.safety_stock, limits.unit_volume)?;
            if volume - max_volume > FEASIBILITY_TOLERANCE {
                return Err(exceeded("Sp·v", volume, max_volume));
            }
        }

        if let Some(max_budget) = limits.max_budget {
            let value = occupied(subject, Decimal::ZERO, limits.safety_stock, limits.unit_cost)?;
            if value - max_budget > FEASIBILITY_TOLERANCE {
                return Err(exceeded("Sp·b", value, max_budget));
            }
        }

        Ok(())
    }
}

/// (q + Sp) · 單位量
fn occupied(
    subject: &str,
    lot_size: Decimal,
    safety_stock: Decimal,
    per_unit: Decimal,
) -> Result<Decimal> {
    lot_size
        .checked_add(safety_stock)
        .and_then(|stock| stock.checked_mul(per_unit))
        .ok_or_else(|| overflow(format!("{} 最大庫存佔用", subject)))
}

/// 恰好滿足上限的批量：cap / 單位量 - Sp
fn lot_for_cap(
    subject: &str,
    cap: Decimal,
    per_unit: Decimal,
    safety_stock: Decimal,
) -> Result<Decimal> {
    cap.checked_div(per_unit)
        .and_then(|stock| stock.checked_sub(safety_stock))
        .ok_or_else(|| overflow(format!("{} 單品上限批量", subject)))
}

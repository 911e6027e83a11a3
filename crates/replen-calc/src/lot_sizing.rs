//! 經濟訂購量（EOQ）批量計算

use replen_core::{ensure_positive, PlanningError, Result};
use rust_decimal::{Decimal, MathematicalOps};

/// 批量計算器
pub struct LotSizingCalculator;

impl LotSizingCalculator {
    /// 經濟訂購量
    /// EOQ = sqrt(2 * 需求量 * 訂購成本 / 持有成本)
    ///
    /// 需求量為 0 的原料不應呼叫此函數（本季不下單）。
    pub fn base_lot_size(
        demand: Decimal,
        order_cost: Decimal,
        holding_cost: Decimal,
    ) -> Result<Decimal> {
        ensure_positive("EOQ", "demand (d)", demand)?;
        ensure_positive("EOQ", "order_cost (k)", order_cost)?;
        ensure_positive("EOQ", "holding_cost (c1)", holding_cost)?;

        let radicand = Decimal::TWO
            .checked_mul(demand)
            .and_then(|v| v.checked_mul(order_cost))
            .and_then(|v| v.checked_div(holding_cost))
            .ok_or_else(|| {
                PlanningError::Calculation(format!(
                    "EOQ 溢位: d = {}, k = {}, c1 = {}",
                    demand, order_cost, holding_cost
                ))
            })?;

        radicand.sqrt().ok_or_else(|| {
            PlanningError::Calculation(format!("無法計算平方根: {}", radicand))
        })
    }
}

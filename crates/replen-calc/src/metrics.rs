//! 季節 / 原料指標計算

use replen_core::{overflow, Ingredient, PlanLine, PlannerConfig, PlanningError, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::lot_sizing::LotSizingCalculator;
use crate::refinement::{ItemLimits, ItemRefiner};

/// 計劃明細建構器
///
/// 所有數值保持完整精度，四捨五入只在報表呈現時進行。
pub struct MetricsBuilder<'a> {
    config: &'a PlannerConfig,
    refiner: ItemRefiner,
}

impl<'a> MetricsBuilder<'a> {
    pub fn new(config: &'a PlannerConfig) -> Self {
        Self {
            config,
            refiner: ItemRefiner::new(config.planner.max_refine_iterations),
        }
    }

    /// 計算一筆計劃明細
    ///
    /// 順序：D → q（EOQ，必要時單品調整）→ t → n → S → CTE → 體積 → 資金 → SR。
    pub fn build_plan_line(
        &self,
        season_id: &str,
        ingredient: &Ingredient,
        demand_rate: Decimal,
        duration_weeks: u32,
    ) -> Result<PlanLine> {
        if demand_rate < Decimal::ZERO {
            return Err(PlanningError::config(
                ingredient.name(),
                format!("weekly_demand (d) 不可為負，實際為 {}", demand_rate),
            )
            .in_season(season_id));
        }

        if demand_rate.is_zero() {
            return self
                .idle_line(season_id, ingredient)
                .map_err(|e| e.in_season(season_id));
        }

        let order_cost = self.config.ceilings.order_cost;
        let c1 = ingredient.holding_cost();
        let b = ingredient.unit_cost();
        let sp = ingredient.safety_stock();
        let overflowed = |field: &str| {
            overflow(format!("季節 {} / {} 的 {}", season_id, ingredient.name(), field))
        };

        let total_demand = demand_rate
            .checked_mul(Decimal::from(duration_weeks))
            .ok_or_else(|| overflowed("D"))?;

        let base = LotSizingCalculator::base_lot_size(total_demand, order_cost, c1)
            .map_err(|e| e.in_season(season_id))?;

        let (lot_size, refined) = if self.refines(ingredient) {
            let refinement = self
                .refiner
                .refine_ingredient(ingredient, base)
                .map_err(|e| e.in_season(season_id))?;
            (refinement.lot_size, refinement.adjusted)
        } else {
            (base, false)
        };

        let reorder_interval = lot_size
            .checked_div(demand_rate)
            .ok_or_else(|| overflowed("t"))?;

        // ceil(duration / t) 等同 ceil(D / q)
        let order_count = total_demand
            .checked_div(lot_size)
            .map(|orders| orders.ceil())
            .and_then(|orders| orders.to_u32())
            .ok_or_else(|| overflowed("n"))?;

        let max_stock = lot_size.checked_add(sp).ok_or_else(|| overflowed("S"))?;

        let ordering = total_demand
            .checked_mul(order_cost)
            .and_then(|v| v.checked_div(lot_size));
        let holding = lot_size
            .checked_mul(c1)
            .and_then(|v| v.checked_div(Decimal::TWO));
        let acquisition = total_demand.checked_mul(b);
        let protection = sp.checked_mul(c1);
        let expected_total_cost = ordering
            .zip(holding)
            .and_then(|(o, h)| o.checked_add(h))
            .zip(acquisition)
            .and_then(|(v, a)| v.checked_add(a))
            .zip(protection)
            .and_then(|(v, p)| v.checked_add(p))
            .ok_or_else(|| overflowed("CTE"))?;

        let volume_occupied = max_stock
            .checked_mul(ingredient.unit_volume())
            .ok_or_else(|| overflowed("S·v"))?;
        let value_immobilized = max_stock.checked_mul(b).ok_or_else(|| overflowed("S·b"))?;
        let reorder_point = demand_rate
            .checked_mul(self.config.planner.lead_time_weeks)
            .and_then(|v| v.checked_add(sp))
            .ok_or_else(|| overflowed("SR"))?;

        Ok(PlanLine {
            ingredient: ingredient.name().to_string(),
            season: season_id.to_string(),
            refrigerated: ingredient.is_refrigerated(),
            lot_size,
            reorder_interval: Some(reorder_interval),
            order_count,
            total_demand,
            max_stock,
            expected_total_cost,
            volume_occupied,
            value_immobilized,
            reorder_point,
            refined,
        })
    }

    fn refines(&self, ingredient: &Ingredient) -> bool {
        self.config.policy().refines_items() && ingredient.caps().is_set()
    }

    /// 本季無需求：不下單，只持有保護庫存
    ///
    /// 單品策略下保護庫存本身超出單品上限時報錯。
    fn idle_line(&self, season_id: &str, ingredient: &Ingredient) -> Result<PlanLine> {
        if self.refines(ingredient) {
            ItemRefiner::check_safety_stock(ingredient.name(), ItemLimits::from(ingredient))?;
        }

        let sp = ingredient.safety_stock();
        let held = |per_unit: Decimal, field: &str| {
            sp.checked_mul(per_unit).ok_or_else(|| {
                overflow(format!("季節 {} / {} 的 {}", season_id, ingredient.name(), field))
            })
        };

        Ok(PlanLine {
            ingredient: ingredient.name().to_string(),
            season: season_id.to_string(),
            refrigerated: ingredient.is_refrigerated(),
            lot_size: Decimal::ZERO,
            reorder_interval: None,
            order_count: 0,
            total_demand: Decimal::ZERO,
            max_stock: sp,
            expected_total_cost: held(ingredient.holding_cost(), "CTE")?,
            volume_occupied: held(ingredient.unit_volume(), "S·v")?,
            value_immobilized: held(ingredient.unit_cost(), "S·b")?,
            reorder_point: sp,
            refined: false,
        })
    }
}

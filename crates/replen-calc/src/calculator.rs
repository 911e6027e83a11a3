//! 季節計劃計算器

use replen_core::{CapacityPolicy, IngredientCatalog, PlannerConfig, Season, SeasonTotals};

use crate::metrics::MetricsBuilder;
use crate::{PlanWarning, SeasonCalcResult};

/// 計算單一季節所有原料的計劃明細與季節彙總
pub struct SeasonCalculator<'a> {
    catalog: &'a IngredientCatalog,
    config: &'a PlannerConfig,
}

impl<'a> SeasonCalculator<'a> {
    pub fn new(catalog: &'a IngredientCatalog, config: &'a PlannerConfig) -> Self {
        Self { catalog, config }
    }

    /// 季節計算入口
    ///
    /// 每個原料表中的原料各產生一筆明細（順序同原料表），需求缺少時視為 0。
    pub fn calculate(&self, season: &Season) -> replen_core::Result<SeasonCalcResult> {
        tracing::debug!(
            "開始計算季節 {}：{} 週，原料 {} 種",
            season.id(),
            season.duration_weeks(),
            self.catalog.len()
        );

        // 需求表引用的原料必須存在於原料表
        for (name, _) in season.demands() {
            self.catalog.require(season.id(), name)?;
        }

        let builder = MetricsBuilder::new(self.config);
        let mut result = SeasonCalcResult::empty(season.id());

        for ingredient in self.catalog.iter() {
            let demand_rate = season.demand_rate(ingredient.name());
            let line = builder.build_plan_line(
                season.id(),
                ingredient,
                demand_rate,
                season.duration_weeks(),
            )?;

            tracing::debug!(
                "季節 {} / {}: q = {}, n = {}, S = {}",
                season.id(),
                line.ingredient,
                line.lot_size,
                line.order_count,
                line.max_stock
            );

            if line.refined {
                tracing::warn!(
                    "季節 {} / {} 批量依單品上限調整為 {}",
                    season.id(),
                    line.ingredient,
                    line.lot_size
                );
                result.add_warning(PlanWarning::warning(
                    season.id(),
                    ingredient.name(),
                    format!("批量依單品上限調整為 {}", line.lot_size.normalize()),
                ));
            } else if self.config.policy() == CapacityPolicy::Aggregate && ingredient.caps().is_set()
            {
                result.add_warning(PlanWarning::info(
                    season.id(),
                    ingredient.name(),
                    "季節總量策略下不套用單品上限".to_string(),
                ));
            }

            if !line.is_ordered() {
                result.add_warning(PlanWarning::info(
                    season.id(),
                    ingredient.name(),
                    "本季無需求，不下單".to_string(),
                ));
            }

            result.totals.add(&line)?;
            result.lines.push(line);
        }

        debug_assert_eq!(
            SeasonTotals::from_lines(season.id(), &result.lines).as_ref(),
            Ok(&result.totals)
        );

        Ok(result)
    }
}

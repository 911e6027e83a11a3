//! 補貨計劃模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{overflow, Result};

/// 計劃明細：某原料在某季節的補貨策略（建立後不再修改）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLine {
    /// 原料名稱
    pub ingredient: String,

    /// 季節代號
    pub season: String,

    /// 是否需要冷藏
    pub refrigerated: bool,

    /// 批量 q（kg）
    pub lot_size: Decimal,

    /// 補貨間隔 t = q/d（週），無需求時不存在
    pub reorder_interval: Option<Decimal>,

    /// 季節內訂購次數 n
    pub order_count: u32,

    /// 季節總需求 D = d × 週數（kg）
    pub total_demand: Decimal,

    /// 最大庫存 S = q + Sp（kg）
    pub max_stock: Decimal,

    /// 期望總成本 CTE
    pub expected_total_cost: Decimal,

    /// 佔用體積 S·v（m³）
    pub volume_occupied: Decimal,

    /// 資金佔用 S·b
    pub value_immobilized: Decimal,

    /// 再訂購點 SR = d·LT + Sp（kg）
    pub reorder_point: Decimal,

    /// 批量是否經過單品上限調整
    pub refined: bool,
}

impl PlanLine {
    /// 本季是否下單
    pub fn is_ordered(&self) -> bool {
        self.lot_size > Decimal::ZERO
    }
}

/// 季節彙總
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonTotals {
    pub season: String,

    /// 冷藏原料佔用體積合計
    pub refrigerated_volume: Decimal,

    /// 非冷藏原料佔用體積合計
    pub non_refrigerated_volume: Decimal,

    /// 資金佔用合計
    pub value_immobilized: Decimal,

    /// 期望總成本合計
    pub expected_total_cost: Decimal,
}

impl SeasonTotals {
    /// 創建空的彙總
    pub fn empty(season: impl Into<String>) -> Self {
        Self {
            season: season.into(),
            refrigerated_volume: Decimal::ZERO,
            non_refrigerated_volume: Decimal::ZERO,
            value_immobilized: Decimal::ZERO,
            expected_total_cost: Decimal::ZERO,
        }
    }

    /// 累加一筆計劃明細
    pub fn add(&mut self, line: &PlanLine) -> Result<()> {
        let overflowed = |field: &str| overflow(format!("季節 {} 的 {} 合計", self.season, field));

        if line.refrigerated {
            self.refrigerated_volume = self
                .refrigerated_volume
                .checked_add(line.volume_occupied)
                .ok_or_else(|| overflowed("冷藏體積"))?;
        } else {
            self.non_refrigerated_volume = self
                .non_refrigerated_volume
                .checked_add(line.volume_occupied)
                .ok_or_else(|| overflowed("非冷藏體積"))?;
        }
        self.value_immobilized = self
            .value_immobilized
            .checked_add(line.value_immobilized)
            .ok_or_else(|| overflowed("資金佔用"))?;
        self.expected_total_cost = self
            .expected_total_cost
            .checked_add(line.expected_total_cost)
            .ok_or_else(|| overflowed("CTE"))?;
        Ok(())
    }

    /// 由計劃明細彙總
    pub fn from_lines<'a>(
        season: impl Into<String>,
        lines: impl IntoIterator<Item = &'a PlanLine>,
    ) -> Result<Self> {
        let mut totals = Self::empty(season);
        for line in lines {
            totals.add(line)?;
        }
        Ok(totals)
    }

    /// 總佔用體積
    pub fn total_volume(&self) -> Decimal {
        self.refrigerated_volume + self.non_refrigerated_volume
    }
}

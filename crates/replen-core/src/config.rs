//! 規劃配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ensure_non_negative, ensure_positive, PlanningError, Result};

/// 容量判定的容差（1e-9）
pub const FEASIBILITY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// 季節容量上限與訂購成本（整個規劃期間不變）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityCeilings {
    /// 每次訂購成本 k
    pub order_cost: Decimal,

    /// 非冷藏最大體積（m³）
    pub max_volume_non_refrigerated: Decimal,

    /// 冷藏最大體積（m³）
    pub max_volume_refrigerated: Decimal,

    /// 最大資金佔用總額
    pub max_total_budget: Decimal,
}

impl CapacityCeilings {
    pub fn new(
        order_cost: Decimal,
        max_volume_non_refrigerated: Decimal,
        max_volume_refrigerated: Decimal,
        max_total_budget: Decimal,
    ) -> Result<Self> {
        let ceilings = Self {
            order_cost,
            max_volume_non_refrigerated,
            max_volume_refrigerated,
            max_total_budget,
        };
        ceilings.validate()?;
        Ok(ceilings)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("ceilings", "order_cost (k)", self.order_cost)?;
        ensure_positive(
            "ceilings",
            "max_volume_non_refrigerated",
            self.max_volume_non_refrigerated,
        )?;
        ensure_positive(
            "ceilings",
            "max_volume_refrigerated",
            self.max_volume_refrigerated,
        )?;
        ensure_positive("ceilings", "max_total_budget", self.max_total_budget)?;
        Ok(())
    }
}

/// 容量約束策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityPolicy {
    /// 單品上限：逐原料縮小批量，不檢查季節總量
    PerItem,

    /// 季節總量上限：按冷藏與非冷藏分區檢查，不做單品調整
    #[default]
    Aggregate,

    /// 先做單品調整，再檢查季節總量
    Combined,
}

impl CapacityPolicy {
    /// 是否執行單品批量調整
    pub fn refines_items(self) -> bool {
        matches!(self, Self::PerItem | Self::Combined)
    }

    /// 是否檢查季節總量
    pub fn checks_aggregate(self) -> bool {
        matches!(self, Self::Aggregate | Self::Combined)
    }
}

/// 規劃器參數
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// 容量約束策略
    pub policy: CapacityPolicy,

    /// 報表輸出的小數位數（只在呈現時四捨五入）
    pub decimal_places: u32,

    /// 單品調整迴圈的最大迭代次數
    pub max_refine_iterations: u32,

    /// 提前期（週），用於再訂購點 SR = d·LT + Sp
    pub lead_time_weeks: Decimal,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            policy: CapacityPolicy::Aggregate,
            decimal_places: 2,
            max_refine_iterations: 16,
            lead_time_weeks: Decimal::ONE,
        }
    }
}

/// 完整規劃配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub ceilings: CapacityCeilings,

    #[serde(default)]
    pub planner: PlannerSettings,
}

impl PlannerConfig {
    /// 創建使用預設參數的配置
    pub fn new(ceilings: CapacityCeilings) -> Self {
        Self {
            ceilings,
            planner: PlannerSettings::default(),
        }
    }

    /// 建構器模式：設置容量策略
    pub fn with_policy(mut self, policy: CapacityPolicy) -> Self {
        self.planner.policy = policy;
        self
    }

    /// 建構器模式：設置小數位數
    pub fn with_decimal_places(mut self, places: u32) -> Self {
        self.planner.decimal_places = places;
        self
    }

    /// 建構器模式：設置最大迭代次數
    pub fn with_max_refine_iterations(mut self, iterations: u32) -> Self {
        self.planner.max_refine_iterations = iterations;
        self
    }

    /// 建構器模式：設置提前期（週）
    pub fn with_lead_time_weeks(mut self, weeks: Decimal) -> Self {
        self.planner.lead_time_weeks = weeks;
        self
    }

    pub fn policy(&self) -> CapacityPolicy {
        self.planner.policy
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        self.ceilings.validate()?;
        if self.planner.max_refine_iterations == 0 {
            return Err(PlanningError::config(
                "planner",
                "max_refine_iterations 必須大於 0",
            ));
        }
        if self.planner.decimal_places > 10 {
            return Err(PlanningError::config(
                "planner",
                format!("decimal_places 過大：{}", self.planner.decimal_places),
            ));
        }
        ensure_non_negative("planner", "lead_time_weeks", self.planner.lead_time_weeks)?;
        Ok(())
    }
}

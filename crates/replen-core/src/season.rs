//! 季節模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{ensure_non_negative, PlanningError, Result};

/// 季節：固定長度的需求區段
///
/// 未出現在需求表中的原料視為該季節需求為 0。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Season {
    id: String,
    duration_weeks: u32,
    weekly_demand: BTreeMap<String, Decimal>,
}

impl Season {
    /// 創建新的季節
    pub fn new(id: impl Into<String>, duration_weeks: u32) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(PlanningError::config("季節表", "季節代號不可為空"));
        }
        if duration_weeks == 0 {
            return Err(PlanningError::config(
                format!("季節 {}", id),
                "duration_weeks 必須大於 0",
            ));
        }
        Ok(Self {
            id,
            duration_weeks,
            weekly_demand: BTreeMap::new(),
        })
    }

    /// 建構器模式：設置某原料的週需求率（kg/週）
    pub fn with_demand(mut self, ingredient: impl Into<String>, rate: Decimal) -> Result<Self> {
        self.add_demand(ingredient, rate)?;
        Ok(self)
    }

    /// 添加週需求率，同一原料重複時報錯
    pub fn add_demand(&mut self, ingredient: impl Into<String>, rate: Decimal) -> Result<()> {
        let ingredient = ingredient.into();
        let rate = ensure_non_negative(&ingredient, "weekly_demand (d)", rate)
            .map_err(|e| e.in_season(&self.id))?;

        if self.weekly_demand.contains_key(&ingredient) {
            return Err(
                PlanningError::config(ingredient, "同一季節內需求重複").in_season(&self.id)
            );
        }
        self.weekly_demand.insert(ingredient, rate);
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn duration_weeks(&self) -> u32 {
        self.duration_weeks
    }

    /// 某原料的週需求率（缺少時為 0）
    pub fn demand_rate(&self, ingredient: &str) -> Decimal {
        self.weekly_demand
            .get(ingredient)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// 季節需求表中列出的原料與需求率（按名稱排序）
    pub fn demands(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.weekly_demand.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

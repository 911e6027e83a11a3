//! 原料模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{ensure_non_negative, ensure_positive, PlanningError, Result};

/// 單品容量上限（可選）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCaps {
    /// 最大佔用體積（m³）
    pub max_volume: Option<Decimal>,

    /// 最大資金佔用（貨幣）
    pub max_budget: Option<Decimal>,
}

impl ItemCaps {
    /// 是否設定了任一上限
    pub fn is_set(&self) -> bool {
        self.max_volume.is_some() || self.max_budget.is_some()
    }
}

/// 原料（規劃期間不可變）
///
/// 所有欄位在建構時驗證：`b > 0`、`c1 > 0`、`Sp ≥ 0`、`v > 0`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IngredientRecord", into = "IngredientRecord")]
pub struct Ingredient {
    name: String,
    unit_cost: Decimal,
    holding_cost: Decimal,
    safety_stock: Decimal,
    unit_volume: Decimal,
    refrigerated: bool,
    caps: ItemCaps,
}

impl Ingredient {
    /// 創建並驗證原料
    pub fn new(
        name: impl Into<String>,
        unit_cost: Decimal,
        holding_cost: Decimal,
        safety_stock: Decimal,
        unit_volume: Decimal,
        refrigerated: bool,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(PlanningError::config("原料表", "原料名稱不可為空"));
        }

        Ok(Self {
            unit_cost: ensure_positive(&name, "unit_cost (b)", unit_cost)?,
            holding_cost: ensure_positive(&name, "holding_cost (c1)", holding_cost)?,
            safety_stock: ensure_non_negative(&name, "safety_stock (Sp)", safety_stock)?,
            unit_volume: ensure_positive(&name, "unit_volume (v)", unit_volume)?,
            refrigerated,
            caps: ItemCaps::default(),
            name,
        })
    }

    /// 建構器模式：設置單品最大體積
    pub fn with_max_volume(mut self, max_volume: Decimal) -> Result<Self> {
        self.caps.max_volume = Some(ensure_positive(&self.name, "max_volume", max_volume)?);
        Ok(self)
    }

    /// 建構器模式：設置單品最大資金
    pub fn with_max_budget(mut self, max_budget: Decimal) -> Result<Self> {
        self.caps.max_budget = Some(ensure_positive(&self.name, "max_budget", max_budget)?);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 單位取得成本 b
    pub fn unit_cost(&self) -> Decimal {
        self.unit_cost
    }

    /// 單位持有成本 c1
    pub fn holding_cost(&self) -> Decimal {
        self.holding_cost
    }

    /// 保護庫存 Sp
    pub fn safety_stock(&self) -> Decimal {
        self.safety_stock
    }

    /// 單位體積 v
    pub fn unit_volume(&self) -> Decimal {
        self.unit_volume
    }

    pub fn is_refrigerated(&self) -> bool {
        self.refrigerated
    }

    pub fn caps(&self) -> ItemCaps {
        self.caps
    }

    /// 符號名稱用的首字母（大寫）
    pub fn initial(&self) -> char {
        self.name
            .trim()
            .chars()
            .next()
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('X')
    }
}

/// 原料表的一列（CSV 的原始形式）
///
/// 數值欄位以字串解析，不經過浮點數。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRecord {
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_cost: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub holding_cost: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub safety_stock: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub unit_volume: Decimal,
    pub refrigerated: bool,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub max_volume: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub max_budget: Option<Decimal>,
}

impl TryFrom<IngredientRecord> for Ingredient {
    type Error = PlanningError;

    fn try_from(record: IngredientRecord) -> Result<Self> {
        let mut ingredient = Ingredient::new(
            record.name,
            record.unit_cost,
            record.holding_cost,
            record.safety_stock,
            record.unit_volume,
            record.refrigerated,
        )?;
        if let Some(max_volume) = record.max_volume {
            ingredient = ingredient.with_max_volume(max_volume)?;
        }
        if let Some(max_budget) = record.max_budget {
            ingredient = ingredient.with_max_budget(max_budget)?;
        }
        Ok(ingredient)
    }
}

impl From<Ingredient> for IngredientRecord {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            max_volume: ingredient.caps.max_volume,
            max_budget: ingredient.caps.max_budget,
            name: ingredient.name,
            unit_cost: ingredient.unit_cost,
            holding_cost: ingredient.holding_cost,
            safety_stock: ingredient.safety_stock,
            unit_volume: ingredient.unit_volume,
            refrigerated: ingredient.refrigerated,
        }
    }
}

/// 原料表（保留輸入順序，名稱唯一）
#[derive(Debug, Clone, Default)]
pub struct IngredientCatalog {
    ingredients: Vec<Ingredient>,
    index: HashMap<String, usize>,
}

impl IngredientCatalog {
    /// 創建原料表，名稱重複時報錯
    pub fn new(ingredients: Vec<Ingredient>) -> Result<Self> {
        let mut index = HashMap::with_capacity(ingredients.len());
        for (position, ingredient) in ingredients.iter().enumerate() {
            if index.insert(ingredient.name.clone(), position).is_some() {
                return Err(PlanningError::config(
                    ingredient.name.clone(),
                    "原料名稱重複",
                ));
            }
        }
        Ok(Self { ingredients, index })
    }

    pub fn get(&self, name: &str) -> Option<&Ingredient> {
        self.index.get(name).map(|&i| &self.ingredients[i])
    }

    /// 查找季節引用的原料，不存在時回傳資料缺口錯誤
    pub fn require(&self, season_id: &str, name: &str) -> Result<&Ingredient> {
        self.get(name).ok_or_else(|| PlanningError::DataGap {
            season: season_id.to_string(),
            ingredient: name.to_string(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients.iter()
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn flour() -> Ingredient {
        Ingredient::new(
            "Harina de Trigo",
            d("1600"),
            d("685.12"),
            d("120"),
            d("0.0018"),
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_create_ingredient() {
        let ingredient = flour().with_max_volume(d("22")).unwrap();

        assert_eq!(ingredient.name(), "Harina de Trigo");
        assert_eq!(ingredient.unit_cost(), d("1600"));
        assert_eq!(ingredient.safety_stock(), d("120"));
        assert!(!ingredient.is_refrigerated());
        assert_eq!(ingredient.caps().max_volume, Some(d("22")));
        assert_eq!(ingredient.caps().max_budget, None);
        assert!(ingredient.caps().is_set());
        assert_eq!(ingredient.initial(), 'H');
    }

    #[rstest]
    #[case("0", "685.12", "120", "0.0018")]
    #[case("1600", "-1", "120", "0.0018")]
    #[case("1600", "685.12", "-5", "0.0018")]
    #[case("1600", "685.12", "120", "0")]
    fn test_reject_invalid_parameters(
        #[case] b: &str,
        #[case] c1: &str,
        #[case] sp: &str,
        #[case] v: &str,
    ) {
        let result = Ingredient::new("Sal", d(b), d(c1), d(sp), d(v), false);
        assert!(matches!(result, Err(PlanningError::Configuration { .. })));
    }

    #[test]
    fn test_reject_non_positive_cap() {
        assert!(flour().with_max_budget(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_record_conversion() {
        let record = IngredientRecord {
            name: "Manteca".to_string(),
            unit_cost: d("13000"),
            holding_cost: d("5566.6"),
            safety_stock: d("12"),
            unit_volume: d("0.0015"),
            refrigerated: true,
            max_volume: Some(d("2.5")),
            max_budget: None,
        };

        let ingredient = Ingredient::try_from(record.clone()).unwrap();
        assert!(ingredient.is_refrigerated());
        assert_eq!(IngredientRecord::from(ingredient), record);
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = IngredientCatalog::new(vec![flour()]).unwrap();

        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("Harina de Trigo").is_some());
        assert_eq!(
            catalog.require("3", "Levadura").unwrap_err(),
            PlanningError::DataGap {
                season: "3".to_string(),
                ingredient: "Levadura".to_string(),
            }
        );
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        assert!(IngredientCatalog::new(vec![flour(), flour()]).is_err());
    }
}

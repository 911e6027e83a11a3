//! 輸入讀取：原料表、季節需求表（CSV）與規劃配置（TOML）

use replen_core::{Ingredient, IngredientCatalog, PlannerConfig, PlanningError, Season};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// 輸入錯誤
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("無法讀取檔案: {0}")]
    Io(#[from] io::Error),

    #[error("CSV 解析錯誤: {0}")]
    Csv(#[from] csv::Error),

    #[error("配置檔解析錯誤: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Planning(#[from] PlanningError),
}

/// 季節需求表的一列
#[derive(Debug, Clone, Deserialize)]
pub struct SeasonDemandRow {
    pub season_id: String,
    pub duration_weeks: u32,
    pub ingredient_name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub weekly_demand: Decimal,
}

/// 讀取原料表
///
/// 欄位：`name, unit_cost, holding_cost, safety_stock, unit_volume, refrigerated[, max_volume, max_budget]`
pub fn read_ingredients<R: io::Read>(reader: R) -> Result<IngredientCatalog, InputError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let ingredients = rdr
        .deserialize::<Ingredient>()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(IngredientCatalog::new(ingredients)?)
}

pub fn load_ingredients(path: impl AsRef<Path>) -> Result<IngredientCatalog, InputError> {
    read_ingredients(std::fs::File::open(path)?)
}

/// 讀取季節需求表，依季節代號分組（順序同首次出現）
///
/// 欄位：`season_id, duration_weeks, ingredient_name, weekly_demand`
pub fn read_seasons<R: io::Read>(reader: R) -> Result<Vec<Season>, InputError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut seasons: Vec<Season> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rdr.deserialize::<SeasonDemandRow>() {
        let row = row?;
        let position = match index.get(&row.season_id) {
            Some(&position) => {
                let season = &seasons[position];
                if season.duration_weeks() != row.duration_weeks {
                    return Err(PlanningError::config(
                        format!("季節 {}", row.season_id),
                        format!(
                            "duration_weeks 不一致：{} 與 {}",
                            season.duration_weeks(),
                            row.duration_weeks
                        ),
                    )
                    .into());
                }
                position
            }
            None => {
                seasons.push(Season::new(row.season_id.clone(), row.duration_weeks)?);
                index.insert(row.season_id.clone(), seasons.len() - 1);
                seasons.len() - 1
            }
        };
        seasons[position].add_demand(row.ingredient_name, row.weekly_demand)?;
    }

    Ok(seasons)
}

pub fn load_seasons(path: impl AsRef<Path>) -> Result<Vec<Season>, InputError> {
    read_seasons(std::fs::File::open(path)?)
}

/// 解析並驗證規劃配置
pub fn parse_config(text: &str) -> Result<PlannerConfig, InputError> {
    let config: PlannerConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<PlannerConfig, InputError> {
    parse_config(&std::fs::read_to_string(path)?)
}

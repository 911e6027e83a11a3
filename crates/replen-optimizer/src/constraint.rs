//! 外部求解器參數匯出
//!
//! 季節總量不可行時，把重建該季約束所需的數值整理成 `NAME = value;` 清單，
//! 可直接貼到 LINGO 一類的線性 / 整數規劃工具。相同輸入必定產生相同的文字。

use replen_core::CapacityCeilings;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;

use crate::capacity::{Ceiling, IngredientSnapshot};

/// 求解器參數匯出器
pub struct SolverExporter;

impl SolverExporter {
    /// 匯出不可行季節的參數清單
    pub fn export_infeasible(
        season_id: &str,
        snapshot: &[IngredientSnapshot],
        ceilings: &CapacityCeilings,
    ) -> String {
        SolverListing {
            season_id,
            snapshot,
            suffixes: Self::assign_suffixes(snapshot),
            ceilings,
        }
        .to_string()
    }

    /// 以首字母作為參數後綴，重複時依序加上 2、3…
    fn assign_suffixes(snapshot: &[IngredientSnapshot]) -> Vec<String> {
        let mut seen: HashMap<char, u32> = HashMap::new();
        snapshot
            .iter()
            .map(|item| {
                let letter = if item.initial.is_ascii_alphanumeric() {
                    item.initial.to_ascii_uppercase()
                } else {
                    'X'
                };
                let count = seen.entry(letter).or_insert(0);
                *count += 1;
                if *count == 1 {
                    letter.to_string()
                } else {
                    format!("{}{}", letter, count)
                }
            })
            .collect()
    }
}

/// 單季參數清單
struct SolverListing<'a> {
    season_id: &'a str,
    snapshot: &'a [IngredientSnapshot],
    suffixes: Vec<String>,
    ceilings: &'a CapacityCeilings,
}

impl fmt::Display for SolverListing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "! season {}: aggregate capacity exceeded, parameters for external solver",
            self.season_id
        )?;
        for (item, suffix) in self.snapshot.iter().zip(&self.suffixes) {
            writeln!(f, "! {} = {}", suffix, item.name)?;
        }
        writeln!(f)?;

        for (item, suffix) in self.snapshot.iter().zip(&self.suffixes) {
            let refrigerated = if item.refrigerated { Decimal::ONE } else { Decimal::ZERO };
            param(f, &format!("D{}", suffix), item.total_demand)?;
            param(f, &format!("C1{}", suffix), item.holding_cost)?;
            param(f, &format!("SP{}", suffix), item.safety_stock)?;
            param(f, &format!("V{}", suffix), item.unit_volume)?;
            param(f, &format!("B{}", suffix), item.unit_cost)?;
            param(f, &format!("R{}", suffix), refrigerated)?;
            writeln!(f)?;
        }

        param(f, "K", self.ceilings.order_cost)?;
        for ceiling in Ceiling::ALL {
            param(f, ceiling.symbol(), ceiling.limit(self.ceilings))?;
        }
        Ok(())
    }
}

fn param(f: &mut fmt::Formatter<'_>, name: &str, value: Decimal) -> fmt::Result {
    writeln!(f, "{} = {};", name, value.normalize())
}

use anyhow::Context;
use clap::Parser;
use replen::{input, logging, report, SeasonalPlanner};
use std::path::PathBuf;
use std::process::ExitCode;

/// 季節性原料補貨規劃
#[derive(Debug, Parser)]
#[command(name = "replen", version, about)]
struct Cli {
    /// 原料表（CSV）
    #[arg(long)]
    ingredients: PathBuf,

    /// 季節需求表（CSV）
    #[arg(long)]
    seasons: PathBuf,

    /// 規劃配置（TOML）
    #[arg(long)]
    config: PathBuf,

    /// 輸出目錄
    #[arg(long, default_value = "out")]
    out_dir: PathBuf,

    /// 顯示詳細日誌
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

/// 回傳是否所有季節都完成計算（不可行不算失敗）
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let catalog = input::load_ingredients(&cli.ingredients)
        .with_context(|| format!("讀取原料表 {}", cli.ingredients.display()))?;
    let seasons = input::load_seasons(&cli.seasons)
        .with_context(|| format!("讀取季節需求表 {}", cli.seasons.display()))?;
    let config = input::load_config(&cli.config)
        .with_context(|| format!("讀取配置 {}", cli.config.display()))?;

    let places = config.planner.decimal_places;
    let planner = SeasonalPlanner::new(catalog, config)?;
    let result = planner.plan(&seasons);

    let written = report::write_outputs(&cli.out_dir, &result, places)
        .with_context(|| format!("寫出報表到 {}", cli.out_dir.display()))?;

    for plan in &result.plans {
        let verdict = if plan.is_feasible() { "Feasible" } else { "Infeasible" };
        println!("season {}: {}", plan.season, verdict);
        for violation in plan.feasibility.violations() {
            println!(
                "  exceeded {} by {}",
                violation.ceiling.label(),
                violation.excess().round_dp(places).normalize()
            );
        }
    }
    for err in &result.errors {
        eprintln!("Error: {}", err);
    }
    println!("{} files written to {}", written.len(), cli.out_dir.display());

    Ok(!result.has_errors())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn demo(file: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("demos")
            .join("bakery")
            .join(file)
    }

    fn cli(seasons: PathBuf, out_dir: &Path) -> Cli {
        Cli {
            ingredients: demo("ingredients.csv"),
            seasons,
            config: demo("planner.toml"),
            out_dir: out_dir.to_path_buf(),
            verbose: false,
        }
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "replen",
            "--ingredients",
            "ingredients.csv",
            "--seasons",
            "seasons.csv",
            "--config",
            "planner.toml",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.ingredients, PathBuf::from("ingredients.csv"));
        assert_eq!(cli.out_dir, PathBuf::from("out"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_missing_argument_is_rejected() {
        assert!(Cli::try_parse_from(["replen", "--ingredients", "ingredients.csv"]).is_err());
    }

    #[test]
    fn test_infeasible_season_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report");

        assert!(run(&cli(demo("seasons.csv"), &out)).unwrap());

        // 第二季不可行：仍寫出報表與求解器參數
        assert!(out.join("plan_2.csv").exists());
        assert!(out.join("solver_2.txt").exists());
        assert!(!out.join("solver_1.txt").exists());
        let report = std::fs::read_to_string(out.join("feasibility_2.txt")).unwrap();
        assert!(report.contains("verdict: Infeasible"));
    }

    #[test]
    fn test_data_gap_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let seasons = dir.path().join("seasons.csv");
        std::fs::write(
            &seasons,
            "season_id,duration_weeks,ingredient_name,weekly_demand\n\
             1,14,Harina de Trigo,179.656\n\
             5,6,Chocolate,3\n",
        )
        .unwrap();
        let out = dir.path().join("out");

        assert!(!run(&cli(seasons, &out)).unwrap());

        // 其他季節照常輸出
        assert!(out.join("plan_1.csv").exists());
        let summary = std::fs::read_to_string(out.join("summary.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&summary).unwrap();
        assert_eq!(value["errors"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_unreadable_input_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cli = cli(demo("seasons.csv"), dir.path());
        cli.ingredients = dir.path().join("missing.csv");

        let err = run(&cli).unwrap_err();
        assert!(format!("{:#}", err).contains("讀取原料表"));
    }
}

use anyhow::{bail, Context, Result};
use capacity_planner::io::baseline::BaselineDataset;
use capacity_planner::io::loader::{InputLoader, InputSources};
use capacity_planner::io::reporting;
use capacity_planner::logging;
use capacity_planner::planning::config::PlannerConfig;
use capacity_planner::planning::plan_from_tables;
use capacity_planner::planning::summary::PlanSummary;
use std::env;
use std::path::PathBuf;

const USAGE: &str = "\
Usage: capacity-planner [OPTIONS]

Options:
  --rates <PATH>      Rates CSV (product, line, rate)
  --calendar <PATH>   Calendar CSV (line, month, availableTime)
  --demand <PATH>     Demand CSV (product, month, quantity)
  --baseline          Always use the baseline files
  --out <DIR>         Write result CSVs into DIR
  --tolerance <X>     Relative numerical tolerance (default 1e-9)
  -h, --help          Show this message

Missing or unreadable inputs fall back to the built-in baseline.";

struct CliArgs {
    sources: InputSources,
    out_dir: Option<PathBuf>,
    config: PlannerConfig,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<CliArgs>> {
    let mut cli = CliArgs {
        sources: InputSources::default(),
        out_dir: None,
        config: PlannerConfig::default(),
    };

    while let Some(arg) = args.next() {
        let mut value = |flag: &str| args.next().with_context(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "--rates" => cli.sources.rates = Some(value("--rates")?.into()),
            "--calendar" => cli.sources.calendar = Some(value("--calendar")?.into()),
            "--demand" => cli.sources.demand = Some(value("--demand")?.into()),
            "--out" => cli.out_dir = Some(value("--out")?.into()),
            "--baseline" => cli.sources.always_baseline = true,
            "--tolerance" => {
                let raw = value("--tolerance")?;
                let tolerance: f64 = raw
                    .parse()
                    .with_context(|| format!("invalid tolerance '{raw}'"))?;
                if !(tolerance >= 0.0 && tolerance.is_finite()) {
                    bail!("tolerance must be a non-negative number, got {raw}");
                }
                cli.config.tolerance = tolerance;
            }
            "-h" | "--help" => return Ok(None),
            other => bail!("unknown argument '{other}'\n\n{USAGE}"),
        }
    }

    Ok(Some(cli))
}

fn main() -> Result<()> {
    logging::init();

    let Some(cli) = parse_args(env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(());
    };

    println!("=== Production Capacity Planner ===");

    // 1. LOAD INPUTS (baseline fills any gap)
    let loader = InputLoader::new(BaselineDataset::current());
    let loaded = loader.load(&cli.sources).context("loading planner inputs")?;
    for fallback in &loaded.fallbacks {
        eprintln!(
            "Could not read {} CSV '{}': {}. Using baseline.",
            fallback.table,
            fallback.path.display(),
            fallback.reason
        );
    }

    // 2. RUN ALLOCATION
    let outcome = plan_from_tables(&loaded.tables, &cli.config).context("running allocation")?;
    if !outcome.warnings.is_empty() {
        println!("{} input rows repaired or dropped (see log).", outcome.warnings.len());
    }
    println!(
        "Planned {} products on {} lines over {} months.",
        outcome.metadata.products.len(),
        outcome.metadata.lines.len(),
        outcome.metadata.months.len()
    );

    // 3. HIGHLIGHTS
    let summary = PlanSummary::from_outcome(&outcome, 5);
    println!("\n=== Highlights ===");
    println!("Total production (MT):      {:.1}", summary.total_allocated);
    match summary.average_utilization {
        Some(avg) => println!("Average line utilization:   {:.1}%", avg * 100.0),
        None => println!("Average line utilization:   n/a"),
    }
    match summary.average_fill_rate {
        Some(avg) => println!("Average demand coverage:    {:.1}%", avg * 100.0),
        None => println!("Average demand coverage:    n/a"),
    }

    if !summary.service_risk.is_empty() {
        println!("\n=== Service risk (lowest average fill rates) ===");
        for (product, fill_rate) in &summary.service_risk {
            println!("{}: {:.1}%", product, fill_rate * 100.0);
        }
    }

    // 4. EXPORT RESULTS
    if let Some(dir) = &cli.out_dir {
        let written = reporting::write_outcome(dir, &outcome)
            .with_context(|| format!("writing results to {}", dir.display()))?;
        println!();
        for path in written {
            println!("Written: {}", path.display());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn parses_paths_and_flags() {
        let cli = parse_args(args(&[
            "--rates", "r.csv", "--demand", "d.csv", "--baseline", "--out", "results", "--tolerance", "1e-6",
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(cli.sources.rates, Some(PathBuf::from("r.csv")));
        assert_eq!(cli.sources.calendar, None);
        assert_eq!(cli.sources.demand, Some(PathBuf::from("d.csv")));
        assert!(cli.sources.always_baseline);
        assert_eq!(cli.out_dir, Some(PathBuf::from("results")));
        assert_eq!(cli.config.tolerance, 1e-6);
    }

    #[test]
    fn help_short_circuits() {
        assert!(parse_args(args(&["--help"])).unwrap().is_none());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(args(&["--rates"])).is_err());
        assert!(parse_args(args(&["--tolerance", "-1"])).is_err());
        assert!(parse_args(args(&["--frobnicate"])).is_err());
    }
}

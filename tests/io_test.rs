// File round trips: input CSVs in, result CSVs out.

use capacity_planner::io::loader::{InputLoader, InputSources, TableOrigin};
use capacity_planner::io::reporting::write_outcome;
use capacity_planner::io::tables::TableKind;
use capacity_planner::planning::config::PlannerConfig;
use capacity_planner::planning::{allocate, plan_from_tables};
use std::fs;
use std::path::Path;

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn plans_from_files_and_writes_results() {
    let dir = tempfile::tempdir().unwrap();
    let sources = InputSources {
        rates: Some(write(dir.path(), "rates.csv", "product,line,rate\nA,L1,10\nA,L2,5\n")),
        calendar: Some(write(
            dir.path(),
            "calendar.csv",
            "Line,Month,AvailableTime\nL1,Jan,4\nL2,Jan,10\nL3,Jan,0\n",
        )),
        demand: Some(write(
            dir.path(),
            "demand.csv",
            "product,month,quantity\nA,Jan,100\nB,Jan,0\n",
        )),
        always_baseline: false,
    };

    let loaded = InputLoader::default().load(&sources).unwrap();
    assert!(loaded.fallbacks.is_empty());
    assert!(loaded
        .origins
        .iter()
        .all(|(_, origin)| matches!(origin, TableOrigin::File(_))));

    let outcome = plan_from_tables(&loaded.tables, &PlannerConfig::default()).unwrap();
    let out_dir = dir.path().join("results");
    let written = write_outcome(&out_dir, &outcome).unwrap();
    assert_eq!(written.len(), 4);

    let allocations = fs::read_to_string(out_dir.join("allocations.csv")).unwrap();
    assert_eq!(
        allocations,
        "product,line,month,quantity\nA,L1,Jan,40.0\nA,L2,Jan,50.0\n"
    );

    let utilization = fs::read_to_string(out_dir.join("utilization.csv")).unwrap();
    let rows: Vec<&str> = utilization.lines().collect();
    assert_eq!(rows[0], "line,month,consumed_time,available_time,utilization");
    assert_eq!(rows[3], "L3,Jan,0.0,0.0,");

    let fill_rates = fs::read_to_string(out_dir.join("fill_rates.csv")).unwrap();
    let rows: Vec<&str> = fill_rates.lines().collect();
    assert_eq!(rows[0], "product,month,allocated,demand,fill_rate");
    assert_eq!(rows[1], "A,Jan,90.0,100.0,0.9");
    assert_eq!(rows[2], "B,Jan,0.0,0.0,");

    let steps = fs::read_to_string(out_dir.join("allocation_steps.csv")).unwrap();
    assert!(steps.starts_with("month,step,product,line,quantity,time_used,limited_by\n"));
    assert!(steps.contains("Jan,1,A,L1,40.0,4.0,Capacity"));
}

#[test]
fn broken_file_falls_back_to_baseline_and_still_plans() {
    let dir = tempfile::tempdir().unwrap();
    let sources = InputSources {
        demand: Some(write(dir.path(), "demand.csv", "")),
        ..InputSources::default()
    };

    let loaded = InputLoader::default().load(&sources).unwrap();
    assert_eq!(loaded.fallbacks.len(), 1);
    assert_eq!(loaded.fallbacks[0].table, TableKind::Demand);

    let outcome = plan_from_tables(&loaded.tables, &PlannerConfig::default()).unwrap();
    assert!(outcome.warnings.is_empty());
    assert!(outcome.total_allocated() > 0.0);
}

#[test]
fn empty_plan_still_writes_headers() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = allocate(&[], &[], &[], &PlannerConfig::default()).unwrap();
    write_outcome(dir.path(), &outcome).unwrap();

    let read = |name: &str| fs::read_to_string(dir.path().join(name)).unwrap();
    assert_eq!(read("allocations.csv"), "product,line,month,quantity\n");
    assert_eq!(
        read("utilization.csv"),
        "line,month,consumed_time,available_time,utilization\n"
    );
    assert_eq!(read("fill_rates.csv"), "product,month,allocated,demand,fill_rate\n");
    assert_eq!(
        read("allocation_steps.csv"),
        "month,step,product,line,quantity,time_used,limited_by\n"
    );
}

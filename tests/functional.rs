//! An end-to-end test running a complete model directory through the CLI.
use housing_abm::cli::{RunOpts, handle_run_command};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

/// Write a small but complete model into `model_dir`
fn write_model(model_dir: &Path) {
    let mut file = File::create(model_dir.join("model.toml")).unwrap();
    writeln!(
        file,
        "consumers_number = 50
years = 5
down_payment_percentage = 0.2
saving_rate = 0.3
interest_rate = 0.05
clearing_mechanism = \"income_order_descendant\"
seed = 42

[annual_income]
minimum = 30000.0
average = 75000.0
standard_deviation = 15000.0
maximum = 150000.0

[children_range]
minimum = 0
maximum = 3"
    )
    .unwrap();

    let mut file = File::create(model_dir.join("houses.csv")).unwrap();
    writeln!(file, "id,price,area,bedrooms,year_built,quality").unwrap();
    writeln!(file, "1,300000,1500,3,2020,10").unwrap();
    writeln!(file, "2,250000,1200,2,2018,8").unwrap();
    writeln!(file, "3,400000,1800,4,2019,10").unwrap();
    writeln!(file, "4,200000,1000,2,2015,4").unwrap();
    writeln!(file, "5,180000,900,1,2010,2").unwrap();
    writeln!(file, "6,350000,1700,3,2017,8").unwrap();
    writeln!(file, "7,220000,1100,2,2016,6").unwrap();

    let mut file = File::create(model_dir.join("settings.toml")).unwrap();
    writeln!(file, "log_level = \"off\"").unwrap();
}

#[test]
fn test_handle_run_command() {
    let model_dir = tempdir().unwrap();
    write_model(model_dir.path());

    let output_root = tempdir().unwrap();
    let output_dir = output_root.path().join("results");
    let opts = RunOpts {
        output_dir: Some(output_dir.clone()),
        overwrite: false,
    };
    handle_run_command(model_dir.path(), &opts).unwrap();

    // All result files are present
    for file_name in ["houses.csv", "consumers.csv", "metrics.csv"] {
        assert!(output_dir.join(file_name).is_file());
    }

    // One row per consumer plus a header
    let consumers = fs::read_to_string(output_dir.join("consumers.csv")).unwrap();
    assert_eq!(consumers.lines().count(), 51);

    // One row per house plus a header
    let houses = fs::read_to_string(output_dir.join("houses.csv")).unwrap();
    assert_eq!(houses.lines().count(), 8);

    // Both metrics are valid rates
    let metrics = fs::read_to_string(output_dir.join("metrics.csv")).unwrap();
    let mut lines = metrics.lines();
    assert_eq!(
        lines.next().unwrap(),
        "owners_population_rate,houses_availability_rate"
    );
    let values: Vec<f64> = lines
        .next()
        .unwrap()
        .split(',')
        .map(|value| value.parse().unwrap())
        .collect();
    assert_eq!(values.len(), 2);
    for value in &values {
        assert!((0.0..=1.0).contains(value));
    }

    // Rerunning into the same directory requires --overwrite
    let result = handle_run_command(model_dir.path(), &opts);
    assert!(result.is_err());

    let opts = RunOpts {
        output_dir: Some(output_dir),
        overwrite: true,
    };
    handle_run_command(model_dir.path(), &opts).unwrap();
}

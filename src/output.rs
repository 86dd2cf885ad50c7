//! The module responsible for writing simulation results to disk.
use crate::consumer::Segment;
use crate::house::QualityScore;
use crate::id::{ConsumerID, HouseID};
use crate::simulation::Simulation;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The root folder in which model-specific result folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "housing_abm_results";

/// The output file name for the final house inventory
const HOUSES_FILE_NAME: &str = "houses.csv";

/// The output file name for the final consumer population
const CONSUMERS_FILE_NAME: &str = "consumers.csv";

/// The output file name for the aggregate outcome metrics
const METRICS_FILE_NAME: &str = "metrics.csv";

/// Get the default output folder for the model specified at `model_dir`
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create the output directory (with parents) if it does not already exist.
pub fn create_output_directory(output_dir: &Path) -> Result<()> {
    if output_dir.is_dir() {
        // already exists
        return Ok(());
    }

    fs::create_dir_all(output_dir)?;

    Ok(())
}

/// Represents a row in the houses output CSV file
#[derive(Serialize, Debug, PartialEq)]
struct HouseRow {
    id: HouseID,
    price: f64,
    area: f64,
    bedrooms: u32,
    year_built: i32,
    quality_score: Option<QualityScore>,
    available: bool,
}

/// Represents a row in the consumers output CSV file
#[derive(Serialize, Debug, PartialEq)]
struct ConsumerRow {
    id: ConsumerID,
    annual_income: f64,
    children_number: u32,
    segment: Segment,
    savings: f64,
    house_id: Option<HouseID>,
}

/// Represents the single row of the metrics output CSV file
#[derive(Serialize, Debug, PartialEq)]
struct MetricsRow {
    owners_population_rate: f64,
    houses_availability_rate: f64,
}

/// Write the final state of a cleared simulation to CSV files in `output_dir`.
pub fn write_results(output_dir: &Path, simulation: &Simulation) -> Result<()> {
    let market = simulation
        .housing_market()
        .context("the housing market has not been created")?;

    let mut writer = csv::Writer::from_path(output_dir.join(HOUSES_FILE_NAME))?;
    for house in market.houses() {
        writer.serialize(HouseRow {
            id: house.id,
            price: house.price.value(),
            area: house.area.value(),
            bedrooms: house.bedrooms,
            year_built: house.year_built,
            quality_score: house.quality_score,
            available: house.available,
        })?;
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_path(output_dir.join(CONSUMERS_FILE_NAME))?;
    for consumer in simulation.consumers() {
        writer.serialize(ConsumerRow {
            id: consumer.id,
            annual_income: consumer.annual_income.value(),
            children_number: consumer.children_number,
            segment: consumer.segment,
            savings: consumer.savings.value(),
            house_id: consumer.house,
        })?;
    }
    writer.flush()?;

    let mut writer = csv::Writer::from_path(output_dir.join(METRICS_FILE_NAME))?;
    writer.serialize(MetricsRow {
        owners_population_rate: simulation.compute_owners_population_rate()?.value(),
        houses_availability_rate: simulation.compute_houses_availability_rate()?.value(),
    })?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{consumer, market, parameters};
    use crate::market::HousingMarket;
    use crate::parameters::SimulationParameters;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    fn test_write_results(
        parameters: SimulationParameters,
        market: HousingMarket,
        consumer: crate::consumer::Consumer,
    ) {
        let mut simulation = Simulation::with_population(parameters, market, vec![consumer]);
        simulation.clean_the_market().unwrap();

        let dir = tempdir().unwrap();
        write_results(dir.path(), &simulation).unwrap();

        for file_name in [HOUSES_FILE_NAME, CONSUMERS_FILE_NAME, METRICS_FILE_NAME] {
            assert!(dir.path().join(file_name).is_file());
        }

        // Three houses plus a header line
        let houses = fs::read_to_string(dir.path().join(HOUSES_FILE_NAME)).unwrap();
        assert_eq!(houses.lines().count(), 4);

        let metrics = fs::read_to_string(dir.path().join(METRICS_FILE_NAME)).unwrap();
        assert_eq!(
            metrics.lines().next().unwrap(),
            "owners_population_rate,houses_availability_rate"
        );
    }

    #[test]
    fn test_create_output_directory() {
        let dir = tempdir().unwrap();
        let output_dir = dir.path().join("results").join("nested");
        create_output_directory(&output_dir).unwrap();
        assert!(output_dir.is_dir());

        // Creating an existing directory is a no-op
        create_output_directory(&output_dir).unwrap();
    }
}

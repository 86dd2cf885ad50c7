//! Common routines for handling input data.
use crate::id::HouseID;
use crate::units::{Area, Dimensionless, Money};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use serde::de::{DeserializeOwned, Deserializer};
use std::fs;
use std::path::Path;

/// The input file name for house records
const HOUSES_FILE_NAME: &str = "houses.csv";

/// Format an error message to include the file path
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let contents = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    toml::from_str(&contents).with_context(|| input_err_msg(file_path))
}

/// Read a series of type `T`s from a CSV file into a `Vec<T>`.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(file_path).with_context(|| input_err_msg(file_path))?;

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: T = result.with_context(|| input_err_msg(file_path))?;
        rows.push(row);
    }

    ensure!(
        !rows.is_empty(),
        "CSV file cannot be empty: {}",
        file_path.display()
    );

    Ok(rows)
}

/// Read a proportion, checking that it is between 0 and 1 inclusive
pub fn deserialise_proportion<'de, D>(deserialiser: D) -> Result<Dimensionless, D::Error>
where
    D: Deserializer<'de>,
{
    let value: f64 = Deserialize::deserialize(deserialiser)?;
    if !(0.0..=1.0).contains(&value) {
        Err(serde::de::Error::custom("Value must be between 0 and 1"))?;
    }

    Ok(Dimensionless(value))
}

/// Read a proportion, checking that it is between 0 and 1 exclusive of zero
pub fn deserialise_proportion_nonzero<'de, D>(deserialiser: D) -> Result<Dimensionless, D::Error>
where
    D: Deserializer<'de>,
{
    let value: f64 = Deserialize::deserialize(deserialiser)?;
    if !(value > 0.0 && value <= 1.0) {
        Err(serde::de::Error::custom(
            "Value must be greater than 0 and at most 1",
        ))?;
    }

    Ok(Dimensionless(value))
}

/// A raw house record as supplied by the external data collaborator.
///
/// Numeric fields are assumed to be already normalised; the quality indicator, if present, is on
/// the raw 1-10 scale and is interpreted when the housing market is built.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct HouseRecord {
    /// Unique identifier for the house
    pub id: HouseID,
    /// Sale price of the house
    pub price: Money,
    /// Living area of the house, in square feet
    pub area: Area,
    /// Number of bedrooms
    pub bedrooms: u32,
    /// Year the house was built
    pub year_built: i32,
    /// Raw condition indicator on a 1-10 scale, if recorded
    pub quality: Option<u32>,
}

/// Read house records from the CSV file in the model directory.
pub fn read_house_records(model_dir: &Path) -> Result<Vec<HouseRecord>> {
    read_csv(&model_dir.join(HOUSES_FILE_NAME))
}

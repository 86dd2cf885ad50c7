//! Defines the `SimulationParameters` struct, which represents the contents of `model.toml`.
use crate::input::{
    deserialise_proportion, deserialise_proportion_nonzero, input_err_msg, read_toml,
};
use crate::simulation::ClearingMechanism;
use crate::units::{Dimensionless, Money};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const PARAMETERS_FILE_NAME: &str = "model.toml";

fn default_seed() -> u64 {
    0
}

/// Bounds and moments of the distribution consumer incomes are drawn from.
///
/// Incomes are sampled from a normal distribution centred on `average` with
/// `standard_deviation`, truncated to the `[minimum, maximum]` interval.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AnnualIncomeStatistics {
    /// Lower bound on sampled incomes
    pub minimum: Money,
    /// Centre of the income distribution
    pub average: Money,
    /// Spread of the income distribution
    pub standard_deviation: Money,
    /// Upper bound on sampled incomes
    pub maximum: Money,
}

/// Inclusive range the children count per consumer is drawn from.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ChildrenRange {
    /// Lower bound on the children count
    pub minimum: u32,
    /// Upper bound on the children count
    pub maximum: u32,
}

/// Represents the contents of the entire model file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SimulationParameters {
    /// Number of consumers to create
    pub consumers_number: u32,
    /// Number of years of savings accrual before the market is cleared
    pub years: u32,
    /// Annual income distribution consumers are sampled from
    pub annual_income: AnnualIncomeStatistics,
    /// Range the children count per consumer is drawn from
    pub children_range: ChildrenRange,
    /// Fraction of a house price required up front as down payment
    #[serde(deserialize_with = "deserialise_proportion_nonzero")]
    pub down_payment_percentage: Dimensionless,
    /// Fraction of annual income each consumer saves per year
    #[serde(deserialize_with = "deserialise_proportion")]
    pub saving_rate: Dimensionless,
    /// Interest rate applied to savings balances each year
    pub interest_rate: Dimensionless,
    /// Ordering policy for the market-clearing pass
    #[serde(default)]
    pub clearing_mechanism: ClearingMechanism,
    /// Seed for the random number generator, so runs are reproducible
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Check that the `consumers_number` parameter is valid
fn check_consumers_number(value: u32) -> Result<()> {
    ensure!(value > 0, "consumers_number cannot be zero");

    Ok(())
}

/// Check that the `annual_income` parameters are valid
fn check_annual_income(stats: &AnnualIncomeStatistics) -> Result<()> {
    ensure!(
        stats.minimum >= Money(0.0),
        "annual_income minimum cannot be negative"
    );
    ensure!(
        stats.minimum <= stats.average && stats.average <= stats.maximum,
        "annual_income bounds must satisfy minimum <= average <= maximum"
    );
    ensure!(
        stats.maximum.is_finite(),
        "annual_income maximum must be finite"
    );
    ensure!(
        stats.standard_deviation.is_finite() && stats.standard_deviation >= Money(0.0),
        "annual_income standard deviation must be a finite non-negative number"
    );

    Ok(())
}

/// Check that the `children_range` parameter is valid
fn check_children_range(range: &ChildrenRange) -> Result<()> {
    ensure!(
        range.minimum <= range.maximum,
        "children_range must satisfy minimum <= maximum"
    );

    Ok(())
}

/// Check that the `interest_rate` parameter is valid
fn check_interest_rate(value: Dimensionless) -> Result<()> {
    ensure!(
        value.is_finite() && value >= Dimensionless(0.0),
        "interest_rate must be a finite non-negative number"
    );

    Ok(())
}

impl SimulationParameters {
    /// Read the simulation parameters from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The parameters as a [`SimulationParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<SimulationParameters> {
        let file_path = model_dir.as_ref().join(PARAMETERS_FILE_NAME);
        let parameters: SimulationParameters = read_toml(&file_path)?;

        parameters
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(parameters)
    }

    /// Validate parameters after reading in file
    pub fn validate(&self) -> Result<()> {
        check_consumers_number(self.consumers_number)?;
        check_annual_income(&self.annual_income)?;
        check_children_range(&self.children_range)?;

        // down_payment_percentage and saving_rate are validated during deserialisation
        check_interest_rate(self.interest_rate)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn income_stats(minimum: f64, average: f64, maximum: f64) -> AnnualIncomeStatistics {
        AnnualIncomeStatistics {
            minimum: Money(minimum),
            average: Money(average),
            standard_deviation: Money(10000.0),
            maximum: Money(maximum),
        }
    }

    #[test]
    fn test_check_consumers_number() {
        assert!(check_consumers_number(1).is_ok());
        assert!(check_consumers_number(100).is_ok());
        assert!(check_consumers_number(0).is_err());
    }

    #[rstest]
    #[case(income_stats(30000.0, 60000.0, 150000.0), true)]
    #[case(income_stats(0.0, 0.0, 0.0), true)] // degenerate but ordered
    #[case(income_stats(-1.0, 60000.0, 150000.0), false)] // negative minimum
    #[case(income_stats(60000.0, 30000.0, 150000.0), false)] // average below minimum
    #[case(income_stats(30000.0, 200000.0, 150000.0), false)] // average above maximum
    #[case(income_stats(30000.0, 60000.0, f64::INFINITY), false)]
    fn test_check_annual_income(
        #[case] stats: AnnualIncomeStatistics,
        #[case] expected_valid: bool,
    ) {
        assert_eq!(check_annual_income(&stats).is_ok(), expected_valid);
    }

    #[test]
    fn test_check_annual_income_bad_standard_deviation() {
        let mut stats = income_stats(30000.0, 60000.0, 150000.0);
        stats.standard_deviation = Money(-1.0);
        assert_error!(
            check_annual_income(&stats),
            "annual_income standard deviation must be a finite non-negative number"
        );
    }

    #[test]
    fn test_check_children_range() {
        assert!(check_children_range(&ChildrenRange { minimum: 0, maximum: 5 }).is_ok());
        assert!(check_children_range(&ChildrenRange { minimum: 2, maximum: 2 }).is_ok());
        assert!(check_children_range(&ChildrenRange { minimum: 3, maximum: 2 }).is_err());
    }

    #[rstest]
    #[case(0.0, true)]
    #[case(0.05, true)]
    #[case(1.5, true)] // rates above 1 are unusual but not invalid
    #[case(-0.01, false)]
    #[case(f64::NAN, false)]
    #[case(f64::INFINITY, false)]
    fn test_check_interest_rate(#[case] value: f64, #[case] expected_valid: bool) {
        assert_eq!(
            check_interest_rate(Dimensionless(value)).is_ok(),
            expected_valid
        );
    }

    #[test]
    fn test_parameters_from_path() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(PARAMETERS_FILE_NAME)).unwrap();
            writeln!(
                file,
                "consumers_number = 100
years = 5
down_payment_percentage = 0.2
saving_rate = 0.3
interest_rate = 0.05
clearing_mechanism = \"income_order_descendant\"
seed = 42

[annual_income]
minimum = 30000.0
average = 60000.0
standard_deviation = 20000.0
maximum = 150000.0

[children_range]
minimum = 0
maximum = 5"
            )
            .unwrap();
        }

        let parameters = SimulationParameters::from_path(dir.path()).unwrap();
        assert_eq!(parameters.consumers_number, 100);
        assert_eq!(parameters.years, 5);
        assert_eq!(parameters.annual_income.average, Money(60000.0));
        assert_eq!(parameters.children_range.maximum, 5);
        assert_eq!(parameters.down_payment_percentage, Dimensionless(0.2));
        assert_eq!(
            parameters.clearing_mechanism,
            ClearingMechanism::IncomeOrderDescendant
        );
        assert_eq!(parameters.seed, 42);
    }

    #[test]
    fn test_parameters_from_path_defaults() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(PARAMETERS_FILE_NAME)).unwrap();
            writeln!(
                file,
                "consumers_number = 10
years = 3
down_payment_percentage = 0.2
saving_rate = 0.3
interest_rate = 0.05

[annual_income]
minimum = 30000.0
average = 60000.0
standard_deviation = 20000.0
maximum = 150000.0

[children_range]
minimum = 0
maximum = 3"
            )
            .unwrap();
        }

        let parameters = SimulationParameters::from_path(dir.path()).unwrap();
        assert_eq!(parameters.clearing_mechanism, ClearingMechanism::Random);
        assert_eq!(parameters.seed, 0);
    }

    #[test]
    fn test_parameters_from_path_invalid_proportion() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(PARAMETERS_FILE_NAME)).unwrap();
            writeln!(
                file,
                "consumers_number = 10
years = 3
down_payment_percentage = 0.0
saving_rate = 0.3
interest_rate = 0.05

[annual_income]
minimum = 30000.0
average = 60000.0
standard_deviation = 20000.0
maximum = 150000.0

[children_range]
minimum = 0
maximum = 3"
            )
            .unwrap();
        }

        // down_payment_percentage of zero is rejected during deserialisation
        assert!(SimulationParameters::from_path(dir.path()).is_err());
    }
}

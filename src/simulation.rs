//! Functionality for running the housing market simulation.
//!
//! A [`Simulation`] is driven through a fixed sequence of operations: build the housing market,
//! create the consumer population, accrue savings for the configured number of years, then clear
//! the market once. Each operation checks that its predecessor has run, so misuse fails fast
//! instead of corrupting state. All randomness flows through a generator seeded from the
//! simulation parameters, making every run reproducible.
use crate::consumer::{Consumer, Segment};
use crate::house::House;
use crate::id::ConsumerID;
use crate::input::HouseRecord;
use crate::market::HousingMarket;
use crate::output::write_results;
use crate::parameters::SimulationParameters;
use crate::units::{Dimensionless, Money};
use anyhow::{Context, Result, ensure};
use log::info;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::path::Path;

/// Savings every consumer starts with before accrual
const INITIAL_SAVINGS: Money = Money(0.0);

/// The policy determining the order in which consumers attempt purchases during market clearing.
///
/// Clearing is a single sequential greedy pass, so earlier consumers can exhaust the cheapest
/// matching houses before later ones are considered. The mechanism changes who gets priority,
/// not the per-consumer matching logic.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum ClearingMechanism {
    /// Consumers processed in a seeded random permutation
    #[default]
    #[string = "random"]
    Random,
    /// Highest income first: wealthier consumers get first choice
    #[string = "income_order_descendant"]
    IncomeOrderDescendant,
    /// Lowest income first
    #[string = "income_order_ascendant"]
    IncomeOrderAscendant,
    /// Largest savings balance first
    #[string = "savings_order_descendant"]
    SavingsOrderDescendant,
    /// Smallest savings balance first
    #[string = "savings_order_ascendant"]
    SavingsOrderAscendant,
}

/// Progress of a simulation through its operation sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Created,
    MarketCreated,
    ConsumersCreated,
    SavingsComputed,
    MarketCleared,
}

/// An agent-based housing market simulation run.
pub struct Simulation {
    parameters: SimulationParameters,
    records: Vec<HouseRecord>,
    rng: ChaCha8Rng,
    stage: Stage,
    housing_market: Option<HousingMarket>,
    consumers: Vec<Consumer>,
}

impl Simulation {
    /// Create a new simulation from parameters and raw house records.
    ///
    /// Nothing is sampled or built yet; the operations must be invoked in order, starting with
    /// [`Simulation::create_housing_market`].
    pub fn new(parameters: SimulationParameters, records: Vec<HouseRecord>) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(parameters.seed);
        Self {
            parameters,
            records,
            rng,
            stage: Stage::Created,
            housing_market: None,
            consumers: Vec::new(),
        }
    }

    /// Build the housing market from the raw input records.
    pub fn create_housing_market(&mut self) -> Result<()> {
        ensure!(
            self.stage == Stage::Created,
            "the housing market has already been created"
        );

        let houses = self
            .records
            .iter()
            .map(|record| {
                House::from_record(record)
                    .with_context(|| format!("invalid record for house {}", record.id))
            })
            .collect::<Result<Vec<_>>>()?;

        let market = HousingMarket::new(houses)?;
        info!("Created housing market with {} houses", market.len());

        self.housing_market = Some(market);
        self.stage = Stage::MarketCreated;
        Ok(())
    }

    /// Sample the consumer population.
    ///
    /// Incomes are drawn from the truncated normal distribution and children counts uniformly
    /// from the configured range; the segment follows from the children count. Savings start at
    /// zero and the saving and interest rates are copied from the parameters.
    pub fn create_consumers(&mut self) -> Result<()> {
        ensure!(
            self.stage == Stage::MarketCreated,
            "the housing market must be created before consumers"
        );

        let mut consumers = Vec::with_capacity(self.parameters.consumers_number as usize);
        for id in 0..self.parameters.consumers_number {
            let annual_income = self.sample_annual_income()?;
            let children_number = self.sample_children_number();
            consumers.push(Consumer {
                id: ConsumerID(id),
                annual_income,
                children_number,
                segment: Segment::for_children(children_number),
                savings: INITIAL_SAVINGS,
                saving_rate: self.parameters.saving_rate,
                interest_rate: self.parameters.interest_rate,
                house: None,
            });
        }

        info!("Created {} consumers", consumers.len());

        self.consumers = consumers;
        self.stage = Stage::ConsumersCreated;
        Ok(())
    }

    /// Accrue savings for every consumer over the configured number of years.
    ///
    /// Consumers are independent; there is no cross-consumer interaction.
    pub fn compute_consumers_savings(&mut self) -> Result<()> {
        ensure!(
            self.stage == Stage::ConsumersCreated,
            "consumers must be created before computing savings"
        );

        let years = self.parameters.years;
        for consumer in &mut self.consumers {
            consumer.compute_savings(years);
        }

        self.stage = Stage::SavingsComputed;
        Ok(())
    }

    /// Match consumers to houses with the configured clearing mechanism.
    ///
    /// The pass is strictly sequential: each consumer observes the availability mutations made by
    /// the consumers processed before it.
    pub fn clean_the_market(&mut self) -> Result<()> {
        ensure!(
            self.stage == Stage::SavingsComputed,
            "savings must be computed before cleaning the market"
        );

        let order = self.clearing_order();
        let down_payment_percentage = self.parameters.down_payment_percentage;
        let market = self
            .housing_market
            .as_mut()
            .context("the housing market has not been created")?;
        for index in order {
            self.consumers[index].buy_a_house(market, down_payment_percentage)?;
        }

        let matched = self.consumers.iter().filter(|c| c.house.is_some()).count();
        info!(
            "Matched {matched} of {} consumers to houses",
            self.consumers.len()
        );

        self.stage = Stage::MarketCleared;
        Ok(())
    }

    /// The fraction of consumers who own a house, in [0, 1].
    pub fn compute_owners_population_rate(&self) -> Result<Dimensionless> {
        ensure!(
            self.stage == Stage::MarketCleared,
            "the market must be cleaned before querying outcome metrics"
        );

        let owners = self.consumers.iter().filter(|c| c.house.is_some()).count();
        Ok(Dimensionless(owners as f64 / self.consumers.len() as f64))
    }

    /// The fraction of houses still available, in [0, 1].
    pub fn compute_houses_availability_rate(&self) -> Result<Dimensionless> {
        ensure!(
            self.stage == Stage::MarketCleared,
            "the market must be cleaned before querying outcome metrics"
        );

        let market = self
            .housing_market
            .as_ref()
            .context("the housing market has not been created")?;
        let available = market.houses().filter(|house| house.available).count();
        Ok(Dimensionless(available as f64 / market.len() as f64))
    }

    /// The consumer population, for external reporting collaborators.
    pub fn consumers(&self) -> &[Consumer] {
        &self.consumers
    }

    /// The housing market, if it has been created.
    pub fn housing_market(&self) -> Option<&HousingMarket> {
        self.housing_market.as_ref()
    }

    /// Draw an annual income from the truncated normal distribution.
    fn sample_annual_income(&mut self) -> Result<Money> {
        let stats = &self.parameters.annual_income;
        let normal = Normal::new(stats.average.value(), stats.standard_deviation.value())
            .context("invalid annual income distribution")?;

        // Resample until the draw falls inside the configured bounds. Parameter validation
        // guarantees the mean lies inside them, so this terminates.
        loop {
            let draw = normal.sample(&mut self.rng);
            if (stats.minimum.value()..=stats.maximum.value()).contains(&draw) {
                return Ok(Money(draw));
            }
        }
    }

    /// Draw a children count uniformly from the configured inclusive range.
    fn sample_children_number(&mut self) -> u32 {
        let range = &self.parameters.children_range;
        self.rng.gen_range(range.minimum..=range.maximum)
    }

    /// Resolve the order in which consumers are processed during market clearing.
    ///
    /// Sort-based mechanisms tie-break by ascending consumer ID so the order is deterministic.
    fn clearing_order(&mut self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.consumers.len()).collect();
        let consumers = &self.consumers;
        match self.parameters.clearing_mechanism {
            ClearingMechanism::Random => order.shuffle(&mut self.rng),
            ClearingMechanism::IncomeOrderDescendant => order.sort_by(|&a, &b| {
                let (ca, cb) = (&consumers[a], &consumers[b]);
                cb.annual_income
                    .value()
                    .total_cmp(&ca.annual_income.value())
                    .then_with(|| ca.id.cmp(&cb.id))
            }),
            ClearingMechanism::IncomeOrderAscendant => order.sort_by(|&a, &b| {
                let (ca, cb) = (&consumers[a], &consumers[b]);
                ca.annual_income
                    .value()
                    .total_cmp(&cb.annual_income.value())
                    .then_with(|| ca.id.cmp(&cb.id))
            }),
            ClearingMechanism::SavingsOrderDescendant => order.sort_by(|&a, &b| {
                let (ca, cb) = (&consumers[a], &consumers[b]);
                cb.savings
                    .value()
                    .total_cmp(&ca.savings.value())
                    .then_with(|| ca.id.cmp(&cb.id))
            }),
            ClearingMechanism::SavingsOrderAscendant => order.sort_by(|&a, &b| {
                let (ca, cb) = (&consumers[a], &consumers[b]);
                ca.savings
                    .value()
                    .total_cmp(&cb.savings.value())
                    .then_with(|| ca.id.cmp(&cb.id))
            }),
        }

        order
    }
}

/// Run a full simulation and write the results.
///
/// # Arguments:
///
/// * `parameters` - The simulation parameters
/// * `records` - Raw house records the market is built from
/// * `output_path` - The folder to which results will be written
pub fn run(
    parameters: SimulationParameters,
    records: Vec<HouseRecord>,
    output_path: &Path,
) -> Result<()> {
    let mut simulation = Simulation::new(parameters, records);
    simulation.create_housing_market()?;
    simulation.create_consumers()?;
    simulation.compute_consumers_savings()?;
    simulation.clean_the_market()?;

    let owners_rate = simulation.compute_owners_population_rate()?;
    let availability_rate = simulation.compute_houses_availability_rate()?;
    info!(
        "Owner population rate: {:.1}%",
        owners_rate.value() * 100.0
    );
    info!(
        "House availability rate: {:.1}%",
        availability_rate.value() * 100.0
    );

    write_results(output_path, &simulation)
}

#[cfg(test)]
impl Simulation {
    /// Build a simulation mid-run, with its population already in place.
    pub(crate) fn with_population(
        parameters: SimulationParameters,
        market: HousingMarket,
        consumers: Vec<Consumer>,
    ) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(parameters.seed);
        Self {
            parameters,
            records: Vec::new(),
            rng,
            stage: Stage::SavingsComputed,
            housing_market: Some(market),
            consumers,
        }
    }
}

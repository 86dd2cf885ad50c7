//! Houses are the units of inventory traded on the housing market.
use crate::id::HouseID;
use crate::input::HouseRecord;
use crate::units::{Area, Money, MoneyPerArea, round_to_cents};
use anyhow::{Result, ensure};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// Width of the window, in years, within which a house counts as new construction
const NEW_CONSTRUCTION_WINDOW: i32 = 5;

/// An ordinal rating of a house's condition
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    SerializeLabeledStringEnum,
    DeserializeLabeledStringEnum,
)]
pub enum QualityScore {
    /// Worst condition
    #[string = "poor"]
    Poor,
    /// Below-average condition
    #[string = "fair"]
    Fair,
    /// Average condition
    #[string = "average"]
    Average,
    /// Above-average condition
    #[string = "good"]
    Good,
    /// Best condition
    #[string = "excellent"]
    Excellent,
}

impl QualityScore {
    /// Interpret a raw condition indicator on a 1-10 scale.
    ///
    /// The indicator is halved and clamped into the five ordinal levels, so out-of-range values
    /// map to the nearest level rather than failing.
    pub fn from_indicator(indicator: u32) -> Self {
        match (indicator / 2).clamp(1, 5) {
            1 => Self::Poor,
            2 => Self::Fair,
            3 => Self::Average,
            4 => Self::Good,
            _ => Self::Excellent,
        }
    }
}

/// A unit of inventory on the housing market
#[derive(Clone, Debug, PartialEq)]
pub struct House {
    /// Unique identifier for the house
    pub id: HouseID,
    /// Sale price of the house. Always greater than zero.
    pub price: Money,
    /// Living area of the house, in square feet. Always greater than zero.
    pub area: Area,
    /// Number of bedrooms
    pub bedrooms: u32,
    /// Year the house was built
    pub year_built: i32,
    /// Condition rating, unset until computed
    pub quality_score: Option<QualityScore>,
    /// Whether the house is still for sale
    pub available: bool,
}

impl House {
    /// Create a new [`House`], validating the price and area.
    pub fn new(
        id: HouseID,
        price: Money,
        area: Area,
        bedrooms: u32,
        year_built: i32,
        quality_score: Option<QualityScore>,
    ) -> Result<Self> {
        ensure!(
            price.is_finite() && price > Money(0.0),
            "house price must be a finite number greater than zero"
        );
        ensure!(
            area.is_finite() && area > Area(0.0),
            "house area must be a finite number greater than zero"
        );

        Ok(Self {
            id,
            price,
            area,
            bedrooms,
            year_built,
            quality_score,
            available: true,
        })
    }

    /// Build a [`House`] from a raw input record, interpreting its quality indicator.
    ///
    /// A missing indicator leaves the quality score unset; it can be derived later with
    /// [`House::get_quality_score`].
    pub fn from_record(record: &HouseRecord) -> Result<Self> {
        Self::new(
            record.id,
            record.price,
            record.area,
            record.bedrooms,
            record.year_built,
            record.quality.map(QualityScore::from_indicator),
        )
    }

    /// The house price per square foot of living area, rounded to two decimal places.
    pub fn calculate_price_per_square_foot(&self) -> Result<MoneyPerArea> {
        ensure!(
            self.area > Area(0.0),
            "house area must be greater than zero"
        );

        let price_per_area = self.price / self.area;
        Ok(MoneyPerArea(round_to_cents(price_per_area.value())))
    }

    /// Whether the house was built within the new-construction window (inclusive).
    pub fn is_new_construction(&self, current_year: i32) -> bool {
        current_year - self.year_built <= NEW_CONSTRUCTION_WINDOW
    }

    /// The house's quality score, assigning the default level first if it is unset.
    ///
    /// Idempotent: once a score is present, calling this again returns it unchanged.
    pub fn get_quality_score(&mut self) -> QualityScore {
        *self.quality_score.get_or_insert(QualityScore::Average)
    }

    /// Mark the house as sold. Selling an already-sold house is a no-op.
    pub fn sell_house(&mut self) {
        self.available = false;
    }
}

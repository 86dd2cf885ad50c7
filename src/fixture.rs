//! Fixtures for tests
use crate::consumer::{Consumer, Segment};
use crate::house::{House, QualityScore};
use crate::id::{ConsumerID, HouseID};
use crate::input::HouseRecord;
use crate::market::HousingMarket;
use crate::parameters::{AnnualIncomeStatistics, ChildrenRange, SimulationParameters};
use crate::simulation::ClearingMechanism;
use crate::units::{Area, Dimensionless, Money};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn house() -> House {
    House::new(
        HouseID(1),
        Money(200000.0),
        Area(2000.0),
        3,
        2010,
        Some(QualityScore::Good),
    )
    .unwrap()
}

#[fixture]
pub fn houses() -> Vec<House> {
    vec![
        House::new(
            HouseID(1),
            Money(300000.0),
            Area(1500.0),
            3,
            2020,
            Some(QualityScore::Excellent),
        )
        .unwrap(),
        House::new(
            HouseID(2),
            Money(250000.0),
            Area(1200.0),
            2,
            2018,
            Some(QualityScore::Good),
        )
        .unwrap(),
        House::new(
            HouseID(3),
            Money(400000.0),
            Area(1800.0),
            4,
            2019,
            Some(QualityScore::Excellent),
        )
        .unwrap(),
    ]
}

/// Raw records describing the same inventory as [`houses`]
#[fixture]
pub fn house_records() -> Vec<HouseRecord> {
    vec![
        HouseRecord {
            id: HouseID(1),
            price: Money(300000.0),
            area: Area(1500.0),
            bedrooms: 3,
            year_built: 2020,
            quality: Some(10),
        },
        HouseRecord {
            id: HouseID(2),
            price: Money(250000.0),
            area: Area(1200.0),
            bedrooms: 2,
            year_built: 2018,
            quality: Some(8),
        },
        HouseRecord {
            id: HouseID(3),
            price: Money(400000.0),
            area: Area(1800.0),
            bedrooms: 4,
            year_built: 2019,
            quality: Some(10),
        },
    ]
}

#[fixture]
pub fn market(houses: Vec<House>) -> HousingMarket {
    HousingMarket::new(houses).unwrap()
}

#[fixture]
pub fn consumer() -> Consumer {
    Consumer {
        id: ConsumerID(1),
        annual_income: Money(80000.0),
        children_number: 2,
        segment: Segment::Average,
        savings: Money(20000.0),
        saving_rate: Dimensionless(0.3),
        interest_rate: Dimensionless(0.05),
        house: None,
    }
}

#[fixture]
pub fn parameters() -> SimulationParameters {
    SimulationParameters {
        consumers_number: 10,
        years: 5,
        annual_income: AnnualIncomeStatistics {
            minimum: Money(30000.0),
            average: Money(75000.0),
            standard_deviation: Money(15000.0),
            maximum: Money(150000.0),
        },
        children_range: ChildrenRange {
            minimum: 0,
            maximum: 3,
        },
        down_payment_percentage: Dimensionless(0.2),
        saving_rate: Dimensionless(0.3),
        interest_rate: Dimensionless(0.05),
        clearing_mechanism: ClearingMechanism::IncomeOrderDescendant,
        seed: 42,
    }
}

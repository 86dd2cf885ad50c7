//! Consumers are the buyer agents of the simulation.
use crate::house::House;
use crate::id::{ConsumerID, HouseID};
use crate::market::HousingMarket;
use crate::units::{Dimensionless, Money};
use anyhow::{Result, ensure};
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// Minimum number of bedrooms a family household will consider
const FAMILY_MIN_BEDROOMS: u32 = 3;

/// Market segment a consumer belongs to.
///
/// The segment drives which houses satisfy the consumer's requirements during market clearing.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, SerializeLabeledStringEnum, DeserializeLabeledStringEnum,
)]
pub enum Segment {
    /// A household with children; only houses with enough bedrooms qualify
    #[string = "family"]
    Family,
    /// A household without children; no bedroom requirement
    #[string = "individual"]
    Individual,
    /// Neutral segment with no requirements beyond price
    #[string = "average"]
    Average,
}

impl Segment {
    /// The segment assigned to a consumer with the given number of children.
    pub fn for_children(children_number: u32) -> Self {
        if children_number == 0 {
            Self::Individual
        } else {
            Self::Family
        }
    }

    /// Whether the given house satisfies this segment's requirements.
    pub fn accepts(self, house: &House) -> bool {
        match self {
            Self::Family => house.bedrooms >= FAMILY_MIN_BEDROOMS,
            Self::Individual | Self::Average => true,
        }
    }
}

/// A buyer agent: accrues savings across years and attempts a one-time purchase.
#[derive(Clone, Debug, PartialEq)]
pub struct Consumer {
    /// Unique identifier for the consumer
    pub id: ConsumerID,
    /// Gross annual income
    pub annual_income: Money,
    /// Number of children in the household
    pub children_number: u32,
    /// Market segment, driving the house requirement policy
    pub segment: Segment,
    /// Accumulated savings
    pub savings: Money,
    /// Fraction of annual income saved each year
    pub saving_rate: Dimensionless,
    /// Interest rate applied to the savings balance each year
    pub interest_rate: Dimensionless,
    /// Handle of the house bought during market clearing, if any.
    ///
    /// Once set it never changes: a purchase is final and one-shot per simulation run.
    pub house: Option<HouseID>,
}

impl Consumer {
    /// Accrue savings over the given number of years.
    ///
    /// Each year the balance earns interest and the year's deposit is added:
    /// `savings = savings * (1 + interest_rate) + annual_income * saving_rate`.
    ///
    /// Applied iteratively rather than in closed form, as the rates may become per-period inputs.
    pub fn compute_savings(&mut self, years: u32) {
        for _ in 0..years {
            self.savings = self.savings * (Dimensionless(1.0) + self.interest_rate)
                + self.annual_income * self.saving_rate;
        }
    }

    /// Attempt a one-time purchase against the market.
    ///
    /// The consumer can only consider houses whose required down payment is covered by current
    /// savings, i.e. houses priced at most `savings / down_payment_percentage`. The cheapest
    /// qualifying house is bought; finding none is a valid outcome, not an error, and leaves
    /// `house` unset. A consumer who already owns a house never re-enters the buying process.
    pub fn buy_a_house(
        &mut self,
        market: &mut HousingMarket,
        down_payment_percentage: Dimensionless,
    ) -> Result<()> {
        if self.house.is_some() {
            return Ok(());
        }

        ensure!(
            down_payment_percentage > Dimensionless(0.0),
            "down payment percentage must be greater than zero"
        );

        let max_price = self.savings / down_payment_percentage;
        let chosen = market
            .get_houses_that_meet_requirements(max_price, self.segment)
            .first()
            .map(|house| house.id);

        if let Some(id) = chosen {
            market.get_house_by_id_mut(id)?.sell_house();
            self.house = Some(id);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{assert_error, consumer, house, market};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_compute_savings(mut consumer: Consumer) {
        // savings=20000, saving_rate=0.3, interest_rate=0.05, income=80000: each year the balance
        // earns 5% and a 24000 deposit is added
        let mut expected = 20000.0;
        for _ in 0..5 {
            let previous = consumer.savings;
            consumer.compute_savings(1);
            expected = expected * 1.05 + 24000.0;

            // Strictly increasing every period
            assert!(consumer.savings > previous);
            assert_approx_eq!(f64, consumer.savings.value(), expected, epsilon = 1e-6);
        }

        assert_approx_eq!(f64, consumer.savings.value(), 158140.78125, epsilon = 1e-6);
    }

    #[rstest]
    fn test_compute_savings_matches_single_call(mut consumer: Consumer) {
        let mut yearly = consumer.clone();
        consumer.compute_savings(5);
        for _ in 0..5 {
            yearly.compute_savings(1);
        }
        assert_eq!(consumer.savings, yearly.savings);
    }

    #[rstest]
    fn test_compute_savings_zero_years(mut consumer: Consumer) {
        consumer.compute_savings(0);
        assert_eq!(consumer.savings, Money(20000.0));
    }

    #[rstest]
    fn test_buy_a_house_picks_cheapest(mut consumer: Consumer, mut market: HousingMarket) {
        // Ceiling of 60000 / 0.2 = 300000 covers houses 1 and 2; house 2 is cheaper
        consumer.savings = Money(60000.0);
        consumer.buy_a_house(&mut market, Dimensionless(0.2)).unwrap();

        assert_eq!(consumer.house, Some(HouseID(2)));
        assert!(!market.get_house_by_id(HouseID(2)).unwrap().available);
        assert!(market.get_house_by_id(HouseID(1)).unwrap().available);
    }

    #[rstest]
    fn test_buy_a_house_respects_segment(mut consumer: Consumer, mut market: HousingMarket) {
        // A family skips the cheaper two-bedroom house
        consumer.segment = Segment::Family;
        consumer.savings = Money(100000.0);
        consumer.buy_a_house(&mut market, Dimensionless(0.2)).unwrap();

        assert_eq!(consumer.house, Some(HouseID(1)));
        assert!(market.get_house_by_id(HouseID(2)).unwrap().available);
    }

    #[rstest]
    fn test_buy_a_house_unaffordable(mut consumer: Consumer, mut market: HousingMarket) {
        consumer.savings = Money(1000.0);
        consumer.buy_a_house(&mut market, Dimensionless(0.2)).unwrap();

        assert_eq!(consumer.house, None);
        assert!(market.houses().all(|house| house.available));
    }

    #[rstest]
    fn test_buy_a_house_is_one_shot(mut consumer: Consumer, mut market: HousingMarket) {
        consumer.savings = Money(60000.0);
        consumer.buy_a_house(&mut market, Dimensionless(0.2)).unwrap();
        assert_eq!(consumer.house, Some(HouseID(2)));

        // A second attempt with a far larger budget must not replace the owned house
        consumer.savings = Money(1000000.0);
        consumer.buy_a_house(&mut market, Dimensionless(0.2)).unwrap();
        assert_eq!(consumer.house, Some(HouseID(2)));
    }

    #[rstest]
    fn test_buy_a_house_invalid_down_payment(mut consumer: Consumer, mut market: HousingMarket) {
        assert_error!(
            consumer.buy_a_house(&mut market, Dimensionless(0.0)),
            "down payment percentage must be greater than zero"
        );
    }

    #[rstest]
    #[case(0, Segment::Individual)]
    #[case(1, Segment::Family)]
    #[case(4, Segment::Family)]
    fn test_segment_for_children(#[case] children_number: u32, #[case] expected: Segment) {
        assert_eq!(Segment::for_children(children_number), expected);
    }

    #[rstest]
    fn test_segment_accepts(house: House) {
        // The fixture house has three bedrooms
        assert!(Segment::Family.accepts(&house));
        assert!(Segment::Individual.accepts(&house));
        assert!(Segment::Average.accepts(&house));

        let mut small = house;
        small.bedrooms = 2;
        assert!(!Segment::Family.accepts(&small));
        assert!(Segment::Individual.accepts(&small));
    }
}

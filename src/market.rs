//! The housing market holds the fixed inventory of houses offered to consumers.
use crate::consumer::Segment;
use crate::house::House;
use crate::id::HouseID;
use crate::units::{Money, round_to_cents};
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexMap;
use itertools::Itertools;

/// An immutable-membership collection of houses.
///
/// Membership is fixed at construction: no house is ever added or removed, only each house's
/// internal mutable state (its availability flag and quality score) changes.
#[derive(Clone, Debug, PartialEq)]
pub struct HousingMarket {
    houses: IndexMap<HouseID, House>,
}

impl HousingMarket {
    /// Create a market from a collection of houses.
    ///
    /// Duplicate house IDs and an empty inventory are rejected.
    pub fn new<I>(houses: I) -> Result<Self>
    where
        I: IntoIterator<Item = House>,
    {
        let mut map = IndexMap::new();
        for house in houses {
            let id = house.id;
            if map.insert(id, house).is_some() {
                bail!("duplicate house ID {id}");
            }
        }

        ensure!(!map.is_empty(), "housing market must contain at least one house");

        Ok(Self { houses: map })
    }

    /// Iterate over every house in the market, in input order.
    pub fn houses(&self) -> impl Iterator<Item = &House> {
        self.houses.values()
    }

    /// The total number of houses in the market, sold or not.
    pub fn len(&self) -> usize {
        self.houses.len()
    }

    /// Whether the market holds no houses. Always false for a constructed market.
    pub fn is_empty(&self) -> bool {
        self.houses.is_empty()
    }

    /// Look up a house by its ID.
    pub fn get_house_by_id(&self, id: HouseID) -> Result<&House> {
        self.houses
            .get(&id)
            .with_context(|| format!("no house with ID {id}"))
    }

    /// Look up a house by its ID, mutably.
    pub fn get_house_by_id_mut(&mut self, id: HouseID) -> Result<&mut House> {
        self.houses
            .get_mut(&id)
            .with_context(|| format!("no house with ID {id}"))
    }

    /// The mean price over all houses, or over the subset with the given bedroom count.
    ///
    /// Rounded to two decimal places. Requesting the average for a bedroom count no house has is
    /// an error.
    pub fn calculate_average_price(&self, bedrooms: Option<u32>) -> Result<Money> {
        let prices: Vec<Money> = self
            .houses
            .values()
            .filter(|house| bedrooms.is_none_or(|count| house.bedrooms == count))
            .map(|house| house.price)
            .collect();

        if let Some(count) = bedrooms {
            ensure!(
                !prices.is_empty(),
                "no houses with {count} bedrooms on the market"
            );
        }

        let total = prices.iter().fold(Money(0.0), |acc, price| acc + *price);
        Ok(Money(round_to_cents(total.value() / prices.len() as f64)))
    }

    /// All available houses affordable at `max_price` that satisfy the segment's requirements.
    ///
    /// Ordered ascending by price, ties broken by ascending ID, so the result is deterministic
    /// and its first element is the cheapest qualifying house.
    pub fn get_houses_that_meet_requirements(
        &self,
        max_price: Money,
        segment: Segment,
    ) -> Vec<&House> {
        self.houses
            .values()
            .filter(|house| house.available && house.price <= max_price && segment.accepts(house))
            .sorted_by(|a, b| {
                a.price
                    .value()
                    .total_cmp(&b.price.value())
                    .then_with(|| a.id.cmp(&b.id))
            })
            .collect()
    }
}

//! Code for handling entity identifiers.

macro_rules! define_id_type {
    ($name:ident) => {
        /// A numeric ID type (e.g. `HouseID`, `ConsumerID`)
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            std::hash::Hash,
            serde::Serialize,
            serde::Deserialize,
            derive_more::Display,
        )]
        #[display("{_0}")]
        pub struct $name(pub u32);

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                $name(id)
            }
        }
    };
}

define_id_type!(HouseID);
define_id_type!(ConsumerID);

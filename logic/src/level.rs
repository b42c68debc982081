//! Tri-state logic levels and input-vector packing.
//!
//! A net carries exactly one [`Level`] at any simulated instant.  The
//! third state, [`Level::Undefined`], represents a net which is
//! floating: nothing has driven it yet, or nothing is attached to it
//! at all.  Undefined is a value, not an error; devices define how it
//! propagates through them.
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

/// The value carried by a signal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Level {
    Low,
    High,
    /// Floating or not yet driven.
    Undefined,
}

impl Level {
    #[must_use]
    pub fn is_low(&self) -> bool {
        matches!(self, Level::Low)
    }

    #[must_use]
    pub fn is_high(&self) -> bool {
        matches!(self, Level::High)
    }

    #[must_use]
    pub fn is_defined(&self) -> bool {
        !matches!(self, Level::Undefined)
    }

    /// Logical inversion; undefined stays undefined.
    #[must_use]
    pub fn invert(&self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
            Level::Undefined => Level::Undefined,
        }
    }

    #[must_use]
    pub fn from_bool(high: bool) -> Level {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }

    #[must_use]
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Level::Low => Some(false),
            Level::High => Some(true),
            Level::Undefined => None,
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            Level::Low => "0",
            Level::High => "1",
            Level::Undefined => "x",
        })
    }
}

/// Packs an ordered slice of levels into a table index, least
/// significant input first.  The declared input order of a device
/// type fixes the packing order for its whole lifetime.
///
/// Returns `None` when any level in the slice is undefined; a packed
/// index only exists for a fully defined input vector.
#[must_use]
pub fn pack(levels: &[Level]) -> Option<usize> {
    let mut packed: usize = 0;
    for (position, level) in levels.iter().enumerate() {
        match level.to_bool() {
            Some(true) => {
                packed |= 1 << position;
            }
            Some(false) => (),
            None => {
                return None;
            }
        }
    }
    Some(packed)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use test_strategy::proptest;

    use super::{pack, Level};

    fn any_level() -> impl Strategy<Value = Level> {
        prop_oneof![
            Just(Level::Low),
            Just(Level::High),
            Just(Level::Undefined)
        ]
    }

    fn defined_level() -> impl Strategy<Value = Level> {
        prop_oneof![Just(Level::Low), Just(Level::High)]
    }

    #[test]
    fn test_invert() {
        assert_eq!(Level::Low.invert(), Level::High);
        assert_eq!(Level::High.invert(), Level::Low);
        assert_eq!(Level::Undefined.invert(), Level::Undefined);
    }

    #[test]
    fn test_display() {
        assert_eq!(Level::Low.to_string(), "0");
        assert_eq!(Level::High.to_string(), "1");
        assert_eq!(Level::Undefined.to_string(), "x");
    }

    #[test]
    fn test_pack_order_is_lsb_first() {
        assert_eq!(pack(&[Level::High, Level::Low]), Some(1));
        assert_eq!(pack(&[Level::Low, Level::High]), Some(2));
        assert_eq!(
            pack(&[Level::High, Level::High, Level::Low, Level::High]),
            Some(0b1011)
        );
    }

    #[test]
    fn test_pack_empty() {
        assert_eq!(pack(&[]), Some(0));
    }

    #[test]
    fn test_pack_undefined_input_has_no_index() {
        assert_eq!(pack(&[Level::High, Level::Undefined]), None);
        assert_eq!(pack(&[Level::Undefined]), None);
    }

    #[proptest]
    fn pack_round_trips_defined_vectors(
        #[strategy(proptest::collection::vec(defined_level(), 0..12))] levels: Vec<Level>,
    ) {
        let packed = pack(&levels).expect("defined vectors always pack");
        for (position, level) in levels.iter().enumerate() {
            assert_eq!(Level::from_bool(packed & (1 << position) != 0), *level);
        }
    }

    #[proptest]
    fn pack_rejects_any_undefined(
        #[strategy(proptest::collection::vec(any_level(), 1..12))] levels: Vec<Level>,
    ) {
        let has_undefined = levels.iter().any(|level| !level.is_defined());
        assert_eq!(pack(&levels).is_none(), has_undefined);
    }
}

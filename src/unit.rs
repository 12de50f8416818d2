//! Physical units and unit sets.
//!
//! Every quantity has a fixed internal standard unit (metres for distance and
//! altitude, metres per second for speed). A [`Unit`] carries the multiplier
//! that converts *from* the standard *to* itself, so the standard unit of each
//! kind has multiplier 1.0. Units are immutable value objects created once and
//! copied freely.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The physical quantity a unit measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitKind {
    Distance,
    Altitude,
    Speed,
}

/// A single unit of measure with its conversion factor from the standard unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    /// Multiplier converting a value in the standard unit into this unit
    pub mult_factor_from_std: f64,
    pub kind: UnitKind,
    /// Stable identifier, also used for (de)serialization
    pub name_key: &'static str,
}

const FEET_PER_METRE: f64 = 1.0 / 0.3048;
const METRES_PER_MILE: f64 = 1609.344;
const METRES_PER_NAUTICAL_MILE: f64 = 1852.0;

impl Unit {
    pub const METRES: Unit = Unit {
        mult_factor_from_std: 1.0,
        kind: UnitKind::Altitude,
        name_key: "units.metres",
    };
    pub const FEET: Unit = Unit {
        mult_factor_from_std: FEET_PER_METRE,
        kind: UnitKind::Altitude,
        name_key: "units.feet",
    };
    pub const KILOMETRES: Unit = Unit {
        mult_factor_from_std: 0.001,
        kind: UnitKind::Distance,
        name_key: "units.kilometres",
    };
    pub const MILES: Unit = Unit {
        mult_factor_from_std: 1.0 / METRES_PER_MILE,
        kind: UnitKind::Distance,
        name_key: "units.miles",
    };
    pub const NAUTICAL_MILES: Unit = Unit {
        mult_factor_from_std: 1.0 / METRES_PER_NAUTICAL_MILE,
        kind: UnitKind::Distance,
        name_key: "units.nauticalmiles",
    };
    pub const METRES_PER_SEC: Unit = Unit {
        mult_factor_from_std: 1.0,
        kind: UnitKind::Speed,
        name_key: "units.metrespersec",
    };
    pub const KILOMETRES_PER_HOUR: Unit = Unit {
        mult_factor_from_std: 3.6,
        kind: UnitKind::Speed,
        name_key: "units.kmperhour",
    };
    pub const MILES_PER_HOUR: Unit = Unit {
        mult_factor_from_std: 3600.0 / METRES_PER_MILE,
        kind: UnitKind::Speed,
        name_key: "units.milesperhour",
    };
    pub const KNOTS: Unit = Unit {
        mult_factor_from_std: 3600.0 / METRES_PER_NAUTICAL_MILE,
        kind: UnitKind::Speed,
        name_key: "units.knots",
    };
    pub const FEET_PER_SEC: Unit = Unit {
        mult_factor_from_std: FEET_PER_METRE,
        kind: UnitKind::Speed,
        name_key: "units.feetpersec",
    };

    /// All known units, used for name-key lookup.
    const ALL: [Unit; 10] = [
        Unit::METRES,
        Unit::FEET,
        Unit::KILOMETRES,
        Unit::MILES,
        Unit::NAUTICAL_MILES,
        Unit::METRES_PER_SEC,
        Unit::KILOMETRES_PER_HOUR,
        Unit::MILES_PER_HOUR,
        Unit::KNOTS,
        Unit::FEET_PER_SEC,
    ];

    /// Look up a unit by its stable name key.
    pub fn from_name_key(name_key: &str) -> Option<Unit> {
        Unit::ALL.iter().find(|u| u.name_key == name_key).copied()
    }

    /// True if this is the standard unit of its kind.
    pub fn is_standard(&self) -> bool {
        self.mult_factor_from_std == 1.0
    }
}

// Units serialize as their name key so configurations stay readable and the
// conversion factors can never drift from the compiled-in constants.
impl Serialize for Unit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name_key)
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Unit, D::Error> {
        let key = String::deserialize(deserializer)?;
        Unit::from_name_key(&key)
            .ok_or_else(|| D::Error::custom(format!("unknown unit '{}'", key)))
    }
}

/// The currently selected units for each displayed quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitSet {
    pub distance: Unit,
    pub altitude: Unit,
    pub speed: Unit,
    pub vertical_speed: Unit,
}

impl UnitSet {
    pub const METRIC: UnitSet = UnitSet {
        distance: Unit::KILOMETRES,
        altitude: Unit::METRES,
        speed: Unit::KILOMETRES_PER_HOUR,
        vertical_speed: Unit::METRES_PER_SEC,
    };

    pub const IMPERIAL: UnitSet = UnitSet {
        distance: Unit::MILES,
        altitude: Unit::FEET,
        speed: Unit::MILES_PER_HOUR,
        vertical_speed: Unit::FEET_PER_SEC,
    };

    pub const NAUTICAL: UnitSet = UnitSet {
        distance: Unit::NAUTICAL_MILES,
        altitude: Unit::FEET,
        speed: Unit::KNOTS,
        vertical_speed: Unit::FEET_PER_SEC,
    };
}

impl Default for UnitSet {
    fn default() -> Self {
        UnitSet::METRIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_units() {
        assert!(Unit::METRES.is_standard());
        assert!(Unit::METRES_PER_SEC.is_standard());
        assert!(!Unit::FEET.is_standard());
    }

    #[test]
    fn test_conversion_factors() {
        // 1 metre is roughly 3.28 feet
        assert!((Unit::FEET.mult_factor_from_std - 3.2808).abs() < 0.001);
        // 1 m/s is 3.6 km/h
        assert_eq!(Unit::KILOMETRES_PER_HOUR.mult_factor_from_std, 3.6);
        // 1 m/s is roughly 1.944 knots
        assert!((Unit::KNOTS.mult_factor_from_std - 1.9438).abs() < 0.001);
    }

    #[test]
    fn test_name_key_lookup() {
        assert_eq!(Unit::from_name_key("units.metres"), Some(Unit::METRES));
        assert_eq!(Unit::from_name_key("units.knots"), Some(Unit::KNOTS));
        assert_eq!(Unit::from_name_key("units.cubits"), None);
    }

    #[test]
    fn test_unit_serde_round_trip() {
        let json = serde_json::to_string(&UnitSet::IMPERIAL).unwrap();
        assert!(json.contains("units.miles"));
        let back: UnitSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UnitSet::IMPERIAL);
    }
}

use serde::{Deserialize, Serialize};

/// Length units a caller may request tolerances or results in.
///
/// Variants are ordered the way the host presents them; [`DistanceUnit::ALL`]
/// preserves that order so unit pickers can iterate it directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    Meters,
    Kilometers,
    Yards,
    Feet,
    NauticalMiles,
    Miles,
}

impl DistanceUnit {
    pub const ALL: [DistanceUnit; 6] = [
        DistanceUnit::Meters,
        DistanceUnit::Kilometers,
        DistanceUnit::Yards,
        DistanceUnit::Feet,
        DistanceUnit::NauticalMiles,
        DistanceUnit::Miles,
    ];

    /// Multiplier taking a length in meters into this unit.
    #[inline]
    pub const fn per_meter(&self) -> f64 {
        match self {
            DistanceUnit::Meters => 1.0,
            DistanceUnit::Kilometers => 0.001,
            DistanceUnit::Yards => 1.0936132983377078,
            DistanceUnit::Feet => 3.280839895013123,
            DistanceUnit::NauticalMiles => 0.0005399568034557236,
            DistanceUnit::Miles => 0.0006213711922373339,
        }
    }

    /// Short label suitable for result readouts.
    pub const fn label(&self) -> &'static str {
        match self {
            DistanceUnit::Meters => "m",
            DistanceUnit::Kilometers => "Km",
            DistanceUnit::Yards => "y",
            DistanceUnit::Feet => "ft",
            DistanceUnit::NauticalMiles => "NM",
            DistanceUnit::Miles => "mi",
        }
    }
}

/// Converts a length in meters into `unit`.
///
/// `None` means "no conversion requested" and returns the value unchanged,
/// which is the degraded path callers take when the measuring frame's base
/// unit is not meters.
#[inline]
pub fn convert(value_in_meters: f64, unit: Option<DistanceUnit>) -> f64 {
    match unit {
        Some(unit) => value_in_meters * unit.per_meter(),
        None => value_in_meters,
    }
}

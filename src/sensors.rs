//! Identifiers of the readings exposed by i-regul heat pumps.
//!
//! This is a flat lookup table from a descriptive name to the wire identifier
//! used as key in a [`Snapshot`](crate::Snapshot). The client itself does not
//! need it; any identifier string can be passed to
//! [`Client::get_value`](crate::Client::get_value).
//!
//! | Reading | Identifier | Kind |
//! |---------|------------|------|
//! | [`Sensor::OutsideTemperature`] | `A@3&valeur` | °C |
//! | [`Sensor::HotWaterTemperature`] | `A@1&valeur` | °C |
//! | [`Sensor::OtherEnergy`] .. [`Sensor::EnergyCounter`] | `M@20&valeur` .. `M@27&valeur` | kWh |
//! | [`BinarySensor`] | `O@<n>&valeur` | on/off |
//!
//! # Example
//!
//! ```
//! use iregul::{BinarySensor, Sensor};
//!
//! assert_eq!(Sensor::OutsideTemperature.id(), "A@3&valeur");
//! assert_eq!("O@3&valeur".parse::<BinarySensor>(), Ok(BinarySensor::Compressor));
//! ```

use std::fmt;
use std::str::FromStr;

/// Numeric readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sensor {
    /// Outside temperature.
    OutsideTemperature,
    /// Domestic hot water temperature.
    HotWaterTemperature,
    /// Energy consumed by auxiliary functions.
    OtherEnergy,
    /// Energy consumed for heating.
    HeatingEnergy,
    /// Energy consumed for cooling.
    CoolingEnergy,
    /// Energy consumed for domestic hot water.
    HotWaterEnergy,
    /// Energy consumed for defrosting.
    DefrostEnergy,
    /// Total energy consumed.
    TotalEnergy,
    /// Energy meter reading.
    EnergyCounter,
}

impl Sensor {
    /// All numeric readings.
    pub const ALL: [Sensor; 9] = [
        Sensor::OutsideTemperature,
        Sensor::HotWaterTemperature,
        Sensor::OtherEnergy,
        Sensor::HeatingEnergy,
        Sensor::CoolingEnergy,
        Sensor::HotWaterEnergy,
        Sensor::DefrostEnergy,
        Sensor::TotalEnergy,
        Sensor::EnergyCounter,
    ];

    /// Returns the wire identifier.
    pub const fn id(self) -> &'static str {
        match self {
            Sensor::OutsideTemperature => "A@3&valeur",
            Sensor::HotWaterTemperature => "A@1&valeur",
            Sensor::OtherEnergy => "M@20&valeur",
            Sensor::HeatingEnergy => "M@21&valeur",
            Sensor::CoolingEnergy => "M@22&valeur",
            Sensor::HotWaterEnergy => "M@23&valeur",
            Sensor::DefrostEnergy => "M@25&valeur",
            Sensor::TotalEnergy => "M@26&valeur",
            Sensor::EnergyCounter => "M@27&valeur",
        }
    }
}

/// On/off readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinarySensor {
    /// Domestic hot water production.
    HotWaterProduction,
    /// Backup heater for domestic hot water.
    HotWaterBackup,
    /// External function input.
    ExternalFunction,
    /// Domestic hot water recirculation.
    HotWaterRecirculation,
    /// Compressor.
    Compressor,
    /// Expansion valve regulator.
    Regulator,
    /// Captor circuit.
    Captor,
    /// Heating/cooling production.
    HeatingCoolingProduction,
    /// Heating/cooling distribution.
    HeatingCoolingSupply,
}

impl BinarySensor {
    /// All on/off readings.
    pub const ALL: [BinarySensor; 9] = [
        BinarySensor::HotWaterProduction,
        BinarySensor::HotWaterBackup,
        BinarySensor::ExternalFunction,
        BinarySensor::HotWaterRecirculation,
        BinarySensor::Compressor,
        BinarySensor::Regulator,
        BinarySensor::Captor,
        BinarySensor::HeatingCoolingProduction,
        BinarySensor::HeatingCoolingSupply,
    ];

    /// Returns the wire identifier.
    pub const fn id(self) -> &'static str {
        match self {
            BinarySensor::HotWaterProduction => "O@1&valeur",
            BinarySensor::HotWaterBackup => "O@7&valeur",
            BinarySensor::ExternalFunction => "O@25&valeur",
            BinarySensor::HotWaterRecirculation => "O@5&valeur",
            BinarySensor::Compressor => "O@3&valeur",
            BinarySensor::Regulator => "O@4&valeur",
            BinarySensor::Captor => "O@8&valeur",
            BinarySensor::HeatingCoolingProduction => "O@26&valeur",
            BinarySensor::HeatingCoolingSupply => "O@6&valeur",
        }
    }
}

/// Error returned when parsing an identifier that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownIdentifier(
    /// The identifier that was not recognized.
    pub String,
);

impl fmt::Display for UnknownIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown identifier '{}'", self.0)
    }
}

impl std::error::Error for UnknownIdentifier {}

macro_rules! impl_identifier {
    ($t:ty) => {
        impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.id())
            }
        }

        impl FromStr for $t {
            type Err = UnknownIdentifier;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$t>::ALL
                    .into_iter()
                    .find(|sensor| sensor.id() == s)
                    .ok_or_else(|| UnknownIdentifier(s.to_string()))
            }
        }
    };
}

impl_identifier!(Sensor);
impl_identifier!(BinarySensor);

//! Unit-aware values for the boundary of unit-aware states.
//!
//! A [`Measured`] is a magnitude paired with a [`Unit`]. Every unit belongs to a
//! [`Dimension`] and converts to that dimension's SI unit through a scale and an
//! offset (only temperatures carry an offset).
//!
//! Registries store the canonical unit of each state variable as text, exactly as
//! users write it (`"Pa"`, `"J/kg/K"`, `"m**3/kg"`, `""`). [`Unit::parse`] is the single
//! parsing boundary for those strings and for user input like `"0 degC"` or `"50 %"`.

use pstate_core::round_to;
use std::fmt;
use std::str::FromStr;

/// Dimension family of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Absolute temperature (SI: K)
    Temperature,
    /// Absolute pressure (SI: Pa)
    Pressure,
    /// Mass density (SI: kg/m³)
    Density,
    /// Specific enthalpy / internal energy (SI: J/kg)
    SpecificEnergy,
    /// Specific entropy / specific heat (SI: J/(kg·K))
    SpecificEntropy,
    /// Specific volume (SI: m³/kg)
    SpecificVolume,
    /// Speed of sound (SI: m/s)
    Velocity,
    /// Thermal conductivity (SI: W/(m·K))
    ThermalConductivity,
    /// Molar mass (SI: kg/mol)
    MolarMass,
    /// Dynamic viscosity (SI: Pa·s)
    DynamicViscosity,
    /// Ratios, fractions, quality
    Dimensionless,
}

impl Dimension {
    /// The SI unit magnitudes of this dimension are stored in.
    pub fn si_unit(self) -> Unit {
        match self {
            Self::Temperature => Unit::Kelvin,
            Self::Pressure => Unit::Pascal,
            Self::Density => Unit::KilogramPerCubicMeter,
            Self::SpecificEnergy => Unit::JoulePerKilogram,
            Self::SpecificEntropy => Unit::JoulePerKilogramKelvin,
            Self::SpecificVolume => Unit::CubicMeterPerKilogram,
            Self::Velocity => Unit::MeterPerSecond,
            Self::ThermalConductivity => Unit::WattPerMeterKelvin,
            Self::MolarMass => Unit::KilogramPerMole,
            Self::DynamicViscosity => Unit::PascalSecond,
            Self::Dimensionless => Unit::Dimensionless,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Temperature => write!(f, "Temperature"),
            Self::Pressure => write!(f, "Pressure"),
            Self::Density => write!(f, "Density"),
            Self::SpecificEnergy => write!(f, "Specific Energy"),
            Self::SpecificEntropy => write!(f, "Specific Entropy"),
            Self::SpecificVolume => write!(f, "Specific Volume"),
            Self::Velocity => write!(f, "Velocity"),
            Self::ThermalConductivity => write!(f, "Thermal Conductivity"),
            Self::MolarMass => write!(f, "Molar Mass"),
            Self::DynamicViscosity => write!(f, "Dynamic Viscosity"),
            Self::Dimensionless => write!(f, "Dimensionless"),
        }
    }
}

/// Error in unit parsing or conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitError {
    /// Input text did not parse to a number + optional unit
    ParseError(String),
    /// Unit symbol not recognized
    UnknownUnit { unit: String },
    /// Conversion between units of different dimensions
    Incompatible { from: Unit, to: Unit },
    /// Bare number supplied where a dimensioned quantity is required
    MissingUnit { expected: Unit },
}

impl fmt::Display for UnitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseError(msg) => write!(f, "Parse error: {}", msg),
            Self::UnknownUnit { unit } => write!(f, "Unknown unit '{}'", unit),
            Self::Incompatible { from, to } => write!(
                f,
                "Cannot convert '{}' ({}) to '{}' ({})",
                from,
                from.dimension(),
                to,
                to.dimension()
            ),
            Self::MissingUnit { expected } => write!(
                f,
                "Bare number given where {} in '{}' is expected",
                expected.dimension(),
                expected
            ),
        }
    }
}

impl std::error::Error for UnitError {}

/// A physical unit known to the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Kelvin,
    Celsius,
    Fahrenheit,
    Rankine,

    Pascal,
    Hectopascal,
    Kilopascal,
    Megapascal,
    Millibar,
    Bar,
    Atmosphere,
    Psia,

    KilogramPerCubicMeter,
    GramPerCubicCentimeter,

    JoulePerKilogram,
    KilojoulePerKilogram,

    JoulePerKilogramKelvin,
    KilojoulePerKilogramKelvin,

    CubicMeterPerKilogram,
    LiterPerKilogram,

    MeterPerSecond,
    KilometerPerHour,

    WattPerMeterKelvin,
    MilliwattPerMeterKelvin,

    KilogramPerMole,
    GramPerMole,

    PascalSecond,
    MillipascalSecond,
    MicropascalSecond,

    Dimensionless,
    Percent,
    PartPerMillion,
    GramPerKilogram,
}

impl Unit {
    pub fn dimension(self) -> Dimension {
        use Unit::*;
        match self {
            Kelvin | Celsius | Fahrenheit | Rankine => Dimension::Temperature,
            Pascal | Hectopascal | Kilopascal | Megapascal | Millibar | Bar | Atmosphere
            | Psia => Dimension::Pressure,
            KilogramPerCubicMeter | GramPerCubicCentimeter => Dimension::Density,
            JoulePerKilogram | KilojoulePerKilogram => Dimension::SpecificEnergy,
            JoulePerKilogramKelvin | KilojoulePerKilogramKelvin => Dimension::SpecificEntropy,
            CubicMeterPerKilogram | LiterPerKilogram => Dimension::SpecificVolume,
            MeterPerSecond | KilometerPerHour => Dimension::Velocity,
            WattPerMeterKelvin | MilliwattPerMeterKelvin => Dimension::ThermalConductivity,
            KilogramPerMole | GramPerMole => Dimension::MolarMass,
            PascalSecond | MillipascalSecond | MicropascalSecond => Dimension::DynamicViscosity,
            Dimensionless | Percent | PartPerMillion | GramPerKilogram => Dimension::Dimensionless,
        }
    }

    /// Canonical symbol, in the notation used by the default variable tables.
    pub fn symbol(self) -> &'static str {
        use Unit::*;
        match self {
            Kelvin => "K",
            Celsius => "degC",
            Fahrenheit => "degF",
            Rankine => "degR",
            Pascal => "Pa",
            Hectopascal => "hPa",
            Kilopascal => "kPa",
            Megapascal => "MPa",
            Millibar => "mbar",
            Bar => "bar",
            Atmosphere => "atm",
            Psia => "psia",
            KilogramPerCubicMeter => "kg/m**3",
            GramPerCubicCentimeter => "g/cm**3",
            JoulePerKilogram => "J/kg",
            KilojoulePerKilogram => "kJ/kg",
            JoulePerKilogramKelvin => "J/kg/K",
            KilojoulePerKilogramKelvin => "kJ/kg/K",
            CubicMeterPerKilogram => "m**3/kg",
            LiterPerKilogram => "l/kg",
            MeterPerSecond => "m/s",
            KilometerPerHour => "km/h",
            WattPerMeterKelvin => "W/m/K",
            MilliwattPerMeterKelvin => "mW/m/K",
            KilogramPerMole => "kg/mol",
            GramPerMole => "g/mol",
            PascalSecond => "Pa*s",
            MillipascalSecond => "mPa*s",
            MicropascalSecond => "uPa*s",
            Dimensionless => "",
            Percent => "%",
            PartPerMillion => "ppM",
            GramPerKilogram => "g/kg",
        }
    }

    /// `si = value * scale + offset`
    fn scale_offset(self) -> (f64, f64) {
        use Unit::*;
        match self {
            Kelvin => (1.0, 0.0),
            Celsius => (1.0, 273.15),
            Fahrenheit => (5.0 / 9.0, 459.67 * 5.0 / 9.0),
            Rankine => (5.0 / 9.0, 0.0),
            Pascal => (1.0, 0.0),
            Hectopascal => (1e2, 0.0),
            Kilopascal => (1e3, 0.0),
            Megapascal => (1e6, 0.0),
            Millibar => (1e2, 0.0),
            Bar => (1e5, 0.0),
            Atmosphere => (101_325.0, 0.0),
            Psia => (6_894.757, 0.0),
            KilogramPerCubicMeter => (1.0, 0.0),
            GramPerCubicCentimeter => (1e3, 0.0),
            JoulePerKilogram => (1.0, 0.0),
            KilojoulePerKilogram => (1e3, 0.0),
            JoulePerKilogramKelvin => (1.0, 0.0),
            KilojoulePerKilogramKelvin => (1e3, 0.0),
            CubicMeterPerKilogram => (1.0, 0.0),
            LiterPerKilogram => (1e-3, 0.0),
            MeterPerSecond => (1.0, 0.0),
            KilometerPerHour => (1.0 / 3.6, 0.0),
            WattPerMeterKelvin => (1.0, 0.0),
            MilliwattPerMeterKelvin => (1e-3, 0.0),
            KilogramPerMole => (1.0, 0.0),
            GramPerMole => (1e-3, 0.0),
            PascalSecond => (1.0, 0.0),
            MillipascalSecond => (1e-3, 0.0),
            MicropascalSecond => (1e-6, 0.0),
            Dimensionless => (1.0, 0.0),
            Percent => (1e-2, 0.0),
            PartPerMillion => (1e-6, 0.0),
            GramPerKilogram => (1e-3, 0.0),
        }
    }

    pub fn is_dimensionless(self) -> bool {
        self.dimension() == Dimension::Dimensionless
    }

    /// Convert a magnitude in this unit to the SI unit of its dimension.
    pub fn to_si(self, value: f64) -> f64 {
        let (scale, offset) = self.scale_offset();
        value * scale + offset
    }

    /// Convert an SI magnitude to this unit.
    pub fn from_si(self, si: f64) -> f64 {
        let (scale, offset) = self.scale_offset();
        (si - offset) / scale
    }

    /// Parse a unit symbol.
    ///
    /// Accepts the notation of the default tables (`m**3/kg`, `J/kg/K`, `Pa*s`) and common
    /// alternatives (`m^3/kg`, `J/(kg K)`, `°C`). Symbols are case-sensitive because
    /// `mPa` and `MPa` differ.
    pub fn parse(text: &str) -> Result<Unit, UnitError> {
        use Unit::*;
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let normalized = compact
            .replace("**", "^")
            .replace('³', "^3")
            .replace('·', "*")
            .replace("J/(kg*K)", "J/kg/K")
            .replace("J/(kgK)", "J/kg/K")
            .replace("W/(m*K)", "W/m/K")
            .replace("W/(mK)", "W/m/K");

        let unit = match normalized.as_str() {
            "K" | "kelvin" => Kelvin,
            "degC" | "°C" | "C" | "celsius" => Celsius,
            "degF" | "°F" | "F" | "fahrenheit" => Fahrenheit,
            "degR" | "°R" | "R" | "rankine" => Rankine,
            "Pa" | "pascal" => Pascal,
            "hPa" => Hectopascal,
            "kPa" => Kilopascal,
            "MPa" => Megapascal,
            "mbar" => Millibar,
            "bar" => Bar,
            "atm" => Atmosphere,
            "psia" => Psia,
            "kg/m^3" | "kg/m3" => KilogramPerCubicMeter,
            "g/cm^3" | "g/cm3" => GramPerCubicCentimeter,
            "J/kg" => JoulePerKilogram,
            "kJ/kg" => KilojoulePerKilogram,
            "J/kg/K" => JoulePerKilogramKelvin,
            "kJ/kg/K" | "kJ/(kg*K)" => KilojoulePerKilogramKelvin,
            "m^3/kg" | "m3/kg" => CubicMeterPerKilogram,
            "l/kg" | "L/kg" => LiterPerKilogram,
            "m/s" => MeterPerSecond,
            "km/h" => KilometerPerHour,
            "W/m/K" => WattPerMeterKelvin,
            "mW/m/K" => MilliwattPerMeterKelvin,
            "kg/mol" => KilogramPerMole,
            "g/mol" => GramPerMole,
            "Pa*s" => PascalSecond,
            "mPa*s" => MillipascalSecond,
            "uPa*s" | "µPa*s" => MicropascalSecond,
            "" | "1" | "dimensionless" => Dimensionless,
            "%" | "percent" => Percent,
            "ppM" | "ppm" => PartPerMillion,
            "g/kg" => GramPerKilogram,
            _ => {
                return Err(UnitError::UnknownUnit {
                    unit: text.to_string(),
                });
            }
        };
        Ok(unit)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s)
    }
}

/// A magnitude paired with its unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measured {
    magnitude: f64,
    unit: Unit,
}

impl Measured {
    pub fn new(magnitude: f64, unit: Unit) -> Self {
        Self { magnitude, unit }
    }

    /// A bare number promoted to a dimensionless quantity.
    pub fn dimensionless(magnitude: f64) -> Self {
        Self::new(magnitude, Unit::Dimensionless)
    }

    /// Parse user text such as `"0 degC"`, `"1.2bar"`, `"50 %"` or `"0.01"`.
    pub fn from_text(text: &str) -> Result<Self, UnitError> {
        let (value, unit) = split_value_and_unit(text)?;
        Ok(Self::new(value, Unit::parse(&unit)?))
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn dimension(&self) -> Dimension {
        self.unit.dimension()
    }

    /// Same quantity expressed in `unit`.
    pub fn to(&self, unit: Unit) -> Result<Measured, UnitError> {
        Ok(Measured::new(self.magnitude_as(unit)?, unit))
    }

    /// Magnitude of this quantity expressed in `unit`.
    pub fn magnitude_as(&self, unit: Unit) -> Result<f64, UnitError> {
        if self.unit == unit {
            return Ok(self.magnitude);
        }
        if self.unit.dimension() != unit.dimension() {
            return Err(UnitError::Incompatible {
                from: self.unit,
                to: unit,
            });
        }
        Ok(unit.from_si(self.unit.to_si(self.magnitude)))
    }

    /// Magnitude in the SI unit of the dimension.
    pub fn base_value(&self) -> f64 {
        self.unit.to_si(self.magnitude)
    }

    /// Round the magnitude to `digits` decimals, keeping the unit.
    pub fn round(&self, digits: i32) -> Measured {
        Measured::new(round_to(self.magnitude, digits), self.unit)
    }
}

impl fmt::Display for Measured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit == Unit::Dimensionless {
            write!(f, "{}", self.magnitude)
        } else {
            write!(f, "{} {}", self.magnitude, self.unit)
        }
    }
}

impl FromStr for Measured {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Measured::from_text(s)
    }
}

/// Split a value+unit string into (numeric_value, unit_string).
///
/// Examples:
/// - "20degC" -> (20.0, "degC")
/// - "1.2 bar" -> (1.2, "bar")
/// - "1e5 Pa" -> (100000.0, "Pa")
/// - "0.01" -> (0.01, "")
fn split_value_and_unit(input: &str) -> Result<(f64, String), UnitError> {
    let trimmed = input.trim();

    // Exponent markers only count when followed by a digit or sign, so "1e5" is a
    // number while the unit in "5 eV" would not be swallowed.
    let bytes = trimmed.as_bytes();
    let mut split_idx = trimmed.len();
    for (i, c) in trimmed.char_indices() {
        let numeric = c.is_ascii_digit()
            || c == '.'
            || ((c == '-' || c == '+') && (i == 0 || matches!(bytes[i - 1], b'e' | b'E')))
            || ((c == 'e' || c == 'E')
                && i > 0
                && bytes
                    .get(i + 1)
                    .is_some_and(|n| n.is_ascii_digit() || *n == b'-' || *n == b'+'));
        if !numeric {
            split_idx = i;
            break;
        }
    }

    let (num_part, unit_part) = trimmed.split_at(split_idx);
    let value: f64 = num_part.trim().parse().map_err(|_| {
        UnitError::ParseError(format!("Could not parse numeric value from '{}'", input))
    })?;

    Ok((value, unit_part.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celsius_to_kelvin() {
        let t = Measured::new(0.0, Unit::Celsius);
        assert!((t.magnitude_as(Unit::Kelvin).unwrap() - 273.15).abs() < 1e-12);
        assert!((t.base_value() - 273.15).abs() < 1e-12);
    }

    #[test]
    fn fahrenheit_round_trips_through_kelvin() {
        let t = Measured::new(32.0, Unit::Fahrenheit);
        let k = t.to(Unit::Kelvin).unwrap();
        assert!((k.magnitude() - 273.15).abs() < 1e-9);
        let back = k.to(Unit::Fahrenheit).unwrap();
        assert!((back.magnitude() - 32.0).abs() < 1e-9);
    }

    #[test]
    fn pressure_units() {
        let p = Measured::new(1.0, Unit::Bar);
        assert_eq!(p.magnitude_as(Unit::Pascal).unwrap(), 1e5);
        assert_eq!(p.magnitude_as(Unit::Kilopascal).unwrap(), 100.0);
    }

    #[test]
    fn reject_cross_dimension_conversion() {
        let p = Measured::new(1.0, Unit::Bar);
        assert!(matches!(
            p.to(Unit::Kelvin),
            Err(UnitError::Incompatible { from: Unit::Bar, to: Unit::Kelvin })
        ));
    }

    #[test]
    fn percent_and_ppm_are_dimensionless() {
        let r = Measured::new(50.0, Unit::Percent);
        assert_eq!(r.magnitude_as(Unit::Dimensionless).unwrap(), 0.5);
        let c = Measured::new(400.0, Unit::PartPerMillion);
        assert!((c.base_value() - 4e-4).abs() < 1e-15);
        assert!(Unit::GramPerKilogram.is_dimensionless());
    }

    #[test]
    fn parse_table_symbols() {
        for (text, unit) in [
            ("Pa", Unit::Pascal),
            ("K", Unit::Kelvin),
            ("kg/m**3", Unit::KilogramPerCubicMeter),
            ("J/kg", Unit::JoulePerKilogram),
            ("J/kg/K", Unit::JoulePerKilogramKelvin),
            ("m/s", Unit::MeterPerSecond),
            ("W/m/K", Unit::WattPerMeterKelvin),
            ("kg/mol", Unit::KilogramPerMole),
            ("", Unit::Dimensionless),
            ("Pa*s", Unit::PascalSecond),
            ("m**3/kg", Unit::CubicMeterPerKilogram),
        ] {
            assert_eq!(Unit::parse(text).unwrap(), unit, "symbol {text:?}");
        }
    }

    #[test]
    fn symbols_parse_back() {
        for unit in [
            Unit::Celsius,
            Unit::Megapascal,
            Unit::MillipascalSecond,
            Unit::KilojoulePerKilogramKelvin,
            Unit::PartPerMillion,
        ] {
            assert_eq!(Unit::parse(unit.symbol()).unwrap(), unit);
        }
    }

    #[test]
    fn unit_symbols_are_case_sensitive() {
        assert_eq!(Unit::parse("MPa").unwrap(), Unit::Megapascal);
        assert!(Unit::parse("mpa").is_err());
    }

    #[test]
    fn parse_measured_text() {
        let t = Measured::from_text("20degC").unwrap();
        assert_eq!(t.unit(), Unit::Celsius);
        assert_eq!(t.magnitude(), 20.0);

        let p: Measured = "1e5 Pa".parse().unwrap();
        assert_eq!(p.magnitude(), 1e5);
        assert_eq!(p.unit(), Unit::Pascal);

        let r = Measured::from_text("50 %").unwrap();
        assert_eq!(r.base_value(), 0.5);

        let w = Measured::from_text("-0.01").unwrap();
        assert_eq!(w.unit(), Unit::Dimensionless);
        assert_eq!(w.magnitude(), -0.01);
    }

    #[test]
    fn parse_measured_rejects_garbage() {
        assert!(matches!(
            Measured::from_text("warm"),
            Err(UnitError::ParseError(_))
        ));
        assert!(matches!(
            Measured::from_text("3 furlongs"),
            Err(UnitError::UnknownUnit { .. })
        ));
    }

    #[test]
    fn round_keeps_unit() {
        let h = Measured::new(45_612.3456, Unit::JoulePerKilogram).round(1);
        assert_eq!(h.magnitude(), 45_612.3);
        assert_eq!(h.unit(), Unit::JoulePerKilogram);
    }

    #[test]
    fn display() {
        assert_eq!(Measured::new(1.5, Unit::Bar).to_string(), "1.5 bar");
        assert_eq!(Measured::dimensionless(0.5).to_string(), "0.5");
    }
}

//! Substances a state class can be built for.

use std::fmt;
use std::str::FromStr;

/// Catalogued CoolProp fluids common in HVAC and process work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Dry air (pseudo-pure backend fluid)
    Air,
    /// Water / steam (H₂O)
    Water,
    /// Nitrogen (N₂)
    N2,
    /// Oxygen (O₂)
    O2,
    /// Carbon dioxide (CO₂, R744)
    CO2,
    /// Argon (Ar)
    Ar,
    /// Helium (He)
    He,
    /// Ammonia (NH₃, R717)
    Ammonia,
    /// Propane (R290)
    Propane,
    /// Isobutane (R600a)
    Isobutane,
    /// Refrigerant R32
    R32,
    /// Refrigerant R134a
    R134a,
    /// Refrigerant R1234yf
    R1234yf,
    /// Refrigerant R1234ze(E)
    R1234zeE,
    /// Refrigerant blend R404A (CoolProp pseudo-pure)
    R404A,
    /// Refrigerant blend R407C (CoolProp pseudo-pure)
    R407C,
    /// Refrigerant blend R410A (CoolProp pseudo-pure)
    R410A,
}

impl Species {
    pub const ALL: [Species; 17] = [
        Species::Air,
        Species::Water,
        Species::N2,
        Species::O2,
        Species::CO2,
        Species::Ar,
        Species::He,
        Species::Ammonia,
        Species::Propane,
        Species::Isobutane,
        Species::R32,
        Species::R134a,
        Species::R1234yf,
        Species::R1234zeE,
        Species::R404A,
        Species::R407C,
        Species::R410A,
    ];

    /// CoolProp fluid name passed to `PropsSI`.
    pub fn coolprop_name(&self) -> &'static str {
        match self {
            Species::Air => "Air",
            Species::Water => "Water",
            Species::N2 => "Nitrogen",
            Species::O2 => "Oxygen",
            Species::CO2 => "CarbonDioxide",
            Species::Ar => "Argon",
            Species::He => "Helium",
            Species::Ammonia => "Ammonia",
            Species::Propane => "n-Propane",
            Species::Isobutane => "IsoButane",
            Species::R32 => "R32",
            Species::R134a => "R134a",
            Species::R1234yf => "R1234yf",
            Species::R1234zeE => "R1234ze(E)",
            Species::R404A => "R404A",
            Species::R407C => "R407C",
            Species::R410A => "R410A",
        }
    }

    /// Get human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Species::Air => "Air",
            Species::Water => "Water",
            Species::N2 => "Nitrogen",
            Species::O2 => "Oxygen",
            Species::CO2 => "Carbon Dioxide",
            Species::Ar => "Argon",
            Species::He => "Helium",
            Species::Ammonia => "Ammonia",
            Species::Propane => "Propane",
            Species::Isobutane => "Isobutane",
            Species::R32 => "R32",
            Species::R134a => "R134a",
            Species::R1234yf => "R1234yf",
            Species::R1234zeE => "R1234ze(E)",
            Species::R404A => "R404A",
            Species::R407C => "R407C",
            Species::R410A => "R410A",
        }
    }
}

impl FromStr for Species {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "AIR" => Ok(Species::Air),
            "WATER" | "H2O" | "STEAM" | "R718" => Ok(Species::Water),
            "N2" | "NITROGEN" => Ok(Species::N2),
            "O2" | "OXYGEN" => Ok(Species::O2),
            "CO2" | "CARBONDIOXIDE" | "CARBON DIOXIDE" | "R744" => Ok(Species::CO2),
            "AR" | "ARGON" => Ok(Species::Ar),
            "HE" | "HELIUM" => Ok(Species::He),
            "NH3" | "AMMONIA" | "R717" => Ok(Species::Ammonia),
            "PROPANE" | "N-PROPANE" | "C3H8" | "R290" => Ok(Species::Propane),
            "ISOBUTANE" | "I-BUTANE" | "R600A" => Ok(Species::Isobutane),
            "R32" => Ok(Species::R32),
            "R134A" => Ok(Species::R134a),
            "R1234YF" => Ok(Species::R1234yf),
            "R1234ZE" | "R1234ZE(E)" => Ok(Species::R1234zeE),
            "R404A" => Ok(Species::R404A),
            "R407C" => Ok(Species::R407C),
            "R410A" => Ok(Species::R410A),
            _ => Err("unknown species"),
        }
    }
}

/// Name of the humid-air sentinel accepted by [`Substance::from_str`].
pub const HUMID_AIR: &str = "HumidAir";

/// What a state class describes: a fluid evaluated with `PropsSI`, or humid air.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Substance {
    /// Any fluid identifier `PropsSI` understands (`"Air"`, `"R410A"`,
    /// `"HEOS::R32[0.5]&R125[0.5]"`).
    Fluid(String),
    /// Humid air, evaluated with `HAPropsSI`.
    HumidAir,
}

impl Substance {
    pub fn fluid(id: impl Into<String>) -> Self {
        Substance::Fluid(id.into())
    }

    pub fn is_humid_air(&self) -> bool {
        matches!(self, Substance::HumidAir)
    }

    /// Identifier appended to pure-fluid argument lists.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Substance::Fluid(id) => Some(id),
            Substance::HumidAir => None,
        }
    }

    /// Number of independent variables that fix a state.
    pub fn independent_variables(&self) -> usize {
        match self {
            Substance::Fluid(_) => 2,
            Substance::HumidAir => 3,
        }
    }
}

impl From<Species> for Substance {
    fn from(species: Species) -> Self {
        Substance::Fluid(species.coolprop_name().to_string())
    }
}

impl fmt::Display for Substance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Substance::Fluid(id) => f.write_str(id),
            Substance::HumidAir => f.write_str(HUMID_AIR),
        }
    }
}

impl FromStr for Substance {
    type Err = std::convert::Infallible;

    /// Catalogued names and aliases map to their CoolProp name; anything else is
    /// passed to the backend unchanged.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let compact = trimmed.replace([' ', '_', '-'], "").to_ascii_lowercase();
        if compact == "humidair" {
            return Ok(Substance::HumidAir);
        }
        Ok(match trimmed.parse::<Species>() {
            Ok(species) => species.into(),
            Err(_) => Substance::Fluid(trimmed.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coolprop_mapping() {
        assert_eq!(Species::CO2.coolprop_name(), "CarbonDioxide");
        assert_eq!(Species::Propane.coolprop_name(), "n-Propane");
        assert_eq!(Species::R1234zeE.coolprop_name(), "R1234ze(E)");
    }

    #[test]
    fn refrigerant_numbers_are_aliases() {
        assert_eq!("R744".parse::<Species>().unwrap(), Species::CO2);
        assert_eq!("r290".parse::<Species>().unwrap(), Species::Propane);
        assert_eq!("R717".parse::<Species>().unwrap(), Species::Ammonia);
    }

    #[test]
    fn all_display_names_non_empty() {
        for species in Species::ALL {
            assert!(!species.display_name().is_empty());
        }
    }

    #[test]
    fn humid_air_sentinel() {
        for text in ["HumidAir", "humid air", "Humid-Air", "humid_air"] {
            assert_eq!(text.parse::<Substance>().unwrap(), Substance::HumidAir);
        }
        assert_eq!(Substance::HumidAir.to_string(), HUMID_AIR);
        assert_eq!(Substance::HumidAir.independent_variables(), 3);
        assert_eq!(Substance::HumidAir.identifier(), None);
    }

    #[test]
    fn unknown_names_pass_through() {
        let s: Substance = "HEOS::R32[0.5]&R125[0.5]".parse().unwrap();
        assert_eq!(s, Substance::fluid("HEOS::R32[0.5]&R125[0.5]"));
        let w: Substance = "steam".parse().unwrap();
        assert_eq!(w.identifier(), Some("Water"));
        assert_eq!(w.independent_variables(), 2);
    }
}

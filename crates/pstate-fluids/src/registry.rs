//! Per-class table of the state variables a substance can report.
//!
//! A registry maps variable names to their canonical unit. It belongs to one state
//! class and is shared by every state of that class: registering or unregistering a
//! variable changes what all of them can resolve, including states created earlier.

use crate::error::{FluidError, FluidResult};
use crate::units::Unit;
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

/// Pure-fluid default variables (CoolProp `PropsSI` keys).
pub const FLUID_DEFAULT_VARIABLES: &[(&str, &str)] = &[
    ("P", "Pa"),
    ("Pcrit", "Pa"),
    ("T", "K"),
    ("Tcrit", "K"),
    ("D", "kg/m**3"),
    ("H", "J/kg"),
    ("U", "J/kg"),
    ("S", "J/kg/K"),
    ("A", "m/s"),
    ("L", "W/m/K"),
    ("M", "kg/mol"),
    ("C", "J/kg/K"),
    ("CVMASS", "J/kg/K"),
    ("Q", ""),
    ("Z", ""),
    ("V", "Pa*s"),
];

/// Humid-air default variables (CoolProp `HAPropsSI` keys).
pub const HUMID_AIR_DEFAULT_VARIABLES: &[(&str, &str)] = &[
    ("P", "Pa"),
    ("W", ""),
    ("T", "K"),
    ("R", ""),
    ("H", "J/kg"),
    ("S", "J/kg/K"),
    ("B", "K"),
    ("D", "K"),
    ("Vda", "m**3/kg"),
    ("Vha", "m**3/kg"),
    ("M", "Pa*s"),
    ("K", "W/m/K"),
    ("C", "J/kg/K"),
    ("P_w", "Pa"),
    ("psi_w", ""),
];

/// Shared, lockable variable table of one state class.
///
/// Cloning a `PropertyRegistry` yields another handle to the same table; use
/// [`PropertyRegistry::detached`] for an independent copy.
#[derive(Debug, Clone)]
pub struct PropertyRegistry {
    owner: Arc<str>,
    entries: Arc<RwLock<IndexMap<String, Unit>>>,
}

impl PropertyRegistry {
    /// Empty registry for the class named `owner`.
    pub fn new(owner: impl Into<Arc<str>>) -> Self {
        Self {
            owner: owner.into(),
            entries: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Registry populated from a `(name, unit symbol)` table.
    pub fn from_table(owner: impl Into<Arc<str>>, table: &[(&str, &str)]) -> FluidResult<Self> {
        let registry = Self::new(owner);
        for (name, unit) in table {
            registry.register(name, Unit::parse(unit)?)?;
        }
        Ok(registry)
    }

    /// Name of the owning class, used in error messages.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Add `name` with canonical unit `unit`.
    pub fn register(&self, name: &str, unit: Unit) -> FluidResult<()> {
        let mut entries = self.entries.write();
        if entries.contains_key(name) {
            return Err(FluidError::DuplicateVariable {
                name: name.to_string(),
                class: self.owner.to_string(),
            });
        }
        entries.insert(name.to_string(), unit);
        debug!(class = %self.owner, variable = name, unit = %unit, "registered variable");
        Ok(())
    }

    /// Remove `name`, returning its unit.
    pub fn unregister(&self, name: &str) -> FluidResult<Unit> {
        let removed = self.entries.write().shift_remove(name);
        match removed {
            Some(unit) => {
                debug!(class = %self.owner, variable = name, "unregistered variable");
                Ok(unit)
            }
            None => Err(self.unknown(name)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    /// Canonical unit of `name`, or `UnknownVariable`.
    pub fn unit_of(&self, name: &str) -> FluidResult<Unit> {
        self.entries
            .read()
            .get(name)
            .copied()
            .ok_or_else(|| self.unknown(name))
    }

    /// Snapshot of the current table, in registration order.
    pub fn acceptable_variables(&self) -> IndexMap<String, Unit> {
        self.entries.read().clone()
    }

    /// Registered names, in registration order.
    pub fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Independent copy of the table under a new owner name.
    pub fn detached(&self, owner: impl Into<Arc<str>>) -> Self {
        Self {
            owner: owner.into(),
            entries: Arc::new(RwLock::new(self.acceptable_variables())),
        }
    }

    /// True when both handles point at the same table.
    pub fn shares_table_with(&self, other: &PropertyRegistry) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }

    pub(crate) fn unknown(&self, name: &str) -> FluidError {
        FluidError::UnknownVariable {
            name: name.to_string(),
            class: self.owner.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_parse() {
        let fluid = PropertyRegistry::from_table("Air", FLUID_DEFAULT_VARIABLES).unwrap();
        assert_eq!(fluid.len(), FLUID_DEFAULT_VARIABLES.len());
        assert_eq!(fluid.unit_of("D").unwrap(), Unit::KilogramPerCubicMeter);
        assert_eq!(fluid.unit_of("Q").unwrap(), Unit::Dimensionless);

        let ha = PropertyRegistry::from_table("HumidAir", HUMID_AIR_DEFAULT_VARIABLES).unwrap();
        assert_eq!(ha.unit_of("D").unwrap(), Unit::Kelvin);
        assert_eq!(ha.unit_of("Vha").unwrap(), Unit::CubicMeterPerKilogram);
    }

    #[test]
    fn register_rejects_duplicates() {
        let reg = PropertyRegistry::from_table("Air", FLUID_DEFAULT_VARIABLES).unwrap();
        let err = reg.register("T", Unit::Kelvin).unwrap_err();
        assert_eq!(
            err,
            FluidError::DuplicateVariable {
                name: "T".into(),
                class: "Air".into()
            }
        );
    }

    #[test]
    fn unregister_rejects_unknown() {
        let reg = PropertyRegistry::new("Water");
        assert!(matches!(
            reg.unregister("PRANDTL"),
            Err(FluidError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn register_unregister_round_trip() {
        let reg = PropertyRegistry::from_table("Air", FLUID_DEFAULT_VARIABLES).unwrap();
        let before = reg.acceptable_variables();

        reg.register("PRANDTL", Unit::Dimensionless).unwrap();
        assert!(reg.contains("PRANDTL"));
        assert_eq!(reg.unregister("PRANDTL").unwrap(), Unit::Dimensionless);

        assert_eq!(reg.acceptable_variables(), before);
        assert!(matches!(
            reg.unit_of("PRANDTL"),
            Err(FluidError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn clones_share_detached_copies_do_not() {
        let reg = PropertyRegistry::new("Air");
        let handle = reg.clone();
        let copy = reg.detached("Air2");

        handle.register("T", Unit::Kelvin).unwrap();
        assert!(reg.contains("T"));
        assert!(!copy.contains("T"));
        assert!(reg.shares_table_with(&handle));
        assert!(!reg.shares_table_with(&copy));
    }

    #[test]
    fn unknown_table_unit_is_an_error() {
        let err = PropertyRegistry::from_table("X", &[("T", "parsec")]).unwrap_err();
        assert!(matches!(err, FluidError::Unit(_)));
    }
}

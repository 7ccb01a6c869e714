//! Unit-aware points of state.
//!
//! A [`UnitState`] wraps a [`PointOfState`] and converts at the boundary: inputs are
//! converted to the registry unit of each variable before the state is built, and
//! every read comes back as a [`Measured`] in the registry unit.
//!
//! Bare numbers are accepted only for variables whose registry unit is
//! dimensionless. A bare number for a dimensioned variable is rejected, since
//! guessing a unit for it (is `20` a Celsius or a Kelvin value?) would be ambiguous.

use crate::class::StateClass;
use crate::error::FluidResult;
use crate::state::PointOfState;
use crate::units::{Measured, Unit, UnitError};
use indexmap::IndexMap;
use pstate_core::round_to;

/// Value given to a unit-aware state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    /// Plain number; only valid for dimensionless variables.
    Bare(f64),
    Measured(Measured),
}

impl From<f64> for Input {
    fn from(v: f64) -> Self {
        Input::Bare(v)
    }
}

impl From<Measured> for Input {
    fn from(m: Measured) -> Self {
        Input::Measured(m)
    }
}

impl Input {
    /// Magnitude in `unit`.
    pub fn magnitude_in(&self, unit: Unit) -> Result<f64, UnitError> {
        match self {
            Input::Bare(v) if unit.is_dimensionless() => {
                Measured::dimensionless(*v).magnitude_as(unit)
            }
            Input::Bare(_) => Err(UnitError::MissingUnit { expected: unit }),
            Input::Measured(m) => m.magnitude_as(unit),
        }
    }
}

/// Selects one variable for [`UnitState::subset_to`] and
/// [`UnitState::subset_magnitudes`], with an optional target unit and rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub variable: String,
    pub unit: Option<Unit>,
    pub digits: Option<i32>,
}

impl Selector {
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            unit: None,
            digits: None,
        }
    }

    pub fn to(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn round(mut self, digits: i32) -> Self {
        self.digits = Some(digits);
        self
    }
}

/// Point of state that reads and writes [`Measured`] values.
#[derive(Debug, Clone)]
pub struct UnitState {
    core: PointOfState,
}

impl UnitState {
    pub(crate) fn build(
        class: StateClass,
        name: Option<String>,
        inputs: Vec<(String, Input)>,
    ) -> FluidResult<Self> {
        let registry = class.registry();
        let mut given = Vec::with_capacity(inputs.len());
        for (key, input) in inputs {
            let unit = registry.unit_of(&key)?;
            let magnitude = input.magnitude_in(unit)?;
            given.push((key, magnitude));
        }
        let core = PointOfState::build(class, name, given)?;
        Ok(Self { core })
    }

    fn wrap(core: PointOfState) -> Self {
        Self { core }
    }

    /// Underlying magnitude-only state.
    pub fn core(&self) -> &PointOfState {
        &self.core
    }

    pub fn into_core(self) -> PointOfState {
        self.core
    }

    pub fn name(&self) -> Option<&str> {
        self.core.name()
    }

    pub fn class(&self) -> &StateClass {
        self.core.class()
    }

    /// Value of `name` in its registry unit.
    pub fn get(&self, name: &str) -> FluidResult<Measured> {
        let magnitude = self.core.get(name)?;
        let unit = self.core.class().registry().unit_of(name)?;
        Ok(Measured::new(magnitude, unit))
    }

    pub fn known_variables(&self) -> FluidResult<IndexMap<String, Measured>> {
        self.class()
            .registry()
            .names()
            .into_iter()
            .map(|k| {
                let v = self.get(&k)?;
                Ok((k, v))
            })
            .collect()
    }

    pub fn known_variables_or_errors(&self) -> IndexMap<String, FluidResult<Measured>> {
        self.class()
            .registry()
            .names()
            .into_iter()
            .map(|k| {
                let v = self.get(&k);
                (k, v)
            })
            .collect()
    }

    /// Values of the requested registered variables; other names are skipped.
    pub fn subset<I, K>(&self, names: I) -> FluidResult<IndexMap<String, Measured>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let registry = self.class().registry();
        let mut out = IndexMap::new();
        for name in names {
            let name = name.as_ref();
            if registry.contains(name) {
                out.insert(name.to_string(), self.get(name)?);
            }
        }
        Ok(out)
    }

    /// Selected variables, converted and rounded as each selector asks.
    ///
    /// Unlike [`UnitState::subset`], an unregistered variable is an error.
    pub fn subset_to<I, K>(&self, selectors: I) -> FluidResult<IndexMap<String, Measured>>
    where
        I: IntoIterator<Item = (K, Selector)>,
        K: Into<String>,
    {
        selectors
            .into_iter()
            .map(|(key, sel)| {
                let mut value = self.get(&sel.variable)?;
                if let Some(unit) = sel.unit {
                    value = value.to(unit)?;
                }
                if let Some(digits) = sel.digits {
                    value = value.round(digits);
                }
                Ok((key.into(), value))
            })
            .collect()
    }

    /// Selected variables as bare magnitudes in the selector unit, or the registry
    /// unit when none is given.
    pub fn subset_magnitudes<I, K>(&self, selectors: I) -> FluidResult<IndexMap<String, f64>>
    where
        I: IntoIterator<Item = (K, Selector)>,
        K: Into<String>,
    {
        selectors
            .into_iter()
            .map(|(key, sel)| {
                let value = self.get(&sel.variable)?;
                let mut magnitude = match sel.unit {
                    Some(unit) => value.magnitude_as(unit)?,
                    None => value.magnitude(),
                };
                if let Some(digits) = sel.digits {
                    magnitude = round_to(magnitude, digits);
                }
                Ok((key.into(), magnitude))
            })
            .collect()
    }

    pub fn dew_point(&self, name: Option<&str>) -> FluidResult<UnitState> {
        self.core.dew_point(name).map(Self::wrap)
    }

    pub fn bulb_point(&self, name: Option<&str>) -> FluidResult<UnitState> {
        self.core.bulb_point(name).map(Self::wrap)
    }

    pub fn mix(
        &self,
        other: &UnitState,
        fraction: f64,
        name: Option<&str>,
    ) -> FluidResult<UnitState> {
        self.core.mix(&other.core, fraction, name).map(Self::wrap)
    }

    pub fn hom_coord(
        &self,
        other: &UnitState,
        lambda: f64,
        name: Option<&str>,
    ) -> FluidResult<UnitState> {
        self.core.hom_coord(&other.core, lambda, name).map(Self::wrap)
    }
}

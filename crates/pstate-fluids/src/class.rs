//! State classes: one configured substance + registry + evaluator.
//!
//! A [`StateClass`] plays the role of a type for points of state. It is created once
//! per substance (and per unit mode) and then used to construct any number of states:
//!
//! ```no_run
//! use pstate_fluids::{create_state_class, Substance};
//!
//! let air = create_state_class(Substance::fluid("Air"), false, None).unwrap();
//! let p0 = air.named_state("P_0", [("T", 273.15), ("P", 101_325.0)]).unwrap();
//! let h = p0.get("H").unwrap();
//! ```
//!
//! Each class owns its registry. Two classes built for the same substance never share
//! one, so registering a variable on one leaves the other untouched.

use crate::coolprop::{CoolPropEvaluator, HumidAirEvaluator};
use crate::error::{FluidError, FluidResult};
use crate::evaluator::PropertyEvaluator;
use crate::registry::{FLUID_DEFAULT_VARIABLES, HUMID_AIR_DEFAULT_VARIABLES, PropertyRegistry};
use crate::state::PointOfState;
use crate::substance::Substance;
use crate::unit_state::{Input, UnitState};
use crate::units::Unit;
use indexmap::IndexMap;
use pstate_core::ensure_positive;
use pstate_core::units::{Pressure, constants::P_AMB_PA};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uom::si::pressure::pascal;

/// Data that defines a state class.
#[derive(Debug, Clone, PartialEq)]
pub struct StateClassConfig {
    pub substance: Substance,
    /// Accept and return unit-wrapped values.
    pub unit_aware: bool,
    /// Pressure inserted when a humid-air state is built without `P` [Pa].
    pub default_pressure_pa: f64,
}

impl StateClassConfig {
    pub fn new(substance: Substance) -> Self {
        Self {
            substance,
            unit_aware: false,
            default_pressure_pa: P_AMB_PA,
        }
    }

    pub fn with_units(mut self, unit_aware: bool) -> Self {
        self.unit_aware = unit_aware;
        self
    }

    pub fn with_default_pressure(mut self, p: Pressure) -> Self {
        self.default_pressure_pa = p.get::<pascal>();
        self
    }

    /// Built-in `(variable, unit)` table for the substance kind.
    pub fn default_variables(&self) -> &'static [(&'static str, &'static str)] {
        if self.substance.is_humid_air() {
            HUMID_AIR_DEFAULT_VARIABLES
        } else {
            FLUID_DEFAULT_VARIABLES
        }
    }

    fn class_name(&self) -> String {
        if self.unit_aware {
            format!("{}_with_units", self.substance)
        } else {
            self.substance.to_string()
        }
    }
}

struct ClassInner {
    name: String,
    config: StateClassConfig,
    registry: PropertyRegistry,
    evaluator: Arc<dyn PropertyEvaluator>,
}

/// Handle to a state class. Cloning is cheap and yields the same class.
#[derive(Clone)]
pub struct StateClass {
    inner: Arc<ClassInner>,
}

/// Create a CoolProp-backed state class for `substance`.
///
/// Humid-air classes default to `default_pressure`, or standard atmosphere when `None`.
pub fn create_state_class(
    substance: Substance,
    unit_aware: bool,
    default_pressure: Option<Pressure>,
) -> FluidResult<StateClass> {
    let mut config = StateClassConfig::new(substance).with_units(unit_aware);
    if let Some(p) = default_pressure {
        config = config.with_default_pressure(p);
    }
    StateClass::new(config)
}

impl StateClass {
    /// Class backed by the CoolProp evaluator matching the substance.
    pub fn new(config: StateClassConfig) -> FluidResult<Self> {
        let evaluator: Arc<dyn PropertyEvaluator> = if config.substance.is_humid_air() {
            Arc::new(HumidAirEvaluator::new())
        } else {
            Arc::new(CoolPropEvaluator::new())
        };
        Self::with_evaluator(config, evaluator)
    }

    /// Class backed by a caller-provided evaluator.
    pub fn with_evaluator(
        config: StateClassConfig,
        evaluator: Arc<dyn PropertyEvaluator>,
    ) -> FluidResult<Self> {
        if config.substance.identifier().is_some_and(|id| id.trim().is_empty()) {
            return Err(FluidError::InvalidArg {
                what: "empty substance identifier".to_string(),
            });
        }
        ensure_positive(config.default_pressure_pa, "default pressure")?;

        let name = config.class_name();
        let registry = PropertyRegistry::from_table(name.as_str(), config.default_variables())?;
        debug!(
            class = %name,
            evaluator = evaluator.name(),
            variables = registry.len(),
            "created state class"
        );
        Ok(Self {
            inner: Arc::new(ClassInner {
                name,
                config,
                registry,
                evaluator,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn config(&self) -> &StateClassConfig {
        &self.inner.config
    }

    pub fn substance(&self) -> &Substance {
        &self.inner.config.substance
    }

    pub fn is_humid_air(&self) -> bool {
        self.inner.config.substance.is_humid_air()
    }

    pub fn is_unit_aware(&self) -> bool {
        self.inner.config.unit_aware
    }

    /// Default humid-air pressure [Pa].
    pub fn default_pressure_pa(&self) -> f64 {
        self.inner.config.default_pressure_pa
    }

    pub fn registry(&self) -> &PropertyRegistry {
        &self.inner.registry
    }

    pub fn evaluator(&self) -> &dyn PropertyEvaluator {
        self.inner.evaluator.as_ref()
    }

    /// Make `name` resolvable on every state of this class.
    pub fn register(&self, name: &str, unit: Unit) -> FluidResult<()> {
        self.inner.registry.register(name, unit)
    }

    /// Withdraw `name` from every state of this class.
    pub fn unregister(&self, name: &str) -> FluidResult<Unit> {
        self.inner.registry.unregister(name)
    }

    pub fn acceptable_variables(&self) -> IndexMap<String, Unit> {
        self.inner.registry.acceptable_variables()
    }

    /// True when both handles refer to the same class.
    pub fn same_class(&self, other: &StateClass) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Unnamed state from SI magnitudes in the registry units.
    pub fn state<I, K>(&self, given: I) -> FluidResult<PointOfState>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        PointOfState::build(self.clone(), None, collect_given(given))
    }

    /// Named state from SI magnitudes in the registry units.
    pub fn named_state<I, K>(&self, name: impl Into<String>, given: I) -> FluidResult<PointOfState>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        PointOfState::build(self.clone(), Some(name.into()), collect_given(given))
    }

    /// Unit-aware state. Only available on classes created with units.
    pub fn unit_state<I, K, V>(&self, name: Option<&str>, given: I) -> FluidResult<UnitState>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Input>,
    {
        if !self.is_unit_aware() {
            return Err(FluidError::NotSupported {
                what: format!("class {} was created without units", self.name()),
            });
        }
        let inputs = given
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.into()))
            .collect();
        UnitState::build(self.clone(), name.map(str::to_string), inputs)
    }
}

fn collect_given<I, K>(given: I) -> Vec<(String, f64)>
where
    I: IntoIterator<Item = (K, f64)>,
    K: AsRef<str>,
{
    given
        .into_iter()
        .map(|(k, v)| (k.as_ref().to_string(), v))
        .collect()
}

impl fmt::Debug for StateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateClass")
            .field("name", &self.inner.name)
            .field("config", &self.inner.config)
            .field("evaluator", &self.inner.evaluator.name())
            .field("variables", &self.inner.registry.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pstate_core::units::pa;

    #[test]
    fn fluid_class_gets_fluid_table() {
        let air = create_state_class(Substance::fluid("Air"), false, None).unwrap();
        assert_eq!(air.name(), "Air");
        assert_eq!(air.evaluator().name(), "CoolProp::PropsSI");
        assert_eq!(air.acceptable_variables().len(), FLUID_DEFAULT_VARIABLES.len());
        assert!(air.registry().contains("CVMASS"));
    }

    #[test]
    fn humid_air_class_gets_humid_air_table() {
        let ha = create_state_class(Substance::HumidAir, true, Some(pa(95_000.0))).unwrap();
        assert_eq!(ha.name(), "HumidAir_with_units");
        assert_eq!(ha.evaluator().name(), "CoolProp::HAPropsSI");
        assert!(ha.registry().contains("psi_w"));
        assert_eq!(ha.default_pressure_pa(), 95_000.0);
    }

    #[test]
    fn default_pressure_is_standard_atmosphere() {
        let ha = create_state_class(Substance::HumidAir, false, None).unwrap();
        assert_eq!(ha.default_pressure_pa(), 101_325.0);
    }

    #[test]
    fn classes_for_same_substance_have_separate_registries() {
        let a = create_state_class(Substance::fluid("Water"), false, None).unwrap();
        let b = create_state_class(Substance::fluid("Water"), false, None).unwrap();
        assert!(!a.registry().shares_table_with(b.registry()));
        assert!(!a.same_class(&b));
        assert!(a.same_class(&a.clone()));

        a.register("PRANDTL", Unit::Dimensionless).unwrap();
        assert!(a.registry().contains("PRANDTL"));
        assert!(!b.registry().contains("PRANDTL"));
    }

    #[test]
    fn reject_bad_default_pressure() {
        let err = create_state_class(Substance::HumidAir, false, Some(pa(-1.0))).unwrap_err();
        assert!(matches!(err, FluidError::NonPhysical { .. }));
    }

    #[test]
    fn reject_empty_identifier() {
        let err = create_state_class(Substance::fluid("  "), false, None).unwrap_err();
        assert!(matches!(err, FluidError::InvalidArg { .. }));
    }

    #[test]
    fn unit_state_requires_unit_aware_class() {
        let air = create_state_class(Substance::fluid("Air"), false, None).unwrap();
        let err = air
            .unit_state(None, [("T", 273.15), ("P", 1e5)])
            .unwrap_err();
        assert!(matches!(err, FluidError::NotSupported { .. }));
    }
}

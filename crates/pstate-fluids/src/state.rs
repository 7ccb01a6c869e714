//! Points of state with lazily resolved, memoized variables.
//!
//! A [`PointOfState`] stores the independent variables it was built from and the
//! flattened argument list derived from them. Every other registered variable is
//! resolved on first access by calling the class evaluator with
//! `(variable, argument list)`, and the result is kept for the lifetime of the state.
//!
//! Failed evaluations are recorded but not cached: the next access tries again.

use crate::class::StateClass;
use crate::error::{FluidError, FluidResult};
use crate::evaluator::{Arg, flatten, render};
use crate::humid_air;
use crate::substance::Substance;
use indexmap::IndexMap;
use parking_lot::Mutex;
use pstate_core::ensure_finite;
use pstate_core::units::{Density, DynVisc, Pressure, Ratio, Temperature, Velocity};
use pstate_core::units::{k, kg_per_m3, mps, pa, pa_s, unitless};
use std::fmt;
use tracing::{debug, warn};

/// Cache slot of one variable.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Supplied at construction and part of the argument list.
    Given(f64),
    /// Supplied at construction but replaced in the argument list (humid air), or
    /// computed during that replacement. Never re-derived.
    Retained(f64),
    /// Computed by the evaluator.
    Resolved(f64),
    /// Last evaluation failed; retried on next access.
    Failed(FluidError),
}

impl Slot {
    /// Value of the slot, if it holds one.
    pub fn value(&self) -> Option<f64> {
        match self {
            Slot::Given(v) | Slot::Retained(v) | Slot::Resolved(v) => Some(*v),
            Slot::Failed(_) => None,
        }
    }
}

/// Independent variables of a state after input normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct StateInputs {
    /// Pairs that form the argument list, in order.
    pub given: Vec<(String, f64)>,
    /// Values kept aside of the argument list.
    pub retained: Vec<(String, f64)>,
}

/// A thermodynamic state fixed by its independent variables.
pub struct PointOfState {
    class: StateClass,
    name: Option<String>,
    args: Vec<Arg>,
    given: Vec<String>,
    slots: Mutex<IndexMap<String, Slot>>,
}

impl PointOfState {
    pub(crate) fn build(
        class: StateClass,
        name: Option<String>,
        given: Vec<(String, f64)>,
    ) -> FluidResult<Self> {
        check_inputs(&given)?;

        let inputs = if class.is_humid_air() {
            humid_air::normalize(given, class.default_pressure_pa(), class.evaluator())?
        } else {
            let expected = class.substance().independent_variables();
            if given.len() != expected {
                return Err(FluidError::InputCount {
                    expected,
                    got: given.len(),
                });
            }
            StateInputs {
                given,
                retained: Vec::new(),
            }
        };

        Ok(Self::from_inputs(class, name, inputs))
    }

    fn from_inputs(class: StateClass, name: Option<String>, inputs: StateInputs) -> Self {
        let mut args = flatten(inputs.given.iter().map(|(k, v)| (k.as_str(), *v)));
        if let Some(id) = class.substance().identifier() {
            args.push(Arg::substance(id));
        }

        let mut slots = IndexMap::new();
        for (k, v) in &inputs.given {
            slots.insert(k.clone(), Slot::Given(*v));
        }
        for (k, v) in &inputs.retained {
            slots.insert(k.clone(), Slot::Retained(*v));
        }

        debug!(
            class = class.name(),
            state = name.as_deref().unwrap_or("-"),
            args = %render(&args),
            "created point of state"
        );

        Self {
            class,
            name,
            given: inputs.given.into_iter().map(|(k, _)| k).collect(),
            args,
            slots: Mutex::new(slots),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn class(&self) -> &StateClass {
        &self.class
    }

    pub fn substance(&self) -> &Substance {
        self.class.substance()
    }

    /// Flattened argument list handed to the evaluator.
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// Variables in the argument list, in order.
    pub fn given_variables(&self) -> &[String] {
        &self.given
    }

    /// True when `name` currently holds a value (given, retained or resolved).
    pub fn is_resolved(&self, name: &str) -> bool {
        self.slots
            .lock()
            .get(name)
            .is_some_and(|slot| slot.value().is_some())
    }

    /// Current slot of `name`, if any.
    pub fn slot(&self, name: &str) -> Option<Slot> {
        self.slots.lock().get(name).cloned()
    }

    /// Value of a registered variable, resolving it on first access.
    pub fn get(&self, name: &str) -> FluidResult<f64> {
        let registry = self.class.registry();
        if !registry.contains(name) {
            return Err(registry.unknown(name));
        }

        // Held across evaluation so each variable is computed at most once.
        let mut slots = self.slots.lock();
        if let Some(v) = slots.get(name).and_then(Slot::value) {
            debug!(class = self.class.name(), variable = name, "cache hit");
            return Ok(v);
        }

        debug!(
            class = self.class.name(),
            evaluator = self.class.evaluator().name(),
            variable = name,
            args = %render(&self.args),
            "resolving variable"
        );
        match self.class.evaluator().evaluate(name, &self.args) {
            Ok(v) => {
                slots.insert(name.to_string(), Slot::Resolved(v));
                Ok(v)
            }
            Err(err) => {
                let err = match err {
                    FluidError::PropertyResolution { .. } => err,
                    other => FluidError::PropertyResolution {
                        variable: name.to_string(),
                        message: other.to_string(),
                    },
                };
                warn!(
                    class = self.class.name(),
                    variable = name,
                    error = %err,
                    "resolution failed"
                );
                slots.insert(name.to_string(), Slot::Failed(err.clone()));
                Err(err)
            }
        }
    }

    /// Every registered variable with its value. Fails on the first variable that
    /// cannot be resolved.
    pub fn known_variables(&self) -> FluidResult<IndexMap<String, f64>> {
        self.class
            .registry()
            .names()
            .into_iter()
            .map(|k| {
                let v = self.get(&k)?;
                Ok((k, v))
            })
            .collect()
    }

    /// Every registered variable with its value or the error that prevented it.
    ///
    /// Meant for interactive exploration, where partial results beat none.
    pub fn known_variables_or_errors(&self) -> IndexMap<String, FluidResult<f64>> {
        self.class
            .registry()
            .names()
            .into_iter()
            .map(|k| {
                let v = self.get(&k);
                (k, v)
            })
            .collect()
    }

    /// Values of the requested variables. Names not registered on the class are
    /// skipped silently.
    pub fn subset<I, K>(&self, names: I) -> FluidResult<IndexMap<String, f64>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let registry = self.class.registry();
        let mut out = IndexMap::new();
        for name in names {
            let name = name.as_ref();
            if registry.contains(name) {
                out.insert(name.to_string(), self.get(name)?);
            }
        }
        Ok(out)
    }

    pub fn pressure(&self) -> FluidResult<Pressure> {
        self.get("P").map(pa)
    }

    pub fn temperature(&self) -> FluidResult<Temperature> {
        self.get("T").map(k)
    }

    /// Mass density. Humid air reports the density of the mixture per humid-air mass.
    pub fn density(&self) -> FluidResult<Density> {
        if self.class.is_humid_air() {
            let vha = self.get("Vha")?;
            return Ok(kg_per_m3(1.0 / vha));
        }
        self.get("D").map(kg_per_m3)
    }

    pub fn viscosity(&self) -> FluidResult<DynVisc> {
        let key = if self.class.is_humid_air() { "M" } else { "V" };
        self.get(key).map(pa_s)
    }

    pub fn speed_of_sound(&self) -> FluidResult<Velocity> {
        self.require_fluid("speed of sound")?;
        self.get("A").map(mps)
    }

    /// Vapor quality of a pure fluid.
    pub fn quality(&self) -> FluidResult<Ratio> {
        self.require_fluid("quality")?;
        self.get("Q").map(unitless)
    }

    pub fn humidity_ratio(&self) -> FluidResult<Ratio> {
        self.require_humid_air("humidity ratio")?;
        self.get("W").map(unitless)
    }

    pub fn relative_humidity(&self) -> FluidResult<Ratio> {
        self.require_humid_air("relative humidity")?;
        self.get("R").map(unitless)
    }

    pub fn dew_point_temperature(&self) -> FluidResult<Temperature> {
        self.require_humid_air("dew-point temperature")?;
        self.get("D").map(k)
    }

    pub fn wet_bulb_temperature(&self) -> FluidResult<Temperature> {
        self.require_humid_air("wet-bulb temperature")?;
        self.get("B").map(k)
    }

    pub(crate) fn require_humid_air(&self, what: &str) -> FluidResult<()> {
        if self.class.is_humid_air() {
            Ok(())
        } else {
            Err(FluidError::NotSupported {
                what: format!("{} is only defined for humid air, not {}", what, self.class.name()),
            })
        }
    }

    fn require_fluid(&self, what: &str) -> FluidResult<()> {
        if self.class.is_humid_air() {
            Err(FluidError::NotSupported {
                what: format!("{} is not defined for humid air", what),
            })
        } else {
            Ok(())
        }
    }
}

/// Reject duplicate names and non-finite values.
fn check_inputs(given: &[(String, f64)]) -> FluidResult<()> {
    for (i, (name, value)) in given.iter().enumerate() {
        if name.trim().is_empty() {
            return Err(FluidError::InvalidArg {
                what: "empty variable name".to_string(),
            });
        }
        if given[..i].iter().any(|(other, _)| other == name) {
            return Err(FluidError::InvalidArg {
                what: format!("variable {} given twice", name),
            });
        }
        ensure_finite(*value, "given variable")?;
    }
    Ok(())
}

impl Clone for PointOfState {
    fn clone(&self) -> Self {
        Self {
            class: self.class.clone(),
            name: self.name.clone(),
            args: self.args.clone(),
            given: self.given.clone(),
            slots: Mutex::new(self.slots.lock().clone()),
        }
    }
}

impl fmt::Debug for PointOfState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointOfState")
            .field("class", &self.class.name())
            .field("name", &self.name)
            .field("args", &self.args)
            .field("slots", &*self.slots.lock())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::StateClassConfig;
    use crate::evaluator::PropertyEvaluator;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns the number of previous calls, so repeated evaluation is visible.
    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl PropertyEvaluator for Counting {
        fn name(&self) -> &str {
            "counting"
        }

        fn evaluate(&self, target: &str, _args: &[Arg]) -> FluidResult<f64> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if target == "Z" {
                return Err(FluidError::PropertyResolution {
                    variable: target.into(),
                    message: "unsupported".into(),
                });
            }
            Ok(1000.0 + n as f64)
        }
    }

    fn air(evaluator: Arc<Counting>) -> StateClass {
        StateClass::with_evaluator(StateClassConfig::new(Substance::fluid("Air")), evaluator)
            .unwrap()
    }

    #[test]
    fn argument_list_appends_substance() {
        let class = air(Arc::default());
        let p = class.state([("T", 273.15), ("P", 1e5)]).unwrap();
        assert_eq!(
            p.args(),
            &[
                Arg::name("T"),
                Arg::Value(273.15),
                Arg::name("P"),
                Arg::Value(1e5),
                Arg::substance("Air"),
            ]
        );
        assert_eq!(p.given_variables(), &["T".to_string(), "P".to_string()]);
    }

    #[test]
    fn given_variables_do_not_call_evaluator() {
        let counting = Arc::new(Counting::default());
        let p = air(counting.clone()).state([("T", 300.0), ("P", 1e5)]).unwrap();
        assert_eq!(p.get("T").unwrap(), 300.0);
        assert_eq!(p.get("P").unwrap(), 1e5);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn derived_variable_resolved_once() {
        let counting = Arc::new(Counting::default());
        let p = air(counting.clone()).state([("T", 300.0), ("P", 1e5)]).unwrap();
        let h1 = p.get("H").unwrap();
        let h2 = p.get("H").unwrap();
        assert_eq!(h1, h2);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
        assert_eq!(p.slot("H"), Some(Slot::Resolved(h1)));
    }

    #[test]
    fn failures_are_not_cached() {
        let counting = Arc::new(Counting::default());
        let p = air(counting.clone()).state([("T", 300.0), ("P", 1e5)]).unwrap();
        assert!(p.get("Z").unwrap_err().is_resolution());
        assert!(matches!(p.slot("Z"), Some(Slot::Failed(_))));
        assert!(!p.is_resolved("Z"));
        assert!(p.get("Z").is_err());
        assert_eq!(counting.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unregistered_variable_is_unknown() {
        let p = air(Arc::default()).state([("T", 300.0), ("P", 1e5)]).unwrap();
        assert!(matches!(
            p.get("PRANDTL"),
            Err(FluidError::UnknownVariable { .. })
        ));
    }

    #[test]
    fn pure_fluid_needs_two_inputs() {
        let class = air(Arc::default());
        assert_eq!(
            class.state([("T", 300.0)]).unwrap_err(),
            FluidError::InputCount {
                expected: 2,
                got: 1
            }
        );
        assert!(
            class
                .state([("T", 300.0), ("P", 1e5), ("H", 1.0)])
                .is_err()
        );
    }

    #[test]
    fn duplicate_and_non_finite_inputs_rejected() {
        let class = air(Arc::default());
        assert!(matches!(
            class.state([("T", 300.0), ("T", 310.0)]),
            Err(FluidError::InvalidArg { .. })
        ));
        assert!(matches!(
            class.state([("T", f64::INFINITY), ("P", 1e5)]),
            Err(FluidError::NonPhysical { .. })
        ));
    }

    #[test]
    fn known_variables_or_errors_keeps_going() {
        let p = air(Arc::default()).state([("T", 300.0), ("P", 1e5)]).unwrap();
        let all = p.known_variables_or_errors();
        assert_eq!(all.len(), p.class().registry().len());
        assert!(all["Z"].is_err());
        assert_eq!(*all["T"].as_ref().unwrap(), 300.0);
        assert!(p.known_variables().is_err());
    }

    #[test]
    fn subset_drops_unregistered_names() {
        let p = air(Arc::default()).state([("T", 300.0), ("P", 1e5)]).unwrap();
        let sub = p.subset(["T", "nonsense", "P"]).unwrap();
        assert_eq!(sub.keys().collect::<Vec<_>>(), vec!["T", "P"]);
    }

    #[test]
    fn clone_keeps_cache() {
        let counting = Arc::new(Counting::default());
        let p = air(counting.clone()).state([("T", 300.0), ("P", 1e5)]).unwrap();
        let h = p.get("H").unwrap();
        let q = p.clone();
        assert_eq!(q.get("H").unwrap(), h);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn humid_air_accessors_need_humid_air() {
        let p = air(Arc::default()).state([("T", 300.0), ("P", 1e5)]).unwrap();
        assert!(matches!(
            p.humidity_ratio(),
            Err(FluidError::NotSupported { .. })
        ));
        assert_eq!(p.temperature().unwrap().value, 300.0);
    }
}

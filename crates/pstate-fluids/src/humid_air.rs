//! Humid-air input normalization and derived states.
//!
//! `HAPropsSI` cannot take some input combinations directly. Two of them are
//! rewritten before a state is built:
//!
//! - `W` with `R`: `W` is replaced by the water mole fraction `psi_w = W / (ε + W)`.
//! - `D` with `R`: `psi_w` is looked up from `(P, D)` and replaces `D`; `W` follows
//!   from `psi_w`.
//!
//! Replaced inputs are retained on the state and never re-derived. Pressure defaults
//! to the class pressure and always comes after the other inputs.

use crate::error::{FluidError, FluidResult};
use crate::evaluator::{Arg, PropertyEvaluator};
use crate::state::{PointOfState, StateInputs};
use pstate_core::{ensure_finite, ensure_positive, lerp};
use pstate_core::units::constants::T_0_K;
use tracing::debug;

/// Ratio of the molar masses of water and dry air.
pub const EPSILON: f64 = 0.621945;

/// Water mole fraction from humidity ratio.
pub fn psi_w_from_humidity_ratio(w: f64) -> f64 {
    w / (EPSILON + w)
}

/// Humidity ratio from water mole fraction.
pub fn humidity_ratio_from_psi_w(psi_w: f64) -> f64 {
    EPSILON * psi_w / (1.0 - psi_w)
}

fn take(given: &mut Vec<(String, f64)>, name: &str) -> Option<f64> {
    let idx = given.iter().position(|(k, _)| k == name)?;
    Some(given.remove(idx).1)
}

fn has(given: &[(String, f64)], name: &str) -> bool {
    given.iter().any(|(k, _)| k == name)
}

/// Turn the user inputs of a humid-air state into the argument pairs handed to
/// `HAPropsSI` plus the values retained aside.
pub(crate) fn normalize(
    mut given: Vec<(String, f64)>,
    default_pressure_pa: f64,
    evaluator: &dyn PropertyEvaluator,
) -> FluidResult<StateInputs> {
    let p = take(&mut given, "P").unwrap_or(default_pressure_pa);
    if given.len() != 2 {
        return Err(FluidError::InputCount {
            expected: 3,
            got: given.len() + 1,
        });
    }
    ensure_positive(p, "pressure")?;

    let with_r = has(&given, "R");
    let mut retained = Vec::new();
    let mut psi_w = None;

    if with_r && has(&given, "W") {
        let w = take(&mut given, "W").unwrap_or_default();
        if w <= -EPSILON {
            return Err(FluidError::NonPhysical { what: "humidity ratio" });
        }
        let psi = ensure_finite(psi_w_from_humidity_ratio(w), "water mole fraction")?;
        debug!(w, psi_w = psi, "replaced W by psi_w");
        retained.push(("W".to_string(), w));
        psi_w = Some(psi);
    } else if with_r && has(&given, "D") {
        let d = take(&mut given, "D").unwrap_or_default();
        // T only completes the input set; psi_w does not depend on it.
        let args = [
            Arg::name("P"),
            Arg::Value(p),
            Arg::name("D"),
            Arg::Value(d),
            Arg::name("T"),
            Arg::Value(T_0_K),
        ];
        let psi = evaluator
            .evaluate("psi_w", &args)
            .map_err(|e| FluidError::Backend {
                message: format!("psi_w lookup from dew point {} K failed: {}", d, e),
            })?;
        if psi >= 1.0 {
            return Err(FluidError::NonPhysical {
                what: "water mole fraction",
            });
        }
        let w = ensure_finite(humidity_ratio_from_psi_w(psi), "humidity ratio")?;
        debug!(d, psi_w = psi, w, "replaced D by psi_w");
        retained.push(("D".to_string(), d));
        retained.push(("W".to_string(), w));
        psi_w = Some(psi);
    }

    given.push(("P".to_string(), p));
    if let Some(psi) = psi_w {
        given.push(("psi_w".to_string(), psi));
    }
    Ok(StateInputs { given, retained })
}

impl PointOfState {
    /// Saturated state at the dew point: `T = D`, `R = 1`.
    pub fn dew_point(&self, name: Option<&str>) -> FluidResult<PointOfState> {
        self.require_humid_air("dew point")?;
        let d = self.get("D")?;
        self.derive(name, [("T", d), ("R", 1.0)])
    }

    /// Saturated state at the wet-bulb temperature: `T = B`, `R = 1`.
    pub fn bulb_point(&self, name: Option<&str>) -> FluidResult<PointOfState> {
        self.require_humid_air("bulb point")?;
        let b = self.get("B")?;
        self.derive(name, [("T", b), ("R", 1.0)])
    }

    /// Adiabatic mixture with `fraction` of `other`:
    /// `W = W1 + f (W2 - W1)`, `H = H1 + f (H2 - H1)`, `f` in `[0, 1]`.
    pub fn mix(
        &self,
        other: &PointOfState,
        fraction: f64,
        name: Option<&str>,
    ) -> FluidResult<PointOfState> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(FluidError::OutOfRange {
                what: "fraction",
                value: fraction,
                min: 0.0,
                max: 1.0,
            });
        }
        self.hom_coord(other, fraction, name)
    }

    /// Point at `lambda` on the line through `self` (0) and `other` (1) in the
    /// `(W, H)` plane. `lambda` is not restricted. Both states must come from the
    /// same class.
    pub fn hom_coord(
        &self,
        other: &PointOfState,
        lambda: f64,
        name: Option<&str>,
    ) -> FluidResult<PointOfState> {
        self.require_humid_air("homogeneous coordinates")?;
        other.require_humid_air("homogeneous coordinates")?;
        if !self.class().same_class(other.class()) {
            return Err(FluidError::InvalidArg {
                what: format!(
                    "cannot combine states of {} and {}",
                    self.class().name(),
                    other.class().name()
                ),
            });
        }
        ensure_finite(lambda, "lambda")?;

        let (w1, h1) = (self.get("W")?, self.get("H")?);
        let (w2, h2) = (other.get("W")?, other.get("H")?);
        self.derive(name, [("W", lerp(w1, w2, lambda)), ("H", lerp(h1, h2, lambda))])
    }

    fn derive<const N: usize>(
        &self,
        name: Option<&str>,
        given: [(&str, f64); N],
    ) -> FluidResult<PointOfState> {
        let given = given.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        PointOfState::build(self.class().clone(), name.map(str::to_string), given)
    }
}

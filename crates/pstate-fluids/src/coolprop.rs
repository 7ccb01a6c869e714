//! CoolProp-based property evaluators.
//!
//! Two entry points of the CoolProp high-level interface are used:
//! - `PropsSI` for pure fluids and predefined mixtures (two inputs + fluid name)
//! - `HAPropsSI` for humid air (three inputs)
//!
//! Both are reached through `rfluids::native::CoolProp`, which exposes them with the
//! same string-keyed signature the states use for their argument lists.

use crate::error::{FluidError, FluidResult};
use crate::evaluator::{Arg, PropertyEvaluator, decode, render, validation};
use rfluids::native::CoolProp;

/// `PropsSI` backend for pure fluids.
///
/// Thread-safe: the CoolProp high-level functions are stateless from the caller's view.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoolPropEvaluator;

impl CoolPropEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl PropertyEvaluator for CoolPropEvaluator {
    fn name(&self) -> &str {
        "CoolProp::PropsSI"
    }

    fn evaluate(&self, target: &str, args: &[Arg]) -> FluidResult<f64> {
        let inputs = decode(args)?;
        validation::validate_inputs(&inputs)?;

        let (fluid, [(k1, v1), (k2, v2)]) = match (inputs.substance, inputs.pairs.as_slice()) {
            (Some(fluid), [a, b]) => (fluid, [*a, *b]),
            _ => {
                return Err(FluidError::InvalidArg {
                    what: format!(
                        "PropsSI needs two inputs and a fluid name, got [{}]",
                        render(args)
                    ),
                });
            }
        };

        let value = CoolProp::props_si(target, k1, v1, k2, v2, fluid).map_err(|e| {
            FluidError::PropertyResolution {
                variable: target.to_string(),
                message: format!("PropsSI({}): {}", render(args), e),
            }
        })?;
        validation::validate_output(target, value)
    }
}

/// `HAPropsSI` backend for humid air.
#[derive(Debug, Default, Clone, Copy)]
pub struct HumidAirEvaluator;

impl HumidAirEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl PropertyEvaluator for HumidAirEvaluator {
    fn name(&self) -> &str {
        "CoolProp::HAPropsSI"
    }

    fn evaluate(&self, target: &str, args: &[Arg]) -> FluidResult<f64> {
        let inputs = decode(args)?;
        validation::validate_inputs(&inputs)?;

        let [(k1, v1), (k2, v2), (k3, v3)] = match (inputs.substance, inputs.pairs.as_slice()) {
            (None, [a, b, c]) => [*a, *b, *c],
            _ => {
                return Err(FluidError::InvalidArg {
                    what: format!("HAPropsSI needs exactly three inputs, got [{}]", render(args)),
                });
            }
        };

        let value = CoolProp::ha_props_si(target, k1, v1, k2, v2, k3, v3).map_err(|e| {
            FluidError::PropertyResolution {
                variable: target.to_string(),
                message: format!("HAPropsSI({}): {}", render(args), e),
            }
        })?;
        validation::validate_output(target, value)
    }
}

//! Property evaluator trait and argument-list helpers.

use crate::error::{FluidError, FluidResult};
use std::fmt;

/// One element of a flattened evaluator argument list.
///
/// States keep their inputs as `[Name, Value, Name, Value, ..]`, with a trailing
/// `Substance` for pure fluids. The list is handed to the evaluator verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Name(String),
    Value(f64),
    Substance(String),
}

impl Arg {
    pub fn name(name: impl Into<String>) -> Self {
        Arg::Name(name.into())
    }

    pub fn substance(id: impl Into<String>) -> Self {
        Arg::Substance(id.into())
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Name(n) => write!(f, "'{}'", n),
            Arg::Value(v) => write!(f, "{}", v),
            Arg::Substance(s) => write!(f, "'{}'", s),
        }
    }
}

/// Flatten `(name, value)` pairs into an argument list.
pub fn flatten<'a>(pairs: impl IntoIterator<Item = (&'a str, f64)>) -> Vec<Arg> {
    pairs
        .into_iter()
        .flat_map(|(name, value)| [Arg::name(name), Arg::Value(value)])
        .collect()
}

/// Decoded view of an argument list: the input pairs and the optional substance.
#[derive(Debug, Clone, PartialEq)]
pub struct Inputs<'a> {
    pub pairs: Vec<(&'a str, f64)>,
    pub substance: Option<&'a str>,
}

/// Decode a flattened argument list, checking that it alternates name/value and that
/// a substance, if present, comes last.
pub fn decode(args: &[Arg]) -> FluidResult<Inputs<'_>> {
    let mut pairs = Vec::with_capacity(args.len() / 2);
    let mut substance = None;
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg {
            Arg::Substance(s) if substance.is_none() => substance = Some(s.as_str()),
            Arg::Name(name) if substance.is_none() => match iter.next() {
                Some(Arg::Value(v)) => pairs.push((name.as_str(), *v)),
                _ => {
                    return Err(FluidError::InvalidArg {
                        what: format!("input {} is not followed by a value", name),
                    });
                }
            },
            other => {
                return Err(FluidError::InvalidArg {
                    what: format!("unexpected argument {} in input list", other),
                });
            }
        }
    }
    Ok(Inputs { pairs, substance })
}

/// Render an argument list the way it is logged: `'T', 273.15, 'P', 100000, 'Air'`.
pub fn render(args: &[Arg]) -> String {
    args.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// External property evaluator.
///
/// Computes `target` from a flattened argument list. Implementations must be
/// thread-safe (Send + Sync) since one evaluator is shared by every state of a class.
pub trait PropertyEvaluator: Send + Sync {
    /// Get the evaluator name (for debugging/logging).
    fn name(&self) -> &str;

    /// Evaluate `target` for the given inputs.
    ///
    /// Failures (unsupported input combination, out-of-range input, unknown variable)
    /// are reported as [`FluidError::PropertyResolution`].
    fn evaluate(&self, target: &str, args: &[Arg]) -> FluidResult<f64>;
}

impl<E: PropertyEvaluator + ?Sized> PropertyEvaluator for std::sync::Arc<E> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn evaluate(&self, target: &str, args: &[Arg]) -> FluidResult<f64> {
        (**self).evaluate(target, args)
    }
}

/// Validation helpers for evaluator results.
pub(crate) mod validation {
    use super::*;

    /// Backends signal some failures with huge or non-finite results.
    pub fn validate_output(target: &str, value: f64) -> FluidResult<f64> {
        if !value.is_finite() || value.abs() >= 1e300 {
            return Err(FluidError::PropertyResolution {
                variable: target.to_string(),
                message: format!("backend returned non-finite value {}", value),
            });
        }
        Ok(value)
    }

    /// Ensure every input value is finite before calling a backend.
    pub fn validate_inputs(inputs: &Inputs<'_>) -> FluidResult<()> {
        for (_, v) in &inputs.pairs {
            pstate_core::ensure_finite(*v, "evaluator input")?;
        }
        Ok(())
    }
}

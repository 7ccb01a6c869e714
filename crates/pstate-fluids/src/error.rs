//! Point-of-state errors.

use crate::units::UnitError;
use pstate_core::CoreError;
use thiserror::Error;

/// Result type for point-of-state operations.
pub type FluidResult<T> = Result<T, FluidError>;

/// Errors raised by registries, states and property evaluators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// `register` called with a name the class already knows.
    #[error("Variable {name} is already registered in {class}")]
    DuplicateVariable { name: String, class: String },

    /// `unregister` or `get` called with a name the class does not know.
    #[error("Variable {name} not found in {class}")]
    UnknownVariable { name: String, class: String },

    /// The evaluator rejected the requested variable for this input set.
    #[error("Cannot resolve {variable}: {message}")]
    PropertyResolution { variable: String, message: String },

    /// Value outside its permitted interval (e.g. a mixing fraction).
    #[error("{what} = {value} is not in [{min}, {max}]")]
    OutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Wrong number of independent variables for the substance.
    #[error("Expected {expected} independent variables, got {got}")]
    InputCount { expected: usize, got: usize },

    /// Invalid argument.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    /// Operation not available for this kind of state (e.g. dew point of a pure fluid).
    #[error("Not supported: {what}")]
    NotSupported { what: String },

    /// Non-physical values (non-finite input, negative pressure, etc.).
    #[error("Non-physical value for {what}")]
    NonPhysical { what: &'static str },

    /// Backend lookup failed while normalizing inputs, before a state exists.
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// Unit parsing or conversion failed.
    #[error(transparent)]
    Unit(#[from] UnitError),
}

impl FluidError {
    /// True for evaluator failures, which are retried on the next access.
    pub fn is_resolution(&self) -> bool {
        matches!(self, FluidError::PropertyResolution { .. })
    }
}

impl From<CoreError> for FluidError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NonFinite { what, .. } | CoreError::NonPositive { what, .. } => {
                FluidError::NonPhysical { what }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FluidError::DuplicateVariable {
            name: "T".into(),
            class: "Air".into(),
        };
        assert_eq!(err.to_string(), "Variable T is already registered in Air");

        let err = FluidError::OutOfRange {
            what: "fraction",
            value: 1.5,
            min: 0.0,
            max: 1.0,
        };
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn core_error_converts() {
        let err: FluidError = CoreError::NonFinite {
            what: "T",
            value: f64::NAN,
        }
        .into();
        assert!(matches!(err, FluidError::NonPhysical { what: "T" }));
    }

    #[test]
    fn only_resolution_errors_are_retryable() {
        let err = FluidError::PropertyResolution {
            variable: "H".into(),
            message: "out of range".into(),
        };
        assert!(err.is_resolution());
        assert!(!FluidError::NonPhysical { what: "P" }.is_resolution());
    }
}

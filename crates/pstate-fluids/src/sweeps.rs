//! Process lines: sweeps of one input variable and mixing lines between two
//! humid-air states.

use crate::class::StateClass;
use crate::error::{FluidError, FluidResult};
use crate::state::PointOfState;
use crate::units::Measured;
use pstate_core::{Tolerances, nearly_equal};
use std::fmt;
use tracing::debug;

/// Type of sweep progression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SweepType {
    /// Uniformly spaced points
    Linear,
    /// Logarithmically spaced points
    Logarithmic,
}

/// Sweep of one independent variable between two values.
///
/// Bounds are stored in the registry unit of the swept variable.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepDefinition {
    pub variable: String,
    pub start: f64,
    pub end: f64,
    pub num_points: usize,
    pub sweep_type: SweepType,
}

impl SweepDefinition {
    pub fn new(
        variable: impl Into<String>,
        start: f64,
        end: f64,
        num_points: usize,
        sweep_type: SweepType,
    ) -> FluidResult<Self> {
        pstate_core::ensure_finite(start, "sweep start")?;
        pstate_core::ensure_finite(end, "sweep end")?;
        if num_points < 2 {
            return Err(FluidError::InvalidArg {
                what: "sweep must have at least 2 points".to_string(),
            });
        }
        if nearly_equal(start, end, Tolerances::default()) {
            return Err(FluidError::InvalidArg {
                what: "sweep start and end must differ".to_string(),
            });
        }
        Ok(Self {
            variable: variable.into(),
            start,
            end,
            num_points,
            sweep_type,
        })
    }

    /// Sweep from user text such as `"10 degC"` .. `"30 degC"`, converted to the
    /// registry unit of `variable` on `class`.
    pub fn from_text(
        class: &StateClass,
        variable: &str,
        start_raw: &str,
        end_raw: &str,
        num_points: usize,
        sweep_type: SweepType,
    ) -> FluidResult<Self> {
        let unit = class.registry().unit_of(variable)?;
        let start = Measured::from_text(start_raw)?.magnitude_as(unit)?;
        let end = Measured::from_text(end_raw)?.magnitude_as(unit)?;
        Self::new(variable, start, end, num_points, sweep_type)
    }

    /// Generate all points in the sweep.
    pub fn generate_points(&self) -> Vec<f64> {
        match self.sweep_type {
            SweepType::Linear => linspace(self.start, self.end, self.num_points),
            SweepType::Logarithmic => self.generate_logarithmic(),
        }
    }

    fn generate_logarithmic(&self) -> Vec<f64> {
        if self.start <= 0.0 || self.end <= 0.0 {
            return linspace(self.start, self.end, self.num_points);
        }
        let mut points: Vec<f64> = linspace(self.start.ln(), self.end.ln(), self.num_points)
            .into_iter()
            .map(f64::exp)
            .collect();
        if let Some(last) = points.last_mut() {
            *last = self.end;
        }
        if let Some(first) = points.first_mut() {
            *first = self.start;
        }
        points
    }

    /// One state per sweep point; `fixed` supplies the remaining inputs.
    pub fn states(
        &self,
        class: &StateClass,
        fixed: &[(&str, f64)],
    ) -> FluidResult<Vec<PointOfState>> {
        debug!(class = class.name(), sweep = %self, "building sweep states");
        self.generate_points()
            .into_iter()
            .map(|v| {
                let given = fixed
                    .iter()
                    .copied()
                    .chain(std::iter::once((self.variable.as_str(), v)));
                class.state(given)
            })
            .collect()
    }
}

/// `n` evenly spaced values from `a` to `b`, both included.
fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    if n <= 1 {
        return vec![a];
    }
    let delta = (b - a) / (n - 1) as f64;
    let mut points: Vec<f64> = (0..n).map(|i| a + i as f64 * delta).collect();
    points[n - 1] = b;
    points
}

impl PointOfState {
    /// `n` states on the mixing line from `self` to `other`, both ends included.
    pub fn mixing_line(&self, other: &PointOfState, n: usize) -> FluidResult<Vec<PointOfState>> {
        if n < 2 {
            return Err(FluidError::InvalidArg {
                what: "mixing line needs at least 2 points".to_string(),
            });
        }
        linspace(0.0, 1.0, n)
            .into_iter()
            .map(|f| self.mix(other, f, None))
            .collect()
    }
}

impl fmt::Display for SweepType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linear => write!(f, "Linear"),
            Self::Logarithmic => write!(f, "Logarithmic"),
        }
    }
}

impl fmt::Display for SweepDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Sweep {} from {} to {} ({} points, {})",
            self.variable, self.start, self.end, self.num_points, self.sweep_type
        )
    }
}

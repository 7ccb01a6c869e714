//! Float helpers shared by the state crates.

use crate::{CoreError, CoreResult};

/// Floating point type used throughout system
pub type Real = f64;

/// Absolute and relative tolerance pair
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> CoreResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CoreError::NonFinite { what, value: v })
    }
}

/// Finite and strictly positive (pressures, absolute temperatures).
pub fn ensure_positive(v: Real, what: &'static str) -> CoreResult<Real> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(CoreError::NonPositive { what, value: v })
    }
}

/// Round `v` to `digits` decimal places (negative digits round to tens, hundreds, ...).
pub fn round_to(v: Real, digits: i32) -> Real {
    let scale = 10f64.powi(digits);
    (v * scale).round() / scale
}

/// Point on the line through `a` and `b`: `a + lambda * (b - a)`.
#[inline]
pub fn lerp(a: Real, b: Real, lambda: Real) -> Real {
    a + lambda * (b - a)
}

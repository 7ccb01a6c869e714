//! Deterministic evaluator shared by the integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use pstate_fluids::evaluator::decode;
use pstate_fluids::{
    Arg, FluidError, FluidResult, PropertyEvaluator, StateClass, StateClassConfig, Substance,
};
use std::sync::Arc;

/// Records every call and answers from a small lookup: given inputs echo back,
/// `psi_w` is fixed, unknown targets fail.
#[derive(Default)]
pub struct RecordingEvaluator {
    calls: Mutex<Vec<(String, Vec<Arg>)>>,
}

impl RecordingEvaluator {
    pub fn calls(&self) -> Vec<(String, Vec<Arg>)> {
        self.calls.lock().clone()
    }

    pub fn count(&self, target: &str) -> usize {
        self.calls.lock().iter().filter(|(t, _)| t == target).count()
    }
}

pub const PSI_W: f64 = 0.015;

impl PropertyEvaluator for RecordingEvaluator {
    fn name(&self) -> &str {
        "recording"
    }

    fn evaluate(&self, target: &str, args: &[Arg]) -> FluidResult<f64> {
        self.calls.lock().push((target.to_string(), args.to_vec()));
        let inputs = decode(args)?;
        if let Some((_, v)) = inputs.pairs.iter().find(|(k, _)| *k == target) {
            return Ok(*v);
        }
        match target {
            "psi_w" => Ok(PSI_W),
            "H" => Ok(50_000.0),
            "W" => Ok(0.008),
            "D" | "B" => Ok(285.0),
            "NOPE" => Err(FluidError::PropertyResolution {
                variable: target.to_string(),
                message: "not available".to_string(),
            }),
            _ => Ok(1.0),
        }
    }
}

pub fn class_with(
    substance: Substance,
    unit_aware: bool,
) -> (StateClass, Arc<RecordingEvaluator>) {
    let evaluator = Arc::new(RecordingEvaluator::default());
    let class = StateClass::with_evaluator(
        StateClassConfig::new(substance).with_units(unit_aware),
        evaluator.clone(),
    )
    .unwrap();
    (class, evaluator)
}

//! pstate-fluids: points of state with lazily resolved, memoized variables.
//!
//! Provides:
//! - State classes per substance, each with its own variable registry
//! - Points of state that resolve variables on demand and cache them
//! - Humid-air input normalization and derived states (dew point, mixing)
//! - A unit-aware layer that reads and writes measured values
//! - CoolProp evaluators (`PropsSI`, `HAPropsSI`) via `rfluids`
//!
//! # Architecture
//!
//! Property physics lives behind the [`PropertyEvaluator`] trait. A state only keeps
//! its inputs as a flattened argument list and hands that list, together with the
//! requested variable name, to the evaluator of its class. Tests and other backends
//! can provide their own evaluator through [`StateClass::with_evaluator`].
//!
//! # Example
//!
//! ```no_run
//! use pstate_fluids::{create_state_class, Measured, Substance, Unit};
//!
//! let humid_air = create_state_class(Substance::HumidAir, true, None).unwrap();
//! let inlet = humid_air
//!     .unit_state(
//!         Some("inlet"),
//!         [
//!             ("T", Measured::new(20.0, Unit::Celsius)),
//!             ("R", Measured::new(50.0, Unit::Percent)),
//!         ],
//!     )
//!     .unwrap();
//! let dew = inlet.dew_point(Some("dew")).unwrap();
//! println!("dew point: {}", dew.get("T").unwrap().to(Unit::Celsius).unwrap());
//! ```

pub mod class;
pub mod coolprop;
pub mod error;
pub mod evaluator;
pub mod humid_air;
pub mod registry;
pub mod state;
pub mod substance;
pub mod sweeps;
pub mod unit_state;
pub mod units;

// Re-exports for ergonomics
pub use class::{StateClass, StateClassConfig, create_state_class};
pub use coolprop::{CoolPropEvaluator, HumidAirEvaluator};
pub use error::{FluidError, FluidResult};
pub use evaluator::{Arg, PropertyEvaluator};
pub use humid_air::EPSILON;
pub use registry::{FLUID_DEFAULT_VARIABLES, HUMID_AIR_DEFAULT_VARIABLES, PropertyRegistry};
pub use state::{PointOfState, Slot};
pub use substance::{HUMID_AIR, Species, Substance};
pub use sweeps::{SweepDefinition, SweepType};
pub use unit_state::{Input, Selector, UnitState};
pub use units::{Dimension, Measured, Unit, UnitError};

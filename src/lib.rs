//! # torque_curve
//!
//! The `torque_curve` crate sweeps a single-cylinder four-stroke engine across
//! engine speed and plots its torque and power curves.
//!
//! Torque comes from any [`TorqueModel`]: the simulated [`Engine`] or, with the
//! `native` feature, the prebuilt torque-curve shared library.
//!
//! ```no_run
//! use torque_curve::{run_sweep, Chart, Engine, EngineSetup, SweepPlan, SweepVariant};
//!
//! let setup = EngineSetup::default();
//! let mut engine = Engine::new(setup.clone()).unwrap();
//! let plan = SweepPlan::for_variant(SweepVariant::Reconfigure);
//! let curve = run_sweep(&mut engine, &plan, &setup).unwrap();
//! Chart::from_curve(&curve).unwrap().show().unwrap();
//! ```

mod base;
mod engine;
mod numerics;
mod render;
mod sweep;
pub mod units;
#[cfg(feature = "native")]
mod native;

// Re-exporting
pub use crate::base::error::{EngineError, Result};
pub use crate::base::traits::TorqueModel;
pub use crate::engine::combustion::{Combustion, Motoring, OxygenCombustion};
pub use crate::engine::cycle_log::{CycleLog, CycleSample};
pub use crate::engine::engine::{time_step, Engine, EngineState, FRAMETIME, MIN_SPEED, SIMULATION_MULTIPLIER};
pub use crate::engine::gas::{Charge, AMBIENT_PRESSURE, AMBIENT_TEMPERATURE};
pub use crate::engine::geometry::CylinderGeometry;
pub use crate::engine::json_reader::{EngineSetup, RunConfig, Source};
pub use crate::engine::piston::{Piston, SpeedMode};
pub use crate::engine::valve::ValveTiming;
#[cfg(feature = "native")]
pub use crate::native::{NativeEngine, DEFAULT_LIBRARY_PATH};
pub use crate::numerics::ode_solvers;
pub use crate::render::{Chart, PvChart};
pub use crate::sweep::{run_sweep, Sample, SweepPlan, SweepVariant, TorqueCurve};

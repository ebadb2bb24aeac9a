use crate::base::error::{EngineError, Result};
use crate::base::traits::TorqueModel;
use crate::engine::cycle_log::{CycleLog, CycleSample};
use crate::engine::geometry::CylinderGeometry;
use crate::engine::json_reader::EngineSetup;
use crate::engine::piston::{Piston, SpeedMode};
use crate::engine::valve::ValveTiming;
use crate::numerics::ode_solvers::Scheme;
use crate::units::{m3_to_cc, rads_to_rpm};
use ansi_term::Style;
use std::f64::consts::PI;

pub const FRAMETIME: f64 = 25.0; // [ms]
pub const SIMULATION_MULTIPLIER: u32 = 200;
/// Slowest crankshaft speed a run accepts `[rad/s]`
pub const MIN_SPEED: f64 = 1.0;
/// Most integration steps a single run may take
const MAX_STEPS: u64 = 20_000_000;

/// Integration step `[s]` when a frame of `frametime` ms is split in `multiplier` sub-steps
pub fn time_step(multiplier: u32, frametime: f64) -> f64 {
    frametime / (1000.0 * multiplier as f64)
}

fn check_speed(omega: f64) -> Result<()> {
    if !(omega >= MIN_SPEED && omega.is_finite()) {
        return Err(EngineError::Config(format!(
            "engine speed must be at least {} rad/s: {}",
            MIN_SPEED, omega
        )));
    }
    Ok(())
}

fn step_budget(steps: f64) -> Result<u64> {
    if !(steps <= MAX_STEPS as f64) {
        return Err(EngineError::Config(format!(
            "run needs {:.3e} steps, more than the {} allowed",
            steps, MAX_STEPS
        )));
    }
    Ok(steps as u64)
}

/// Simulated single-cylinder four-stroke engine.
///
/// # Examples
///
/// ```no_run
/// use torque_curve::{Engine, EngineSetup};
/// let mut engine = Engine::new(EngineSetup::default()).unwrap();
/// let torque = engine.torque_at_speed(100.0, 40).unwrap();
/// println!("{:.2} Nm", torque);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    piston: Piston,
    setup: EngineSetup,
    log: CycleLog,
    time_step: f64,
    scheme: Scheme,
}

/// Snapshot of the cylinder
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineState {
    pub crank_angle: f64, // [CA deg]
    pub omega: f64,       // [rad/s]
    pub pressure: f64,    // [Pa]
    pub temperature: f64, // [K]
    pub volume: f64,      // [m³]
    pub torque: f64,      // [Nm]
}

impl Engine {
    pub fn new(setup: EngineSetup) -> Result<Engine> {
        Engine::with_geometry(CylinderGeometry::default(), ValveTiming::default(), setup)
    }

    pub fn with_geometry(geometry: CylinderGeometry, valves: ValveTiming, setup: EngineSetup) -> Result<Engine> {
        setup.validate()?;
        Ok(Engine {
            piston: Piston::new(geometry, valves, &setup),
            setup,
            log: CycleLog::new(),
            time_step: time_step(SIMULATION_MULTIPLIER, FRAMETIME),
            scheme: Scheme::RungeKutta4,
        })
    }

    pub fn set_time_step(&mut self, dt: f64) -> Result<()> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(EngineError::Config(format!("time step must be positive: {}", dt)));
        }
        self.time_step = dt;
        Ok(())
    }

    pub fn set_scheme(&mut self, scheme: Scheme) {
        self.scheme = scheme;
    }

    pub fn setup(&self) -> &EngineSetup {
        &self.setup
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Back to intake TDC at `omega` `[rad/s]` with an ambient charge and an empty log.
    pub fn reset(&mut self, omega: f64) {
        self.piston.reset(omega);
        self.log.clear();
    }

    /// Advances one time step. Returns `true` when a cycle was completed.
    pub fn step(&mut self, mode: SpeedMode) -> bool {
        let new_cycle = self.piston.update(self.time_step, mode, self.scheme);
        let state = self.state();
        self.log.push(CycleSample {
            crank_angle: state.crank_angle,
            volume: state.volume,
            pressure: state.pressure,
            temperature: state.temperature,
            torque: state.torque,
        });
        if new_cycle {
            self.log.trigger();
        }
        new_cycle
    }

    /// Mean torque `[Nm]` over `frames` frames with the crankshaft held at `omega` `[rad/s]`.
    ///
    /// Each frame is [`SIMULATION_MULTIPLIER`] steps. The mean torque of every
    /// cycle completed during the run is summed and divided by one more than
    /// the number of completed cycles, so a run too short to finish a cycle
    /// reports zero.
    pub fn torque_at_speed(&mut self, omega: f64, frames: u32) -> Result<f64> {
        check_speed(omega)?;
        if frames == 0 {
            return Err(EngineError::Config("at least one frame is required".to_string()));
        }
        let steps = step_budget(frames as f64 * SIMULATION_MULTIPLIER as f64)?;
        self.reset(omega);

        let mut sum = 0.0;
        let mut reps = 1;
        for _ in 0..steps {
            if !self.step(SpeedMode::Imposed(omega)) {
                continue;
            }
            if let Some(mean) = self.log.mean_torque() {
                log::debug!("cycle {} at {:.0} rpm: {:.3} Nm", reps, rads_to_rpm(omega), mean);
                sum += mean;
                reps += 1;
            }
        }
        Ok(sum / reps as f64)
    }

    /// Mean torque `[Nm]` over whole cycles with the crankshaft held at `omega` `[rad/s]`.
    ///
    /// A first cycle is run to wash out the initial charge, then the mean
    /// torque of each of the next `cycles` cycles is averaged.
    pub fn mean_cycle_torque(&mut self, omega: f64, cycles: u32) -> Result<f64> {
        check_speed(omega)?;
        if cycles == 0 {
            return Err(EngineError::Config("at least one engine cycle is required".to_string()));
        }
        let steps_per_cycle = (4.0 * PI / (omega * self.time_step)).ceil() + 1.0;
        let limit = step_budget((cycles as f64 + 1.0) * steps_per_cycle)?;
        self.reset(omega);

        let mut completed = 0;
        let mut sum = 0.0;
        for _ in 0..limit {
            if !self.step(SpeedMode::Imposed(omega)) {
                continue;
            }
            completed += 1;
            if completed == 1 {
                continue;
            }
            if let Some(mean) = self.log.mean_torque() {
                log::debug!(
                    "cycle {} at {:.0} rpm: {:.3} Nm",
                    completed - 1,
                    rads_to_rpm(omega),
                    mean
                );
                sum += mean;
            }
            if completed == cycles + 1 {
                return Ok(sum / cycles as f64);
            }
        }
        Err(EngineError::Config(format!(
            "only {} of {} cycles completed at {} rad/s",
            completed.max(1) - 1,
            cycles,
            omega
        )))
    }

    /// Lets the crankshaft spin freely for `duration` seconds against `load_torque` `[Nm]`,
    /// starting at `omega` `[rad/s]`. Returns the final speed, zero if the engine stalled.
    pub fn run_free(&mut self, omega: f64, load_torque: f64, duration: f64) -> Result<f64> {
        check_speed(omega)?;
        if !(duration >= 0.0 && duration.is_finite()) {
            return Err(EngineError::Config(format!("duration must be non-negative: {}", duration)));
        }
        let steps = step_budget((duration / self.time_step).round())?;
        self.reset(omega);
        for _ in 0..steps {
            self.step(SpeedMode::Free { load_torque });
            if self.piston.omega() <= 0.0 {
                log::warn!("engine stalled at {:.1} CA deg", self.piston.crank_angle());
                self.piston.stall();
                return Ok(0.0);
            }
        }
        Ok(self.piston.omega())
    }

    /// Samples of the last complete cycle, empty before the first one ends
    pub fn last_cycle(&self) -> &[CycleSample] {
        self.log.last_cycle()
    }

    pub fn state(&self) -> EngineState {
        EngineState {
            crank_angle: self.piston.crank_angle(),
            omega: self.piston.omega(),
            pressure: self.piston.pressure(),
            temperature: self.piston.temperature(),
            volume: self.piston.volume(),
            torque: self.piston.torque(),
        }
    }

    pub fn geometry(&self) -> &CylinderGeometry {
        self.piston.geometry()
    }
}

impl TorqueModel for Engine {
    fn configure(&mut self, setup: &EngineSetup) -> Result<()> {
        setup.validate()?;
        self.piston.apply_setup(setup);
        self.setup = setup.clone();
        Ok(())
    }

    fn torque_at_speed(&mut self, omega: f64, frames: u32) -> Result<f64> {
        Engine::torque_at_speed(self, omega, frames)
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let geometry = self.geometry();
        write!(
            f,
            "{}:
        combustion: `{}`
        {}
        bore: {:.1} [mm] \t\t stroke: {:.1} [mm]
        displacement: {:.1} [cm³] \t compression ratio: {:.1}
        {}
        advance: {:.1} [CA deg] \t throttle: {:.2}
        intake coef: {:.2e} \t exhaust coef: {:.2e}
        time step: {:.3} [ms]",
            Style::new().bold().paint("Engine"),
            self.piston.combustion().model_name(),
            Style::new().underline().paint("     Geometry     "),
            geometry.bore() * 1e3,
            geometry.stroke() * 1e3,
            m3_to_cc(geometry.displacement()),
            geometry.compression_ratio(),
            Style::new().underline().paint("      Setup       "),
            self.setup.combustion_advance,
            self.setup.throttle,
            self.setup.intake_coef,
            self.setup.exhaust_coef,
            self.time_step * 1e3,
        )
    }
}

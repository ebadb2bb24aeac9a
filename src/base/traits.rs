use crate::base::error::Result;
use crate::engine::json_reader::EngineSetup;

/// Anything able to answer "which torque does the engine deliver at this speed".
///
/// Implemented by the simulated [`Engine`](crate::Engine) and, with the `native`
/// feature, by the shared-library binding.
pub trait TorqueModel {
    /// Applies combustion advance, flow coefficients, combustion speed and throttle.
    fn configure(&mut self, setup: &EngineSetup) -> Result<()>;
    /// Mean torque `[Nm]` at the crankshaft speed `omega` `[rad/s]` after running `frames` frames.
    fn torque_at_speed(&mut self, omega: f64, frames: u32) -> Result<f64>;
}

impl<T: TorqueModel + ?Sized> TorqueModel for Box<T> {
    fn configure(&mut self, setup: &EngineSetup) -> Result<()> {
        (**self).configure(setup)
    }
    fn torque_at_speed(&mut self, omega: f64, frames: u32) -> Result<f64> {
        (**self).torque_at_speed(omega, frames)
    }
}

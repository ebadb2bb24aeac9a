//! Binding to the prebuilt torque-curve shared library.
//!
//! Exported functions use C floats; everything is converted to `f64` at this boundary.

use crate::base::error::{EngineError, Result};
use crate::base::traits::TorqueModel;
use crate::engine::json_reader::EngineSetup;
use crate::sweep::{Sample, TorqueCurve};
use libloading::{Library, Symbol};
use std::os::raw::{c_float, c_int};
use std::path::{Path, PathBuf};

pub const DEFAULT_LIBRARY_PATH: &str = "build/libtorqueCurve.so";

/// Length of the `speed_v` and `torque_v` arrays filled by the batch entry point
const BATCH_LEN: usize = 30;

type SetScalar = unsafe extern "C" fn(c_float);
type SetPair = unsafe extern "C" fn(c_float, c_float);
type GetTorque = unsafe extern "C" fn(c_float, c_int) -> c_float;
type Batch = unsafe extern "C" fn();

pub struct NativeEngine {
    library: Library,
    path: PathBuf,
}

impl NativeEngine {
    /// Loads the shared library at `path`. The handle is released on drop.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<NativeEngine> {
        let path = path.as_ref().to_path_buf();
        // SAFETY: loading runs the library constructors, the torque-curve library has none with side effects
        let library = unsafe { Library::new(&path) }.map_err(|err| {
            EngineError::Library(format!("unable to load {}: {}", path.display(), err))
        })?;
        log::info!("loaded {}", path.display());
        Ok(NativeEngine { library, path })
    }

    fn symbol<T>(&self, name: &str) -> Result<Symbol<'_, T>> {
        let c_name = format!("{}\0", name);
        // SAFETY: every caller names `T` after the C declaration of `name`
        unsafe { self.library.get(c_name.as_bytes()) }.map_err(|err| {
            EngineError::Library(format!("`{}` not found in {}: {}", name, self.path.display(), err))
        })
    }

    /// Runs the library's own sweep and copies its result arrays.
    ///
    /// Speeds are reported as written by the library.
    pub fn run_batch(&mut self) -> Result<TorqueCurve> {
        let batch: Symbol<Batch> = self.symbol("main")?;
        // SAFETY: `main` takes no argument we rely on and only writes the two global arrays
        unsafe { batch() };

        let speed_v: Symbol<*const [c_float; BATCH_LEN]> = self.symbol("speed_v")?;
        let torque_v: Symbol<*const [c_float; BATCH_LEN]> = self.symbol("torque_v")?;
        // SAFETY: both symbols are `float[30]` globals, copied out while the library is loaded
        let (speeds, torques) = unsafe { (**speed_v, **torque_v) };

        Ok(speeds
            .iter()
            .zip(torques.iter())
            .map(|(&speed, &torque)| Sample {
                speed_rpm: speed as f64,
                torque: torque as f64,
            })
            .collect())
    }
}

impl TorqueModel for NativeEngine {
    fn configure(&mut self, setup: &EngineSetup) -> Result<()> {
        setup.validate()?;
        let set_advance: Symbol<SetScalar> = self.symbol("setCombustionAdvance")?;
        let set_coefs: Symbol<SetPair> = self.symbol("setIntakeExhaustCoefs")?;
        let set_speed: Symbol<SetScalar> = self.symbol("setCombustionSpeed")?;
        let set_throttle: Symbol<SetScalar> = self.symbol("setThrottle")?;
        if !setup.ignition {
            log::debug!("ignition cannot be switched off in {}", self.path.display());
        }
        // SAFETY: setters only store their arguments
        unsafe {
            set_advance(setup.combustion_advance_rad() as c_float);
            set_coefs(setup.intake_coef as c_float, setup.exhaust_coef as c_float);
            set_speed(setup.combustion_speed as c_float);
            set_throttle(setup.throttle as c_float);
        }
        Ok(())
    }

    fn torque_at_speed(&mut self, omega: f64, frames: u32) -> Result<f64> {
        let iterations = c_int::try_from(frames)
            .map_err(|_| EngineError::Config(format!("too many frames: {}", frames)))?;
        let get_torque: Symbol<GetTorque> = self.symbol("GetTorqueAtSpeed")?;
        // SAFETY: plain value arguments and result
        let torque = unsafe { get_torque(omega as c_float, iterations) };
        Ok(torque as f64)
    }
}

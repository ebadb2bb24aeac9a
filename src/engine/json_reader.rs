use crate::base::error::{EngineError, Result};
use crate::sweep::{SweepPlan, SweepVariant};
use crate::units::deg_to_rad;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine parameters applied through [`TorqueModel::configure`](crate::TorqueModel::configure).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSetup {
    pub combustion_advance: f64, // [CA deg] before firing TDC
    pub intake_coef: f64,        // [J/(K.s.Pa)]
    pub exhaust_coef: f64,       // [J/(K.s.Pa)]
    pub combustion_speed: f64,   // [1/(s.J/K)]
    pub throttle: f64,           // [-] 0 to 1
    pub ignition: bool,
}

impl Default for EngineSetup {
    fn default() -> Self {
        EngineSetup {
            combustion_advance: 15.0,
            intake_coef: 0.00008,
            exhaust_coef: 0.00008,
            combustion_speed: 15000.0,
            throttle: 1.0,
            ignition: true,
        }
    }
}

impl EngineSetup {
    pub fn combustion_advance_rad(&self) -> f64 {
        deg_to_rad(self.combustion_advance)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=90.0).contains(&self.combustion_advance) {
            return Err(EngineError::Config(format!(
                "combustion advance must be between 0 and 90 CA deg: {}",
                self.combustion_advance
            )));
        }
        if !(self.intake_coef >= 0.0 && self.intake_coef.is_finite())
            || !(self.exhaust_coef >= 0.0 && self.exhaust_coef.is_finite())
        {
            return Err(EngineError::Config(format!(
                "flow coefficients must be non-negative: intake {}, exhaust {}",
                self.intake_coef, self.exhaust_coef
            )));
        }
        if !(self.combustion_speed >= 0.0 && self.combustion_speed.is_finite()) {
            return Err(EngineError::Config(format!(
                "combustion speed must be non-negative: {}",
                self.combustion_speed
            )));
        }
        if !(0.0..=1.0).contains(&self.throttle) {
            return Err(EngineError::Config(format!(
                "throttle must be between 0 and 1: {}",
                self.throttle
            )));
        }
        Ok(())
    }
}

/// Where torque values come from
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Source {
    Simulated,
    Native { path: String },
}

impl Default for Source {
    fn default() -> Self {
        Source::Simulated
    }
}

/// Content of a run file. Every field is optional.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub source: Source,
    pub sweep: SweepPlan,
    pub engine: EngineSetup,
    /// Also write the chart to this SVG file
    pub output: Option<String>,
    /// Open an interactive gnuplot window
    pub show: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            source: Source::default(),
            sweep: SweepPlan::for_variant(SweepVariant::Reconfigure),
            engine: EngineSetup::default(),
            output: None,
            show: true,
        }
    }
}

impl RunConfig {
    pub fn from_file<P: AsRef<Path>>(file_name: P) -> Result<RunConfig> {
        let json_file = std::fs::read_to_string(file_name)?;
        let config: RunConfig = serde_json::from_str(&json_file)?;
        config.engine.validate()?;
        config.sweep.validate()?;
        Ok(config)
    }
}

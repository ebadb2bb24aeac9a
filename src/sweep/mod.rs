//! Speed sweep: drives a [`TorqueModel`] across engine speed and records the torque curve.

use crate::base::error::{EngineError, Result};
use crate::base::traits::TorqueModel;
use crate::engine::json_reader::EngineSetup;
use crate::units::{power_kw, rads_to_rpm};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SweepVariant {
    /// Apply the whole engine setup before every query and stop at the first negative torque
    Reconfigure,
    /// Use the model as it is, sample every step
    Preconfigured,
}

/// Speeds are crankshaft speeds in `[rad/s]`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SweepPlan {
    pub start_speed: f64,
    pub step: f64,
    pub steps: usize,
    /// Frames simulated per sample, see [`Engine::torque_at_speed`](crate::Engine::torque_at_speed)
    #[serde(alias = "cycles")]
    pub frames: u32,
    pub variant: SweepVariant,
}

impl SweepPlan {
    pub fn for_variant(variant: SweepVariant) -> SweepPlan {
        match variant {
            SweepVariant::Reconfigure => SweepPlan {
                start_speed: 50.0,
                step: 24.0,
                steps: 40,
                frames: 1,
                variant,
            },
            SweepVariant::Preconfigured => SweepPlan {
                start_speed: 10.0,
                step: 20.0,
                steps: 30,
                frames: 100,
                variant,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(EngineError::Config("a sweep needs at least one step".to_string()));
        }
        if !(self.step > 0.0 && self.step.is_finite()) {
            return Err(EngineError::Config(format!("speed step must be positive: {}", self.step)));
        }
        if !(self.start_speed >= 0.0 && self.start_speed.is_finite()) {
            return Err(EngineError::Config(format!(
                "start speed must be non-negative: {}",
                self.start_speed
            )));
        }
        if self.frames == 0 {
            return Err(EngineError::Config("at least one frame per sample is required".to_string()));
        }
        Ok(())
    }

    /// Speed of every sample: the speed is incremented before each query.
    pub fn speeds(&self) -> impl Iterator<Item = f64> + '_ {
        (1..=self.steps).map(move |i| self.start_speed + i as f64 * self.step)
    }
}

impl Default for SweepPlan {
    fn default() -> Self {
        SweepPlan::for_variant(SweepVariant::Reconfigure)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub speed_rpm: f64, // [RPM]
    pub torque: f64,    // [Nm]
}

impl Sample {
    pub fn power_kw(&self) -> f64 {
        power_kw(self.torque, self.speed_rpm)
    }
}

/// Torque samples in increasing speed order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TorqueCurve {
    samples: Vec<Sample>,
}

impl TorqueCurve {
    pub fn new() -> TorqueCurve {
        TorqueCurve::default()
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn speed_log(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.speed_rpm).collect()
    }

    pub fn torque_log(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.torque).collect()
    }

    /// `[kW]`, computed from the stored torque and speed
    pub fn power_log(&self) -> Vec<f64> {
        self.samples.iter().map(Sample::power_kw).collect()
    }

    /// Sample with the highest power, if any
    pub fn peak_power(&self) -> Option<Sample> {
        self.samples
            .iter()
            .copied()
            .max_by(|a, b| a.power_kw().total_cmp(&b.power_kw()))
    }

    /// Sample with the highest torque, if any
    pub fn peak_torque(&self) -> Option<Sample> {
        self.samples
            .iter()
            .copied()
            .max_by(|a, b| a.torque.total_cmp(&b.torque))
    }
}

impl FromIterator<Sample> for TorqueCurve {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        TorqueCurve {
            samples: iter.into_iter().collect(),
        }
    }
}

/// Queries `model` at every speed of `plan`.
///
/// With [`SweepVariant::Reconfigure`] `setup` is applied before each query
/// and the sweep ends right after the first negative torque, which is kept.
/// With [`SweepVariant::Preconfigured`] `setup` is not used.
pub fn run_sweep<M>(model: &mut M, plan: &SweepPlan, setup: &EngineSetup) -> Result<TorqueCurve>
where
    M: TorqueModel + ?Sized,
{
    plan.validate()?;
    let mut curve = TorqueCurve::new();
    for speed in plan.speeds() {
        if plan.variant == SweepVariant::Reconfigure {
            model.configure(setup)?;
        }
        let torque = model.torque_at_speed(speed, plan.frames)?;
        let speed_rpm = rads_to_rpm(speed);
        curve.push(Sample { speed_rpm, torque });
        log::info!("{:.2} Nm @ {:.0} rpm", torque, speed_rpm);
        if plan.variant == SweepVariant::Reconfigure && torque < 0.0 {
            log::info!("engine no longer produces positive torque, stopping the sweep");
            break;
        }
    }
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    /// Torque source answering from a closure and counting calls.
    struct MockModel<F: FnMut(usize, f64) -> f64> {
        torque: F,
        calls: usize,
        configured: usize,
        speeds: Vec<f64>,
        frames: Vec<u32>,
    }

    impl<F: FnMut(usize, f64) -> f64> MockModel<F> {
        fn new(torque: F) -> Self {
            MockModel {
                torque,
                calls: 0,
                configured: 0,
                speeds: Vec::new(),
                frames: Vec::new(),
            }
        }
    }

    impl<F: FnMut(usize, f64) -> f64> TorqueModel for MockModel<F> {
        fn configure(&mut self, _: &EngineSetup) -> Result<()> {
            self.configured += 1;
            Ok(())
        }
        fn torque_at_speed(&mut self, omega: f64, frames: u32) -> Result<f64> {
            self.calls += 1;
            self.speeds.push(omega);
            self.frames.push(frames);
            Ok((self.torque)(self.calls, omega))
        }
    }

    struct FailingModel;

    impl TorqueModel for FailingModel {
        fn configure(&mut self, _: &EngineSetup) -> Result<()> {
            Ok(())
        }
        fn torque_at_speed(&mut self, _: f64, _: u32) -> Result<f64> {
            Err(EngineError::Library("symbol not found".to_string()))
        }
    }

    #[test]
    fn constant_torque_reconfigure_sweep() {
        let mut model = MockModel::new(|_, _| 100.0);
        let plan = SweepPlan::for_variant(SweepVariant::Reconfigure);
        let curve = run_sweep(&mut model, &plan, &EngineSetup::default()).unwrap();

        assert_eq!(curve.len(), 40);
        assert_eq!(curve.torque_log(), vec![100.0; 40]);
        let speeds = curve.speed_log();
        assert_relative_eq!(speeds[0], 60.0 * 0.5 * 74.0 / PI, max_relative = 1e-12);
        assert_relative_eq!(speeds[0], 706.6, epsilon = 0.1);
        let step_rpm = rads_to_rpm(plan.step);
        for pair in speeds.windows(2) {
            assert!(pair[1] > pair[0]);
            assert_relative_eq!(pair[1] - pair[0], step_rpm, max_relative = 1e-9);
        }
        assert_eq!(model.configured, 40);
        assert!(model.frames.iter().all(|&f| f == 1));
    }

    #[test]
    fn speeds_increase_by_one_step() {
        let mut model = MockModel::new(|_, omega| omega * 0.1);
        let plan = SweepPlan::for_variant(SweepVariant::Preconfigured);
        let curve = run_sweep(&mut model, &plan, &EngineSetup::default()).unwrap();

        assert_eq!(curve.len(), 30);
        assert_eq!(curve.speed_log().len(), curve.torque_log().len());
        let step_rpm = rads_to_rpm(plan.step);
        for pair in curve.speed_log().windows(2) {
            assert!(pair[1] > pair[0]);
            assert_relative_eq!(pair[1] - pair[0], step_rpm, max_relative = 1e-9);
        }
        assert_eq!(model.speeds[0], 30.0);
        assert_eq!(model.configured, 0);
        assert!(model.frames.iter().all(|&f| f == 100));
    }

    #[test]
    fn negative_torque_on_fifth_call_stops_after_five_samples() {
        let mut model = MockModel::new(|call, _| if call == 5 { -5.0 } else { 20.0 });
        let plan = SweepPlan::for_variant(SweepVariant::Reconfigure);
        let curve = run_sweep(&mut model, &plan, &EngineSetup::default()).unwrap();

        assert_eq!(curve.len(), 5);
        assert_eq!(curve.torque_log(), vec![20.0, 20.0, 20.0, 20.0, -5.0]);
        assert_eq!(model.calls, 5);
    }

    #[test]
    fn negative_torque_on_first_call_keeps_one_sample() {
        let mut model = MockModel::new(|_, _| -1.0);
        let plan = SweepPlan::for_variant(SweepVariant::Reconfigure);
        let curve = run_sweep(&mut model, &plan, &EngineSetup::default()).unwrap();
        assert_eq!(curve.len(), 1);
    }

    #[test]
    fn preconfigured_sweep_ignores_negative_torque() {
        let mut model = MockModel::new(|call, _| if call % 2 == 0 { -3.0 } else { 3.0 });
        let plan = SweepPlan { steps: 8, ..SweepPlan::for_variant(SweepVariant::Preconfigured) };
        let curve = run_sweep(&mut model, &plan, &EngineSetup::default()).unwrap();
        assert_eq!(curve.len(), 8);
    }

    #[test]
    fn power_follows_torque_and_speed() {
        let mut model = MockModel::new(|call, _| 10.0 + call as f64);
        let plan = SweepPlan { steps: 12, ..SweepPlan::default() };
        let curve = run_sweep(&mut model, &plan, &EngineSetup::default()).unwrap();

        let power = curve.power_log();
        for ((p, t), rpm) in power.iter().zip(curve.torque_log()).zip(curve.speed_log()) {
            assert_relative_eq!(*p, 0.001 * t * (rpm / 60.0) * 2.0 * PI, max_relative = 1e-6);
        }
    }

    #[test]
    fn peaks() {
        let curve: TorqueCurve = vec![
            Sample { speed_rpm: 1000.0, torque: 8.0 },
            Sample { speed_rpm: 2000.0, torque: 7.0 },
            Sample { speed_rpm: 3000.0, torque: 3.0 },
        ]
        .into_iter()
        .collect();
        assert_eq!(curve.peak_torque().unwrap().speed_rpm, 1000.0);
        assert_eq!(curve.peak_power().unwrap().speed_rpm, 2000.0);
        assert!(TorqueCurve::new().peak_power().is_none());
    }

    #[test]
    fn invalid_plans() {
        let mut model = MockModel::new(|_, _| 1.0);
        let setup = EngineSetup::default();
        for plan in [
            SweepPlan { steps: 0, ..SweepPlan::default() },
            SweepPlan { step: 0.0, ..SweepPlan::default() },
            SweepPlan { step: -24.0, ..SweepPlan::default() },
            SweepPlan { frames: 0, ..SweepPlan::default() },
            SweepPlan { start_speed: f64::INFINITY, ..SweepPlan::default() },
        ] {
            assert!(matches!(run_sweep(&mut model, &plan, &setup), Err(EngineError::Config(_))));
        }
        assert_eq!(model.calls, 0);
    }

    #[test]
    fn model_errors_propagate() {
        let err = run_sweep(&mut FailingModel, &SweepPlan::default(), &EngineSetup::default()).unwrap_err();
        assert!(matches!(err, EngineError::Library(_)));
    }

    #[test]
    fn boxed_models_sweep() {
        let mut model: Box<dyn TorqueModel> = Box::new(MockModel::new(|_, _| 1.0));
        let plan = SweepPlan { steps: 3, ..SweepPlan::default() };
        assert_eq!(run_sweep(&mut model, &plan, &EngineSetup::default()).unwrap().len(), 3);
    }

    #[test]
    fn simulated_engine_sweep_stops_when_torque_turns_negative() {
        let mut engine = crate::Engine::new(EngineSetup::default()).unwrap();
        let plan = SweepPlan { frames: 40, ..SweepPlan::for_variant(SweepVariant::Reconfigure) };
        let curve = run_sweep(&mut engine, &plan, &EngineSetup::default()).unwrap();

        assert!(curve.len() > 1 && curve.len() < 40);
        let torques = curve.torque_log();
        assert!(torques[0] > 3.0);
        assert!(*torques.last().unwrap() < 0.0);
        assert!(torques[..torques.len() - 1].iter().all(|&t| t >= 0.0));
    }

    #[test]
    fn simulated_engine_rejects_a_crawling_sweep() {
        let mut engine = crate::Engine::new(EngineSetup::default()).unwrap();
        let plan = SweepPlan {
            start_speed: 0.0,
            step: 1e-300,
            steps: 1,
            frames: 1,
            variant: SweepVariant::Reconfigure,
        };
        let result = run_sweep(&mut engine, &plan, &EngineSetup::default());
        assert!(matches!(result, Err(EngineError::Config(_))));
    }
}

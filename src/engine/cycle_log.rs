/// One integration step of the cylinder, stored for cycle statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleSample {
    pub crank_angle: f64, // [CA deg] 0 to 720, zero at intake TDC
    pub volume: f64,      // [m³]
    pub pressure: f64,    // [Pa]
    pub temperature: f64, // [K]
    pub torque: f64,      // [Nm]
}

/// Double-buffered log: samples of the running cycle accumulate until
/// `trigger()` freezes them as the last complete cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleLog {
    running: Vec<CycleSample>,
    complete: Vec<CycleSample>,
}

impl CycleLog {
    pub fn new() -> CycleLog {
        CycleLog::default()
    }

    pub fn push(&mut self, sample: CycleSample) {
        self.running.push(sample);
    }

    /// Closes the running cycle. The previous complete cycle is discarded.
    pub fn trigger(&mut self) {
        std::mem::swap(&mut self.running, &mut self.complete);
        self.running.clear();
    }

    pub fn last_cycle(&self) -> &[CycleSample] {
        &self.complete
    }

    pub fn running(&self) -> &[CycleSample] {
        &self.running
    }

    /// Mean torque of the last complete cycle, `None` before the first trigger
    pub fn mean_torque(&self) -> Option<f64> {
        if self.complete.is_empty() {
            return None;
        }
        let sum: f64 = self.complete.iter().map(|s| s.torque).sum();
        Some(sum / self.complete.len() as f64)
    }

    pub fn clear(&mut self) {
        self.running.clear();
        self.complete.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(torque: f64) -> CycleSample {
        CycleSample {
            crank_angle: 0.0,
            volume: 1e-4,
            pressure: 1e5,
            temperature: 300.0,
            torque,
        }
    }

    #[test]
    fn trigger_swaps_buffers() {
        let mut log = CycleLog::new();
        log.push(sample(1.0));
        log.push(sample(3.0));
        assert!(log.mean_torque().is_none());
        log.trigger();
        assert_eq!(log.last_cycle().len(), 2);
        assert!(log.running().is_empty());
        assert_eq!(log.mean_torque(), Some(2.0));

        log.push(sample(10.0));
        assert_eq!(log.mean_torque(), Some(2.0));
        log.trigger();
        assert_eq!(log.last_cycle(), &[sample(10.0)]);
        assert_eq!(log.mean_torque(), Some(10.0));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut log = CycleLog::new();
        log.push(sample(1.0));
        log.trigger();
        log.push(sample(2.0));
        log.clear();
        assert!(log.last_cycle().is_empty());
        assert!(log.running().is_empty());
    }
}

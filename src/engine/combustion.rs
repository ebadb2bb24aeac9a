use dyn_clone::DynClone;

pub trait Combustion: DynClone + std::fmt::Debug {
    fn model_name(&self) -> &str;
    /// Rate at which fresh charge is burned `[1/s]`, always positive
    fn burn_rate(&self, n_r: f64, oxygen: f64) -> f64;
    /// Heat released `[W]` while burning at `burn_rate`
    fn heat_release_rate(&self, n_r: f64, burn_rate: f64) -> f64;
}

dyn_clone::clone_trait_object!(Combustion);

/// Oxygen-limited combustion: the burn rate is proportional to the amount of
/// gas and to the fresh charge still available.
#[derive(Debug, Clone, PartialEq)]
pub struct OxygenCombustion {
    speed: f64,      // [1/(s.J/K)]
    heat_value: f64, // [J per J/K of fresh charge]
}

impl OxygenCombustion {
    pub fn new(speed: f64, heat_value: f64) -> OxygenCombustion {
        OxygenCombustion { speed, heat_value }
    }
}

impl Combustion for OxygenCombustion {
    fn model_name(&self) -> &str {
        "Oxygen-limited combustion"
    }
    fn burn_rate(&self, n_r: f64, oxygen: f64) -> f64 {
        self.speed * n_r * oxygen.max(0.0)
    }
    fn heat_release_rate(&self, n_r: f64, burn_rate: f64) -> f64 {
        self.heat_value * n_r * burn_rate
    }
}

/// Ignition off: the engine is dragged without releasing heat.
#[derive(Debug, Clone, Copy, Default)]
pub struct Motoring;

impl Combustion for Motoring {
    fn model_name(&self) -> &str {
        "Motoring"
    }
    fn burn_rate(&self, _: f64, _: f64) -> f64 {
        0.0
    }
    fn heat_release_rate(&self, _: f64, _: f64) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boxed_models_clone() {
        let comb: Box<dyn Combustion> = Box::new(OxygenCombustion::new(15000.0, 9000.0));
        let copy = comb.clone();
        assert_eq!(copy.model_name(), "Oxygen-limited combustion");
        assert_eq!(copy.burn_rate(0.03, 1.0), comb.burn_rate(0.03, 1.0));
    }

    #[test]
    fn burn_stops_without_oxygen() {
        let comb = OxygenCombustion::new(15000.0, 9000.0);
        assert_eq!(comb.burn_rate(0.03, 0.0), 0.0);
        assert_eq!(comb.burn_rate(0.03, -1e-6), 0.0);
        assert!(comb.burn_rate(0.03, 0.5) > 0.0);
    }

    #[test]
    fn motoring_releases_nothing() {
        let comb = Motoring;
        assert_eq!(comb.burn_rate(0.03, 1.0), 0.0);
        assert_eq!(comb.heat_release_rate(0.03, 10.0), 0.0);
    }
}

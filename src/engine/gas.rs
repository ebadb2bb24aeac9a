//! Ideal-gas charge trapped in the cylinder.
//!
//! The state is `[nR, T, ox]`: the amount of gas as `p·V/T` `[J/K]`, its
//! temperature `[K]` and the fraction of fresh (unburned) charge `[-]`.

use crate::engine::combustion::Combustion;
use ndarray::*;

pub const AMBIENT_PRESSURE: f64 = 101325.0; // [Pa]
pub const AMBIENT_TEMPERATURE: f64 = 300.0; // [K]

/// `cv / R` of the charge, diatomic gas
const ALPHA: f64 = 5.0 / 2.0;

const N_R: usize = 0;
const TEMPERATURE: usize = 1;
const OXYGEN: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub struct Charge {
    state: Array1<f64>,
}

impl Charge {
    /// Fresh charge at ambient pressure and temperature filling `volume` `[m³]`
    pub fn ambient(volume: f64) -> Charge {
        Charge {
            state: array![
                AMBIENT_PRESSURE * volume / AMBIENT_TEMPERATURE,
                AMBIENT_TEMPERATURE,
                1.0
            ],
        }
    }

    pub fn n_r(&self) -> f64 {
        self.state[N_R]
    }

    pub fn temperature(&self) -> f64 {
        self.state[TEMPERATURE]
    }

    /// Fraction of unburned fresh charge
    pub fn oxygen(&self) -> f64 {
        self.state[OXYGEN]
    }

    pub fn pressure(&self, volume: f64) -> f64 {
        self.n_r() * self.temperature() / volume
    }

    pub fn state(&self) -> &Array1<f64> {
        &self.state
    }

    pub fn set_state(&mut self, state: Array1<f64>) {
        self.state = state;
    }
}

/// A port connecting the cylinder to a reservoir at ambient conditions.
#[derive(Debug, Clone, Copy)]
pub struct Port {
    /// Opening times flow coefficient `[J/(K.s.Pa)]`
    pub conductance: f64,
    /// Fresh-charge fraction of the gas entering through the port
    pub oxygen: f64,
}

/// Everything the charge equations need that is not part of the charge itself.
pub struct Boundary<'a> {
    pub volume: f64,      // [m³]
    pub volume_rate: f64, // [m³/s]
    pub intake: Port,
    pub exhaust: Port,
    /// `Some` while the spark window is open
    pub combustion: Option<&'a dyn Combustion>,
}

/// Time derivatives of the charge state `[nR, T, ox]`.
pub fn charge_derivatives(x: &Array1<f64>, boundary: &Boundary) -> Array1<f64> {
    let n_r = x[N_R];
    let temp = x[TEMPERATURE];
    let oxygen = x[OXYGEN];
    let press = n_r * temp / boundary.volume;

    let mut d_n_r = 0.0;
    let mut enthalpy_flow = 0.0; // [W]
    let mut d_oxygen = 0.0;
    for port in [boundary.intake, boundary.exhaust] {
        let flow = port.conductance * (AMBIENT_PRESSURE - press);
        d_n_r += flow;
        if flow > 0.0 {
            enthalpy_flow += (ALPHA + 1.0) * flow * AMBIENT_TEMPERATURE;
            d_oxygen += flow / n_r * (port.oxygen - oxygen);
        } else {
            enthalpy_flow += (ALPHA + 1.0) * flow * temp;
        }
    }

    let (burn_rate, heat_release) = match boundary.combustion {
        Some(comb) => {
            let burn_rate = comb.burn_rate(n_r, oxygen);
            (burn_rate, comb.heat_release_rate(n_r, burn_rate))
        }
        None => (0.0, 0.0),
    };

    let d_temp = (heat_release - press * boundary.volume_rate + enthalpy_flow
        - ALPHA * temp * d_n_r)
        / (ALPHA * n_r);
    array![d_n_r, d_temp, d_oxygen - burn_rate]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::combustion::OxygenCombustion;
    use approx::assert_relative_eq;

    const CLOSED: Port = Port { conductance: 0.0, oxygen: 1.0 };

    #[test]
    fn ambient_charge_is_at_ambient_pressure() {
        let charge = Charge::ambient(1e-4);
        assert_relative_eq!(charge.pressure(1e-4), AMBIENT_PRESSURE, max_relative = 1e-12);
        assert_eq!(charge.oxygen(), 1.0);
    }

    #[test]
    fn adiabatic_compression() {
        // closed volume: T' / T = -(1/ALPHA) V' / V
        let charge = Charge::ambient(1e-4);
        let boundary = Boundary {
            volume: 1e-4,
            volume_rate: -1e-2,
            intake: CLOSED,
            exhaust: CLOSED,
            combustion: None,
        };
        let d = charge_derivatives(charge.state(), &boundary);
        assert_eq!(d[N_R], 0.0);
        assert_relative_eq!(d[TEMPERATURE], AMBIENT_TEMPERATURE * 100.0 / ALPHA, max_relative = 1e-12);
        assert_eq!(d[OXYGEN], 0.0);
    }

    #[test]
    fn low_pressure_draws_fresh_charge() {
        let mut charge = Charge::ambient(1e-4);
        charge.set_state(array![0.02, 300.0, 0.5]);
        let boundary = Boundary {
            volume: 1e-4,
            volume_rate: 0.0,
            intake: Port { conductance: 8e-5, oxygen: 1.0 },
            exhaust: CLOSED,
            combustion: None,
        };
        let d = charge_derivatives(charge.state(), &boundary);
        assert!(d[N_R] > 0.0);
        assert!(d[OXYGEN] > 0.0);
        // flow work heats the charge even at equal temperatures
        assert!(d[TEMPERATURE] > 0.0);
    }

    #[test]
    fn outflow_keeps_temperature_and_composition() {
        let mut charge = Charge::ambient(1e-4);
        charge.set_state(array![0.05, 900.0, 0.3]);
        let boundary = Boundary {
            volume: 1e-4,
            volume_rate: 0.0,
            intake: CLOSED,
            exhaust: Port { conductance: 8e-5, oxygen: 0.0 },
            combustion: None,
        };
        let d = charge_derivatives(charge.state(), &boundary);
        assert!(d[N_R] < 0.0);
        assert_eq!(d[OXYGEN], 0.0);
        // isentropic blowdown cools the remaining gas
        assert!(d[TEMPERATURE] < 0.0);
    }

    #[test]
    fn combustion_consumes_oxygen_and_heats() {
        let charge = Charge::ambient(1e-4);
        let comb = OxygenCombustion::new(15000.0, 9000.0);
        let boundary = Boundary {
            volume: 1e-4,
            volume_rate: 0.0,
            intake: CLOSED,
            exhaust: CLOSED,
            combustion: Some(&comb),
        };
        let d = charge_derivatives(charge.state(), &boundary);
        let burn = 15000.0 * charge.n_r();
        assert_relative_eq!(d[OXYGEN], -burn, max_relative = 1e-12);
        assert_relative_eq!(d[TEMPERATURE], 9000.0 * burn / ALPHA, max_relative = 1e-12);
    }
}

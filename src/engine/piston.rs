use crate::engine::combustion::{Combustion, Motoring, OxygenCombustion};
use crate::engine::gas::{charge_derivatives, Boundary, Charge, Port, AMBIENT_PRESSURE};
use crate::engine::geometry::CylinderGeometry;
use crate::engine::json_reader::EngineSetup;
use crate::engine::valve::ValveTiming;
use crate::numerics::ode_solvers::Scheme;
use crate::units::{deg_to_rad, rad_to_deg, wrap_deg};

/// Throttle plate leakage when fully closed
const MIN_THROTTLE: f64 = 0.0075;
/// Viscous friction of the crank train `[Nm/(rad/s)]`
const FRICTION_COEF: f64 = 0.05;
/// Heat released per unit of burned fresh charge `[J/(J/K)]`
const HEAT_VALUE: f64 = 9000.0;

/// How the crankshaft speed evolves during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpeedMode {
    /// Crankshaft held at this speed `[rad/s]`, as on a dynamometer
    Imposed(f64),
    /// Crankshaft accelerated by the gas torque plus `load_torque` `[Nm]`
    Free { load_torque: f64 },
}

/// Single cylinder with its valves and trapped charge.
#[derive(Debug, Clone)]
pub struct Piston {
    geometry: CylinderGeometry,
    valves: ValveTiming,
    charge: Charge,
    combustion: Box<dyn Combustion>,
    cam_angle: f64,          // [deg] 0 to 360, head turns at half crank speed
    omega: f64,              // [rad/s] crankshaft
    volume: f64,             // [m³]
    throttle: f64,           // [-]
    intake_coef: f64,        // [J/(K.s.Pa)]
    exhaust_coef: f64,       // [J/(K.s.Pa)]
    combustion_advance: f64, // [CA deg]
}

impl Piston {
    pub fn new(geometry: CylinderGeometry, valves: ValveTiming, setup: &EngineSetup) -> Piston {
        let (volume, _) = geometry.volume(0.0);
        let mut piston = Piston {
            geometry,
            valves,
            charge: Charge::ambient(volume),
            combustion: Box::new(Motoring),
            cam_angle: 0.0,
            omega: 0.0,
            volume,
            throttle: 0.0,
            intake_coef: 0.0,
            exhaust_coef: 0.0,
            combustion_advance: 0.0,
        };
        piston.apply_setup(setup);
        piston
    }

    pub fn apply_setup(&mut self, setup: &EngineSetup) {
        self.throttle = setup.throttle;
        self.intake_coef = setup.intake_coef;
        self.exhaust_coef = setup.exhaust_coef;
        self.combustion_advance = setup.combustion_advance;
        self.combustion = if setup.ignition {
            Box::new(OxygenCombustion::new(setup.combustion_speed, HEAT_VALUE))
        } else {
            Box::new(Motoring)
        };
    }

    /// Back to intake top-dead-center with a fresh ambient charge.
    pub fn reset(&mut self, omega: f64) {
        self.cam_angle = 0.0;
        self.omega = omega;
        let (volume, _) = self.geometry.volume(0.0);
        self.volume = volume;
        self.charge = Charge::ambient(volume);
    }

    /// Advances the cylinder by `dt` seconds. Returns `true` when a new cycle starts.
    pub fn update(&mut self, dt: f64, mode: SpeedMode, scheme: Scheme) -> bool {
        if let SpeedMode::Imposed(omega) = mode {
            self.omega = omega;
        }
        let omega = self.omega;
        let cam_start = self.cam_angle;
        let cam_rate = rad_to_deg(omega) / 2.0; // [deg/s]
        let combustion = if self.spark_active(cam_start) {
            Some(self.combustion.as_ref())
        } else {
            None
        };
        let throttle_coef = self.throttle * (1.0 - MIN_THROTTLE) + MIN_THROTTLE;

        let equations = |t: f64, x: &ndarray::Array1<f64>| {
            let cam = cam_start + cam_rate * t;
            let (volume, d_volume) = self.geometry.volume(deg_to_rad(2.0 * cam));
            let boundary = Boundary {
                volume,
                volume_rate: d_volume * omega,
                intake: Port {
                    conductance: self.valves.intake_lift(cam) * self.intake_coef * throttle_coef,
                    oxygen: 1.0,
                },
                exhaust: Port {
                    conductance: self.valves.exhaust_lift(cam) * self.exhaust_coef,
                    oxygen: 0.0,
                },
                combustion,
            };
            charge_derivatives(x, &boundary)
        };
        let next = scheme.step(equations, self.charge.state(), 0.0, dt);

        self.charge.set_state(next);
        self.cam_angle = wrap_deg(cam_start + cam_rate * dt);
        let (volume, _) = self.geometry.volume(self.crank_angle_rad());
        self.volume = volume;

        if let SpeedMode::Free { load_torque } = mode {
            self.omega += dt * (self.torque() + load_torque) / self.geometry.moment_of_inertia();
        }
        self.cam_angle < cam_start
    }

    /// The spark fires `combustion_advance` before firing TDC and the flame
    /// is quenched when the exhaust opens.
    fn spark_active(&self, cam: f64) -> bool {
        let crank = 2.0 * cam;
        crank >= 360.0 - self.combustion_advance && crank < 2.0 * self.valves.exhaust_opening()
    }

    /// Instant torque on the crankshaft `[Nm]`: gas work minus friction
    pub fn torque(&self) -> f64 {
        let (_, d_volume) = self.geometry.volume(self.crank_angle_rad());
        (self.pressure() - AMBIENT_PRESSURE) * d_volume - FRICTION_COEF * self.omega
    }

    pub fn pressure(&self) -> f64 {
        self.charge.pressure(self.volume)
    }

    pub fn temperature(&self) -> f64 {
        self.charge.temperature()
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn charge(&self) -> &Charge {
        &self.charge
    }

    pub fn omega(&self) -> f64 {
        self.omega
    }

    /// Stops the crankshaft, used when a free-running engine stalls.
    pub fn stall(&mut self) {
        self.omega = 0.0;
    }

    pub fn cam_angle(&self) -> f64 {
        self.cam_angle
    }

    /// Crank angle in the four-stroke cycle `[CA deg]`, 0 to 720
    pub fn crank_angle(&self) -> f64 {
        2.0 * self.cam_angle
    }

    fn crank_angle_rad(&self) -> f64 {
        deg_to_rad(self.crank_angle())
    }

    pub fn geometry(&self) -> &CylinderGeometry {
        &self.geometry
    }

    pub fn combustion(&self) -> &dyn Combustion {
        self.combustion.as_ref()
    }
}

use crate::base::error::{EngineError, Result};
use crate::units::mm_to_m;
use std::f64::consts::PI;

const CRANK_LENGTH: f64 = 25.0; // [mm]
const CONROD_LENGTH: f64 = 55.0; // [mm]
const BORE: f64 = 50.6; // [mm]
const CLEARANCE_HEIGHT: f64 = CRANK_LENGTH / 3.0; // [mm]

/// Slider-crank geometry of the cylinder, in SI units.
#[derive(Debug, Clone, PartialEq)]
pub struct CylinderGeometry {
    bore: f64,              // [m]
    crank: f64,             // [m]
    stroke: f64,            // [m]
    conrod: f64,            // [m]
    clearance_height: f64,  // [m]
    transverse_area: f64,   // [m²]
    moment_of_inertia: f64, // [kg.m²]
}

impl CylinderGeometry {
    /// Creates a `CylinderGeometry`. Inputs must be in `mm`.
    pub fn new(bore: f64, crank: f64, conrod: f64, clearance_height: f64) -> Result<CylinderGeometry> {
        if !(bore > 0.0) {
            return Err(EngineError::Config(format!("bore must be positive: {}", bore)));
        } else if !(crank > 0.0) {
            return Err(EngineError::Config(format!("crank must be positive: {}", crank)));
        } else if !(conrod > crank) {
            return Err(EngineError::Config(format!(
                "connecting rod ({}) must be longer than the crank ({})",
                conrod, crank
            )));
        } else if !(clearance_height > 0.0) {
            return Err(EngineError::Config(format!(
                "clearance height must be positive: {}",
                clearance_height
            )));
        }
        let bore = mm_to_m(bore);
        let crank = mm_to_m(crank);
        let stroke = 2.0 * crank;
        Ok(CylinderGeometry {
            bore,
            crank,
            stroke,
            conrod: mm_to_m(conrod),
            clearance_height: mm_to_m(clearance_height),
            transverse_area: 0.25 * PI * bore * bore,
            moment_of_inertia: 25.0 * crank * crank,
        })
    }

    /// Returns the chamber volume `[m³]` and its derivative with crank angle `[m³/rad]`.
    /// `angle` is the crank angle in radians, zero at top-dead-center.
    pub fn volume(&self, angle: f64) -> (f64, f64) {
        let (sin, cos) = angle.sin_cos();
        let root = (self.conrod * self.conrod - self.crank * self.crank * sin * sin).sqrt();
        let pin_height = self.crank * cos + root;
        let volume =
            self.transverse_area * (self.clearance_height + self.conrod + self.crank - pin_height);
        let d_volume = self.transverse_area * self.crank * sin * (1.0 + self.crank * cos / root);
        (volume, d_volume)
    }

    pub fn clearance_volume(&self) -> f64 {
        self.transverse_area * self.clearance_height
    }

    pub fn displacement(&self) -> f64 {
        self.transverse_area * self.stroke
    }

    pub fn max_volume(&self) -> f64 {
        self.clearance_volume() + self.displacement()
    }

    pub fn compression_ratio(&self) -> f64 {
        self.max_volume() / self.clearance_volume()
    }

    pub fn bore(&self) -> f64 {
        self.bore
    }

    pub fn stroke(&self) -> f64 {
        self.stroke
    }

    pub fn transverse_area(&self) -> f64 {
        self.transverse_area
    }

    pub fn moment_of_inertia(&self) -> f64 {
        self.moment_of_inertia
    }
}

impl Default for CylinderGeometry {
    fn default() -> Self {
        let crank = mm_to_m(CRANK_LENGTH);
        let bore = mm_to_m(BORE);
        CylinderGeometry {
            bore,
            crank,
            stroke: 2.0 * crank,
            conrod: mm_to_m(CONROD_LENGTH),
            clearance_height: mm_to_m(CLEARANCE_HEIGHT),
            transverse_area: 0.25 * PI * bore * bore,
            moment_of_inertia: 25.0 * crank * crank,
        }
    }
}

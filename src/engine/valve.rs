use crate::units::wrap_deg;

/// Gaussian valve lift profiles, normalized to a unit peak.
///
/// Centers and widths are expressed in cam degrees (the head turns at half
/// the crankshaft speed, so one cam turn is a complete four-stroke cycle).
#[derive(Debug, Clone, PartialEq)]
pub struct ValveTiming {
    intake_center: f64, // [cam deg]
    intake_width: f64,  // [cam deg]
    exhaust_center: f64,
    exhaust_width: f64,
}

impl ValveTiming {
    pub fn new(intake_center: f64, intake_width: f64, exhaust_center: f64, exhaust_width: f64) -> ValveTiming {
        ValveTiming {
            intake_center: wrap_deg(intake_center),
            intake_width,
            exhaust_center: wrap_deg(exhaust_center),
            exhaust_width,
        }
    }

    /// Intake opening fraction at `cam` degrees
    pub fn intake_lift(&self, cam: f64) -> f64 {
        profile(cam, self.intake_center, self.intake_width)
    }

    /// Exhaust opening fraction at `cam` degrees
    pub fn exhaust_lift(&self, cam: f64) -> f64 {
        profile(cam, self.exhaust_center, self.exhaust_width)
    }

    /// Cam angle at which the exhaust starts to matter, used to end the combustion window.
    pub fn exhaust_opening(&self) -> f64 {
        wrap_deg(self.exhaust_center - 2.0 * self.exhaust_width)
    }
}

impl Default for ValveTiming {
    fn default() -> Self {
        ValveTiming::new(45.0, 30.0, 315.0, 20.0)
    }
}

fn profile(cam: f64, center: f64, width: f64) -> f64 {
    let mut distance = wrap_deg(cam) - center;
    if distance > 180.0 {
        distance -= 360.0;
    } else if distance < -180.0 {
        distance += 360.0;
    }
    let x = distance / width;
    (-x * x).exp()
}

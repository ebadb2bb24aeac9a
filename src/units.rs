//! Unit conversions used across the crate.

use std::f64::consts::PI;

pub fn deg_to_rad(deg: f64) -> f64 {
    2.0 * PI * deg / 360.0
}

pub fn rad_to_deg(rad: f64) -> f64 {
    360.0 * rad / (2.0 * PI)
}

pub fn rads_to_hz(omega: f64) -> f64 {
    omega / (2.0 * PI)
}

/// `[rad/s]` to `[RPM]`. Same quantity as `60 * 0.5 * omega / PI`.
pub fn rads_to_rpm(omega: f64) -> f64 {
    60.0 * rads_to_hz(omega)
}

pub fn rpm_to_hz(rpm: f64) -> f64 {
    rpm / 60.0
}

pub fn rpm_to_rads(rpm: f64) -> f64 {
    2.0 * PI * rpm_to_hz(rpm)
}

pub fn mm_to_m(mm: f64) -> f64 {
    mm / 1000.0
}

pub fn m3_to_cc(m3: f64) -> f64 {
    1e6 * m3
}

/// Shaft power in `[kW]` from torque `[Nm]` and speed `[RPM]`
pub fn power_kw(torque: f64, rpm: f64) -> f64 {
    0.001 * torque * (rpm / 60.0) * 2.0 * PI
}

/// Wraps an angle in degrees into `[0, 360)`
pub fn wrap_deg(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rpm_conversion_matches_half_over_pi_form() {
        let omega = 74.0;
        assert_relative_eq!(rads_to_rpm(omega), 60.0 * 0.5 * omega / PI, max_relative = 1e-12);
        assert_relative_eq!(rads_to_rpm(omega), 706.6479, epsilon = 1e-3);
    }

    #[test]
    fn rpm_round_trip() {
        assert_relative_eq!(rpm_to_rads(rads_to_rpm(123.4)), 123.4, max_relative = 1e-12);
    }

    #[test]
    fn fifteen_degrees() {
        assert_relative_eq!(deg_to_rad(15.0), PI / 12.0, max_relative = 1e-12);
        assert_relative_eq!(rad_to_deg(PI), 180.0, max_relative = 1e-12);
    }

    #[test]
    fn power_at_known_point() {
        // 100 Nm at 3000 rpm is 31.4 kW
        assert_relative_eq!(power_kw(100.0, 3000.0), 10.0 * PI, max_relative = 1e-12);
        assert_eq!(power_kw(0.0, 5000.0), 0.0);
    }

    #[test]
    fn wrapping() {
        assert_eq!(wrap_deg(370.0), 10.0);
        assert_eq!(wrap_deg(-90.0), 270.0);
        assert_eq!(wrap_deg(360.0), 0.0);
        assert_eq!(wrap_deg(0.0), 0.0);
    }

    #[test]
    fn lengths_and_volumes() {
        assert_relative_eq!(mm_to_m(50.6), 0.0506, max_relative = 1e-12);
        assert_relative_eq!(m3_to_cc(1e-4), 100.0, max_relative = 1e-12);
    }
}

//! Discrete incremental PID controller.
//!
//! Tuning follows the Ziegler-Nichols style derivation from an ultimate
//! gain `Ku` and sample interval `h`:
//!
//! ```text
//! Kp = 0.6 * Ku      Ti = 1.2 * Ku / h      Td = 3 * Ku * h / 40
//! K0 = Kp * (1 + h/Ti + Td/h)
//! K1 = -Kp * (1 + 2 * Td/h)
//! K2 = Kp * Td/h
//! u  = u_prev + K0*e + K1*e_prev + K2*e_prev2
//! ```
//!
//! The clamp to +-max_output applies to the returned signal only; the
//! stored `u_prev` keeps the full magnitude, so a saturated controller
//! unwinds the accumulated signal before its output leaves the bound.
//! One instance per wheel.

/// Discrete-form PID controller with two-sample error memory.
#[derive(Clone, Debug)]
pub struct Pid {
    k0: f32,
    k1: f32,
    k2: f32,
    max_output: f32,
    /// Error one sample ago
    e_prev: f32,
    /// Error two samples ago
    e_prev2: f32,
    /// Previous output, before clamping
    u_prev: f32,
}

impl Pid {
    /// Derive controller constants from an ultimate gain and sample
    /// interval. `max_output` bounds the control signal symmetrically.
    pub fn new(ku: f32, h: f32, max_output: f32) -> Self {
        let kp = 0.6 * ku;
        let ti = 1.2 * ku / h;
        let td = 3.0 * ku * h / 40.0;
        Self {
            k0: kp * (1.0 + h / ti + td / h),
            k1: -kp * (1.0 + 2.0 * (td / h)),
            k2: kp * (td / h),
            max_output,
            e_prev: 0.0,
            e_prev2: 0.0,
            u_prev: 0.0,
        }
    }

    /// Advance the controller one sample: setpoint `r`, measurement `y`.
    pub fn update(&mut self, r: f32, y: f32) -> f32 {
        let e = r - y;
        let u = self.u_prev + self.k0 * e + self.k1 * self.e_prev + self.k2 * self.e_prev2;

        self.e_prev2 = self.e_prev;
        self.e_prev = e;
        self.u_prev = u;
        u.clamp(-self.max_output, self.max_output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_error_zero_output() {
        let mut pid = Pid::new(5.0, 0.05, 0.04);
        assert_relative_eq!(pid.update(0.0, 0.0), 0.0);
        assert_relative_eq!(pid.update(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_output_always_within_bounds() {
        let mut pid = Pid::new(5.0, 0.05, 0.04);
        let errors = [10.0, -3.0, 0.5, 1e6, -1e6, 0.0, 42.0, f32::MIN_POSITIVE];
        for &y in &errors {
            let u = pid.update(0.0, y);
            assert!(u.is_finite());
            assert!((-0.04..=0.04).contains(&u), "u = {} out of bounds", u);
        }
    }

    #[test]
    fn test_correction_opposes_error() {
        let mut pid = Pid::new(5.0, 0.05, 0.04);
        // Positive measurement (line far on this side) pulls the wheel
        // power down
        assert!(pid.update(0.0, 0.1) < 0.0);

        let mut pid = Pid::new(5.0, 0.05, 0.04);
        assert!(pid.update(0.0, -0.1) > 0.0);
    }

    #[test]
    fn test_saturation_unwinds_over_samples() {
        let mut pid = Pid::new(5.0, 0.05, 0.04);
        // A step error drives the signal past the bound
        assert_relative_eq!(pid.update(0.0, 0.1), -0.04);
        // Error gone: the stored signal overshoots the opposite bound
        assert_relative_eq!(pid.update(0.0, 0.0), 0.04);
        // One more zero-error sample and the accumulated signal has
        // unwound back through zero
        let u = pid.update(0.0, 0.0);
        assert!(u.abs() < 1e-3, "u = {}", u);
    }
}

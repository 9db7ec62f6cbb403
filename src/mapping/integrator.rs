//! Angular-rate integration
//!
//! Turns timestamped gyro rates into a running angle with the trapezoidal
//! rule. The estimate drifts over time, so callers re-baseline it with
//! [`AngleIntegrator::reset`] whenever a new neutral position makes sense.

use tracing::{info, trace};

/// Samples averaged into the static bias when calibration is enabled
pub const CALIBRATION_SAMPLES: u32 = 80;

#[derive(Debug, Clone, Copy, PartialEq)]
enum IntegratorState {
    /// Accumulating samples to estimate the sensor bias
    Calibrating { sum: f32, count: u32 },
    /// Waiting for the first sample to seed the timestamp
    Starting,
    Running,
}

#[derive(Debug, Clone)]
pub struct AngleIntegrator {
    name: String,
    state: IntegratorState,
    calibration_samples: u32,
    bias: f32,
    last_timestamp: u32,
    last_rate: f32,
    value: f32,
}

impl AngleIntegrator {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_calibration(name, 0)
    }

    /// Create an integrator that first averages `samples` samples as bias
    ///
    /// With `samples == 0` this is the same as [`AngleIntegrator::new`].
    pub fn with_calibration(name: impl Into<String>, samples: u32) -> Self {
        let state = if samples == 0 {
            IntegratorState::Starting
        } else {
            IntegratorState::Calibrating { sum: 0.0, count: 0 }
        };

        Self {
            name: name.into(),
            state,
            calibration_samples: samples,
            bias: 0.0,
            last_timestamp: 0,
            last_rate: 0.0,
            value: 0.0,
        }
    }

    /// Feed one sample; returns whether [`value`](Self::value) is meaningful
    ///
    /// `timestamp` is in milliseconds, `rate` in units per second.
    pub fn update(&mut self, timestamp: u32, rate: f32) -> bool {
        match self.state {
            IntegratorState::Calibrating { sum, count } => {
                if count == 0 {
                    info!("Starting gyro calibration ({})", self.name);
                }

                let sum = sum + rate;
                let count = count + 1;

                if count == self.calibration_samples {
                    self.bias = sum / count as f32;
                    info!("Gyro ({}) calibrated: {:.3}", self.name, self.bias);
                    self.seed(timestamp, rate);
                } else {
                    self.state = IntegratorState::Calibrating { sum, count };
                }
                false
            }
            IntegratorState::Starting => {
                self.seed(timestamp, rate);
                false
            }
            IntegratorState::Running => {
                let rate = rate - self.bias;
                let dt = timestamp.wrapping_sub(self.last_timestamp) as f32 / 1000.0;

                self.value += (self.last_rate + rate) / 2.0 * dt;
                self.last_rate = rate;
                self.last_timestamp = timestamp;

                trace!("Gyro ({}) angle {:.4} (dt={:.3}s)", self.name, self.value, dt);
                true
            }
        }
    }

    fn seed(&mut self, timestamp: u32, rate: f32) {
        self.last_timestamp = timestamp;
        self.last_rate = rate - self.bias;
        self.state = IntegratorState::Running;
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Zero the angle without touching the running state or last sample
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.state == IntegratorState::Running
    }

    /// Static bias subtracted from every sample (0 without calibration)
    pub fn bias(&self) -> f32 {
        self.bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 1e-4,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_first_sample_only_seeds() {
        let mut imu = AngleIntegrator::new("+X");
        assert!(!imu.update(1000, 5.0));
        assert!(imu.is_running());
        assert_eq!(imu.value(), 0.0);
        assert!(imu.update(1010, 5.0));
    }

    #[test]
    fn test_constant_rate_integrates_linearly() {
        let mut imu = AngleIntegrator::new("+Y");
        imu.update(0, 2.0);
        for step in 1..=100 {
            assert!(imu.update(step * 10, 2.0));
        }
        // 2 rad/s for one second
        assert_close(imu.value(), 2.0);
    }

    #[test]
    fn test_trapezoidal_average_of_consecutive_samples() {
        let mut imu = AngleIntegrator::new("+Z");
        imu.update(0, 0.0);
        imu.update(500, 4.0);
        // (0 + 4) / 2 * 0.5s
        assert_close(imu.value(), 1.0);
    }

    #[test]
    fn test_reset_keeps_running_state_and_last_sample() {
        let mut imu = AngleIntegrator::new("-X");
        imu.update(0, 1.0);
        imu.update(1000, 1.0);
        assert_close(imu.value(), 1.0);

        imu.reset();
        assert_eq!(imu.value(), 0.0);
        assert!(imu.is_running());

        // Last sample (t=1000, rate=1) is still used as the left edge
        assert!(imu.update(1500, 3.0));
        assert_close(imu.value(), 1.0);
    }

    #[test]
    fn test_timestamp_wraparound() {
        let mut imu = AngleIntegrator::new("+X");
        imu.update(u32::MAX - 4, 1.0);
        imu.update(5, 1.0);
        // 10ms elapsed across the wrap
        assert_close(imu.value(), 0.01);
    }

    #[test]
    fn test_calibration_subtracts_bias() {
        let mut imu = AngleIntegrator::with_calibration("+X", 4);
        for step in 0..4 {
            assert!(!imu.update(step * 10, 0.5));
        }
        assert!(imu.is_running());
        assert_close(imu.bias(), 0.5);

        // A resting controller with a 0.5 rad/s offset stays at zero
        for step in 4..50 {
            assert!(imu.update(step * 10, 0.5));
        }
        assert_close(imu.value(), 0.0);

        imu.update(1000, 1.5);
        assert!(imu.value() > 0.0);
    }

    #[test]
    fn test_zero_calibration_samples_starts_immediately() {
        let mut imu = AngleIntegrator::with_calibration("+X", 0);
        assert!(!imu.update(0, 1.0));
        assert!(imu.update(10, 1.0));
    }
}

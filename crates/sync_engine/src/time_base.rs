//! Sampling strategy of a channel group.
//!
//! The nominal sample rate of an amplifier and its recorded timestamps can
//! disagree. When they do, explicit per-sample times are stored instead of a
//! single interval.

use contracts::{mean_interval, SamplingStrategy};
use tracing::debug;

/// Choose between a uniform and an irregular time dimension
///
/// `drift = 1/dt - nominal_rate`; irregular when `drift > f32::EPSILON`.
pub fn sampling_strategy(time: &[f64], nominal_rate: f64) -> SamplingStrategy {
    let Some(dt) = mean_interval(time) else {
        return SamplingStrategy::Uniform {
            dt: 1.0 / nominal_rate,
        };
    };

    let drift = 1.0 / dt - nominal_rate;
    debug!(dt, drift, nominal_rate, "sampling interval measured");

    if drift > f64::from(f32::EPSILON) {
        SamplingStrategy::Irregular { dt, drift }
    } else {
        SamplingStrategy::Uniform { dt }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize, dt: f64) -> Vec<f64> {
        (0..n).map(|i| i as f64 * dt).collect()
    }

    #[test]
    fn test_constant_interval_is_uniform() {
        let time = ramp(512, 1.0 / 512.0);
        match sampling_strategy(&time, 512.0) {
            SamplingStrategy::Uniform { dt } => assert!((dt - 1.0 / 512.0).abs() < 1e-12),
            other => panic!("expected uniform, got {other:?}"),
        }
    }

    #[test]
    fn test_faster_timestamps_are_irregular() {
        // 520 Hz timestamps against a 512 Hz nominal rate
        let time = ramp(100, 1.0 / 520.0);
        let strategy = sampling_strategy(&time, 512.0);
        assert!(strategy.is_irregular(), "got: {strategy:?}");
        if let SamplingStrategy::Irregular { drift, .. } = strategy {
            assert!((drift - 8.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_slower_timestamps_stay_uniform() {
        let time = ramp(100, 1.0 / 500.0);
        assert!(!sampling_strategy(&time, 512.0).is_irregular());
    }

    #[test]
    fn test_single_sample_uses_nominal_rate() {
        assert_eq!(
            sampling_strategy(&[3.0], 4.0),
            SamplingStrategy::Uniform { dt: 0.25 }
        );
    }
}

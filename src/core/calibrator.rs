// Sensitivity calibration - maps the single user-facing knob onto detector thresholds

use tracing::debug;

use super::config::{DetectorConfig, DetectorMode};
use crate::models::pose::{GestureError, GestureResult};

/// Threshold at sensitivity 0.0 (hardest to trigger)
const THRESHOLD_AT_MIN_SENSITIVITY: f64 = 0.35;
/// Threshold drop across the full sensitivity range
const THRESHOLD_SPAN: f64 = 0.25;
const MIN_CONFIDENCE: f64 = 0.5;

/// Sensitivity must be a finite value in [0, 1]; it is never clamped
pub fn check_sensitivity(sensitivity: f64) -> GestureResult<()> {
    if !sensitivity.is_finite() || !(0.0..=1.0).contains(&sensitivity) {
        return Err(GestureError::InvalidSensitivity(sensitivity));
    }
    Ok(())
}

/// Converts sensitivity into a [`DetectorConfig`].
///
/// Higher sensitivity means a smaller arm-raise threshold, so gestures are
/// easier to detect: `threshold = 0.35 - 0.25 * sensitivity`. Confidence is
/// `max(0.5, sensitivity)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SensitivityCalibrator {
    mode: DetectorMode,
}

impl SensitivityCalibrator {
    pub fn new(mode: DetectorMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DetectorMode {
        self.mode
    }

    /// Map a sensitivity in [0, 1] to detector thresholds.
    ///
    /// Out-of-range or non-finite values are rejected rather than clamped.
    pub fn apply(&self, sensitivity: f64) -> GestureResult<DetectorConfig> {
        check_sensitivity(sensitivity)?;

        let config = DetectorConfig {
            arm_raised_threshold: THRESHOLD_AT_MIN_SENSITIVITY - THRESHOLD_SPAN * sensitivity,
            confidence_threshold: sensitivity.max(MIN_CONFIDENCE),
            gesture_cooldown_ms: self.mode.cooldown_ms(),
        };

        debug!(
            "Calibrated sensitivity {:.2}: threshold={:.3}, confidence={:.2}, cooldown={}ms",
            sensitivity,
            config.arm_raised_threshold,
            config.confidence_threshold,
            config.gesture_cooldown_ms
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_extremes_follow_inverted_law() {
        let calibrator = SensitivityCalibrator::default();

        let low = calibrator.apply(0.0).unwrap();
        let high = calibrator.apply(1.0).unwrap();

        assert!(approx_eq(low.arm_raised_threshold, 0.35));
        assert!(approx_eq(high.arm_raised_threshold, 0.1));
        assert!(high.arm_raised_threshold < low.arm_raised_threshold);
    }

    #[test]
    fn test_confidence_floor() {
        let calibrator = SensitivityCalibrator::default();

        assert_eq!(calibrator.apply(0.0).unwrap().confidence_threshold, 0.5);
        assert_eq!(calibrator.apply(0.3).unwrap().confidence_threshold, 0.5);
        assert_eq!(calibrator.apply(0.8).unwrap().confidence_threshold, 0.8);
        assert_eq!(calibrator.apply(1.0).unwrap().confidence_threshold, 1.0);
    }

    #[test]
    fn test_midpoint() {
        let config = SensitivityCalibrator::default().apply(0.5).unwrap();
        assert!(approx_eq(config.arm_raised_threshold, 0.225));
    }

    #[test]
    fn test_rejects_out_of_range() {
        let calibrator = SensitivityCalibrator::default();

        assert!(matches!(
            calibrator.apply(-0.01),
            Err(GestureError::InvalidSensitivity(_))
        ));
        assert!(calibrator.apply(1.01).is_err());
        assert!(calibrator.apply(f64::NAN).is_err());
        assert!(calibrator.apply(f64::INFINITY).is_err());
    }

    #[test]
    fn test_cooldown_follows_mode() {
        let presentation = SensitivityCalibrator::new(DetectorMode::Presentation);
        let calibration = SensitivityCalibrator::new(DetectorMode::Calibration);

        assert_eq!(presentation.apply(0.5).unwrap().gesture_cooldown_ms, 1500);
        assert_eq!(calibration.apply(0.5).unwrap().gesture_cooldown_ms, 300);
    }

    #[test]
    fn test_calibrated_config_is_valid() {
        let calibrator = SensitivityCalibrator::default();
        for step in 0..=10 {
            let config = calibrator.apply(step as f64 / 10.0).unwrap();
            assert!(config.validate().is_ok());
        }
    }
}

// Arm state classification - decides per frame whether an arm is raised

use super::config::DetectorConfig;
use super::framing::ArmLandmarks;
use crate::models::pose::Landmark;

/// Forearm pointing further upward than this (degrees from horizontal) counts as raised
pub const FOREARM_RAISED_ANGLE_DEG: f64 = -30.0;
/// Fraction of the threshold used by the permissive elbow-only check
pub const RELAXED_THRESHOLD_FACTOR: f64 = 0.7;

/// Which raise heuristics fired for one arm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArmAssessment {
    /// Elbow and wrist both clearly above the shoulder
    pub basic: bool,
    /// Forearm pointing upward in image space
    pub angle: bool,
    /// Elbow somewhat above the shoulder
    pub relaxed: bool,
}

impl ArmAssessment {
    pub fn any(&self) -> bool {
        self.basic || self.angle || self.relaxed
    }
}

/// Evaluate all three heuristics for one arm.
///
/// Image y grows downward, so "above the shoulder" means a smaller y.
/// Landmark confidence is not consulted here.
pub fn assess_arm(
    shoulder: &Landmark,
    elbow: &Landmark,
    wrist: &Landmark,
    config: &DetectorConfig,
) -> ArmAssessment {
    // Rises are compared at landmark precision so a rise equal to the
    // threshold (e.g. 0.8 - 0.5 against 0.3) is not counted as above it
    let threshold = config.arm_raised_threshold as f32;
    let relaxed_threshold = (config.arm_raised_threshold * RELAXED_THRESHOLD_FACTOR) as f32;
    let elbow_rise = shoulder.y - elbow.y;
    let wrist_rise = shoulder.y - wrist.y;

    // No partial credit: an elbow-only lift fails the basic check
    let basic = elbow_rise > threshold && wrist_rise > threshold;

    let forearm_dx = wrist.x as f64 - elbow.x as f64;
    let forearm_dy = wrist.y as f64 - elbow.y as f64;
    let forearm_angle = forearm_dy.atan2(forearm_dx).to_degrees();
    let angle = forearm_angle < FOREARM_RAISED_ANGLE_DEG;

    let relaxed = elbow_rise > relaxed_threshold;

    ArmAssessment {
        basic,
        angle,
        relaxed,
    }
}

/// An arm is raised if any heuristic says so; false positives are left to the debouncer
pub fn is_raised(
    shoulder: &Landmark,
    elbow: &Landmark,
    wrist: &Landmark,
    config: &DetectorConfig,
) -> bool {
    assess_arm(shoulder, elbow, wrist, config).any()
}

/// Raised state of both arms for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArmStates {
    pub left_raised: bool,
    pub right_raised: bool,
}

impl ArmStates {
    pub fn classify(left: &ArmLandmarks, right: &ArmLandmarks, config: &DetectorConfig) -> Self {
        Self {
            left_raised: is_raised(&left.shoulder, &left.elbow, &left.wrist, config),
            right_raised: is_raised(&right.shoulder, &right.elbow, &right.wrist, config),
        }
    }

    pub fn is_neutral(&self) -> bool {
        !self.left_raised && !self.right_raised
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, 1.0)
    }

    fn config(threshold: f64) -> DetectorConfig {
        DetectorConfig {
            arm_raised_threshold: threshold,
            ..DetectorConfig::default()
        }
    }

    #[test]
    fn test_straight_raised_arm() {
        let shoulder = point(0.45, 0.5);
        let elbow = point(0.45, 0.1);
        let wrist = point(0.45, 0.05);

        let assessment = assess_arm(&shoulder, &elbow, &wrist, &config(0.3));
        assert!(assessment.basic);
        assert!(assessment.angle);
        assert!(assessment.relaxed);
        assert!(is_raised(&shoulder, &elbow, &wrist, &config(0.3)));
    }

    #[test]
    fn test_hanging_arm_is_not_raised() {
        let shoulder = point(0.4, 0.5);
        let elbow = point(0.38, 0.65);
        let wrist = point(0.37, 0.8);

        let assessment = assess_arm(&shoulder, &elbow, &wrist, &config(0.3));
        assert_eq!(assessment, ArmAssessment::default());
        assert!(!assessment.any());
    }

    #[test]
    fn test_rise_equal_to_threshold_is_not_basic() {
        let shoulder = point(0.4, 0.8);
        let elbow = point(0.4, 0.5);
        let wrist = point(0.4, 0.5);

        let assessment = assess_arm(&shoulder, &elbow, &wrist, &config(0.3));
        assert!(!assessment.basic);
        assert!(!assessment.angle);
        assert!(assessment.relaxed);

        let higher_wrist = point(0.4, 0.45);
        let higher_elbow = point(0.4, 0.49);
        assert!(assess_arm(&shoulder, &higher_elbow, &higher_wrist, &config(0.3)).basic);
    }

    #[test]
    fn test_degenerate_arm_is_not_raised() {
        let joint = point(0.55, 0.5);
        assert!(!is_raised(&joint, &joint, &joint, &config(0.3)));
    }

    #[test]
    fn test_basic_requires_both_elbow_and_wrist() {
        // Elbow well above the shoulder, forearm dropping back down
        let shoulder = point(0.4, 0.5);
        let elbow = point(0.4, 0.15);
        let wrist = point(0.45, 0.6);

        let assessment = assess_arm(&shoulder, &elbow, &wrist, &config(0.3));
        assert!(!assessment.basic);
        assert!(!assessment.angle);
        // The permissive check still picks up the lifted elbow
        assert!(assessment.relaxed);
        assert!(assessment.any());
    }

    #[test]
    fn test_angle_heuristic_alone() {
        // Elbow level with the shoulder, forearm pointing steeply upward
        let shoulder = point(0.4, 0.5);
        let elbow = point(0.3, 0.5);
        let wrist = point(0.25, 0.4);

        let assessment = assess_arm(&shoulder, &elbow, &wrist, &config(0.3));
        assert!(!assessment.basic);
        assert!(!assessment.relaxed);
        assert!(assessment.angle);
    }

    #[test]
    fn test_shallow_forearm_angle_not_raised() {
        // Forearm about 11 degrees above horizontal, pointing toward +x
        let shoulder = point(0.4, 0.5);
        let elbow = point(0.3, 0.5);
        let wrist = point(0.5, 0.46);

        let assessment = assess_arm(&shoulder, &elbow, &wrist, &config(0.3));
        assert!(!assessment.angle);
        assert!(!assessment.any());
    }

    #[test]
    fn test_relaxed_uses_seventy_percent_of_threshold() {
        // Elbow rise of 0.25: above 0.7 * 0.3 = 0.21 but below 0.3
        let shoulder = point(0.4, 0.5);
        let elbow = point(0.4, 0.25);
        let wrist = point(0.45, 0.6);

        let assessment = assess_arm(&shoulder, &elbow, &wrist, &config(0.3));
        assert!(!assessment.basic);
        assert!(assessment.relaxed);

        // Elbow rise of 0.15 stays below 0.21
        let low_elbow = point(0.4, 0.35);
        let assessment = assess_arm(&shoulder, &low_elbow, &wrist, &config(0.3));
        assert!(!assessment.relaxed);
    }

    #[test]
    fn test_lower_threshold_is_easier_to_trigger() {
        let shoulder = point(0.4, 0.5);
        let elbow = point(0.45, 0.42);
        let wrist = point(0.5, 0.45);

        assert!(!is_raised(&shoulder, &elbow, &wrist, &config(0.35)));
        assert!(is_raised(&shoulder, &elbow, &wrist, &config(0.1)));
    }

    #[test]
    fn test_arm_states_neutral() {
        let states = ArmStates::default();
        assert!(states.is_neutral());

        let states = ArmStates {
            left_raised: false,
            right_raised: true,
        };
        assert!(!states.is_neutral());
    }
}

// Framing validation - is the subject fully visible and at a usable distance?

use serde::{Deserialize, Serialize};

use crate::models::pose::{Landmark, PoseFrame, Side};

/// Shoulders wider than this fraction of the frame means the subject is too close
pub const MAX_SHOULDER_SPAN: f32 = 0.7;
/// Wrists closer than this to the left/right image edge are treated as clipped
pub const WRIST_EDGE_MARGIN: f32 = 0.05;

/// Shoulder, elbow, and wrist of one arm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmLandmarks {
    pub shoulder: Landmark,
    pub elbow: Landmark,
    pub wrist: Landmark,
}

impl ArmLandmarks {
    fn from_frame(frame: &PoseFrame, side: Side) -> Option<Self> {
        Some(Self {
            shoulder: *frame.landmark(side.shoulder())?,
            elbow: *frame.landmark(side.elbow())?,
            wrist: *frame.landmark(side.wrist())?,
        })
    }
}

/// Both arms, extracted from a frame that passed framing checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramedArms {
    pub left: ArmLandmarks,
    pub right: ArmLandmarks,
}

/// Why a frame with a complete subject was still rejected
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "issue")]
pub enum FramingIssue {
    TooClose { shoulder_span: f32 },
    LeftWristClipped { x: f32 },
    RightWristClipped { x: f32 },
}

/// Result of checking one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FramingCheck {
    Framed(FramedArms),
    MissingLandmark,
    OutOfFraming(FramingIssue),
}

/// Stateless gate in front of arm classification.
///
/// Thresholds are fractions of the frame width and are not user-tunable.
#[derive(Debug, Clone, Copy, Default)]
pub struct FramingValidator;

impl FramingValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, frame: &PoseFrame) -> bool {
        matches!(self.check(frame), FramingCheck::Framed(_))
    }

    pub fn check(&self, frame: &PoseFrame) -> FramingCheck {
        let (left, right) = match (
            ArmLandmarks::from_frame(frame, Side::Left),
            ArmLandmarks::from_frame(frame, Side::Right),
        ) {
            (Some(left), Some(right)) => (left, right),
            _ => return FramingCheck::MissingLandmark,
        };

        let shoulder_span = (right.shoulder.x - left.shoulder.x).abs();
        if shoulder_span > MAX_SHOULDER_SPAN {
            return FramingCheck::OutOfFraming(FramingIssue::TooClose { shoulder_span });
        }

        if left.wrist.x <= WRIST_EDGE_MARGIN {
            return FramingCheck::OutOfFraming(FramingIssue::LeftWristClipped { x: left.wrist.x });
        }

        if right.wrist.x >= 1.0 - WRIST_EDGE_MARGIN {
            return FramingCheck::OutOfFraming(FramingIssue::RightWristClipped { x: right.wrist.x });
        }

        FramingCheck::Framed(FramedArms { left, right })
    }
}

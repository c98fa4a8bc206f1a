// Data models for body landmarks, pose frames, and gesture events

use serde::{Deserialize, Serialize};

/// Number of body landmarks reported by the upstream pose model per frame
pub const POSE_LANDMARK_COUNT: usize = 33;

// ==============================================================================
// Landmarks
// ==============================================================================

/// A single tracked body joint in normalized image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32, // Normalized [0, 1], left to right
    pub y: f32, // Normalized [0, 1], top to bottom
    #[serde(default)]
    pub z: f32, // Relative depth, carried through but never used for classification
    #[serde(default = "default_visibility")]
    pub visibility: f32, // Presence confidence [0, 1]
}

fn default_visibility() -> f32 {
    1.0
}

impl Landmark {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility,
        }
    }

    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility >= threshold
    }

    /// Coordinates are usable for geometry (no NaN/inf from the model)
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// MediaPipe Pose Landmark indices (33 total)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BodyLandmark {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl BodyLandmark {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Which side of the body, from the subject's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn to_string(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn shoulder(self) -> BodyLandmark {
        match self {
            Side::Left => BodyLandmark::LeftShoulder,
            Side::Right => BodyLandmark::RightShoulder,
        }
    }

    pub fn elbow(self) -> BodyLandmark {
        match self {
            Side::Left => BodyLandmark::LeftElbow,
            Side::Right => BodyLandmark::RightElbow,
        }
    }

    pub fn wrist(self) -> BodyLandmark {
        match self {
            Side::Left => BodyLandmark::LeftWrist,
            Side::Right => BodyLandmark::RightWrist,
        }
    }
}

// ==============================================================================
// Pose Frame
// ==============================================================================

/// One timestamped snapshot of every landmark for a single subject.
///
/// Slots the model did not report are `None`. The slot count is checked once
/// here, so the engine can index by [`BodyLandmark`] without re-validating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PoseFrameDto")]
pub struct PoseFrame {
    pub timestamp: i64, // Monotonic capture time in milliseconds
    landmarks: Vec<Option<Landmark>>,
}

impl PoseFrame {
    pub fn new(timestamp: i64, landmarks: Vec<Option<Landmark>>) -> GestureResult<Self> {
        if landmarks.len() != POSE_LANDMARK_COUNT {
            return Err(GestureError::LandmarkCountMismatch {
                expected: POSE_LANDMARK_COUNT,
                actual: landmarks.len(),
            });
        }

        Ok(Self {
            timestamp,
            landmarks,
        })
    }

    /// A frame where the model found no subject
    pub fn empty(timestamp: i64) -> Self {
        Self {
            timestamp,
            landmarks: vec![None; POSE_LANDMARK_COUNT],
        }
    }

    /// Landmark at a named joint, if present with finite coordinates
    pub fn landmark(&self, joint: BodyLandmark) -> Option<&Landmark> {
        self.landmarks
            .get(joint.index())
            .and_then(|slot| slot.as_ref())
            .filter(|lm| lm.is_finite())
    }

    pub fn set_landmark(&mut self, joint: BodyLandmark, landmark: Option<Landmark>) {
        self.landmarks[joint.index()] = landmark;
    }

    /// Drop landmarks reported below a visibility threshold
    pub fn retain_confident(&mut self, min_confidence: f32) {
        for slot in self.landmarks.iter_mut() {
            if slot
                .as_ref()
                .map_or(false, |lm| !lm.is_visible(min_confidence))
            {
                *slot = None;
            }
        }
    }

    pub fn landmarks(&self) -> &[Option<Landmark>] {
        &self.landmarks
    }

    pub fn present_count(&self) -> usize {
        self.landmarks.iter().filter(|slot| slot.is_some()).count()
    }
}

/// Unvalidated wire form of a [`PoseFrame`]
#[derive(Debug, Clone, Deserialize)]
pub struct PoseFrameDto {
    pub timestamp: i64,
    #[serde(default)]
    pub landmarks: Vec<Option<Landmark>>,
}

impl TryFrom<PoseFrameDto> for PoseFrame {
    type Error = GestureError;

    fn try_from(dto: PoseFrameDto) -> GestureResult<Self> {
        // An empty landmark list means the model saw nobody
        if dto.landmarks.is_empty() {
            return Ok(PoseFrame::empty(dto.timestamp));
        }
        PoseFrame::new(dto.timestamp, dto.landmarks)
    }
}

// ==============================================================================
// Gesture Events
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureKind {
    Advance, // Right arm raised: next slide
    Retreat, // Left arm raised: previous slide
}

impl GestureKind {
    pub fn to_string(&self) -> &'static str {
        match self {
            GestureKind::Advance => "advance",
            GestureKind::Retreat => "retreat",
        }
    }

    /// The arm whose raise produces this gesture
    pub fn side(&self) -> Side {
        match self {
            GestureKind::Advance => Side::Right,
            GestureKind::Retreat => Side::Left,
        }
    }
}

/// A discrete navigation event, created once per qualifying transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub timestamp: i64,
}

/// Per-session counters reported by the gesture engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionStatistics {
    pub session_id: Option<String>,
    pub frames_processed: u64,
    pub frames_missing_landmarks: u64,
    pub frames_out_of_framing: u64,
    pub advance_events: u32,
    pub retreat_events: u32,
}

impl DetectionStatistics {
    pub fn total_events(&self) -> u32 {
        self.advance_events + self.retreat_events
    }
}

// ==============================================================================
// Error Types
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GestureError {
    #[error("Invalid sensitivity: {0}. Must be between 0.0 and 1.0")]
    InvalidSensitivity(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Gesture detection already running")]
    AlreadyRunning,

    #[error("Expected {expected} landmarks per frame, got {actual}")]
    LandmarkCountMismatch { expected: usize, actual: usize },

    #[error("Landmark source unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Presentation has no slides")]
    NoSlides,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type GestureResult<T> = Result<T, GestureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_visibility() {
        let landmark = Landmark::new(0.5, 0.5, 0.8);
        assert!(landmark.is_visible(0.5));
        assert!(landmark.is_visible(0.7));
        assert!(!landmark.is_visible(0.9));
    }

    #[test]
    fn test_frame_rejects_wrong_landmark_count() {
        let result = PoseFrame::new(0, vec![None; 17]);
        assert!(matches!(
            result,
            Err(GestureError::LandmarkCountMismatch { expected: 33, actual: 17 })
        ));
    }

    #[test]
    fn test_frame_lookup_by_joint() {
        let mut frame = PoseFrame::empty(42);
        assert!(frame.landmark(BodyLandmark::LeftWrist).is_none());

        frame.set_landmark(BodyLandmark::LeftWrist, Some(Landmark::new(0.2, 0.3, 0.9)));
        let wrist = frame.landmark(BodyLandmark::LeftWrist).unwrap();
        assert_eq!(wrist.x, 0.2);
        assert_eq!(frame.landmarks()[15], Some(Landmark::new(0.2, 0.3, 0.9)));
        assert_eq!(frame.present_count(), 1);
    }

    #[test]
    fn test_retain_confident_drops_weak_landmarks() {
        let mut frame = PoseFrame::empty(0);
        frame.set_landmark(BodyLandmark::LeftElbow, Some(Landmark::new(0.3, 0.6, 0.4)));
        frame.set_landmark(BodyLandmark::RightElbow, Some(Landmark::new(0.7, 0.6, 0.7)));

        frame.retain_confident(0.7);
        assert!(frame.landmark(BodyLandmark::LeftElbow).is_none());
        assert!(frame.landmark(BodyLandmark::RightElbow).is_some());
        assert_eq!(frame.present_count(), 1);
    }

    #[test]
    fn test_non_finite_landmark_treated_as_missing() {
        let mut frame = PoseFrame::empty(0);
        frame.set_landmark(BodyLandmark::RightElbow, Some(Landmark::new(f32::NAN, 0.4, 1.0)));
        assert!(frame.landmark(BodyLandmark::RightElbow).is_none());
    }

    #[test]
    fn test_arm_joint_indices() {
        assert_eq!(Side::Left.shoulder().index(), 11);
        assert_eq!(Side::Right.shoulder().index(), 12);
        assert_eq!(Side::Left.elbow().index(), 13);
        assert_eq!(Side::Right.elbow().index(), 14);
        assert_eq!(Side::Left.wrist().index(), 15);
        assert_eq!(Side::Right.wrist().index(), 16);
    }

    #[test]
    fn test_gesture_kind_side() {
        assert_eq!(GestureKind::Advance.side(), Side::Right);
        assert_eq!(GestureKind::Retreat.side(), Side::Left);
        assert_eq!(GestureKind::Advance.to_string(), "advance");
    }

    #[test]
    fn test_frame_deserialization_validates_count() {
        let empty: PoseFrame = serde_json::from_str(r#"{"timestamp":5,"landmarks":[]}"#).unwrap();
        assert_eq!(empty.present_count(), 0);
        assert_eq!(empty.timestamp, 5);

        let short = serde_json::from_str::<PoseFrame>(r#"{"timestamp":5,"landmarks":[null,null]}"#);
        assert!(short.is_err());
    }

    #[test]
    fn test_landmark_defaults_when_deserializing() {
        let landmark: Landmark = serde_json::from_str(r#"{"x":0.1,"y":0.2}"#).unwrap();
        assert_eq!(landmark.z, 0.0);
        assert_eq!(landmark.visibility, 1.0);
    }
}

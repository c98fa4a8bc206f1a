use serde::{Deserialize, Serialize};
use std::path::Path;

use super::calibrator::check_sensitivity;
use crate::models::pose::{GestureError, GestureResult};

/// Cooldown between gestures while presenting
pub const PRESENTATION_COOLDOWN_MS: u64 = 1500;
/// Cooldown on the camera setup screen, where the user is testing gestures
pub const CALIBRATION_COOLDOWN_MS: u64 = 300;

/// How the detector is being used; decides the minimum spacing between events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorMode {
    Presentation,
    Calibration,
}

impl DetectorMode {
    pub fn cooldown_ms(&self) -> u64 {
        match self {
            DetectorMode::Presentation => PRESENTATION_COOLDOWN_MS,
            DetectorMode::Calibration => CALIBRATION_COOLDOWN_MS,
        }
    }

    pub fn to_string(&self) -> &'static str {
        match self {
            DetectorMode::Presentation => "presentation",
            DetectorMode::Calibration => "calibration",
        }
    }

    pub fn from_string(s: &str) -> GestureResult<Self> {
        match s.to_lowercase().as_str() {
            "presentation" => Ok(DetectorMode::Presentation),
            "calibration" => Ok(DetectorMode::Calibration),
            _ => Err(GestureError::InvalidConfig(format!("Unknown detector mode: {}", s))),
        }
    }
}

impl Default for DetectorMode {
    fn default() -> Self {
        DetectorMode::Presentation
    }
}

/// Thresholds read by the framing, classification, and debounce stages
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Minimum normalized Y rise of elbow/wrist above the shoulder
    pub arm_raised_threshold: f64,
    /// Minimum landmark confidence, applied where landmarks enter the system
    pub confidence_threshold: f64,
    /// Minimum spacing between two emitted gestures
    pub gesture_cooldown_ms: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            arm_raised_threshold: 0.3,
            confidence_threshold: 0.7,
            gesture_cooldown_ms: DetectorMode::default().cooldown_ms(),
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> GestureResult<()> {
        if !self.arm_raised_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.arm_raised_threshold)
        {
            return Err(GestureError::InvalidConfig(format!(
                "Invalid arm raised threshold: {}. Must be between 0.0 and 1.0",
                self.arm_raised_threshold
            )));
        }

        if !self.confidence_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.confidence_threshold)
        {
            return Err(GestureError::InvalidConfig(format!(
                "Invalid confidence threshold: {}. Must be between 0.0 and 1.0",
                self.confidence_threshold
            )));
        }

        Ok(())
    }
}

/// User-facing settings, loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Detection sensitivity (0.0-1.0, higher detects more easily)
    pub sensitivity: f64,
    /// Presentation or calibration cooldown
    pub mode: DetectorMode,
    /// Give up on a landmark source that produces nothing for this long
    pub source_stall_timeout_ms: u64,
    /// Slides in the deck being driven, if known
    pub total_slides: Option<u32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sensitivity: 0.5,
            mode: DetectorMode::Presentation,
            source_stall_timeout_ms: 5000,
            total_slides: None,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file
    pub fn load_from(path: impl AsRef<Path>) -> GestureResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> GestureResult<Self> {
        let settings: Settings = serde_json::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings values
    pub fn validate(&self) -> GestureResult<()> {
        check_sensitivity(self.sensitivity)?;

        if self.source_stall_timeout_ms == 0 || self.source_stall_timeout_ms > 60_000 {
            return Err(GestureError::InvalidConfig(format!(
                "Invalid source stall timeout: {}. Must be between 1 and 60000 ms",
                self.source_stall_timeout_ms
            )));
        }

        if self.total_slides == Some(0) {
            return Err(GestureError::InvalidConfig(
                "Total slides must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

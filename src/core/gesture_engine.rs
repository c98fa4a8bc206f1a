use tracing::{debug, info, trace};
use uuid::Uuid;

use super::arm_classifier::ArmStates;
use super::calibrator::SensitivityCalibrator;
use super::config::{DetectorConfig, DetectorMode};
use super::debouncer::{DebounceState, DetectorRuntimeState, GestureDebouncer};
use super::emitter::GestureSink;
use super::framing::{FramingCheck, FramingIssue, FramingValidator};
use crate::models::pose::{
    DetectionStatistics, GestureError, GestureEvent, GestureKind, GestureResult, PoseFrame,
};

// ==============================================================================
// Frame Outcome
// ==============================================================================

/// What happened to a single frame. Per-frame problems are values, not errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    /// No session running; frame ignored
    Inactive,
    /// An arm joint was not reported by the pose model
    MissingLandmark,
    /// Subject visible but too close or clipped at the image edge
    OutOfFraming(FramingIssue),
    /// Frame classified, nothing to emit
    NoGesture,
    Emitted(GestureEvent),
}

impl FrameOutcome {
    pub fn event(&self) -> Option<GestureEvent> {
        match self {
            FrameOutcome::Emitted(event) => Some(*event),
            _ => None,
        }
    }
}

// ==============================================================================
// Gesture Engine
// ==============================================================================

/// Owns the whole classification pipeline for one tracked subject.
///
/// Frames go through framing validation, per-arm classification, and the
/// debouncer; any resulting event is handed to the sink. Everything runs
/// synchronously inside [`GestureEngine::process_frame`].
pub struct GestureEngine<S: GestureSink> {
    calibrator: SensitivityCalibrator,
    config: DetectorConfig,
    sensitivity: Option<f64>,
    validator: FramingValidator,
    debouncer: GestureDebouncer,
    sink: S,
    session_id: Option<String>,
    stats: DetectionStatistics,
}

impl<S: GestureSink> GestureEngine<S> {
    /// Engine with default thresholds (presentation cooldown)
    pub fn new(sink: S) -> Self {
        Self {
            calibrator: SensitivityCalibrator::default(),
            config: DetectorConfig::default(),
            sensitivity: None,
            validator: FramingValidator::new(),
            debouncer: GestureDebouncer::new(),
            sink,
            session_id: None,
            stats: DetectionStatistics::default(),
        }
    }

    /// Engine calibrated from a sensitivity and mode
    pub fn with_sensitivity(sink: S, mode: DetectorMode, sensitivity: f64) -> GestureResult<Self> {
        let mut engine = Self::new(sink);
        engine.calibrator = SensitivityCalibrator::new(mode);
        engine.set_sensitivity(sensitivity)?;
        Ok(engine)
    }

    /// Engine with explicit thresholds, bypassing calibration
    pub fn with_config(sink: S, config: DetectorConfig) -> GestureResult<Self> {
        config.validate()?;
        let mut engine = Self::new(sink);
        engine.config = config;
        Ok(engine)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Begin a detection session, resetting runtime state
    pub fn start(&mut self, session_id: impl Into<String>) -> GestureResult<()> {
        if self.session_id.is_some() {
            return Err(GestureError::AlreadyRunning);
        }

        let session_id = session_id.into();
        self.debouncer.reset();
        self.stats = DetectionStatistics {
            session_id: Some(session_id.clone()),
            ..DetectionStatistics::default()
        };

        info!(
            "Started gesture detection for session {} (threshold={:.3}, cooldown={}ms)",
            session_id, self.config.arm_raised_threshold, self.config.gesture_cooldown_ms
        );
        self.session_id = Some(session_id);
        Ok(())
    }

    /// Begin a session with a fresh random id
    pub fn start_new_session(&mut self) -> GestureResult<String> {
        let session_id = Uuid::new_v4().to_string();
        self.start(session_id.clone())?;
        Ok(session_id)
    }

    /// End the session; returns its statistics. Stopping twice is a no-op.
    pub fn stop(&mut self) -> DetectionStatistics {
        if let Some(session_id) = self.session_id.take() {
            info!(
                "Stopped gesture detection for session {} ({} frames, {} events)",
                session_id,
                self.stats.frames_processed,
                self.stats.total_events()
            );
        }

        self.debouncer.reset();
        self.stats.clone()
    }

    pub fn is_running(&self) -> bool {
        self.session_id.is_some()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Recalibrate thresholds; takes effect from the next frame.
    ///
    /// Invalid values leave the current configuration untouched.
    pub fn set_sensitivity(&mut self, sensitivity: f64) -> GestureResult<()> {
        let config = self.calibrator.apply(sensitivity)?;
        self.config = config;
        self.sensitivity = Some(sensitivity);
        Ok(())
    }

    /// Switch between presentation and calibration cooldowns, keeping the thresholds
    pub fn set_mode(&mut self, mode: DetectorMode) {
        self.calibrator = SensitivityCalibrator::new(mode);
        self.config.gesture_cooldown_ms = mode.cooldown_ms();
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Last sensitivity applied, if the thresholds came from calibration
    pub fn sensitivity(&self) -> Option<f64> {
        self.sensitivity
    }

    // ------------------------------------------------------------------
    // Frame processing
    // ------------------------------------------------------------------

    /// Classify one frame and emit at most one event
    pub fn process_frame(&mut self, frame: &PoseFrame) -> FrameOutcome {
        if self.session_id.is_none() {
            return FrameOutcome::Inactive;
        }

        self.stats.frames_processed += 1;

        let arms = match self.validator.check(frame) {
            FramingCheck::Framed(arms) => arms,
            FramingCheck::MissingLandmark => {
                self.stats.frames_missing_landmarks += 1;
                trace!("Frame {} skipped: missing arm landmarks", frame.timestamp);
                return FrameOutcome::MissingLandmark;
            }
            FramingCheck::OutOfFraming(issue) => {
                self.stats.frames_out_of_framing += 1;
                trace!("Frame {} skipped: {:?}", frame.timestamp, issue);
                return FrameOutcome::OutOfFraming(issue);
            }
        };

        let states = ArmStates::classify(&arms.left, &arms.right, &self.config);

        match self
            .debouncer
            .update(states, frame.timestamp, self.config.gesture_cooldown_ms)
        {
            Some(event) => {
                match event.kind {
                    GestureKind::Advance => self.stats.advance_events += 1,
                    GestureKind::Retreat => self.stats.retreat_events += 1,
                }
                debug!("Gesture {} at {}", event.kind.to_string(), event.timestamp);
                self.sink.emit(&event);
                FrameOutcome::Emitted(event)
            }
            None => FrameOutcome::NoGesture,
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn runtime_state(&self) -> &DetectorRuntimeState {
        self.debouncer.runtime()
    }

    pub fn debounce_state(&self) -> DebounceState {
        self.debouncer.state()
    }

    pub fn statistics(&self) -> &DetectionStatistics {
        &self.stats
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

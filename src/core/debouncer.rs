// Gesture debouncing - turns a continuous "arm raised" signal into discrete events

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::arm_classifier::ArmStates;
use crate::models::pose::{GestureEvent, GestureKind};

/// State carried across frames for one detection session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorRuntimeState {
    pub last_gesture_time: Option<i64>,
    pub last_gesture_type: Option<GestureKind>,
    /// Set when an event fires, cleared by the first frame with both arms down
    pub neutral_required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebounceState {
    /// Ready to fire
    Idle,
    /// A gesture fired; waiting for the subject to return to neutral
    Cooling,
}

/// Rising-edge detector with a minimum spacing between events.
///
/// A held arm fires once. The subject must drop both arms before anything
/// fires again, and no two events are closer than the cooldown.
#[derive(Debug, Clone, Default)]
pub struct GestureDebouncer {
    runtime: DetectorRuntimeState,
}

impl GestureDebouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.runtime = DetectorRuntimeState::default();
    }

    pub fn runtime(&self) -> &DetectorRuntimeState {
        &self.runtime
    }

    pub fn state(&self) -> DebounceState {
        if self.runtime.neutral_required {
            DebounceState::Cooling
        } else {
            DebounceState::Idle
        }
    }

    fn in_cooldown(&self, now: i64, cooldown_ms: u64) -> bool {
        match self.runtime.last_gesture_time {
            Some(last) => {
                let cooldown = i64::try_from(cooldown_ms).unwrap_or(i64::MAX);
                now.saturating_sub(last) < cooldown
            }
            None => false,
        }
    }

    /// Feed one frame's arm states; returns the event to emit, if any.
    pub fn update(&mut self, arms: ArmStates, now: i64, cooldown_ms: u64) -> Option<GestureEvent> {
        // The neutral latch tracks every frame, including those inside the cooldown
        if arms.is_neutral() && self.runtime.neutral_required {
            self.runtime.neutral_required = false;
            self.runtime.last_gesture_type = None;
            debug!("Subject back in neutral pose at {}", now);
        }

        if self.in_cooldown(now, cooldown_ms) {
            trace!("Frame at {} inside gesture cooldown", now);
            return None;
        }

        if self.runtime.neutral_required {
            return None;
        }

        // Both arms up is ambiguous and never resolved by guessing
        let kind = match (arms.right_raised, arms.left_raised) {
            (true, false) => GestureKind::Advance,
            (false, true) => GestureKind::Retreat,
            _ => return None,
        };

        if self.runtime.last_gesture_type == Some(kind) {
            return None;
        }

        self.runtime.last_gesture_time = Some(now);
        self.runtime.last_gesture_type = Some(kind);
        self.runtime.neutral_required = true;

        Some(GestureEvent {
            kind,
            timestamp: now,
        })
    }
}

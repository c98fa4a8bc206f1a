// Slide navigation - keeps the presenter's position in the deck in step with gestures

use tracing::debug;

use super::emitter::GestureSink;
use crate::models::navigation::SlidePosition;
use crate::models::pose::{GestureError, GestureEvent, GestureKind, GestureResult};

/// Tracks the current slide, clamped to `1..=total_slides`
#[derive(Debug, Clone)]
pub struct SlideNavigator {
    current: u32,
    total: u32,
}

impl SlideNavigator {
    pub fn new(total_slides: u32) -> GestureResult<Self> {
        if total_slides == 0 {
            return Err(GestureError::NoSlides);
        }

        Ok(Self {
            current: 1,
            total: total_slides,
        })
    }

    pub fn position(&self) -> SlidePosition {
        SlidePosition::new(self.current, self.total)
    }

    pub fn current_slide(&self) -> u32 {
        self.current
    }

    /// Move to the next slide; stays put on the last one
    pub fn next(&mut self) -> SlidePosition {
        if self.current < self.total {
            self.current += 1;
        }
        self.position()
    }

    /// Move to the previous slide; stays put on the first one
    pub fn previous(&mut self) -> SlidePosition {
        if self.current > 1 {
            self.current -= 1;
        }
        self.position()
    }

    /// Jump directly to a slide, e.g. when the presenter clicks a thumbnail
    pub fn go_to(&mut self, slide_number: u32) -> GestureResult<SlidePosition> {
        if slide_number == 0 || slide_number > self.total {
            return Err(GestureError::InvalidConfig(format!(
                "Slide {} out of range 1..={}",
                slide_number, self.total
            )));
        }
        self.current = slide_number;
        Ok(self.position())
    }

    pub fn apply(&mut self, kind: GestureKind) -> SlidePosition {
        match kind {
            GestureKind::Advance => self.next(),
            GestureKind::Retreat => self.previous(),
        }
    }
}

impl GestureSink for SlideNavigator {
    fn emit(&mut self, event: &GestureEvent) {
        let position = self.apply(event.kind);
        debug!(
            "{} -> slide {}/{}",
            event.kind.to_string(),
            position.slide_number,
            position.total_slides
        );
    }
}

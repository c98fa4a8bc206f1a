// Event emission - delivers gesture events to whoever drives the slides

use tokio::sync::mpsc;
use tracing::warn;

use crate::models::pose::GestureEvent;

/// Receives gesture events from the engine.
///
/// Called at most once per processed frame, on the engine's thread, and must
/// not block.
pub trait GestureSink: Send {
    fn emit(&mut self, event: &GestureEvent);
}

impl<F> GestureSink for F
where
    F: FnMut(&GestureEvent) + Send,
{
    fn emit(&mut self, event: &GestureEvent) {
        self(event)
    }
}

/// Collects every event in order
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<GestureEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[GestureEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl GestureSink for EventLog {
    fn emit(&mut self, event: &GestureEvent) {
        self.events.push(*event);
    }
}

/// Forwards events into a tokio channel without waiting.
///
/// If the receiver is full or gone the event is dropped with a warning, so a
/// slow consumer never stalls the frame loop.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<GestureEvent>,
    dropped: u64,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<GestureEvent>) -> Self {
        Self { tx, dropped: 0 }
    }

    /// Create a sink together with the receiving end
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<GestureEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl GestureSink for ChannelSink {
    fn emit(&mut self, event: &GestureEvent) {
        if let Err(e) = self.tx.try_send(*event) {
            self.dropped += 1;
            warn!("Dropping {} gesture: {}", event.kind.to_string(), e);
        }
    }
}

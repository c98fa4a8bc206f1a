use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, trace, warn};

use super::calibrator::check_sensitivity;
use super::emitter::GestureSink;
use super::gesture_engine::GestureEngine;
use crate::models::pose::{DetectionStatistics, GestureError, GestureResult};
use crate::platform::pose::LandmarkSource;

// ==============================================================================
// Stop Handle
// ==============================================================================

/// Shared flag that ends a running session at the next frame boundary
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

// ==============================================================================
// Sensitivity Handle
// ==============================================================================

/// Recalibrates a running session from outside the frame loop.
///
/// The latest requested value is picked up before the next frame is read;
/// intermediate values set in between are skipped.
#[derive(Debug, Clone)]
pub struct SensitivityHandle {
    tx: Arc<watch::Sender<Option<f64>>>,
}

impl Default for SensitivityHandle {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }
}

impl SensitivityHandle {
    pub fn set(&self, sensitivity: f64) -> GestureResult<()> {
        check_sensitivity(sensitivity)?;
        self.tx.send_replace(Some(sensitivity));
        Ok(())
    }

    /// Most recently requested sensitivity, if any
    pub fn requested(&self) -> Option<f64> {
        *self.tx.borrow()
    }

    fn subscribe(&self) -> watch::Receiver<Option<f64>> {
        self.tx.subscribe()
    }
}

// ==============================================================================
// Session Summary
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverSummary {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub frames_received: u64,
    /// Frames whose timestamp did not advance past the previous one
    pub duplicate_frames: u64,
    pub stopped_by_request: bool,
    pub statistics: DetectionStatistics,
}

// ==============================================================================
// Session Driver
// ==============================================================================

/// Pulls frames from a landmark source and feeds them to the engine, one at a time.
pub struct SessionDriver<S: GestureSink> {
    engine: GestureEngine<S>,
    stop: StopHandle,
    sensitivity: SensitivityHandle,
    sensitivity_rx: watch::Receiver<Option<f64>>,
    stall_timeout: Option<Duration>,
}

impl<S: GestureSink> SessionDriver<S> {
    pub fn new(engine: GestureEngine<S>) -> Self {
        let sensitivity = SensitivityHandle::default();
        let sensitivity_rx = sensitivity.subscribe();
        Self {
            engine,
            stop: StopHandle::default(),
            sensitivity,
            sensitivity_rx,
            stall_timeout: None,
        }
    }

    /// Share a stop flag created before the driver
    pub fn with_stop_handle(mut self, stop: StopHandle) -> Self {
        self.stop = stop;
        self
    }

    /// Share a sensitivity control created before the driver
    pub fn with_sensitivity_handle(mut self, sensitivity: SensitivityHandle) -> Self {
        self.sensitivity_rx = sensitivity.subscribe();
        self.sensitivity = sensitivity;
        self
    }

    /// Fail the session if the source produces nothing for this long
    pub fn with_stall_timeout(mut self, timeout: Duration) -> Self {
        self.stall_timeout = Some(timeout);
        self
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn sensitivity_handle(&self) -> SensitivityHandle {
        self.sensitivity.clone()
    }

    pub fn engine(&self) -> &GestureEngine<S> {
        &self.engine
    }

    pub fn into_engine(self) -> GestureEngine<S> {
        self.engine
    }

    /// Run one detection session until the source ends or a stop is requested
    pub async fn run<L>(&mut self, source: &mut L) -> GestureResult<DriverSummary>
    where
        L: LandmarkSource + ?Sized,
    {
        if !source.is_initialized() {
            return Err(GestureError::UpstreamUnavailable(format!(
                "{} is not initialized",
                source.get_source_info()
            )));
        }

        let session_id = self.engine.start_new_session()?;
        let started_at = Utc::now();
        info!("Driving session {} from {}", session_id, source.get_source_info());

        // A value requested before the session started still applies
        let requested = *self.sensitivity_rx.borrow_and_update();
        if let Some(sensitivity) = requested {
            self.recalibrate(sensitivity);
        }
        source.set_min_confidence(self.engine.config().confidence_threshold as f32);

        let mut frames_received = 0u64;
        let mut duplicate_frames = 0u64;
        let mut last_timestamp: Option<i64> = None;
        let mut stopped_by_request = false;

        let result: GestureResult<()> = loop {
            if self.stop.is_stopped() {
                stopped_by_request = true;
                break Ok(());
            }

            if self.sensitivity_rx.has_changed().unwrap_or(false) {
                let requested = *self.sensitivity_rx.borrow_and_update();
                if let Some(sensitivity) = requested {
                    self.recalibrate(sensitivity);
                    source.set_min_confidence(self.engine.config().confidence_threshold as f32);
                }
            }

            let next = match self.stall_timeout {
                Some(limit) => match tokio::time::timeout(limit, source.next_frame()).await {
                    Ok(next) => next,
                    Err(_) => Err(GestureError::UpstreamUnavailable(format!(
                        "no frame within {} ms",
                        limit.as_millis()
                    ))),
                },
                None => source.next_frame().await,
            };

            let frame = match next {
                Ok(Some(frame)) => frame,
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            };
            frames_received += 1;

            if matches!(last_timestamp, Some(last) if frame.timestamp <= last) {
                duplicate_frames += 1;
                trace!("Skipping frame {}: timestamp did not advance", frame.timestamp);
                continue;
            }
            last_timestamp = Some(frame.timestamp);

            self.engine.process_frame(&frame);
        };

        let statistics = self.engine.stop();

        if let Err(e) = result {
            warn!("Session {} ended with error: {}", session_id, e);
            return Err(e);
        }

        Ok(DriverSummary {
            session_id,
            started_at,
            finished_at: Utc::now(),
            frames_received,
            duplicate_frames,
            stopped_by_request,
            statistics,
        })
    }

    fn recalibrate(&mut self, sensitivity: f64) {
        match self.engine.set_sensitivity(sensitivity) {
            Ok(()) => info!(
                "Sensitivity set to {:.2} (threshold={:.3}, confidence={:.2})",
                sensitivity,
                self.engine.config().arm_raised_threshold,
                self.engine.config().confidence_threshold
            ),
            Err(e) => warn!("Ignoring sensitivity change: {}", e),
        }
    }
}

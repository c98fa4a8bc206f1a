// MediaPipe landmark bridge
// Abstracts where pose landmarks come from: a live model, a recording, or a test script

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::{info, warn};

use crate::core::config::DetectorConfig;
use crate::models::pose::{GestureError, GestureResult, PoseFrame, PoseFrameDto};

/// Options applied where landmarks enter the system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceConfig {
    /// Landmarks reported below this visibility are treated as missing
    pub min_landmark_confidence: f32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::from_detector(&DetectorConfig::default())
    }
}

impl SourceConfig {
    pub fn from_detector(config: &DetectorConfig) -> Self {
        Self {
            min_landmark_confidence: config.confidence_threshold as f32,
        }
    }
}

/// Landmark source trait
/// Implement this for live models, recordings, or test fixtures
#[async_trait]
pub trait LandmarkSource: Send {
    /// Next frame, or `None` once the source is exhausted
    async fn next_frame(&mut self) -> GestureResult<Option<PoseFrame>>;

    /// Check if the source is ready to produce frames
    fn is_initialized(&self) -> bool;

    /// Human-readable description for logs
    fn get_source_info(&self) -> String;

    /// Visibility below which landmarks are reported as missing
    fn min_confidence(&self) -> f32;

    /// Change the visibility cutoff; applies to frames not yet returned
    fn set_min_confidence(&mut self, min_confidence: f32);
}

/// Parse one MediaPipe-style JSON frame and drop low-confidence landmarks
pub fn parse_frame(json: &str, config: &SourceConfig) -> GestureResult<PoseFrame> {
    let dto: PoseFrameDto = serde_json::from_str(json)?;
    let mut frame = PoseFrame::try_from(dto)?;
    frame.retain_confident(config.min_landmark_confidence);
    Ok(frame)
}

// ==============================================================================
// JSON Lines Recording
// ==============================================================================

/// Replays recorded landmarks, one JSON frame per line.
///
/// Unparseable lines are skipped with a warning; the stream keeps going.
pub struct JsonLinesSource {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    config: SourceConfig,
    line_number: u64,
    skipped_lines: u64,
}

impl JsonLinesSource {
    pub async fn open(path: impl AsRef<Path>, config: SourceConfig) -> GestureResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await.map_err(|e| {
            GestureError::UpstreamUnavailable(format!("Failed to open {}: {}", path.display(), e))
        })?;

        info!("Replaying landmarks from {}", path.display());

        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            config,
            line_number: 0,
            skipped_lines: 0,
        })
    }

    pub fn skipped_lines(&self) -> u64 {
        self.skipped_lines
    }
}

#[async_trait]
impl LandmarkSource for JsonLinesSource {
    async fn next_frame(&mut self) -> GestureResult<Option<PoseFrame>> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_number += 1;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match parse_frame(line, &self.config) {
                Ok(frame) => return Ok(Some(frame)),
                Err(e) => {
                    self.skipped_lines += 1;
                    warn!(
                        "Skipping line {} of {}: {}",
                        self.line_number,
                        self.path.display(),
                        e
                    );
                }
            }
        }

        Ok(None)
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn get_source_info(&self) -> String {
        format!("JSON lines recording ({})", self.path.display())
    }

    fn min_confidence(&self) -> f32 {
        self.config.min_landmark_confidence
    }

    fn set_min_confidence(&mut self, min_confidence: f32) {
        self.config.min_landmark_confidence = min_confidence;
    }
}

// ==============================================================================
// Scripted Source (tests and demos)
// ==============================================================================

/// Yields a fixed list of frames
pub struct ScriptedSource {
    frames: VecDeque<PoseFrame>,
    min_confidence: f32,
    stall_when_empty: bool,
}

impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = PoseFrame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            min_confidence: 0.0,
            stall_when_empty: false,
        }
    }

    /// Hang forever after the last frame instead of ending the stream
    pub fn stall_when_empty(mut self) -> Self {
        self.stall_when_empty = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait]
impl LandmarkSource for ScriptedSource {
    async fn next_frame(&mut self) -> GestureResult<Option<PoseFrame>> {
        match self.frames.pop_front() {
            Some(mut frame) => {
                frame.retain_confident(self.min_confidence);
                Ok(Some(frame))
            }
            None if self.stall_when_empty => {
                std::future::pending::<()>().await;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn is_initialized(&self) -> bool {
        true
    }

    fn get_source_info(&self) -> String {
        format!("Scripted source ({} frames queued)", self.frames.len())
    }

    fn min_confidence(&self) -> f32 {
        self.min_confidence
    }

    fn set_min_confidence(&mut self, min_confidence: f32) {
        self.min_confidence = min_confidence;
    }
}

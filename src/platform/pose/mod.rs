// Pose landmark platform integration
// Provides the landmark source abstraction and its file/scripted implementations

pub mod mediapipe_bridge;

pub use mediapipe_bridge::{parse_frame, JsonLinesSource, LandmarkSource, ScriptedSource, SourceConfig};

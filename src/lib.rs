pub mod core;
pub mod models;
pub mod platform;

pub use core::config::{DetectorConfig, DetectorMode, Settings};
pub use core::emitter::{ChannelSink, EventLog, GestureSink};
pub use core::gesture_engine::{FrameOutcome, GestureEngine};
pub use core::session_driver::{DriverSummary, SensitivityHandle, SessionDriver, StopHandle};
pub use core::slide_navigator::SlideNavigator;
pub use models::pose::{GestureError, GestureEvent, GestureKind, GestureResult, PoseFrame};

pub mod config;

// Per-frame pipeline
pub mod framing;
pub mod arm_classifier;
pub mod debouncer;
pub mod calibrator;

// Engine and its consumers
pub mod emitter;
pub mod gesture_engine;
pub mod slide_navigator;
pub mod session_driver;

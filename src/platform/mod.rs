// Pose landmark sources
pub mod pose;

// Data models for pose landmarks, gesture events, and slide navigation

pub mod pose;
pub mod navigation;

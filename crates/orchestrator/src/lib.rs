//! Orchestrator - detection engine and scan coordination

mod detector;
mod orchestrator;
mod progress;

pub use detector::{classify, detect, Detector};
pub use orchestrator::{CancelHandle, Orchestrator};
pub use progress::ProgressTracker;

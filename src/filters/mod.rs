//! Temporal smoothing of landmark frames.
//!
//! Each session owns its own filter instance; filters keep history and must
//! never be shared between sessions.

/// Moving average smoother over a bounded frame window
pub mod moving_average;

use crate::landmarks::Frame;
use crate::{Error, Result};
use moving_average::LandmarkSmoother;

/// Trait for all landmark frame filters
pub trait LandmarkFilter: Send + Sync {
    /// Push a raw frame and return the smoothed frame
    ///
    /// Returns `None` when the frame is rejected; a rejected frame leaves
    /// the filter history untouched.
    fn apply(&mut self, frame: &Frame) -> Option<Frame>;

    /// Drop all history
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}

/// No-op filter that passes frames through unchanged
pub struct NoFilter;

impl LandmarkFilter for NoFilter {
    fn apply(&mut self, frame: &Frame) -> Option<Frame> {
        if frame.is_empty() {
            return None;
        }
        Some(frame.clone())
    }

    fn reset(&mut self) {}

    fn name(&self) -> &str {
        "NoFilter"
    }
}

/// Create a landmark filter by type name
///
/// Accepts `none`, `moving_average` and `moving_average:<window>`.
pub fn create_filter(filter_type: &str) -> Result<Box<dyn LandmarkFilter>> {
    let lowered = filter_type.to_lowercase();
    let mut parts = lowered.splitn(2, ':');
    let name = parts.next().unwrap_or_default();
    let param = parts.next();

    match (name, param) {
        ("none" | "nofilter", None) => Ok(Box::new(NoFilter)),
        ("moving_average" | "movingaverage", None) => {
            Ok(Box::new(LandmarkSmoother::new(crate::constants::DEFAULT_SMOOTHING_WINDOW)))
        }
        ("moving_average" | "movingaverage", Some(window)) => {
            let window: usize = window
                .parse()
                .map_err(|_| Error::FilterError(format!("Invalid window size: {window}")))?;
            create_moving_average(window)
        }
        _ => Err(Error::FilterError(format!("Unknown filter type: {filter_type}"))),
    }
}

/// Create a moving average smoother, rejecting an empty window
pub fn create_moving_average(window: usize) -> Result<Box<dyn LandmarkFilter>> {
    if window == 0 {
        return Err(Error::FilterError("Window size must be greater than 0".to_string()));
    }
    Ok(Box::new(LandmarkSmoother::new(window)))
}

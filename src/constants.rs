//! Constants used throughout the library

/// Number of landmarks in the full-body pose skeleton
pub const NUM_POSE_LANDMARKS: usize = 33;

/// Default smoothing window (frames)
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Default minimum detection confidence for a landmark to be used
pub const DEFAULT_CONFIDENCE_FLOOR: f64 = 0.5;

/// Default minimum time between reps before the "slow down" hint (seconds)
pub const DEFAULT_MIN_REP_INTERVAL_SECS: f64 = 1.0;

/// Vectors shorter than this are treated as degenerate
pub const MIN_VECTOR_NORM: f64 = 1e-9;

/// Angular bounds (degrees)
pub const MIN_JOINT_ANGLE: f64 = 0.0;
pub const MAX_JOINT_ANGLE: f64 = 180.0;

/// Posture accuracy bounds (percent)
pub const MIN_ACCURACY: f64 = 0.0;
pub const MAX_ACCURACY: f64 = 100.0;

/// Default feedback messages
pub const DEFAULT_DOWN_CUE: &str = "Down position, push back up!";
pub const DEFAULT_LOW_FORM_WARNING: &str = "Too deep, don't over-bend!";
pub const DEFAULT_HIGH_FORM_WARNING: &str = "Don't lock out the joint!";
pub const SLOW_DOWN_HINT: &str = "Slow down, control the movement";

/// Separator used when appending hints to feedback
pub const FEEDBACK_SEPARATOR: &str = " | ";

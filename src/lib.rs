//! Exercise repetition counting from body pose landmarks.
//!
//! This library turns a noisy per-frame stream of 33-point body landmarks
//! (from any external pose detector) into counted repetitions, a 0-100
//! posture accuracy per repetition and live textual feedback.
//!
//! The pipeline for each frame is:
//! 1. Temporal smoothing of the landmarks over a short window
//! 2. Joint angle measurement for the exercise's joints
//! 3. Confidence gating (bad frames are skipped, never fatal)
//! 4. A hysteresis state machine that counts `Up -> Down -> Up` cycles
//!
//! Exercises are declarative [`profile::ExerciseProfile`] rows; adding one
//! needs no code. The engine performs no I/O and keeps no global state.
//!
//! # Examples
//!
//! ## Counting a session
//!
//! ```no_run
//! use rep_counter::{config::Config, landmarks::Frame, session::Session};
//!
//! # fn next_frame() -> Option<(f64, Frame)> { None }
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let registry = config.build_registry()?;
//! let mut session = Session::from_config(&config, &registry, "squat", 0.0)?;
//!
//! let mut now = 0.0;
//! while let Some((timestamp, frame)) = next_frame() {
//!     let output = session.process_frame(&frame, timestamp);
//!     println!("{:?} reps={} {}", output.phase, output.rep_count, output.feedback_text);
//!     now = timestamp;
//! }
//!
//! let summary = session.stop(now);
//! println!("{} reps, {:.0}% average accuracy", summary.total_reps, summary.avg_accuracy);
//! # Ok(())
//! # }
//! ```
//!
//! ## Driving the state machine with angles
//!
//! ```
//! use rep_counter::profile::ProfileRegistry;
//! use rep_counter::rep_state::{RepSessionState, RepStateMachine};
//!
//! let registry = ProfileRegistry::with_builtin().unwrap();
//! let squat = registry.get("squat").unwrap();
//! let machine = RepStateMachine::default();
//! let mut state = RepSessionState::new();
//!
//! for (i, angle) in [170.0, 165.0, 95.0, 90.0, 162.0, 168.0].into_iter().enumerate() {
//!     machine.step(&mut state, squat, angle, i as f64);
//! }
//! assert_eq!(state.rep_count(), 1);
//! ```

/// Body landmark and frame types
pub mod landmarks;

/// Joint angle geometry
pub mod angle;

/// Temporal landmark smoothing
pub mod filters;

/// Declarative exercise profiles and their registry
pub mod profile;

/// Repetition state machine and depth scoring
pub mod rep_state;

/// Per-frame orchestration
pub mod processor;

/// Session lifecycle and summaries
pub mod session;

/// Error types and result handling
pub mod error;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};

//! Hysteresis-based repetition state machine.
//!
//! A rep is one full `Up -> Down -> Up` cycle of the active joint angle:
//! the angle must fall below the profile's down threshold and then rise above
//! its (strictly higher) up threshold. The gap between the two thresholds keeps
//! sensor noise near either boundary from producing extra counts.
//!
//! The machine itself holds no mutable state. Everything that changes per frame
//! lives in a [`RepSessionState`] owned by exactly one session and passed in on
//! every call.

use crate::constants::{
    DEFAULT_MIN_REP_INTERVAL_SECS, FEEDBACK_SEPARATOR, MAX_ACCURACY, MIN_ACCURACY, SLOW_DOWN_HINT,
};
use crate::profile::ExerciseProfile;
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Movement phase of the current rep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Extended, waiting for the next descent
    #[default]
    Up,
    /// Flexed past the down threshold, waiting to come back up
    Down,
}

/// Emitted once per completed rep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepEvent {
    /// 1-based rep number within the session
    pub count: u32,
    /// Driver timestamp of the frame that completed the rep (seconds)
    pub timestamp: f64,
    /// Depth score in `[0, 100]`
    pub posture_accuracy: f64,
}

/// Mutable per-session rep tracking state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepSessionState {
    phase: Phase,
    rep_count: u32,
    min_angle_this_down: Option<f64>,
    last_rep_timestamp: Option<f64>,
    feedback_text: String,
    latest_accuracy: Option<f64>,
}

impl RepSessionState {
    /// Fresh state in the `Up` phase with no reps
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return to the initial state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    /// Smallest angle seen since entering `Down`; `None` while `Up`
    #[must_use]
    pub fn min_angle_this_down(&self) -> Option<f64> {
        self.min_angle_this_down
    }

    #[must_use]
    pub fn last_rep_timestamp(&self) -> Option<f64> {
        self.last_rep_timestamp
    }

    /// Persistent cue set by the last phase transition
    #[must_use]
    pub fn feedback_text(&self) -> &str {
        &self.feedback_text
    }

    /// Accuracy of the most recent rep
    #[must_use]
    pub fn latest_accuracy(&self) -> Option<f64> {
        self.latest_accuracy
    }

    /// Replace the cue, used by drivers for session-level messages
    pub fn set_feedback(&mut self, text: impl Into<String>) {
        self.feedback_text = text.into();
    }
}

/// Result of feeding one angle into the state machine
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// Completed rep, if this frame finished one
    pub rep_event: Option<RepEvent>,
    /// Feedback to show for this frame, including any form warning
    pub feedback: String,
}

/// Exercise-agnostic rep counter driven by [`ExerciseProfile`] thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepStateMachine {
    min_rep_interval: Option<f64>,
}

impl Default for RepStateMachine {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MIN_REP_INTERVAL_SECS))
    }
}

impl RepStateMachine {
    /// Create a state machine
    ///
    /// `min_rep_interval` (seconds) enables the advisory "slow down" hint for
    /// reps completed faster than that. It never blocks a count.
    #[must_use]
    pub fn new(min_rep_interval: Option<f64>) -> Self {
        Self { min_rep_interval }
    }

    #[must_use]
    pub fn min_rep_interval(&self) -> Option<f64> {
        self.min_rep_interval
    }

    /// Advance `state` by one measured angle (degrees) at `timestamp` (seconds)
    pub fn step(
        &self,
        state: &mut RepSessionState,
        profile: &ExerciseProfile,
        angle: f64,
        timestamp: f64,
    ) -> StepOutcome {
        if !angle.is_finite() {
            debug!("Ignoring non-finite angle for {}", profile.id);
            return StepOutcome {
                rep_event: None,
                feedback: state.feedback_text.clone(),
            };
        }

        let mut rep_event = None;

        match state.phase {
            Phase::Up => {
                if angle < profile.down_threshold {
                    debug!("{}: Up -> Down at {:.1} deg", profile.id, angle);
                    state.phase = Phase::Down;
                    state.min_angle_this_down = Some(angle);
                    state.feedback_text = profile.down_cue().to_string();
                }
            }
            Phase::Down => {
                let min_angle = state.min_angle_this_down.map_or(angle, |min| min.min(angle));
                state.min_angle_this_down = Some(min_angle);

                if angle > profile.up_threshold {
                    let event = self.complete_rep(state, profile, min_angle, timestamp);
                    debug!("{}: Down -> Up at {:.1} deg", profile.id, angle);
                    rep_event = Some(event);
                }
            }
        }

        StepOutcome {
            rep_event,
            feedback: render_feedback(state, profile, angle),
        }
    }

    fn complete_rep(
        &self,
        state: &mut RepSessionState,
        profile: &ExerciseProfile,
        min_angle: f64,
        timestamp: f64,
    ) -> RepEvent {
        state.rep_count += 1;
        let accuracy = score_depth(min_angle, profile);

        let mut feedback = profile.count_feedback(state.rep_count);
        if let (Some(interval), Some(last)) = (self.min_rep_interval, state.last_rep_timestamp) {
            let elapsed = timestamp - last;
            if (0.0..interval).contains(&elapsed) {
                feedback.push_str(FEEDBACK_SEPARATOR);
                feedback.push_str(SLOW_DOWN_HINT);
            }
        }

        state.phase = Phase::Up;
        state.min_angle_this_down = None;
        state.last_rep_timestamp = Some(timestamp);
        state.latest_accuracy = Some(accuracy);
        state.feedback_text = feedback;

        info!(
            "{} rep {} completed (depth {:.1} deg, accuracy {:.0}%)",
            profile.id, state.rep_count, min_angle, accuracy
        );

        RepEvent {
            count: state.rep_count,
            timestamp,
            posture_accuracy: accuracy,
        }
    }
}

/// Map the deepest angle of a rep to a `[0, 100]` accuracy
///
/// Reaching `ideal_angle` or deeper scores 100; the score falls linearly to 0
/// at `up_threshold`. Never increases as `min_angle` grows.
#[must_use]
pub fn score_depth(min_angle: f64, profile: &ExerciseProfile) -> f64 {
    let range = profile.up_threshold - profile.ideal_angle;
    if range <= 0.0 || !min_angle.is_finite() {
        return MIN_ACCURACY;
    }
    (MAX_ACCURACY * (profile.up_threshold - min_angle) / range).clamp(MIN_ACCURACY, MAX_ACCURACY)
}

/// Form warning for an angle, independent of counting
#[must_use]
pub fn form_warning<'a>(profile: &'a ExerciseProfile, phase: Phase, angle: f64) -> Option<&'a str> {
    if profile.low_form_bound.is_some_and(|low| angle < low) {
        return Some(profile.low_form_warning());
    }
    if phase == Phase::Up && profile.high_form_bound.is_some_and(|high| angle > high) {
        return Some(profile.high_form_warning());
    }
    None
}

fn render_feedback(state: &RepSessionState, profile: &ExerciseProfile, angle: f64) -> String {
    form_warning(profile, state.phase, angle)
        .map_or_else(|| state.feedback_text.clone(), str::to_string)
}

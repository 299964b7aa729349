//! Session lifecycle and rep aggregation.
//!
//! A session starts on an explicit signal, is fed frames one at a time, and is
//! summarized on an explicit stop. [`SessionSummary`] is everything handed to
//! the outside world; this module performs no I/O.

use crate::config::Config;
use crate::filters::LandmarkFilter;
use crate::landmarks::Frame;
use crate::processor::{FrameOutput, FrameProcessor};
use crate::profile::{ExerciseProfile, ProfileRegistry};
use crate::rep_state::{RepEvent, RepSessionState};
use crate::Result;
use log::info;
use serde::{Deserialize, Serialize};

/// Final report of one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Profile identifier the reps were counted with
    pub exercise: String,
    pub total_reps: usize,
    /// Mean posture accuracy, 0 when no reps were completed
    pub avg_accuracy: f64,
    pub duration_seconds: f64,
    pub rep_events: Vec<RepEvent>,
}

/// Collects rep events between start and stop
#[derive(Debug, Clone, PartialEq)]
pub struct SessionAggregator {
    exercise: String,
    started_at: f64,
    events: Vec<RepEvent>,
}

impl SessionAggregator {
    #[must_use]
    pub fn new(exercise: impl Into<String>, started_at: f64) -> Self {
        Self {
            exercise: exercise.into(),
            started_at,
            events: Vec::new(),
        }
    }

    pub fn record(&mut self, event: RepEvent) {
        self.events.push(event);
    }

    #[must_use]
    pub fn events(&self) -> &[RepEvent] {
        &self.events
    }

    #[must_use]
    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    /// Mean accuracy of the recorded events, 0 if there are none
    #[must_use]
    pub fn average_accuracy(&self) -> f64 {
        if self.events.is_empty() {
            return 0.0;
        }
        self.events.iter().map(|e| e.posture_accuracy).sum::<f64>() / self.events.len() as f64
    }

    /// Close the window at `stopped_at` and build the summary
    #[must_use]
    pub fn finish(self, stopped_at: f64) -> SessionSummary {
        SessionSummary {
            avg_accuracy: self.average_accuracy(),
            total_reps: self.events.len(),
            duration_seconds: (stopped_at - self.started_at).max(0.0),
            exercise: self.exercise,
            rep_events: self.events,
        }
    }
}

/// One exercise session: profile, rep state, smoothing history and aggregator
///
/// Every `Session` owns its own state and smoother, so independent sessions
/// can run side by side without synchronization.
pub struct Session {
    profile: ExerciseProfile,
    processor: FrameProcessor,
    state: RepSessionState,
    smoother: Box<dyn LandmarkFilter>,
    aggregator: SessionAggregator,
}

impl Session {
    /// Start a session at `timestamp` (seconds)
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidProfile`] if `profile` fails validation.
    pub fn start(
        profile: ExerciseProfile,
        processor: FrameProcessor,
        smoother: Box<dyn LandmarkFilter>,
        timestamp: f64,
    ) -> Result<Self> {
        profile.validate()?;
        info!("Starting {} session with {}", profile.id, smoother.name());
        let mut state = RepSessionState::new();
        state.set_feedback(start_message(&profile));
        Ok(Self {
            aggregator: SessionAggregator::new(profile.id.clone(), timestamp),
            profile,
            processor,
            state,
            smoother,
        })
    }

    /// Start a session for `exercise` using configured smoothing and gating
    ///
    /// # Errors
    ///
    /// Unknown exercise identifier or invalid smoothing configuration.
    pub fn from_config(config: &Config, registry: &ProfileRegistry, exercise: &str, timestamp: f64) -> Result<Self> {
        let profile = registry.get(exercise)?.clone();
        let smoother = config.create_filter()?;
        Self::start(profile, FrameProcessor::from_config(config), smoother, timestamp)
    }

    /// Feed one raw frame captured at `timestamp`
    pub fn process_frame(&mut self, frame: &Frame, timestamp: f64) -> FrameOutput {
        let output = self.processor.process(
            frame,
            &self.profile,
            &mut self.state,
            self.smoother.as_mut(),
            timestamp,
        );
        if let Some(event) = output.rep_event {
            self.aggregator.record(event);
        }
        output
    }

    /// Change exercise mid-session
    ///
    /// Closes the current aggregation window and returns its summary, then
    /// starts counting from zero with fresh smoothing history.
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidProfile`] if `profile` fails validation; the
    /// current exercise then keeps running untouched.
    pub fn switch_exercise(&mut self, profile: ExerciseProfile, timestamp: f64) -> Result<SessionSummary> {
        profile.validate()?;
        info!("Switching exercise from {} to {}", self.profile.id, profile.id);
        let previous = std::mem::replace(&mut self.aggregator, SessionAggregator::new(profile.id.clone(), timestamp));

        self.state.reset();
        self.state.set_feedback(format!("Switched to {}. {}", profile.id, start_message(&profile)));
        self.smoother.reset();
        self.profile = profile;

        Ok(previous.finish(timestamp))
    }

    /// Stop the session and summarize it
    #[must_use]
    pub fn stop(self, timestamp: f64) -> SessionSummary {
        let summary = self.aggregator.finish(timestamp);
        info!(
            "Stopped {} session: {} reps, {:.0}% average accuracy over {:.1}s",
            summary.exercise, summary.total_reps, summary.avg_accuracy, summary.duration_seconds
        );
        summary
    }

    #[must_use]
    pub fn profile(&self) -> &ExerciseProfile {
        &self.profile
    }

    #[must_use]
    pub fn state(&self) -> &RepSessionState {
        &self.state
    }

    #[must_use]
    pub fn rep_events(&self) -> &[RepEvent] {
        self.aggregator.events()
    }
}

fn start_message(profile: &ExerciseProfile) -> String {
    format!("Start your {}!", profile.label.to_lowercase())
}

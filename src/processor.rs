//! Per-frame orchestration: smooth, measure, gate, step.
//!
//! [`FrameProcessor`] holds only immutable settings. The session state and
//! the smoother are passed in on every call so that no history is shared
//! between sessions.

use crate::config::Config;
use crate::constants::DEFAULT_CONFIDENCE_FLOOR;
use crate::filters::LandmarkFilter;
use crate::landmarks::{Frame, Landmark};
use crate::profile::ExerciseProfile;
use crate::rep_state::{Phase, RepEvent, RepSessionState, RepStateMachine};
use log::debug;
use serde::Serialize;

/// Why a frame was skipped without touching the session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Landmark count differs from the smoothing history
    TopologyMismatch,
    /// A required joint is absent or not a finite number
    MissingLandmark,
    /// A required joint is below the confidence floor
    LowConfidence,
    /// Joint points coincide, the angle is undefined
    DegenerateGeometry,
}

/// What the driver renders after each frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutput {
    pub phase: Phase,
    pub rep_count: u32,
    pub feedback_text: String,
    pub latest_accuracy: Option<f64>,
    /// Active joint angle used for this frame
    pub angle: Option<f64>,
    /// Rep completed on this frame
    pub rep_event: Option<RepEvent>,
    /// Set when the frame did not reach the state machine
    pub skipped: Option<SkipReason>,
}

impl FrameOutput {
    fn from_state(state: &RepSessionState, feedback_text: String) -> Self {
        Self {
            phase: state.phase(),
            rep_count: state.rep_count(),
            feedback_text,
            latest_accuracy: state.latest_accuracy(),
            angle: None,
            rep_event: None,
            skipped: None,
        }
    }

    fn skipped(state: &RepSessionState, reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::from_state(state, state.feedback_text().to_string())
        }
    }
}

/// Deterministic per-frame entry point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameProcessor {
    confidence_floor: f64,
    machine: RepStateMachine,
}

impl Default for FrameProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_FLOOR, RepStateMachine::default())
    }
}

impl FrameProcessor {
    #[must_use]
    pub fn new(confidence_floor: f64, machine: RepStateMachine) -> Self {
        Self {
            confidence_floor,
            machine,
        }
    }

    /// Processor with the floor and rest interval from a configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.detection.confidence_floor,
            RepStateMachine::new(config.reps.min_rep_interval_secs),
        )
    }

    #[must_use]
    pub fn confidence_floor(&self) -> f64 {
        self.confidence_floor
    }

    /// Process one raw frame
    ///
    /// Skipped frames leave `state` untouched; only the smoother may have
    /// absorbed the frame into its history.
    ///
    /// `profile` is expected to have passed [`ExerciseProfile::validate`],
    /// as every registry row and [`crate::session::Session`] profile has.
    pub fn process(
        &self,
        raw: &Frame,
        profile: &ExerciseProfile,
        state: &mut RepSessionState,
        smoother: &mut dyn LandmarkFilter,
        timestamp: f64,
    ) -> FrameOutput {
        let Some(smoothed) = smoother.apply(raw) else {
            let reason = if raw.is_empty() {
                SkipReason::MissingLandmark
            } else {
                SkipReason::TopologyMismatch
            };
            debug!("Skipping frame at {timestamp:.3}s: {reason:?}");
            return FrameOutput::skipped(state, reason);
        };

        let gated = gate_confidence(raw, &smoothed);
        let Some(angle) = profile.measure(&gated, self.confidence_floor) else {
            let reason = classify_skip(&gated, profile, self.confidence_floor);
            debug!("Skipping frame at {timestamp:.3}s for {}: {reason:?}", profile.id);
            return FrameOutput::skipped(state, reason);
        };

        let outcome = self.machine.step(state, profile, angle, timestamp);
        FrameOutput {
            angle: Some(angle),
            rep_event: outcome.rep_event,
            ..FrameOutput::from_state(state, outcome.feedback)
        }
    }
}

/// Smoothed positions, scored by the weaker of the raw and smoothed confidence
fn gate_confidence(raw: &Frame, smoothed: &Frame) -> Frame {
    smoothed
        .landmarks()
        .iter()
        .zip(raw.landmarks())
        .map(|(s, r)| Landmark::new(s.x, s.y, s.score.min(r.score)))
        .collect::<Vec<_>>()
        .into()
}

fn classify_skip(frame: &Frame, profile: &ExerciseProfile, confidence_floor: f64) -> SkipReason {
    let required: Vec<Option<&Landmark>> = profile.angles.indices().into_iter().map(|i| frame.get(i)).collect();

    if required.iter().any(|lm| lm.map_or(true, |lm| !lm.is_finite())) {
        SkipReason::MissingLandmark
    } else if required.iter().flatten().any(|lm| lm.score < confidence_floor) {
        SkipReason::LowConfidence
    } else {
        SkipReason::DegenerateGeometry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::JointAngleSpec;
    use crate::filters::moving_average::LandmarkSmoother;
    use crate::filters::NoFilter;
    use crate::profile::AngleSpecs;

    fn elbow_profile() -> ExerciseProfile {
        ExerciseProfile {
            id: "elbow".to_string(),
            label: "Bends".to_string(),
            angles: AngleSpecs::Single(JointAngleSpec::new(0, 1, 2)),
            down_threshold: 100.0,
            up_threshold: 160.0,
            ideal_angle: 90.0,
            low_form_bound: None,
            high_form_bound: None,
            down_cue: None,
            low_form_warning: None,
            high_form_warning: None,
        }
    }

    /// Three-point frame whose angle at point 1 is `degrees`
    fn frame_with_angle(degrees: f64, score: f64) -> Frame {
        let rad = degrees.to_radians();
        Frame::new(vec![
            Landmark::new(0.5 + 0.2, 0.5, score),
            Landmark::new(0.5, 0.5, score),
            Landmark::new(0.5 + 0.2 * rad.cos(), 0.5 + 0.2 * rad.sin(), score),
        ])
    }

    #[test]
    fn test_processes_measured_angle() {
        let processor = FrameProcessor::default();
        let mut state = RepSessionState::new();
        let mut smoother = NoFilter;

        let output = processor.process(&frame_with_angle(90.0, 0.9), &elbow_profile(), &mut state, &mut smoother, 0.0);
        assert!(output.skipped.is_none());
        assert!((output.angle.unwrap() - 90.0).abs() < 1e-6);
        assert_eq!(output.phase, Phase::Down);
    }

    #[test]
    fn test_low_confidence_skips() {
        let processor = FrameProcessor::default();
        let mut state = RepSessionState::new();
        let mut smoother = LandmarkSmoother::new(5);
        let profile = elbow_profile();

        for i in 0..5 {
            processor.process(&frame_with_angle(170.0, 0.9), &profile, &mut state, &mut smoother, f64::from(i));
        }
        let output = processor.process(&frame_with_angle(60.0, 0.2), &profile, &mut state, &mut smoother, 5.0);
        assert_eq!(output.skipped, Some(SkipReason::LowConfidence));
        assert_eq!(output.phase, Phase::Up);
        assert_eq!(state.phase(), Phase::Up);
    }

    #[test]
    fn test_degenerate_and_missing() {
        let processor = FrameProcessor::default();
        let profile = elbow_profile();

        let mut state = RepSessionState::new();
        let collapsed = Frame::new(vec![Landmark::new(0.5, 0.5, 0.9); 3]);
        let output = processor.process(&collapsed, &profile, &mut state, &mut NoFilter, 0.0);
        assert_eq!(output.skipped, Some(SkipReason::DegenerateGeometry));

        let short = Frame::new(vec![Landmark::new(0.5, 0.5, 0.9); 2]);
        let output = processor.process(&short, &profile, &mut state, &mut NoFilter, 0.0);
        assert_eq!(output.skipped, Some(SkipReason::MissingLandmark));
        assert_eq!(state, RepSessionState::new());
    }

    #[test]
    fn test_topology_mismatch() {
        let processor = FrameProcessor::default();
        let profile = elbow_profile();
        let mut state = RepSessionState::new();
        let mut smoother = LandmarkSmoother::new(3);

        processor.process(&frame_with_angle(170.0, 0.9), &profile, &mut state, &mut smoother, 0.0);
        let mut bigger = frame_with_angle(90.0, 0.9).landmarks().to_vec();
        bigger.push(Landmark::new(0.1, 0.1, 0.9));
        let output = processor.process(&bigger.into(), &profile, &mut state, &mut smoother, 0.1);
        assert_eq!(output.skipped, Some(SkipReason::TopologyMismatch));
        assert_eq!(smoother.len(), 1);
    }
}

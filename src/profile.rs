//! Declarative exercise profiles.
//!
//! An exercise is one table row: which joint angle(s) to watch, the two
//! hysteresis thresholds, optional form bounds and the feedback wording. The
//! state machine never branches on the exercise identifier.

use std::collections::BTreeMap;

use crate::angle::JointAngleSpec;
use crate::constants::{
    DEFAULT_DOWN_CUE, DEFAULT_HIGH_FORM_WARNING, DEFAULT_LOW_FORM_WARNING, MAX_JOINT_ANGLE, MIN_JOINT_ANGLE,
    NUM_POSE_LANDMARKS,
};
use crate::landmarks::{
    LEFT_ANKLE, LEFT_ELBOW, LEFT_HIP, LEFT_KNEE, LEFT_SHOULDER, LEFT_WRIST, RIGHT_ANKLE, RIGHT_ELBOW, RIGHT_HIP,
    RIGHT_KNEE, RIGHT_SHOULDER, RIGHT_WRIST,
};
use crate::landmarks::Frame;
use crate::{Error, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Which joint angle(s) drive an exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleSpecs {
    /// One joint
    Single(JointAngleSpec),
    /// Left/right joints, averaged when both are visible
    Pair {
        left: JointAngleSpec,
        right: JointAngleSpec,
    },
}

impl AngleSpecs {
    /// Every landmark index read by these specs
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        match self {
            Self::Single(spec) => spec.indices().to_vec(),
            Self::Pair { left, right } => left.indices().into_iter().chain(right.indices()).collect(),
        }
    }

    /// Active angle for a frame
    ///
    /// For a pair, a side that cannot be measured is ignored; `None` only when
    /// no side yields an angle.
    #[must_use]
    pub fn measure(&self, frame: &Frame, confidence_floor: f64) -> Option<f64> {
        match self {
            Self::Single(spec) => spec.measure(frame, confidence_floor),
            Self::Pair { left, right } => {
                match (left.measure(frame, confidence_floor), right.measure(frame, confidence_floor)) {
                    (Some(l), Some(r)) => Some((l + r) / 2.0),
                    (Some(angle), None) | (None, Some(angle)) => Some(angle),
                    (None, None) => None,
                }
            }
        }
    }

    fn specs(&self) -> Vec<JointAngleSpec> {
        match self {
            Self::Single(spec) => vec![*spec],
            Self::Pair { left, right } => vec![*left, *right],
        }
    }
}

/// Thresholds, joints and wording for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProfile {
    /// Identifier used to look the profile up
    pub id: String,

    /// Display label used in the rep counter feedback
    pub label: String,

    /// Joint angle(s) driving the state machine, written as `single: {...}`
    /// or `pair: {left: {...}, right: {...}}`
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub angles: AngleSpecs,

    /// Angle below which the rep enters the down phase
    pub down_threshold: f64,

    /// Angle above which the rep returns to the up phase and is counted
    pub up_threshold: f64,

    /// Depth that earns full posture accuracy
    pub ideal_angle: f64,

    /// Over-flexion warning below this angle
    #[serde(default)]
    pub low_form_bound: Option<f64>,

    /// Lock-out warning above this angle while up
    #[serde(default)]
    pub high_form_bound: Option<f64>,

    /// Encouragement shown when the down phase starts
    #[serde(default)]
    pub down_cue: Option<String>,

    /// Over-flexion message
    #[serde(default)]
    pub low_form_warning: Option<String>,

    /// Lock-out message
    #[serde(default)]
    pub high_form_warning: Option<String>,
}

impl ExerciseProfile {
    /// Check the profile for configuration errors
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidProfile`] when thresholds are misordered or out
    /// of range, or a joint index is outside the skeleton.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| -> Result<()> { Err(Error::InvalidProfile(format!("{}: {msg}", self.id))) };

        if self.id.trim().is_empty() {
            return Err(Error::InvalidProfile("Profile id must not be empty".to_string()));
        }

        let angles = [
            ("down_threshold", Some(self.down_threshold)),
            ("up_threshold", Some(self.up_threshold)),
            ("ideal_angle", Some(self.ideal_angle)),
            ("low_form_bound", self.low_form_bound),
            ("high_form_bound", self.high_form_bound),
        ];
        for (name, value) in angles {
            if let Some(value) = value {
                if !value.is_finite() || !(MIN_JOINT_ANGLE..=MAX_JOINT_ANGLE).contains(&value) {
                    return invalid(format!("{name} must be between 0 and 180 degrees, got {value}"));
                }
            }
        }

        if self.down_threshold >= self.up_threshold {
            return invalid(format!(
                "down_threshold ({}) must be below up_threshold ({})",
                self.down_threshold, self.up_threshold
            ));
        }
        if self.ideal_angle >= self.up_threshold {
            return invalid(format!(
                "ideal_angle ({}) must be below up_threshold ({})",
                self.ideal_angle, self.up_threshold
            ));
        }
        if let (Some(low), Some(high)) = (self.low_form_bound, self.high_form_bound) {
            if low >= high {
                return invalid(format!("low_form_bound ({low}) must be below high_form_bound ({high})"));
            }
        }

        for spec in self.angles.specs() {
            if let Some(index) = spec.indices().into_iter().find(|&i| i >= NUM_POSE_LANDMARKS) {
                return invalid(format!("landmark index {index} is outside the {NUM_POSE_LANDMARKS}-point skeleton"));
            }
            if spec.vertex == spec.a || spec.vertex == spec.c {
                return invalid(format!("angle vertex {} repeats an end point", spec.vertex));
            }
        }

        Ok(())
    }

    /// Active angle for a frame, see [`AngleSpecs::measure`]
    #[must_use]
    pub fn measure(&self, frame: &Frame, confidence_floor: f64) -> Option<f64> {
        self.angles.measure(frame, confidence_floor)
    }

    pub fn down_cue(&self) -> &str {
        self.down_cue.as_deref().unwrap_or(DEFAULT_DOWN_CUE)
    }

    pub fn low_form_warning(&self) -> &str {
        self.low_form_warning.as_deref().unwrap_or(DEFAULT_LOW_FORM_WARNING)
    }

    pub fn high_form_warning(&self) -> &str {
        self.high_form_warning.as_deref().unwrap_or(DEFAULT_HIGH_FORM_WARNING)
    }

    /// Rep counter text, e.g. `Squats: 3`
    #[must_use]
    pub fn count_feedback(&self, rep_count: u32) -> String {
        format!("{}: {}", self.label, rep_count)
    }
}

/// Knee pair (hip-knee-ankle on both sides)
const KNEES: AngleSpecs = AngleSpecs::Pair {
    left: JointAngleSpec::new(LEFT_HIP, LEFT_KNEE, LEFT_ANKLE),
    right: JointAngleSpec::new(RIGHT_HIP, RIGHT_KNEE, RIGHT_ANKLE),
};

/// Elbow pair (shoulder-elbow-wrist on both sides)
const ELBOWS: AngleSpecs = AngleSpecs::Pair {
    left: JointAngleSpec::new(LEFT_SHOULDER, LEFT_ELBOW, LEFT_WRIST),
    right: JointAngleSpec::new(RIGHT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST),
};

/// The exercises shipped with the library
#[must_use]
pub fn builtin_profiles() -> Vec<ExerciseProfile> {
    vec![
        ExerciseProfile {
            id: "squat".to_string(),
            label: "Squats".to_string(),
            angles: KNEES,
            down_threshold: 100.0,
            up_threshold: 160.0,
            ideal_angle: 90.0,
            low_form_bound: Some(60.0),
            high_form_bound: None,
            down_cue: Some("Down position!".to_string()),
            low_form_warning: Some("Too deep, keep your heels down!".to_string()),
            high_form_warning: None,
        },
        ExerciseProfile {
            id: "pushup".to_string(),
            label: "Push-ups".to_string(),
            angles: ELBOWS,
            down_threshold: 90.0,
            up_threshold: 160.0,
            ideal_angle: 80.0,
            low_form_bound: None,
            high_form_bound: Some(170.0),
            down_cue: Some("Push-up down detected, push up!".to_string()),
            low_form_warning: None,
            high_form_warning: Some("Keep arms slightly bent, don't lock elbows!".to_string()),
        },
        ExerciseProfile {
            id: "lunge".to_string(),
            label: "Lunges".to_string(),
            angles: KNEES,
            down_threshold: 100.0,
            up_threshold: 160.0,
            ideal_angle: 90.0,
            low_form_bound: Some(70.0),
            high_form_bound: None,
            down_cue: Some("Lunge down detected, push up!".to_string()),
            low_form_warning: Some("Don't drop knee too low!".to_string()),
            high_form_warning: None,
        },
    ]
}

/// Validated profiles keyed by identifier
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, ExerciseProfile>,
}

impl ProfileRegistry {
    /// Empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in exercises
    ///
    /// # Errors
    ///
    /// Only if a built-in row fails validation.
    pub fn with_builtin() -> Result<Self> {
        let mut registry = Self::new();
        for profile in builtin_profiles() {
            registry.register(profile)?;
        }
        Ok(registry)
    }

    /// Registry from a YAML list of profile rows
    ///
    /// Rows that fail registration are skipped and returned alongside the
    /// registry; the remaining rows stay usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] on malformed YAML.
    pub fn from_yaml_str(content: &str) -> Result<(Self, Vec<Error>)> {
        let rows: Vec<ExerciseProfile> = serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse profiles: {e}")))?;
        let mut registry = Self::new();
        let rejected = registry.register_all(rows);
        Ok((registry, rejected))
    }

    /// Register each row, skipping the ones that fail
    ///
    /// Returns the error of every rejected row in input order.
    pub fn register_all<I>(&mut self, rows: I) -> Vec<Error>
    where
        I: IntoIterator<Item = ExerciseProfile>,
    {
        let mut rejected = Vec::new();
        for profile in rows {
            if let Err(e) = self.register(profile) {
                warn!("Rejected exercise profile: {e}");
                rejected.push(e);
            }
        }
        rejected
    }

    /// Validate and add a new profile
    ///
    /// # Errors
    ///
    /// [`Error::InvalidProfile`] if validation fails, [`Error::DuplicateProfile`]
    /// if the identifier is taken. The registry is unchanged on error.
    pub fn register(&mut self, profile: ExerciseProfile) -> Result<()> {
        profile.validate()?;
        if self.profiles.contains_key(&profile.id) {
            return Err(Error::DuplicateProfile(profile.id));
        }
        debug!("Registered exercise profile {}", profile.id);
        self.profiles.insert(profile.id.clone(), profile);
        Ok(())
    }

    /// Validate and add a profile, replacing any existing row with the same id
    ///
    /// # Errors
    ///
    /// [`Error::InvalidProfile`] if validation fails.
    pub fn register_or_replace(&mut self, profile: ExerciseProfile) -> Result<Option<ExerciseProfile>> {
        profile.validate()?;
        debug!("Registered exercise profile {} (replacing)", profile.id);
        Ok(self.profiles.insert(profile.id.clone(), profile))
    }

    /// Look up a profile
    ///
    /// # Errors
    ///
    /// [`Error::UnknownExercise`] if no row has this id.
    pub fn get(&self, id: &str) -> Result<&ExerciseProfile> {
        self.profiles
            .get(id)
            .ok_or_else(|| Error::UnknownExercise(id.to_string()))
    }

    /// Registered identifiers in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExerciseProfile> {
        self.profiles.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

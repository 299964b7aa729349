//! End-to-end tests: raw frames through a session to the summary


use rep_counter::{
    config::Config,
    filters::{create_filter, NoFilter},
    processor::FrameProcessor,
    profile::ProfileRegistry,
    rep_state::{Phase, RepStateMachine},
    session::{Session, SessionSummary},
};
use test_helpers::{assert_close, elbow_frame, knee_frame, squat_angles};

fn unsmoothed_squat_session(start: f64) -> Session {
    let registry = ProfileRegistry::with_builtin().unwrap();
    let profile = registry.get("squat").unwrap().clone();
    Session::start(profile, FrameProcessor::default(), Box::new(NoFilter), start).unwrap()
}

#[test]
fn test_squat_scenario_phase_transitions() {
    let mut session = unsmoothed_squat_session(0.0);
    let angles = [170.0, 165.0, 95.0, 90.0, 162.0, 168.0];

    let outputs: Vec<_> = angles
        .iter()
        .enumerate()
        .map(|(i, &angle)| session.process_frame(&knee_frame(angle), i as f64 * 0.5))
        .collect();

    let phases: Vec<Phase> = outputs.iter().map(|o| o.phase).collect();
    assert_eq!(
        phases,
        vec![Phase::Up, Phase::Up, Phase::Down, Phase::Down, Phase::Up, Phase::Up]
    );
    assert_eq!(outputs[3].rep_count, 0);
    assert_eq!(outputs[4].rep_count, 1);
    assert!(outputs[4].rep_event.is_some());
    assert_eq!(outputs[4].feedback_text, "Squats: 1");
    assert_eq!(outputs[5].rep_count, 1);

    let summary = session.stop(3.0);
    assert_eq!(summary.total_reps, 1);
    assert_eq!(summary.rep_events[0].count, 1);
    assert_eq!(summary.rep_events[0].timestamp, 2.0);
    assert_close(summary.avg_accuracy, 100.0, 1e-6);
}

#[test]
fn test_smoothed_session_counts_slow_reps() {
    let config = Config::default();
    let registry = config.build_registry().unwrap();
    let mut session = Session::from_config(&config, &registry, "squat", 0.0).unwrap();

    let angles = squat_angles(4, 10);
    let mut end = 0.0;
    for (i, &angle) in angles.iter().enumerate() {
        end = i as f64 / 30.0;
        let output = session.process_frame(&knee_frame(angle), end);
        assert!(output.skipped.is_none());
    }

    assert_eq!(session.state().rep_count(), 4);
    let summary = session.stop(end);
    assert_eq!(summary.total_reps, 4);
    assert_eq!(summary.exercise, "squat");
    for (i, event) in summary.rep_events.iter().enumerate() {
        assert_eq!(event.count as usize, i + 1);
        assert!((0.0..=100.0).contains(&event.posture_accuracy));
    }
    assert_close(summary.duration_seconds, end, 1e-9);
}

#[test]
fn test_pushup_session_with_lock_out_warning() {
    let registry = ProfileRegistry::with_builtin().unwrap();
    let profile = registry.get("pushup").unwrap().clone();
    let mut session = Session::start(profile, FrameProcessor::default(), Box::new(NoFilter), 0.0).unwrap();

    let output = session.process_frame(&elbow_frame(175.0), 0.0);
    assert_eq!(output.feedback_text, "Keep arms slightly bent, don't lock elbows!");

    session.process_frame(&elbow_frame(80.0), 1.0);
    let output = session.process_frame(&elbow_frame(165.0), 2.0);
    assert_eq!(output.rep_count, 1);
    assert_eq!(output.feedback_text, "Push-ups: 1");
    assert_close(output.latest_accuracy.unwrap(), 100.0, 1e-6);
}

#[test]
fn test_summary_scenario() {
    let registry = ProfileRegistry::with_builtin().unwrap();
    let mut profile = registry.get("squat").unwrap().clone();
    // With ideal 90 and up 160 these depths score 80, 90 and 70
    let depths = [104.0, 97.0, 111.0];
    // Let the shallowest dip still enter Down
    profile.down_threshold = 115.0;
    let mut session = Session::start(profile, FrameProcessor::new(0.5, RepStateMachine::new(None)), Box::new(NoFilter), 0.0).unwrap();

    let mut t = 0.0;
    for depth in depths {
        for angle in [170.0, depth, 170.0] {
            t += 1.0;
            session.process_frame(&knee_frame(angle), t);
        }
    }

    let summary = session.stop(t);
    let accuracies: Vec<f64> = summary.rep_events.iter().map(|e| e.posture_accuracy).collect();
    assert_eq!(summary.total_reps, 3);
    assert_close(accuracies[0], 80.0, 1e-6);
    assert_close(accuracies[1], 90.0, 1e-6);
    assert_close(accuracies[2], 70.0, 1e-6);
    assert_close(summary.avg_accuracy, 80.0, 1e-6);
}

#[test]
fn test_switch_exercise_resets_counting() {
    let mut session = unsmoothed_squat_session(0.0);
    for (i, angle) in [170.0, 90.0, 170.0].into_iter().enumerate() {
        session.process_frame(&knee_frame(angle), i as f64);
    }
    assert_eq!(session.state().rep_count(), 1);

    let lunge = ProfileRegistry::with_builtin().unwrap().get("lunge").unwrap().clone();
    let squat_summary = session.switch_exercise(lunge, 5.0).unwrap();
    assert_eq!(squat_summary.exercise, "squat");
    assert_eq!(squat_summary.total_reps, 1);
    assert_eq!(squat_summary.duration_seconds, 5.0);

    assert_eq!(session.state().rep_count(), 0);
    assert_eq!(session.state().phase(), Phase::Up);
    assert!(session.state().feedback_text().starts_with("Switched to lunge"));
    assert!(session.rep_events().is_empty());

    for (i, angle) in [170.0, 90.0, 170.0].into_iter().enumerate() {
        session.process_frame(&knee_frame(angle), 6.0 + i as f64);
    }
    let lunge_summary = session.stop(10.0);
    assert_eq!(lunge_summary.exercise, "lunge");
    assert_eq!(lunge_summary.total_reps, 1);
    assert_eq!(lunge_summary.duration_seconds, 5.0);
}

fn run_squats(reps: usize) -> SessionSummary {
    let config = Config::default();
    let registry = config.build_registry().unwrap();
    let mut session = Session::from_config(&config, &registry, "squat", 0.0).unwrap();
    let angles = squat_angles(reps, 8);
    for (i, &angle) in angles.iter().enumerate() {
        session.process_frame(&knee_frame(angle), i as f64 / 30.0);
    }
    session.stop(angles.len() as f64 / 30.0)
}

#[test]
fn test_sessions_do_not_share_state() {
    let handles: Vec<_> = (1..=4).map(|reps| std::thread::spawn(move || run_squats(reps))).collect();
    let summaries: Vec<SessionSummary> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for (i, summary) in summaries.iter().enumerate() {
        assert_eq!(summary.total_reps, i + 1);
        assert_eq!(summary, &run_squats(i + 1));
    }
}

#[test]
fn test_interleaved_sessions_are_independent() {
    let mut a = unsmoothed_squat_session(0.0);
    let mut b = unsmoothed_squat_session(0.0);
    let mut smoothed = Session::start(
        ProfileRegistry::with_builtin().unwrap().get("squat").unwrap().clone(),
        FrameProcessor::default(),
        create_filter("moving_average:3").unwrap(),
        0.0,
    )
    .unwrap();

    for (i, angle) in [170.0, 90.0, 170.0, 90.0, 170.0].into_iter().enumerate() {
        a.process_frame(&knee_frame(angle), i as f64);
        b.process_frame(&knee_frame(170.0), i as f64);
        smoothed.process_frame(&knee_frame(170.0), i as f64);
    }

    assert_eq!(a.state().rep_count(), 2);
    assert_eq!(b.state().rep_count(), 0);
    assert_eq!(smoothed.state().rep_count(), 0);
}

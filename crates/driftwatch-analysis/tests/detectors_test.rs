use driftwatch_analysis::detectors::*;
use driftwatch_core::config::{AdwinParams, DdmParams, DetectorConfig};

fn first_drift(detector: &mut impl ChangeDetector, stream: &[f64]) -> Option<usize> {
    stream
        .iter()
        .position(|x| detector.update(*x) == DetectorState::Drift)
}

#[test]
fn ddm_is_silent_during_warm_up() {
    let mut ddm = Ddm::new(DdmParams::default());
    for _ in 0..499 {
        assert_eq!(ddm.update(1.0), DetectorState::Stable);
    }
}

#[test]
fn ddm_fires_after_error_rate_step() {
    let step = 500;
    let stream = test_fixtures::error_stream(17, 2_000, step, 0.0, 0.5);
    let mut ddm = Ddm::new(DdmParams::default());
    let alert = first_drift(&mut ddm, &stream).expect("drift expected after the step");
    assert!(alert >= step, "alert at index {alert} precedes the step at {step}");
    assert!(alert - step < 50, "alert at {alert} too late after step {step}");
}

#[test]
fn ddm_warns_before_alarming() {
    let stream = test_fixtures::error_stream(4, 3_000, 1_000, 0.05, 0.3);
    let mut ddm = Ddm::new(DdmParams::default());
    let mut warned = false;
    for x in stream {
        match ddm.update(x) {
            DetectorState::Warning => warned = true,
            DetectorState::Drift => break,
            DetectorState::Stable => {}
        }
    }
    assert!(warned);
}

#[test]
fn ddm_resets_after_drift_and_can_fire_again() {
    let mut stream = test_fixtures::error_stream(8, 1_500, 700, 0.02, 0.6);
    stream.extend(test_fixtures::error_stream(9, 2_000, 1_000, 0.6, 0.0));
    stream.extend(test_fixtures::error_stream(10, 1_500, 700, 0.02, 0.6));
    let mut ddm = Ddm::new(DdmParams::default());
    let drifts = stream
        .iter()
        .filter(|x| ddm.update(**x) == DetectorState::Drift)
        .count();
    assert!(drifts >= 2, "expected at least two drifts, got {drifts}");
}

#[test]
fn ddm_observations_restart_after_reset() {
    let mut ddm = Ddm::new(DdmParams::default());
    ddm.update(0.0);
    ddm.update(1.0);
    assert_eq!(ddm.observations(), 2);
    ddm.reset();
    assert_eq!(ddm.observations(), 0);
}

#[test]
fn adwin_detects_mean_shift() {
    let mut stream = vec![0.0; 1_000];
    stream.extend(vec![1.0; 1_000]);
    let mut adwin = Adwin::new(AdwinParams::default());
    let alert = first_drift(&mut adwin, &stream).expect("adwin should cut the window");
    assert!(alert >= 1_000);
    assert!(alert < 1_200, "cut at {alert}");
    assert!(adwin.width() < 1_200);
}

#[test]
fn adwin_stays_quiet_on_stationary_stream() {
    let stream = test_fixtures::error_stream(21, 3_000, 3_000, 0.3, 0.3);
    let mut adwin = Adwin::new(AdwinParams::default());
    let drifts = stream
        .iter()
        .filter(|x| adwin.update(**x) == DetectorState::Drift)
        .count();
    assert!(drifts <= 1, "false alarms: {drifts}");
}

#[test]
fn adwin_tracks_window_mean() {
    let mut adwin = Adwin::new(AdwinParams::default());
    for x in [1.0, 2.0, 3.0, 4.0] {
        adwin.update(x);
    }
    assert_eq!(adwin.width(), 4);
    assert!((adwin.mean() - 2.5).abs() < 1e-12);
    assert!((adwin.variance() - 1.25).abs() < 1e-12);
}

#[test]
fn detector_resolves_from_config() {
    let ddm = Detector::from_config(&DetectorConfig::default());
    assert_eq!(ddm.algorithm(), "ddm");
    assert!(ddm.consumes_errors());

    let adwin = Detector::from_config(&DetectorConfig::Adwin(AdwinParams::default()));
    assert_eq!(adwin.algorithm(), "adwin");
    assert!(!adwin.consumes_errors());
}

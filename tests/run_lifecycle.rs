// tests/run_lifecycle.rs

use tracker_test_utils::builders::{TrackerFixture, content};
use tracker_test_utils::init_tracing;

use std::collections::HashSet;
use std::error::Error;

use tracker::errors::TrackerError;
use tracker::runs::{allowed_next, can_transition, is_terminal};
use tracker::types::RunStatus;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn create_run_starts_created_and_schedules() -> TestResult {
    init_tracing();
    let fx = TrackerFixture::new();
    let workflow = fx.workflow("align");
    let analysis = fx.analysis("cohort", content("threads = 4"));
    let override_id = fx.config(content("threads = 8"));

    let run = fx.tracker.runs.create_run(
        &analysis.analysis_id,
        &override_id,
        Some(&workflow.workflow_id),
    )?;
    assert_eq!(run.status, RunStatus::Created);
    assert_eq!(run.workflow_id.as_deref(), Some(workflow.workflow_id.as_str()));

    let scheduled = fx.tracker.runs.set_scheduled(&run.analysis_run_id)?;
    assert_eq!(scheduled.status, RunStatus::Scheduled);
    assert_eq!(
        fx.tracker.runs.get_run(&run.analysis_run_id)?.status,
        RunStatus::Scheduled
    );
    Ok(())
}

#[test]
fn run_ids_are_unique() -> TestResult {
    let fx = TrackerFixture::new();
    let analysis = fx.analysis("cohort", content(""));
    let override_id = fx.config(content(""));

    let mut ids = HashSet::new();
    for _ in 0..50 {
        let run = fx
            .tracker
            .runs
            .create_run(&analysis.analysis_id, &override_id, None)?;
        assert!(ids.insert(run.analysis_run_id), "run id reused");
    }
    Ok(())
}

#[test]
fn create_run_requires_known_analysis_and_workflow() {
    let fx = TrackerFixture::new();
    let analysis = fx.analysis("cohort", content(""));
    let override_id = fx.config(content(""));

    let no_analysis = fx
        .tracker
        .runs
        .create_run("ghost", &override_id, None)
        .unwrap_err();
    assert!(no_analysis.is_not_found());

    let no_workflow = fx
        .tracker
        .runs
        .create_run(&analysis.analysis_id, &override_id, Some("ghost"))
        .unwrap_err();
    assert!(no_workflow.is_not_found());

    assert_eq!(
        fx.tracker
            .runs
            .count_by_status(&analysis.analysis_id, None)
            .unwrap(),
        0
    );
}

#[test]
fn skipping_scheduled_is_rejected() -> TestResult {
    let fx = TrackerFixture::new();
    let analysis = fx.analysis("cohort", content(""));
    let override_id = fx.config(content(""));
    let run = fx
        .tracker
        .runs
        .create_run(&analysis.analysis_id, &override_id, None)?;

    match fx
        .tracker
        .runs
        .set_status(&run.analysis_run_id, RunStatus::Running)
    {
        Err(TrackerError::InvalidTransition { from, to, .. }) => {
            assert_eq!(from, RunStatus::Created);
            assert_eq!(to, RunStatus::Running);
        }
        other => panic!("expected InvalidTransition, got {:?}", other),
    }

    // Rejected transitions leave the stored status alone.
    assert_eq!(
        fx.tracker.runs.get_run(&run.analysis_run_id)?.status,
        RunStatus::Created
    );
    Ok(())
}

#[test]
fn full_lifecycle_to_completed_then_terminal() -> TestResult {
    let fx = TrackerFixture::new();
    let analysis = fx.analysis("cohort", content(""));
    let override_id = fx.config(content(""));
    let run = fx
        .tracker
        .runs
        .create_run(&analysis.analysis_id, &override_id, None)?;
    let id = run.analysis_run_id.as_str();

    fx.tracker.runs.set_scheduled(id)?;
    fx.tracker.runs.set_status(id, RunStatus::Running)?;
    fx.tracker.runs.set_status(id, RunStatus::Completed)?;

    for next in RunStatus::ALL {
        let err = fx.tracker.runs.set_status(id, next).unwrap_err();
        assert!(matches!(err, TrackerError::InvalidTransition { .. }));
    }
    Ok(())
}

#[test]
fn cancel_is_only_possible_before_running() {
    assert!(can_transition(RunStatus::Created, RunStatus::Cancelled));
    assert!(can_transition(RunStatus::Scheduled, RunStatus::Cancelled));
    assert!(!can_transition(RunStatus::Running, RunStatus::Cancelled));
}

#[test]
fn transition_table_only_moves_forward() {
    fn rank(status: RunStatus) -> u8 {
        match status {
            RunStatus::Created => 0,
            RunStatus::Scheduled => 1,
            RunStatus::Running => 2,
            RunStatus::Completed | RunStatus::Failed | RunStatus::Cancelled => 3,
        }
    }

    for from in RunStatus::ALL {
        assert!(!can_transition(from, from), "{from} must not loop to itself");
        for to in allowed_next(from) {
            assert!(rank(*to) > rank(from), "{from} -> {to} moves backwards");
        }
    }

    assert!(is_terminal(RunStatus::Completed));
    assert!(is_terminal(RunStatus::Failed));
    assert!(is_terminal(RunStatus::Cancelled));
    assert!(!is_terminal(RunStatus::Scheduled));
}

#[test]
fn count_by_status_filters_per_analysis() -> TestResult {
    let fx = TrackerFixture::new();
    let analysis = fx.analysis("cohort", content(""));
    let other = fx.analysis("other", content(""));
    let override_id = fx.config(content(""));

    let mut run_ids = Vec::new();
    for _ in 0..3 {
        let run = fx
            .tracker
            .runs
            .create_run(&analysis.analysis_id, &override_id, None)?;
        run_ids.push(run.analysis_run_id);
    }
    fx.tracker
        .runs
        .create_run(&other.analysis_id, &override_id, None)?;

    fx.tracker.runs.set_scheduled(&run_ids[0])?;
    fx.tracker.runs.set_scheduled(&run_ids[1])?;
    fx.tracker
        .runs
        .set_status(&run_ids[2], RunStatus::Cancelled)?;

    let runs = &fx.tracker.runs;
    assert_eq!(runs.count_by_status(&analysis.analysis_id, None)?, 3);
    assert_eq!(
        runs.count_by_status(&analysis.analysis_id, Some(RunStatus::Scheduled))?,
        2
    );
    assert_eq!(
        runs.count_by_status(&analysis.analysis_id, Some(RunStatus::Cancelled))?,
        1
    );
    assert_eq!(
        runs.count_by_status(&analysis.analysis_id, Some(RunStatus::Created))?,
        0
    );
    assert_eq!(runs.count_by_status(&other.analysis_id, None)?, 1);
    Ok(())
}

#[test]
fn runs_for_analysis_lists_only_that_analysis_in_id_order() -> TestResult {
    let fx = TrackerFixture::new();
    let cohort = fx.analysis("cohort", content(""));
    let other = fx.analysis("other", content(""));
    let override_id = fx.config(content(""));

    for _ in 0..3 {
        fx.tracker
            .runs
            .create_run(&cohort.analysis_id, &override_id, None)?;
    }
    fx.tracker
        .runs
        .create_run(&other.analysis_id, &override_id, None)?;

    let runs = fx.tracker.runs.runs_for_analysis(&cohort.analysis_id)?;
    assert_eq!(runs.len(), 3);
    assert!(runs.iter().all(|run| run.analysis_id == cohort.analysis_id));

    let ids: Vec<&str> = runs.iter().map(|run| run.analysis_run_id.as_str()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    Ok(())
}

#[test]
fn run_status_parses_from_cli_strings() {
    assert_eq!("Scheduled".parse::<RunStatus>(), Ok(RunStatus::Scheduled));
    assert_eq!(" failed ".parse::<RunStatus>(), Ok(RunStatus::Failed));
    assert!("paused".parse::<RunStatus>().is_err());
}

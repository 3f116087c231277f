// tests/launch_batch.rs

use tracker_test_utils::builders::{TrackerFixture, content};
use tracker_test_utils::fake_trigger::FakeTrigger;
use tracker_test_utils::{init_tracing, with_timeout};

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use tracker::Tracker;
use tracker::errors::{Result as TrackerResult, TrackerError};
use tracker::fs::mock::MockFileSystem;
use tracker::launch::LaunchRequest;
use tracker::registry::{Analysis, Workflow};
use tracker::runs::AnalysisRun;
use tracker::store::{Backends, MemoryStore, RecordStore};
use tracker::types::{IdPolicy, RunStatus};

type TestResult = Result<(), Box<dyn Error>>;

fn request(workflow: &Workflow, analysis: &Analysis, dir: &str) -> LaunchRequest {
    LaunchRequest {
        workflow_id: workflow.workflow_id.clone(),
        analysis_id: analysis.analysis_id.clone(),
        config_dir: PathBuf::from(dir),
        id_policy: IdPolicy::Generated,
    }
}

#[tokio::test]
async fn two_files_yield_two_runs_with_merged_configs() -> TestResult {
    init_tracing();
    let fx = TrackerFixture::new();
    let workflow = fx.workflow("align");
    let analysis = fx.analysis("A1", content("threads = 4"));

    fx.add_source("batch/run1.cfg", "threads = 8");
    fx.add_source("batch/run2.cfg", "region = \"eu\"");

    let report = with_timeout(fx.launcher().launch(&request(&workflow, &analysis, "batch"))).await?;

    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.outcomes[0].source, PathBuf::from("batch/run1.cfg"));
    assert_eq!(report.outcomes[1].source, PathBuf::from("batch/run2.cfg"));

    let run1 = report.outcomes[0].analysis_run_id.clone().unwrap();
    let run2 = report.outcomes[1].analysis_run_id.clone().unwrap();

    let payload1 = fx.trigger.payload_for(&run1).expect("run1 was triggered");
    let payload2 = fx.trigger.payload_for(&run2).expect("run2 was triggered");
    assert_eq!(payload1.config, content("threads = 8"));
    assert_eq!(
        payload2.config,
        content(
            r#"
threads = 4
region = "eu"
"#
        )
    );

    // The workflow name is the engine-side target.
    for (target, _) in fx.trigger.received() {
        assert_eq!(target, "align");
    }

    assert_eq!(
        fx.tracker
            .runs
            .count_by_status(&analysis.analysis_id, Some(RunStatus::Scheduled))?,
        2
    );
    Ok(())
}

#[tokio::test]
async fn scheduled_count_equals_number_of_files() -> TestResult {
    let fx = TrackerFixture::new();
    let workflow = fx.workflow("align");
    let analysis = fx.analysis("cohort", content(""));

    for i in 0..7 {
        fx.add_source(format!("many/sample_{i}.toml"), &format!("sample = {i}"));
    }

    let report = fx
        .launcher()
        .launch(&request(&workflow, &analysis, "many"))
        .await?;

    assert_eq!(report.succeeded(), 7);
    assert_eq!(
        fx.tracker
            .runs
            .count_by_status(&analysis.analysis_id, Some(RunStatus::Scheduled))?,
        7
    );
    assert_eq!(fx.trigger.received().len(), 7);
    Ok(())
}

#[tokio::test]
async fn malformed_file_is_reported_and_does_not_stop_the_batch() -> TestResult {
    init_tracing();
    let fx = TrackerFixture::new();
    let workflow = fx.workflow("align");
    let analysis = fx.analysis("cohort", content("threads = 4"));

    fx.add_source("mixed/a_broken.toml", "threads = = 8");
    fx.add_source("mixed/b_good.toml", "threads = 8");

    let before = fx
        .tracker
        .runs
        .count_by_status(&analysis.analysis_id, Some(RunStatus::Scheduled))?;

    let report = fx
        .launcher()
        .launch(&request(&workflow, &analysis, "mixed"))
        .await?;

    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);

    let (failed_path, err) = report.failures().next().unwrap();
    assert_eq!(failed_path, PathBuf::from("mixed/a_broken.toml").as_path());
    assert!(matches!(err, TrackerError::InvalidSource(_)));
    assert!(report.outcomes[0].analysis_run_id.is_none());

    let after = fx
        .tracker
        .runs
        .count_by_status(&analysis.analysis_id, Some(RunStatus::Scheduled))?;
    assert_eq!(after - before, 1);
    assert_eq!(fx.tracker.runs.count_by_status(&analysis.analysis_id, None)?, 1);
    Ok(())
}

#[tokio::test]
async fn rejected_trigger_marks_run_failed_and_continues() -> TestResult {
    init_tracing();
    let fx = TrackerFixture::with_trigger(FakeTrigger::rejecting_key("poison"));
    let workflow = fx.workflow("align");
    let analysis = fx.analysis("cohort", content(""));

    fx.add_source("runs/1.toml", "poison = true");
    fx.add_source("runs/2.toml", "threads = 2");

    let report = fx
        .launcher()
        .launch(&request(&workflow, &analysis, "runs"))
        .await?;

    assert_eq!(report.succeeded(), 1);
    let rejected = &report.outcomes[0];
    assert!(matches!(rejected.result, Err(TrackerError::Trigger(_))));

    let rejected_run = rejected.analysis_run_id.as_deref().unwrap();
    assert_eq!(
        fx.tracker.runs.get_run(rejected_run)?.status,
        RunStatus::Failed
    );

    let runs = &fx.tracker.runs;
    assert_eq!(
        runs.count_by_status(&analysis.analysis_id, Some(RunStatus::Scheduled))?,
        1
    );
    assert_eq!(
        runs.count_by_status(&analysis.analysis_id, Some(RunStatus::Failed))?,
        1
    );
    assert_eq!(fx.trigger.received().len(), 2);
    Ok(())
}

#[tokio::test]
async fn sources_are_discovered_recursively_in_path_order() -> TestResult {
    let fx = TrackerFixture::new();
    let workflow = fx.workflow("align");
    let analysis = fx.analysis("cohort", content(""));

    fx.add_source("tree/z.toml", "n = 3");
    fx.add_source("tree/nested/deeper/b.toml", "n = 2");
    fx.add_source("tree/a.toml", "n = 1");
    fx.add_source("tree/nested/c.json", r#"{"n": 4}"#);

    let report = fx
        .launcher()
        .launch(&request(&workflow, &analysis, "tree"))
        .await?;

    let sources: Vec<PathBuf> = report.outcomes.iter().map(|o| o.source.clone()).collect();
    assert_eq!(
        sources,
        vec![
            PathBuf::from("tree/a.toml"),
            PathBuf::from("tree/nested/c.json"),
            PathBuf::from("tree/nested/deeper/b.toml"),
            PathBuf::from("tree/z.toml"),
        ]
    );
    assert_eq!(report.succeeded(), 4);
    Ok(())
}

#[tokio::test]
async fn derived_ids_reuse_configs_across_batches() -> TestResult {
    let fx = TrackerFixture::new();
    let workflow = fx.workflow("align");
    let analysis = fx.analysis("cohort", content(""));

    fx.add_source("first/params.toml", "threads = 1");
    fx.add_source("second/params.toml", "threads = 2");

    let mut req = request(&workflow, &analysis, "first");
    req.id_policy = IdPolicy::DerivedFromName;
    let first = fx.launcher().launch(&req).await?;

    req.config_dir = PathBuf::from("second");
    let second = fx.launcher().launch(&req).await?;

    let run_a = fx
        .tracker
        .runs
        .get_run(first.outcomes[0].analysis_run_id.as_deref().unwrap())?;
    let run_b = fx
        .tracker
        .runs
        .get_run(second.outcomes[0].analysis_run_id.as_deref().unwrap())?;

    assert_ne!(run_a.analysis_run_id, run_b.analysis_run_id);
    assert_eq!(run_a.config_id, run_b.config_id);

    // Last write wins for the shared configuration record.
    let shared = fx.tracker.configurations.get(&run_a.config_id)?;
    assert_eq!(shared.content["threads"].as_integer(), Some(2));
    Ok(())
}

#[tokio::test]
async fn unknown_workflow_fails_whole_launch() {
    let fx = TrackerFixture::new();
    let workflow = fx.workflow("align");
    let analysis = fx.analysis("cohort", content(""));
    fx.add_source("batch/run.toml", "threads = 1");

    let mut req = request(&workflow, &analysis, "batch");
    req.workflow_id = "ghost".to_string();

    let err = fx.launcher().launch(&req).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(fx.trigger.received().is_empty());
}

#[tokio::test]
async fn missing_directory_is_invalid_input() {
    let fx = TrackerFixture::new();
    let workflow = fx.workflow("align");
    let analysis = fx.analysis("cohort", content(""));
    fx.add_source("not_a_dir.toml", "threads = 1");

    for dir in ["does/not/exist", "not_a_dir.toml"] {
        let err = fx
            .launcher()
            .launch(&request(&workflow, &analysis, dir))
            .await
            .unwrap_err();
        assert!(
            matches!(err, TrackerError::InvalidInput(_)),
            "expected InvalidInput for {dir}, got {err:?}"
        );
    }
}

#[tokio::test]
async fn empty_directory_launches_nothing() -> TestResult {
    let fx = TrackerFixture::new();
    let workflow = fx.workflow("align");
    let analysis = fx.analysis("cohort", content(""));
    fx.fs.add_dir("empty");

    let report = fx
        .launcher()
        .launch(&request(&workflow, &analysis, "empty"))
        .await?;

    assert!(report.outcomes.is_empty());
    assert_eq!(fx.tracker.runs.count_by_status(&analysis.analysis_id, None)?, 0);
    Ok(())
}

#[tokio::test]
async fn symlinked_directory_does_not_launch_a_source_twice() -> TestResult {
    let fx = TrackerFixture::new();
    let workflow = fx.workflow("align");
    let analysis = fx.analysis("A1", content(""));

    fx.add_source("batch/a.toml", "threads = 8");
    fx.fs.add_symlink("batch/loop", "batch");

    let report = with_timeout(fx.launcher().launch(&request(&workflow, &analysis, "batch"))).await?;

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].source, PathBuf::from("batch/a.toml"));
    assert_eq!(fx.trigger.received().len(), 1);
    assert_eq!(fx.tracker.runs.count_by_status(&analysis.analysis_id, None)?, 1);
    Ok(())
}

/// Run store that accepts new runs but refuses every status update.
#[derive(Default)]
struct FrozenRuns {
    inner: MemoryStore<AnalysisRun>,
}

impl RecordStore<AnalysisRun> for FrozenRuns {
    fn load(&self, key: &str) -> TrackerResult<Option<AnalysisRun>> {
        self.inner.load(key)
    }

    fn save(&self, _record: &AnalysisRun) -> TrackerResult<()> {
        Err(TrackerError::InvalidInput("run store is read-only".to_string()))
    }

    fn insert_new(&self, record: &AnalysisRun) -> TrackerResult<bool> {
        self.inner.insert_new(record)
    }

    fn list(&self) -> TrackerResult<Vec<AnalysisRun>> {
        self.inner.list()
    }
}

#[tokio::test]
async fn run_created_before_scheduling_fails_is_still_reported() -> TestResult {
    let tracker = Tracker::new(Backends {
        runs: Arc::new(FrozenRuns::default()),
        ..Backends::in_memory()
    });
    let workflow_config = tracker.configurations.create(content(""))?;
    let workflow = tracker
        .registry
        .create_workflow("align", "1.0", &workflow_config.config_id)?;
    let analysis_config = tracker.configurations.create(content("threads = 4"))?;
    let analysis = tracker
        .registry
        .create_analysis("A1", None, &analysis_config.config_id)?;

    let fs = MockFileSystem::new();
    fs.add_file("batch/a.toml", "threads = 8");
    let trigger = Arc::new(FakeTrigger::new());
    let launcher = tracker.launcher(Arc::new(fs), trigger.clone());

    let report = with_timeout(launcher.launch(&request(&workflow, &analysis, "batch"))).await?;

    assert_eq!(report.failed(), 1);
    let outcome = &report.outcomes[0];
    let run_id = outcome
        .analysis_run_id
        .clone()
        .expect("the created run is reported even though scheduling failed");
    assert_eq!(tracker.runs.get_run(&run_id)?.status, RunStatus::Created);
    assert!(trigger.received().is_empty());
    Ok(())
}

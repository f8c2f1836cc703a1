//! End-to-end pipeline runs against the in-process mock server

use std::sync::Arc;

use cv_lifecycle::console::MemoryConsole;
use cv_lifecycle::mock::{environment, version, Endpoint, MockServer, TaskStep, MOCK_BASE_URL};
use cv_lifecycle::{
    ExitCode, KatelloClient, LifecyclePipeline, Mode, PipelineConfig, PipelineError, PipelineReport,
    PollingConfig, RecordingSleeper, Stage,
};

struct Run {
    result: Result<PipelineReport, PipelineError>,
    console: MemoryConsole,
}

fn run(server: &MockServer, mode: Mode) -> Run {
    let client = KatelloClient::new(Arc::new(server.clone()), MOCK_BASE_URL);
    let console = MemoryConsole::new();
    let sleeper = RecordingSleeper::new();
    let config = PipelineConfig {
        polling: PollingConfig::immediate(),
        ..Default::default()
    };
    let result = LifecyclePipeline::new(&client, &console, &sleeper, config).run(mode);
    Run { result, console }
}

#[test]
fn independent_view_is_published_and_awaited() {
    let server = MockServer::new();
    server.add_view(2, "Prod-CV", false, &[]);

    let run = run(&server, Mode::FullUpdate);
    let report = run.result.unwrap();

    assert_eq!(report.published, 1);
    assert!(!report.has_failures());
    assert_eq!(server.calls_to(Endpoint::Publish).len(), 1);
    assert_eq!(server.task_polls("T1"), 2);
    assert!(run.console.has_persistent("Updating content view 'Prod-CV' (id:2)"));
    assert!(run.console.has_persistent("Task update 'Prod-CV' finished."));
    assert!(run.console.has_persistent("Update done."));
}

#[test]
fn composite_view_is_promoted_into_each_environment() {
    let server = MockServer::new();
    server.add_view(9, "Prod-Composite", true, &[(2, "Dev"), (3, "QA")]);

    let run = run(&server, Mode::CleanupOnly);
    let report = run.result.unwrap();

    assert_eq!(report.published, 1);
    assert_eq!(report.promoted, 2);

    let promotions = server.calls_to(Endpoint::Promote);
    assert_eq!(promotions.len(), 2);
    let mut targets: Vec<u64> = promotions
        .iter()
        .filter_map(|c| c.params["environment_ids"][0].as_u64())
        .collect();
    targets.sort_unstable();
    assert_eq!(targets, vec![2, 3]);

    // publish T1, promotions T2 and T3, each polled to completion
    for task in ["T1", "T2", "T3"] {
        assert_eq!(server.task_polls(task), 2, "{task}");
    }

    let newest = &server.versions_of(9)[0];
    assert_eq!(newest.id, 1000);
    let mut labels: Vec<&str> = newest.environments.iter().map(|e| e.label.as_str()).collect();
    labels.sort_unstable();
    assert_eq!(labels, vec!["Dev", "Library", "QA"]);

    let finished = run
        .console
        .persistent_lines()
        .iter()
        .filter(|l| l.contains("Task promote 'Prod-Composite' finished."))
        .count();
    assert_eq!(finished, 2);
}

#[test]
fn rejected_publish_does_not_stop_other_views() {
    let server = MockServer::new();
    server.add_view(2, "Alpha", false, &[]);
    server.add_view(3, "Beta", false, &[]);
    server.reject_publish(2);

    let run = run(&server, Mode::FullUpdate);
    let report = run.result.unwrap();

    assert_eq!(report.published, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].view_name, "Alpha");
    assert_eq!(report.failures[0].stage, Stage::Publish);
    assert!(report.failures[0].reason.contains("already in progress"));
    assert!(run
        .console
        .has_persistent("Failed to update non-composite content view 'Alpha' (id:2)!"));
    assert_eq!(server.calls_to(Endpoint::Publish).len(), 2);
}

#[test]
fn rejected_composite_publish_skips_promotion_and_cleanup() {
    let server = MockServer::new();
    server.add_view(9, "Prod-Composite", true, &[(2, "Dev")]);
    server.reject_publish(9);

    let run = run(&server, Mode::CleanupOnly);
    let report = run.result.unwrap();

    assert_eq!(report.published, 0);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stage, Stage::Publish);
    assert_eq!(report.failures[0].view_name, "Prod-Composite");
    assert!(run
        .console
        .has_persistent("Failed to update the content view 'Prod-Composite' (id:9)!"));
    assert!(server.calls_to(Endpoint::Promote).is_empty());
    assert!(server.calls_to(Endpoint::Versions).is_empty());
    assert!(run.console.has_persistent("Update done."));
}

#[test]
fn rejected_promotion_still_cleans_up() {
    let server = MockServer::new();
    server.add_view(9, "Prod-Composite", true, &[(2, "Dev")]);
    server.reject_promotion(2);

    let run = run(&server, Mode::CleanupOnly);
    let report = run.result.unwrap();

    assert_eq!(report.promoted, 0);
    assert_eq!(report.failures[0].stage, Stage::Promote);
    assert!(run.console.has_persistent("Failed to promote content view 'Prod-Composite'"));
    assert_eq!(server.calls_to(Endpoint::Versions).len(), 1);
}

#[test]
fn cleanup_only_skips_independent_publish_and_prunes() {
    let server = MockServer::new();
    let library = environment(1, "Library");
    let qa = environment(5, "QA");
    server.add_view(2, "Prod-CV", false, &[(5, "QA")]);
    server.set_versions(
        2,
        vec![
            version(50, 5, &[library]),
            version(40, 4, &[]),
            version(30, 3, &[]),
            version(20, 2, &[]),
            version(10, 1, &[qa]),
        ],
    );

    let run = run(&server, Mode::CleanupOnly);
    let report = run.result.unwrap();

    assert!(server.calls_to(Endpoint::Publish).is_empty());
    assert_eq!(report.deleted, 1);
    assert_eq!(report.blocked.len(), 1);
    assert_eq!(report.blocked[0].version, "1.0");

    let remaining: Vec<u64> = server.versions_of(2).iter().map(|v| v.id).collect();
    assert_eq!(remaining, vec![50, 40, 30, 10]);

    assert!(run
        .console
        .has_persistent("Deleting 2 obsolete versions of content view 'Prod-CV'."));
    assert!(run.console.has_persistent(
        "Cannot delete the content view version 'Prod-CV' '1.0' (id:10)! Because it is part of the lifecycle environment."
    ));
}

#[test]
fn every_mutation_follows_a_queue_check() {
    let server = MockServer::new();
    server.add_view(2, "Prod-CV", false, &[]);
    server.add_view(9, "Prod-Composite", true, &[(3, "Dev"), (4, "QA")]);
    server.set_versions(2, (1..=6u64).rev().map(|n| version(n * 10, n as u32, &[])).collect());

    let run = run(&server, Mode::FullUpdate);
    let report = run.result.unwrap();
    assert!(report.deleted > 0);

    let calls = server.calls();
    let mut mutations = 0;
    for (i, call) in calls.iter().enumerate() {
        if !call.endpoint.is_some_and(|e| e.is_mutation()) {
            continue;
        }
        mutations += 1;
        assert!(i > 0);
        assert_eq!(
            calls[i - 1].endpoint,
            Some(Endpoint::TaskSearch),
            "{} {} was not gated",
            call.method,
            call.path
        );
    }
    // two publishes, two promotions, the deletions
    assert_eq!(mutations, 4 + report.deleted);

    // the run closes with one more queue check after the last deletion
    let last_mutation = calls
        .iter()
        .rposition(|c| c.endpoint.is_some_and(|e| e.is_mutation()))
        .unwrap();
    let tail: Vec<_> = calls[last_mutation + 1..].iter().map(|c| c.endpoint).collect();
    assert_eq!(tail, vec![Some(Endpoint::TaskSearch), Some(Endpoint::TaskSearch)]);
    assert_eq!(run.console.persistent_lines().last().map(String::as_str), Some("Update done."));
}

#[test]
fn paused_task_beyond_budget_is_fatal() {
    let server = MockServer::new();
    server.add_view(2, "Prod-CV", false, &[]);
    server.script_next_task(vec![TaskStep::paused(0.3)]);

    let run = run(&server, Mode::FullUpdate);
    let err = run.result.unwrap_err();

    assert_eq!(err.exit_code(), ExitCode::TaskStuck);
    assert_eq!(err.exit_code().code(), 3);
    assert_eq!(server.bulk_resumes(), vec![vec!["T1".to_string()]; 3]);
    assert!(run.console.has_persistent("Task update 'Prod-CV' failed 3 times."));
    assert!(run.console.has_persistent("Please review at"));
    assert!(!run.console.has_persistent("Update done."));
}

#[test]
fn unreachable_queue_is_fatal() {
    let server = MockServer::new();
    server.add_view(2, "Prod-CV", false, &[]);
    server.queue_running_counts([None, None, None, None, None]);

    let run = run(&server, Mode::FullUpdate);
    let err = run.result.unwrap_err();

    assert!(matches!(err, PipelineError::QueueUnreachable { failures: 5 }));
    assert_eq!(err.exit_code().code(), 1);
    assert!(run
        .console
        .has_persistent("CRITICAL: Could not get response from server exiting."));
    assert!(server.calls_to(Endpoint::Publish).is_empty());
}

//! Job resolution and execution through a bootstrapped engine.

use tokio_util::sync::CancellationToken;

use deckhand_core::ErrorKind;
use deckhand_hooks::Scope;

use crate::helpers::{MINIO_PLUGIN, TestApp};

#[tokio::test]
async fn test_init_runs_core_services_in_order() {
    let app = TestApp::new("");

    app.executor()
        .run_job("init", None, &[], &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(app.runner.services(), vec!["lms", "cms", "mysql"]);
    assert_eq!(
        app.runner.commands()[0],
        "sh -c 'echo lms init' --"
    );
}

#[tokio::test]
async fn test_plugin_prerequisite_runs_first() {
    let app = TestApp::new(MINIO_PLUGIN);

    app.executor()
        .run_job("init", None, &[], &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        app.runner.services(),
        vec!["minio", "lms", "cms", "mysql", "minio"]
    );
    assert_eq!(app.runner.commands()[0], "mc ready local");
    assert_eq!(app.runner.commands()[4], "mc mb openedx");
}

#[tokio::test]
async fn test_limit_keeps_only_scoped_tasks() {
    let app = TestApp::new(MINIO_PLUGIN);

    app.executor()
        .run_job("init", Some(&Scope::from_limit("minio")), &[], &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(app.runner.services(), vec!["minio", "minio"]);
}

#[tokio::test]
async fn test_extra_args_reach_every_task() {
    let app = TestApp::new("");
    let args = vec!["--staff".to_string(), "admin user".to_string()];

    app.executor()
        .run_job("createuser", None, &args, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        app.runner.commands(),
        vec!["sh -c 'echo lms createuser' -- --staff 'admin user'"]
    );
}

#[tokio::test]
async fn test_unknown_job_is_rejected() {
    let app = TestApp::new("");

    let err = app
        .executor()
        .run_job("reticulate", None, &[], &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(err.is(ErrorKind::Configuration));
    assert!(app.runner.services().is_empty());
}

#[tokio::test]
async fn test_unknown_job_ignored_when_configured() {
    let app = TestApp::new("[jobs]\nunknown_job = \"ignore\"\n");

    app.executor()
        .run_job("reticulate", None, &[], &CancellationToken::new())
        .await
        .unwrap();

    assert!(app.runner.services().is_empty());
}

#[test]
fn test_explain_shows_rendered_commands() {
    let app = TestApp::new("");

    let tasks = app
        .executor()
        .explain("settheme", None, &["dark".to_string()])
        .unwrap();

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].service, "lms");
    assert_eq!(tasks[0].command, "sh -c 'echo lms settheme' -- dark");
}

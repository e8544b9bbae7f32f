//! Plugin install, load and disable through a bootstrapped engine.

use deckhand_hooks::{Filters, HookKind, Scope};

use crate::helpers::{MINIO_PLUGIN, TestApp};

#[test]
fn test_declared_plugin_is_loaded() {
    let app = TestApp::new(MINIO_PLUGIN);
    let plugins = app.engine.plugins().list().unwrap();

    assert_eq!(plugins.len(), 1);
    assert_eq!(plugins[0].name, "minio");
    assert_eq!(plugins[0].version, "1.2.0");
    assert!(plugins[0].loaded);
}

#[test]
fn test_declared_but_not_enabled_plugin_contributes_nothing() {
    let app = TestApp::new(&MINIO_PLUGIN.replace("enabled = [\"minio\"]", "enabled = []"));

    assert!(!app.engine.plugins().is_loaded("minio").unwrap());
    assert!(!app.engine.catalog().is_declared("bucket").unwrap());
    assert_eq!(app.engine.plugins().installed().unwrap(), vec!["minio"]);
}

#[test]
fn test_plugin_jobs_are_listed() {
    let app = TestApp::new(MINIO_PLUGIN);
    let jobs = app.engine.catalog().list_jobs().unwrap();

    let bucket = jobs.iter().find(|job| job.name == "bucket").unwrap();
    assert_eq!(bucket.help, "Create the storage bucket");
}

#[test]
fn test_disable_removes_plugin_contributions() {
    let app = TestApp::new(MINIO_PLUGIN);
    let registry = app.engine.registry();

    let removed = app.engine.plugins().disable("minio");
    assert!(removed > 0);

    assert!(!app.engine.catalog().is_declared("bucket").unwrap());
    assert!(!app.engine.plugins().is_loaded("minio").unwrap());
    assert_eq!(app.engine.plugins().installed().unwrap(), vec!["minio"]);
    assert!(registry.has_callbacks(HookKind::Filter, Filters::PLUGINS_INSTALLED.name()));
    assert!(
        app.engine
            .catalog()
            .tasks("init", Some(&Scope::plugin("minio")))
            .unwrap()
            .is_empty()
    );
}

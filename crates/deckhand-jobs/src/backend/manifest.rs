//! Cluster job manifest patching.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use deckhand_core::error::AppError;
use deckhand_core::AppResult;

/// Label carrying the unique job name; also used as the apply selector.
pub const NAME_LABEL: &str = "app.kubernetes.io/name";

/// Values written into a job manifest before submission.
#[derive(Debug, Clone)]
pub struct JobPatch<'a> {
    /// Unique job name, `<service>-job-<timestamp>`.
    pub job_name: &'a str,
    /// Shell command to run.
    pub command: &'a str,
    /// Pod retries before the job is marked failed.
    pub backoff_limit: u32,
    /// Seconds a finished job is retained.
    pub ttl_seconds_after_finished: u64,
}

/// Selects the `<service>-job` document of a multi-document manifest and
/// patches it for one run.
///
/// The first container gets the command as its argument vector, run through
/// `sh -e -c`. When the manifest clears the entrypoint with `command: []`,
/// the shell becomes the entrypoint and the command its only argument.
pub fn patch_job_manifest(source: &str, service: &str, patch: &JobPatch<'_>) -> AppResult<String> {
    let template_name = format!("{service}-job");
    let mut job = find_document(source, &template_name)?;

    let metadata = child_mapping(&mut job, "metadata")?;
    metadata.insert(Value::from("name"), Value::from(patch.job_name));
    let labels = entry_mapping(metadata, "labels")?;
    labels.insert(Value::from(NAME_LABEL), Value::from(patch.job_name));

    let spec = child_mapping(&mut job, "spec")?;
    spec.insert(Value::from("backoffLimit"), Value::from(patch.backoff_limit));
    spec.insert(
        Value::from("ttlSecondsAfterFinished"),
        Value::from(patch.ttl_seconds_after_finished),
    );

    let container = job
        .get_mut("spec")
        .and_then(|s| s.get_mut("template"))
        .and_then(|t| t.get_mut("spec"))
        .and_then(|s| s.get_mut("containers"))
        .and_then(|c| c.get_mut(0))
        .and_then(Value::as_mapping_mut)
        .ok_or_else(|| {
            AppError::configuration(format!(
                "Job manifest '{template_name}' has no container at spec.template.spec.containers[0]"
            ))
        })?;

    let entrypoint_cleared = container
        .get("command")
        .and_then(Value::as_sequence)
        .is_some_and(|c| c.is_empty());

    let shell = ["sh", "-e", "-c"].map(Value::from);
    if entrypoint_cleared {
        container.insert(Value::from("command"), Value::Sequence(shell.to_vec()));
        container.insert(
            Value::from("args"),
            Value::Sequence(vec![Value::from(patch.command)]),
        );
    } else {
        let mut args = shell.to_vec();
        args.push(Value::from(patch.command));
        container.insert(Value::from("args"), Value::Sequence(args));
    }

    Ok(serde_yaml::to_string(&job)?)
}

fn find_document(source: &str, name: &str) -> AppResult<Value> {
    for document in serde_yaml::Deserializer::from_str(source) {
        let value = Value::deserialize(document)?;
        let matches = value
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            == Some(name);
        if matches {
            return Ok(value);
        }
    }
    Err(AppError::configuration(format!(
        "Job manifest '{name}' not found in rendered manifests"
    )))
}

fn child_mapping<'a>(parent: &'a mut Value, key: &str) -> AppResult<&'a mut Mapping> {
    let parent = parent
        .as_mapping_mut()
        .ok_or_else(|| AppError::configuration("Job manifest is not a mapping"))?;
    entry_mapping(parent, key)
}

fn entry_mapping<'a>(parent: &'a mut Mapping, key: &str) -> AppResult<&'a mut Mapping> {
    let entry = parent
        .entry(Value::from(key))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    if entry.is_null() {
        *entry = Value::Mapping(Mapping::new());
    }
    entry
        .as_mapping_mut()
        .ok_or_else(|| AppError::configuration(format!("Job manifest field '{key}' is not a mapping")))
}

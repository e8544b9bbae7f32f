//! Task rendering — turning task specs into shell command strings.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use deckhand_core::error::{AppError, ErrorKind};
use deckhand_core::types::TaskSpec;
use deckhand_core::AppResult;

/// Renders templates addressed by path segments.
pub trait TaskRenderer: Send + Sync + std::fmt::Debug {
    /// Returns the rendered content of the template at `path`.
    fn render(&self, path: &[String]) -> AppResult<String>;
}

/// Reads pre-rendered templates from the project environment directory.
#[derive(Debug, Clone)]
pub struct EnvRenderer {
    /// Environment root, e.g. `./env`.
    root: PathBuf,
}

impl EnvRenderer {
    /// Creates a renderer reading below `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the environment root.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TaskRenderer for EnvRenderer {
    fn render(&self, path: &[String]) -> AppResult<String> {
        let file = path.iter().fold(self.root.clone(), |acc, segment| acc.join(segment));
        let bytes = std::fs::read(&file).map_err(|e| {
            AppError::with_source(
                ErrorKind::Template,
                format!("Template '{}' could not be read", file.display()),
                e,
            )
        })?;
        let text = String::from_utf8(bytes).map_err(|e| {
            AppError::with_source(
                ErrorKind::Template,
                format!("Template '{}' is not valid UTF-8", file.display()),
                e,
            )
        })?;
        Ok(text.trim().to_string())
    }
}

/// Quotes one argument for a POSIX shell.
///
/// Arguments made only of safe characters are returned as-is; anything else
/// is wrapped in single quotes.
pub fn shell_quote(arg: &str) -> Cow<'_, str> {
    let safe = |c: char| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c);
    if !arg.is_empty() && arg.chars().all(safe) {
        Cow::Borrowed(arg)
    } else {
        Cow::Owned(format!("'{}'", arg.replace('\'', r#"'"'"'"#)))
    }
}

/// Joins arguments into one shell-quoted command line.
pub fn shell_join<'a, I>(args: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    args.into_iter()
        .map(shell_quote)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the command line for a task.
///
/// A template renders to a script run as `sh -c <script> -- <args...>`, so
/// extra arguments become the script's positional parameters. A literal
/// argument vector gets the extra arguments appended.
pub fn task_command(
    renderer: &dyn TaskRenderer,
    spec: &TaskSpec,
    extra_args: &[String],
) -> AppResult<String> {
    match spec {
        TaskSpec::Template(path) => {
            let script = renderer.render(path)?;
            let argv = ["sh", "-c", script.as_str(), "--"]
                .into_iter()
                .chain(extra_args.iter().map(String::as_str));
            Ok(shell_join(argv))
        }
        TaskSpec::Command(argv) => Ok(shell_join(
            argv.iter().chain(extra_args.iter()).map(String::as_str),
        )),
    }
}

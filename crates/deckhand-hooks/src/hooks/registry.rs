//! Hook registry — callbacks registered by hook name with priority ordering
//! and scope tags.

use std::any::Any;
use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, error, info};

use deckhand_core::error::{AppError, ErrorKind};

use super::definitions::{HookKind, HookName, Priority};
use crate::context::{ContextGuard, ContextStack};
use crate::scope::Scope;

/// Type-erased callback. Typed handles downcast it back at call time.
pub(crate) type ErasedCallback = Arc<dyn Any + Send + Sync>;

/// A single callback registration.
#[derive(Clone)]
pub struct Registration {
    /// Scopes active when the callback was registered.
    scopes: Arc<BTreeSet<Scope>>,
    /// Ordering key (lower = earlier execution).
    priority: Priority,
    /// Human-readable callback identity used in diagnostics.
    label: Arc<str>,
    callback: ErasedCallback,
}

impl Registration {
    /// Returns the scopes captured at registration time.
    pub fn scopes(&self) -> &BTreeSet<Scope> {
        &self.scopes
    }

    /// Returns the priority.
    pub fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the callback label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns whether this registration is selected by `scope`.
    ///
    /// `None` selects every registration.
    pub fn matches(&self, scope: Option<&Scope>) -> bool {
        scope.is_none_or(|s| self.scopes.contains(s))
    }

    pub(crate) fn callback(&self) -> &(dyn Any + Send + Sync) {
        self.callback.as_ref()
    }

    /// Comma-separated scope list for diagnostics.
    pub(crate) fn scopes_display(&self) -> String {
        self.scopes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("scopes", &self.scopes)
            .field("priority", &self.priority)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Registry of action and filter callbacks organized by hook kind and name.
///
/// Actions and filters live in separate namespaces. The registry also owns the [`ContextStack`]; every registration is tagged
/// with the scopes active at that moment.
#[derive(Debug, Default)]
pub struct HookRegistry {
    /// (kind, name) → callbacks in execution order.
    hooks: DashMap<(HookKind, HookName), Vec<Registration>>,
    /// Scopes applied to new registrations.
    contexts: ContextStack,
}

impl HookRegistry {
    /// Creates a new empty hook registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes scopes onto the context stack until the guard is dropped.
    pub fn enter<I>(&self, scopes: I) -> ContextGuard<'_>
    where
        I: IntoIterator<Item = Scope>,
    {
        self.contexts.enter(scopes)
    }

    /// Returns the scopes that new registrations would be tagged with.
    pub fn current_scopes(&self) -> BTreeSet<Scope> {
        self.contexts.current()
    }

    /// Inserts a callback after every existing entry of lower or equal
    /// priority, so equal priorities keep registration order.
    pub(crate) fn register(
        &self,
        kind: HookKind,
        name: &HookName,
        label: String,
        priority: Priority,
        callback: ErasedCallback,
    ) {
        let registration = Registration {
            scopes: Arc::new(self.contexts.current()),
            priority,
            label: Arc::from(label),
            callback,
        };

        debug!(
            kind = %kind,
            hook = %name,
            callback = %registration.label,
            priority = %priority,
            scopes = %registration.scopes_display(),
            "Hook callback registered"
        );

        let mut entries = self.hooks.entry((kind, name.clone())).or_default();
        let position = entries
            .iter()
            .position(|existing| existing.priority > priority)
            .unwrap_or(entries.len());
        entries.insert(position, registration);
    }

    /// Returns a snapshot of the callbacks selected by `scope`, in
    /// execution order.
    ///
    /// The snapshot is detached from the registry so callbacks may register
    /// or clear hooks while they run.
    pub fn callbacks(
        &self,
        kind: HookKind,
        name: &HookName,
        scope: Option<&Scope>,
    ) -> Vec<Registration> {
        self.hooks
            .get(&(kind, name.clone()))
            .map(|entries| {
                entries
                    .iter()
                    .filter(|r| r.matches(scope))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the number of callbacks selected by `scope` on a hook.
    pub fn callback_count(&self, kind: HookKind, name: &HookName, scope: Option<&Scope>) -> usize {
        self.hooks
            .get(&(kind, name.clone()))
            .map(|entries| entries.iter().filter(|r| r.matches(scope)).count())
            .unwrap_or(0)
    }

    /// Returns whether any callbacks are registered on a hook.
    pub fn has_callbacks(&self, kind: HookKind, name: &HookName) -> bool {
        self.callback_count(kind, name, None) > 0
    }

    /// Removes the callbacks of one hook selected by `scope`.
    ///
    /// Returns the number of removed callbacks.
    pub fn clear(&self, kind: HookKind, name: &HookName, scope: Option<&Scope>) -> usize {
        let key = (kind, name.clone());
        let removed = match self.hooks.get_mut(&key) {
            Some(mut entries) => {
                let before = entries.len();
                entries.retain(|r| !r.matches(scope));
                before - entries.len()
            }
            None => 0,
        };
        self.hooks.remove_if(&key, |_, entries| entries.is_empty());

        if removed > 0 {
            debug!(kind = %kind, hook = %name, removed, "Hook callbacks cleared");
        }
        removed
    }

    /// Removes the callbacks selected by `scope` from every hook.
    ///
    /// Returns the number of removed callbacks.
    pub fn clear_all(&self, scope: Option<&Scope>) -> usize {
        let mut removed = 0;
        for mut entries in self.hooks.iter_mut() {
            let before = entries.len();
            entries.retain(|r| !r.matches(scope));
            removed += before - entries.len();
        }
        self.hooks.retain(|_, entries| !entries.is_empty());

        info!(
            scope = %scope.map(ToString::to_string).unwrap_or_else(|| "*".to_string()),
            removed,
            "Hook callbacks cleared"
        );
        removed
    }

    /// Returns every (kind, name) pair with at least one callback, sorted.
    pub fn registered_hooks(&self) -> Vec<(HookKind, HookName)> {
        let mut hooks: Vec<(HookKind, HookName)> =
            self.hooks.iter().map(|e| e.key().clone()).collect();
        hooks.sort();
        hooks
    }
}

/// Wraps a callback failure with the hook name, callback label and scopes.
pub(crate) fn callback_error(
    kind: &str,
    name: &HookName,
    registration: &Registration,
    err: AppError,
) -> AppError {
    let message = format!(
        "Error applying {kind} '{name}': callback={} scopes=[{}]",
        registration.label(),
        registration.scopes_display()
    );
    error!(hook = %name, callback = %registration.label(), error = %err, "{message}");
    AppError::with_source(ErrorKind::Registration, message, err)
}

/// Error for a callback registered with a different payload type.
pub(crate) fn type_mismatch(
    name: &HookName,
    registration: &Registration,
    expected: &str,
) -> AppError {
    AppError::registration(format!(
        "Hook '{name}' callback '{}' does not accept payload type {expected}",
        registration.label()
    ))
}

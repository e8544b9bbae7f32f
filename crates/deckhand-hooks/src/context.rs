//! Context stack — the scopes active while registrations are made.

use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::scope::Scope;

/// Ordered stack of active scope tags.
///
/// Every registration snapshots the scopes on this stack at creation time.
/// Entering returns a [`ContextGuard`]; dropping the guard pops exactly the
/// scopes that were pushed, so nesting unwinds in reverse order even on early
/// return or error propagation.
///
/// The stack is shared by every caller of a registry. Declaration is expected
/// to happen from one task at a time.
#[derive(Debug, Default)]
pub struct ContextStack {
    /// Active scopes, innermost last.
    stack: Mutex<Vec<Scope>>,
}

impl ContextStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes scopes until the returned guard is dropped.
    pub fn enter<I>(&self, scopes: I) -> ContextGuard<'_>
    where
        I: IntoIterator<Item = Scope>,
    {
        let mut stack = self.lock();
        let depth = stack.len();
        stack.extend(scopes);
        ContextGuard { owner: self, depth }
    }

    /// Returns a snapshot of the active scopes.
    pub fn current(&self) -> BTreeSet<Scope> {
        self.lock().iter().cloned().collect()
    }

    /// Returns the number of scopes currently pushed.
    pub fn depth(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Scope>> {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the scopes pushed by [`ContextStack::enter`] when dropped.
#[must_use = "scopes are popped as soon as the guard is dropped"]
#[derive(Debug)]
pub struct ContextGuard<'a> {
    owner: &'a ContextStack,
    depth: usize,
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.owner.lock().truncate(self.depth);
    }
}

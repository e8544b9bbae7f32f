//! Actions — broadcast hooks whose callbacks run for their side effects.

use std::any::type_name;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use deckhand_core::AppResult;

use super::definitions::{HookKind, HookName, Priority};
use super::registry::{HookRegistry, callback_error, type_mismatch};
use crate::scope::Scope;

type ActionFn<A> = dyn Fn(&A) -> AppResult<()> + Send + Sync;

/// Boxed action callback stored in the registry.
pub(crate) struct ActionCallback<A: 'static>(Box<ActionFn<A>>);

/// Typed handle to a named action hook carrying a payload of type `A`.
///
/// The handle itself holds no callbacks; they live in a [`HookRegistry`].
pub struct Action<A: 'static = ()> {
    name: HookName,
    _payload: PhantomData<fn(&A)>,
}

impl<A: 'static> Action<A> {
    /// Declares an action with a static name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: HookName::from_static(name),
            _payload: PhantomData,
        }
    }

    /// Declares an action whose name is computed at runtime.
    pub fn dynamic(name: impl Into<String>) -> Self {
        Self {
            name: HookName::new(name),
            _payload: PhantomData,
        }
    }

    /// Returns the hook name.
    pub fn name(&self) -> &HookName {
        &self.name
    }

    /// Registers a callback at default priority.
    pub fn add<F>(&self, registry: &HookRegistry, callback: F)
    where
        F: Fn(&A) -> AppResult<()> + Send + Sync + 'static,
    {
        self.add_with_priority(registry, Priority::DEFAULT, callback);
    }

    /// Registers a callback at the given priority.
    pub fn add_with_priority<F>(&self, registry: &HookRegistry, priority: Priority, callback: F)
    where
        F: Fn(&A) -> AppResult<()> + Send + Sync + 'static,
    {
        self.add_named(registry, type_name::<F>(), priority, callback);
    }

    /// Registers a callback with an explicit diagnostic label.
    pub fn add_named<F>(
        &self,
        registry: &HookRegistry,
        label: impl Into<String>,
        priority: Priority,
        callback: F,
    ) where
        F: Fn(&A) -> AppResult<()> + Send + Sync + 'static,
    {
        let callback: ActionCallback<A> = ActionCallback(Box::new(callback));
        registry.register(
            HookKind::Action,
            &self.name,
            label.into(),
            priority,
            Arc::new(callback),
        );
    }

    /// Runs every callback selected by `scope` in priority order.
    ///
    /// The first failing callback aborts the broadcast; its error is wrapped
    /// with the hook name, callback label and scopes.
    pub fn fire(&self, registry: &HookRegistry, args: &A, scope: Option<&Scope>) -> AppResult<()> {
        let registrations = registry.callbacks(HookKind::Action, &self.name, scope);
        trace!(hook = %self.name, callbacks = registrations.len(), "Firing action");

        for registration in &registrations {
            let callback = registration
                .callback()
                .downcast_ref::<ActionCallback<A>>()
                .ok_or_else(|| type_mismatch(&self.name, registration, type_name::<A>()))?;

            (callback.0)(args).map_err(|e| callback_error("action", &self.name, registration, e))?;
        }
        Ok(())
    }

    /// Removes callbacks selected by `scope`.
    pub fn clear(&self, registry: &HookRegistry, scope: Option<&Scope>) -> usize {
        registry.clear(HookKind::Action, &self.name, scope)
    }
}

impl<A: 'static> Clone for Action<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _payload: PhantomData,
        }
    }
}

impl<A: 'static> std::fmt::Debug for Action<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("payload", &type_name::<A>())
            .finish()
    }
}

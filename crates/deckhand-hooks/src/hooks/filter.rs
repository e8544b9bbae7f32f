//! Filters — hooks that thread a value through an ordered pipeline of
//! callbacks.

use std::any::type_name;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use deckhand_core::AppResult;

use super::definitions::{HookKind, HookName, Priority};
use super::registry::{HookRegistry, callback_error, type_mismatch};
use crate::scope::Scope;

type FilterFn<T, A> = dyn Fn(T, &A) -> AppResult<T> + Send + Sync;

/// Boxed filter callback stored in the registry.
pub(crate) struct FilterCallback<T: 'static, A: 'static>(Box<FilterFn<T, A>>);

/// Typed handle to a named filter hook.
///
/// `T` is the value threaded through the callbacks and `A` the extra
/// read-only arguments every callback receives.
pub struct Filter<T: 'static, A: 'static = ()> {
    name: HookName,
    _types: PhantomData<fn(T, &A) -> T>,
}

impl<T: 'static, A: 'static> Filter<T, A> {
    /// Declares a filter with a static name.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: HookName::from_static(name),
            _types: PhantomData,
        }
    }

    /// Declares a filter whose name is computed at runtime.
    pub fn dynamic(name: impl Into<String>) -> Self {
        Self {
            name: HookName::new(name),
            _types: PhantomData,
        }
    }

    /// Returns the hook name.
    pub fn name(&self) -> &HookName {
        &self.name
    }

    /// Registers a callback at default priority.
    pub fn add<F>(&self, registry: &HookRegistry, callback: F)
    where
        F: Fn(T, &A) -> AppResult<T> + Send + Sync + 'static,
    {
        self.add_with_priority(registry, Priority::DEFAULT, callback);
    }

    /// Registers a callback at the given priority.
    pub fn add_with_priority<F>(&self, registry: &HookRegistry, priority: Priority, callback: F)
    where
        F: Fn(T, &A) -> AppResult<T> + Send + Sync + 'static,
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
        F: Fn(T, &A) -> AppResult<T> + Send + Sync + 'static,
    {
        let callback: FilterCallback<T, A> = FilterCallback(Box::new(callback));
        registry.register(
            HookKind::Filter,
            &self.name,
            label.into(),
            priority,
            Arc::new(callback),
        );
    }

    /// Threads `value` through every callback selected by `scope`.
    ///
    /// Returns `value` unchanged when no callback is registered.
    pub fn apply(
        &self,
        registry: &HookRegistry,
        value: T,
        args: &A,
        scope: Option<&Scope>,
    ) -> AppResult<T> {
        let registrations = registry.callbacks(HookKind::Filter, &self.name, scope);
        trace!(hook = %self.name, callbacks = registrations.len(), "Applying filter");

        let mut value = value;
        for registration in &registrations {
            let callback = registration
                .callback()
                .downcast_ref::<FilterCallback<T, A>>()
                .ok_or_else(|| type_mismatch(&self.name, registration, type_name::<T>()))?;

            value = (callback.0)(value, args)
                .map_err(|e| callback_error("filter", &self.name, registration, e))?;
        }
        Ok(value)
    }

    /// Removes callbacks selected by `scope`.
    pub fn clear(&self, registry: &HookRegistry, scope: Option<&Scope>) -> usize {
        registry.clear(HookKind::Filter, &self.name, scope)
    }
}

impl<I, A> Filter<Vec<I>, A>
where
    I: Clone + Send + Sync + 'static,
    A: 'static,
{
    /// Registers a callback that appends one item to the list.
    pub fn add_item(&self, registry: &HookRegistry, item: I) {
        self.add_items(registry, vec![item]);
    }

    /// Registers a callback that appends several items to the list.
    pub fn add_items(&self, registry: &HookRegistry, items: Vec<I>) {
        self.add_named(
            registry,
            format!("{}::add_items", self.name),
            Priority::DEFAULT,
            move |mut list: Vec<I>, _args: &A| {
                list.extend(items.iter().cloned());
                Ok(list)
            },
        );
    }

    /// Applies the filter to an empty list and iterates the result.
    pub fn iterate_with(
        &self,
        registry: &HookRegistry,
        args: &A,
        scope: Option<&Scope>,
    ) -> AppResult<std::vec::IntoIter<I>> {
        Ok(self.apply(registry, Vec::new(), args, scope)?.into_iter())
    }
}

impl<I> Filter<Vec<I>>
where
    I: Clone + Send + Sync + 'static,
{
    /// Applies the filter to an empty list and iterates the result.
    pub fn iterate(
        &self,
        registry: &HookRegistry,
        scope: Option<&Scope>,
    ) -> AppResult<std::vec::IntoIter<I>> {
        self.iterate_with(registry, &(), scope)
    }
}

impl<T: 'static, A: 'static> Clone for Filter<T, A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _types: PhantomData,
        }
    }
}

impl<T: 'static, A: 'static> std::fmt::Debug for Filter<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Filter")
            .field("name", &self.name)
            .field("value", &type_name::<T>())
            .finish()
    }
}

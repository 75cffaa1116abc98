//! Device-dependent resource lifetimes.
//!
//! Two ownership models exist:
//!
//! - [`UniqueResource`]: belongs to one widget instance (a text format sized
//!   to its bounds, a brush recolored every frame). Rebuilt whenever that
//!   instance's surface is rebuilt.
//! - [`SharedResource`]: one value reused by every instance of a widget type
//!   (a focus-border brush). Releasing it is always safe; the next request
//!   recreates it.
//!
//! Shared resources are grouped per widget type into a [`SharedResourceSet`]
//! and stored in a [`SharedResourceRegistry`] keyed by the set's type.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::RenderResult;

/// A resource owned by a single widget instance.
#[derive(Debug)]
pub struct UniqueResource<T> {
    value: Option<T>,
    created: usize,
}

impl<T> Default for UniqueResource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> UniqueResource<T> {
    /// An empty slot.
    pub const fn new() -> Self {
        Self {
            value: None,
            created: 0,
        }
    }

    /// Return the resource, creating it first if the slot is empty.
    pub fn get_or_try_create<F>(&mut self, create: F) -> RenderResult<&mut T>
    where
        F: FnOnce() -> RenderResult<T>,
    {
        let value = match self.value.take() {
            Some(value) => value,
            None => {
                let value = create()?;
                self.created += 1;
                value
            }
        };
        Ok(self.value.insert(value))
    }

    /// The resource, if created.
    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Mutable access to the resource, if created.
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    /// Drop the resource. Returns whether anything was released.
    pub fn release(&mut self) -> bool {
        self.value.take().is_some()
    }

    /// Whether the resource currently exists.
    pub fn is_created(&self) -> bool {
        self.value.is_some()
    }

    /// How many times the resource has been created.
    pub fn creation_count(&self) -> usize {
        self.created
    }
}

/// A resource shared by every instance of a widget type.
#[derive(Debug)]
pub struct SharedResource<T> {
    slot: Mutex<Option<Arc<T>>>,
    created: AtomicUsize,
}

impl<T> Default for SharedResource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SharedResource<T> {
    /// An empty slot.
    pub const fn new() -> Self {
        Self {
            slot: parking_lot::const_mutex(None),
            created: AtomicUsize::new(0),
        }
    }

    /// Return the resource, creating it first if the slot is empty.
    pub fn get_or_try_create<F>(&self, create: F) -> RenderResult<Arc<T>>
    where
        F: FnOnce() -> RenderResult<T>,
    {
        let mut slot = self.slot.lock();
        if let Some(value) = slot.as_ref() {
            return Ok(value.clone());
        }
        let value = Arc::new(create()?);
        *slot = Some(value.clone());
        self.created.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    /// The resource, if created.
    pub fn get(&self) -> Option<Arc<T>> {
        self.slot.lock().clone()
    }

    /// Drop the registry's reference. Returns whether anything was released.
    ///
    /// Instances still holding an `Arc` keep their copy alive until they
    /// rebuild.
    pub fn release(&self) -> bool {
        self.slot.lock().take().is_some()
    }

    /// Whether the resource currently exists.
    pub fn is_created(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// How many times the resource has been created.
    pub fn creation_count(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
}

/// The shared resources of one widget type.
pub trait SharedResourceSet: Send + Sync + 'static {
    /// Release every resource in the set.
    fn release(&self);
}

struct RegistryEntry {
    any: Arc<dyn Any + Send + Sync>,
    set: Arc<dyn SharedResourceSet>,
}

/// Per-type storage for [`SharedResourceSet`]s.
#[derive(Default)]
pub struct SharedResourceRegistry {
    sets: Mutex<HashMap<TypeId, RegistryEntry>>,
}

impl SharedResourceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The set for `S`, inserting an empty one on first use.
    pub fn get_or_insert<S>(&self) -> Arc<S>
    where
        S: SharedResourceSet + Default,
    {
        let mut sets = self.sets.lock();
        if let Some(entry) = sets.get(&TypeId::of::<S>())
            && let Ok(set) = Arc::downcast::<S>(entry.any.clone())
        {
            return set;
        }

        let set = Arc::new(S::default());
        sets.insert(
            TypeId::of::<S>(),
            RegistryEntry {
                any: set.clone(),
                set: set.clone(),
            },
        );
        set
    }

    /// Release the resources of `S`, if that set exists.
    pub fn release<S: SharedResourceSet>(&self) {
        let entry = self
            .sets
            .lock()
            .get(&TypeId::of::<S>())
            .map(|e| e.set.clone());
        if let Some(set) = entry {
            set.release();
            tracing::debug!(
                target: veneer_core::logging::targets::RENDER,
                set = std::any::type_name::<S>(),
                "shared resources released"
            );
        }
    }

    /// Release the resources of every set.
    pub fn release_all(&self) {
        let sets: Vec<_> = self.sets.lock().values().map(|e| e.set.clone()).collect();
        for set in &sets {
            set.release();
        }
        tracing::debug!(
            target: veneer_core::logging::targets::RENDER,
            count = sets.len(),
            "all shared resources released"
        );
    }

    /// Number of registered sets.
    pub fn len(&self) -> usize {
        self.sets.lock().len()
    }

    /// Whether no set has been registered.
    pub fn is_empty(&self) -> bool {
        self.sets.lock().is_empty()
    }
}

static_assertions::assert_impl_all!(SharedResourceRegistry: Send, Sync);
static_assertions::assert_impl_all!(SharedResource<crate::Brush>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderError;

    #[derive(Default)]
    struct ButtonSet {
        focus: SharedResource<u32>,
    }

    impl SharedResourceSet for ButtonSet {
        fn release(&self) {
            self.focus.release();
        }
    }

    #[derive(Default)]
    struct EditSet {
        fill: SharedResource<u32>,
    }

    impl SharedResourceSet for EditSet {
        fn release(&self) {
            self.fill.release();
        }
    }

    #[test]
    fn test_unique_resource_creates_once() {
        let mut res = UniqueResource::<u32>::new();
        assert!(!res.is_created());

        *res.get_or_try_create(|| Ok(1)).unwrap() += 1;
        assert_eq!(*res.get_or_try_create(|| Ok(100)).unwrap(), 2);
        assert_eq!(res.creation_count(), 1);

        assert!(res.release());
        assert!(!res.release());
        assert_eq!(*res.get_or_try_create(|| Ok(7)).unwrap(), 7);
        assert_eq!(res.creation_count(), 2);
    }

    #[test]
    fn test_unique_resource_failure_leaves_slot_empty() {
        let mut res = UniqueResource::<u32>::new();
        let err = res
            .get_or_try_create(|| Err(RenderError::RecreateTarget))
            .unwrap_err();
        assert_eq!(err, RenderError::RecreateTarget);
        assert!(!res.is_created());
        assert_eq!(res.creation_count(), 0);
    }

    #[test]
    fn test_shared_resource_is_reused_until_released() {
        let res = SharedResource::<u32>::new();
        let a = res.get_or_try_create(|| Ok(5)).unwrap();
        let b = res.get_or_try_create(|| Ok(6)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(res.creation_count(), 1);

        assert!(res.release());
        assert!(res.get().is_none());
        // Existing holders are unaffected.
        assert_eq!(*a, 5);

        let c = res.get_or_try_create(|| Ok(6)).unwrap();
        assert_eq!(*c, 6);
        assert_eq!(res.creation_count(), 2);
    }

    #[test]
    fn test_registry_keys_by_type() {
        let registry = SharedResourceRegistry::new();
        let buttons = registry.get_or_insert::<ButtonSet>();
        let again = registry.get_or_insert::<ButtonSet>();
        assert!(Arc::ptr_eq(&buttons, &again));

        let edits = registry.get_or_insert::<EditSet>();
        assert_eq!(registry.len(), 2);

        buttons.focus.get_or_try_create(|| Ok(1)).unwrap();
        edits.fill.get_or_try_create(|| Ok(2)).unwrap();

        registry.release::<ButtonSet>();
        assert!(!buttons.focus.is_created());
        assert!(edits.fill.is_created());

        registry.release_all();
        assert!(!edits.fill.is_created());
    }
}

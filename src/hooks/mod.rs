//! Typed, priority-ordered hook registry
//!
//! Optional features extend the core through named extension points. Each
//! point is declared once as a [`HookPoint`] carrying the handler signature,
//! so a handler with the wrong shape is rejected when it is registered
//! rather than when the core calls it.
//!
//! The registry is mutable only while a [`Site`](crate::Site) is being
//! assembled. Afterwards it is moved into an `Arc` and only read.

mod points;

pub use points::*;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// Errors raised while wiring hooks together
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("hook '{name}' expects handlers of type {expected}, got {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// A named extension point whose handlers have the signature `F`.
///
/// `F` is normally an unsized `dyn Fn(..) + Send + Sync` type.
pub struct HookPoint<F: ?Sized> {
    name: &'static str,
    _signature: PhantomData<fn() -> Box<F>>,
}

impl<F: ?Sized> HookPoint<F> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _signature: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<F: ?Sized> Clone for HookPoint<F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<F: ?Sized> Copy for HookPoint<F> {}

impl<F: ?Sized> fmt::Debug for HookPoint<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HookPoint").field(&self.name).finish()
    }
}

struct Registered {
    priority: i32,
    /// Always an `Arc<F>` for the slot's signature `F`
    handler: Box<dyn Any + Send + Sync>,
}

struct Slot {
    signature: TypeId,
    signature_name: &'static str,
    handlers: Vec<Registered>,
}

impl Slot {
    fn new<F: ?Sized + 'static>() -> Self {
        Self {
            signature: TypeId::of::<Arc<F>>(),
            signature_name: std::any::type_name::<F>(),
            handlers: Vec::new(),
        }
    }

    fn accepts<F: ?Sized + 'static>(&self) -> bool {
        self.signature == TypeId::of::<Arc<F>>()
    }
}

/// Registry mapping extension point names to their handlers
#[derive(Default)]
pub struct HookRegistry {
    slots: HashMap<String, Slot>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an extension point without registering a handler.
    ///
    /// Fixes the signature for `point.name()` so later named registrations
    /// are checked against it.
    pub fn declare<F>(&mut self, point: HookPoint<F>) -> Result<(), HookError>
    where
        F: ?Sized + Send + Sync + 'static,
    {
        self.slot_for::<F>(point.name).map(|_| ())
    }

    /// Register a handler under a declared extension point
    pub fn register<F>(
        &mut self,
        point: HookPoint<F>,
        priority: i32,
        handler: Arc<F>,
    ) -> Result<(), HookError>
    where
        F: ?Sized + Send + Sync + 'static,
    {
        self.register_named(point.name, priority, handler)
    }

    /// Register several handlers sharing one priority, in order
    pub fn register_all<F, I>(
        &mut self,
        point: HookPoint<F>,
        priority: i32,
        handlers: I,
    ) -> Result<(), HookError>
    where
        F: ?Sized + Send + Sync + 'static,
        I: IntoIterator<Item = Arc<F>>,
    {
        for handler in handlers {
            self.register(point, priority, handler)?;
        }
        Ok(())
    }

    /// Register a handler under an arbitrary name.
    ///
    /// The first registration (or declaration) of a name fixes its
    /// signature; a handler of any other type is rejected.
    pub fn register_named<F>(
        &mut self,
        name: &str,
        priority: i32,
        handler: Arc<F>,
    ) -> Result<(), HookError>
    where
        F: ?Sized + Send + Sync + 'static,
    {
        let slot = self.slot_for::<F>(name)?;

        // Insert after every handler with a lower or equal priority so equal
        // priorities keep registration order.
        let position = slot
            .handlers
            .partition_point(|registered| registered.priority <= priority);
        slot.handlers.insert(
            position,
            Registered {
                priority,
                handler: Box::new(handler),
            },
        );

        tracing::debug!("Registered hook '{}' with priority {}", name, priority);
        Ok(())
    }

    /// All handlers for `point`, lowest priority first
    pub fn get<F>(&self, point: HookPoint<F>) -> Vec<Arc<F>>
    where
        F: ?Sized + Send + Sync + 'static,
    {
        match self.get_named(point.name) {
            Ok(handlers) => handlers,
            Err(e) => panic!("{e}"),
        }
    }

    /// All handlers registered under `name`, lowest priority first.
    ///
    /// Asking for a signature other than the one the name was registered
    /// with is a wiring bug and reported as [`HookError::TypeMismatch`].
    pub fn get_named<F>(&self, name: &str) -> Result<Vec<Arc<F>>, HookError>
    where
        F: ?Sized + Send + Sync + 'static,
    {
        let Some(slot) = self.slots.get(name) else {
            return Ok(Vec::new());
        };

        if !slot.accepts::<F>() {
            return Err(HookError::TypeMismatch {
                name: name.to_string(),
                expected: slot.signature_name,
                found: std::any::type_name::<F>(),
            });
        }

        Ok(slot
            .handlers
            .iter()
            .filter_map(|registered| registered.handler.downcast_ref::<Arc<F>>().cloned())
            .collect())
    }

    /// Priorities registered under `name`, in call order
    pub fn priorities(&self, name: &str) -> Vec<i32> {
        self.slots
            .get(name)
            .map(|slot| slot.handlers.iter().map(|h| h.priority).collect())
            .unwrap_or_default()
    }

    fn slot_for<F>(&mut self, name: &str) -> Result<&mut Slot, HookError>
    where
        F: ?Sized + Send + Sync + 'static,
    {
        let slot = self
            .slots
            .entry(name.to_string())
            .or_insert_with(Slot::new::<F>);

        if !slot.accepts::<F>() {
            return Err(HookError::TypeMismatch {
                name: name.to_string(),
                expected: slot.signature_name,
                found: std::any::type_name::<F>(),
            });
        }

        Ok(slot)
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, slot) in &self.slots {
            map.entry(name, &slot.handlers.len());
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type NumberFn = dyn Fn() -> i32 + Send + Sync;
    type TextFn = dyn Fn(&str) -> String + Send + Sync;

    const NUMBERS: HookPoint<NumberFn> = HookPoint::new("numbers");

    #[test]
    fn test_handlers_sorted_by_priority() {
        let mut registry = HookRegistry::new();
        registry.register(NUMBERS, 10, Arc::new(|| 10)).unwrap();
        registry.register(NUMBERS, -5, Arc::new(|| -5)).unwrap();

        let values: Vec<i32> = registry.get(NUMBERS).iter().map(|h| h()).collect();
        assert_eq!(values, vec![-5, 10]);
        assert_eq!(registry.priorities("numbers"), vec![-5, 10]);
    }

    #[test]
    fn test_equal_priorities_keep_registration_order() {
        let mut registry = HookRegistry::new();
        registry.register(NUMBERS, 0, Arc::new(|| 1)).unwrap();
        registry.register(NUMBERS, 0, Arc::new(|| 2)).unwrap();
        registry.register(NUMBERS, -1, Arc::new(|| 0)).unwrap();
        registry.register(NUMBERS, 0, Arc::new(|| 3)).unwrap();

        let values: Vec<i32> = registry.get(NUMBERS).iter().map(|h| h()).collect();
        assert_eq!(values, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_register_all_appends_in_order() {
        let mut registry = HookRegistry::new();
        let handlers: Vec<Arc<NumberFn>> = vec![Arc::new(|| 1), Arc::new(|| 2)];
        registry.register_all(NUMBERS, 5, handlers).unwrap();

        let values: Vec<i32> = registry.get(NUMBERS).iter().map(|h| h()).collect();
        assert_eq!(values, vec![1, 2]);
    }

    #[test]
    fn test_unknown_hook_is_empty() {
        let registry = HookRegistry::new();
        assert!(registry.get(NUMBERS).is_empty());
        assert!(registry.get_named::<TextFn>("missing").unwrap().is_empty());
    }

    #[test]
    fn test_mismatched_registration_rejected() {
        let mut registry = HookRegistry::new();
        registry.declare(NUMBERS).unwrap();

        let handler: Arc<TextFn> = Arc::new(|s: &str| s.to_uppercase());
        let err = registry.register_named("numbers", 0, handler).unwrap_err();
        assert!(matches!(err, HookError::TypeMismatch { .. }));
        assert!(registry.get(NUMBERS).is_empty());
    }

    #[test]
    fn test_mismatched_lookup_reported() {
        let mut registry = HookRegistry::new();
        registry.register(NUMBERS, 0, Arc::new(|| 1)).unwrap();

        let result = registry.get_named::<TextFn>("numbers");
        assert!(matches!(result, Err(HookError::TypeMismatch { .. })));
    }

    #[test]
    fn test_named_registration_matches_declared_point() {
        let mut registry = HookRegistry::new();
        let handler: Arc<NumberFn> = Arc::new(|| 42);
        registry.register_named("numbers", 1, handler).unwrap();

        let values: Vec<i32> = registry.get(NUMBERS).iter().map(|h| h()).collect();
        assert_eq!(values, vec![42]);
    }
}

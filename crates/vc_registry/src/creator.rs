//! Registries of factories for extensible polymorphic construction.
//!
//! A [`creator::Registry`](Registry) maps a key to a factory that builds an
//! owned instance of some common return type, usually `Box<dyn Base>`.
//! Unlike [`crate::Registry::run`], [`Registry::create`] reports an unknown
//! key through `None`: deserializing data written by a newer program must be
//! able to recover from types it has never heard of.
//!
//! [`Registerer::default_creator`] generates the factory for a concrete type,
//! so new subtypes are added without a central list of all of them.
//!
//! # Examples
//!
//! ```
//! use vc_registry::creator::{Registerer, Registry, Upcast};
//!
//! trait Animal { fn name(&self) -> &'static str; }
//!
//! #[derive(Default)]
//! struct Cat;
//! impl Animal for Cat { fn name(&self) -> &'static str { "cat" } }
//!
//! impl<T: Animal + 'static> Upcast<T> for Box<dyn Animal> {
//!     fn upcast(value: T) -> Self { Box::new(value) }
//! }
//!
//! static ANIMALS: Registry<String, Box<dyn Animal>> = Registry::new();
//!
//! Registerer::new("Cat".to_string(), Some(&ANIMALS), Registerer::default_creator::<Cat>());
//!
//! assert_eq!(ANIMALS.create("Cat", ()).unwrap().name(), "cat");
//! assert!(ANIMALS.create("Dog", ()).is_none());
//! ```

use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt::{self, Debug};
use core::hash::Hash;
use core::marker::PhantomData;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::hash::{HashMap, new_map};

// -----------------------------------------------------------------------------
// Construct & Upcast

/// Construct a value from an argument tuple.
///
/// Every [`Default`] type can be constructed from `()`.
/// Types built from other arguments implement this for their own tuple.
pub trait Construct<Args> {
    fn construct(args: Args) -> Self;
}

impl<T: Default> Construct<()> for T {
    #[inline]
    fn construct((): ()) -> Self {
        T::default()
    }
}

/// Convert a concrete value into the common return type of a creator registry.
///
/// Implemented for `Box<T>` and `Arc<T>` themselves. For trait objects,
/// implement `Upcast<T> for Box<dyn Base>` for every `T: Base`.
pub trait Upcast<T> {
    fn upcast(value: T) -> Self;
}

impl<T> Upcast<T> for Box<T> {
    #[inline]
    fn upcast(value: T) -> Self {
        Box::new(value)
    }
}

impl<T> Upcast<T> for Arc<T> {
    #[inline]
    fn upcast(value: T) -> Self {
        Arc::new(value)
    }
}

// -----------------------------------------------------------------------------
// Registry

/// A factory stored in a [`Registry`].
pub type Factory<R, A = ()> = Arc<dyn Fn(A) -> R + Send + Sync>;

/// A thread-safe map from a key to a [`Factory`].
///
/// Locking follows [`crate::Registry`]: lookups share, mutations exclude.
/// The factory is invoked under the shared lock, so it must not mutate
/// this registry.
pub struct Registry<K, R, A = ()> {
    table: RwLock<HashMap<K, Factory<R, A>>>,
}

impl<K, R, A> Default for Registry<K, R, A> {
    /// See [`Registry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, R, A> Registry<K, R, A> {
    /// Create an empty [`Registry`].
    #[inline]
    pub const fn new() -> Self {
        Self {
            table: RwLock::new(new_map()),
        }
    }

    #[inline]
    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, Factory<R, A>>> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, Factory<R, A>>> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the number of registered factories.
    #[inline]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if nothing is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Remove all registrations.
    pub fn clear(&self) {
        self.write().clear();
    }
}

impl<K: Eq + Hash + Clone, R, A> Registry<K, R, A> {
    /// Insert or **Overwrite** the factory registered under `key`.
    pub fn register(&self, key: K, factory: Factory<R, A>) -> Option<Factory<R, A>> {
        let replaced = self.write().insert(key, factory);
        if replaced.is_some() {
            log::debug!("creator entry overwritten by a later registration");
        }
        replaced
    }

    /// Whether a factory is registered under `key`.
    #[inline]
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().contains_key(key)
    }

    /// Build a new instance with the factory registered under `key`.
    ///
    /// Returns `None` if the key is unknown.
    pub fn create<Q>(&self, key: &Q, args: A) -> Option<R>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let table = self.read();
        table.get(key).map(|factory| factory(args))
    }

    /// Returns a snapshot of all registered keys.
    pub fn keys(&self) -> Vec<K> {
        let table = self.read();
        let mut keys = Vec::with_capacity(table.len());
        keys.extend(table.keys().cloned());
        keys
    }

    /// Remove the factory for `key`, returning `true` if it existed.
    pub fn unregister<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.write().remove(key).is_some()
    }
}

impl<K: Debug, R, A> Debug for Registry<K, R, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.read().keys()).finish()
    }
}

// -----------------------------------------------------------------------------
// Registerer

/// Registers a factory as a side effect of construction, see
/// [`crate::Registerer`].
pub struct Registerer<K, R, A = ()> {
    _marker: PhantomData<fn(K, A) -> R>,
}

impl<K: Eq + Hash + Clone, R, A> Registerer<K, R, A> {
    /// Register `factory` under `key` if `registry` is `Some`.
    pub fn new(key: K, registry: Option<&Registry<K, R, A>>, factory: Factory<R, A>) -> Self {
        if let Some(registry) = registry {
            registry.register(key, factory);
        }
        Self {
            _marker: PhantomData,
        }
    }
}

impl<R: 'static, A: 'static> Registerer<(), R, A> {
    /// A factory that forwards its arguments to `T` and upcasts the result.
    ///
    /// The key type plays no part in the factory, so this lives on
    /// `Registerer<(), R, A>` and `Registerer::default_creator::<T>()`
    /// infers the rest from the registry it is passed to.
    pub fn default_creator<T>() -> Factory<R, A>
    where
        T: Construct<A> + 'static,
        R: Upcast<T>,
    {
        Arc::new(|args: A| R::upcast(T::construct(args)))
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::sync::Arc;

    use super::{Construct, Registerer, Registry, Upcast};

    trait Shape {
        fn sides(&self) -> u32;
    }

    #[derive(Default)]
    struct Triangle;

    struct Polygon(u32);

    impl Shape for Triangle {
        fn sides(&self) -> u32 {
            3
        }
    }

    impl Shape for Polygon {
        fn sides(&self) -> u32 {
            self.0
        }
    }

    impl Construct<(u32,)> for Polygon {
        fn construct((sides,): (u32,)) -> Self {
            Polygon(sides)
        }
    }

    impl<T: Shape + 'static> Upcast<T> for Box<dyn Shape> {
        fn upcast(value: T) -> Self {
            Box::new(value)
        }
    }

    #[test]
    fn default_creator() {
        let registry: Registry<String, Box<dyn Shape>> = Registry::new();
        Registerer::new(
            "Triangle".into(),
            Some(&registry),
            Registerer::default_creator::<Triangle>(),
        );

        assert!(registry.has("Triangle"));
        assert_eq!(registry.create("Triangle", ()).map(|s| s.sides()), Some(3));
    }

    #[test]
    fn unknown_key_is_none() {
        let registry: Registry<String, Box<dyn Shape>> = Registry::new();
        assert!(registry.create("UnknownType", ()).is_none());
    }

    #[test]
    fn forwards_arguments() {
        let registry: Registry<String, Box<dyn Shape>, (u32,)> = Registry::new();
        registry.register("Polygon".into(), Registerer::default_creator::<Polygon>());
        registry.register(
            "Square".into(),
            Arc::new(|_: (u32,)| Box::new(Polygon(4)) as Box<dyn Shape>),
        );

        assert_eq!(registry.create("Polygon", (7,)).map(|s| s.sides()), Some(7));
        assert_eq!(registry.create("Square", (9,)).map(|s| s.sides()), Some(4));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn maintenance() {
        let registry: Registry<String, Arc<u8>> = Registry::new();
        registry.register("a".into(), Registerer::default_creator::<u8>());
        registry.register("b".into(), Registerer::default_creator::<u8>());

        assert_eq!(registry.create("a", ()).as_deref(), Some(&0));
        assert!(registry.unregister("a"));
        assert!(!registry.unregister("a"));
        assert_eq!(registry.keys(), ["b"]);

        registry.clear();
        assert!(registry.is_empty());
    }
}

use alloc::string::ToString;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt::{self, Debug, Display};
use core::hash::Hash;
use core::marker::PhantomData;

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::hash::{HashMap, new_map};
use crate::{Callable, RegistryError};

// -----------------------------------------------------------------------------
// Registry

/// A thread-safe map from a key to a registered function.
///
/// The table is guarded by a reader-writer lock:
/// - [`has`], [`run`], [`get`], [`keys`] and [`len`] take the shared lock and
///   may proceed in parallel.
/// - [`register`], [`unregister`] and [`clear`] take the exclusive lock.
///
/// A registration that completes before a lookup begins is always visible to it.
///
/// [`Registry::new`] is `const`, so a registry is usually a `static` item:
/// it is usable before any code has run, never dropped, and queries made
/// before an expected registration simply report "not found".
///
/// # Examples
///
/// ```
/// use vc_registry::Registry;
///
/// static HANDLERS: Registry<String, fn(i32) -> i32> = Registry::new();
///
/// HANDLERS.register("double".into(), |x| x * 2);
///
/// assert!(HANDLERS.has("double"));
/// assert_eq!(HANDLERS.run("double", (21,)), Ok(42));
/// assert!(HANDLERS.run("triple", (1,)).is_err());
/// ```
///
/// [`has`]: Registry::has
/// [`run`]: Registry::run
/// [`get`]: Registry::get
/// [`keys`]: Registry::keys
/// [`len`]: Registry::len
/// [`register`]: Registry::register
/// [`unregister`]: Registry::unregister
/// [`clear`]: Registry::clear
pub struct Registry<K, F> {
    table: RwLock<HashMap<K, F>>,
}

impl<K, F> Default for Registry<K, F> {
    /// See [`Registry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, F> Registry<K, F> {
    /// Create an empty [`Registry`].
    #[inline]
    pub const fn new() -> Self {
        Self {
            table: RwLock::new(new_map()),
        }
    }

    /// Takes the shared lock, ignoring poisoning.
    ///
    /// A panicking callback cannot leave the table half-written,
    /// since writes never call user code.
    #[inline]
    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, F>> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes the exclusive lock, ignoring poisoning.
    #[inline]
    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, F>> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the number of registered entries.
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

impl<K: Eq + Hash + Clone, F> Registry<K, F> {
    /// Insert or **Overwrite** the function registered under `key`.
    ///
    /// Always succeeds. The last registration for a key wins; the replaced
    /// function, if any, is returned.
    pub fn register(&self, key: K, f: F) -> Option<F> {
        let replaced = self.write().insert(key, f);
        if replaced.is_some() {
            log::debug!("registry entry overwritten by a later registration");
        }
        replaced
    }

    /// Whether `key` is registered.
    ///
    /// The key is borrowed, so `&str` can be used for a `String` keyed
    /// registry without allocating.
    #[inline]
    pub fn has<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.read().contains_key(key)
    }

    /// Look up `key` and invoke the registered function with `args`.
    ///
    /// The shared lock is held for the lookup and the invocation, so the
    /// function must not call [`register`](Self::register),
    /// [`unregister`](Self::unregister) or [`clear`](Self::clear) on this
    /// registry, or it deadlocks. Use [`get`](Self::get) to invoke without
    /// holding the lock.
    ///
    /// # Errors
    ///
    /// [`RegistryError::KeyNotFound`] if `key` is not registered.
    pub fn run<Q, Args>(&self, key: &Q, args: Args) -> Result<F::Output, RegistryError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Display + ?Sized,
        F: Callable<Args>,
    {
        let table = self.read();
        match table.get(key) {
            Some(f) => Ok(f.call(args)),
            None => Err(RegistryError::KeyNotFound(key.to_string())),
        }
    }

    /// Look up `key` and pass the registered function to `visit`,
    /// under the shared lock.
    ///
    /// The same re-entrancy rule as [`run`](Self::run) applies.
    pub fn run_with<Q, R>(&self, key: &Q, visit: impl FnOnce(&F) -> R) -> Result<R, RegistryError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Display + ?Sized,
    {
        let table = self.read();
        match table.get(key) {
            Some(f) => Ok(visit(f)),
            None => Err(RegistryError::KeyNotFound(key.to_string())),
        }
    }

    /// Returns a copy of the function registered under `key`.
    ///
    /// The lock is released before returning, so the copy may be invoked
    /// re-entrantly.
    pub fn get<Q>(&self, key: &Q) -> Option<F>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: Clone,
    {
        self.read().get(key).cloned()
    }

    /// Like [`get`](Self::get), but a missing key is an error.
    ///
    /// # Errors
    ///
    /// [`RegistryError::KeyNotFound`] if `key` is not registered.
    pub fn try_get<Q>(&self, key: &Q) -> Result<F, RegistryError>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Display + ?Sized,
        F: Clone,
    {
        self.get(key)
            .ok_or_else(|| RegistryError::KeyNotFound(key.to_string()))
    }

    /// Returns a snapshot of all registered keys.
    ///
    /// Later registrations are not reflected in the returned vector.
    pub fn keys(&self) -> Vec<K> {
        let table = self.read();
        let mut keys = Vec::with_capacity(table.len());
        keys.extend(table.keys().cloned());
        keys
    }

    /// Remove the registration for `key`.
    ///
    /// Returns `true` if the key existed.
    pub fn unregister<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.write().remove(key).is_some()
    }
}

impl<K: Debug, F> Debug for Registry<K, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.read().keys()).finish()
    }
}

// -----------------------------------------------------------------------------
// Registerer

/// Performs a registration as a side effect of construction.
///
/// If `registry` is `None` nothing happens. Every `Registerer` is
/// self-contained: it does not rely on any other registration having run.
///
/// # Examples
///
/// ```
/// use vc_registry::{Registerer, Registry};
///
/// static NAMES: Registry<&'static str, fn() -> &'static str> = Registry::new();
///
/// Registerer::new("hello", Some(&NAMES), || "world");
/// Registerer::new("ignored", None, || "never registered");
///
/// assert_eq!(NAMES.run("hello", ()), Ok("world"));
/// assert_eq!(NAMES.len(), 1);
/// ```
pub struct Registerer<K, F> {
    _marker: PhantomData<fn(K, F)>,
}

impl<K: Eq + Hash + Clone, F> Registerer<K, F> {
    /// Register `f` under `key` if `registry` is `Some`.
    pub fn new(key: K, registry: Option<&Registry<K, F>>, f: F) -> Self {
        if let Some(registry) = registry {
            registry.register(key, f);
        }
        Self {
            _marker: PhantomData,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests

//! Provide `FixedHashState` for registry tables.
//!
//! Registry keys are type paths, chosen by the program and not by
//! an adversary, so a fixed seed is used instead of a per-process random one.
//! This keeps iteration order of [`Registry::keys`] stable between runs.
//!
//! [`Registry::keys`]: crate::Registry::keys

use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};

/// The seed shared by every registry table.
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x6A09E667F3BCC908);

/// A hasher whose results only depend on the input.
///
/// A type alias for [`foldhash::fast::FoldHasher`],
/// created through [`FixedHashState::build_hasher`].
pub type FixedHasher = FoldHasher<'static>;

/// Hash state with a fixed seed, usable in `const` contexts.
///
/// # Examples
///
/// ```
/// use core::hash::{BuildHasher, Hash, Hasher};
/// use vc_registry::FixedHashState;
///
/// let hash = |s: &str| {
///     let mut hasher = FixedHashState.build_hasher();
///     s.hash(&mut hasher);
///     hasher.finish()
/// };
///
/// assert_eq!(hash("my_crate::Circle"), hash("my_crate::Circle"));
/// ```
#[derive(Copy, Clone, Default, Debug)]
pub struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FixedHasher;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

/// The table type behind [`Registry`](crate::Registry) and
/// [`creator::Registry`](crate::creator::Registry).
pub(crate) type HashMap<K, V> = hashbrown::HashMap<K, V, FixedHashState>;

/// Create an empty table in `const` context.
#[inline(always)]
pub(crate) const fn new_map<K, V>() -> HashMap<K, V> {
    hashbrown::HashMap::with_hasher(FixedHashState)
}

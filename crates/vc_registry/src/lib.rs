#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod callable;
mod error;
mod hash;
mod registry;
mod type_path;

pub mod creator;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use auto_register::{AutoRegistration, auto_register};
pub use callable::Callable;
pub use error::RegistryError;
pub use hash::{FixedHashState, FixedHasher};
pub use registry::{Registerer, Registry};
pub use type_path::{DynamicTypePath, TypePath};

#[doc(hidden)]
pub mod __macro_exports {
    #[cfg(feature = "auto_register")]
    pub use inventory;
}

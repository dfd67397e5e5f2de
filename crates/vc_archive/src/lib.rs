#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

extern crate alloc;
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod dispatch;
mod error;
mod poly;

pub mod archive;
pub mod codec;
pub mod io;
pub mod values;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use archive::{
    Archive, ArchiveKind, CLASS_NAME, SIZE_NAME, SaveLoadFn, SerializationRegistry, Slot,
    StreamArchive,
};
pub use dispatch::{Load, Save, load, load_into, save};
pub use error::{ArchiveError, Result};
pub use poly::{
    CreatorRegistry, Direction, Erased, Polymorphic, PolymorphicBase, load_polymorphic,
    register_class, save_load, save_polymorphic,
};

pub use vc_registry::{DynamicTypePath, TypePath, auto_register, impl_type_path};

#[doc(hidden)]
pub mod __macro_exports {
    pub use alloc::boxed::Box;

    pub use serde_json::Value;
    pub use vc_registry::creator::Upcast;
    pub use vc_registry::{AutoRegistration, DynamicTypePath};

    #[cfg(feature = "auto_register")]
    pub use vc_registry::__macro_exports::inventory;
}

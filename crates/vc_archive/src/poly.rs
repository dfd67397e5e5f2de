//! Save and load boxed trait objects by canonical type name.
//!
//! A polymorphic base is a trait whose objects are persisted through
//! `Box<dyn Base>`. Saving records the concrete type's canonical name and
//! then runs the save callback registered under it. Loading reads the name
//! back, builds a default instance through the base's creator registry and
//! fills it with the registered load callback.
//!
//! Setting up a base takes three pieces:
//!
//! - the base trait extends [`Polymorphic`];
//! - [`impl_polymorphic_base!`](crate::impl_polymorphic_base) declares its
//!   creator registry and the `Save`/`Load` impls of `Box<dyn Base>`;
//! - every concrete type is registered with [`register_class`], either
//!   explicitly at startup or through
//!   [`register_class!`](crate::register_class) and [`auto_register`].
//!
//! [`auto_register`]: crate::auto_register

use alloc::boxed::Box;
use alloc::string::{String, ToString};
use core::any::{Any, type_name};

use serde_json::Value;
use vc_registry::creator::{self, Upcast};
use vc_registry::{DynamicTypePath, TypePath};

use crate::archive::{Archive, StreamArchive};
use crate::dispatch::{Load, Save};
use crate::error::{ArchiveError, Result};

// -----------------------------------------------------------------------------
// Polymorphic & PolymorphicBase

/// Supertrait of every polymorphic base trait.
///
/// Implemented automatically for every type with a [`TypePath`].
pub trait Polymorphic: Any + DynamicTypePath + Send + Sync {}

impl<T: Any + DynamicTypePath + Send + Sync> Polymorphic for T {}

/// The creator registry of a polymorphic base, keyed by canonical type name.
pub type CreatorRegistry<B> = creator::Registry<String, Box<B>>;

/// Runtime type recovery for `dyn Base`.
///
/// Implemented by [`impl_polymorphic_base!`](crate::impl_polymorphic_base).
pub trait PolymorphicBase: 'static {
    /// The factories building default instances of each registered subtype.
    fn creators() -> &'static CreatorRegistry<Self>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Canonical type name of the concrete object.
    fn class_name(&self) -> &'static str;
}

// -----------------------------------------------------------------------------
// Erased

/// Whether a save/load callback is saving or loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Save,
    Load,
}

/// The untyped object handle passed to a save/load callback.
#[derive(Debug)]
pub enum Erased<'a> {
    /// Write this object into the archive.
    Save(&'a dyn Any),
    /// Fill this object from the archive.
    Load(&'a mut dyn Any),
}

impl Erased<'_> {
    #[inline]
    pub fn direction(&self) -> Direction {
        match self {
            Erased::Save(_) => Direction::Save,
            Erased::Load(_) => Direction::Load,
        }
    }
}

/// The save/load callback of `T` for archive `A`.
///
/// Fails with [`ArchiveError::Downcast`] if the handle does not hold a `T`.
pub fn save_load<A, T>(archive: &mut A, object: Erased<'_>) -> Result<()>
where
    A: Archive,
    T: Save<A> + Load<A> + Any,
{
    match object {
        Erased::Save(object) => match object.downcast_ref::<T>() {
            Some(value) => value.save(archive),
            None => Err(ArchiveError::Downcast(type_name::<T>())),
        },
        Erased::Load(object) => match object.downcast_mut::<T>() {
            Some(slot) => {
                *slot = T::load(archive)?;
                Ok(())
            }
            None => Err(ArchiveError::Downcast(type_name::<T>())),
        },
    }
}

// -----------------------------------------------------------------------------
// Save & Load

/// Save a polymorphic object: its canonical name, then its registered callback.
///
/// Fails with [`ArchiveError::Registry`] if the concrete type was never
/// registered for this archive format.
pub fn save_polymorphic<A, B>(object: &B, archive: &mut A) -> Result<()>
where
    A: Archive,
    B: PolymorphicBase + ?Sized,
{
    let name = object.class_name();
    log::trace!("save polymorphic `{name}` to {:?} archive", A::KIND);

    archive.push_class_name(name)?;
    // Copied out, so nested polymorphic values can use the registry again.
    let callback = A::registry().try_get(name)?;
    callback(archive, Erased::Save(B::as_any(object)))
}

/// Load a polymorphic object saved by [`save_polymorphic`].
///
/// Fails with [`ArchiveError::UnknownType`] if no subtype of `B` is
/// registered under the stored name. A tree node without a `Class` field
/// yields an empty name and therefore this error too.
pub fn load_polymorphic<A, B>(archive: &mut A) -> Result<Box<B>>
where
    A: Archive,
    B: PolymorphicBase + ?Sized,
{
    let name = archive.pop_class_name()?;
    log::trace!("load polymorphic `{name}` from {:?} archive", A::KIND);

    let mut object = B::creators()
        .create(name.as_str(), ())
        .ok_or_else(|| ArchiveError::UnknownType(name.clone()))?;
    let callback = A::registry().try_get(name.as_str())?;
    callback(archive, Erased::Load(B::as_any_mut(&mut *object)))?;
    Ok(object)
}

// -----------------------------------------------------------------------------
// Registration

/// Register `T` as a subtype of the polymorphic base `B`.
///
/// Inserts the save/load callbacks of both archive formats and the default
/// creator of `T`, all keyed by `T::type_path()`. Registering again
/// overwrites with identical entries.
pub fn register_class<B, T>()
where
    B: PolymorphicBase + ?Sized,
    T: TypePath + Default,
    T: Save<Value> + Load<Value> + Save<StreamArchive> + Load<StreamArchive>,
    Box<B>: Upcast<T>,
{
    let name = T::type_path();
    Value::registry().register(name.to_string(), save_load::<Value, T>);
    StreamArchive::registry().register(name.to_string(), save_load::<StreamArchive, T>);
    B::creators().register(
        name.to_string(),
        creator::Registerer::default_creator::<T>(),
    );
}

/// Declare a polymorphic base trait.
///
/// `impl_polymorphic_base!(pub static SHAPES: dyn Shape)` declares `SHAPES`,
/// the creator registry of `dyn Shape`, and implements
/// [`PolymorphicBase`], [`Upcast`], [`Save`] and [`Load`] for
/// `Box<dyn Shape>`. The trait must extend [`Polymorphic`].
///
/// [`Upcast`]: vc_registry::creator::Upcast
#[macro_export]
macro_rules! impl_polymorphic_base {
    ($vis:vis static $name:ident: dyn $base:path) => {
        $vis static $name: $crate::CreatorRegistry<dyn $base> =
            $crate::CreatorRegistry::<dyn $base>::new();

        impl $crate::PolymorphicBase for dyn $base {
            #[inline]
            fn creators() -> &'static $crate::CreatorRegistry<Self> {
                &$name
            }

            #[inline]
            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            #[inline]
            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }

            #[inline]
            fn class_name(&self) -> &'static str {
                $crate::__macro_exports::DynamicTypePath::reflect_type_path(self)
            }
        }

        impl<T: $base + 'static> $crate::__macro_exports::Upcast<T>
            for $crate::__macro_exports::Box<dyn $base>
        {
            #[inline]
            fn upcast(value: T) -> Self {
                $crate::__macro_exports::Box::new(value)
            }
        }

        impl<A: $crate::Archive> $crate::Save<A> for $crate::__macro_exports::Box<dyn $base> {
            #[inline]
            fn save(&self, archive: &mut A) -> $crate::Result<()> {
                $crate::save_polymorphic::<A, dyn $base>(&**self, archive)
            }
        }

        impl<A: $crate::Archive> $crate::Load<A> for $crate::__macro_exports::Box<dyn $base> {
            #[inline]
            fn load(archive: &mut A) -> $crate::Result<Self> {
                $crate::load_polymorphic::<A, dyn $base>(archive)
            }
        }
    };
}

/// Register subtypes of a polymorphic base at link time.
///
/// `register_class!(dyn Shape => Circle, Square)` submits one entry that
/// calls [`register_class`] for each listed type. Entries run when
/// [`auto_register`](crate::auto_register) is called. Without the
/// `auto_register` feature this expands to nothing.
#[macro_export]
macro_rules! register_class {
    (dyn $base:path => $($ty:ty),+ $(,)?) => {
        const _: () = {
            #[allow(dead_code)]
            fn register() {
                $( $crate::register_class::<dyn $base, $ty>(); )+
            }

            $crate::__auto_register!(register);
        };
    };
}

#[cfg(feature = "auto_register")]
#[doc(hidden)]
#[macro_export]
macro_rules! __auto_register {
    ($func:ident) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::__macro_exports::AutoRegistration::new($func)
        }
    };
}

#[cfg(not(feature = "auto_register"))]
#[doc(hidden)]
#[macro_export]
macro_rules! __auto_register {
    ($func:ident) => {};
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use serde_json::{Value, json};
    use vc_registry::{TypePath, impl_type_path};

    use super::{Direction, Erased, Polymorphic, PolymorphicBase, register_class, save_load};
    use crate::archive::{Archive, StreamArchive};
    use crate::dispatch::{load, save};
    use crate::error::ArchiveError;

    trait Shape: Polymorphic {
        fn area(&self) -> f64;
    }

    crate::impl_polymorphic_base!(static SHAPES: dyn Shape);

    #[derive(Debug, Default, PartialEq)]
    struct Circle {
        radius: f64,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Rect {
        width: f64,
        height: f64,
    }

    #[derive(Default)]
    struct Group {
        name: String,
        children: Vec<Box<dyn Shape>>,
    }

    /// Never registered.
    #[derive(Default)]
    struct Hexagon {
        side: f64,
    }

    impl_type_path!(Circle => "shapes::Circle");
    impl_type_path!(Rect => "shapes::Rect");
    impl_type_path!(Group => "shapes::Group");
    impl_type_path!(Hexagon => "shapes::Hexagon");

    crate::impl_fields!(Circle { radius });
    crate::impl_fields!(Rect { width, height });
    crate::impl_fields!(Group { name, children });
    crate::impl_fields!(Hexagon { side });

    impl Shape for Circle {
        fn area(&self) -> f64 {
            3.0 * self.radius * self.radius
        }
    }

    impl Shape for Rect {
        fn area(&self) -> f64 {
            self.width * self.height
        }
    }

    impl Shape for Group {
        fn area(&self) -> f64 {
            self.children.iter().map(|c| c.area()).sum()
        }
    }

    impl Shape for Hexagon {
        fn area(&self) -> f64 {
            2.6 * self.side * self.side
        }
    }

    fn setup() {
        register_class::<dyn Shape, Circle>();
        register_class::<dyn Shape, Rect>();
        register_class::<dyn Shape, Group>();
    }

    fn sample() -> Box<dyn Shape> {
        Box::new(Group {
            name: "g".into(),
            children: vec![
                Box::new(Circle { radius: 1.0 }),
                Box::new(Rect {
                    width: 2.0,
                    height: 3.0,
                }),
            ],
        })
    }

    #[test]
    fn registration_is_keyed_by_type_path() {
        setup();
        assert!(Value::registry().has(Circle::type_path()));
        assert!(StreamArchive::registry().has("shapes::Rect"));
        assert!(SHAPES.has("shapes::Group"));
        assert!(!SHAPES.has("shapes::Hexagon"));
    }

    #[test]
    fn tree_round_trip() {
        setup();
        let shape = sample();

        let mut tree = Value::Null;
        save(&shape, &mut tree).unwrap();
        assert_eq!(
            tree,
            json!({
                "Class": "shapes::Group",
                "name": "g",
                "children": [
                    { "Class": "shapes::Circle", "radius": 1.0 },
                    { "Class": "shapes::Rect", "width": 2.0, "height": 3.0 },
                ],
            })
        );

        let loaded: Box<dyn Shape> = load(&mut tree).unwrap();
        assert_eq!(loaded.area(), 9.0);
        assert_eq!(loaded.class_name(), "shapes::Group");
        let group = loaded.as_any().downcast_ref::<Group>().unwrap();
        assert_eq!(
            group.children[1].as_any().downcast_ref::<Rect>(),
            Some(&Rect {
                width: 2.0,
                height: 3.0
            })
        );
    }

    #[test]
    fn stream_round_trip() {
        setup();
        let shapes = vec![sample(), Box::new(Circle { radius: 2.0 }) as Box<dyn Shape>];

        let mut stream = StreamArchive::new();
        save(&shapes, &mut stream).unwrap();

        let loaded: Vec<Box<dyn Shape>> = load(&mut stream).unwrap();
        assert!(stream.is_empty());
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].area(), 9.0);
        assert_eq!(loaded[1].area(), 12.0);
    }

    #[test]
    fn unknown_type() {
        setup();
        assert!(SHAPES.create("UnknownType", ()).is_none());

        let mut tree = json!({ "Class": "UnknownType" });
        assert!(matches!(
            load::<Box<dyn Shape>, _>(&mut tree),
            Err(ArchiveError::UnknownType(name)) if name == "UnknownType"
        ));

        let mut tree = json!({ "radius": 1.0 });
        assert!(matches!(
            load::<Box<dyn Shape>, _>(&mut tree),
            Err(ArchiveError::UnknownType(name)) if name.is_empty()
        ));
    }

    #[test]
    fn unregistered_save_is_an_error() {
        let shape: Box<dyn Shape> = Box::new(Hexagon { side: 1.0 });
        let mut stream = StreamArchive::new();
        assert!(matches!(
            save(&shape, &mut stream),
            Err(ArchiveError::Registry(_))
        ));
    }

    #[test]
    fn erased_handles() {
        let circle = Circle { radius: 4.0 };
        let handle = Erased::Save(&circle);
        assert_eq!(handle.direction(), Direction::Save);

        let mut tree = Value::Null;
        save_load::<Value, Circle>(&mut tree, handle).unwrap();
        assert_eq!(tree, json!({ "radius": 4.0 }));

        let mut target = Circle::default();
        let handle = Erased::Load(&mut target);
        assert_eq!(handle.direction(), Direction::Load);
        save_load::<Value, Circle>(&mut tree, handle).unwrap();
        assert_eq!(target, circle);

        let mut wrong = Rect::default();
        assert!(matches!(
            save_load::<Value, Circle>(&mut tree, Erased::Load(&mut wrong)),
            Err(ArchiveError::Downcast(_))
        ));
    }

    #[cfg(feature = "auto_register")]
    mod auto {
        use alloc::boxed::Box;

        use serde_json::{Value, json};

        use super::{SHAPES, Shape};
        use crate::dispatch::{load, save};

        #[derive(Default)]
        struct Triangle {
            base: f64,
            height: f64,
        }

        vc_registry::impl_type_path!(Triangle => "shapes::Triangle");
        crate::impl_fields!(Triangle { base, height });

        impl Shape for Triangle {
            fn area(&self) -> f64 {
                self.base * self.height / 2.0
            }
        }

        crate::register_class!(dyn Shape => Triangle);

        #[test]
        fn link_time_registration() {
            assert!(crate::auto_register());
            assert!(SHAPES.has("shapes::Triangle"));

            let shape: Box<dyn Shape> = Box::new(Triangle {
                base: 4.0,
                height: 3.0,
            });
            let mut tree = Value::Null;
            save(&shape, &mut tree).unwrap();
            assert_eq!(tree["Class"], json!("shapes::Triangle"));

            let loaded: Box<dyn Shape> = load(&mut tree).unwrap();
            assert_eq!(loaded.area(), 6.0);
        }
    }
}

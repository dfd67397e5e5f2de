//! Link-time collection of registration functions.
//!
//! With the `auto_register` feature, every `register_class!` invocation in
//! the final binary submits an [`AutoRegistration`] through [`inventory`].
//! [`auto_register`] runs them all, so subtypes defined in separate modules
//! or crates need no central list.
//!
//! Collection relies on platform linker support. Supported platforms include
//! Linux, macOS, Windows, iOS, Android, and Web. Elsewhere nothing is
//! collected and [`auto_register`] returns `false`.

/// A registration function collected at link time.
///
/// Not constructed by hand; see `vc_archive::register_class!`.
pub struct AutoRegistration {
    func: fn(),
}

impl AutoRegistration {
    /// Wrap a registration function.
    #[inline]
    pub const fn new(func: fn()) -> Self {
        Self { func }
    }
}

#[cfg(feature = "auto_register")]
mod collect {
    use core::sync::atomic::{AtomicBool, Ordering};

    use super::AutoRegistration;

    inventory::collect!(AutoRegistration);

    /// Set by an entry submitted from this crate, proves that collection works.
    static AVAILABLE: AtomicBool = AtomicBool::new(false);

    fn mark_available() {
        AVAILABLE.store(true, Ordering::Release);
    }

    inventory::submit! {
        AutoRegistration::new(mark_available)
    }

    pub(super) fn run_all() -> bool {
        let mut count = 0_usize;
        for entry in inventory::iter::<AutoRegistration> {
            (entry.func)();
            count += 1;
        }
        // One entry is our own flag.
        log::debug!("auto registration ran {} entries", count.saturating_sub(1));
        AVAILABLE.load(Ordering::Acquire)
    }
}

/// Run every registration collected at link time.
///
/// Returns `true` if automatic registration works on the current platform.
/// Repeated calls run the registrations again; since registries overwrite
/// by key, the result is the same.
///
/// Without the `auto_register` feature this does nothing and returns `false`.
#[cfg_attr(not(feature = "auto_register"), inline(always))]
pub fn auto_register() -> bool {
    #[cfg(feature = "auto_register")]
    {
        collect::run_all()
    }
    #[cfg(not(feature = "auto_register"))]
    {
        false
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(all(test, feature = "auto_register"))]
mod tests {
    use core::sync::atomic::{AtomicUsize, Ordering};

    use super::{AutoRegistration, auto_register};

    static CALLS: AtomicUsize = AtomicUsize::new(0);

    fn count_call() {
        CALLS.fetch_add(1, Ordering::Relaxed);
    }

    inventory::submit! {
        AutoRegistration::new(count_call)
    }

    #[test]
    fn collected_entries_run() {
        assert!(auto_register());
        let first = CALLS.load(Ordering::Relaxed);
        assert!(first >= 1);

        assert!(auto_register());
        assert!(CALLS.load(Ordering::Relaxed) > first);
    }
}

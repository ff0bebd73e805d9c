use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::composite::{CompositeValue, FieldInit};
use crate::exception::{exc_err_fmt, ExcType, OpResult};

/// Shared handle to a registry-built composite.
///
/// Registry construction hands out `Rc` clones so the cap-exhausted aliasing
/// behavior is observable through `Rc::ptr_eq`.
pub type SharedComposite = Rc<RefCell<CompositeValue>>;

/// Sentinel for an uncapped registry.
pub const UNLIMITED: i64 = -1;

/// Outcome of [`InstanceRegistry::define_max_instance`]: callers must check
/// which variant they received.
#[derive(Debug)]
pub enum DefineOutcome {
    /// The cap was set and a composite built from the given field values.
    Created(SharedComposite),
    /// The cap had already been set once; nothing changed.
    AlreadyChanged,
}

/// Explicit registry for the process-wide creation cap and last-instance
/// cache.
///
/// The cap can be defined exactly once. While the remaining counter is
/// nonzero, construction decrements it and builds fresh; once it reaches zero,
/// every further construction call returns the cached handle of the *last
/// built* composite — with the new call's field values silently ignored. That
/// aliasing behavior is deliberate and covered by tests; see `DESIGN.md`.
///
/// The registry is single-threaded by construction (`Rc` handles are not
/// `Send`); concurrent construction is out of scope, not guarded against.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    cap_changed: bool,
    remaining: Option<i64>,
    last: Option<SharedComposite>,
}

impl InstanceRegistry {
    /// A registry with no cap: construction always builds fresh.
    #[must_use]
    pub fn new() -> Self {
        InstanceRegistry {
            cap_changed: false,
            remaining: None,
            last: None,
        }
    }

    /// How many fresh builds remain, or [`UNLIMITED`].
    #[must_use]
    pub fn remaining(&self) -> i64 {
        self.remaining.unwrap_or(UNLIMITED)
    }

    #[must_use]
    pub fn cap_changed(&self) -> bool {
        self.cap_changed
    }

    /// Sets the creation cap and builds a composite from `init`.
    ///
    /// Settable exactly once: any later call returns
    /// [`DefineOutcome::AlreadyChanged`] without touching the existing cap.
    pub fn define_max_instance(&mut self, cap: i64, init: FieldInit) -> OpResult<DefineOutcome> {
        if self.cap_changed {
            debug!(cap, "instance cap already defined; ignoring");
            return Ok(DefineOutcome::AlreadyChanged);
        }
        self.cap_changed = true;
        self.remaining = Some(cap);
        debug!(cap, "instance cap defined");
        Ok(DefineOutcome::Created(self.create(init)?))
    }

    /// Builds a composite, honoring the cap.
    ///
    /// With remaining budget the counter decrements and a fresh composite is
    /// built and cached. With the budget exhausted the cached handle is
    /// returned unchanged — `init` is ignored. Constructing through a registry
    /// whose cap was zero before anything was ever built fails with a
    /// RuntimeError.
    pub fn create(&mut self, init: FieldInit) -> OpResult<SharedComposite> {
        match self.remaining {
            Some(0) => match &self.last {
                Some(last) => {
                    debug!("instance cap exhausted; returning cached composite");
                    Ok(Rc::clone(last))
                }
                None => {
                    exc_err_fmt!(ExcType::RuntimeError; "instance cap is 0 and no composite has ever been built")
                }
            },
            _ => {
                if let Some(remaining) = &mut self.remaining {
                    *remaining -= 1;
                }
                let built = Rc::new(RefCell::new(CompositeValue::with_fields(init)?));
                debug!(remaining = self.remaining(), "built fresh composite");
                self.last = Some(Rc::clone(&built));
                Ok(built)
            }
        }
    }
}

//! Capability interfaces for the call and scoped-resource protocols.
//!
//! Instead of probing stored attributes for a `close`-shaped or callable
//! surface, attachments opt into an explicit trait and are registered on the
//! composite alongside the ten fields.

use std::cell::RefCell;
use std::rc::Rc;

use ahash::RandomState;
use indexmap::IndexMap;
use tracing::debug;

use crate::atom::Atom;
use crate::composite::CompositeValue;

/// An attachment that can be invoked with the call protocol's arguments.
pub trait Invocable {
    /// The name the result mapping is keyed by.
    fn name(&self) -> &str;

    /// Invoked once per call-protocol invocation, with the caller's arguments.
    fn invoke(&mut self, args: &[Atom]) -> Atom;
}

/// An attachment holding a releasable resource.
pub trait Closeable {
    /// The name reported on scope entry.
    fn name(&self) -> &str;

    /// Called exactly once per scope exit, unconditionally.
    fn close(&mut self);
}

/// Scope guard returned by [`CompositeValue::scope`].
///
/// Entry reports which closeable attachments the scope covers; dropping the
/// guard is the scope exit and closes each of them.
pub struct ResourceScope<'a> {
    closeables: &'a [Rc<RefCell<dyn Closeable>>],
}

impl ResourceScope<'_> {
    /// Names of the closeable attachments covered by this scope, in
    /// registration order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.closeables.iter().map(|c| c.borrow().name().to_owned()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.closeables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.closeables.is_empty()
    }
}

impl Drop for ResourceScope<'_> {
    fn drop(&mut self) {
        for closeable in self.closeables {
            let mut closeable = closeable.borrow_mut();
            debug!(name = closeable.name(), "closing scoped resource");
            closeable.close();
        }
    }
}

impl CompositeValue {
    /// Registers an invocable attachment for the call protocol.
    pub fn attach_invocable(&mut self, attachment: Rc<RefCell<dyn Invocable>>) {
        self.invocables.push(attachment);
    }

    /// Registers a closeable attachment for the scoped-resource protocol.
    pub fn attach_closeable(&mut self, attachment: Rc<RefCell<dyn Closeable>>) {
        self.closeables.push(attachment);
    }

    /// Invokes every invocable attachment with `args`, returning a mapping
    /// from attachment name to its result, in registration order. Empty when
    /// nothing is attached.
    pub fn invoke_all(&self, args: &[Atom]) -> IndexMap<String, Atom, RandomState> {
        let mut results = IndexMap::default();
        for invocable in &self.invocables {
            let mut invocable = invocable.borrow_mut();
            let result = invocable.invoke(args);
            results.insert(invocable.name().to_owned(), result);
        }
        results
    }

    /// Opens a resource scope over the closeable attachments. Dropping the
    /// returned guard closes each of them exactly once.
    #[must_use]
    pub fn scope(&self) -> ResourceScope<'_> {
        ResourceScope {
            closeables: &self.closeables,
        }
    }
}

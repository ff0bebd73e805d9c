use crate::atom::{Atom, Kind};
use crate::exception::{ExcType, OpResult};

/// A storage cell fixed to one value kind.
///
/// Whatever is assigned is coerced through the slot's kind on the way in, so
/// reads always observe a value of that kind regardless of what was written.
/// Created once per field with the field's name bound at definition time;
/// storage lives inline in the owning composite.
#[derive(Debug, Clone)]
pub struct TypedSlot {
    kind: Kind,
    name: &'static str,
    raw: Option<Atom>,
}

impl TypedSlot {
    /// Creates an empty slot for the named field. The composite constructor
    /// fills every slot before handing the instance out.
    #[must_use]
    pub(crate) fn new(kind: Kind, name: &'static str) -> Self {
        TypedSlot { kind, name, raw: None }
    }

    /// The kind every stored value is coerced to.
    #[must_use]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The field name the slot was bound to.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Reads the stored value. Fails with an AttributeError once the slot has
    /// been deleted.
    pub fn get(&self) -> OpResult<Atom> {
        match &self.raw {
            Some(value) => Ok(value.clone()),
            None => Err(ExcType::attribute_error(self.name)),
        }
    }

    /// Stores `value` coerced through the slot's kind. Fails with the
    /// underlying conversion error when the value cannot be coerced (e.g. a
    /// non-numeric text assigned to the integer slot).
    pub fn set(&mut self, value: Atom) -> OpResult<()> {
        self.raw = Some(value.coerce(self.kind)?);
        Ok(())
    }

    /// Removes the stored value; subsequent reads fail until the next `set`.
    pub fn delete(&mut self) -> OpResult<()> {
        match self.raw.take() {
            Some(_) => Ok(()),
            None => Err(ExcType::attribute_error(self.name)),
        }
    }
}

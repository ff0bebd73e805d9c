use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use num_complex::Complex64;
use strum::Display;

use crate::atom::{Atom, Kind};
use crate::capability::{Closeable, Invocable};
use crate::exception::{ExcType, OpResult};
use crate::slot::TypedSlot;

/// The ten fields of a composite, in fixed, significant order.
///
/// Every bulk operation (`all_types`, iteration, indexing, hashing, the
/// dispatch routines) walks fields in exactly this order; several dispatch
/// branches operate on a prefix of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Boolean,
    Integer,
    FloatNum,
    ComplexNum,
    String,
    Array,
    Tuple,
    Dictionary,
    Set,
    #[strum(serialize = "frozenset")]
    FrozenSet,
}

impl Field {
    /// All fields in storage order.
    pub const ALL: [Field; 10] = [
        Field::Boolean,
        Field::Integer,
        Field::FloatNum,
        Field::ComplexNum,
        Field::String,
        Field::Array,
        Field::Tuple,
        Field::Dictionary,
        Field::Set,
        Field::FrozenSet,
    ];

    /// The value kind the field's slot coerces to.
    #[must_use]
    pub fn kind(self) -> Kind {
        match self {
            Field::Boolean => Kind::Bool,
            Field::Integer => Kind::Int,
            Field::FloatNum => Kind::Float,
            Field::ComplexNum => Kind::Complex,
            Field::String => Kind::Str,
            Field::Array => Kind::List,
            Field::Tuple => Kind::Tuple,
            Field::Dictionary => Kind::Dict,
            Field::Set => Kind::Set,
            Field::FrozenSet => Kind::FrozenSet,
        }
    }
}

/// Optional initial values for each field, applied positionally over the
/// defaults. Unset fields start at their kind's zero value.
#[derive(Debug, Clone, Default)]
pub struct FieldInit {
    pub boolean: Option<Atom>,
    pub integer: Option<Atom>,
    pub float_num: Option<Atom>,
    pub complex_num: Option<Atom>,
    pub string: Option<Atom>,
    pub array: Option<Atom>,
    pub tuple: Option<Atom>,
    pub dictionary: Option<Atom>,
    pub set: Option<Atom>,
    pub frozenset: Option<Atom>,
}

impl FieldInit {
    fn into_values(self) -> [Option<Atom>; 10] {
        [
            self.boolean,
            self.integer,
            self.float_num,
            self.complex_num,
            self.string,
            self.array,
            self.tuple,
            self.dictionary,
            self.set,
            self.frozenset,
        ]
    }
}

/// The ten-slot aggregate: one value of every kind, each guarded by a
/// coercing slot, plus the attachment lists backing the call and
/// scoped-resource protocols.
///
/// All operator behavior flows through two dispatch routines — `compare` for
/// comparisons, `combine`/`combine_assign` for arithmetic and bitwise
/// operations — with the operator passed as an enum value.
#[derive(Clone)]
pub struct CompositeValue {
    pub(crate) boolean: TypedSlot,
    pub(crate) integer: TypedSlot,
    pub(crate) float_num: TypedSlot,
    pub(crate) complex_num: TypedSlot,
    pub(crate) string: TypedSlot,
    pub(crate) array: TypedSlot,
    pub(crate) tuple: TypedSlot,
    pub(crate) dictionary: TypedSlot,
    pub(crate) set: TypedSlot,
    pub(crate) frozenset: TypedSlot,
    // Attachments are shared by reference on clone, the way a shallow copy of
    // an attribute table would share its values.
    pub(crate) invocables: Vec<Rc<RefCell<dyn Invocable>>>,
    pub(crate) closeables: Vec<Rc<RefCell<dyn Closeable>>>,
}

impl CompositeValue {
    /// Number of fields; the composite's length under the sequence protocol.
    pub const FIELD_COUNT: usize = 10;

    /// Builds a composite with every field at its kind's zero value.
    #[must_use]
    pub fn new() -> Self {
        // Zero values are already of their slot's kind; this cannot fail.
        Self::with_fields(FieldInit::default()).expect("zero values always coerce")
    }

    /// Builds a composite from the given initial values, coercing each through
    /// its field's slot. Fails with the slot's conversion error when a value
    /// cannot be coerced to its field kind.
    pub fn with_fields(init: FieldInit) -> OpResult<Self> {
        let mut composite = CompositeValue {
            boolean: TypedSlot::new(Kind::Bool, "boolean"),
            integer: TypedSlot::new(Kind::Int, "integer"),
            float_num: TypedSlot::new(Kind::Float, "float_num"),
            complex_num: TypedSlot::new(Kind::Complex, "complex_num"),
            string: TypedSlot::new(Kind::Str, "string"),
            array: TypedSlot::new(Kind::List, "array"),
            tuple: TypedSlot::new(Kind::Tuple, "tuple"),
            dictionary: TypedSlot::new(Kind::Dict, "dictionary"),
            set: TypedSlot::new(Kind::Set, "set"),
            frozenset: TypedSlot::new(Kind::FrozenSet, "frozenset"),
            invocables: Vec::new(),
            closeables: Vec::new(),
        };
        let values = init.into_values();
        for (slot, value) in composite.slots_mut().into_iter().zip(values) {
            let value = value.unwrap_or_else(|| slot.kind().zero_value());
            slot.set(value)?;
        }
        Ok(composite)
    }

    /// The field slots in storage order.
    #[must_use]
    pub(crate) fn slots(&self) -> [&TypedSlot; 10] {
        [
            &self.boolean,
            &self.integer,
            &self.float_num,
            &self.complex_num,
            &self.string,
            &self.array,
            &self.tuple,
            &self.dictionary,
            &self.set,
            &self.frozenset,
        ]
    }

    #[must_use]
    pub(crate) fn slots_mut(&mut self) -> [&mut TypedSlot; 10] {
        [
            &mut self.boolean,
            &mut self.integer,
            &mut self.float_num,
            &mut self.complex_num,
            &mut self.string,
            &mut self.array,
            &mut self.tuple,
            &mut self.dictionary,
            &mut self.set,
            &mut self.frozenset,
        ]
    }

    /// The slot guarding one field.
    #[must_use]
    pub fn slot(&self, field: Field) -> &TypedSlot {
        let index = Field::ALL.iter().position(|f| *f == field).unwrap_or(0);
        self.slots()[index]
    }

    /// Mutable access to one field's slot, for direct coercing assignment.
    #[must_use]
    pub fn slot_mut(&mut self, field: Field) -> &mut TypedSlot {
        let index = Field::ALL.iter().position(|f| *f == field).unwrap_or(0);
        self.slots_mut()[index]
    }

    /// The ten field values in storage order. Fails if any slot has been
    /// deleted.
    pub fn all_types(&self) -> OpResult<[Atom; 10]> {
        let slots = self.slots();
        Ok([
            slots[0].get()?,
            slots[1].get()?,
            slots[2].get()?,
            slots[3].get()?,
            slots[4].get()?,
            slots[5].get()?,
            slots[6].get()?,
            slots[7].get()?,
            slots[8].get()?,
            slots[9].get()?,
        ])
    }

    /// Always the field count: the sequence protocol ranges over fields, not
    /// over any single field's contents.
    #[must_use]
    pub const fn len(&self) -> usize {
        Self::FIELD_COUNT
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Indexes into the ten-field tuple, with negative indices counting from
    /// the end. Fails with an IndexError out of range.
    pub fn get(&self, index: i64) -> OpResult<Atom> {
        let len = Self::FIELD_COUNT as i64;
        let adjusted = if index < 0 { index + len } else { index };
        if !(0..len).contains(&adjusted) {
            return Err(ExcType::index_error());
        }
        self.slots()[adjusted as usize].get()
    }

    /// Iterates the ten field values in storage order.
    pub fn iter(&self) -> OpResult<std::array::IntoIter<Atom, 10>> {
        Ok(self.all_types()?.into_iter())
    }

    /// The ten field values in reverse storage order.
    pub fn reversed(&self) -> OpResult<[Atom; 10]> {
        let mut values = self.all_types()?;
        values.reverse();
        Ok(values)
    }

    /// Value-equality membership over the ten field values.
    pub fn contains(&self, item: &Atom) -> OpResult<bool> {
        Ok(self.all_types()?.iter().any(|value| value == item))
    }

    /// True iff any field is truthy under its own kind.
    pub fn truthy(&self) -> OpResult<bool> {
        Ok(self.all_types()?.iter().any(Atom::truthy))
    }

    /// Hashes the sub-tuple of hashable field values in storage order,
    /// silently skipping the mutable containers (and any tuple or frozen set
    /// holding one).
    pub fn hash_value(&self) -> OpResult<u64> {
        let mut hasher = DefaultHasher::new();
        for value in self.all_types()? {
            if value.is_hashable() {
                value.hash(&mut hasher);
            }
        }
        Ok(hasher.finish())
    }

    /// Integer conversion: parses the text field first, falling back to the
    /// float field truncated.
    pub fn to_int(&self) -> OpResult<i64> {
        match self.string.get()?.coerce(Kind::Int) {
            Ok(atom) => Ok(atom.expect_int()),
            Err(_) => Ok(self.float_num.get()?.coerce(Kind::Int)?.expect_int()),
        }
    }

    /// Float conversion: parses the text field first, falling back to the
    /// integer field widened.
    pub fn to_float(&self) -> OpResult<f64> {
        match self.string.get()?.coerce(Kind::Float) {
            Ok(atom) => Ok(atom.expect_float()),
            Err(_) => Ok(self.integer.get()?.coerce(Kind::Float)?.expect_float()),
        }
    }

    /// Complex conversion: parses the text field first, falling back to
    /// (integer field, float field) as real and imaginary parts.
    pub fn to_complex(&self) -> OpResult<Complex64> {
        match self.string.get()?.coerce(Kind::Complex) {
            Ok(atom) => Ok(atom.expect_complex()),
            Err(_) => {
                let re = self.integer.get()?.expect_int() as f64;
                let im = self.float_num.get()?.expect_float();
                Ok(Complex64::new(re, im))
            }
        }
    }

    /// The integer field in octal notation, sign first.
    pub fn to_oct(&self) -> OpResult<String> {
        let v = i128::from(self.integer.get()?.expect_int());
        Ok(if v < 0 { format!("-0o{:o}", -v) } else { format!("0o{v:o}") })
    }

    /// The integer field in hexadecimal notation, sign first.
    pub fn to_hex(&self) -> OpResult<String> {
        let v = i128::from(self.integer.get()?.expect_int());
        Ok(if v < 0 { format!("-0x{:x}", -v) } else { format!("0x{v:x}") })
    }

    /// The integer field, for use as a sequence index.
    pub fn as_index(&self) -> OpResult<i64> {
        Ok(self.integer.get()?.expect_int())
    }

    /// The string field's content, the value substituted for the composite in
    /// text formatting.
    pub fn format_spec(&self) -> OpResult<String> {
        Ok(self.string.get()?.text())
    }

    /// Unary plus over the four numeric fields. The boolean field promotes to
    /// an integer, as numeric context always does.
    pub fn plus(&self) -> OpResult<[Atom; 4]> {
        let [b, i, f, c] = self.numeric_fields()?;
        // The boolean field always carries an integer value.
        Ok([Atom::Int(b.as_int().unwrap_or_default()), i, f, c])
    }

    /// Unary minus over the four numeric fields.
    pub fn minus(&self) -> OpResult<[Atom; 4]> {
        let [b, i, f, c] = self.numeric_fields()?;
        Ok([
            Atom::Int(-b.as_int().unwrap_or_default()),
            Atom::Int(-i.expect_int()),
            Atom::Float(-f.expect_float()),
            Atom::Complex(-c.expect_complex()),
        ])
    }

    /// Absolute values of the integer, float, and complex fields; the complex
    /// magnitude is a float.
    pub fn abs_values(&self) -> OpResult<[Atom; 3]> {
        Ok([
            Atom::Int(self.integer.get()?.expect_int().abs()),
            Atom::Float(self.float_num.get()?.expect_float().abs()),
            Atom::Float(self.complex_num.get()?.expect_complex().norm()),
        ])
    }

    /// Rounds the float field half-to-even: to an integer without `ndigits`,
    /// to a float with.
    pub fn round_float(&self, ndigits: Option<i32>) -> OpResult<Atom> {
        let v = self.float_num.get()?.expect_float();
        match ndigits {
            None => Ok(Atom::Int(crate::coerce::float_to_int(v.round_ties_even())?)),
            Some(n) => {
                let scale = 10f64.powi(n);
                Ok(Atom::Float((v * scale).round_ties_even() / scale))
            }
        }
    }

    /// Floor of the float field as an integer.
    pub fn floor_value(&self) -> OpResult<i64> {
        crate::coerce::float_to_int(self.float_num.get()?.expect_float().floor())
    }

    /// Ceiling of the float field as an integer.
    pub fn ceil_value(&self) -> OpResult<i64> {
        crate::coerce::float_to_int(self.float_num.get()?.expect_float().ceil())
    }

    /// The float field truncated toward zero as an integer.
    pub fn trunc_value(&self) -> OpResult<i64> {
        crate::coerce::float_to_int(self.float_num.get()?.expect_float().trunc())
    }

    /// The four numeric field values in order.
    pub(crate) fn numeric_fields(&self) -> OpResult<[Atom; 4]> {
        Ok([
            self.boolean.get()?,
            self.integer.get()?,
            self.float_num.get()?,
            self.complex_num.get()?,
        ])
    }
}

impl Default for CompositeValue {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CompositeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<class CompositeValue instance at {:#x}>", self as *const Self as usize)
    }
}

impl fmt::Debug for CompositeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("CompositeValue");
        for slot in self.slots() {
            match slot.get() {
                Ok(value) => s.field(slot.name(), &value.repr()),
                Err(_) => s.field(slot.name(), &"<deleted>"),
            };
        }
        s.field("invocables", &self.invocables.len())
            .field("closeables", &self.closeables.len())
            .finish()
    }
}

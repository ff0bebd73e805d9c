use std::fmt::{self, Write};
use std::hash::{BuildHasher, Hash, Hasher};

use ahash::RandomState;
use indexmap::{IndexMap, IndexSet};
use num_complex::Complex64;
use num_traits::Zero;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::exception::{ExcType, OpResult};
use crate::operators::CmpOperator;

/// Insertion-order-preserving mapping used for the dictionary kind.
pub type AtomMap = IndexMap<Atom, Atom, RandomState>;

/// Insertion-order-preserving set used for the set and frozen-set kinds.
pub type AtomSet = IndexSet<Atom, RandomState>;

/// The ten value kinds a field or operand may take, in fixed field order.
///
/// The order is significant: every bulk operation over a composite walks its
/// fields in exactly this order, and several dispatch branches select a prefix
/// of it (the first three or four kinds are the numeric ones).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum Kind {
    Bool,
    Int,
    Float,
    Complex,
    Str,
    List,
    Tuple,
    Dict,
    Set,
    FrozenSet,
}

impl Kind {
    /// The zero value of this kind: false, 0, 0.0, 0+0j, or the empty container.
    #[must_use]
    pub fn zero_value(self) -> Atom {
        match self {
            Self::Bool => Atom::Bool(false),
            Self::Int => Atom::Int(0),
            Self::Float => Atom::Float(0.0),
            Self::Complex => Atom::Complex(Complex64::zero()),
            Self::Str => Atom::Str(String::new()),
            Self::List => Atom::List(Vec::new()),
            Self::Tuple => Atom::Tuple(Vec::new()),
            Self::Dict => Atom::Dict(AtomMap::default()),
            Self::Set => Atom::Set(AtomSet::default()),
            Self::FrozenSet => Atom::FrozenSet(AtomSet::default()),
        }
    }

    /// True for the four kinds that carry a numeric value.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Bool | Self::Int | Self::Float | Self::Complex)
    }

    #[must_use]
    pub fn is_set_like(self) -> bool {
        matches!(self, Self::Set | Self::FrozenSet)
    }
}

/// One dynamically-kinded value: the closed set of kinds an operand or a
/// stored field value may take.
///
/// Equality follows cross-kind numeric equivalence (`true == 1 == 1.0 == 1+0j`)
/// and set/frozen-set cross-equality; list and tuple never compare equal to
/// each other. The `Hash` implementation is canonical with that equality and
/// structurally infallible — *unhashability* of the mutable container kinds is
/// a separate predicate, [`Atom::is_hashable`], enforced at the points where
/// a hashable value is required.
#[derive(Debug, Clone)]
pub enum Atom {
    Bool(bool),
    Int(i64),
    Float(f64),
    Complex(Complex64),
    Str(String),
    List(Vec<Atom>),
    Tuple(Vec<Atom>),
    Dict(AtomMap),
    Set(AtomSet),
    FrozenSet(AtomSet),
}

impl Atom {
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Complex(_) => Kind::Complex,
            Self::Str(_) => Kind::Str,
            Self::List(_) => Kind::List,
            Self::Tuple(_) => Kind::Tuple,
            Self::Dict(_) => Kind::Dict,
            Self::Set(_) => Kind::Set,
            Self::FrozenSet(_) => Kind::FrozenSet,
        }
    }

    /// Truthiness under the value's own kind: nonzero numbers and non-empty
    /// containers are truthy.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Int(v) => *v != 0,
            Self::Float(v) => *v != 0.0,
            Self::Complex(c) => !c.is_zero(),
            Self::Str(s) => !s.is_empty(),
            Self::List(items) | Self::Tuple(items) => !items.is_empty(),
            Self::Dict(map) => !map.is_empty(),
            Self::Set(set) | Self::FrozenSet(set) => !set.is_empty(),
        }
    }

    /// Whether the value may serve as a set member, mapping key, or input to
    /// the composite hash. Mutable containers never qualify; tuples and frozen
    /// sets qualify only when every element does.
    #[must_use]
    pub fn is_hashable(&self) -> bool {
        match self {
            Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::Complex(_) | Self::Str(_) => true,
            Self::Tuple(items) => items.iter().all(Atom::is_hashable),
            Self::FrozenSet(set) => set.iter().all(Atom::is_hashable),
            Self::List(_) | Self::Dict(_) | Self::Set(_) => false,
        }
    }

    /// The numeric value as a complex number, for the kinds that have one.
    #[must_use]
    pub(crate) fn as_complex(&self) -> Option<Complex64> {
        match self {
            Self::Bool(b) => Some(Complex64::new(f64::from(*b), 0.0)),
            Self::Int(v) => Some(Complex64::new(*v as f64, 0.0)),
            Self::Float(v) => Some(Complex64::new(*v, 0.0)),
            Self::Complex(c) => Some(*c),
            _ => None,
        }
    }

    /// The value as an `i64` when the kind is Bool or Int.
    #[must_use]
    pub(crate) fn as_int(&self) -> Option<i64> {
        match self {
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The value as an `f64` when the kind is Bool, Int, or Float.
    #[must_use]
    pub(crate) fn as_float(&self) -> Option<f64> {
        match self {
            Self::Bool(b) => Some(f64::from(*b)),
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Unwraps an integer atom. Only for values already coerced to Int;
    /// anything else is an internal invariant violation.
    #[must_use]
    pub(crate) fn expect_int(&self) -> i64 {
        match self {
            Self::Int(v) => *v,
            other => unreachable!("expected int atom, found {}", other.kind()),
        }
    }

    #[must_use]
    pub(crate) fn expect_float(&self) -> f64 {
        match self {
            Self::Float(v) => *v,
            other => unreachable!("expected float atom, found {}", other.kind()),
        }
    }

    #[must_use]
    pub(crate) fn expect_complex(&self) -> Complex64 {
        match self {
            Self::Complex(c) => *c,
            other => unreachable!("expected complex atom, found {}", other.kind()),
        }
    }

    /// Convenience constructor for a tuple atom.
    #[must_use]
    pub fn tuple(items: impl Into<Vec<Atom>>) -> Self {
        Self::Tuple(items.into())
    }

    /// Convenience constructor for a list atom.
    #[must_use]
    pub fn list(items: impl Into<Vec<Atom>>) -> Self {
        Self::List(items.into())
    }

    /// Convenience constructor for a set atom from already-hashable items.
    #[must_use]
    pub fn set(items: impl IntoIterator<Item = Atom>) -> Self {
        Self::Set(items.into_iter().collect())
    }

    /// Convenience constructor for a frozen-set atom from already-hashable items.
    #[must_use]
    pub fn frozen_set(items: impl IntoIterator<Item = Atom>) -> Self {
        Self::FrozenSet(items.into_iter().collect())
    }

    /// Applies a comparison operator to two values of comparable kinds.
    ///
    /// Both operands are expected to share a kind (the dispatch routine coerces
    /// before comparing), with numeric kinds comparable across each other.
    /// Ordering a complex or mapping value, or ordering across unrelated kinds,
    /// fails with a TypeError — the iterable-comparison fallback soft-catches
    /// that into its per-position marker.
    pub(crate) fn compare_with(&self, op: CmpOperator, other: &Atom) -> OpResult<bool> {
        if op.is_equality() {
            return Ok(match op {
                CmpOperator::Eq => self == other,
                _ => self != other,
            });
        }
        match (self, other) {
            (Self::Complex(_), _) | (_, Self::Complex(_)) => {
                Err(ExcType::comparison_type_error(&op, self.kind(), other.kind()))
            }
            (a, b) if a.kind().is_numeric() && b.kind().is_numeric() => {
                // Complex was rejected above, so both sides have a real value.
                let (x, y) = (a.as_float().unwrap_or(f64::NAN), b.as_float().unwrap_or(f64::NAN));
                Ok(apply_ordering(op, x.partial_cmp(&y)))
            }
            (Self::Str(a), Self::Str(b)) => Ok(apply_ordering(op, a.partial_cmp(b))),
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => lexicographic(op, a, b),
            (Self::Set(a) | Self::FrozenSet(a), Self::Set(b) | Self::FrozenSet(b)) => Ok(subset_relation(op, a, b)),
            _ => Err(ExcType::comparison_type_error(&op, self.kind(), other.kind())),
        }
    }

    /// Writes the canonical display form of the value: quoted text, bracketed
    /// containers, `True`/`False` booleans, `frozenset({…})` frozen sets.
    pub(crate) fn repr_fmt(&self, f: &mut impl Write) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => float_repr_fmt(*v, f),
            Self::Complex(c) => complex_repr_fmt(*c, f),
            Self::Str(s) => string_repr_fmt(s, f),
            Self::List(items) => sequence_repr_fmt(items, f, '[', "]"),
            Self::Tuple(items) => {
                if items.len() == 1 {
                    f.write_char('(')?;
                    items[0].repr_fmt(f)?;
                    f.write_str(",)")
                } else {
                    sequence_repr_fmt(items, f, '(', ")")
                }
            }
            Self::Dict(map) => {
                f.write_char('{')?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    key.repr_fmt(f)?;
                    f.write_str(": ")?;
                    value.repr_fmt(f)?;
                }
                f.write_char('}')
            }
            Self::Set(set) => {
                if set.is_empty() {
                    return f.write_str("set()");
                }
                set_body_repr_fmt(set, f)
            }
            Self::FrozenSet(set) => {
                if set.is_empty() {
                    return f.write_str("frozenset()");
                }
                f.write_str("frozenset(")?;
                set_body_repr_fmt(set, f)?;
                f.write_char(')')
            }
        }
    }

    /// The canonical display form as an owned string.
    #[must_use]
    pub fn repr(&self) -> String {
        let mut s = String::new();
        // Writing to a String never fails.
        self.repr_fmt(&mut s).unwrap();
        s
    }

    /// The plain-text form: text values yield their content unquoted, every
    /// other kind yields its display form.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            other => other.repr(),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            other => other.repr_fmt(f),
        }
    }
}

fn apply_ordering(op: CmpOperator, ordering: Option<std::cmp::Ordering>) -> bool {
    use std::cmp::Ordering::{Equal, Greater, Less};
    match ordering {
        // NaN operands order as nothing: every relational test is false.
        None => false,
        Some(ord) => match op {
            CmpOperator::Lt => ord == Less,
            CmpOperator::LtE => ord != Greater,
            CmpOperator::Gt => ord == Greater,
            CmpOperator::GtE => ord != Less,
            // Equality variants are handled before ordering is consulted.
            CmpOperator::Eq => ord == Equal,
            CmpOperator::NotEq => ord != Equal,
            CmpOperator::In | CmpOperator::NotIn => false,
        },
    }
}

/// Lexicographic sequence ordering: the first unequal pair decides, with
/// element-level kind mismatches surfacing as TypeErrors; equal prefixes fall
/// back to length comparison.
fn lexicographic(op: CmpOperator, a: &[Atom], b: &[Atom]) -> OpResult<bool> {
    for (x, y) in a.iter().zip(b) {
        if x != y {
            let strict = match op {
                CmpOperator::Lt | CmpOperator::LtE => CmpOperator::Lt,
                _ => CmpOperator::Gt,
            };
            return x.compare_with(strict, y);
        }
    }
    Ok(apply_ordering(op, a.len().partial_cmp(&b.len())))
}

/// Subset-style ordering between set-like values.
fn subset_relation(op: CmpOperator, a: &AtomSet, b: &AtomSet) -> bool {
    let subset = |small: &AtomSet, large: &AtomSet| small.iter().all(|item| large.contains(item));
    match op {
        CmpOperator::Lt => a.len() < b.len() && subset(a, b),
        CmpOperator::LtE => subset(a, b),
        CmpOperator::Gt => a.len() > b.len() && subset(b, a),
        CmpOperator::GtE => subset(b, a),
        _ => false,
    }
}

fn float_repr_fmt(v: f64, f: &mut impl Write) -> fmt::Result {
    if v.is_nan() {
        return f.write_str("nan");
    }
    if v.is_infinite() {
        return f.write_str(if v > 0.0 { "inf" } else { "-inf" });
    }
    let s = v.to_string();
    if s.contains('.') {
        f.write_str(&s)
    } else {
        write!(f, "{s}.0")
    }
}

/// Writes one component of a complex value: integral floats drop their
/// fractional suffix (`(3-2j)`, not `(3.0-2.0j)`).
fn complex_component_fmt(v: f64, f: &mut impl Write) -> fmt::Result {
    if v.is_finite() && v.fract() == 0.0 {
        write!(f, "{}", v as i64)
    } else {
        float_repr_fmt(v, f)
    }
}

fn complex_repr_fmt(c: Complex64, f: &mut impl Write) -> fmt::Result {
    if c.re == 0.0 {
        complex_component_fmt(c.im, f)?;
        return f.write_char('j');
    }
    f.write_char('(')?;
    complex_component_fmt(c.re, f)?;
    if c.im >= 0.0 || c.im.is_nan() {
        f.write_char('+')?;
    }
    complex_component_fmt(c.im, f)?;
    f.write_str("j)")
}

/// Writes the quoted form of a text value.
///
/// Single quotes by default; double quotes when the content contains single
/// quotes but no double quotes.
pub(crate) fn string_repr_fmt(s: &str, f: &mut impl Write) -> fmt::Result {
    let use_double = s.contains('\'') && !s.contains('"');
    let quote = if use_double { '"' } else { '\'' };
    f.write_char(quote)?;
    for c in s.chars() {
        match c {
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            '\'' if !use_double => f.write_str("\\'")?,
            _ => f.write_char(c)?,
        }
    }
    f.write_char(quote)
}

fn sequence_repr_fmt(items: &[Atom], f: &mut impl Write, open: char, close: &str) -> fmt::Result {
    f.write_char(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item.repr_fmt(f)?;
    }
    f.write_str(close)
}

fn set_body_repr_fmt(set: &AtomSet, f: &mut impl Write) -> fmt::Result {
    f.write_char('{')?;
    for (i, item) in set.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        item.repr_fmt(f)?;
    }
    f.write_char('}')
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| v == w))
            }
            (Self::Set(a) | Self::FrozenSet(a), Self::Set(b) | Self::FrozenSet(b)) => {
                a.len() == b.len() && a.iter().all(|item| b.contains(item))
            }
            (a, b) => match (a.as_complex(), b.as_complex()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl Eq for Atom {}

/// Fixed-seed hasher used for the order-independent container hashes. Seeds
/// only need to be stable within a process.
fn element_hash(atom: &Atom) -> u64 {
    let state = RandomState::with_seeds(0x6f6d, 0x6e69, 0x7661, 0x6c00);
    let mut hasher = state.build_hasher();
    atom.hash(&mut hasher);
    hasher.finish()
}

impl Hash for Atom {
    /// Canonical with equality: numerics that compare equal hash equal
    /// (`true`, `1`, `1.0`, and `1+0j` share a hash), set and frozen set hash
    /// by their elements order-independently.
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::Complex(_) => {
                // Invariant: the arm above matches exactly the kinds with a
                // complex value.
                let c = self.as_complex().unwrap_or_default();
                if c.im == 0.0 {
                    let re = c.re;
                    if re.is_finite() && re.fract() == 0.0 && (i64::MIN as f64..=i64::MAX as f64).contains(&re) {
                        state.write_u8(0);
                        // Ints hash by exact value so the full i64 range stays
                        // collision-coherent with equality.
                        state.write_i64(if let Some(v) = self.as_int() { v } else { re as i64 });
                    } else {
                        state.write_u8(1);
                        state.write_u64(re.to_bits());
                    }
                } else {
                    state.write_u8(2);
                    state.write_u64(c.re.to_bits());
                    state.write_u64(c.im.to_bits());
                }
            }
            Self::Str(s) => {
                state.write_u8(3);
                s.hash(state);
            }
            Self::List(items) => {
                state.write_u8(4);
                items.hash(state);
            }
            Self::Tuple(items) => {
                state.write_u8(5);
                items.hash(state);
            }
            Self::Dict(map) => {
                state.write_u8(6);
                state.write_usize(map.len());
                let mut acc = 0u64;
                for (k, v) in map {
                    acc ^= element_hash(k) ^ element_hash(v).rotate_left(1);
                }
                state.write_u64(acc);
            }
            // Set and frozen set share a tag: they compare equal cross-kind.
            Self::Set(set) | Self::FrozenSet(set) => {
                state.write_u8(7);
                state.write_usize(set.len());
                let mut acc = 0u64;
                for item in set {
                    acc ^= element_hash(item);
                }
                state.write_u64(acc);
            }
        }
    }
}

impl From<bool> for Atom {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Atom {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Atom {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Complex64> for Atom {
    fn from(v: Complex64) -> Self {
        Self::Complex(v)
    }
}

impl From<&str> for Atom {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for Atom {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<Atom>> for Atom {
    fn from(v: Vec<Atom>) -> Self {
        Self::List(v)
    }
}

impl From<AtomMap> for Atom {
    fn from(v: AtomMap) -> Self {
        Self::Dict(v)
    }
}

impl From<AtomSet> for Atom {
    fn from(v: AtomSet) -> Self {
        Self::Set(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_equality_crosses_kinds() {
        assert_eq!(Atom::Bool(true), Atom::Int(1));
        assert_eq!(Atom::Int(4), Atom::Float(4.0));
        assert_eq!(Atom::Float(4.0), Atom::Complex(Complex64::new(4.0, 0.0)));
        assert_ne!(Atom::Int(4), Atom::Str("4".to_owned()));
    }

    #[test]
    fn equal_numerics_share_a_hash() {
        for (a, b) in [
            (Atom::Bool(true), Atom::Int(1)),
            (Atom::Int(4), Atom::Float(4.0)),
            (Atom::Float(2.0), Atom::Complex(Complex64::new(2.0, 0.0))),
        ] {
            assert_eq!(element_hash(&a), element_hash(&b));
        }
    }

    #[test]
    fn set_and_frozen_set_compare_equal() {
        let set = Atom::set([Atom::Int(1), Atom::Int(2)]);
        let frozen = Atom::frozen_set([Atom::Int(2), Atom::Int(1)]);
        assert_eq!(set, frozen);
        assert_eq!(element_hash(&set), element_hash(&frozen));
    }

    #[test]
    fn repr_matches_canonical_forms() {
        assert_eq!(Atom::Bool(false).repr(), "False");
        assert_eq!(Atom::Float(4.0).repr(), "4.0");
        assert_eq!(Atom::Complex(Complex64::new(3.0, -2.0)).repr(), "(3-2j)");
        assert_eq!(Atom::Complex(Complex64::new(0.0, 2.0)).repr(), "2j");
        assert_eq!(Atom::Str("sing".to_owned()).repr(), "'sing'");
        assert_eq!(Atom::list(vec![Atom::Int(1), Atom::Int(4)]).repr(), "[1, 4]");
        assert_eq!(Atom::tuple(vec![Atom::Int(6)]).repr(), "(6,)");
        assert_eq!(Atom::Set(AtomSet::default()).repr(), "set()");
        assert_eq!(
            Atom::frozen_set([Atom::Int(12), Atom::Int(5)]).repr(),
            "frozenset({12, 5})"
        );
    }

    #[test]
    fn ordering_rejects_complex_operands() {
        let err = Atom::Complex(Complex64::zero())
            .compare_with(CmpOperator::Lt, &Atom::Complex(Complex64::zero()))
            .unwrap_err();
        assert_eq!(err.exc_type(), ExcType::TypeError);
    }

    #[test]
    fn set_ordering_is_subset_relation() {
        let small = Atom::set([Atom::Int(1)]);
        let large = Atom::set([Atom::Int(1), Atom::Int(2)]);
        assert!(small.compare_with(CmpOperator::Lt, &large).unwrap());
        assert!(!large.compare_with(CmpOperator::LtE, &small).unwrap());
    }
}

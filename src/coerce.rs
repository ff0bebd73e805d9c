//! The static coercion table: every (value kind, target kind) pairing maps to
//! a pure conversion over the value, replacing any form of runtime code
//! synthesis with an exhaustive match.

use std::str::FromStr;

use num_complex::Complex64;

use crate::atom::{Atom, AtomMap, AtomSet, Kind};
use crate::exception::{exc_err_fmt, ExcType, OpResult};

impl Atom {
    /// Converts the value to the target kind, following the conversion rules
    /// each kind's constructor applies to foreign values.
    ///
    /// Boolean and text targets accept anything; numeric targets parse text
    /// and widen smaller numerics; container targets flatten iterable kinds
    /// and reject the rest with a TypeError.
    pub fn coerce(&self, target: Kind) -> OpResult<Atom> {
        match target {
            Kind::Bool => Ok(Atom::Bool(self.truthy())),
            Kind::Int => self.coerce_int(),
            Kind::Float => self.coerce_float(),
            Kind::Complex => self.coerce_complex(),
            Kind::Str => Ok(Atom::Str(self.text())),
            Kind::List => Ok(Atom::List(self.elements()?)),
            Kind::Tuple => Ok(Atom::Tuple(self.elements()?)),
            Kind::Set => Ok(Atom::Set(self.element_set()?)),
            Kind::FrozenSet => Ok(Atom::FrozenSet(self.element_set()?)),
            Kind::Dict => self.coerce_dict(),
        }
    }

    /// Wraps a non-iterable value as a one-element container of the target
    /// kind, the fallback several dispatch branches apply before combining a
    /// scalar field with a container operand.
    pub(crate) fn wrap_single(&self, target: Kind) -> OpResult<Atom> {
        match target {
            Kind::List => Ok(Atom::List(vec![self.clone()])),
            Kind::Tuple => Ok(Atom::Tuple(vec![self.clone()])),
            Kind::Set | Kind::FrozenSet => {
                if !self.is_hashable() {
                    return Err(ExcType::type_error_unhashable(self.kind()));
                }
                let mut set = AtomSet::default();
                set.insert(self.clone());
                Ok(if target == Kind::Set {
                    Atom::Set(set)
                } else {
                    Atom::FrozenSet(set)
                })
            }
            other => self.coerce(other),
        }
    }

    /// The element sequence of an iterable value: text yields one-character
    /// texts, mappings yield their keys, everything container-shaped yields
    /// its items in insertion order. `None` for the four numeric kinds.
    pub(crate) fn iter_elements(&self) -> Option<Vec<Atom>> {
        match self {
            Self::Str(s) => Some(s.chars().map(|c| Atom::Str(c.to_string())).collect()),
            Self::List(items) | Self::Tuple(items) => Some(items.clone()),
            Self::Dict(map) => Some(map.keys().cloned().collect()),
            Self::Set(set) | Self::FrozenSet(set) => Some(set.iter().cloned().collect()),
            Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::Complex(_) => None,
        }
    }

    fn elements(&self) -> OpResult<Vec<Atom>> {
        self.iter_elements()
            .ok_or_else(|| ExcType::type_error_not_iterable(self.kind()))
    }

    fn element_set(&self) -> OpResult<AtomSet> {
        let mut set = AtomSet::default();
        for item in self.elements()? {
            if !item.is_hashable() {
                return Err(ExcType::type_error_unhashable(item.kind()));
            }
            set.insert(item);
        }
        Ok(set)
    }

    fn coerce_int(&self) -> OpResult<Atom> {
        match self {
            Self::Bool(b) => Ok(Atom::Int(i64::from(*b))),
            Self::Int(v) => Ok(Atom::Int(*v)),
            Self::Float(v) => float_to_int(*v).map(Atom::Int),
            Self::Str(s) => match s.trim().parse::<i64>() {
                Ok(v) => Ok(Atom::Int(v)),
                Err(_) => exc_err_fmt!(ExcType::ValueError; "invalid literal for int() with base 10: {}", self.repr()),
            },
            Self::Complex(_) => exc_err_fmt!(ExcType::TypeError; "can't convert complex to int"),
            other => Err(ExcType::type_error_conversion(other.kind(), Kind::Int)),
        }
    }

    fn coerce_float(&self) -> OpResult<Atom> {
        match self {
            Self::Bool(b) => Ok(Atom::Float(f64::from(*b))),
            Self::Int(v) => Ok(Atom::Float(*v as f64)),
            Self::Float(v) => Ok(Atom::Float(*v)),
            Self::Str(s) => match s.trim().parse::<f64>() {
                Ok(v) => Ok(Atom::Float(v)),
                Err(_) => exc_err_fmt!(ExcType::ValueError; "could not convert string to float: {}", self.repr()),
            },
            Self::Complex(_) => exc_err_fmt!(ExcType::TypeError; "can't convert complex to float"),
            other => Err(ExcType::type_error_conversion(other.kind(), Kind::Float)),
        }
    }

    fn coerce_complex(&self) -> OpResult<Atom> {
        match self {
            Self::Complex(c) => Ok(Atom::Complex(*c)),
            Self::Bool(_) | Self::Int(_) | Self::Float(_) => {
                // The three real kinds always widen.
                Ok(Atom::Complex(Complex64::new(self.as_float().unwrap_or(0.0), 0.0)))
            }
            Self::Str(s) => {
                // Accepted spellings use the `j` unit and may be parenthesized;
                // the parser wants `i` and no parens.
                let mut trimmed = s.trim();
                if let Some(inner) = trimmed.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
                    trimmed = inner;
                }
                match Complex64::from_str(&trimmed.replace('j', "i")) {
                    Ok(c) => Ok(Atom::Complex(c)),
                    Err(_) => exc_err_fmt!(ExcType::ValueError; "complex() arg is a malformed string"),
                }
            }
            other => Err(ExcType::type_error_conversion(other.kind(), Kind::Complex)),
        }
    }

    fn coerce_dict(&self) -> OpResult<Atom> {
        match self {
            Self::Dict(map) => Ok(Atom::Dict(map.clone())),
            Self::List(_) | Self::Tuple(_) | Self::Set(_) | Self::FrozenSet(_) | Self::Str(_) => {
                let mut map = AtomMap::default();
                // Invariant: iter_elements is Some for every iterable kind.
                for (i, item) in self.iter_elements().unwrap_or_default().into_iter().enumerate() {
                    let Some(pair) = item.iter_elements() else {
                        return exc_err_fmt!(ExcType::TypeError;
                            "cannot convert mapping update sequence element #{i} of kind '{}'", item.kind());
                    };
                    if pair.len() != 2 {
                        return exc_err_fmt!(ExcType::ValueError;
                            "mapping update sequence element #{i} has length {}; 2 is required", pair.len());
                    }
                    let mut pair = pair.into_iter();
                    let (key, value) = (pair.next().unwrap_or(Atom::Int(0)), pair.next().unwrap_or(Atom::Int(0)));
                    if !key.is_hashable() {
                        return Err(ExcType::type_error_unhashable(key.kind()));
                    }
                    map.insert(key, value);
                }
                Ok(Atom::Dict(map))
            }
            other => Err(ExcType::type_error_not_iterable(other.kind())),
        }
    }
}

/// Truncating float-to-int conversion with the usual guards: NaN is a
/// ValueError, infinity an OverflowError, out-of-range an OverflowError.
pub(crate) fn float_to_int(v: f64) -> OpResult<i64> {
    if v.is_nan() {
        return exc_err_fmt!(ExcType::ValueError; "cannot convert float NaN to integer");
    }
    if v.is_infinite() {
        return exc_err_fmt!(ExcType::OverflowError; "cannot convert float infinity to integer");
    }
    let truncated = v.trunc();
    if truncated < i64::MIN as f64 || truncated > i64::MAX as f64 {
        return exc_err_fmt!(ExcType::OverflowError; "float too large to convert to integer");
    }
    Ok(truncated as i64)
}

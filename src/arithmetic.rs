//! Arithmetic and bitwise dispatch over the ten fields.
//!
//! Each operator selects which fields participate and how the operand is
//! coerced; the non-mutating entry point returns a tuple sized to that subset,
//! the in-place entry point writes results back through the coercing slots.

use std::fmt;

use num_complex::Complex64;
use num_integer::Integer;
use num_traits::Zero;
use tracing::trace;

use crate::atom::{Atom, AtomSet, Kind};
use crate::composite::CompositeValue;
use crate::exception::{exc_err_fmt, exc_fmt, ExcType, OpResult};
use crate::operators::{Operator, Side};

/// One position of an arithmetic result tuple.
///
/// The right-side shift rule substitutes `Marker` — carrying the literal text
/// `{value} < 0` — for fields that coerce to a negative shift count, instead
/// of raising.
#[derive(Debug, Clone, PartialEq)]
pub enum Combined {
    Value(Atom),
    Marker(String),
}

impl Combined {
    /// The computed value, or `None` at a marker position.
    #[must_use]
    pub fn value(&self) -> Option<&Atom> {
        match self {
            Self::Value(atom) => Some(atom),
            Self::Marker(_) => None,
        }
    }
}

impl fmt::Display for Combined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(atom) => atom.repr_fmt(f),
            Self::Marker(text) => f.write_str(text),
        }
    }
}

/// Orders a field value and the operand into (lhs, rhs) for the given side.
fn ordered<'a>(side: Side, value: &'a Atom, other: &'a Atom) -> (&'a Atom, &'a Atom) {
    match side {
        Side::Left => (value, other),
        Side::Right => (other, value),
    }
}

impl CompositeValue {
    /// Applies a binary operator between the composite and `other`, with the
    /// composite on the given side.
    ///
    /// Returns a tuple sized to the participating-field subset: 3 for the
    /// integer-only operators, 4 for the numeric ones, 7 for repetition-style
    /// multiplication, 10 when every field takes part. `modulus` is honored by
    /// the power operator only.
    pub fn combine(&self, other: &Atom, op: Operator, side: Side, modulus: Option<&Atom>) -> OpResult<Vec<Combined>> {
        trace!(%op, %side, operand = %other.kind(), "arithmetic dispatch");
        match op {
            Operator::Add => {
                if other.kind().is_set_like() {
                    self.set_combine(other, Operator::BitOr, side)
                } else {
                    self.add(other, side)
                }
            }
            Operator::Sub => {
                if other.kind().is_set_like() {
                    self.set_combine(other, Operator::Sub, side)
                } else {
                    self.numeric_combine(other, side, 4, atom_sub)
                }
            }
            Operator::Mult => self.mult(other, side),
            Operator::Div => self.numeric_combine(other, side, 4, atom_truediv),
            Operator::FloorDiv => self.numeric_combine(other, side, 3, atom_floordiv),
            Operator::Mod => self.numeric_combine(other, side, 3, atom_mod),
            Operator::Divmod => self.numeric_combine(other, side, 3, atom_divmod),
            Operator::Pow => self.power(other, side, modulus),
            Operator::LShift | Operator::RShift => self.shift(other, op, side),
            Operator::BitAnd | Operator::BitOr | Operator::BitXor => {
                if other.kind().is_set_like() {
                    self.set_combine(other, op, side)
                } else {
                    self.bitwise(other, op, side)
                }
            }
        }
    }

    /// The in-place variant: mutates the participating fields through their
    /// coercing slots. The caller keeps the mutated composite; there is no
    /// separate return value.
    ///
    /// The mapping field never participates; set-like operands touch only the
    /// two set fields; the power operator ignores any modulus, as the original
    /// in-place form did.
    pub fn combine_assign(&mut self, other: &Atom, op: Operator) -> OpResult<()> {
        trace!(%op, operand = %other.kind(), "in-place dispatch");
        match op {
            Operator::Add => {
                if other.kind().is_set_like() {
                    self.assign_set(other, Operator::BitOr)
                } else if other.kind().is_numeric() {
                    self.assign_numeric(other, 4, atom_add)
                } else {
                    self.assign_containers(other)
                }
            }
            Operator::Sub => {
                if other.kind().is_set_like() {
                    self.assign_set(other, Operator::Sub)
                } else {
                    self.assign_numeric(other, 4, atom_sub)
                }
            }
            Operator::Mult => {
                let count = if matches!(other.kind(), Kind::Float | Kind::Complex) { 4 } else { 7 };
                self.assign_each(count, |value| atom_mult(value, other))
            }
            Operator::Div => self.assign_numeric(other, 4, atom_truediv),
            Operator::FloorDiv => self.assign_numeric(other, 3, atom_floordiv),
            Operator::Mod => self.assign_numeric(other, 3, atom_mod),
            Operator::Pow => self.assign_numeric(other, 4, atom_pow),
            Operator::LShift | Operator::RShift => {
                let count = shift_operand(op, Side::Left, other)?;
                self.assign_each(3, |value| {
                    let v = value.coerce(Kind::Int)?.expect_int();
                    shift_apply(op, v, count)
                })
            }
            Operator::BitAnd | Operator::BitOr | Operator::BitXor => {
                if other.kind().is_set_like() {
                    self.assign_set(other, op)
                } else {
                    let operand = other
                        .as_int()
                        .ok_or_else(|| ExcType::binary_type_error(&op, Kind::Int, other.kind()))?;
                    self.assign_each(3, |value| {
                        let v = value.coerce(Kind::Int)?.expect_int();
                        Ok(Atom::Int(bitwise_apply(op, v, operand)))
                    })
                }
            }
            Operator::Divmod => {
                exc_err_fmt!(ExcType::TypeError; "divmod has no in-place variant")
            }
        }
    }

    /// Addition against a non-set operand.
    ///
    /// Boolean/text operands pull every field in (coerced to the operand's
    /// kind); plain numbers touch only the numeric fields; remaining iterables
    /// concatenate, wrapping scalar fields as one-element sequences.
    fn add(&self, other: &Atom, side: Side) -> OpResult<Vec<Combined>> {
        let kind = other.kind();
        match kind {
            Kind::Bool | Kind::Str => {
                let mut result = Vec::with_capacity(Self::FIELD_COUNT);
                for value in self.all_types()? {
                    let coerced = value.coerce(kind)?;
                    let (lhs, rhs) = ordered(side, &coerced, other);
                    result.push(Combined::Value(atom_add(lhs, rhs)?));
                }
                Ok(result)
            }
            Kind::Int | Kind::Float | Kind::Complex => self.numeric_combine(other, side, 4, atom_add),
            _ => {
                let mut result = Vec::with_capacity(Self::FIELD_COUNT);
                for value in self.all_types()? {
                    let coerced = match value.iter_elements() {
                        Some(_) => value.coerce(kind)?,
                        None => value.wrap_single(kind)?,
                    };
                    let (lhs, rhs) = ordered(side, &coerced, other);
                    result.push(Combined::Value(atom_add(lhs, rhs)?));
                }
                Ok(result)
            }
        }
    }

    /// Multiplication: float/complex operands touch the numeric fields only;
    /// boolean/integer operands extend to text and the two sequence fields
    /// with repetition semantics. On the right side, non-numeric operands are
    /// repeated by the first two fields.
    fn mult(&self, other: &Atom, side: Side) -> OpResult<Vec<Combined>> {
        let count = match side {
            Side::Left => {
                if matches!(other.kind(), Kind::Float | Kind::Complex) {
                    4
                } else {
                    7
                }
            }
            Side::Right => {
                if other.kind().is_numeric() {
                    4
                } else {
                    2
                }
            }
        };
        let values = self.all_types()?;
        let mut result = Vec::with_capacity(count);
        for value in &values[..count] {
            let (lhs, rhs) = ordered(side, value, other);
            result.push(Combined::Value(atom_mult(lhs, rhs)?));
        }
        Ok(result)
    }

    /// Power, with the optional three-argument modular form. A modulus
    /// excludes the complex field and coerces the remaining three to integer.
    fn power(&self, other: &Atom, side: Side, modulus: Option<&Atom>) -> OpResult<Vec<Combined>> {
        match modulus {
            None => self.numeric_combine(other, side, 4, atom_pow),
            Some(m) => {
                let operand = require_int_pow_arg(other)?;
                let modulus = require_int_pow_arg(m)?;
                let numerics = self.numeric_fields()?;
                let mut result = Vec::with_capacity(3);
                for value in &numerics[..3] {
                    let v = value.coerce(Kind::Int)?.expect_int();
                    let powered = match side {
                        Side::Left => int_pow_mod(v, operand, modulus)?,
                        Side::Right => int_pow_mod(operand, v, modulus)?,
                    };
                    result.push(Combined::Value(Atom::Int(powered)));
                }
                Ok(result)
            }
        }
    }

    /// Shifts over the first three fields coerced to integer. On the right
    /// side a field that coerces negative becomes a marker instead of an
    /// error.
    fn shift(&self, other: &Atom, op: Operator, side: Side) -> OpResult<Vec<Combined>> {
        let operand = shift_operand(op, side, other)?;
        let numerics = self.numeric_fields()?;
        let mut result = Vec::with_capacity(3);
        for value in &numerics[..3] {
            let v = value.coerce(Kind::Int)?.expect_int();
            match side {
                Side::Left => result.push(Combined::Value(shift_apply(op, v, operand)?)),
                Side::Right => {
                    if v < 0 {
                        result.push(Combined::Marker(format!("{value} < 0")));
                    } else {
                        result.push(Combined::Value(shift_apply(op, operand, v)?));
                    }
                }
            }
        }
        Ok(result)
    }

    /// Integer bitwise combination over the first three fields.
    fn bitwise(&self, other: &Atom, op: Operator, side: Side) -> OpResult<Vec<Combined>> {
        let Some(operand) = other.as_int() else {
            return Err(match side {
                Side::Left => ExcType::binary_type_error(&op, Kind::Int, other.kind()),
                Side::Right => ExcType::binary_type_error(&op, other.kind(), Kind::Int),
            });
        };
        let numerics = self.numeric_fields()?;
        let mut result = Vec::with_capacity(3);
        for value in &numerics[..3] {
            let v = value.coerce(Kind::Int)?.expect_int();
            let (lhs, rhs) = match side {
                Side::Left => (v, operand),
                Side::Right => (operand, v),
            };
            result.push(Combined::Value(Atom::Int(bitwise_apply(op, lhs, rhs))));
        }
        Ok(result)
    }

    /// Set-algebra combination against a set-like operand: every field is
    /// coerced to the operand's kind (scalars wrap as one-element sets) and
    /// combined. The subtraction symbol maps to union here — a documented
    /// quirk of the composite, not an oversight.
    fn set_combine(&self, other: &Atom, op: Operator, side: Side) -> OpResult<Vec<Combined>> {
        let kind = other.kind();
        let other_set = expect_set(other);
        let mut result = Vec::with_capacity(Self::FIELD_COUNT);
        for value in self.all_types()? {
            let coerced = match value.iter_elements() {
                Some(_) => value.coerce(kind)?,
                None => value.wrap_single(kind)?,
            };
            let field_set = expect_set(&coerced);
            let (lhs, rhs) = match side {
                Side::Left => (field_set, other_set),
                Side::Right => (other_set, field_set),
            };
            result.push(Combined::Value(make_set_like(kind, set_apply(op, lhs, rhs))));
        }
        Ok(result)
    }

    /// Shared loop for the operators that touch a numeric-field prefix.
    fn numeric_combine(
        &self,
        other: &Atom,
        side: Side,
        count: usize,
        apply: impl Fn(&Atom, &Atom) -> OpResult<Atom>,
    ) -> OpResult<Vec<Combined>> {
        let numerics = self.numeric_fields()?;
        let mut result = Vec::with_capacity(count);
        for value in &numerics[..count] {
            let (lhs, rhs) = ordered(side, value, other);
            result.push(Combined::Value(apply(lhs, rhs)?));
        }
        Ok(result)
    }

    /// In-place loop over a numeric-field prefix: read, apply, write back
    /// through the coercing slot.
    fn assign_numeric(
        &mut self,
        other: &Atom,
        count: usize,
        apply: impl Fn(&Atom, &Atom) -> OpResult<Atom>,
    ) -> OpResult<()> {
        self.assign_each(count, |value| apply(value, other))
    }

    fn assign_each(&mut self, count: usize, apply: impl Fn(&Atom) -> OpResult<Atom>) -> OpResult<()> {
        for slot in self.slots_mut().into_iter().take(count) {
            let current = slot.get()?;
            let updated = apply(&current)?;
            slot.set(updated)?;
        }
        Ok(())
    }

    /// In-place set combination: only the two set fields participate, each
    /// coerced to the operand's kind, combined, and coerced back by its slot.
    fn assign_set(&mut self, other: &Atom, op: Operator) -> OpResult<()> {
        let kind = other.kind();
        let other_set = expect_set(other);
        for slot in self.slots_mut().into_iter().skip(8) {
            let current = slot.get()?.coerce(kind)?;
            let combined = set_apply(op, expect_set(&current), other_set);
            slot.set(make_set_like(kind, combined))?;
        }
        Ok(())
    }

    /// In-place addition with a container operand over the last six fields:
    /// the mapping field is skipped, set fields union, text and sequence
    /// fields concatenate — each with the operand coerced to the field's own
    /// kind first.
    fn assign_containers(&mut self, other: &Atom) -> OpResult<()> {
        for slot in self.slots_mut().into_iter().skip(4) {
            if slot.kind() == Kind::Dict {
                continue;
            }
            let current = slot.get()?;
            let coerced = other.coerce(slot.kind())?;
            let updated = if slot.kind().is_set_like() {
                make_set_like(slot.kind(), set_apply(Operator::BitOr, expect_set(&current), expect_set(&coerced)))
            } else {
                atom_add(&current, &coerced)?
            };
            slot.set(updated)?;
        }
        Ok(())
    }
}

/// Numeric operand pair after promotion: integers stay exact, one float
/// operand promotes both, one complex operand promotes both further.
enum NumPair {
    Ints(i64, i64),
    Floats(f64, f64),
    Complexes(Complex64, Complex64),
}

fn numeric_pair(a: &Atom, b: &Atom) -> Option<NumPair> {
    if !a.kind().is_numeric() || !b.kind().is_numeric() {
        return None;
    }
    if matches!(a, Atom::Complex(_)) || matches!(b, Atom::Complex(_)) {
        return Some(NumPair::Complexes(a.as_complex()?, b.as_complex()?));
    }
    if matches!(a, Atom::Float(_)) || matches!(b, Atom::Float(_)) {
        return Some(NumPair::Floats(a.as_float()?, b.as_float()?));
    }
    Some(NumPair::Ints(a.as_int()?, b.as_int()?))
}

pub(crate) fn atom_add(a: &Atom, b: &Atom) -> OpResult<Atom> {
    match numeric_pair(a, b) {
        Some(NumPair::Ints(x, y)) => Ok(match x.checked_add(y) {
            Some(v) => Atom::Int(v),
            // Overflow widens to float rather than failing.
            None => Atom::Float(x as f64 + y as f64),
        }),
        Some(NumPair::Floats(x, y)) => Ok(Atom::Float(x + y)),
        Some(NumPair::Complexes(x, y)) => Ok(Atom::Complex(x + y)),
        None => match (a, b) {
            (Atom::Str(x), Atom::Str(y)) => {
                let mut s = String::with_capacity(x.len() + y.len());
                s.push_str(x);
                s.push_str(y);
                Ok(Atom::Str(s))
            }
            (Atom::List(x), Atom::List(y)) => Ok(Atom::List(x.iter().chain(y).cloned().collect())),
            (Atom::Tuple(x), Atom::Tuple(y)) => Ok(Atom::Tuple(x.iter().chain(y).cloned().collect())),
            _ => Err(ExcType::binary_type_error(&Operator::Add, a.kind(), b.kind())),
        },
    }
}

pub(crate) fn atom_sub(a: &Atom, b: &Atom) -> OpResult<Atom> {
    match numeric_pair(a, b) {
        Some(NumPair::Ints(x, y)) => Ok(match x.checked_sub(y) {
            Some(v) => Atom::Int(v),
            None => Atom::Float(x as f64 - y as f64),
        }),
        Some(NumPair::Floats(x, y)) => Ok(Atom::Float(x - y)),
        Some(NumPair::Complexes(x, y)) => Ok(Atom::Complex(x - y)),
        None => Err(ExcType::binary_type_error(&Operator::Sub, a.kind(), b.kind())),
    }
}

pub(crate) fn atom_mult(a: &Atom, b: &Atom) -> OpResult<Atom> {
    match numeric_pair(a, b) {
        Some(NumPair::Ints(x, y)) => Ok(match x.checked_mul(y) {
            Some(v) => Atom::Int(v),
            None => Atom::Float(x as f64 * y as f64),
        }),
        Some(NumPair::Floats(x, y)) => Ok(Atom::Float(x * y)),
        Some(NumPair::Complexes(x, y)) => Ok(Atom::Complex(x * y)),
        None => {
            // Repetition: a sequence on one side, a boolean/integer count on
            // the other.
            let repeat = |seq: &Atom, n: &Atom| -> Option<OpResult<Atom>> {
                let count = n.as_int()?;
                let count = usize::try_from(count.max(0)).unwrap_or(0);
                Some(match seq {
                    Atom::Str(s) => Ok(Atom::Str(s.repeat(count))),
                    Atom::List(items) => Ok(Atom::List(repeat_items(items, count))),
                    Atom::Tuple(items) => Ok(Atom::Tuple(repeat_items(items, count))),
                    _ => return None,
                })
            };
            repeat(a, b)
                .or_else(|| repeat(b, a))
                .unwrap_or_else(|| Err(ExcType::binary_type_error(&Operator::Mult, a.kind(), b.kind())))
        }
    }
}

fn repeat_items(items: &[Atom], count: usize) -> Vec<Atom> {
    let mut result = Vec::with_capacity(items.len() * count);
    for _ in 0..count {
        result.extend_from_slice(items);
    }
    result
}

pub(crate) fn atom_truediv(a: &Atom, b: &Atom) -> OpResult<Atom> {
    match numeric_pair(a, b) {
        Some(NumPair::Ints(x, y)) => {
            if y == 0 {
                Err(ExcType::zero_division())
            } else {
                Ok(Atom::Float(x as f64 / y as f64))
            }
        }
        Some(NumPair::Floats(x, y)) => {
            if y == 0.0 {
                Err(ExcType::zero_division_float())
            } else {
                Ok(Atom::Float(x / y))
            }
        }
        Some(NumPair::Complexes(x, y)) => {
            if y.is_zero() {
                exc_err_fmt!(ExcType::ZeroDivisionError; "complex division by zero")
            } else {
                Ok(Atom::Complex(x / y))
            }
        }
        None => Err(ExcType::binary_type_error(&Operator::Div, a.kind(), b.kind())),
    }
}

pub(crate) fn atom_floordiv(a: &Atom, b: &Atom) -> OpResult<Atom> {
    match numeric_pair(a, b) {
        Some(NumPair::Ints(x, y)) => {
            if y == 0 {
                Err(ExcType::zero_division_floor())
            } else {
                Ok(Atom::Int(x.div_floor(&y)))
            }
        }
        Some(NumPair::Floats(x, y)) => {
            if y == 0.0 {
                exc_err_fmt!(ExcType::ZeroDivisionError; "float floor division by zero")
            } else {
                Ok(Atom::Float((x / y).floor()))
            }
        }
        Some(NumPair::Complexes(..)) => {
            exc_err_fmt!(ExcType::TypeError; "can't take floor of complex number.")
        }
        None => Err(ExcType::binary_type_error(&Operator::FloorDiv, a.kind(), b.kind())),
    }
}

pub(crate) fn atom_mod(a: &Atom, b: &Atom) -> OpResult<Atom> {
    match numeric_pair(a, b) {
        Some(NumPair::Ints(x, y)) => {
            if y == 0 {
                Err(ExcType::zero_division_floor())
            } else {
                Ok(Atom::Int(x.mod_floor(&y)))
            }
        }
        Some(NumPair::Floats(x, y)) => {
            if y == 0.0 {
                exc_err_fmt!(ExcType::ZeroDivisionError; "float modulo")
            } else {
                // Floor-style modulo: the result takes the divisor's sign.
                Ok(Atom::Float(x - y * (x / y).floor()))
            }
        }
        Some(NumPair::Complexes(..)) => {
            exc_err_fmt!(ExcType::TypeError; "can't mod complex numbers.")
        }
        None => Err(ExcType::binary_type_error(&Operator::Mod, a.kind(), b.kind())),
    }
}

pub(crate) fn atom_divmod(a: &Atom, b: &Atom) -> OpResult<Atom> {
    let quotient = atom_floordiv(a, b)?;
    let remainder = atom_mod(a, b)?;
    Ok(Atom::Tuple(vec![quotient, remainder]))
}

pub(crate) fn atom_pow(a: &Atom, b: &Atom) -> OpResult<Atom> {
    match numeric_pair(a, b) {
        Some(NumPair::Ints(base, exp)) => {
            if base == 0 && exp < 0 {
                exc_err_fmt!(ExcType::ZeroDivisionError; "0.0 cannot be raised to a negative power")
            } else if exp >= 0 {
                // Exact while it fits, widening to float on overflow.
                match u32::try_from(exp).ok().and_then(|e| base.checked_pow(e)) {
                    Some(v) => Ok(Atom::Int(v)),
                    None => Ok(Atom::Float((base as f64).powf(exp as f64))),
                }
            } else {
                Ok(Atom::Float((base as f64).powf(exp as f64)))
            }
        }
        Some(NumPair::Floats(base, exp)) => {
            if base == 0.0 && exp < 0.0 {
                exc_err_fmt!(ExcType::ZeroDivisionError; "0.0 cannot be raised to a negative power")
            } else if base < 0.0 && exp.fract() != 0.0 {
                // A negative base under a fractional exponent leaves the reals.
                Ok(Atom::Complex(Complex64::new(base, 0.0).powc(Complex64::new(exp, 0.0))))
            } else if exp.fract() == 0.0 && exp.abs() <= f64::from(i32::MAX) {
                // Integral exponents stay exact through repeated multiplication.
                Ok(Atom::Float(base.powi(exp as i32)))
            } else {
                Ok(Atom::Float(base.powf(exp)))
            }
        }
        Some(NumPair::Complexes(base, exp)) => {
            if base.is_zero() && (exp.re < 0.0 || exp.im != 0.0) {
                exc_err_fmt!(ExcType::ZeroDivisionError; "zero to a negative or complex power")
            } else {
                Ok(Atom::Complex(base.powc(exp)))
            }
        }
        None => Err(ExcType::binary_type_error(&Operator::Pow, a.kind(), b.kind())),
    }
}

fn require_int_pow_arg(atom: &Atom) -> OpResult<i64> {
    atom.as_int()
        .ok_or_else(|| exc_fmt!(ExcType::TypeError; "pow() 3rd argument not allowed unless all arguments are integers"))
}

/// Modular exponentiation by squaring; the result takes the modulus's sign.
fn int_pow_mod(base: i64, exp: i64, modulus: i64) -> OpResult<i64> {
    if modulus == 0 {
        return exc_err_fmt!(ExcType::ValueError; "pow() 3rd argument cannot be 0");
    }
    if exp < 0 {
        return exc_err_fmt!(ExcType::ValueError; "pow() 2nd argument cannot be negative when 3rd argument specified");
    }
    let m = i128::from(modulus);
    let mut result: i128 = 1;
    let mut base = i128::from(base) % m;
    let mut exp = exp as u64;
    while exp > 0 {
        if exp & 1 == 1 {
            result = (result * base) % m;
        }
        base = (base * base) % m;
        exp >>= 1;
    }
    // mod_floor keeps the remainder on the modulus's side of zero.
    Ok(result.mod_floor(&m) as i64)
}

fn shift_operand(op: Operator, side: Side, other: &Atom) -> OpResult<i64> {
    other.as_int().ok_or_else(|| match side {
        Side::Left => ExcType::binary_type_error(&op, Kind::Int, other.kind()),
        Side::Right => ExcType::binary_type_error(&op, other.kind(), Kind::Int),
    })
}

/// Applies a shift, widening to float when the result leaves the integer
/// range. A negative count is a ValueError — the right-side marker rule is
/// applied by the caller before ever reaching this.
fn shift_apply(op: Operator, value: i64, count: i64) -> OpResult<Atom> {
    if count < 0 {
        return Err(ExcType::negative_shift());
    }
    match op {
        Operator::LShift => {
            if value == 0 {
                return Ok(Atom::Int(0));
            }
            if count < 64 {
                let wide = i128::from(value) << count;
                if let Ok(v) = i64::try_from(wide) {
                    return Ok(Atom::Int(v));
                }
            }
            Ok(Atom::Float(value as f64 * 2f64.powf(count as f64)))
        }
        Operator::RShift => Ok(Atom::Int(value >> count.min(63))),
        _ => unreachable!("shift_apply only handles shift operators"),
    }
}

fn bitwise_apply(op: Operator, a: i64, b: i64) -> i64 {
    match op {
        Operator::BitAnd => a & b,
        Operator::BitOr => a | b,
        Operator::BitXor => a ^ b,
        _ => unreachable!("bitwise_apply only handles bitwise operators"),
    }
}

/// Set algebra for the container-operand branches. The subtraction symbol
/// deliberately maps to union; see the dispatch documentation.
fn set_apply(op: Operator, a: &AtomSet, b: &AtomSet) -> AtomSet {
    match op {
        Operator::BitOr | Operator::Sub => {
            let mut result = a.clone();
            for item in b {
                if !result.contains(item) {
                    result.insert(item.clone());
                }
            }
            result
        }
        Operator::BitAnd => a.iter().filter(|item| b.contains(*item)).cloned().collect(),
        Operator::BitXor => {
            let mut result: AtomSet = a.iter().filter(|item| !b.contains(*item)).cloned().collect();
            for item in b {
                if !a.contains(item) {
                    result.insert(item.clone());
                }
            }
            result
        }
        _ => unreachable!("set_apply only handles set-algebra operators"),
    }
}

/// Borrows the element set out of a set-like atom. Callers only pass values
/// already coerced to a set-like kind.
fn expect_set(atom: &Atom) -> &AtomSet {
    match atom {
        Atom::Set(set) | Atom::FrozenSet(set) => set,
        other => unreachable!("expected set-like atom, found {}", other.kind()),
    }
}

fn make_set_like(kind: Kind, set: AtomSet) -> Atom {
    if kind == Kind::FrozenSet {
        Atom::FrozenSet(set)
    } else {
        Atom::Set(set)
    }
}

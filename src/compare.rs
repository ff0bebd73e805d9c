use std::fmt;

use tracing::trace;

use crate::atom::{Atom, Kind};
use crate::composite::CompositeValue;
use crate::exception::{exc_err_fmt, ExcType, OpResult};
use crate::operators::CmpOperator;

/// Marker text substituted when a per-position comparison cannot complete.
pub const DOES_NOT_COMPARE: &str = "Does not compare!";

/// One position of a comparison result tuple.
///
/// The iterable-comparison fallback substitutes `Incomparable` for positions
/// whose coercion or comparison failed, instead of aborting the whole call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Bool(bool),
    Incomparable,
}

impl Comparison {
    /// The boolean outcome, or `None` at a marker position.
    #[must_use]
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            Self::Incomparable => None,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Incomparable => f.write_str(DOES_NOT_COMPARE),
        }
    }
}

impl CompositeValue {
    /// Compares the composite's fields against `other`.
    ///
    /// Which fields participate — and therefore the result length — depends on
    /// the operand kind and operator:
    ///
    ///   1. boolean or text operand: all ten fields, coerced to the operand's
    ///      kind (10 results); a coercion or comparison failure aborts with a
    ///      TypeError naming both kinds;
    ///   2. integer or float operand: the first three numeric fields, coerced
    ///      (3 results);
    ///   3. complex operand under `==`/`!=`: the first four numeric fields,
    ///      coerced to complex (4 results);
    ///   4. mapping operand under `==`/`!=`: the mapping field alone
    ///      (1 result);
    ///   5. anything else: all ten fields, iterables coerced to the operand's
    ///      kind and scalars wrapped as one-element sequences first, with
    ///      failures soft-substituted as [`Comparison::Incomparable`]
    ///      (10 results).
    ///
    /// Operators outside the six relational ones fail with a NameError.
    pub fn compare(&self, other: &Atom, op: CmpOperator) -> OpResult<Vec<Comparison>> {
        if !op.is_relational() {
            return exc_err_fmt!(ExcType::NameError; "compare requires a relational operator, not '{op}'");
        }
        let kind = other.kind();
        trace!(%op, operand = %kind, "comparison dispatch");
        match kind {
            Kind::Bool | Kind::Str => {
                let mut result = Vec::with_capacity(Self::FIELD_COUNT);
                for value in self.all_types()? {
                    let coerced = value
                        .coerce(kind)
                        .map_err(|_| ExcType::comparison_type_error(&op, kind, value.kind()))?;
                    let outcome = coerced
                        .compare_with(op, other)
                        .map_err(|_| ExcType::comparison_type_error(&op, kind, value.kind()))?;
                    result.push(Comparison::Bool(outcome));
                }
                Ok(result)
            }
            Kind::Int | Kind::Float => {
                let numerics = self.numeric_fields()?;
                let mut result = Vec::with_capacity(3);
                for value in &numerics[..3] {
                    let coerced = value.coerce(kind)?;
                    result.push(Comparison::Bool(coerced.compare_with(op, other)?));
                }
                Ok(result)
            }
            Kind::Complex if op.is_equality() => {
                let numerics = self.numeric_fields()?;
                let mut result = Vec::with_capacity(4);
                for value in &numerics {
                    let coerced = value.coerce(Kind::Complex)?;
                    result.push(Comparison::Bool(coerced.compare_with(op, other)?));
                }
                Ok(result)
            }
            Kind::Dict if op.is_equality() => {
                let mapping = self.dictionary.get()?;
                Ok(vec![Comparison::Bool(mapping.compare_with(op, other)?)])
            }
            _ => {
                // Sequence/set-like operands, and ordering against the kinds
                // that only support equality.
                let mut result = Vec::with_capacity(Self::FIELD_COUNT);
                for value in self.all_types()? {
                    let outcome = value
                        .iter_elements()
                        .map_or_else(|| value.wrap_single(kind), |_| value.coerce(kind))
                        .and_then(|coerced| coerced.compare_with(op, other));
                    match outcome {
                        Ok(b) => result.push(Comparison::Bool(b)),
                        Err(e) if e.is_soft_comparison_failure() => result.push(Comparison::Incomparable),
                        Err(e) => return Err(e),
                    }
                }
                Ok(result)
            }
        }
    }
}

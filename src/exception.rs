use std::error::Error;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::atom::Kind;
use crate::operators::{CmpOperator, Operator};

/// Result alias used by every fallible operation in the crate.
pub type OpResult<T> = Result<T, Exception>;

/// Exception categories raised by coercion and operator dispatch.
///
/// Uses strum derives for automatic `Display`, `FromStr`, and `Into<&'static str>`
/// implementations. The string representation matches the variant name exactly
/// (e.g., `ValueError` -> "ValueError").
#[allow(clippy::enum_variant_names)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExcType {
    ValueError,
    TypeError,
    NameError,
    AttributeError,
    IndexError,
    ZeroDivisionError,
    OverflowError,
    RuntimeError,
}

impl ExcType {
    /// Creates a TypeError for an unsupported binary operand pairing.
    ///
    /// Format: `unsupported operand type(s) for {op}: '{lhs}' and '{rhs}'`
    #[must_use]
    pub fn binary_type_error(op: &Operator, lhs: Kind, rhs: Kind) -> Exception {
        exc_fmt!(Self::TypeError; "unsupported operand type(s) for {op}: '{lhs}' and '{rhs}'")
    }

    /// Creates a TypeError for a comparison between two kinds that do not order.
    ///
    /// Format: `'{op}' not supported between instances of '{lhs}' and '{rhs}'`
    #[must_use]
    pub fn comparison_type_error(op: &CmpOperator, lhs: Kind, rhs: Kind) -> Exception {
        exc_fmt!(Self::TypeError; "'{op}' not supported between instances of '{lhs}' and '{rhs}'")
    }

    /// Creates a TypeError for coercing a non-iterable kind to a container kind.
    #[must_use]
    pub fn type_error_not_iterable(kind: Kind) -> Exception {
        exc_fmt!(Self::TypeError; "'{kind}' object is not iterable")
    }

    /// Creates a TypeError for kinds that cannot serve as set or mapping members.
    #[must_use]
    pub fn type_error_unhashable(kind: Kind) -> Exception {
        exc_fmt!(Self::TypeError; "unhashable type: '{kind}'")
    }

    /// Creates a TypeError for a numeric coercion from a kind with no numeric value.
    #[must_use]
    pub fn type_error_conversion(from: Kind, to: Kind) -> Exception {
        exc_fmt!(Self::TypeError; "argument must be a string or a number, not '{from}' (converting to {to})")
    }

    #[must_use]
    pub fn zero_division() -> Exception {
        exc_fmt!(Self::ZeroDivisionError; "division by zero")
    }

    #[must_use]
    pub fn zero_division_float() -> Exception {
        exc_fmt!(Self::ZeroDivisionError; "float division by zero")
    }

    #[must_use]
    pub fn zero_division_floor() -> Exception {
        exc_fmt!(Self::ZeroDivisionError; "integer division or modulo by zero")
    }

    #[must_use]
    pub fn negative_shift() -> Exception {
        exc_fmt!(Self::ValueError; "negative shift count")
    }

    /// Creates an AttributeError for reading or deleting an emptied field slot.
    #[must_use]
    pub fn attribute_error(field: &str) -> Exception {
        exc_fmt!(Self::AttributeError; "composite field '{field}' has been deleted")
    }

    #[must_use]
    pub fn index_error() -> Exception {
        exc_fmt!(Self::IndexError; "composite index out of range")
    }
}

/// Lightweight exception value: a category plus an optional message.
///
/// Mirrors the way the interpreter-facing exception taxonomy is usually
/// carried around: cheap to construct, cheap to clone, formatted lazily.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Exception {
    exc_type: ExcType,
    message: Option<String>,
}

impl Exception {
    /// Creates a new exception with the given category and optional message.
    #[must_use]
    pub fn new(exc_type: ExcType, message: Option<String>) -> Self {
        Exception { exc_type, message }
    }

    #[must_use]
    pub fn exc_type(&self) -> ExcType {
        self.exc_type
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// True for the two categories the iterable-comparison fallback is allowed
    /// to swallow and replace with a per-position marker.
    #[must_use]
    pub(crate) fn is_soft_comparison_failure(&self) -> bool {
        matches!(self.exc_type, ExcType::TypeError | ExcType::ValueError)
    }
}

impl fmt::Display for Exception {
    /// Format: `ExceptionType: message`, or just the type name when there is
    /// no message.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_str: &'static str = self.exc_type.into();
        match &self.message {
            Some(message) => write!(f, "{type_str}: {message}"),
            None => f.write_str(type_str),
        }
    }
}

impl Error for Exception {}

macro_rules! exc_fmt {
    ($error_type:expr; $($fmt_args:tt)*) => {
        crate::exception::Exception::new($error_type, Some(format!($($fmt_args)*)))
    };
}
pub(crate) use exc_fmt;

macro_rules! exc_err_fmt {
    ($error_type:expr; $($fmt_args:tt)*) => {
        Err(crate::exception::exc_fmt!($error_type; $($fmt_args)*))
    };
}
pub(crate) use exc_err_fmt;

use std::fmt::{self, Write};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum::Display;

/// Binary operators accepted by the arithmetic/bitwise dispatch routine.
///
/// Uses strum `Display` derive with per-variant serialization for operator symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Operator {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mult,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "//")]
    FloorDiv,
    #[strum(serialize = "%")]
    Mod,
    #[strum(serialize = "divmod")]
    Divmod,
    #[strum(serialize = "**")]
    Pow,
    #[strum(serialize = "<<")]
    LShift,
    #[strum(serialize = ">>")]
    RShift,
    #[strum(serialize = "&")]
    BitAnd,
    #[strum(serialize = "|")]
    BitOr,
    #[strum(serialize = "^")]
    BitXor,
}

/// Defined separately since these operators always produce booleans.
///
/// The comparison dispatch routine only accepts the six relational variants;
/// the membership variants exist for the containment protocol and are rejected
/// with a NameError when passed to `compare`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CmpOperator {
    Eq,
    NotEq,
    Lt,
    LtE,
    Gt,
    GtE,
    In,
    NotIn,
}

impl CmpOperator {
    /// True for the six relational operators `compare` dispatches on.
    #[must_use]
    pub fn is_relational(self) -> bool {
        !matches!(self, Self::In | Self::NotIn)
    }

    /// True for the two operators restricted to equality-style comparison
    /// (complex and mapping operands only support these).
    #[must_use]
    pub(crate) fn is_equality(self) -> bool {
        matches!(self, Self::Eq | Self::NotEq)
    }
}

impl fmt::Display for CmpOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq => f.write_str("=="),
            Self::NotEq => f.write_str("!="),
            Self::Lt => f.write_char('<'),
            Self::LtE => f.write_str("<="),
            Self::Gt => f.write_char('>'),
            Self::GtE => f.write_str(">="),
            Self::In => f.write_str("in"),
            Self::NotIn => f.write_str("not in"),
        }
    }
}

/// Which side of a binary expression the composite occupies.
///
/// The in-place third of the original three-way layout lives in
/// `CompositeValue::combine_assign`, which takes a mutable receiver instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

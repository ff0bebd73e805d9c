#![doc = include_str!("../README.md")]
mod arithmetic;
mod atom;
mod capability;
mod coerce;
mod compare;
mod composite;
mod exception;
mod operators;
mod registry;
mod slot;

pub use num_complex::Complex64;

pub use crate::{
    arithmetic::Combined,
    atom::{Atom, AtomMap, AtomSet, Kind},
    capability::{Closeable, Invocable, ResourceScope},
    compare::{Comparison, DOES_NOT_COMPARE},
    composite::{CompositeValue, Field, FieldInit},
    exception::{ExcType, Exception, OpResult},
    operators::{CmpOperator, Operator, Side},
    registry::{DefineOutcome, InstanceRegistry, SharedComposite, UNLIMITED},
};

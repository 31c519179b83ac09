//! Form validation module
//!
//! Custom validation rules layered over native input validation.
//!
//! # Overview
//!
//! - [`NativeField`] models an `<input>` with browser constraint validation
//! - [`Input`] adds ordered custom [`Validator`]s and accumulated error lines
//! - [`Form`] validates all its inputs on submit and gates the submit handler

mod field;
mod forms;
mod input;

pub use field::{Constraints, Field, FieldValue, InputKind, NativeField, Validity};
pub use forms::{FieldDefinition, Form, FormData, FormDefinition, RuleDefinition};
pub use input::{
    bad_input, pattern_mismatch, range_overflow, range_underflow, step_mismatch, too_long,
    too_short, type_mismatch, value_missing, Check, Input, Message, Predicate, Trigger, Validator,
};

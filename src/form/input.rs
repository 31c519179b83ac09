//! Validated form inputs
//!
//! An [`Input`] wraps one [`Field`] with an ordered list of custom
//! [`Validator`]s. Validation runs the field's native constraints first,
//! then every custom rule; the messages of all failures accumulate.

use super::field::{Field, FieldValue, NativeField, Validity};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What caused a validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trigger {
    /// The form was submitted
    #[default]
    Submit,
    /// The user edited the input
    Input,
    /// The input changed externally or lost focus
    Change,
}

/// Predicate of a custom rule: true when the input passes
pub type Predicate = Arc<dyn Fn(&Input, Trigger) -> bool + Send + Sync>;

/// Error line of a failed rule
#[derive(Clone)]
pub enum Message {
    /// Fixed text
    Text(String),
    /// Text built from the offending value
    Format(Arc<dyn Fn(&FieldValue) -> String + Send + Sync>),
}

impl Message {
    /// A message built from the field value when the rule fails
    pub fn format<F>(f: F) -> Self
    where
        F: Fn(&FieldValue) -> String + Send + Sync + 'static,
    {
        Message::Format(Arc::new(f))
    }

    fn render(&self, value: &FieldValue) -> String {
        match self {
            Message::Text(text) => text.clone(),
            Message::Format(f) => f(value),
        }
    }
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Message::Format(_) => f.write_str("Format(..)"),
        }
    }
}

/// A custom validation rule
#[derive(Clone)]
pub struct Validator {
    predicate: Predicate,
    message: Message,
}

impl Validator {
    /// Create a rule from a predicate and the message shown when it fails
    pub fn new<F>(predicate: F, message: impl Into<Message>) -> Self
    where
        F: Fn(&Input, Trigger) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
            message: message.into(),
        }
    }

    /// A rule over one native validity flag, see [`Check`]
    pub fn check(check: Check, message: impl Into<Message>) -> Self {
        Self::new(move |input, trigger| check.passes(input, trigger), message)
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Native validity flags usable as custom rules, so a rule can replace
/// the browser's text for one violation with its own message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    BadInput,
    PatternMismatch,
    RangeOverflow,
    RangeUnderflow,
    StepMismatch,
    TooLong,
    TooShort,
    TypeMismatch,
    ValueMissing,
}

impl Check {
    /// True when the flag is clear
    pub fn passes(self, input: &Input, trigger: Trigger) -> bool {
        let predicate = match self {
            Check::BadInput => bad_input,
            Check::PatternMismatch => pattern_mismatch,
            Check::RangeOverflow => range_overflow,
            Check::RangeUnderflow => range_underflow,
            Check::StepMismatch => step_mismatch,
            Check::TooLong => too_long,
            Check::TooShort => too_short,
            Check::TypeMismatch => type_mismatch,
            Check::ValueMissing => value_missing,
        };
        predicate(input, trigger)
    }
}

pub fn bad_input(input: &Input, _: Trigger) -> bool {
    !input.validity().bad_input
}

pub fn pattern_mismatch(input: &Input, _: Trigger) -> bool {
    !input.validity().pattern_mismatch
}

pub fn range_overflow(input: &Input, _: Trigger) -> bool {
    !input.validity().range_overflow
}

pub fn range_underflow(input: &Input, _: Trigger) -> bool {
    !input.validity().range_underflow
}

pub fn step_mismatch(input: &Input, _: Trigger) -> bool {
    !input.validity().step_mismatch
}

pub fn too_long(input: &Input, _: Trigger) -> bool {
    !input.validity().too_long
}

pub fn too_short(input: &Input, _: Trigger) -> bool {
    !input.validity().too_short
}

pub fn type_mismatch(input: &Input, _: Trigger) -> bool {
    !input.validity().type_mismatch
}

pub fn value_missing(input: &Input, _: Trigger) -> bool {
    !input.validity().value_missing
}

/// One field of a form with its validation state
pub struct Input {
    id: String,
    field: Box<dyn Field>,
    errors: Vec<String>,
    clear_on_invalid: bool,
    validators: Vec<Validator>,
}

impl Input {
    /// Wrap a field
    pub fn new(id: impl Into<String>, field: impl Field + 'static) -> Self {
        Self {
            id: id.into(),
            field: Box::new(field),
            errors: Vec::new(),
            clear_on_invalid: false,
            validators: Vec::new(),
        }
    }

    /// A text input without native constraints
    pub fn text(id: impl Into<String>) -> Self {
        Self::new(id, NativeField::text())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn value(&self) -> FieldValue {
        self.field.value()
    }

    pub fn set_value(&mut self, value: impl Into<FieldValue>) {
        self.field.set_value(value.into());
    }

    /// Native validity of the underlying field
    pub fn validity(&self) -> Validity {
        self.field.validity()
    }

    /// Error lines currently shown for this input
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Error lines joined the way they are displayed
    pub fn error_text(&self) -> String {
        self.errors.join("\n")
    }

    pub fn clear_on_invalid(&self) -> bool {
        self.clear_on_invalid
    }

    /// Empty the field whenever validation fails
    pub fn set_clear_on_invalid(&mut self, clear: bool) {
        self.clear_on_invalid = clear;
    }

    /// Append a rule; rules run in insertion order
    pub fn add_validator<F>(&mut self, predicate: F, message: impl Into<Message>)
    where
        F: Fn(&Input, Trigger) -> bool + Send + Sync + 'static,
    {
        self.validators.push(Validator::new(predicate, message));
    }

    /// Append several rules, keeping their order
    pub fn add_validators(&mut self, validators: impl IntoIterator<Item = Validator>) {
        self.validators.extend(validators);
    }

    /// Number of custom rules
    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }

    /// Clear error lines and the custom validity message
    pub fn reset_error(&mut self) {
        self.errors.clear();
        self.field.set_custom_validity("");
    }

    /// Replace all error lines with one
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.reset_error();
        self.append_error(message);
    }

    /// Add an error line below the existing ones
    pub fn append_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        let text = self.error_text();
        self.field.set_custom_validity(&text);

        if self.clear_on_invalid {
            self.field.clear();
        }
    }

    /// The user typed into the field. Errors are cleared once the native
    /// constraints hold again, or when only a custom error is showing.
    pub fn on_input(&mut self, value: impl Into<FieldValue>) {
        self.set_value(value);

        let validity = self.validity();
        if validity.valid() || validity.custom_error {
            self.reset_error();
        }
    }

    /// Run native and custom validation, returning whether the input is valid.
    ///
    /// Every violation contributes one line: the field's native message
    /// first, then the message of each failing rule in order.
    pub fn validate(&mut self, trigger: Trigger) -> bool {
        self.reset_error();

        let mut messages = Vec::new();
        let mut is_valid = self.validity().valid();
        if !is_valid {
            messages.push(self.field.validation_message());
        }

        let value = self.value();
        for validator in &self.validators {
            if !(validator.predicate)(self, trigger) {
                is_valid = false;
                messages.push(validator.message.render(&value));
            }
        }

        for message in messages {
            self.errors.push(message);
        }
        if !self.errors.is_empty() {
            let text = self.error_text();
            self.field.set_custom_validity(&text);
        }

        if !is_valid && self.clear_on_invalid {
            self.field.clear();
        }

        is_valid
    }
}

impl fmt::Debug for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Input")
            .field("id", &self.id)
            .field("value", &self.value())
            .field("errors", &self.errors)
            .field("clear_on_invalid", &self.clear_on_invalid)
            .field("validators", &self.validators.len())
            .finish()
    }
}

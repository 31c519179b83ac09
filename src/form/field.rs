//! Native form fields
//!
//! [`NativeField`] implements the constraint validation a browser
//! performs on `<input>` elements: required values, input types,
//! patterns, lengths, numeric ranges and steps, plus a custom validity
//! message. [`Field`] is the seam an embedding UI implements to put a
//! real input element behind an [`Input`](super::Input).

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

// Same grammar browsers use for type=email.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid email regex")
});

/// Type attribute of an input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    #[default]
    Text,
    Password,
    Email,
    Url,
    Number,
    Checkbox,
}

/// Value of a field: text, or the checked state of a checkbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Checked(bool),
    Text(String),
}

impl FieldValue {
    /// Text of the value; checkboxes read as `"true"`/`"false"`
    pub fn as_text(&self) -> String {
        self.to_string()
    }

    /// Whether the value counts as empty for `required`
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Checked(checked) => !checked,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Checked(checked) => write!(f, "{checked}"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<bool> for FieldValue {
    fn from(checked: bool) -> Self {
        FieldValue::Checked(checked)
    }
}

/// Constraint violations of a field, as reported by `input.validity`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Validity {
    pub value_missing: bool,
    pub type_mismatch: bool,
    pub pattern_mismatch: bool,
    pub too_long: bool,
    pub too_short: bool,
    pub range_underflow: bool,
    pub range_overflow: bool,
    pub step_mismatch: bool,
    pub bad_input: bool,
    pub custom_error: bool,
}

impl Validity {
    /// True when no constraint is violated
    pub fn valid(&self) -> bool {
        !(self.value_missing
            || self.type_mismatch
            || self.pattern_mismatch
            || self.too_long
            || self.too_short
            || self.range_underflow
            || self.range_overflow
            || self.step_mismatch
            || self.bad_input
            || self.custom_error)
    }
}

/// A form control with native validation
pub trait Field: Send {
    /// Current value
    fn value(&self) -> FieldValue;

    /// Replace the value
    fn set_value(&mut self, value: FieldValue);

    /// Current constraint violations
    fn validity(&self) -> Validity;

    /// Message the control shows for its first violation, empty when valid
    fn validation_message(&self) -> String;

    /// Set (or clear, with `""`) the custom validity message
    fn set_custom_validity(&mut self, message: &str);

    /// Empty the field: unchecked for checkboxes, empty text otherwise
    fn clear(&mut self) {
        let empty = match self.value() {
            FieldValue::Checked(_) => FieldValue::Checked(false),
            FieldValue::Text(_) => FieldValue::Text(String::new()),
        };
        self.set_value(empty);
    }
}

/// Validation attributes of an input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constraints {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

/// In-memory input element with browser constraint validation
#[derive(Debug, Clone)]
pub struct NativeField {
    kind: InputKind,
    constraints: Constraints,
    pattern: Option<Regex>,
    value: FieldValue,
    custom_validity: String,
}

impl NativeField {
    /// Create an empty field. Fails if the pattern doesn't compile.
    pub fn new(id: &str, kind: InputKind, constraints: Constraints) -> Result<Self> {
        let pattern = constraints
            .pattern
            .as_deref()
            .map(|p| {
                // Patterns must match the whole value
                Regex::new(&format!("^(?:{p})$")).map_err(|e| Error::Pattern {
                    id: id.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?;

        let value = match kind {
            InputKind::Checkbox => FieldValue::Checked(false),
            _ => FieldValue::default(),
        };

        Ok(Self {
            kind,
            constraints,
            pattern,
            value,
            custom_validity: String::new(),
        })
    }

    /// A text field without constraints
    pub fn text() -> Self {
        Self {
            kind: InputKind::Text,
            constraints: Constraints::default(),
            pattern: None,
            value: FieldValue::default(),
            custom_validity: String::new(),
        }
    }

    /// Input kind
    pub fn kind(&self) -> InputKind {
        self.kind
    }

    /// Validation attributes
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    fn number(&self, text: &str) -> Option<f64> {
        text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
    }

    fn step_mismatch(&self, number: f64) -> bool {
        let Some(step) = self.constraints.step.filter(|s| *s > 0.0) else {
            return false;
        };
        let base = self.constraints.min.unwrap_or(0.0);
        let steps = (number - base) / step;
        (steps - steps.round()).abs() > 1e-9
    }
}

impl Field for NativeField {
    fn value(&self) -> FieldValue {
        self.value.clone()
    }

    fn set_value(&mut self, value: FieldValue) {
        self.value = match (self.kind, value) {
            (InputKind::Checkbox, FieldValue::Text(text)) => {
                FieldValue::Checked(!text.is_empty() && text != "false")
            }
            (InputKind::Checkbox, checked) => checked,
            (_, FieldValue::Checked(checked)) => FieldValue::Text(checked.to_string()),
            (_, text) => text,
        };
    }

    fn validity(&self) -> Validity {
        let mut validity = Validity {
            value_missing: self.constraints.required && self.value.is_empty(),
            custom_error: !self.custom_validity.is_empty(),
            ..Validity::default()
        };

        let FieldValue::Text(text) = &self.value else {
            return validity;
        };
        // Everything but `required` only applies to non-empty values
        if text.is_empty() {
            return validity;
        }

        let length = text.chars().count();
        validity.too_long = self.constraints.max_length.is_some_and(|max| length > max);
        validity.too_short = self.constraints.min_length.is_some_and(|min| length < min);

        match self.kind {
            InputKind::Number => match self.number(text) {
                Some(number) => {
                    validity.range_underflow = self.constraints.min.is_some_and(|min| number < min);
                    validity.range_overflow = self.constraints.max.is_some_and(|max| number > max);
                    validity.step_mismatch = self.step_mismatch(number);
                }
                None => validity.bad_input = true,
            },
            InputKind::Email => validity.type_mismatch = !EMAIL_REGEX.is_match(text),
            InputKind::Url => validity.type_mismatch = url::Url::parse(text).is_err(),
            InputKind::Text | InputKind::Password | InputKind::Checkbox => {}
        }

        if self.kind != InputKind::Number {
            validity.pattern_mismatch = self.pattern.as_ref().is_some_and(|p| !p.is_match(text));
        }

        validity
    }

    fn validation_message(&self) -> String {
        let validity = self.validity();
        let length = self.value.as_text().chars().count();

        if validity.value_missing {
            if self.kind == InputKind::Checkbox {
                "Please check this box if you want to proceed.".to_string()
            } else {
                "Please fill out this field.".to_string()
            }
        } else if validity.type_mismatch {
            match self.kind {
                InputKind::Email => "Please enter an email address.".to_string(),
                _ => "Please enter a URL.".to_string(),
            }
        } else if validity.bad_input {
            "Please enter a number.".to_string()
        } else if validity.pattern_mismatch {
            "Please match the requested format.".to_string()
        } else if validity.too_long {
            format!(
                "Please shorten this text to {} characters or less (you are currently using {} characters).",
                self.constraints.max_length.unwrap_or_default(),
                length
            )
        } else if validity.too_short {
            format!(
                "Please lengthen this text to {} characters or more (you are currently using {} characters).",
                self.constraints.min_length.unwrap_or_default(),
                length
            )
        } else if validity.range_underflow {
            format!(
                "Value must be greater than or equal to {}.",
                self.constraints.min.unwrap_or_default()
            )
        } else if validity.range_overflow {
            format!(
                "Value must be less than or equal to {}.",
                self.constraints.max.unwrap_or_default()
            )
        } else if validity.step_mismatch {
            "Please enter a valid value.".to_string()
        } else {
            self.custom_validity.clone()
        }
    }

    fn set_custom_validity(&mut self, message: &str) {
        self.custom_validity = message.to_string();
    }
}

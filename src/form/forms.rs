//! Forms
//!
//! A [`Form`] owns the inputs declared in its [`FormDefinition`], gates
//! submission on every one of them validating, and carries an error and a
//! success banner.

use super::field::{Constraints, FieldValue, InputKind, NativeField};
use super::input::{Check, Input, Trigger, Validator};
use crate::error::{Error, Result};
use crate::output::Output;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Values of a submitted form, by input id
pub type FormData = BTreeMap<String, FieldValue>;

type SubmitHandler = Box<dyn FnMut(&FormData) + Send>;
type InvalidHandler = Box<dyn FnMut() + Send>;

/// Declarative description of a form's inputs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    /// Inputs in display order
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// One input of a form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: String,

    #[serde(default)]
    pub kind: InputKind,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub min_length: Option<usize>,

    #[serde(default)]
    pub max_length: Option<usize>,

    /// Regex the whole value must match
    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(default)]
    pub min: Option<f64>,

    #[serde(default)]
    pub max: Option<f64>,

    #[serde(default)]
    pub step: Option<f64>,

    /// Initial value
    #[serde(default)]
    pub value: Option<FieldValue>,

    #[serde(default)]
    pub clear_on_invalid: bool,

    /// Custom rules, run in order after native validation
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
}

impl FieldDefinition {
    /// A text input with no constraints
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: InputKind::Text,
            required: false,
            min_length: None,
            max_length: None,
            pattern: None,
            min: None,
            max: None,
            step: None,
            value: None,
            clear_on_invalid: false,
            rules: Vec::new(),
        }
    }

    fn constraints(&self) -> Constraints {
        Constraints {
            required: self.required,
            min_length: self.min_length,
            max_length: self.max_length,
            pattern: self.pattern.clone(),
            min: self.min,
            max: self.max,
            step: self.step,
        }
    }

    fn build(&self) -> Result<Input> {
        let field = NativeField::new(&self.id, self.kind, self.constraints())?;
        let mut input = Input::new(self.id.clone(), field);

        if let Some(value) = &self.value {
            input.set_value(value.clone());
        }
        input.set_clear_on_invalid(self.clear_on_invalid);
        input.add_validators(
            self.rules
                .iter()
                .map(|rule| Validator::check(rule.check, rule.message.clone())),
        );

        Ok(input)
    }
}

/// A custom rule over a native validity flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub check: Check,
    pub message: String,
}

/// A set of inputs submitted together
pub struct Form {
    inputs: Vec<Input>,
    submit_handler: Option<SubmitHandler>,
    invalid_handler: Option<InvalidHandler>,
    error_output: Output,
    success_output: Output,
}

impl Form {
    /// Build a form with one input per declared field
    pub fn new(definition: &FormDefinition) -> Result<Self> {
        let inputs = definition
            .fields
            .iter()
            .map(FieldDefinition::build)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_inputs(inputs))
    }

    /// Build a form from already constructed inputs
    pub fn from_inputs(inputs: Vec<Input>) -> Self {
        Self {
            inputs,
            submit_handler: None,
            invalid_handler: None,
            error_output: Output::hidden(),
            success_output: Output::hidden(),
        }
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn error_output(&self) -> &Output {
        &self.error_output
    }

    pub fn success_output(&self) -> &Output {
        &self.success_output
    }

    /// Set the handler called with the form's values on a valid submit
    pub fn on_submit<F>(&mut self, handler: F)
    where
        F: FnMut(&FormData) + Send + 'static,
    {
        self.submit_handler = Some(Box::new(handler));
    }

    /// Set the handler called when a submit fails validation
    pub fn on_invalid<F>(&mut self, handler: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.invalid_handler = Some(Box::new(handler));
    }

    /// Submit the form.
    ///
    /// Both banners are hidden, then every input is validated (all of
    /// them, so each shows its errors). The submit handler runs only if
    /// every input is valid; otherwise the invalid handler runs.
    pub fn submit(&mut self) -> bool {
        self.error_output.hide();
        self.success_output.hide();

        let mut is_valid = true;
        for input in &mut self.inputs {
            is_valid &= input.validate(Trigger::Submit);
        }

        if is_valid {
            let data = self.data();
            debug!("Form valid, submitting {} values", data.len());
            if let Some(handler) = self.submit_handler.as_mut() {
                handler(&data);
            }
        } else {
            debug!("Form invalid, submission blocked");
            if let Some(handler) = self.invalid_handler.as_mut() {
                handler();
            }
        }

        is_valid
    }

    /// Current values of all inputs
    pub fn data(&self) -> FormData {
        self.inputs
            .iter()
            .map(|input| (input.id().to_string(), input.value()))
            .collect()
    }

    /// Show an error banner, hiding the success banner
    pub fn set_error(&self, message: impl Into<String>) {
        self.success_output.hide();
        self.error_output.show(message);
    }

    /// Show a success banner, hiding the error banner
    pub fn set_success(&self, message: impl Into<String>) {
        self.error_output.hide();
        self.success_output.show(message);
    }

    pub fn input(&self, id: &str) -> Option<&Input> {
        self.inputs.iter().find(|input| input.id() == id)
    }

    pub fn input_mut(&mut self, id: &str) -> Option<&mut Input> {
        self.inputs.iter_mut().find(|input| input.id() == id)
    }

    /// Value of the input with this id
    pub fn value(&self, id: &str) -> Option<FieldValue> {
        self.input(id).map(Input::value)
    }

    /// Set the value of the input with this id
    pub fn set_value(&mut self, id: &str, value: impl Into<FieldValue>) -> Result<()> {
        self.input_mut(id)
            .ok_or_else(|| Error::unknown_input(id))?
            .set_value(value);
        Ok(())
    }

    /// Add rules per input id, in the given order
    pub fn add_validators<I, K>(&mut self, validators: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Vec<Validator>)>,
        K: AsRef<str>,
    {
        for (id, rules) in validators {
            let id = id.as_ref();
            self.input_mut(id)
                .ok_or_else(|| Error::unknown_input(id))?
                .add_validators(rules);
        }
        Ok(())
    }

    /// Show an API error on the input it concerns.
    ///
    /// Returns false when no input has this id.
    pub fn set_input_error(&mut self, id: &str, message: impl Into<String>) -> bool {
        match self.input_mut(id) {
            Some(input) => {
                input.set_error(message);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("inputs", &self.inputs)
            .field("has_submit_handler", &self.submit_handler.is_some())
            .field("has_invalid_handler", &self.invalid_handler.is_some())
            .field("error_output", &self.error_output)
            .field("success_output", &self.success_output)
            .finish()
    }
}

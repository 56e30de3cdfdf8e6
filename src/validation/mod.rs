//! Form validation: schemas, field errors, and live (on-change) form state.
//!
//! Every screen form is a plain input struct implementing [`Schema`]. A
//! [`LiveForm`] wraps the input, re-runs the schema after every edit, and
//! tracks which fields the user has left (blurred) so errors only surface
//! once a field has been touched.

pub mod credential;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

pub use credential::{
    Credential, CredentialForm, PasswordRequirement, RequirementStatus, requirement_statuses,
};

/// Field name → human-readable error message.
///
/// Cross-field rules report on a single anchor field rather than per sub-field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. The first error reported for a field wins.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    /// `Ok(value)` when no errors were recorded.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value()) } else { Err(self) }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// A step's raw input that can be validated into a typed record.
pub trait Schema {
    type Output;

    fn validate(&self) -> Result<Self::Output, FieldErrors>;

    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Raw input plus its live validation state.
#[derive(Debug, Clone)]
pub struct LiveForm<S: Schema> {
    input: S,
    errors: FieldErrors,
    touched: BTreeSet<&'static str>,
}

impl<S: Schema + Default> Default for LiveForm<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Schema> LiveForm<S> {
    pub fn new(input: S) -> Self {
        let errors = errors_of(&input);
        Self {
            input,
            errors,
            touched: BTreeSet::new(),
        }
    }

    pub fn input(&self) -> &S {
        &self.input
    }

    /// Apply a change and re-validate.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut S) -> R) -> R {
        let result = f(&mut self.input);
        self.errors = errors_of(&self.input);
        result
    }

    /// Mark a field as touched (the user left it).
    pub fn blur(&mut self, field: &'static str) {
        self.touched.insert(field);
    }

    pub fn is_touched(&self, field: &str) -> bool {
        self.touched.contains(field)
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// The current error for `field`, shown only after the field was touched.
    pub fn visible_error(&self, field: &str) -> Option<&str> {
        if self.touched.contains(field) {
            self.errors.get(field)
        } else {
            None
        }
    }

    /// Gates the enabled state of the form's primary action.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Validate for submission. Every failing field becomes touched.
    pub fn submit(&mut self) -> Result<S::Output, FieldErrors> {
        let result = self.input.validate();
        if let Err(ref errors) = result {
            self.touched.extend(errors.fields());
        }
        result
    }
}

fn errors_of<S: Schema>(input: &S) -> FieldErrors {
    input.validate().err().unwrap_or_default()
}

/// Trimmed text, or a required-field error on `field`.
pub(crate) fn required<'a>(
    errors: &mut FieldErrors,
    field: &'static str,
    value: &'a str,
    message: &str,
) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, message);
    }
    trimmed
}

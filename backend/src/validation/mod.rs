//! Schema-based validation of request bodies and query strings.
//!
//! Every recognised payload has a [`SchemaName`] and a typed target that
//! implements [`RequestSchema`]. Validation runs in two passes over the raw
//! JSON value:
//!
//! 1. coercion, where textual representations are turned into numbers,
//!    enums and dates, with failures recorded as field errors;
//! 2. constraints, using the `validator` derive on the typed target plus any
//!    schema-specific refinement (password strength, non-empty updates).
//!
//! Both passes collect every violation; nothing fails fast. A field that
//! already failed coercion does not also report constraint errors.

pub mod extract;
pub mod password;
pub mod schemas;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::str::FromStr;
use validator::{Validate, ValidationErrors};

use crate::auth::models::LoginRequest;
use crate::database::models::{
    CreateAdminRequest, CreateProductRequest, ProductFilter, UpdateProductRequest,
};

/// Field-specific validation error details
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Name of the field with validation error
    pub field: String,
    /// Description of the validation failure
    pub message: String,
    /// Machine-readable failure kind
    pub code: String,
}

impl FieldError {
    pub fn new(
        field: impl Into<String>,
        message: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}

/// Identifiers of the recognised request schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaName {
    Login,
    CreateAdmin,
    ProductFilters,
    CreateProduct,
    UpdateProduct,
}

impl SchemaName {
    pub const ALL: [SchemaName; 5] = [
        SchemaName::Login,
        SchemaName::CreateAdmin,
        SchemaName::ProductFilters,
        SchemaName::CreateProduct,
        SchemaName::UpdateProduct,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaName::Login => "login",
            SchemaName::CreateAdmin => "create_admin",
            SchemaName::ProductFilters => "product_filters",
            SchemaName::CreateProduct => "create_product",
            SchemaName::UpdateProduct => "update_product",
        }
    }
}

impl FromStr for SchemaName {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SchemaName::ALL
            .into_iter()
            .find(|schema| schema.as_str() == s)
            .ok_or_else(|| format!("Unknown schema: {}", s))
    }
}

/// A typed request payload built from raw JSON.
pub trait RequestSchema: Validate + Sized {
    const NAME: SchemaName;

    /// Build the typed value, recording coercion failures in `fields`.
    /// Missing required values are replaced by placeholders; the recorded
    /// errors make the overall result invalid.
    fn coerce(fields: &mut Fields<'_>) -> Self;

    /// Checks the derive cannot express.
    fn refine(&self, _errors: &mut Vec<FieldError>) {}
}

/// Validate `input` against the schema registered under `schema`.
pub fn validate(schema: SchemaName, input: &Value) -> ValidationResult {
    match schema {
        SchemaName::Login => outcome::<LoginRequest>(input),
        SchemaName::CreateAdmin => outcome::<CreateAdminRequest>(input),
        SchemaName::ProductFilters => outcome::<ProductFilter>(input),
        SchemaName::CreateProduct => outcome::<CreateProductRequest>(input),
        SchemaName::UpdateProduct => outcome::<UpdateProductRequest>(input),
    }
}

fn outcome<T: RequestSchema>(input: &Value) -> ValidationResult {
    match parse::<T>(input) {
        Ok(_) => ValidationResult::valid(),
        Err(result) => result,
    }
}

/// Coerce and validate `input` into `T`, or return every violation found.
pub fn parse<T: RequestSchema>(input: &Value) -> Result<T, ValidationResult> {
    let empty = Map::new();
    let object = match input {
        Value::Object(object) => object,
        Value::Null => &empty,
        _ => {
            return Err(ValidationResult::from_errors(vec![FieldError::new(
                "body",
                "Expected a JSON object",
                "invalid_type",
            )]));
        }
    };

    let mut fields = Fields::new(object);
    let value = T::coerce(&mut fields);
    let mut errors = fields.into_errors();
    let coerced_fields: HashSet<String> = errors.iter().map(|e| e.field.clone()).collect();

    let mut checks = Vec::new();
    if let Err(validation_errors) = value.validate() {
        checks.extend(constraint_errors(&validation_errors));
    }
    value.refine(&mut checks);
    errors.extend(
        checks
            .into_iter()
            .filter(|error| !coerced_fields.contains(&error.field)),
    );

    if errors.is_empty() {
        Ok(value)
    } else {
        tracing::debug!(
            "{} payload rejected with {} error(s)",
            T::NAME.as_str(),
            errors.len()
        );
        Err(ValidationResult::from_errors(errors))
    }
}

/// Formats validator::ValidationErrors into field-specific error details,
/// ordered by field name so results are reproducible.
pub fn constraint_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut field_errors: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| "Invalid value".to_string()),
                code: error.code.to_string(),
            })
        })
        .collect();
    field_errors.sort_by(|a, b| a.field.cmp(&b.field));
    field_errors
}

/// Read access to a raw JSON object with type coercion.
///
/// Each field is looked up under its snake_case name and then its camelCase
/// spelling, so `min_price` also accepts `minPrice`. `null` counts as
/// absent. Blank strings are present values and meet the field's own
/// constraints; the query extractor drops blank parameters before coercion.
pub struct Fields<'a> {
    input: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl<'a> Fields<'a> {
    pub fn new(input: &'a Map<String, Value>) -> Self {
        Self {
            input,
            errors: Vec::new(),
        }
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>, code: &str) {
        self.errors.push(FieldError::new(field, message, code));
    }

    fn raw(&self, name: &str) -> Option<&'a Value> {
        let value = self
            .input
            .get(name)
            .or_else(|| self.input.get(&camel_case(name)))?;
        match value {
            Value::Null => None,
            other => Some(other),
        }
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.raw(name).is_some()
    }

    pub fn optional_string(&mut self, name: &str) -> Option<String> {
        match self.raw(name)? {
            Value::String(s) => Some(s.clone()),
            _ => {
                self.push(name, "Must be a string", "invalid_type");
                None
            }
        }
    }

    /// Like [`optional_string`](Self::optional_string) with surrounding
    /// whitespace removed.
    pub fn optional_trimmed(&mut self, name: &str) -> Option<String> {
        self.optional_string(name).map(|s| s.trim().to_string())
    }

    pub fn required_string(&mut self, name: &str, message: &str) -> String {
        if !self.is_present(name) {
            self.push(name, message, "required");
            return String::new();
        }
        self.optional_string(name).unwrap_or_default()
    }

    pub fn optional_number(&mut self, name: &str) -> Option<f64> {
        let parsed = match self.raw(name)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed.filter(|n| n.is_finite()) {
            Some(n) => Some(n),
            None => {
                self.push(name, "Must be a number", "invalid_type");
                None
            }
        }
    }

    pub fn required_number(&mut self, name: &str, message: &str) -> f64 {
        if !self.is_present(name) {
            self.push(name, message, "required");
            return 0.0;
        }
        self.optional_number(name).unwrap_or_default()
    }

    pub fn optional_integer(&mut self, name: &str) -> Option<i64> {
        let parsed = match self.raw(name)? {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.push(name, "Must be a whole number", "invalid_type");
        }
        parsed
    }

    pub fn required_integer(&mut self, name: &str, message: &str) -> i64 {
        if !self.is_present(name) {
            self.push(name, message, "required");
            return 0;
        }
        self.optional_integer(name).unwrap_or_default()
    }

    /// Positive integers used for paging. Out-of-range values are clamped
    /// into `u32` so the range constraints can report them.
    pub fn optional_count(&mut self, name: &str) -> Option<u32> {
        self.optional_integer(name).map(|value| {
            if value < 0 {
                0
            } else {
                u32::try_from(value).unwrap_or(u32::MAX)
            }
        })
    }

    pub fn optional_enum<E: FromStr>(&mut self, name: &str, allowed: &str) -> Option<E> {
        let parsed = match self.raw(name)? {
            Value::String(s) => E::from_str(s.trim()).ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.push(
                name,
                format!("Must be one of: {}", allowed),
                "invalid_enum",
            );
        }
        parsed
    }

    /// RFC 3339 timestamps, or plain `YYYY-MM-DD` dates read as midnight UTC.
    pub fn optional_date(&mut self, name: &str) -> Option<DateTime<Utc>> {
        let parsed = match self.raw(name)? {
            Value::String(s) => {
                let s = s.trim();
                DateTime::parse_from_rfc3339(s)
                    .map(|dt| dt.with_timezone(&Utc))
                    .ok()
                    .or_else(|| {
                        NaiveDate::parse_from_str(s, "%Y-%m-%d")
                            .ok()
                            .and_then(|date| date.and_hms_opt(0, 0, 0))
                            .map(|naive| naive.and_utc())
                    })
            }
            _ => None,
        };
        if parsed.is_none() {
            self.push(
                name,
                "Must be a date (YYYY-MM-DD) or RFC 3339 timestamp",
                "invalid_type",
            );
        }
        parsed
    }
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

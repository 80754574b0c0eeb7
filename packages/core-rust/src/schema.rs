//! Field-level validation of untyped JSON payloads.
//!
//! [`FieldReader`] walks a JSON object one field at a time and records every
//! violation it finds instead of stopping at the first one. Draft types
//! implement [`Validate`] on top of it, so a handler gets either a typed
//! draft or the complete list of problems with the payload.

use std::fmt::Write as _;
use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// One segment of a violation location: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Loc {
    Field(String),
    Index(usize),
}

impl From<&str> for Loc {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<usize> for Loc {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A single problem with an inbound payload.
///
/// Serializes as `{"loc": [...], "msg": "...", "type": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Path from the payload root (`"body"`, `"query"`, `"path"`) to the field.
    pub loc: Vec<Loc>,
    /// Human-readable description of the violation.
    pub msg: String,
    /// Machine-readable violation kind, e.g. `"missing"` or `"enum"`.
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl FieldViolation {
    #[must_use]
    pub fn new(loc: Vec<Loc>, msg: impl Into<String>, kind: &'static str) -> Self {
        Self {
            loc,
            msg: msg.into(),
            kind,
        }
    }
}

/// Non-empty list of violations produced by a failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} invalid field(s)", .violations.len())]
pub struct ValidationErrors {
    violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    /// Wraps a single violation.
    #[must_use]
    pub fn single(violation: FieldViolation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    /// Returns `None` when `violations` is empty.
    #[must_use]
    pub fn from_violations(violations: Vec<FieldViolation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        &self.violations
    }

    #[must_use]
    pub fn into_violations(self) -> Vec<FieldViolation> {
        self.violations
    }

    /// Appends the violations of `other`.
    pub fn merge(&mut self, other: ValidationErrors) {
        self.violations.extend(other.violations);
    }
}

/// Converts an untyped JSON payload into a typed value.
pub trait Validate: Sized {
    /// # Errors
    ///
    /// Returns every field violation found in `payload`.
    fn validate(payload: &Value) -> Result<Self, ValidationErrors>;
}

/// A closed set of string values, such as a status enum.
pub trait Choice: Copy + 'static {
    /// Every accepted value, in declaration order.
    const ALL: &'static [Self];

    /// The wire form of this value.
    fn as_str(self) -> &'static str;

    /// Parses the wire form, returning `None` for values outside the set.
    #[must_use]
    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == raw)
    }

    /// Message used when a value is outside the set: `Input should be 'a', 'b' or 'c'`.
    #[must_use]
    fn expected_message() -> String {
        let mut msg = String::from("Input should be ");
        let count = Self::ALL.len();
        for (i, choice) in Self::ALL.iter().enumerate() {
            if i > 0 {
                msg.push_str(if i + 1 == count { " or " } else { ", " });
            }
            let _ = write!(msg, "'{}'", choice.as_str());
        }
        msg
    }
}

/// Lower bound for a numeric field.
#[derive(Debug, Clone, Copy)]
pub enum Bound {
    /// Strictly greater than.
    Gt(f64),
    /// Greater than or equal to.
    Ge(f64),
}

impl Bound {
    fn admits(self, value: f64) -> bool {
        match self {
            Self::Gt(min) => value > min,
            Self::Ge(min) => value >= min,
        }
    }

    fn violation(self) -> (String, &'static str) {
        match self {
            Self::Gt(min) => (format!("Input should be greater than {min}"), "greater_than"),
            Self::Ge(min) => (
                format!("Input should be greater than or equal to {min}"),
                "greater_than_equal",
            ),
        }
    }
}

/// Accumulating reader over the fields of one JSON object.
///
/// Each accessor returns a usable value even on failure (an empty string,
/// zero, `None`) and records the violation; [`FieldReader::finish`] then
/// discards the partially built value if anything was recorded. A `null`
/// field is treated as absent.
pub struct FieldReader<'a> {
    scope: &'static str,
    fields: Option<&'a Map<String, Value>>,
    violations: Vec<FieldViolation>,
}

impl<'a> FieldReader<'a> {
    /// Starts reading `payload`, which must be a JSON object.
    ///
    /// `scope` becomes the first segment of every violation location.
    #[must_use]
    pub fn new(scope: &'static str, payload: &'a Value) -> Self {
        let mut reader = Self {
            scope,
            fields: payload.as_object(),
            violations: Vec::new(),
        };
        if reader.fields.is_none() {
            reader.violations.push(FieldViolation::new(
                vec![Loc::from(scope)],
                "Input should be a valid dictionary or object",
                "model_attributes_type",
            ));
        }
        reader
    }

    fn lookup(&self, name: &str) -> Option<&'a Value> {
        self.fields
            .and_then(|fields| fields.get(name))
            .filter(|value| !value.is_null())
    }

    fn loc(&self, name: &str) -> Vec<Loc> {
        vec![Loc::from(self.scope), Loc::from(name)]
    }

    fn reject(&mut self, name: &str, msg: impl Into<String>, kind: &'static str) {
        let loc = self.loc(name);
        self.violations.push(FieldViolation::new(loc, msg, kind));
    }

    fn missing(&mut self, name: &str) {
        // A non-object payload was already reported as a whole.
        if self.fields.is_some() {
            self.reject(name, "Field required", "missing");
        }
    }

    fn read_str(&mut self, name: &str, value: &Value, min: usize, max: usize) -> Option<String> {
        let Some(text) = value.as_str() else {
            self.reject(name, "Input should be a valid string", "string_type");
            return None;
        };
        let len = text.chars().count();
        if len < min {
            let unit = if min == 1 { "character" } else { "characters" };
            self.reject(
                name,
                format!("String should have at least {min} {unit}"),
                "string_too_short",
            );
            return None;
        }
        if len > max {
            self.reject(
                name,
                format!("String should have at most {max} characters"),
                "string_too_long",
            );
            return None;
        }
        Some(text.to_string())
    }

    /// A required string whose length in characters lies in `min..=max`.
    pub fn required_str(&mut self, name: &str, min: usize, max: usize) -> String {
        match self.lookup(name) {
            Some(value) => self.read_str(name, value, min, max).unwrap_or_default(),
            None => {
                self.missing(name);
                String::new()
            }
        }
    }

    /// An optional string of at most `max` characters.
    pub fn optional_str(&mut self, name: &str, max: usize) -> Option<String> {
        self.optional_str_within(name, 0, max)
    }

    /// An optional string whose length, when present, lies in `min..=max`.
    pub fn optional_str_within(&mut self, name: &str, min: usize, max: usize) -> Option<String> {
        let value = self.lookup(name)?;
        self.read_str(name, value, min, max)
    }

    /// An optional list of strings; absent means empty.
    pub fn str_list(&mut self, name: &str) -> Vec<String> {
        let Some(value) = self.lookup(name) else {
            return Vec::new();
        };
        let Some(items) = value.as_array() else {
            self.reject(name, "Input should be a valid list", "list_type");
            return Vec::new();
        };
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(text) => out.push(text.to_string()),
                None => self.violations.push(FieldViolation::new(
                    vec![Loc::from(self.scope), Loc::from(name), Loc::from(index)],
                    "Input should be a valid string",
                    "string_type",
                )),
            }
        }
        out
    }

    /// An optional value from a closed set.
    pub fn choice<E: Choice>(&mut self, name: &str) -> Option<E> {
        let value = self.lookup(name)?;
        let parsed = value.as_str().and_then(E::parse);
        if parsed.is_none() {
            self.reject(name, E::expected_message(), "enum");
        }
        parsed
    }

    fn read_int(&mut self, name: &str, value: &Value) -> Option<i64> {
        if let Some(int) = value.as_i64() {
            return Some(int);
        }
        match value.as_f64() {
            #[allow(clippy::cast_possible_truncation)]
            Some(float) if float.fract() == 0.0 && float.abs() < 9.0e15 => Some(float as i64),
            Some(float) if float.fract() == 0.0 => {
                self.reject(
                    name,
                    "Input should be a valid integer, number too large",
                    "int_parsing_size",
                );
                None
            }
            Some(_) => {
                self.reject(
                    name,
                    "Input should be a valid integer, got a number with a fractional part",
                    "int_from_float",
                );
                None
            }
            None => {
                self.reject(name, "Input should be a valid integer", "int_type");
                None
            }
        }
    }

    fn read_bounded_int(&mut self, name: &str, value: &Value, bound: Bound) -> Option<i64> {
        let int = self.read_int(name, value)?;
        #[allow(clippy::cast_precision_loss)]
        let admitted = bound.admits(int as f64);
        if admitted {
            Some(int)
        } else {
            let (msg, kind) = bound.violation();
            self.reject(name, msg, kind);
            None
        }
    }

    /// A required non-negative integer, typically a reference to another record.
    pub fn required_id(&mut self, name: &str) -> u64 {
        let Some(value) = self.lookup(name) else {
            self.missing(name);
            return 0;
        };
        self.read_bounded_int(name, value, Bound::Ge(0.0))
            .and_then(|int| u64::try_from(int).ok())
            .unwrap_or_default()
    }

    /// An optional non-negative integer.
    pub fn optional_id(&mut self, name: &str) -> Option<u64> {
        let value = self.lookup(name)?;
        self.read_bounded_int(name, value, Bound::Ge(0.0))
            .and_then(|int| u64::try_from(int).ok())
    }

    /// A required integer strictly greater than zero.
    pub fn positive_int(&mut self, name: &str) -> u32 {
        let Some(value) = self.lookup(name) else {
            self.missing(name);
            return 0;
        };
        let Some(int) = self.read_bounded_int(name, value, Bound::Gt(0.0)) else {
            return 0;
        };
        u32::try_from(int).unwrap_or_else(|_| {
            self.reject(
                name,
                format!("Input should be less than or equal to {}", u32::MAX),
                "less_than_equal",
            );
            0
        })
    }

    /// An optional integer with a default.
    pub fn int_or(&mut self, name: &str, default: i64) -> i64 {
        match self.lookup(name) {
            Some(value) => self.read_int(name, value).unwrap_or(default),
            None => default,
        }
    }

    fn read_number(&mut self, name: &str, value: &Value, bound: Bound) -> Option<f64> {
        let Some(number) = value.as_f64() else {
            self.reject(name, "Input should be a valid number", "float_type");
            return None;
        };
        if bound.admits(number) {
            Some(number)
        } else {
            let (msg, kind) = bound.violation();
            self.reject(name, msg, kind);
            None
        }
    }

    /// A required number satisfying `bound`.
    pub fn required_number(&mut self, name: &str, bound: Bound) -> f64 {
        match self.lookup(name) {
            Some(value) => self.read_number(name, value, bound).unwrap_or_default(),
            None => {
                self.missing(name);
                0.0
            }
        }
    }

    /// An optional number satisfying `bound`.
    pub fn optional_number(&mut self, name: &str, bound: Bound) -> Option<f64> {
        let value = self.lookup(name)?;
        self.read_number(name, value, bound)
    }

    /// An optional boolean with a default.
    pub fn bool_or(&mut self, name: &str, default: bool) -> bool {
        let Some(value) = self.lookup(name) else {
            return default;
        };
        value.as_bool().unwrap_or_else(|| {
            self.reject(name, "Input should be a valid boolean", "bool_type");
            default
        })
    }

    /// An optional date-time: RFC 3339, or a naive timestamp taken as UTC.
    pub fn optional_datetime(&mut self, name: &str) -> Option<DateTime<Utc>> {
        let value = self.lookup(name)?;
        let Some(text) = value.as_str() else {
            self.reject(name, "Input should be a valid datetime", "datetime_type");
            return None;
        };
        let parsed = parse_datetime(text);
        if parsed.is_none() {
            self.reject(
                name,
                "Input should be a valid datetime, invalid date-time format",
                "datetime_parsing",
            );
        }
        parsed
    }

    /// An optional e-mail address.
    pub fn optional_email(&mut self, name: &str) -> Option<String> {
        let address = self.optional_str(name, 254)?;
        if EMAIL_PATTERN.is_match(&address) {
            Some(address)
        } else {
            self.reject(name, "value is not a valid email address", "value_error");
            None
        }
    }

    /// Returns `value` if no violation was recorded.
    ///
    /// # Errors
    ///
    /// Returns all recorded violations otherwise.
    pub fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        match ValidationErrors::from_violations(self.violations) {
            Some(errors) => Err(errors),
            None => Ok(value),
        }
    }
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

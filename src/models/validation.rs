//! Field-level validation errors shared by the record schemas.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// One raw input field as it arrived in a JSON body. Never fails to
/// deserialize: a wrong JSON type is kept as `Mistyped` for the collector.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T> {
    Absent,
    Null,
    Mistyped(String),
    Value(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Absent
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Value(value)
    }
}

impl<T> Field<T> {
    /// `self` unless the key was missing, in which case `fallback`.
    pub fn or(self, fallback: Field<T>) -> Field<T> {
        match self {
            Field::Absent => fallback,
            supplied => supplied,
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Field<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        if raw.is_null() {
            return Ok(Field::Null);
        }
        Ok(match serde_json::from_value(raw) {
            Ok(value) => Field::Value(value),
            Err(e) => Field::Mistyped(e.to_string()),
        })
    }
}

/// One violated constraint on one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// Every constraint a payload violated, in field declaration order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} field(s) failed validation: {}", .violations.len(), summary(.violations))]
pub struct ValidationError {
    pub violations: Vec<FieldViolation>,
}

fn summary(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn has_field(&self, field: &str) -> bool {
        self.violations.iter().any(|v| v.field == field)
    }
}

/// Accumulates violations while a schema checks its fields, so a single
/// response can report all of them at once.
#[derive(Debug, Default)]
pub struct Violations(Vec<FieldViolation>);

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldViolation {
            field,
            message: message.into(),
        });
    }

    /// Take a required value, recording why when there is none.
    pub fn required<T>(&mut self, field: &'static str, value: Field<T>) -> Option<T> {
        match value {
            Field::Value(v) => Some(v),
            Field::Absent => {
                self.push(field, "field required");
                None
            }
            Field::Null => {
                self.push(field, "must not be null");
                None
            }
            Field::Mistyped(reason) => {
                self.push(field, reason);
                None
            }
        }
    }

    /// Optional value: missing and `null` both mean "not given".
    pub fn optional<T>(&mut self, field: &'static str, value: Field<T>) -> Option<T> {
        match value {
            Field::Absent | Field::Null => None,
            given => self.required(field, given),
        }
    }

    /// Required string that must contain something besides whitespace.
    pub fn non_blank(&mut self, field: &'static str, value: Field<String>) -> Option<String> {
        match self.required(field, value) {
            Some(s) if s.trim().is_empty() => {
                self.push(field, "must not be blank");
                None
            }
            other => other,
        }
    }

    /// Required float that must be finite and strictly positive.
    pub fn positive(&mut self, field: &'static str, value: Field<f64>) -> Option<f64> {
        match self.required(field, value) {
            Some(v) if !v.is_finite() || v <= 0.0 => {
                self.push(field, "must be greater than 0");
                None
            }
            other => other,
        }
    }

    /// Required integer within the open interval `(low, high)`.
    pub fn between(
        &mut self,
        field: &'static str,
        value: Field<i64>,
        low: i64,
        high: i64,
    ) -> Option<i64> {
        match self.required(field, value) {
            Some(v) if v <= low || v >= high => {
                self.push(field, format!("must be greater than {low} and less than {high}"));
                None
            }
            other => other,
        }
    }

    /// Required string parsed into an enum; the message lists accepted values.
    pub fn parse_enum<T: std::str::FromStr>(
        &mut self,
        field: &'static str,
        value: Field<String>,
        accepted: &[&str],
    ) -> Option<T> {
        let raw = self.required(field, value)?;
        match raw.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                self.push(
                    field,
                    format!("'{raw}' is not one of: {}", accepted.join(", ")),
                );
                None
            }
        }
    }

    /// `Ok(())` when nothing was recorded.
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { violations: self.0 })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collector_finishes_ok() {
        assert!(Violations::new().finish().is_ok());
    }

    #[test]
    fn collects_every_violation() {
        let mut v = Violations::new();
        assert!(v.required::<i64>("age", Field::Absent).is_none());
        assert!(v.non_blank("name", Field::Value("   ".into())).is_none());
        assert!(v.positive("height", Field::Value(0.0)).is_none());
        assert!(v.positive("weight", Field::Value(f64::NAN)).is_none());
        assert!(v.between("age", Field::Value(120), 0, 120).is_none());

        let err = v.finish().unwrap_err();
        assert_eq!(err.violations.len(), 5);
        assert!(err.has_field("name"));
        assert!(err.has_field("weight"));
        assert!(err.to_string().starts_with("5 field(s) failed validation"));
    }

    #[test]
    fn between_is_exclusive_on_both_ends() {
        let mut v = Violations::new();
        assert_eq!(v.between("age", Field::Value(1), 0, 120), Some(1));
        assert_eq!(v.between("age", Field::Value(119), 0, 120), Some(119));
        assert!(v.between("age", Field::Value(0), 0, 120).is_none());
        assert_eq!(v.finish().unwrap_err().violations.len(), 1);
    }

    #[test]
    fn parse_enum_lists_accepted_values() {
        let mut v = Violations::new();
        let parsed: Option<u8> = v.parse_enum("tier", Field::Value("x".into()), &["1", "2"]);
        assert!(parsed.is_none());
        let err = v.finish().unwrap_err();
        assert_eq!(err.violations[0].message, "'x' is not one of: 1, 2");
    }

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        age: Field<i64>,
        #[serde(default)]
        name: Field<String>,
        #[serde(default)]
        city: Field<String>,
    }

    #[test]
    fn field_keeps_missing_null_and_mistyped_apart() {
        let body: Body = serde_json::from_str(r#"{"age": "forty", "name": null}"#).unwrap();
        assert!(matches!(body.age, Field::Mistyped(_)));
        assert_eq!(body.name, Field::Null);
        assert_eq!(body.city, Field::Absent);

        let mut v = Violations::new();
        v.required("age", body.age);
        v.required("name", body.name);
        v.required("city", body.city);
        let err = v.finish().unwrap_err();
        assert!(err.violations[0].message.contains("expected i64"));
        assert_eq!(err.violations[1].message, "must not be null");
        assert_eq!(err.violations[2].message, "field required");
    }

    #[test]
    fn optional_accepts_missing_and_null() {
        let mut v = Violations::new();
        assert_eq!(v.optional::<bool>("smoker", Field::Absent), None);
        assert_eq!(v.optional::<bool>("smoker", Field::Null), None);
        assert_eq!(v.optional("smoker", Field::Value(true)), Some(true));
        assert!(v.finish().is_ok());

        let mut v = Violations::new();
        assert_eq!(v.optional::<bool>("smoker", Field::Mistyped("bad".into())), None);
        assert!(v.finish().unwrap_err().has_field("smoker"));
    }

    #[test]
    fn supplied_field_wins_over_fallback() {
        assert_eq!(Field::Value(2).or(Field::Value(1)), Field::Value(2));
        assert_eq!(Field::Null.or(Field::Value(1)), Field::Null);
        assert_eq!(Field::Absent.or(Field::Value(1)), Field::Value(1));
    }
}

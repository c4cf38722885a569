#![forbid(unsafe_code)]

//! Structural validation of upstream payloads.
//!
//! A [`Shape`] declares what a response must look like. Validation only
//! inspects: it never coerces a value, never fills a default, and reports the
//! first offending field by its dotted path. Object fields not named by the
//! shape are ignored.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("schema mismatch at `{path}`: expected {expected}, found {found}")]
pub struct SchemaMismatch {
    pub path: String,
    pub expected: String,
    pub found: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    String,
    OneOf(Vec<&'static str>),
    Object(Vec<FieldShape>),
    /// JSON object with arbitrary keys whose values all match the inner shape.
    Record(Box<Shape>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldShape {
    pub name: &'static str,
    pub shape: Shape,
    pub required: bool,
}

impl Shape {
    pub fn object(fields: impl IntoIterator<Item = FieldShape>) -> Self {
        Self::Object(fields.into_iter().collect())
    }

    pub fn record(values: Shape) -> Self {
        Self::Record(Box::new(values))
    }

    /// `{ "items": { <id>: values } }`
    pub fn items(values: Shape) -> Self {
        Self::object([required("items", Self::record(values))])
    }

    fn describe(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::OneOf(allowed) => format!("one of [{}]", allowed.join(", ")),
            Self::Object(_) | Self::Record(_) => "object".to_string(),
        }
    }
}

pub fn required(name: &'static str, shape: Shape) -> FieldShape {
    FieldShape {
        name,
        shape,
        required: true,
    }
}

/// Absent is accepted; an explicit `null` is not.
pub fn optional(name: &'static str, shape: Shape) -> FieldShape {
    FieldShape {
        name,
        shape,
        required: false,
    }
}

pub fn validate(payload: &Value, shape: &Shape) -> Result<(), SchemaMismatch> {
    validate_at(payload, shape, "$")
}

fn validate_at(value: &Value, shape: &Shape, path: &str) -> Result<(), SchemaMismatch> {
    match (shape, value) {
        (Shape::String, Value::String(_)) => Ok(()),
        (Shape::OneOf(allowed), Value::String(s)) if allowed.iter().any(|a| *a == s.as_str()) => {
            Ok(())
        }
        (Shape::OneOf(_), Value::String(_)) => Err(mismatch(path, shape, "unlisted string")),
        (Shape::Object(fields), Value::Object(map)) => {
            for field in fields {
                let field_path = child_path(path, field.name);
                match map.get(field.name) {
                    Some(inner) => validate_at(inner, &field.shape, &field_path)?,
                    None if field.required => {
                        return Err(mismatch(&field_path, &field.shape, "missing"));
                    }
                    None => {}
                }
            }
            Ok(())
        }
        (Shape::Record(values), Value::Object(map)) => {
            for (key, inner) in map {
                validate_at(inner, values, &child_path(path, key))?;
            }
            Ok(())
        }
        _ => Err(mismatch(path, shape, json_kind(value))),
    }
}

fn child_path(parent: &str, segment: &str) -> String {
    if parent == "$" {
        segment.to_string()
    } else {
        format!("{parent}.{segment}")
    }
}

fn mismatch(path: &str, shape: &Shape, found: &'static str) -> SchemaMismatch {
    SchemaMismatch {
        path: path.to_string(),
        expected: shape.describe(),
        found,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

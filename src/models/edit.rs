use serde::Deserialize;

use crate::error::AppError;

/// A single field edit on an assignment, already coerced from user input.
#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentEdit {
    Name(String),
    Grade(f64),
    Weight(f64),
}

impl AssignmentEdit {
    /// Builds an edit from a raw `(field, value)` pair as an input form sends
    /// it. Numeric fields keep their leading number, or become `0`.
    pub fn from_field(field: &str, value: &str) -> Result<Self, AppError> {
        match field {
            "name" => Ok(AssignmentEdit::Name(value.to_string())),
            "grade" => Ok(AssignmentEdit::Grade(parse_number(value))),
            "weight" => Ok(AssignmentEdit::Weight(parse_number(value))),
            other => Err(AppError::BadRequest(format!("Unknown assignment field: {}", other))),
        }
    }

    pub fn apply(&self, assignment: &mut crate::models::Assignment) {
        match self {
            AssignmentEdit::Name(name) => assignment.name = name.clone(),
            AssignmentEdit::Grade(grade) => assignment.grade = *grade,
            AssignmentEdit::Weight(weight) => assignment.weight = *weight,
        }
    }
}

/// Reads the longest leading decimal number, so `"85%"` is 85. Anything
/// without one, or out of range, is 0.
fn parse_number(raw: &str) -> f64 {
    let text = raw.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |start: usize| {
        bytes[start.min(bytes.len())..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    end += digits_from(end);
    if bytes.get(end) == Some(&b'.') {
        end += 1 + digits_from(end + 1);
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exponent = end + 1;
        if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
            exponent += 1;
        }
        let count = digits_from(exponent);
        if count > 0 {
            end = exponent + count;
        }
    }

    text[..end]
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentEditRequest {
    pub field: String,
    pub value: serde_json::Value,
}

impl AssignmentEditRequest {
    pub fn into_edit(self) -> Result<AssignmentEdit, AppError> {
        let raw = match self.value {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        AssignmentEdit::from_field(&self.field, &raw)
    }
}

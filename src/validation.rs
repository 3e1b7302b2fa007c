// validation.rs - Request body shape checks for drink create/update
//
// Both entry points walk a raw JSON value and collect every defect they find.
// Nothing short-circuits: the caller receives the complete list in a fixed
// order (title, recipe, then each recipe element's color/name/parts).

use serde::Serialize;
use serde_json::{Map, Value};

/// Why a single attribute was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    AttributeRequired,
    InvalidType,
}

/// One invalid or missing attribute in a request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub attribute: String,
    #[serde(rename = "type")]
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    fn required(attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        let message = format!("The attribute \"{}\" is required.", attribute);
        Self {
            attribute,
            kind: FieldErrorKind::AttributeRequired,
            message,
        }
    }

    fn invalid_type(attribute: impl Into<String>, expected: Expected) -> Self {
        let attribute = attribute.into();
        let message = format!("Expected \"{}\" to be {}.", attribute, expected.describe());
        Self {
            attribute,
            kind: FieldErrorKind::InvalidType,
            message,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Expected {
    String,
    Integer,
    ObjectArray,
}

impl Expected {
    fn describe(self) -> &'static str {
        match self {
            Expected::String => "a string",
            Expected::Integer => "an integer",
            Expected::ObjectArray => "an array of objects",
        }
    }

    fn matches(self, value: &Value) -> bool {
        match self {
            Expected::String => value.is_string(),
            // i64 only: floats, booleans and out-of-range numbers are rejected
            Expected::Integer => value.as_i64().is_some(),
            Expected::ObjectArray => value.is_array(),
        }
    }
}

/// Validate a POST /drinks body. `title` and `recipe` are required.
pub fn validate_create(input: &Value) -> Vec<FieldError> {
    validate(input, true)
}

/// Validate a PATCH /drinks/:id body. Top-level fields are optional, but a
/// supplied recipe must be complete.
pub fn validate_update(input: &Value) -> Vec<FieldError> {
    validate(input, false)
}

fn validate(input: &Value, top_level_required: bool) -> Vec<FieldError> {
    let empty = Map::new();
    let fields = input.as_object().unwrap_or(&empty);
    let mut errors = Vec::new();

    check_field(fields, "title", "title", Expected::String, top_level_required, &mut errors);

    let recipe_ok = check_field(
        fields,
        "recipe",
        "recipe",
        Expected::ObjectArray,
        top_level_required,
        &mut errors,
    );
    if recipe_ok {
        if let Some(Value::Array(items)) = fields.get("recipe") {
            for (index, item) in items.iter().enumerate() {
                validate_ingredient(index, item, &mut errors);
            }
        }
    }

    errors
}

fn validate_ingredient(index: usize, item: &Value, errors: &mut Vec<FieldError>) {
    // A non-object element carries none of the attributes
    let empty = Map::new();
    let fields = item.as_object().unwrap_or(&empty);

    for (key, expected) in [
        ("color", Expected::String),
        ("name", Expected::String),
        ("parts", Expected::Integer),
    ] {
        let path = format!("recipe[{}].{}", index, key);
        check_field(fields, key, &path, expected, true, errors);
    }
}

/// Returns true when the field is present and well-typed.
fn check_field(
    fields: &Map<String, Value>,
    key: &str,
    path: &str,
    expected: Expected,
    required: bool,
    errors: &mut Vec<FieldError>,
) -> bool {
    match fields.get(key) {
        None => {
            if required {
                errors.push(FieldError::required(path));
            }
            false
        }
        Some(value) if !expected.matches(value) => {
            errors.push(FieldError::invalid_type(path, expected));
            false
        }
        Some(_) => true,
    }
}

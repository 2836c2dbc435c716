//! # Entity Schemas and the Field-Mapping Layer
//!
//! Documents are loosely typed JSON objects, and the same logical field has
//! historically been spelled several ways (`agentId`, `agent_id`, `agent`).
//! Each collection declares an [`EntitySchema`] once; every handler goes
//! through [`normalize_input`] on the way in and [`shape_output`] on the way
//! out, so alias fallbacks and default filling live in exactly one place.
//!
//! ## Input pipeline
//!
//! ```text
//! body ─► object check ─► fold aliases ─► strip system/read-only fields
//!      ─► trim strings ─► coerce numbers ─► check choices ─► check formats
//! ```
//!
//! When a body carries both the canonical spelling and an alias, the
//! canonical value wins and the alias is dropped.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::temporal::parse_date;

/// Fields the store owns. Clients can never write them.
pub const SYSTEM_FIELDS: &[&str] = &["_id", "id", "createdAt", "updatedAt", "isActive", "deletedAt"];

/// What DELETE does for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Remove the document; later reads return 404.
    Hard,
    /// Flag the document inactive; reads by id still succeed and default
    /// list queries hide it.
    Soft,
}

impl DeletePolicy {
    /// Label used in responses and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hard => "hard",
            Self::Soft => "soft",
        }
    }
}

/// Alternative spellings of one canonical field.
#[derive(Debug)]
pub struct Alias {
    /// Name the API reads and writes.
    pub canonical: &'static str,
    /// Legacy spellings folded onto `canonical`, in priority order.
    pub alternates: &'static [&'static str],
}

/// A field restricted to a fixed set of lowercase labels.
#[derive(Debug)]
pub struct Choice {
    /// Canonical field name.
    pub field: &'static str,
    /// Allowed labels, lowercase.
    pub allowed: &'static [&'static str],
}

/// Value filled into responses when a field is absent.
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    /// A string.
    Str(&'static str),
    /// An integer.
    Int(i64),
    /// A boolean.
    Bool(bool),
    /// `[]`.
    EmptyArray,
    /// `{}`.
    EmptyObject,
}

impl DefaultValue {
    /// Materialize as JSON.
    pub fn to_value(self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.to_string()),
            Self::Int(i) => Value::from(i),
            Self::Bool(b) => Value::Bool(b),
            Self::EmptyArray => Value::Array(Vec::new()),
            Self::EmptyObject => Value::Object(Map::new()),
        }
    }
}

/// Format constraint applied to a string field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldFormat {
    /// Three ASCII letters, stored upper-case.
    IataCode,
    /// Calendar date, stored as `YYYY-MM-DD`.
    Date,
}

/// Declarative description of one collection.
#[derive(Debug)]
pub struct EntitySchema {
    /// Collection name in the store.
    pub name: &'static str,
    /// URL segment under `/api/`.
    pub path: &'static str,
    /// Singular noun for messages ("agent", "license").
    pub label: &'static str,
    /// Fields that must be present and non-blank on create.
    pub required: &'static [&'static str],
    /// Alias folding rules.
    pub aliases: &'static [Alias],
    /// Fields coerced to JSON numbers.
    pub numeric: &'static [&'static str],
    /// Fields restricted to fixed labels.
    pub enums: &'static [Choice],
    /// Format-checked fields.
    pub formats: &'static [(&'static str, FieldFormat)],
    /// Fields unique (case-insensitively) among live documents.
    pub unique: &'static [&'static str],
    /// Response defaults for absent fields.
    pub defaults: &'static [(&'static str, DefaultValue)],
    /// Fields matched by free-text search.
    pub search_fields: &'static [&'static str],
    /// Fields usable as exact-match list filters.
    pub filters: &'static [&'static str],
    /// Derived fields computed server-side and stripped from input.
    pub read_only: &'static [&'static str],
    /// DELETE behavior.
    pub delete: DeletePolicy,
}

impl EntitySchema {
    /// Whether DELETE only flags the document.
    pub fn soft_delete(&self) -> bool {
        self.delete == DeletePolicy::Soft
    }

    /// Resolve a field name through the alias table.
    pub fn canonical_name<'a>(&self, field: &'a str) -> &'a str {
        self.aliases
            .iter()
            .find(|a| a.alternates.contains(&field))
            .map(|a| a.canonical)
            .unwrap_or(field)
    }

    /// Every spelling under which `canonical` may be stored.
    pub fn spellings<'a>(&self, canonical: &'a str) -> Vec<&'a str> {
        let mut names = vec![canonical];
        if let Some(alias) = self.aliases.iter().find(|a| a.canonical == canonical) {
            names.extend_from_slice(alias.alternates);
        }
        names
    }
}

/// Whether a value counts as "not provided".
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// Read a string field.
pub fn get_str<'a>(doc: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
    doc.get(field).and_then(Value::as_str)
}

/// Read the first present string among several spellings.
pub fn get_str_any<'a>(doc: &'a Map<String, Value>, fields: &[&str]) -> Option<&'a str> {
    fields
        .iter()
        .find_map(|f| get_str(doc, f).filter(|s| !s.trim().is_empty()))
}

/// Comparison key for uniqueness checks: trimmed and lower-cased.
pub fn unique_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_lowercase()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Fold alias spellings onto canonical names, in place.
pub fn fold_aliases(schema: &EntitySchema, doc: &mut Map<String, Value>) {
    for alias in schema.aliases {
        for alternate in alias.alternates {
            if let Some(value) = doc.remove(*alternate) {
                let canonical_missing = doc.get(alias.canonical).map_or(true, Value::is_null);
                if canonical_missing && !value.is_null() {
                    doc.insert(alias.canonical.to_string(), value);
                }
            }
        }
    }
}

/// Normalize a client-supplied body for `schema`.
///
/// # Errors
///
/// Returns the first [`ValidationError`] hit: non-object body, non-numeric
/// value in a numeric field, unknown choice label, or a malformed IATA code
/// or date.
pub fn normalize_input(
    schema: &EntitySchema,
    body: Value,
) -> Result<Map<String, Value>, ValidationError> {
    let Value::Object(mut doc) = body else {
        return Err(ValidationError::NotAnObject);
    };

    fold_aliases(schema, &mut doc);

    for field in SYSTEM_FIELDS.iter().chain(schema.read_only) {
        doc.remove(*field);
    }

    for value in doc.values_mut() {
        if let Value::String(s) = value {
            let trimmed = s.trim();
            if trimmed.len() != s.len() {
                *s = trimmed.to_string();
            }
        }
    }

    for field in schema.numeric {
        if let Some(value) = doc.get_mut(*field) {
            *value = coerce_number(field, value)?;
        }
    }

    for choice in schema.enums {
        if let Some(value) = doc.get_mut(choice.field) {
            if value.is_null() {
                continue;
            }
            let Some(label) = value.as_str() else {
                return Err(ValidationError::WrongType {
                    field: choice.field.to_string(),
                    expected: "a string",
                });
            };
            let label = label.trim().to_lowercase();
            if !choice.allowed.contains(&label.as_str()) {
                return Err(ValidationError::InvalidChoice {
                    field: choice.field.to_string(),
                    value: label,
                    allowed: choice.allowed.join(", "),
                });
            }
            *value = Value::String(label);
        }
    }

    for (field, format) in schema.formats {
        if let Some(value) = doc.get_mut(*field) {
            if is_blank(value) {
                continue;
            }
            *value = apply_format(field, *format, value)?;
        }
    }

    Ok(doc)
}

fn coerce_number(field: &str, value: &Value) -> Result<Value, ValidationError> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Number(_) => match crate::money::parse_amount(value) {
            Some(_) => Ok(value.clone()),
            None => Err(ValidationError::AmountOutOfRange {
                field: field.to_string(),
            }),
        },
        Value::String(s) if s.trim().is_empty() => Ok(Value::Null),
        other => crate::money::parse_amount(other)
            .map(crate::money::to_json_exact)
            .ok_or_else(|| ValidationError::NotANumber {
                field: field.to_string(),
                value: other.to_string(),
            }),
    }
}

fn apply_format(field: &str, format: FieldFormat, value: &Value) -> Result<Value, ValidationError> {
    let Some(raw) = value.as_str() else {
        return Err(ValidationError::WrongType {
            field: field.to_string(),
            expected: "a string",
        });
    };
    match format {
        FieldFormat::IataCode => {
            let code = raw.trim().to_ascii_uppercase();
            if code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase()) {
                Ok(Value::String(code))
            } else {
                Err(ValidationError::InvalidIataCode(raw.to_string()))
            }
        }
        FieldFormat::Date => parse_date(raw)
            .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
            .ok_or_else(|| ValidationError::InvalidDate {
                field: field.to_string(),
                value: raw.to_string(),
            }),
    }
}

/// Check that every required field is present and non-blank.
///
/// Numeric zero counts as present.
pub fn check_required(schema: &EntitySchema, doc: &Map<String, Value>) -> Result<(), ValidationError> {
    for field in schema.required {
        match doc.get(*field) {
            Some(v) if !is_blank(v) => {}
            _ => {
                return Err(ValidationError::MissingField {
                    field: field.to_string(),
                })
            }
        }
    }
    Ok(())
}

/// On partial updates, required fields may be omitted but not blanked.
pub fn check_not_blanked(
    schema: &EntitySchema,
    patch: &Map<String, Value>,
) -> Result<(), ValidationError> {
    for field in schema.required {
        if patch.get(*field).is_some_and(is_blank) {
            return Err(ValidationError::MissingField {
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

/// Reshape a stored document for the client: `_id` becomes `id`, legacy
/// aliases are folded and defaults are filled.
pub fn shape_output(schema: &EntitySchema, stored: &Map<String, Value>) -> Value {
    let mut doc = stored.clone();
    fold_aliases(schema, &mut doc);

    if let Some(id) = doc.remove("_id") {
        doc.insert("id".to_string(), id);
    }

    for (field, default) in schema.defaults {
        let missing = doc.get(*field).map_or(true, Value::is_null);
        if missing {
            doc.insert(field.to_string(), default.to_value());
        }
    }

    if schema.soft_delete() && !doc.contains_key("isActive") {
        doc.insert("isActive".to_string(), Value::Bool(true));
    }

    Value::Object(doc)
}

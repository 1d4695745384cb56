use std::sync::Arc;

use chrono::NaiveDate;
use oci_digest::{AlgorithmRegistry, Digest};
use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationResult};
use crate::record::Record;
use crate::schema::{AttributeSchema, RecordFactory, ScalarType, ValueType};

/// A value held by a record attribute, already checked against its schema.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Boolean(bool),
    /// The original timestamp text.
    DateTime(String),
    Digest(Digest),
    Mapping(Map<String, Value>),
    List(Vec<FieldValue>),
    Record(Box<Record>),
    Records(Vec<Record>),
}

impl FieldValue {
    /// Absent-equivalent values: empty strings, mappings, and sequences.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::String(s) | Self::DateTime(s) => s.is_empty(),
            Self::Mapping(m) => m.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Records(items) => items.is_empty(),
            Self::Record(r) => r.is_empty(),
            Self::Integer(_) | Self::Boolean(_) | Self::Digest(_) => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::DateTime(s) => Some(s),
            Self::Digest(d) => Some(d.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_digest(&self) -> Option<&Digest> {
        match self {
            Self::Digest(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_records(&self) -> Option<&[Record]> {
        match self {
            Self::Records(items) => Some(items),
            _ => None,
        }
    }

    /// JSON projection. Nested records are projected without re-validation.
    pub(crate) fn to_json(&self) -> Value {
        match self {
            Self::String(s) | Self::DateTime(s) => Value::String(s.clone()),
            Self::Integer(n) => Value::from(*n),
            Self::Boolean(b) => Value::Bool(*b),
            Self::Digest(d) => Value::String(d.to_string()),
            Self::Mapping(m) => Value::Object(m.clone()),
            Self::List(items) => Value::Array(items.iter().map(FieldValue::to_json).collect()),
            Self::Record(r) => Value::Object(r.project()),
            Self::Records(items) => {
                Value::Array(items.iter().map(|r| Value::Object(r.project())).collect())
            }
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Boolean(_) => "boolean",
            Self::DateTime(_) => "datetime",
            Self::Digest(_) => "digest",
            Self::Mapping(_) => "mapping",
            Self::List(_) => "list",
            Self::Record(_) => "record",
            Self::Records(_) => "list of records",
        }
    }
}

/// Input accepted by [`Record::set`] and [`Record::add`]: raw JSON, or
/// already-built child records.
#[derive(Clone, Debug)]
pub enum FieldInput {
    Json(Value),
    Record(Record),
    Records(Vec<Record>),
}

impl FieldInput {
    pub(crate) fn is_null(&self) -> bool {
        matches!(self, Self::Json(Value::Null))
    }
}

impl From<Value> for FieldInput {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Record> for FieldInput {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<Vec<Record>> for FieldInput {
    fn from(records: Vec<Record>) -> Self {
        Self::Records(records)
    }
}

impl From<&str> for FieldInput {
    fn from(s: &str) -> Self {
        Self::Json(Value::String(s.to_string()))
    }
}

impl From<String> for FieldInput {
    fn from(s: String) -> Self {
        Self::Json(Value::String(s))
    }
}

impl From<i64> for FieldInput {
    fn from(n: i64) -> Self {
        Self::Json(Value::from(n))
    }
}

impl From<i32> for FieldInput {
    fn from(n: i32) -> Self {
        Self::Json(Value::from(n))
    }
}

impl From<u64> for FieldInput {
    fn from(n: u64) -> Self {
        Self::Json(Value::from(n))
    }
}

impl From<bool> for FieldInput {
    fn from(b: bool) -> Self {
        Self::Json(Value::Bool(b))
    }
}

impl From<&Digest> for FieldInput {
    fn from(d: &Digest) -> Self {
        Self::Json(Value::String(d.to_string()))
    }
}

impl From<Digest> for FieldInput {
    fn from(d: Digest) -> Self {
        Self::Json(Value::String(d.into()))
    }
}

impl From<Map<String, Value>> for FieldInput {
    fn from(m: Map<String, Value>) -> Self {
        Self::Json(Value::Object(m))
    }
}

impl From<Vec<String>> for FieldInput {
    fn from(items: Vec<String>) -> Self {
        Self::Json(Value::Array(items.into_iter().map(Value::String).collect()))
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(field: &str, expected: String, found: impl Into<String>) -> ValidationError {
    ValidationError::TypeMismatch {
        field: field.to_string(),
        expected,
        found: found.into(),
    }
}

/// Accepts the date portion of an RFC 3339 timestamp; the time is not checked.
fn is_valid_datetime(s: &str) -> bool {
    let date = s.split('T').next().unwrap_or(s);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

/// The registry digest-typed values are parsed against.
pub(crate) fn registry_of(registry: Option<&Arc<AlgorithmRegistry>>) -> &AlgorithmRegistry {
    registry.map_or(AlgorithmRegistry::standard(), |r| &**r)
}

pub(crate) fn coerce_scalar(
    field: &str,
    scalar: ScalarType,
    value: Value,
    registry: &AlgorithmRegistry,
) -> ValidationResult<FieldValue> {
    match (scalar, value) {
        (ScalarType::String, Value::String(s)) => Ok(FieldValue::String(s)),
        (ScalarType::Integer, Value::Number(n)) => n
            .as_i64()
            .map(FieldValue::Integer)
            .ok_or_else(|| mismatch(field, "integer".into(), format!("number {n}"))),
        (ScalarType::Boolean, Value::Bool(b)) => Ok(FieldValue::Boolean(b)),
        (ScalarType::DateTime, Value::String(s)) => {
            if is_valid_datetime(&s) {
                Ok(FieldValue::DateTime(s))
            } else {
                Err(mismatch(field, "datetime".into(), format!("string {s:?}")))
            }
        }
        (ScalarType::Digest, Value::String(s)) => registry
            .parse(&s)
            .map(FieldValue::Digest)
            .map_err(|source| ValidationError::Digest {
                field: field.to_string(),
                source,
            }),
        (scalar, other) => Err(mismatch(field, scalar.describe().into(), json_kind(&other))),
    }
}

fn coerce_list(
    field: &str,
    item: ScalarType,
    value: Value,
    registry: &AlgorithmRegistry,
) -> ValidationResult<FieldValue> {
    let Value::Array(items) = value else {
        return Err(mismatch(
            field,
            ValueType::List(item).describe(),
            json_kind(&value),
        ));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| coerce_scalar(&format!("{field}[{i}]"), item, v, registry))
        .collect::<ValidationResult<Vec<_>>>()
        .map(FieldValue::List)
}

fn coerce_record(
    field: &str,
    factory: RecordFactory,
    input: FieldInput,
    registry: Option<&Arc<AlgorithmRegistry>>,
) -> ValidationResult<Record> {
    match input {
        FieldInput::Json(Value::Object(map)) => {
            let mut child = factory();
            if let Some(registry) = registry {
                child.set_registry(Arc::clone(registry));
            }
            child
                .load(&Value::Object(map))
                .map_err(|e| e.within(field))?;
            Ok(child)
        }
        FieldInput::Record(record) => {
            let expected = factory();
            if record.kind() != expected.kind() {
                return Err(mismatch(
                    field,
                    format!("{} record", expected.kind()),
                    format!("{} record", record.kind()),
                ));
            }
            Ok(record)
        }
        FieldInput::Json(other) => Err(mismatch(
            field,
            format!("{} record", factory().kind()),
            json_kind(&other),
        )),
        FieldInput::Records(_) => Err(mismatch(
            field,
            format!("{} record", factory().kind()),
            "list of records",
        )),
    }
}

fn coerce_records(
    field: &str,
    factory: RecordFactory,
    input: FieldInput,
    registry: Option<&Arc<AlgorithmRegistry>>,
) -> ValidationResult<Vec<Record>> {
    let elements: Vec<FieldInput> = match input {
        FieldInput::Json(Value::Array(items)) => items.into_iter().map(FieldInput::Json).collect(),
        FieldInput::Records(records) => records.into_iter().map(FieldInput::Record).collect(),
        single => vec![single],
    };
    elements
        .into_iter()
        .enumerate()
        .map(|(i, element)| coerce_record(&format!("{field}[{i}]"), factory, element, registry))
        .collect()
}

/// Convert input into a stored value for `schema`, including the pattern
/// check. A JSON null yields `None`, as does an empty string for a datetime
/// or digest attribute.
pub(crate) fn coerce(
    schema: &AttributeSchema,
    input: FieldInput,
    registry: Option<&Arc<AlgorithmRegistry>>,
) -> ValidationResult<Option<FieldValue>> {
    if input.is_null() {
        return Ok(None);
    }
    let field = schema.name();
    let value = match schema.value_type() {
        ValueType::Record(factory) => {
            FieldValue::Record(Box::new(coerce_record(field, factory, input, registry)?))
        }
        ValueType::RecordList(factory) => {
            FieldValue::Records(coerce_records(field, factory, input, registry)?)
        }
        value_type => {
            let json = match input {
                FieldInput::Json(json) => json,
                FieldInput::Record(_) | FieldInput::Records(_) => {
                    return Err(mismatch(field, value_type.describe(), "record"));
                }
            };
            match value_type {
                ValueType::Mapping => match json {
                    Value::Object(map) => FieldValue::Mapping(map),
                    other => return Err(mismatch(field, "mapping".into(), json_kind(&other))),
                },
                ValueType::List(item) => coerce_list(field, item, json, registry_of(registry))?,
                scalar => match scalar.scalar() {
                    Some(ScalarType::DateTime | ScalarType::Digest) if json.as_str() == Some("") => {
                        return Ok(None);
                    }
                    Some(s) => coerce_scalar(field, s, json, registry_of(registry))?,
                    None => return Err(mismatch(field, scalar.describe(), json_kind(&json))),
                },
            }
        }
    };
    check_pattern(schema, &value)?;
    Ok(Some(value))
}

/// Check every non-empty string leaf reachable without entering a nested
/// record. Empty strings count as absent and are left to the required check.
pub(crate) fn check_pattern(schema: &AttributeSchema, value: &FieldValue) -> ValidationResult<()> {
    let Some(pattern) = schema.pattern() else {
        return Ok(());
    };
    let leaves: Vec<&str> = match value {
        FieldValue::List(items) => items.iter().filter_map(FieldValue::as_str).collect(),
        other => other.as_str().into_iter().collect(),
    };
    for leaf in leaves.into_iter().filter(|l| !l.is_empty()) {
        if !pattern.is_match(leaf) {
            return Err(ValidationError::PatternMismatch {
                field: schema.name().to_string(),
                value: leaf.to_string(),
                pattern: pattern.as_str().to_string(),
            });
        }
    }
    Ok(())
}

/// Re-check that a stored value still has the shape its schema declares.
pub(crate) fn check_shape(schema: &AttributeSchema, value: &FieldValue) -> ValidationResult<()> {
    let matches_scalar = |scalar: ScalarType, v: &FieldValue| {
        matches!(
            (scalar, v),
            (ScalarType::String, FieldValue::String(_))
                | (ScalarType::Integer, FieldValue::Integer(_))
                | (ScalarType::Boolean, FieldValue::Boolean(_))
                | (ScalarType::DateTime, FieldValue::DateTime(_))
                | (ScalarType::Digest, FieldValue::Digest(_))
        )
    };
    let ok = match (schema.value_type(), value) {
        (ValueType::Mapping, FieldValue::Mapping(_)) => true,
        (ValueType::List(item), FieldValue::List(items)) => {
            items.iter().all(|v| matches_scalar(item, v))
        }
        (ValueType::Record(factory), FieldValue::Record(r)) => r.kind() == factory().kind(),
        (ValueType::RecordList(factory), FieldValue::Records(items)) => {
            let kind = factory().kind();
            items.iter().all(|r| r.kind() == kind)
        }
        (value_type, v) => value_type.scalar().is_some_and(|s| matches_scalar(s, v)),
    };
    if ok {
        Ok(())
    } else {
        Err(mismatch(
            schema.name(),
            schema.value_type().describe(),
            value.describe(),
        ))
    }
}

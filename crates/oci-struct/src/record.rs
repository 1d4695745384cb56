use std::fmt;
use std::sync::Arc;

use oci_digest::AlgorithmRegistry;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::LoadOptions;
use crate::error::{ValidationError, ValidationResult};
use crate::schema::{AttributeSchema, ValueType};
use crate::value::{self, FieldInput, FieldValue};

/// Extra whole-record validation run after every per-field check passes.
pub type StructuralCheck = fn(&Record) -> ValidationResult<()>;

#[derive(Clone, Debug)]
struct Field {
    schema: AttributeSchema,
    value: Option<FieldValue>,
}

/// An ordered set of declared, typed attributes and their current values.
///
/// Attributes are declared once, when the defining type builds its empty
/// record. Values arrive through [`set`](Self::set), [`add`](Self::add) or
/// [`load`](Self::load) and leave through [`to_dict`](Self::to_dict) or
/// [`to_json`](Self::to_json), which refuse to emit anything for an invalid
/// record.
///
/// A record owns its nested records. It has no internal locking; share it
/// across threads only behind external synchronization.
///
/// Digest-typed attributes are parsed against the standard algorithm
/// registry unless [`set_registry`](Self::set_registry) names another one;
/// child records loaded from JSON inherit it.
#[derive(Clone)]
pub struct Record {
    kind: &'static str,
    fields: Vec<Field>,
    checks: Vec<StructuralCheck>,
    registry: Option<Arc<AlgorithmRegistry>>,
}

/// Declarative construction of an empty record type.
pub struct RecordBuilder {
    record: Record,
}

impl RecordBuilder {
    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.record.declare(schema);
        self
    }

    pub fn check(mut self, check: StructuralCheck) -> Self {
        self.record.checks.push(check);
        self
    }

    /// Parse digest-typed attributes against `registry`.
    pub fn registry(mut self, registry: Arc<AlgorithmRegistry>) -> Self {
        self.record.set_registry(registry);
        self
    }

    pub fn build(self) -> Record {
        self.record
    }
}

impl Record {
    /// An empty record with no attributes.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            fields: Vec::new(),
            checks: Vec::new(),
            registry: None,
        }
    }

    pub fn builder(kind: &'static str) -> RecordBuilder {
        RecordBuilder {
            record: Self::new(kind),
        }
    }

    /// Register an attribute. Each name may be declared only once.
    pub fn declare(&mut self, schema: AttributeSchema) {
        debug_assert!(
            self.position(schema.name()).is_none(),
            "attribute {} declared twice on {}",
            schema.name(),
            self.kind
        );
        self.fields.push(Field {
            schema,
            value: None,
        });
    }

    /// Register an extra structural check.
    pub fn add_check(&mut self, check: StructuralCheck) {
        self.checks.push(check);
    }

    pub fn set_registry(&mut self, registry: Arc<AlgorithmRegistry>) {
        self.registry = Some(registry);
    }

    /// The registry digest-typed attributes are parsed against.
    pub fn algorithm_registry(&self) -> &AlgorithmRegistry {
        value::registry_of(self.registry.as_ref())
    }

    /// The record type name.
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Declared attributes in declaration order.
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeSchema> {
        self.fields.iter().map(|f| &f.schema)
    }

    pub fn schema(&self, name: &str) -> Option<&AttributeSchema> {
        self.position(name).map(|i| &self.fields[i].schema)
    }

    /// `true` once any attribute holds a value.
    pub fn is_populated(&self) -> bool {
        self.fields.iter().any(|f| f.value.is_some())
    }

    /// `true` if no attribute holds a non-empty value.
    pub fn is_empty(&self) -> bool {
        self.fields
            .iter()
            .all(|f| f.value.as_ref().map_or(true, FieldValue::is_empty))
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.position(name)
            .and_then(|i| self.fields[i].value.as_ref())
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(FieldValue::as_i64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(FieldValue::as_bool)
    }

    pub fn get_digest(&self, name: &str) -> Option<&oci_digest::Digest> {
        self.get(name).and_then(FieldValue::as_digest)
    }

    pub fn get_mapping(&self, name: &str) -> Option<&Map<String, Value>> {
        self.get(name).and_then(FieldValue::as_mapping)
    }

    pub fn get_record(&self, name: &str) -> Option<&Record> {
        self.get(name).and_then(FieldValue::as_record)
    }

    pub fn get_records(&self, name: &str) -> &[Record] {
        self.get(name).and_then(FieldValue::as_records).unwrap_or(&[])
    }

    /// String leaves of a sequence attribute, in order.
    pub fn get_strings(&self, name: &str) -> Vec<&str> {
        self.get(name)
            .and_then(FieldValue::as_list)
            .map(|items| items.iter().filter_map(FieldValue::as_str).collect())
            .unwrap_or_default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.schema.name() == name)
    }

    fn position_by_wire(&self, wire: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.schema.wire_name() == wire)
    }

    fn require_position(&self, name: &str) -> ValidationResult<usize> {
        self.position(name).ok_or_else(|| ValidationError::UnknownField {
            field: name.to_string(),
        })
    }

    /// Replace an attribute's value.
    ///
    /// Raw mappings given to nested-record attributes are loaded into a new
    /// child record; a single child given to a sequence-of-record attribute
    /// becomes a one-element sequence. A JSON null clears the attribute. On
    /// failure the attribute keeps its previous value.
    pub fn set(&mut self, name: &str, input: impl Into<FieldInput>) -> ValidationResult<()> {
        let idx = self.require_position(name)?;
        self.set_at(idx, input.into())
    }

    fn set_at(&mut self, idx: usize, input: FieldInput) -> ValidationResult<()> {
        let value = value::coerce(&self.fields[idx].schema, input, self.registry.as_ref())?;
        self.fields[idx].value = value;
        Ok(())
    }

    /// Merge into a mapping or sequence attribute instead of replacing it.
    ///
    /// Mappings keep existing keys and gain new ones; sequences append a
    /// single element or every element of a sequence. Other attributes
    /// behave as [`set`](Self::set). A JSON null is ignored.
    pub fn add(&mut self, name: &str, input: impl Into<FieldInput>) -> ValidationResult<()> {
        let idx = self.require_position(name)?;
        let input = input.into();
        if input.is_null() {
            return Ok(());
        }
        let schema = &self.fields[idx].schema;
        let registry = self.registry.as_ref();
        let incoming = match (schema.value_type(), input) {
            (ValueType::List(item), FieldInput::Json(single)) if !single.is_array() => {
                let element =
                    value::coerce_scalar(schema.name(), item, single, value::registry_of(registry))?;
                let list = FieldValue::List(vec![element]);
                value::check_pattern(schema, &list)?;
                list
            }
            (_, input) => match value::coerce(schema, input, registry)? {
                Some(v) => v,
                None => return Ok(()),
            },
        };
        let slot = &mut self.fields[idx].value;
        let merged = match (slot.take(), incoming) {
            (Some(FieldValue::Mapping(mut existing)), FieldValue::Mapping(new)) => {
                for (key, val) in new {
                    existing.entry(key).or_insert(val);
                }
                FieldValue::Mapping(existing)
            }
            (Some(FieldValue::List(mut existing)), FieldValue::List(new)) => {
                existing.extend(new);
                FieldValue::List(existing)
            }
            (Some(FieldValue::Records(mut existing)), FieldValue::Records(new)) => {
                existing.extend(new);
                FieldValue::Records(existing)
            }
            (_, incoming) => incoming,
        };
        *slot = Some(merged);
        Ok(())
    }

    /// Clear one attribute.
    pub fn unset(&mut self, name: &str) -> ValidationResult<()> {
        let idx = self.require_position(name)?;
        self.fields[idx].value = None;
        Ok(())
    }

    fn clear_values(&mut self) {
        for field in &mut self.fields {
            field.value = None;
        }
    }

    /// Load an external document keyed by wire names, then validate.
    pub fn load(&mut self, document: &Value) -> ValidationResult<()> {
        self.load_with(document, LoadOptions::default())
    }

    /// Load an external document keyed by wire names.
    ///
    /// Unknown keys are rejected before anything changes. The load replaces
    /// every previous value or, on any failure, leaves the record untouched.
    pub fn load_with(&mut self, document: &Value, options: LoadOptions) -> ValidationResult<()> {
        let Value::Object(map) = document else {
            return Err(ValidationError::NotAnObject {
                found: value::json_kind(document).to_string(),
            });
        };
        if let Some(unknown) = map.keys().find(|k| self.position_by_wire(k).is_none()) {
            tracing::warn!(kind = self.kind, key = %unknown, "rejecting document with unknown key");
            return Err(ValidationError::UnknownField {
                field: unknown.clone(),
            });
        }

        let mut staged = self.clone();
        staged.clear_values();
        for (key, val) in map {
            let idx = staged
                .position_by_wire(key)
                .ok_or_else(|| ValidationError::UnknownField { field: key.clone() })?;
            staged.set_at(idx, FieldInput::Json(val.clone()))?;
        }
        if options.validate {
            staged.validate()?;
        }
        *self = staged;
        tracing::debug!(kind = self.kind, keys = map.len(), "loaded record");
        Ok(())
    }

    /// Check required attributes, re-check stored values, validate nested
    /// records, then run structural checks.
    pub fn validate(&self) -> ValidationResult<()> {
        for field in &self.fields {
            let schema = &field.schema;
            let name = schema.name();
            let value = match &field.value {
                Some(v) if !v.is_empty() => v,
                _ if schema.is_required() => {
                    return Err(ValidationError::RequiredFieldMissing {
                        field: name.to_string(),
                    })
                }
                _ => continue,
            };
            value::check_shape(schema, value)?;
            value::check_pattern(schema, value)?;
            match value {
                FieldValue::Record(child) => child.validate().map_err(|e| e.within(name))?,
                FieldValue::Records(children) => {
                    for (i, child) in children.iter().enumerate() {
                        child
                            .validate()
                            .map_err(|e| e.within(&format!("{name}[{i}]")))?;
                    }
                }
                _ => {}
            }
        }
        for check in &self.checks {
            check(self)?;
        }
        Ok(())
    }

    /// Project to a JSON object keyed by wire names, in declaration order.
    pub fn to_dict(&self) -> ValidationResult<Map<String, Value>> {
        self.validate()?;
        Ok(self.project())
    }

    pub fn to_value(&self) -> ValidationResult<Value> {
        self.to_dict().map(Value::Object)
    }

    /// Pretty-printed JSON with four-space indentation.
    pub fn to_json(&self) -> ValidationResult<String> {
        let dict = self.to_dict()?;
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        dict.serialize(&mut ser)
            .map_err(|e| ValidationError::Serialization(e.to_string()))?;
        String::from_utf8(buf).map_err(|e| ValidationError::Serialization(e.to_string()))
    }

    /// Compact single-line JSON.
    pub fn to_json_compact(&self) -> ValidationResult<String> {
        let dict = self.to_dict()?;
        serde_json::to_string(&dict).map_err(|e| ValidationError::Serialization(e.to_string()))
    }

    /// Projection of an already validated record.
    pub(crate) fn project(&self) -> Map<String, Value> {
        let mut out = Map::new();
        for field in &self.fields {
            let schema = &field.schema;
            if schema.is_hidden() {
                continue;
            }
            let empty = field.value.as_ref().map_or(true, FieldValue::is_empty);
            if empty && schema.omit_when_empty() {
                continue;
            }
            let json = match &field.value {
                Some(v) => v.to_json(),
                None => schema.value_type().zero_value(),
            };
            out.insert(schema.wire_name().to_string(), json);
        }
        out
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(&other.fields)
                .all(|(a, b)| a.schema.name() == b.schema.name() && a.value == b.value)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.kind);
        for field in &self.fields {
            if let Some(v) = &field.value {
                s.field(field.schema.name(), v);
            }
        }
        s.finish()
    }
}

impl Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let dict = self.to_dict().map_err(serde::ser::Error::custom)?;
        dict.serialize(serializer)
    }
}

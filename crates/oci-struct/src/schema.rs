use std::fmt;

use regex::Regex;
use serde_json::{Map, Value};

use crate::record::Record;

/// Constructor for an empty record of a declared nested type.
pub type RecordFactory = fn() -> Record;

/// Element type of a sequence-of-scalar attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Integer,
    Boolean,
    /// RFC 3339 timestamp; only the date portion is checked.
    DateTime,
    /// A content digest string.
    Digest,
}

impl ScalarType {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::DateTime => "datetime",
            Self::Digest => "digest",
        }
    }
}

/// The semantic type of an attribute.
#[derive(Clone, Copy)]
pub enum ValueType {
    String,
    Integer,
    Boolean,
    DateTime,
    Digest,
    /// A JSON object with arbitrary values.
    Mapping,
    /// An ordered sequence of scalars.
    List(ScalarType),
    /// A nested record of the type built by the factory.
    Record(RecordFactory),
    /// An ordered sequence of nested records.
    RecordList(RecordFactory),
}

impl ValueType {
    /// The scalar type for single-valued scalar attributes.
    pub fn scalar(&self) -> Option<ScalarType> {
        match self {
            Self::String => Some(ScalarType::String),
            Self::Integer => Some(ScalarType::Integer),
            Self::Boolean => Some(ScalarType::Boolean),
            Self::DateTime => Some(ScalarType::DateTime),
            Self::Digest => Some(ScalarType::Digest),
            _ => None,
        }
    }

    /// Whether values of this type carry string leaves a pattern can check.
    pub fn is_string_like(&self) -> bool {
        match self {
            Self::String | Self::DateTime | Self::Digest => true,
            Self::List(item) => matches!(
                item,
                ScalarType::String | ScalarType::DateTime | ScalarType::Digest
            ),
            _ => false,
        }
    }

    /// Human-readable type description used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Mapping => "mapping".to_string(),
            Self::List(item) => format!("list of {}", item.describe()),
            Self::Record(factory) => format!("{} record", factory().kind()),
            Self::RecordList(factory) => format!("list of {} records", factory().kind()),
            other => other
                .scalar()
                .map_or("value", |s| s.describe())
                .to_string(),
        }
    }

    /// JSON emitted for an unset attribute that is not omitted when empty.
    pub fn zero_value(&self) -> Value {
        match self {
            Self::String | Self::DateTime | Self::Digest => Value::String(String::new()),
            Self::Mapping => Value::Object(Map::new()),
            Self::List(_) | Self::RecordList(_) => Value::Array(Vec::new()),
            Self::Integer | Self::Boolean | Self::Record(_) => Value::Null,
        }
    }
}

impl fmt::Debug for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// Declaration of one named attribute of a record.
///
/// Built with a chain of modifiers:
///
/// ```ignore
/// AttributeSchema::new("media_type", ValueType::String)
///     .json_name("mediaType")
///     .required()
///     .with_pattern(MEDIA_TYPE.clone())
/// ```
#[derive(Clone, Debug)]
pub struct AttributeSchema {
    name: String,
    wire_name: String,
    value_type: ValueType,
    required: bool,
    pattern: Option<Regex>,
    omit_when_empty: bool,
    hidden: bool,
}

impl AttributeSchema {
    /// An optional attribute serialized under its own name and omitted when
    /// empty.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        let name = name.into();
        Self {
            wire_name: name.clone(),
            name,
            value_type,
            required: false,
            pattern: None,
            omit_when_empty: true,
            hidden: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Serialize under `wire_name` instead of the attribute name.
    pub fn json_name(mut self, wire_name: impl Into<String>) -> Self {
        self.wire_name = wire_name.into();
        self
    }

    /// Require every string leaf of the value to match `pattern`.
    ///
    /// Only string-like types have leaves to check.
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        debug_assert!(
            self.value_type.is_string_like(),
            "pattern on non-string attribute {}",
            self.name
        );
        self.pattern = Some(pattern);
        self
    }

    /// Emit the type's zero value instead of dropping the key when empty.
    pub fn keep_empty(mut self) -> Self {
        self.omit_when_empty = false;
        self
    }

    /// Never serialize this attribute.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn omit_when_empty(&self) -> bool {
        self.omit_when_empty
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }
}

use oci_struct::{document, AttributeSchema, Record, ValidationError, ValidationResult, ValueType};

/// Schema version carried by manifests and indexes.
pub const SCHEMA_VERSION: i64 = 2;

pub(crate) fn schema_version_attribute() -> AttributeSchema {
    AttributeSchema::new("schema_version", ValueType::Integer)
        .json_name("schemaVersion")
        .required()
}

/// Structural check: `schemaVersion` must be [`SCHEMA_VERSION`].
pub(crate) fn check_schema_version(record: &Record) -> ValidationResult<()> {
    match record.get_i64("schema_version") {
        Some(SCHEMA_VERSION) | None => Ok(()),
        Some(other) => Err(ValidationError::Structural {
            record: record.kind().to_string(),
            reason: format!("schemaVersion must be {SCHEMA_VERSION}, found {other}"),
        }),
    }
}

pub(crate) fn versioned_schema() -> Record {
    Record::builder("Versioned")
        .attribute(schema_version_attribute())
        .build()
}

document!(
    /// The bare `schemaVersion` header, for probing documents of unknown type.
    Versioned,
    versioned_schema
);

impl Versioned {
    pub fn schema_version(&self) -> i64 {
        self.0.get_i64("schema_version").unwrap_or_default()
    }
}

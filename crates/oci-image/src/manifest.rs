use oci_struct::{document, AttributeSchema, Document, Record, ValidationError, ValidationResult, ValueType};
use serde_json::{Map, Value};

use crate::descriptor::{descriptor_schema, Descriptor};
use crate::media_type::{self, MEDIA_TYPE};
use crate::versioned::{check_schema_version, schema_version_attribute, SCHEMA_VERSION};

fn check_layers(record: &Record) -> ValidationResult<()> {
    if record.get_records("layers").is_empty() {
        return Err(ValidationError::Structural {
            record: record.kind().to_string(),
            reason: "layers must contain at least one descriptor".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn manifest_schema() -> Record {
    Record::builder("Manifest")
        .attribute(schema_version_attribute())
        .attribute(
            AttributeSchema::new("media_type", ValueType::String)
                .json_name("mediaType")
                .with_pattern(MEDIA_TYPE.clone()),
        )
        .attribute(AttributeSchema::new("config", ValueType::Record(descriptor_schema)).required())
        .attribute(AttributeSchema::new("layers", ValueType::RecordList(descriptor_schema)))
        .attribute(AttributeSchema::new("annotations", ValueType::Mapping))
        .check(check_schema_version)
        .check(check_layers)
        .build()
}

document!(
    /// An image manifest: one configuration blob and an ordered list of layers.
    Manifest,
    manifest_schema
);

impl Manifest {
    pub fn new(config: Descriptor, layers: Vec<Descriptor>) -> ValidationResult<Self> {
        let mut record = manifest_schema();
        record.set("schema_version", SCHEMA_VERSION)?;
        record.set("media_type", media_type::IMAGE_MANIFEST)?;
        record.set("config", config.into_record())?;
        record.set(
            "layers",
            layers.into_iter().map(Descriptor::into_record).collect::<Vec<_>>(),
        )?;
        Self::from_record(record)
    }

    pub fn schema_version(&self) -> i64 {
        self.0.get_i64("schema_version").unwrap_or_default()
    }

    pub fn media_type(&self) -> Option<&str> {
        self.0.get_str("media_type")
    }

    pub fn config(&self) -> Option<Descriptor> {
        self.0.get_record("config").cloned().map(Descriptor::wrap)
    }

    pub fn layers(&self) -> Vec<Descriptor> {
        self.0
            .get_records("layers")
            .iter()
            .cloned()
            .map(Descriptor::wrap)
            .collect()
    }

    pub fn annotations(&self) -> Option<&Map<String, Value>> {
        self.0.get_mapping("annotations")
    }

    /// Sum of the configuration and layer sizes, or `None` if it overflows.
    pub fn total_size(&self) -> Option<i64> {
        let config = self.config().map_or(0, |c| c.size());
        self.layers()
            .iter()
            .map(Descriptor::size)
            .try_fold(config, i64::checked_add)
    }
}

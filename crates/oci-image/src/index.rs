use oci_struct::{document, AttributeSchema, Document, Record, ValidationError, ValidationResult, ValueType};
use serde_json::{Map, Value};

use crate::descriptor::{descriptor_schema, Descriptor};
use crate::media_type::{self, MEDIA_TYPE};
use crate::versioned::{check_schema_version, schema_version_attribute, SCHEMA_VERSION};

fn check_manifest_media_types(record: &Record) -> ValidationResult<()> {
    for (i, manifest) in record.get_records("manifests").iter().enumerate() {
        let mt = manifest.get_str("media_type").unwrap_or_default();
        if !media_type::is_manifest_like(mt) {
            return Err(ValidationError::Structural {
                record: format!("{}.manifests[{i}]", record.kind()),
                reason: format!("unsupported manifest media type {mt:?}"),
            });
        }
    }
    Ok(())
}

pub(crate) fn index_schema() -> Record {
    Record::builder("Index")
        .attribute(schema_version_attribute())
        .attribute(
            AttributeSchema::new("media_type", ValueType::String)
                .json_name("mediaType")
                .with_pattern(MEDIA_TYPE.clone()),
        )
        .attribute(
            AttributeSchema::new("manifests", ValueType::RecordList(descriptor_schema)).required(),
        )
        .attribute(AttributeSchema::new("annotations", ValueType::Mapping))
        .check(check_schema_version)
        .check(check_manifest_media_types)
        .build()
}

document!(
    /// An image index: manifests for several platforms.
    Index,
    index_schema
);

impl Index {
    pub fn new(manifests: Vec<Descriptor>) -> ValidationResult<Self> {
        let mut record = index_schema();
        record.set("schema_version", SCHEMA_VERSION)?;
        record.set("media_type", media_type::IMAGE_INDEX)?;
        record.set(
            "manifests",
            manifests.into_iter().map(Descriptor::into_record).collect::<Vec<_>>(),
        )?;
        Self::from_record(record)
    }

    pub fn schema_version(&self) -> i64 {
        self.0.get_i64("schema_version").unwrap_or_default()
    }

    pub fn media_type(&self) -> Option<&str> {
        self.0.get_str("media_type")
    }

    pub fn manifests(&self) -> Vec<Descriptor> {
        self.0
            .get_records("manifests")
            .iter()
            .cloned()
            .map(Descriptor::wrap)
            .collect()
    }

    pub fn annotations(&self) -> Option<&Map<String, Value>> {
        self.0.get_mapping("annotations")
    }

    /// The first manifest built for `architecture` and `os`.
    pub fn find_platform(&self, architecture: &str, os: &str) -> Option<Descriptor> {
        self.manifests().into_iter().find(|m| {
            m.platform()
                .is_some_and(|p| p.architecture() == architecture && p.os() == os)
        })
    }
}

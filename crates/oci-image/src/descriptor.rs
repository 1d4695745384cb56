use std::sync::LazyLock;

use oci_digest::Digest;
use oci_struct::{document, AttributeSchema, Document, Record, ScalarType, ValidationResult, ValueType};
use regex::Regex;
use serde_json::{Map, Value};

use crate::media_type::MEDIA_TYPE;

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://[^\s/?#]+[^\s]*$").expect("url regex is valid")
});

pub(crate) fn descriptor_schema() -> Record {
    Record::builder("Descriptor")
        .attribute(
            AttributeSchema::new("media_type", ValueType::String)
                .json_name("mediaType")
                .required()
                .with_pattern(MEDIA_TYPE.clone()),
        )
        .attribute(AttributeSchema::new("digest", ValueType::Digest).required())
        .attribute(AttributeSchema::new("size", ValueType::Integer).required())
        .attribute(
            AttributeSchema::new("urls", ValueType::List(ScalarType::String))
                .with_pattern(URL.clone()),
        )
        .attribute(AttributeSchema::new("annotations", ValueType::Mapping))
        .attribute(AttributeSchema::new("platform", ValueType::Record(platform_schema)))
        .build()
}

pub(crate) fn platform_schema() -> Record {
    Record::builder("Platform")
        .attribute(AttributeSchema::new("architecture", ValueType::String).required())
        .attribute(AttributeSchema::new("os", ValueType::String).required())
        .attribute(AttributeSchema::new("os_version", ValueType::String).json_name("os.version"))
        .attribute(
            AttributeSchema::new("os_features", ValueType::List(ScalarType::String))
                .json_name("os.features"),
        )
        .attribute(AttributeSchema::new("variant", ValueType::String))
        .build()
}

document!(
    /// The disposition of targeted content: media type, digest, and size,
    /// plus optional download URLs, annotations, and platform.
    Descriptor,
    descriptor_schema
);

impl Descriptor {
    pub fn new(media_type: &str, digest: &Digest, size: i64) -> ValidationResult<Self> {
        let mut record = descriptor_schema();
        record.set("media_type", media_type)?;
        record.set("digest", digest)?;
        record.set("size", size)?;
        Self::from_record(record)
    }

    pub fn media_type(&self) -> &str {
        self.0.get_str("media_type").unwrap_or_default()
    }

    pub fn digest(&self) -> Option<&Digest> {
        self.0.get_digest("digest")
    }

    pub fn size(&self) -> i64 {
        self.0.get_i64("size").unwrap_or_default()
    }

    pub fn urls(&self) -> Vec<&str> {
        self.0.get_strings("urls")
    }

    pub fn annotations(&self) -> Option<&Map<String, Value>> {
        self.0.get_mapping("annotations")
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations()?.get(key)?.as_str()
    }

    pub fn platform(&self) -> Option<Platform> {
        self.0.get_record("platform").cloned().map(Platform)
    }

    pub fn with_annotation(mut self, key: &str, value: &str) -> ValidationResult<Self> {
        let mut entry = Map::new();
        entry.insert(key.to_string(), Value::String(value.to_string()));
        self.0.add("annotations", entry)?;
        Ok(self)
    }

    pub fn with_platform(mut self, platform: Platform) -> ValidationResult<Self> {
        self.0.set("platform", platform.into_record())?;
        Ok(self)
    }
}

document!(
    /// The platform an image in a manifest runs on.
    Platform,
    platform_schema
);

impl Platform {
    pub fn new(architecture: &str, os: &str) -> ValidationResult<Self> {
        let mut record = platform_schema();
        record.set("architecture", architecture)?;
        record.set("os", os)?;
        Self::from_record(record)
    }

    pub fn architecture(&self) -> &str {
        self.0.get_str("architecture").unwrap_or_default()
    }

    pub fn os(&self) -> &str {
        self.0.get_str("os").unwrap_or_default()
    }

    pub fn os_version(&self) -> Option<&str> {
        self.0.get_str("os_version")
    }

    pub fn os_features(&self) -> Vec<&str> {
        self.0.get_strings("os_features")
    }

    pub fn variant(&self) -> Option<&str> {
        self.0.get_str("variant")
    }
}

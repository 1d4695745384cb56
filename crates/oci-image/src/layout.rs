use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use oci_digest::Digest;
use oci_struct::{document, AttributeSchema, Document, Record, ValidationResult, ValueType};
use regex::Regex;

/// Name of the layout marker file at the root of an image layout directory.
pub const LAYOUT_FILE: &str = "oci-layout";

/// Entry point of an image layout.
pub const INDEX_FILE: &str = "index.json";

/// Directory holding content-addressed blobs.
pub const BLOBS_DIR: &str = "blobs";

pub const LAYOUT_VERSION: &str = "1.0.0";

// Semantic version without a leading `v`.
static LAYOUT_VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)~?(?P<special>[a-z]\w+[\d+])?$")
        .expect("layout version regex is valid")
});

pub(crate) fn layout_schema() -> Record {
    Record::builder("ImageLayout")
        .attribute(
            AttributeSchema::new("version", ValueType::String)
                .json_name("imageLayoutVersion")
                .required()
                .with_pattern(LAYOUT_VERSION_PATTERN.clone()),
        )
        .build()
}

document!(
    /// Contents of the `oci-layout` file.
    ImageLayout,
    layout_schema
);

impl ImageLayout {
    pub fn new(version: &str) -> ValidationResult<Self> {
        let mut record = layout_schema();
        record.set("version", version)?;
        Self::from_record(record)
    }

    pub fn version(&self) -> &str {
        self.0.get_str("version").unwrap_or_default()
    }
}

impl Default for ImageLayout {
    fn default() -> Self {
        let mut record = layout_schema();
        if let Err(err) = record.set("version", LAYOUT_VERSION) {
            tracing::warn!(error = %err, "default layout version rejected");
        }
        Self(record)
    }
}

/// Location of a blob inside a layout rooted at `root`:
/// `blobs/<algorithm>/<encoded>`.
pub fn blob_path(root: &Path, digest: &Digest) -> PathBuf {
    root.join(BLOBS_DIR)
        .join(digest.algorithm_token())
        .join(digest.encoded())
}

#[cfg(test)]
mod tests {
    use oci_struct::ValidationError;
    use serde_json::json;

    use super::*;

    #[test]
    fn version_must_be_semver_string() {
        let err = ImageLayout::from_value(&json!({"imageLayoutVersion": 1.0})).unwrap_err();
        assert!(matches!(err, ValidationError::TypeMismatch { .. }));
        let err = ImageLayout::from_value(&json!({"imageLayoutVersion": "1.0"})).unwrap_err();
        assert!(matches!(err, ValidationError::PatternMismatch { .. }));
        let layout = ImageLayout::from_value(&json!({"imageLayoutVersion": "1.0.0"})).unwrap();
        assert_eq!(layout.version(), "1.0.0");
    }

    #[test]
    fn default_version() {
        let layout = ImageLayout::default();
        assert_eq!(layout.version(), LAYOUT_VERSION);
        assert_eq!(layout.to_json().unwrap(), "{\n    \"imageLayoutVersion\": \"1.0.0\"\n}");
    }

    #[test]
    fn blob_paths() {
        let d = oci_digest::from_bytes(b"");
        let path = blob_path(Path::new("/layout"), &d);
        assert_eq!(
            path,
            Path::new("/layout/blobs/sha256/e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
        );
    }
}

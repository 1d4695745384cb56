//! Media types defined by the OCI image specification.

use std::sync::LazyLock;

use regex::Regex;

/// A content descriptor.
pub const DESCRIPTOR: &str = "application/vnd.oci.descriptor.v1+json";

/// The `oci-layout` file.
pub const LAYOUT_HEADER: &str = "application/vnd.oci.layout.header.v1+json";

pub const IMAGE_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";

pub const IMAGE_INDEX: &str = "application/vnd.oci.image.index.v1+json";

/// Layers referenced by a manifest.
pub const IMAGE_LAYER: &str = "application/vnd.oci.image.layer.v1.tar";
pub const IMAGE_LAYER_GZIP: &str = "application/vnd.oci.image.layer.v1.tar+gzip";
pub const IMAGE_LAYER_ZSTD: &str = "application/vnd.oci.image.layer.v1.tar+zstd";

/// Layers with distribution restrictions.
pub const IMAGE_LAYER_NON_DISTRIBUTABLE: &str =
    "application/vnd.oci.image.layer.nondistributable.v1.tar";
pub const IMAGE_LAYER_NON_DISTRIBUTABLE_GZIP: &str =
    "application/vnd.oci.image.layer.nondistributable.v1.tar+gzip";
pub const IMAGE_LAYER_NON_DISTRIBUTABLE_ZSTD: &str =
    "application/vnd.oci.image.layer.nondistributable.v1.tar+zstd";

pub const IMAGE_CONFIG: &str = "application/vnd.oci.image.config.v1+json";

/// `type/subtype`, each part starting alphanumeric and at most 127 characters.
pub const MEDIA_TYPE_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9!#$&-^_.+]{0,126}/[A-Za-z0-9][A-Za-z0-9!#$&-^_.+]{0,126}$";

pub(crate) static MEDIA_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MEDIA_TYPE_PATTERN).expect("media type regex is valid"));

/// Returns `true` if `value` is a well-formed media type.
pub fn is_valid(value: &str) -> bool {
    MEDIA_TYPE.is_match(value)
}

/// Media types an index may reference.
pub fn is_manifest_like(value: &str) -> bool {
    value == IMAGE_MANIFEST || value == IMAGE_INDEX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_valid_media_types() {
        for mt in [
            DESCRIPTOR,
            LAYOUT_HEADER,
            IMAGE_MANIFEST,
            IMAGE_INDEX,
            IMAGE_LAYER,
            IMAGE_LAYER_GZIP,
            IMAGE_LAYER_ZSTD,
            IMAGE_LAYER_NON_DISTRIBUTABLE,
            IMAGE_LAYER_NON_DISTRIBUTABLE_GZIP,
            IMAGE_LAYER_NON_DISTRIBUTABLE_ZSTD,
            IMAGE_CONFIG,
        ] {
            assert!(is_valid(mt), "{mt}");
        }
    }

    #[test]
    fn length_bounds() {
        let max = "1".repeat(127);
        assert!(is_valid(&format!("{max}/{max}")));
        assert!(!is_valid(&format!("{max}1/bar")));
        assert!(!is_valid(&format!("foo/{max}1")));
    }

    #[test]
    fn malformed() {
        assert!(!is_valid("application"));
        assert!(!is_valid(".foo/bar"));
        assert!(!is_valid("foo/.bar"));
        assert!(!is_valid("invalid"));
        assert!(!is_valid(""));
    }

    #[test]
    fn manifest_like() {
        assert!(is_manifest_like(IMAGE_MANIFEST));
        assert!(is_manifest_like(IMAGE_INDEX));
        assert!(!is_manifest_like(IMAGE_CONFIG));
    }
}

//! Pre-defined annotation keys.

/// Date and time the image was built, RFC 3339.
pub const CREATED: &str = "org.opencontainers.image.created";

/// Contact details of the people or organization responsible for the image.
pub const AUTHORS: &str = "org.opencontainers.image.authors";

pub const URL: &str = "org.opencontainers.image.url";

pub const DOCUMENTATION: &str = "org.opencontainers.image.documentation";

pub const SOURCE: &str = "org.opencontainers.image.source";

/// Version of the packaged software.
pub const VERSION: &str = "org.opencontainers.image.version";

/// Source control revision of the packaged software.
pub const REVISION: &str = "org.opencontainers.image.revision";

pub const VENDOR: &str = "org.opencontainers.image.vendor";

/// SPDX license expression.
pub const LICENSES: &str = "org.opencontainers.image.licenses";

/// Name of the reference for a target; meaningful on `index.json` descriptors
/// within an image layout.
pub const REF_NAME: &str = "org.opencontainers.image.ref.name";

pub const TITLE: &str = "org.opencontainers.image.title";

pub const DESCRIPTION: &str = "org.opencontainers.image.description";

//! OCI image-spec documents as validated records.
//!
//! Each document type wraps an [`oci_struct::Record`] declared with the
//! image specification's attributes, wire names, and formats, and adds typed
//! accessors. Values only reach a wrapper through loading or building, both
//! of which validate.
//!
//! ```ignore
//! use oci_image::{Document, Manifest};
//!
//! let manifest = Manifest::from_json(&text)?;
//! for layer in manifest.layers() {
//!     println!("{} {}", layer.media_type(), layer.size());
//! }
//! ```

pub mod annotations;
pub mod config;
pub mod descriptor;
pub mod index;
pub mod layout;
pub mod manifest;
pub mod media_type;
pub mod versioned;

pub use config::{History, Image, ImageConfig, RootFS};
pub use descriptor::{Descriptor, Platform};
pub use index::Index;
pub use layout::{blob_path, ImageLayout, LAYOUT_FILE, LAYOUT_VERSION};
pub use manifest::Manifest;
pub use oci_struct::Document;
pub use versioned::{Versioned, SCHEMA_VERSION};

/// Version of the OCI image format these types follow.
pub const IMAGE_SPEC_VERSION: &str = "1.0.1";

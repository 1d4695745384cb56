//! Declarative typed records.
//!
//! A [`Record`] is an ordered set of attributes, each declared once with an
//! [`AttributeSchema`]: a semantic [`ValueType`], an optional wire name,
//! required and hidden flags, an optional pattern, and whether the key is
//! dropped when empty. Records accept values from code or from JSON
//! documents, validate them, and project back to JSON in declaration order.
//!
//! # Key Types
//!
//! - [`Record`]: attribute values plus structural checks
//! - [`AttributeSchema`]: one attribute declaration
//! - [`FieldValue`]: a stored, type-checked value
//! - [`ValidationError`]: what went wrong, and at which field path
//! - [`Document`]: a typed wrapper declared with [`document!`]
//!
//! ```ignore
//! fn descriptor() -> Record {
//!     Record::builder("Descriptor")
//!         .attribute(AttributeSchema::new("digest", ValueType::Digest).required())
//!         .attribute(AttributeSchema::new("size", ValueType::Integer).required())
//!         .build()
//! }
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod record;
pub mod schema;
pub mod value;

pub use config::LoadOptions;
pub use document::Document;
pub use error::{ValidationError, ValidationResult};
pub use record::{Record, RecordBuilder, StructuralCheck};
pub use schema::{AttributeSchema, RecordFactory, ScalarType, ValueType};
pub use value::{FieldInput, FieldValue};

#[doc(hidden)]
pub use serde as __serde;

//! Typed wrappers over records.

use serde_json::Value;

use crate::error::{ValidationError, ValidationResult};
use crate::record::Record;

/// A document type backed by a [`Record`].
///
/// Implementors are thin wrappers: the record holds the values, the wrapper
/// adds typed accessors. Every wrapper obtained through this trait has been
/// validated. Declare one with [`document!`](crate::document).
pub trait Document: Sized {
    /// The declared, empty record for this type.
    fn empty() -> Record;

    #[doc(hidden)]
    fn wrap(record: Record) -> Self;

    fn as_record(&self) -> &Record;

    fn into_record(self) -> Record;

    /// Load and validate a JSON document.
    fn from_value(document: &Value) -> ValidationResult<Self> {
        let mut record = Self::empty();
        record.load(document)?;
        Ok(Self::wrap(record))
    }

    /// Parse and validate JSON text.
    fn from_json(text: &str) -> ValidationResult<Self> {
        let document: Value = serde_json::from_str(text)
            .map_err(|e| ValidationError::Serialization(e.to_string()))?;
        Self::from_value(&document)
    }

    /// Wrap a record built in code after validating it.
    fn from_record(record: Record) -> ValidationResult<Self> {
        let empty = Self::empty();
        let expected = empty.kind();
        if record.kind() != expected {
            return Err(ValidationError::TypeMismatch {
                field: expected.to_string(),
                expected: format!("{expected} record"),
                found: format!("{} record", record.kind()),
            });
        }
        record.validate()?;
        Ok(Self::wrap(record))
    }

    fn to_json(&self) -> ValidationResult<String> {
        self.as_record().to_json()
    }

    fn to_value(&self) -> ValidationResult<Value> {
        self.as_record().to_value()
    }
}

/// Declares a newtype over [`Record`] implementing [`Document`].
///
/// ```ignore
/// document!(
///     /// A tag listing.
///     TagList,
///     tag_list_schema
/// );
/// ```
#[macro_export]
macro_rules! document {
    ($(#[$meta:meta])* $name:ident, $schema:path) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq)]
        pub struct $name($crate::Record);

        impl $crate::Document for $name {
            fn empty() -> $crate::Record {
                $schema()
            }

            fn wrap(record: $crate::Record) -> Self {
                Self(record)
            }

            fn as_record(&self) -> &$crate::Record {
                &self.0
            }

            fn into_record(self) -> $crate::Record {
                self.0
            }
        }

        impl From<$name> for $crate::Record {
            fn from(doc: $name) -> Self {
                doc.0
            }
        }

        impl TryFrom<$crate::Record> for $name {
            type Error = $crate::ValidationError;

            fn try_from(record: $crate::Record) -> Result<Self, Self::Error> {
                <Self as $crate::Document>::from_record(record)
            }
        }

        impl $crate::__serde::Serialize for $name {
            fn serialize<S: $crate::__serde::Serializer>(
                &self,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                $crate::__serde::Serialize::serialize(&self.0, serializer)
            }
        }
    };
}

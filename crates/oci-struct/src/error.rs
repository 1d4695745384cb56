use oci_digest::DigestError;

/// Errors produced while declaring, populating, validating, or serializing
/// records.
///
/// Field paths are dotted attribute names; sequence elements carry their
/// index (`layers[1].size`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    RequiredFieldMissing { field: String },

    #[error("{field} is not a valid attribute")]
    UnknownField { field: String },

    #[error("{field} must be {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    #[error("{field} value {value:?} does not match {pattern}")]
    PatternMismatch {
        field: String,
        value: String,
        pattern: String,
    },

    #[error("{field}: {source}")]
    Digest {
        field: String,
        #[source]
        source: DigestError,
    },

    #[error("{record}: {reason}")]
    Structural { record: String, reason: String },

    #[error("document must be a JSON object, found {found}")]
    NotAnObject { found: String },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ValidationError {
    /// Prefix the field path with the enclosing attribute.
    pub fn within(mut self, parent: &str) -> Self {
        match &mut self {
            Self::RequiredFieldMissing { field }
            | Self::UnknownField { field }
            | Self::TypeMismatch { field, .. }
            | Self::PatternMismatch { field, .. }
            | Self::Digest { field, .. } => *field = format!("{parent}.{field}"),
            Self::Structural { record, .. } => *record = format!("{parent}.{record}"),
            Self::NotAnObject { .. } | Self::Serialization(_) => {}
        }
        self
    }

    /// The offending field path, if the error concerns a single field.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::RequiredFieldMissing { field }
            | Self::UnknownField { field }
            | Self::TypeMismatch { field, .. }
            | Self::PatternMismatch { field, .. }
            | Self::Digest { field, .. } => Some(field),
            _ => None,
        }
    }

    /// The underlying digest error, if any.
    pub fn digest_error(&self) -> Option<&DigestError> {
        match self {
            Self::Digest { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result alias for record operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_prefixes_paths() {
        let err = ValidationError::RequiredFieldMissing {
            field: "digest".into(),
        }
        .within("layers[0]")
        .within("manifest");
        assert_eq!(err.field(), Some("manifest.layers[0].digest"));
        assert_eq!(err.to_string(), "manifest.layers[0].digest is required");
    }

    #[test]
    fn digest_errors_stay_distinguishable() {
        let err = ValidationError::Digest {
            field: "digest".into(),
            source: DigestError::UnsupportedAlgorithm("foo".into()),
        };
        assert!(err.digest_error().unwrap().is_unsupported());
    }
}

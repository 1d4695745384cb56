//! JSON documents returned by registries.

use oci_struct::{document, AttributeSchema, Document, Record, ScalarType, ValueType};

pub(crate) fn error_info_schema() -> Record {
    Record::builder("ErrorInfo")
        .attribute(AttributeSchema::new("code", ValueType::String).required())
        .attribute(AttributeSchema::new("message", ValueType::String).required())
        .attribute(AttributeSchema::new("detail", ValueType::String))
        .build()
}

pub(crate) fn error_response_schema() -> Record {
    Record::builder("ErrorResponse")
        .attribute(
            AttributeSchema::new("errors", ValueType::RecordList(error_info_schema))
                .required(),
        )
        .build()
}

pub(crate) fn tag_list_schema() -> Record {
    Record::builder("TagList")
        .attribute(AttributeSchema::new("name", ValueType::String).required())
        .attribute(AttributeSchema::new("tags", ValueType::List(ScalarType::String)).keep_empty())
        .build()
}

pub(crate) fn repository_list_schema() -> Record {
    Record::builder("RepositoryList")
        .attribute(
            AttributeSchema::new("repositories", ValueType::List(ScalarType::String)).keep_empty(),
        )
        .build()
}

document!(
    /// One server error: a registry error code, a message, and optional detail.
    ErrorInfo,
    error_info_schema
);

impl ErrorInfo {
    pub fn code(&self) -> &str {
        self.0.get_str("code").unwrap_or_default()
    }

    pub fn message(&self) -> &str {
        self.0.get_str("message").unwrap_or_default()
    }

    pub fn detail(&self) -> Option<&str> {
        self.0.get_str("detail")
    }
}

document!(
    /// Body of a failed registry request.
    ErrorResponse,
    error_response_schema
);

impl ErrorResponse {
    pub fn errors(&self) -> Vec<ErrorInfo> {
        self.0
            .get_records("errors")
            .iter()
            .cloned()
            .map(ErrorInfo::wrap)
            .collect()
    }

    /// Codes of every reported error, in order.
    pub fn codes(&self) -> Vec<&str> {
        self.0
            .get_records("errors")
            .iter()
            .filter_map(|e| e.get_str("code"))
            .collect()
    }
}

document!(
    /// Tags of one repository.
    TagList,
    tag_list_schema
);

impl TagList {
    pub fn name(&self) -> &str {
        self.0.get_str("name").unwrap_or_default()
    }

    pub fn tags(&self) -> Vec<&str> {
        self.0.get_strings("tags")
    }
}

document!(
    /// The registry catalog.
    RepositoryList,
    repository_list_schema
);

impl RepositoryList {
    pub fn repositories(&self) -> Vec<&str> {
        self.0.get_strings("repositories")
    }
}

#[cfg(test)]
mod tests {
    use oci_struct::ValidationError;
    use serde_json::json;

    use super::*;

    #[test]
    fn error_response() {
        let doc = json!({
            "errors": [
                {"code": "BLOB_UNKNOWN", "message": "blob unknown to registry", "detail": "sha256:abc"},
                {"code": "DENIED", "message": "requested access to the resource is denied"},
            ]
        });
        let resp = ErrorResponse::from_value(&doc).unwrap();
        assert_eq!(resp.codes(), vec!["BLOB_UNKNOWN", "DENIED"]);
        let errors = resp.errors();
        assert_eq!(errors[0].detail(), Some("sha256:abc"));
        assert_eq!(errors[1].message(), "requested access to the resource is denied");
        assert_eq!(errors[1].detail(), None);
    }

    #[test]
    fn error_info_requires_code() {
        let err = ErrorResponse::from_value(&json!({"errors": [{"message": "m"}]})).unwrap_err();
        assert_eq!(
            err,
            ValidationError::RequiredFieldMissing { field: "errors[0].code".into() }
        );
    }

    #[test]
    fn tag_list() {
        let tags = TagList::from_value(&json!({"name": "library/alpine", "tags": ["3.18", "latest"]})).unwrap();
        assert_eq!(tags.name(), "library/alpine");
        assert_eq!(tags.tags(), vec!["3.18", "latest"]);

        let empty = TagList::from_value(&json!({"name": "library/alpine"})).unwrap();
        assert_eq!(empty.to_value().unwrap(), json!({"name": "library/alpine", "tags": []}));
        assert!(TagList::from_value(&json!({"tags": []})).is_err());
    }

    #[test]
    fn repository_list() {
        let list = RepositoryList::from_value(&json!({"repositories": ["a", "b/c"]})).unwrap();
        assert_eq!(list.repositories(), vec!["a", "b/c"]);
        assert!(RepositoryList::from_value(&json!({"repositories": [1]})).is_err());
    }
}

use serde::{Deserialize, Serialize};

/// Options controlling [`Record::load_with`](crate::Record::load_with).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Run whole-record validation (required fields, structural checks)
    /// before committing the load. Per-field type and pattern checks always
    /// run.
    pub validate: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { validate: true }
    }
}

impl LoadOptions {
    /// Accept documents that are well-typed but incomplete.
    pub fn unvalidated() -> Self {
        Self { validate: false }
    }
}

//! The image configuration document and its parts.

use std::sync::LazyLock;

use oci_digest::Digest;
use oci_struct::{document, AttributeSchema, Document, Record, ScalarType, ValidationResult, ValueType};
use regex::Regex;
use serde_json::{Map, Value};

static ENV_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.+?=.+").expect("env regex is valid"));

pub(crate) fn image_config_schema() -> Record {
    Record::builder("ImageConfig")
        .attribute(AttributeSchema::new("user", ValueType::String).json_name("User"))
        .attribute(AttributeSchema::new("exposed_ports", ValueType::Mapping).json_name("ExposedPorts"))
        .attribute(
            AttributeSchema::new("env", ValueType::List(ScalarType::String))
                .json_name("Env")
                .with_pattern(ENV_ENTRY.clone()),
        )
        .attribute(
            AttributeSchema::new("entrypoint", ValueType::List(ScalarType::String))
                .json_name("Entrypoint"),
        )
        .attribute(AttributeSchema::new("cmd", ValueType::List(ScalarType::String)).json_name("Cmd"))
        .attribute(AttributeSchema::new("volumes", ValueType::Mapping).json_name("Volumes"))
        .attribute(AttributeSchema::new("working_dir", ValueType::String).json_name("WorkingDir"))
        .attribute(AttributeSchema::new("labels", ValueType::Mapping).json_name("Labels"))
        .attribute(AttributeSchema::new("stop_signal", ValueType::String).json_name("StopSignal"))
        .build()
}

pub(crate) fn rootfs_schema() -> Record {
    Record::builder("RootFS")
        .attribute(
            AttributeSchema::new("fs_type", ValueType::String)
                .json_name("type")
                .keep_empty(),
        )
        .attribute(AttributeSchema::new("diff_ids", ValueType::List(ScalarType::Digest)).keep_empty())
        .build()
}

pub(crate) fn history_schema() -> Record {
    Record::builder("History")
        .attribute(AttributeSchema::new("created", ValueType::DateTime))
        .attribute(AttributeSchema::new("created_by", ValueType::String))
        .attribute(AttributeSchema::new("author", ValueType::String))
        .attribute(AttributeSchema::new("comment", ValueType::String))
        .attribute(AttributeSchema::new("empty_layer", ValueType::Boolean))
        .build()
}

pub(crate) fn image_schema() -> Record {
    Record::builder("Image")
        .attribute(AttributeSchema::new("created", ValueType::DateTime))
        .attribute(AttributeSchema::new("author", ValueType::String))
        .attribute(AttributeSchema::new("architecture", ValueType::String).required())
        .attribute(AttributeSchema::new("os", ValueType::String).required())
        .attribute(AttributeSchema::new("config", ValueType::Record(image_config_schema)))
        .attribute(AttributeSchema::new("rootfs", ValueType::Record(rootfs_schema)).required())
        .attribute(AttributeSchema::new("history", ValueType::RecordList(history_schema)))
        .build()
}

document!(
    /// Execution parameters used as a base when running a container.
    ImageConfig,
    image_config_schema
);

impl ImageConfig {
    pub fn user(&self) -> Option<&str> {
        self.0.get_str("user")
    }

    pub fn env(&self) -> Vec<&str> {
        self.0.get_strings("env")
    }

    /// Value of one `KEY=value` environment entry.
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env().into_iter().find_map(|entry| {
            let (k, v) = entry.split_once('=')?;
            (k == key).then_some(v)
        })
    }

    pub fn entrypoint(&self) -> Vec<&str> {
        self.0.get_strings("entrypoint")
    }

    pub fn cmd(&self) -> Vec<&str> {
        self.0.get_strings("cmd")
    }

    pub fn working_dir(&self) -> Option<&str> {
        self.0.get_str("working_dir")
    }

    pub fn exposed_ports(&self) -> Vec<&str> {
        self.0
            .get_mapping("exposed_ports")
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn labels(&self) -> Option<&Map<String, Value>> {
        self.0.get_mapping("labels")
    }

    pub fn stop_signal(&self) -> Option<&str> {
        self.0.get_str("stop_signal")
    }
}

document!(
    /// Layer content addresses, bottom-most first.
    RootFS,
    rootfs_schema
);

impl RootFS {
    pub fn layers(diff_ids: &[Digest]) -> ValidationResult<Self> {
        let mut record = rootfs_schema();
        record.set("fs_type", "layers")?;
        record.set(
            "diff_ids",
            Value::Array(diff_ids.iter().map(|d| Value::String(d.to_string())).collect()),
        )?;
        Self::from_record(record)
    }

    pub fn fs_type(&self) -> &str {
        self.0.get_str("fs_type").unwrap_or_default()
    }

    pub fn diff_ids(&self) -> Vec<&Digest> {
        self.0
            .get("diff_ids")
            .and_then(|v| v.as_list())
            .map(|items| items.iter().filter_map(|i| i.as_digest()).collect())
            .unwrap_or_default()
    }
}

document!(
    /// How one layer was produced.
    History,
    history_schema
);

impl History {
    pub fn created(&self) -> Option<&str> {
        self.0.get_str("created")
    }

    pub fn created_by(&self) -> Option<&str> {
        self.0.get_str("created_by")
    }

    pub fn author(&self) -> Option<&str> {
        self.0.get_str("author")
    }

    pub fn comment(&self) -> Option<&str> {
        self.0.get_str("comment")
    }

    /// Whether this step left the filesystem unchanged.
    pub fn is_empty_layer(&self) -> bool {
        self.0.get_bool("empty_layer").unwrap_or(false)
    }
}

document!(
    /// The image configuration blob
    /// (`application/vnd.oci.image.config.v1+json`).
    Image,
    image_schema
);

impl Image {
    pub fn created(&self) -> Option<&str> {
        self.0.get_str("created")
    }

    pub fn author(&self) -> Option<&str> {
        self.0.get_str("author")
    }

    pub fn architecture(&self) -> &str {
        self.0.get_str("architecture").unwrap_or_default()
    }

    pub fn os(&self) -> &str {
        self.0.get_str("os").unwrap_or_default()
    }

    pub fn config(&self) -> Option<ImageConfig> {
        self.0.get_record("config").cloned().map(ImageConfig)
    }

    pub fn rootfs(&self) -> Option<RootFS> {
        self.0.get_record("rootfs").cloned().map(RootFS)
    }

    pub fn history(&self) -> Vec<History> {
        self.0.get_records("history").iter().cloned().map(History).collect()
    }
}

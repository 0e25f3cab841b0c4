use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

pub const DEFAULT_LINE_BREAK: u32 = 60;
pub const INLINE_PROTOCOL: &str = "inline";

pub const PARAM_INDEXES: &str = "Indexes";
pub const PARAM_SCAFFOLD: &str = "Scaffold";
pub const PARAM_LINE_BREAK: &str = "Scaffold line break index";

/// One request for a named scaffold held by some store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldRequest {
    pub requested_store_id: String,
    pub scaffold_name: String,
    /// `None` falls back to the service default; `Some(0)` disables wrapping.
    #[serde(default)]
    pub wrap_width: Option<u32>,
}

impl ScaffoldRequest {
    pub fn new(store_id: &str, scaffold_name: &str) -> Self {
        Self {
            requested_store_id: store_id.to_string(),
            scaffold_name: scaffold_name.to_string(),
            wrap_width: None,
        }
    }

    pub fn with_wrap_width(mut self, wrap_width: u32) -> Self {
        self.wrap_width = Some(wrap_width);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    Started,
    Succeeded,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    IndexLoadFailed,
    ScaffoldNotFound,
    BufferWriteFailed,
    NoStoreAvailable,
    InvalidRequest,
}

/// Error summary attached to a failed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    pub code: ErrorCode,
    pub message: String,
}

impl ServiceError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl Error for ServiceError {}

/// Payload of a succeeded job: the FASTA record delivered inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineResource {
    pub protocol: String,
    pub title: String,
    pub data: String,
}

impl InlineResource {
    pub fn new(title: &str, data: String) -> Self {
        Self {
            protocol: INLINE_PROTOCOL.to_string(),
            title: title.to_string(),
            data,
        }
    }
}

/// A selectable index as advertised to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    String,
    UnsignedInt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterLevel {
    All,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub param_type: ParameterType,
    pub level: ParameterLevel,
    pub required: bool,
    pub default: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<IndexOption>,
}

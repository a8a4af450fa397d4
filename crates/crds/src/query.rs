//! Query CRD
//!
//! A single request routed to one or more agents, teams, models or tools.
//! The ARK controller executes the query and reports progress through
//! `status.phase` and the per-target `status.responses`.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[kube(
    group = "ark.mckinsey.com",
    version = "v1alpha1",
    kind = "Query",
    plural = "queries",
    namespaced,
    status = "QueryStatus",
    printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.phase"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct QuerySpec {
    /// How `input` is interpreted
    #[serde(default, rename = "type")]
    pub input_type: QueryInputType,

    /// Plain text for `user` queries, an OpenAI message list for `messages` queries
    #[schemars(schema_with = "preserve_unknown_fields")]
    pub input: serde_json::Value,

    /// Where the query is routed
    #[serde(default)]
    pub targets: Vec<QueryTarget>,

    /// Execution budget as a Kubernetes duration ("30s", "5m", "1h30m")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
/// Query input kind
pub enum QueryInputType {
    /// Plain text prompt
    #[default]
    User,

    /// OpenAI-style message list
    Messages,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueryTarget {
    /// Target kind
    #[serde(rename = "type")]
    pub target_type: TargetType,

    /// Name of the target resource in the query namespace
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
/// Kind of resource a query can be routed to
pub enum TargetType {
    /// Agent resource
    Agent,
    /// Team resource
    Team,
    /// Model resource
    Model,
    /// Tool resource
    Tool,
}

impl TargetType {
    /// Parses the lowercase kind used in `<type>/<name>` model identifiers.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "agent" => Some(Self::Agent),
            "team" => Some(Self::Team),
            "model" => Some(Self::Model),
            "tool" => Some(Self::Tool),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryStatus {
    /// Lifecycle phase
    #[serde(default)]
    pub phase: QueryPhase,

    /// Per-target responses, in routing order
    #[serde(default)]
    pub responses: Vec<QueryResponse>,

    /// Top-level error summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Status fields written by the controller that are not modelled here
    #[serde(flatten)]
    #[schemars(skip)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    /// Target that produced this response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    /// Result text when the query is done, error text when it failed
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
/// Query lifecycle phase
///
/// Phases this crate does not know about deserialize as `Unknown`
/// instead of failing the whole object.
#[serde(rename_all = "lowercase")]
pub enum QueryPhase {
    /// Waiting for execution to finish
    #[default]
    Pending,

    /// All targets responded
    Done,

    /// Execution failed
    Error,

    /// Unrecognized phase string
    #[serde(other)]
    #[schemars(skip)]
    Unknown,
}

impl QueryPhase {
    /// Returns true once the phase can no longer change.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Error)
    }
}

fn preserve_unknown_fields(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
    schemars::json_schema!({
        "x-kubernetes-preserve-unknown-fields": true
    })
}

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    domain::{Selection, UserId},
    error::ProtocolError,
};

/// Inbound message tags the editor client understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundKind {
    ApplyChangesetAsUser,
    CodeCompleteProposals,
    Annotations,
    TestResult,
    TestOrder,
    OrgImportsPrompt,
    Outsourced,
}

impl InboundKind {
    pub const ALL: [InboundKind; 7] = [
        InboundKind::ApplyChangesetAsUser,
        InboundKind::CodeCompleteProposals,
        InboundKind::Annotations,
        InboundKind::TestResult,
        InboundKind::TestOrder,
        InboundKind::OrgImportsPrompt,
        InboundKind::Outsourced,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InboundKind::ApplyChangesetAsUser => "APPLY_CHANGESET_AS_USER",
            InboundKind::CodeCompleteProposals => "CODECOMPLETE_PROPOSALS",
            InboundKind::Annotations => "ANNOTATIONS",
            InboundKind::TestResult => "TEST_RESULT",
            InboundKind::TestOrder => "TEST_ORDER",
            InboundKind::OrgImportsPrompt => "ORGIMPORTS_PROMPT",
            InboundKind::Outsourced => "OUTSOURCED",
        }
    }
}

/// An inbound frame: a `type` tag plus whatever fields that tag carries.
///
/// Kept untyped so that tags this client does not know yet still parse and
/// can be dropped by the router instead of failing at the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendedMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ExtendedMessage {
    pub fn new(kind: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            kind: kind.into(),
            fields,
        }
    }

    /// Builds a message from a typed payload, mostly useful for servers and tests.
    pub fn from_payload<P: Serialize>(
        kind: InboundKind,
        payload: &P,
    ) -> Result<Self, ProtocolError> {
        let value = serde_json::to_value(payload).map_err(|source| ProtocolError::Encode {
            kind: kind.as_str(),
            source,
        })?;
        let fields = match value {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        Ok(Self::new(kind.as_str(), fields))
    }

    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::MalformedFrame)
    }

    pub fn decode<P: DeserializeOwned>(&self) -> Result<P, ProtocolError> {
        serde_json::from_value(Value::Object(self.fields.clone())).map_err(|source| {
            ProtocolError::MalformedPayload {
                kind: self.kind.clone(),
                source,
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyChangesetAsUser {
    pub changeset: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeCompleteProposals {
    pub offset: u64,
    #[serde(default)]
    pub proposals: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotations {
    pub user_id: UserId,
    pub annotation_type: String,
    #[serde(default)]
    pub annotations: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub test: Value,
    pub result: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestOrder {
    pub order: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgImportsPrompt {
    pub suggestion: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outsourced {
    #[serde(default)]
    pub requests: Vec<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutsourceAction {
    Create,
    State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestsAction {
    State,
}

/// Requests the editor client sends over the collaboration channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundMessage {
    #[serde(rename = "ORGIMPORTS_RESOLVED")]
    OrgImportsResolved { choices: Value },
    #[serde(rename = "OUTSOURCE_REQUEST")]
    OutsourceRequest {
        action: OutsourceAction,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        request: Option<Value>,
    },
    #[serde(rename = "ANNOTATIONS_REQUEST")]
    AnnotationsRequest,
    #[serde(rename = "TESTS_REQUEST")]
    TestsRequest { action: TestsAction },
    #[serde(rename = "TESTS_RUN_REQUEST")]
    TestsRunRequest,
    #[serde(rename = "FORMAT_REQUEST")]
    FormatRequest,
    #[serde(rename = "ORGIMPORTS_REQUEST")]
    OrgImportsRequest,
    #[serde(rename = "FORCE_COMMIT")]
    ForceCommit { start: u64, end: u64 },
}

impl OutboundMessage {
    pub fn outsource_state() -> Self {
        OutboundMessage::OutsourceRequest {
            action: OutsourceAction::State,
            request: None,
        }
    }

    pub fn outsource_create(request: Value) -> Self {
        OutboundMessage::OutsourceRequest {
            action: OutsourceAction::Create,
            request: Some(request),
        }
    }

    pub fn tests_state() -> Self {
        OutboundMessage::TestsRequest {
            action: TestsAction::State,
        }
    }

    pub fn force_commit(selection: Selection) -> Self {
        OutboundMessage::ForceCommit {
            start: selection.start_offset,
            end: selection.end_offset,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OutboundMessage::OrgImportsResolved { .. } => "ORGIMPORTS_RESOLVED",
            OutboundMessage::OutsourceRequest { .. } => "OUTSOURCE_REQUEST",
            OutboundMessage::AnnotationsRequest => "ANNOTATIONS_REQUEST",
            OutboundMessage::TestsRequest { .. } => "TESTS_REQUEST",
            OutboundMessage::TestsRunRequest => "TESTS_RUN_REQUEST",
            OutboundMessage::FormatRequest => "FORMAT_REQUEST",
            OutboundMessage::OrgImportsRequest => "ORGIMPORTS_REQUEST",
            OutboundMessage::ForceCommit { .. } => "FORCE_COMMIT",
        }
    }

    pub fn to_frame(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(|source| ProtocolError::Encode {
            kind: self.kind(),
            source,
        })
    }
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;

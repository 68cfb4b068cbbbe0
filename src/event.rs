use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One message delivered by the event stream. The body stays opaque text
/// until the processor parses it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventRecord(pub String);

impl EventRecord {
    pub fn body(&self) -> &str {
        &self.0
    }
}

/// Storage log payload carried by one event.
#[derive(Debug, Clone, Deserialize)]
pub struct LogStream {
    pub records: Vec<OperationRecord>,
}

/// One logged storage operation. Upstream fields beyond these are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct OperationRecord {
    #[serde(rename = "operationName")]
    pub operation_name: String,

    /// Absolute resource locator of the operation's target.
    pub uri: String,
}

#[derive(Debug, Error)]
#[error("event body is not a valid log stream: {0}")]
pub struct ParseError(#[from] serde_json::Error);

impl LogStream {
    pub fn parse(record: &EventRecord) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(record.body())?)
    }
}

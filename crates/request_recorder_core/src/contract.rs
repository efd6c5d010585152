use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub const REQUESTS_TABLE: &str = "requests";
pub const STATUS_OK: u16 = 200;
pub const STATUS_WRITE_FAILED: u16 = 400;

/// The unit persisted once per invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: String,
    pub event: Value,
}

impl Record {
    pub fn new(id: impl Into<String>, event: Value) -> Self {
        Self {
            id: id.into(),
            event,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsumedCapacity {
    #[serde(rename = "TableName", skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(rename = "CapacityUnits", skip_serializing_if = "Option::is_none")]
    pub capacity_units: Option<f64>,
}

/// Acknowledgment returned by the store for a successful put.
///
/// A plain put reports neither attributes nor capacity, so the acknowledgment
/// serializes to `{}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WriteAck {
    #[serde(rename = "Attributes", skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Value>,
    #[serde(rename = "ConsumedCapacity", skip_serializing_if = "Option::is_none")]
    pub consumed_capacity: Option<ConsumedCapacity>,
}

/// Failure raised by the store while writing a record. Every cause
/// (connectivity, permission, throttling, serialization) lands here.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{code}: {message}")]
#[serde(rename_all = "camelCase")]
pub struct StoreFailure {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl StoreFailure {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status_code: None,
            request_id: None,
        }
    }

    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ResponseBody {
    // Failure first: an ack has only optional fields and would match anything.
    Failure(StoreFailure),
    Ack(WriteAck),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ResponseBody,
}

impl HandlerResponse {
    pub fn stored(ack: WriteAck) -> Self {
        Self {
            status_code: STATUS_OK,
            body: ResponseBody::Ack(ack),
        }
    }

    pub fn write_failed(failure: StoreFailure) -> Self {
        Self {
            status_code: STATUS_WRITE_FAILED,
            body: ResponseBody::Failure(failure),
        }
    }

    pub fn from_write_result(result: Result<WriteAck, StoreFailure>) -> Self {
        match result {
            Ok(ack) => Self::stored(ack),
            Err(failure) => Self::write_failed(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }
}

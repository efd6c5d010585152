//! DynamoDB encoding for records, put acknowledgments and write failures.
//!
//! Events are stored as native document attributes rather than a JSON string,
//! so `event` stays queryable in the table.

use std::collections::HashMap;

use aws_sdk_dynamodb::config::http::HttpResponse;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::operation::put_item::{PutItemError, PutItemOutput};
use aws_sdk_dynamodb::operation::RequestId;
use aws_sdk_dynamodb::types::AttributeValue;
use request_recorder_core::contract::{ConsumedCapacity, Record, StoreFailure, WriteAck};
use serde_json::{Map, Number, Value};

pub const ID_ATTRIBUTE: &str = "id";
pub const EVENT_ATTRIBUTE: &str = "event";

pub fn record_item(record: &Record) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (ID_ATTRIBUTE.to_string(), AttributeValue::S(record.id.clone())),
        (EVENT_ATTRIBUTE.to_string(), json_to_attribute(&record.event)),
    ])
}

pub fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(flag) => AttributeValue::Bool(*flag),
        Value::Number(number) => AttributeValue::N(number.to_string()),
        Value::String(text) => AttributeValue::S(text.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(json_to_attribute).collect()),
        Value::Object(fields) => AttributeValue::M(
            fields
                .iter()
                .map(|(key, field)| (key.clone(), json_to_attribute(field)))
                .collect(),
        ),
    }
}

pub fn attribute_to_json(attribute: &AttributeValue) -> Value {
    match attribute {
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Bool(flag) => Value::Bool(*flag),
        AttributeValue::N(number) => number_to_json(number),
        AttributeValue::S(text) => Value::String(text.clone()),
        AttributeValue::L(items) => Value::Array(items.iter().map(attribute_to_json).collect()),
        AttributeValue::M(fields) => Value::Object(attributes_to_json(fields)),
        AttributeValue::Ss(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(values) => {
            Value::Array(values.iter().map(|value| number_to_json(value)).collect())
        }
        AttributeValue::B(blob) => bytes_to_json(blob.as_ref()),
        AttributeValue::Bs(blobs) => {
            Value::Array(blobs.iter().map(|blob| bytes_to_json(blob.as_ref())).collect())
        }
        // Variants added to the SDK after this mapping keep their debug form.
        _ => unrecognized_attribute(attribute),
    }
}

fn unrecognized_attribute(attribute: &AttributeValue) -> Value {
    Value::String(format!("{attribute:?}"))
}

fn attributes_to_json(fields: &HashMap<String, AttributeValue>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, field)| (key.clone(), attribute_to_json(field)))
        .collect()
}

fn number_to_json(number: &str) -> Value {
    if let Ok(value) = number.parse::<i64>() {
        return Value::from(value);
    }
    if let Ok(value) = number.parse::<u64>() {
        return Value::from(value);
    }
    number
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(number.to_string()))
}

fn bytes_to_json(bytes: &[u8]) -> Value {
    Value::Array(bytes.iter().map(|byte| Value::from(*byte)).collect())
}

pub fn write_ack_from_output(output: &PutItemOutput) -> WriteAck {
    WriteAck {
        attributes: output
            .attributes()
            .map(|fields| Value::Object(attributes_to_json(fields))),
        consumed_capacity: output
            .consumed_capacity()
            .map(|capacity| ConsumedCapacity {
                table_name: capacity.table_name().map(str::to_string),
                capacity_units: capacity.capacity_units(),
            }),
    }
}

pub fn store_failure_from_sdk_error(error: &SdkError<PutItemError, HttpResponse>) -> StoreFailure {
    let code = error
        .code()
        .map(str::to_string)
        .unwrap_or_else(|| fallback_error_code(error).to_string());
    let message = error
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(error).to_string());

    let mut failure = StoreFailure::new(code, message);
    if let Some(response) = error.raw_response() {
        failure = failure.with_status_code(response.status().as_u16());
    }
    if let Some(request_id) = error.as_service_error().and_then(RequestId::request_id) {
        failure = failure.with_request_id(request_id);
    }
    failure
}

fn fallback_error_code(error: &SdkError<PutItemError, HttpResponse>) -> &'static str {
    match error {
        SdkError::ConstructionFailure(_) => "SerializationError",
        SdkError::TimeoutError(_) => "TimeoutError",
        SdkError::DispatchFailure(_) => "NetworkingError",
        SdkError::ResponseError(_) => "ResponseError",
        SdkError::ServiceError(_) => "ServiceError",
        _ => "UnknownError",
    }
}

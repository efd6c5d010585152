use lambda_runtime::{service_fn, Error, LambdaEvent};
use request_recorder_core::contract::{HandlerResponse, Record, StoreFailure, WriteAck};
use request_recorder_core::record_id::SystemClock;
use request_recorder_lambda::adapters::dynamodb::{
    record_item, store_failure_from_sdk_error, write_ack_from_output,
};
use request_recorder_lambda::adapters::record_store::RecordStore;
use request_recorder_lambda::config::RuntimeConfig;
use request_recorder_lambda::handlers::request::handle_request_event;
use request_recorder_lambda::telemetry;
use serde_json::Value;
use tracing::info_span;

struct DynamoRecordStore {
    dynamodb_client: aws_sdk_dynamodb::Client,
}

impl RecordStore for DynamoRecordStore {
    fn put_record(&self, table: &str, record: &Record) -> Result<WriteAck, StoreFailure> {
        let table_name = table.to_string();
        let item = record_item(record);
        let client = self.dynamodb_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .put_item()
                    .table_name(table_name)
                    .set_item(Some(item))
                    .send()
                    .await
                    .map(|output| write_ack_from_output(&output))
                    .map_err(|error| store_failure_from_sdk_error(&error))
            })
        })
    }
}

async fn build_store(config: &RuntimeConfig) -> DynamoRecordStore {
    let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let mut dynamodb_config = aws_sdk_dynamodb::config::Builder::from(&aws_config);
    if let Some(endpoint_url) = &config.dynamodb_endpoint_url {
        dynamodb_config = dynamodb_config.endpoint_url(endpoint_url);
    }

    DynamoRecordStore {
        dynamodb_client: aws_sdk_dynamodb::Client::from_conf(dynamodb_config.build()),
    }
}

fn handle_request(event: LambdaEvent<Value>, store: &DynamoRecordStore) -> HandlerResponse {
    let (payload, context) = event.into_parts();
    info_span!("request", request_id = %context.request_id)
        .in_scope(|| handle_request_event(payload, &SystemClock, store))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init();

    let config = RuntimeConfig::from_env();
    let store = build_store(&config).await;
    let store = &store;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        Ok::<HandlerResponse, Error>(handle_request(event, store))
    }))
    .await
}

use request_recorder_core::contract::{HandlerResponse, Record, REQUESTS_TABLE};
use request_recorder_core::record_id::{record_id, Clock};
use serde_json::Value;
use tracing::{error, info};

use crate::adapters::record_store::RecordStore;

/// Persists `event` under a timestamp id and reports the outcome.
///
/// The event is stored as received. A single write is attempted; any store
/// failure is returned as a 400 response carrying the failure itself.
pub fn handle_request_event(
    event: Value,
    clock: &impl Clock,
    store: &dyn RecordStore,
) -> HandlerResponse {
    let record = Record::new(record_id(clock), event);

    let result = store.put_record(REQUESTS_TABLE, &record);
    match &result {
        Ok(_) => info!(id = %record.id, table = REQUESTS_TABLE, "record_stored"),
        Err(failure) => error!(
            id = %record.id,
            table = REQUESTS_TABLE,
            code = %failure.code,
            message = %failure.message,
            "record_write_failed"
        ),
    }

    HandlerResponse::from_write_result(result)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::sync::Mutex;

    use request_recorder_core::contract::{
        ConsumedCapacity, ResponseBody, StoreFailure, WriteAck, STATUS_OK, STATUS_WRITE_FAILED,
    };
    use request_recorder_core::record_id::is_record_id;
    use serde_json::json;

    use super::*;

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now_millis(&self) -> u64 {
            self.0
        }
    }

    struct TickingClock {
        next: Cell<u64>,
    }

    impl TickingClock {
        fn starting_at(millis: u64) -> Self {
            Self {
                next: Cell::new(millis),
            }
        }
    }

    impl Clock for TickingClock {
        fn now_millis(&self) -> u64 {
            let now = self.next.get();
            self.next.set(now + 1);
            now
        }
    }

    struct RecordingStore {
        writes: Mutex<Vec<(String, Record)>>,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                writes: Mutex::new(Vec::new()),
            }
        }

        fn writes(&self) -> Vec<(String, Record)> {
            self.writes.lock().expect("poisoned mutex").clone()
        }
    }

    impl RecordStore for RecordingStore {
        fn put_record(&self, table: &str, record: &Record) -> Result<WriteAck, StoreFailure> {
            self.writes
                .lock()
                .expect("poisoned mutex")
                .push((table.to_string(), record.clone()));
            Ok(WriteAck::default())
        }
    }

    struct FailingStore {
        failure: StoreFailure,
        attempts: Mutex<usize>,
    }

    impl FailingStore {
        fn new(failure: StoreFailure) -> Self {
            Self {
                failure,
                attempts: Mutex::new(0),
            }
        }

        fn attempts(&self) -> usize {
            *self.attempts.lock().expect("poisoned mutex")
        }
    }

    impl RecordStore for FailingStore {
        fn put_record(&self, _table: &str, _record: &Record) -> Result<WriteAck, StoreFailure> {
            *self.attempts.lock().expect("poisoned mutex") += 1;
            Err(self.failure.clone())
        }
    }

    #[test]
    fn stores_event_under_invocation_timestamp() {
        let store = RecordingStore::new();
        let event = json!({"foo": "bar"});

        let response = handle_request_event(event.clone(), &FixedClock(1_718_000_123_456), &store);

        assert_eq!(response.status_code, STATUS_OK);
        assert_eq!(response.body, ResponseBody::Ack(WriteAck::default()));
        assert_eq!(
            store.writes(),
            vec![(
                "requests".to_string(),
                Record::new("1718000123456", event)
            )]
        );
        assert_eq!(
            serde_json::to_value(&response).expect("response should serialize"),
            json!({"statusCode": 200, "body": {}})
        );
    }

    #[test]
    fn returns_store_acknowledgment_as_body() {
        struct CapacityStore;

        impl RecordStore for CapacityStore {
            fn put_record(&self, table: &str, _record: &Record) -> Result<WriteAck, StoreFailure> {
                Ok(WriteAck {
                    attributes: None,
                    consumed_capacity: Some(ConsumedCapacity {
                        table_name: Some(table.to_string()),
                        capacity_units: Some(1.0),
                    }),
                })
            }
        }

        let response = handle_request_event(json!({}), &FixedClock(5), &CapacityStore);

        let body = serde_json::to_value(&response.body).expect("body should serialize");
        assert_eq!(
            body,
            json!({"ConsumedCapacity": {"TableName": "requests", "CapacityUnits": 1.0}})
        );
    }

    #[test]
    fn store_failure_becomes_400_with_failure_body() {
        let failure = StoreFailure::new(
            "ProvisionedThroughputExceededException",
            "rate of requests exceeds the allowed throughput",
        )
        .with_status_code(400);
        let store = FailingStore::new(failure.clone());

        let response = handle_request_event(json!({"foo": "bar"}), &FixedClock(7), &store);

        assert_eq!(response.status_code, STATUS_WRITE_FAILED);
        assert_eq!(response.body, ResponseBody::Failure(failure));
        assert_eq!(store.attempts(), 1);
    }

    #[test]
    fn any_event_shape_yields_200_or_400() {
        let events = [
            json!(null),
            json!(42),
            json!("text"),
            json!([1, "two", {"three": 3}]),
            json!({"body": "{\"not\":\"parsed\"}", "headers": {}}),
        ];
        let ok_store = RecordingStore::new();
        let failing_store = FailingStore::new(StoreFailure::new("NetworkingError", "offline"));

        for event in events {
            let stored = handle_request_event(event.clone(), &FixedClock(9), &ok_store);
            let failed = handle_request_event(event, &FixedClock(9), &failing_store);
            assert_eq!(stored.status_code, 200);
            assert_eq!(failed.status_code, 400);
        }
        assert!(ok_store
            .writes()
            .iter()
            .all(|(_, record)| is_record_id(&record.id)));
    }

    #[test]
    fn repeated_event_is_recorded_twice_without_deduplication() {
        let store = RecordingStore::new();
        let clock = TickingClock::starting_at(1_000);
        let event = json!({"foo": "bar"});

        handle_request_event(event.clone(), &clock, &store);
        handle_request_event(event.clone(), &clock, &store);

        let writes = store.writes();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0].1.id, "1000");
        assert_eq!(writes[1].1.id, "1001");
        assert!(writes.iter().all(|(_, record)| record.event == event));
    }
}

use request_recorder_core::contract::{Record, StoreFailure, WriteAck};

pub trait RecordStore {
    fn put_record(&self, table: &str, record: &Record) -> Result<WriteAck, StoreFailure>;
}

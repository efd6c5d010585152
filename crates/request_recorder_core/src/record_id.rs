use chrono::Utc;

/// Source of the invocation timestamp used to derive record ids.
pub trait Clock {
    fn now_millis(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        // Clocks set before the epoch clamp to zero.
        u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
    }
}

pub fn record_id(clock: &impl Clock) -> String {
    record_id_from_millis(clock.now_millis())
}

pub fn record_id_from_millis(millis: u64) -> String {
    millis.to_string()
}

pub fn is_record_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}
